use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{RepositoryError, ScoreRepository};
use crate::domain::{RiskBand, ScoreHistoryEntry, ScoreSnapshot, ScoreTrigger, SessionId};

pub struct PgScoreRepository {
    pool: PgPool,
}

impl PgScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_snapshot(row: &PgRow) -> Result<ScoreSnapshot, RepositoryError> {
    let get = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());
    let score: i32 = row.try_get("score").map_err(get)?;
    let met_count: i32 = row.try_get("met_count").map_err(get)?;
    let total_count: i32 = row.try_get("total_count").map_err(get)?;
    let risk_band: String = row.try_get("risk_band").map_err(get)?;

    Ok(ScoreSnapshot {
        session_id: SessionId::from_uuid(row.try_get("session_id").map_err(get)?),
        score: score as u32,
        risk_band: risk_band
            .parse::<RiskBand>()
            .map_err(RepositoryError::QueryFailed)?,
        met_count: met_count as u32,
        total_count: total_count as u32,
        calculated_at: row.try_get("calculated_at").map_err(get)?,
    })
}

fn map_history(row: &PgRow) -> Result<ScoreHistoryEntry, RepositoryError> {
    let get = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());
    let score: i32 = row.try_get("score").map_err(get)?;
    let met_count: i32 = row.try_get("met_count").map_err(get)?;
    let total_count: i32 = row.try_get("total_count").map_err(get)?;
    let risk_band: String = row.try_get("risk_band").map_err(get)?;
    let trigger: String = row.try_get("trigger").map_err(get)?;

    Ok(ScoreHistoryEntry {
        id: row.try_get("id").map_err(get)?,
        session_id: SessionId::from_uuid(row.try_get("session_id").map_err(get)?),
        score: score as u32,
        risk_band: risk_band
            .parse::<RiskBand>()
            .map_err(RepositoryError::QueryFailed)?,
        met_count: met_count as u32,
        total_count: total_count as u32,
        delta: row.try_get("delta").map_err(get)?,
        trigger: trigger
            .parse::<ScoreTrigger>()
            .map_err(RepositoryError::QueryFailed)?,
        recorded_at: row.try_get("recorded_at").map_err(get)?,
    })
}

#[async_trait]
impl ScoreRepository for PgScoreRepository {
    #[instrument(skip(self), fields(session_id = %session_id.as_uuid()))]
    async fn current(
        &self,
        session_id: SessionId,
    ) -> Result<Option<ScoreSnapshot>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT session_id, score, risk_band, met_count, total_count, calculated_at
            FROM score_snapshots
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(map_snapshot).transpose()
    }

    #[instrument(
        skip(self, snapshot, entry),
        fields(session_id = %snapshot.session_id.as_uuid(), score = snapshot.score)
    )]
    async fn record(
        &self,
        snapshot: &ScoreSnapshot,
        entry: &ScoreHistoryEntry,
    ) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO score_snapshots
                (session_id, score, risk_band, met_count, total_count, calculated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (session_id) DO UPDATE
            SET score = EXCLUDED.score,
                risk_band = EXCLUDED.risk_band,
                met_count = EXCLUDED.met_count,
                total_count = EXCLUDED.total_count,
                calculated_at = EXCLUDED.calculated_at
            "#,
        )
        .bind(snapshot.session_id.as_uuid())
        .bind(snapshot.score as i32)
        .bind(snapshot.risk_band.as_str())
        .bind(snapshot.met_count as i32)
        .bind(snapshot.total_count as i32)
        .bind(snapshot.calculated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO score_history
                (id, session_id, score, risk_band, met_count, total_count, delta,
                 trigger, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.id)
        .bind(entry.session_id.as_uuid())
        .bind(entry.score as i32)
        .bind(entry.risk_band.as_str())
        .bind(entry.met_count as i32)
        .bind(entry.total_count as i32)
        .bind(entry.delta)
        .bind(entry.trigger.as_str())
        .bind(entry.recorded_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %session_id.as_uuid()))]
    async fn history(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ScoreHistoryEntry>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, score, risk_band, met_count, total_count, delta,
                   trigger, recorded_at
            FROM score_history
            WHERE session_id = $1
            ORDER BY seq
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.iter().map(map_history).collect()
    }
}
