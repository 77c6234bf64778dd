use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{RepositoryError, VerdictRepository};
use crate::domain::{CriterionVerdict, NewVerdict, SessionId, SubQuestionEvaluation, VerdictId};

pub struct PgVerdictRepository {
    pool: PgPool,
}

impl PgVerdictRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_verdict(row: &PgRow) -> Result<CriterionVerdict, RepositoryError> {
    let get = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());
    let position: i16 = row.try_get("position").map_err(get)?;

    Ok(CriterionVerdict {
        id: VerdictId::from_uuid(row.try_get("id").map_err(get)?),
        session_id: SessionId::from_uuid(row.try_get("session_id").map_err(get)?),
        position: position as u8,
        ai_met: row.try_get("ai_met").map_err(get)?,
        ai_rationale: row.try_get("ai_rationale").map_err(get)?,
        override_met: row.try_get("override_met").map_err(get)?,
        changed: row.try_get("changed").map_err(get)?,
        changed_at: row.try_get("changed_at").map_err(get)?,
        created_at: row.try_get("created_at").map_err(get)?,
    })
}

fn map_sub_question(row: &PgRow) -> Result<SubQuestionEvaluation, RepositoryError> {
    let get = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());
    let question_order: i16 = row.try_get("question_order").map_err(get)?;

    Ok(SubQuestionEvaluation {
        id: row.try_get("id").map_err(get)?,
        verdict_id: VerdictId::from_uuid(row.try_get("verdict_id").map_err(get)?),
        question_order: question_order as u8,
        evidence_found: row.try_get("evidence_found").map_err(get)?,
        evidence_text: row.try_get("evidence_text").map_err(get)?,
        reasoning: row.try_get("reasoning").map_err(get)?,
        confidence: row.try_get("confidence").map_err(get)?,
    })
}

#[async_trait]
impl VerdictRepository for PgVerdictRepository {
    #[instrument(skip(self, verdicts), fields(session_id = %session_id.as_uuid(), count = verdicts.len()))]
    async fn replace_for_session(
        &self,
        session_id: SessionId,
        verdicts: Vec<NewVerdict>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        // Sub-question evaluations go with their verdicts via FK cascade.
        sqlx::query("DELETE FROM criterion_verdicts WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        let now = Utc::now();
        for verdict in &verdicts {
            let verdict_id = VerdictId::new();
            sqlx::query(
                r#"
                INSERT INTO criterion_verdicts
                    (id, session_id, "position", ai_met, ai_rationale, override_met,
                     changed, changed_at, created_at)
                VALUES ($1, $2, $3, $4, $5, NULL, FALSE, NULL, $6)
                "#,
            )
            .bind(verdict_id.as_uuid())
            .bind(session_id.as_uuid())
            .bind(verdict.position as i16)
            .bind(verdict.ai_met)
            .bind(&verdict.ai_rationale)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

            for sub in &verdict.sub_questions {
                sqlx::query(
                    r#"
                    INSERT INTO sub_question_evaluations
                        (id, verdict_id, question_order, evidence_found, evidence_text,
                         reasoning, confidence)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(verdict_id.as_uuid())
                .bind(sub.question_order as i16)
                .bind(sub.evidence_found)
                .bind(&sub.evidence_text)
                .bind(&sub.reasoning)
                .bind(sub.confidence)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %session_id.as_uuid()))]
    async fn list_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<CriterionVerdict>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, "position", ai_met, ai_rationale, override_met,
                   changed, changed_at, created_at
            FROM criterion_verdicts
            WHERE session_id = $1
            ORDER BY "position"
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.iter().map(map_verdict).collect()
    }

    #[instrument(skip(self), fields(session_id = %session_id.as_uuid()))]
    async fn sub_questions_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<SubQuestionEvaluation>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT sq.id, sq.verdict_id, sq.question_order, sq.evidence_found,
                   sq.evidence_text, sq.reasoning, sq.confidence
            FROM sub_question_evaluations sq
            JOIN criterion_verdicts cv ON cv.id = sq.verdict_id
            WHERE cv.session_id = $1
            ORDER BY cv."position", sq.question_order
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.iter().map(map_sub_question).collect()
    }

    #[instrument(skip(self), fields(session_id = %session_id.as_uuid(), position = position))]
    async fn apply_override(
        &self,
        session_id: SessionId,
        position: u8,
        override_met: bool,
    ) -> Result<CriterionVerdict, RepositoryError> {
        let row = sqlx::query(
            r#"
            UPDATE criterion_verdicts
            SET override_met = $1, changed = TRUE, changed_at = $2
            WHERE session_id = $3 AND "position" = $4
            RETURNING id, session_id, "position", ai_met, ai_rationale, override_met,
                      changed, changed_at, created_at
            "#,
        )
        .bind(override_met)
        .bind(Utc::now())
        .bind(session_id.as_uuid())
        .bind(position as i16)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        match row {
            Some(row) => map_verdict(&row),
            None => Err(RepositoryError::NotFound(format!(
                "verdict for session {} position {}",
                session_id.as_uuid(),
                position
            ))),
        }
    }
}
