use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{RepositoryError, TranscriptRepository};
use crate::domain::{SessionId, Transcript, TranscriptId};

pub struct PgTranscriptRepository {
    pool: PgPool,
}

impl PgTranscriptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &PgRow) -> Result<Transcript, RepositoryError> {
    let get = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());
    let word_count: i32 = row.try_get("word_count").map_err(get)?;

    Ok(Transcript {
        id: TranscriptId::from_uuid(row.try_get("id").map_err(get)?),
        session_id: SessionId::from_uuid(row.try_get("session_id").map_err(get)?),
        text: row.try_get("text").map_err(get)?,
        language: row.try_get("language").map_err(get)?,
        duration_seconds: row.try_get("duration_seconds").map_err(get)?,
        word_count: word_count as u32,
        transcribed_at: row.try_get("transcribed_at").map_err(get)?,
    })
}

#[async_trait]
impl TranscriptRepository for PgTranscriptRepository {
    #[instrument(skip(self, transcript), fields(session_id = %transcript.session_id.as_uuid()))]
    async fn create(&self, transcript: &Transcript) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO transcripts
                (id, session_id, text, language, duration_seconds, word_count, transcribed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(transcript.id.as_uuid())
        .bind(transcript.session_id.as_uuid())
        .bind(&transcript.text)
        .bind(&transcript.language)
        .bind(transcript.duration_seconds)
        .bind(transcript.word_count as i32)
        .bind(transcript.transcribed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %session_id.as_uuid()))]
    async fn get_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<Transcript>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, session_id, text, language, duration_seconds, word_count, transcribed_at
            FROM transcripts
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(map_row).transpose()
    }

    /// Deletes the transcript and everything derived from it in one
    /// transaction; sub-question evaluations go via the verdict FK cascade.
    #[instrument(skip(self), fields(session_id = %session_id.as_uuid()))]
    async fn delete_for_session(&self, session_id: SessionId) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        sqlx::query("DELETE FROM criterion_verdicts WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        sqlx::query("DELETE FROM transcripts WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}
