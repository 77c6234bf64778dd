use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{CoachingRepository, RepositoryError};
use crate::domain::{
    CoachingFeedback, CoachingPoint, FeedbackId, NarrationReference, SessionId, StorageKind,
    StoragePath,
};

pub struct PgCoachingRepository {
    pool: PgPool,
}

impl PgCoachingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &PgRow) -> Result<CoachingFeedback, RepositoryError> {
    let get = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());
    let parse = |e: serde_json::Error| RepositoryError::QueryFailed(e.to_string());

    let strengths: serde_json::Value = row.try_get("strengths").map_err(get)?;
    let improvement_areas: serde_json::Value = row.try_get("improvement_areas").map_err(get)?;
    let action_items: serde_json::Value = row.try_get("action_items").map_err(get)?;

    let audio_path: Option<String> = row.try_get("audio_path").map_err(get)?;
    let audio = match audio_path {
        Some(path) => {
            let kind: String = row.try_get("audio_storage_kind").map_err(get)?;
            let duration: i32 = row.try_get("audio_duration_seconds").map_err(get)?;
            Some(NarrationReference {
                storage_path: StoragePath::from_raw(path),
                storage_kind: kind
                    .parse::<StorageKind>()
                    .map_err(RepositoryError::QueryFailed)?,
                duration_seconds: duration as u32,
            })
        }
        None => None,
    };

    Ok(CoachingFeedback {
        id: FeedbackId::from_uuid(row.try_get("id").map_err(get)?),
        session_id: SessionId::from_uuid(row.try_get("session_id").map_err(get)?),
        feedback_text: row.try_get("feedback_text").map_err(get)?,
        strengths: serde_json::from_value::<Vec<CoachingPoint>>(strengths).map_err(parse)?,
        improvement_areas: serde_json::from_value::<Vec<CoachingPoint>>(improvement_areas)
            .map_err(parse)?,
        action_items: serde_json::from_value::<Vec<String>>(action_items).map_err(parse)?,
        audio,
        generated_at: row.try_get("generated_at").map_err(get)?,
    })
}

#[async_trait]
impl CoachingRepository for PgCoachingRepository {
    #[instrument(skip(self, feedback), fields(session_id = %feedback.session_id.as_uuid()))]
    async fn upsert(&self, feedback: &CoachingFeedback) -> Result<(), RepositoryError> {
        let encode = |e: serde_json::Error| RepositoryError::QueryFailed(e.to_string());
        let strengths = serde_json::to_value(&feedback.strengths).map_err(encode)?;
        let improvement_areas =
            serde_json::to_value(&feedback.improvement_areas).map_err(encode)?;
        let action_items = serde_json::to_value(&feedback.action_items).map_err(encode)?;

        let (audio_path, audio_kind, audio_duration) = match &feedback.audio {
            Some(audio) => (
                Some(audio.storage_path.as_str().to_string()),
                Some(audio.storage_kind.as_str()),
                Some(audio.duration_seconds as i32),
            ),
            None => (None, None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO coaching_feedback
                (id, session_id, feedback_text, strengths, improvement_areas, action_items,
                 audio_path, audio_storage_kind, audio_duration_seconds, generated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (session_id) DO UPDATE
            SET id = EXCLUDED.id,
                feedback_text = EXCLUDED.feedback_text,
                strengths = EXCLUDED.strengths,
                improvement_areas = EXCLUDED.improvement_areas,
                action_items = EXCLUDED.action_items,
                audio_path = EXCLUDED.audio_path,
                audio_storage_kind = EXCLUDED.audio_storage_kind,
                audio_duration_seconds = EXCLUDED.audio_duration_seconds,
                generated_at = EXCLUDED.generated_at
            "#,
        )
        .bind(feedback.id.as_uuid())
        .bind(feedback.session_id.as_uuid())
        .bind(&feedback.feedback_text)
        .bind(strengths)
        .bind(improvement_areas)
        .bind(action_items)
        .bind(audio_path)
        .bind(audio_kind)
        .bind(audio_duration)
        .bind(feedback.generated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %session_id.as_uuid()))]
    async fn get_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<CoachingFeedback>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, session_id, feedback_text, strengths, improvement_areas, action_items,
                   audio_path, audio_storage_kind, audio_duration_seconds, generated_at
            FROM coaching_feedback
            WHERE session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(map_row).transpose()
    }

    #[instrument(skip(self), fields(session_id = %session_id.as_uuid()))]
    async fn delete_for_session(&self, session_id: SessionId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM coaching_feedback WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}
