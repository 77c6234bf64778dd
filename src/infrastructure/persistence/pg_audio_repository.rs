use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{AudioRepository, RepositoryError};
use crate::domain::{AudioReference, AudioReferenceId, SessionId, StorageKind, StoragePath};

pub struct PgAudioRepository {
    pool: PgPool,
}

impl PgAudioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &PgRow) -> Result<AudioReference, RepositoryError> {
    let get = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());

    let storage_kind: String = row.try_get("storage_kind").map_err(get)?;
    let storage_kind = storage_kind
        .parse::<StorageKind>()
        .map_err(RepositoryError::QueryFailed)?;
    let storage_path: String = row.try_get("storage_path").map_err(get)?;
    let size_bytes: i64 = row.try_get("size_bytes").map_err(get)?;

    Ok(AudioReference {
        id: AudioReferenceId::from_uuid(row.try_get("id").map_err(get)?),
        session_id: SessionId::from_uuid(row.try_get("session_id").map_err(get)?),
        filename: row.try_get("filename").map_err(get)?,
        storage_path: StoragePath::from_raw(storage_path),
        storage_kind,
        size_bytes: size_bytes as u64,
        mime_type: row.try_get("mime_type").map_err(get)?,
        duration_seconds: row.try_get("duration_seconds").map_err(get)?,
        created_at: row.try_get("created_at").map_err(get)?,
    })
}

#[async_trait]
impl AudioRepository for PgAudioRepository {
    #[instrument(skip(self, reference), fields(session_id = %reference.session_id.as_uuid()))]
    async fn create(&self, reference: &AudioReference) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO audio_references
                (id, session_id, filename, storage_path, storage_kind, size_bytes,
                 mime_type, duration_seconds, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(reference.id.as_uuid())
        .bind(reference.session_id.as_uuid())
        .bind(&reference.filename)
        .bind(reference.storage_path.as_str())
        .bind(reference.storage_kind.as_str())
        .bind(reference.size_bytes as i64)
        .bind(&reference.mime_type)
        .bind(reference.duration_seconds)
        .bind(reference.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::ConstraintViolation(e.to_string())
            }
            _ => RepositoryError::QueryFailed(e.to_string()),
        })?;

        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %session_id.as_uuid()))]
    async fn get_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<AudioReference>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, session_id, filename, storage_path, storage_kind, size_bytes,
                   mime_type, duration_seconds, created_at
            FROM audio_references
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
    async fn set_duration(
        &self,
        session_id: SessionId,
        duration_seconds: f64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE audio_references
            SET duration_seconds = $1
            WHERE session_id = $2
            "#,
        )
        .bind(duration_seconds)
        .bind(session_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}
