use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{RepositoryError, SessionRepository};
use crate::domain::{CallSession, SessionId, SessionStatus};

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &PgRow) -> Result<CallSession, RepositoryError> {
    let status: String = row
        .try_get("status")
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
    let status = status
        .parse::<SessionStatus>()
        .map_err(RepositoryError::QueryFailed)?;

    let get = |e: sqlx::Error| RepositoryError::QueryFailed(e.to_string());

    Ok(CallSession {
        id: SessionId::from_uuid(row.try_get("id").map_err(get)?),
        user_id: row.try_get("user_id").map_err(get)?,
        customer_name: row.try_get("customer_name").map_err(get)?,
        opportunity_name: row.try_get("opportunity_name").map_err(get)?,
        status,
        last_error: row.try_get("last_error").map_err(get)?,
        submitted_at: row.try_get("submitted_at").map_err(get)?,
        completed_at: row.try_get("completed_at").map_err(get)?,
        created_at: row.try_get("created_at").map_err(get)?,
        updated_at: row.try_get("updated_at").map_err(get)?,
    })
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    #[instrument(skip(self, session), fields(session_id = %session.id.as_uuid()))]
    async fn create(&self, session: &CallSession) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO call_sessions
                (id, user_id, customer_name, opportunity_name, status, last_error,
                 submitted_at, completed_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(session.user_id)
        .bind(&session.customer_name)
        .bind(&session.opportunity_name)
        .bind(session.status.as_str())
        .bind(&session.last_error)
        .bind(session.submitted_at)
        .bind(session.completed_at)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %id.as_uuid()))]
    async fn get_by_id(&self, id: SessionId) -> Result<Option<CallSession>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, customer_name, opportunity_name, status, last_error,
                   submitted_at, completed_at, created_at, updated_at
            FROM call_sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.as_ref().map(map_row).transpose()
    }

    #[instrument(skip(self), fields(session_id = %id.as_uuid(), status = %status))]
    async fn update_status(
        &self,
        id: SessionId,
        status: SessionStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE call_sessions
            SET status = $1, last_error = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(status.as_str())
        .bind(error_message)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.as_uuid().to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %id.as_uuid()))]
    async fn mark_submitted(
        &self,
        id: SessionId,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE call_sessions
            SET submitted_at = $1, updated_at = $1
            WHERE id = $2
            "#,
        )
        .bind(submitted_at)
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %id.as_uuid()))]
    async fn mark_completed(
        &self,
        id: SessionId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE call_sessions
            SET completed_at = $1, updated_at = $1
            WHERE id = $2
            "#,
        )
        .bind(completed_at)
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CallSession>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, customer_name, opportunity_name, status, last_error,
                   submitted_at, completed_at, created_at, updated_at
            FROM call_sessions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        rows.iter().map(map_row).collect()
    }
}
