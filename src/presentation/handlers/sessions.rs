use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::PipelineError;
use crate::domain::{CallSession, SessionId};
use crate::presentation::state::AppState;

use super::scoring::ScoreResponse;

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: Uuid,
    pub customer_name: String,
    pub opportunity_name: Option<String>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub user_id: String,
    pub customer_name: String,
    pub opportunity_name: Option<String>,
    pub status: String,
    pub last_error: Option<String>,
    pub submitted_at: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl SessionResponse {
    pub fn from_session(session: &CallSession) -> Self {
        Self {
            id: session.id.as_uuid().to_string(),
            user_id: session.user_id.to_string(),
            customer_name: session.customer_name.clone(),
            opportunity_name: session.opportunity_name.clone(),
            status: session.status.as_str().to_string(),
            last_error: session.last_error.clone(),
            submitted_at: session.submitted_at.map(|t| t.to_rfc3339()),
            completed_at: session.completed_at.map(|t| t.to_rfc3339()),
            created_at: session.created_at.to_rfc3339(),
            updated_at: session.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn parse_session_id(raw: &str) -> Result<SessionId, (StatusCode, Json<ErrorResponse>)> {
    Uuid::parse_str(raw)
        .map(SessionId::from_uuid)
        .map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Invalid session ID: {}", raw),
                }),
            )
        })
}

#[tracing::instrument(skip(state, request))]
pub async fn create_session_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    if request.customer_name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "customer_name must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    let session = CallSession::new(
        request.user_id,
        request.customer_name.trim().to_string(),
        request.opportunity_name,
    );

    if let Err(e) = state.sessions.create(&session).await {
        tracing::error!(error = %e, "Failed to create call session");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to create session: {}", e),
            }),
        )
            .into_response();
    }

    tracing::info!(session_id = %session.id.as_uuid(), "Call session created");
    (
        StatusCode::CREATED,
        Json(SessionResponse::from_session(&session)),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn get_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    match state.sessions.get_by_id(id).await {
        Ok(Some(session)) => (
            StatusCode::OK,
            Json(SessionResponse::from_session(&session)),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session not found: {}", session_id),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch session: {}", e),
                }),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    pub user_id: Uuid,
}

#[tracing::instrument(skip(state))]
pub async fn list_sessions_handler(
    State(state): State<AppState>,
    Query(query): Query<ListSessionsQuery>,
) -> impl IntoResponse {
    match state.sessions.list_for_user(query.user_id).await {
        Ok(sessions) => {
            let body: Vec<SessionResponse> =
                sessions.iter().map(SessionResponse::from_session).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list sessions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to list sessions: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// Submits the reviewed checklist: locks in the score and completes the
/// session; coaching synthesis runs in the background afterwards.
#[tracing::instrument(skip(state))]
pub async fn submit_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    match state.pipeline.submit(id).await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(ScoreResponse::from_snapshot(&snapshot)),
        )
            .into_response(),
        Err(PipelineError::SessionNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session not found: {}", session_id),
            }),
        )
            .into_response(),
        Err(e @ PipelineError::InvalidState { .. }) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(PipelineError::Scoring(e)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Session submit failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Submit failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}
