use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::application::services::{PipelineError, ScoringError};
use crate::domain::{ScoreHistoryEntry, ScoreSnapshot};
use crate::presentation::state::AppState;

use super::sessions::{parse_session_id, ErrorResponse};

#[derive(Serialize)]
pub struct ScoreResponse {
    pub session_id: String,
    pub score: u32,
    pub risk_band: String,
    pub risk_label: String,
    pub met_count: u32,
    pub total_count: u32,
    pub calculated_at: String,
}

impl ScoreResponse {
    pub fn from_snapshot(snapshot: &ScoreSnapshot) -> Self {
        Self {
            session_id: snapshot.session_id.as_uuid().to_string(),
            score: snapshot.score,
            risk_band: snapshot.risk_band.as_str().to_string(),
            risk_label: snapshot.risk_band.label().to_string(),
            met_count: snapshot.met_count,
            total_count: snapshot.total_count,
            calculated_at: snapshot.calculated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct HistoryEntryResponse {
    pub id: String,
    pub score: u32,
    pub risk_band: String,
    pub met_count: u32,
    pub total_count: u32,
    pub delta: Option<i32>,
    pub trigger: String,
    pub recorded_at: String,
}

impl HistoryEntryResponse {
    fn from_entry(entry: &ScoreHistoryEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            score: entry.score,
            risk_band: entry.risk_band.as_str().to_string(),
            met_count: entry.met_count,
            total_count: entry.total_count,
            delta: entry.delta,
            trigger: entry.trigger.as_str().to_string(),
            recorded_at: entry.recorded_at.to_rfc3339(),
        }
    }
}

/// Manual recalculation from the current verdict set. Appends a history
/// entry even when the score is unchanged.
#[tracing::instrument(skip(state))]
pub async fn calculate_score_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    match state.pipeline.recalculate_score(id).await {
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
        Err(e @ PipelineError::Scoring(ScoringError::NoVerdicts(_))) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Score calculation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Score calculation failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn get_score_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    match state.scores.current(id).await {
        Ok(Some(snapshot)) => (
            StatusCode::OK,
            Json(ScoreResponse::from_snapshot(&snapshot)),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No score calculated for session: {}", session_id),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch score");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch score: {}", e),
                }),
            )
                .into_response()
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn score_history_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    match state.scores.history(id).await {
        Ok(entries) => {
            let body: Vec<HistoryEntryResponse> =
                entries.iter().map(HistoryEntryResponse::from_entry).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch score history");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch score history: {}", e),
                }),
            )
                .into_response()
        }
    }
}
