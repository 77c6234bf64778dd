use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::services::IntakeError;
use crate::domain::AudioReference;
use crate::presentation::state::AppState;

use super::sessions::{parse_session_id, ErrorResponse};

#[derive(Serialize)]
pub struct AudioResponse {
    pub id: String,
    pub session_id: String,
    pub filename: String,
    pub storage_kind: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub duration_seconds: Option<f64>,
    pub created_at: String,
}

impl AudioResponse {
    fn from_reference(reference: &AudioReference) -> Self {
        Self {
            id: reference.id.as_uuid().to_string(),
            session_id: reference.session_id.as_uuid().to_string(),
            filename: reference.filename.clone(),
            storage_kind: reference.storage_kind.as_str().to_string(),
            size_bytes: reference.size_bytes,
            mime_type: reference.mime_type.clone(),
            duration_seconds: reference.duration_seconds,
            created_at: reference.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub audio: AudioResponse,
    pub reused_existing: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub reprocess: bool,
}

/// Accepts the call recording and kicks off transcription + analysis in the
/// background. `?reprocess=true` re-runs the pipeline against already
/// uploaded audio instead of rejecting the duplicate.
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_audio_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    let field = match multipart.next_field().await {
        Ok(Some(f)) => f,
        Ok(None) => {
            tracing::warn!("Audio upload with no file");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "No file uploaded".to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read multipart");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to read multipart: {}", e),
                }),
            )
                .into_response();
        }
    };

    let filename = field.file_name().unwrap_or("recording.webm").to_string();
    let mime_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = match field.bytes().await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read file bytes");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to read file: {}", e),
                }),
            )
                .into_response();
        }
    };

    let outcome = match state
        .intake
        .receive(id, &filename, &mime_type, data, query.reprocess)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return intake_error_response(e),
    };

    let enqueue = if outcome.reused_existing {
        state.pipeline.request_processing(id).await
    } else {
        state.pipeline.enqueue_processing(id).await
    };
    if let Err(e) = enqueue {
        return pipeline_enqueue_error_response(e);
    }

    tracing::info!(
        session_id = %id.as_uuid(),
        filename = %outcome.reference.filename,
        "Audio accepted, pipeline enqueued"
    );
    (
        StatusCode::ACCEPTED,
        Json(UploadResponse {
            audio: AudioResponse::from_reference(&outcome.reference),
            reused_existing: outcome.reused_existing,
            message: "Audio accepted, transcription started".to_string(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn get_audio_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    match state.audio.get_for_session(id).await {
        Ok(Some(reference)) => (
            StatusCode::OK,
            Json(AudioResponse::from_reference(&reference)),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No audio uploaded for session: {}", session_id),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch audio reference");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch audio: {}", e),
                }),
            )
                .into_response()
        }
    }
}

fn intake_error_response(e: IntakeError) -> axum::response::Response {
    let (status, message) = match &e {
        IntakeError::UnsupportedMediaType(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string()),
        IntakeError::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()),
        IntakeError::Conflict(_) => (StatusCode::CONFLICT, e.to_string()),
        IntakeError::SessionNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        IntakeError::Storage(_) | IntakeError::Repository(_) => {
            tracing::error!(error = %e, "Audio intake failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Intake failed: {}", e),
            )
        }
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}

fn pipeline_enqueue_error_response(
    e: crate::application::services::PipelineError,
) -> axum::response::Response {
    use crate::application::services::PipelineError;
    let (status, message) = match &e {
        PipelineError::Conflict(_) => (StatusCode::CONFLICT, e.to_string()),
        PipelineError::QueueUnavailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Pipeline queue full or worker unavailable".to_string(),
        ),
        _ => {
            tracing::error!(error = %e, "Failed to enqueue pipeline run");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to start pipeline: {}", e),
            )
        }
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}
