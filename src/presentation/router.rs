use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    calculate_score_handler, create_session_handler, get_audio_handler, get_coaching_handler,
    get_score_handler, get_session_handler, get_transcript_handler, health_handler,
    list_sessions_handler, list_verdicts_handler, override_verdict_handler,
    regenerate_coaching_handler, request_transcription_handler, score_history_handler,
    submit_session_handler, upload_audio_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/v1/sessions",
            post(create_session_handler).get(list_sessions_handler),
        )
        .route("/api/v1/sessions/{id}", get(get_session_handler))
        .route("/api/v1/sessions/{id}/submit", post(submit_session_handler))
        .route(
            "/api/v1/sessions/{id}/audio",
            post(upload_audio_handler).get(get_audio_handler),
        )
        .route(
            "/api/v1/sessions/{id}/transcribe",
            post(request_transcription_handler),
        )
        .route(
            "/api/v1/sessions/{id}/transcript",
            get(get_transcript_handler),
        )
        .route("/api/v1/sessions/{id}/verdicts", get(list_verdicts_handler))
        .route(
            "/api/v1/sessions/{id}/verdicts/{position}",
            patch(override_verdict_handler),
        )
        .route(
            "/api/v1/sessions/{id}/score/calculate",
            post(calculate_score_handler),
        )
        .route("/api/v1/sessions/{id}/score", get(get_score_handler))
        .route(
            "/api/v1/sessions/{id}/score/history",
            get(score_history_handler),
        )
        .route("/api/v1/sessions/{id}/coaching", get(get_coaching_handler))
        .route(
            "/api/v1/sessions/{id}/coaching/regenerate",
            post(regenerate_coaching_handler),
        )
        // Room above the intake cap so the multipart framing fits; the
        // intake service enforces the real limit.
        .layer(DefaultBodyLimit::max(max_upload_bytes + 1024 * 1024))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
