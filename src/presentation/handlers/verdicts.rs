use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::services::PipelineError;
use crate::domain::{criterion_at, CriterionVerdict, SubQuestionEvaluation};
use crate::presentation::state::AppState;

use super::sessions::{parse_session_id, ErrorResponse};

#[derive(Serialize)]
pub struct SubQuestionResponse {
    pub question_order: u8,
    pub question: String,
    pub evidence_found: bool,
    pub evidence_text: Option<String>,
    pub reasoning: String,
    pub confidence: Option<f64>,
}

#[derive(Serialize)]
pub struct VerdictResponse {
    pub position: u8,
    pub criterion: String,
    pub ai_met: bool,
    pub ai_rationale: String,
    pub override_met: Option<bool>,
    pub effective_met: bool,
    pub points: u32,
    pub changed: bool,
    pub changed_at: Option<String>,
    pub sub_questions: Vec<SubQuestionResponse>,
}

impl VerdictResponse {
    fn build(verdict: &CriterionVerdict, sub_questions: Vec<SubQuestionResponse>) -> Self {
        let criterion = criterion_at(verdict.position)
            .map(|c| c.name.to_string())
            .unwrap_or_default();
        Self {
            position: verdict.position,
            criterion,
            ai_met: verdict.ai_met,
            ai_rationale: verdict.ai_rationale.clone(),
            override_met: verdict.override_met,
            effective_met: verdict.effective_met(),
            points: verdict.points(),
            changed: verdict.changed,
            changed_at: verdict.changed_at.map(|t| t.to_rfc3339()),
            sub_questions,
        }
    }
}

fn sub_question_response(
    verdict: &CriterionVerdict,
    evaluation: &SubQuestionEvaluation,
) -> SubQuestionResponse {
    let question = criterion_at(verdict.position)
        .and_then(|c| {
            c.sub_questions
                .iter()
                .find(|q| q.order == evaluation.question_order)
        })
        .map(|q| q.text.to_string())
        .unwrap_or_default();
    SubQuestionResponse {
        question_order: evaluation.question_order,
        question,
        evidence_found: evaluation.evidence_found,
        evidence_text: evaluation.evidence_text.clone(),
        reasoning: evaluation.reasoning.clone(),
        confidence: evaluation.confidence,
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_verdicts_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    let verdicts = match state.verdicts.list_for_session(id).await {
        Ok(verdicts) => verdicts,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch verdicts");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch verdicts: {}", e),
                }),
            )
                .into_response();
        }
    };

    let sub_questions = match state.verdicts.sub_questions_for_session(id).await {
        Ok(subs) => subs,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch sub-question evaluations");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch verdicts: {}", e),
                }),
            )
                .into_response();
        }
    };

    let mut by_verdict: HashMap<_, Vec<&SubQuestionEvaluation>> = HashMap::new();
    for evaluation in &sub_questions {
        by_verdict
            .entry(evaluation.verdict_id)
            .or_default()
            .push(evaluation);
    }

    let body: Vec<VerdictResponse> = verdicts
        .iter()
        .map(|verdict| {
            let subs = by_verdict
                .get(&verdict.id)
                .map(|evaluations| {
                    evaluations
                        .iter()
                        .map(|e| sub_question_response(verdict, e))
                        .collect()
                })
                .unwrap_or_default();
            VerdictResponse::build(verdict, subs)
        })
        .collect();

    (StatusCode::OK, Json(body)).into_response()
}

#[derive(Deserialize)]
pub struct OverrideRequest {
    pub met: bool,
}

/// Records a reviewer correction on one criterion. The score reflects the
/// override immediately when one has already been calculated.
#[tracing::instrument(skip(state, request))]
pub async fn override_verdict_handler(
    State(state): State<AppState>,
    Path((session_id, position)): Path<(String, u8)>,
    Json(request): Json<OverrideRequest>,
) -> impl IntoResponse {
    let id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(reply) => return reply.into_response(),
    };

    match state.pipeline.override_verdict(id, position, request.met).await {
        Ok(verdict) => {
            (StatusCode::OK, Json(VerdictResponse::build(&verdict, Vec::new()))).into_response()
        }
        Err(e @ PipelineError::InvalidPosition(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(PipelineError::SessionNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session not found: {}", session_id),
            }),
        )
            .into_response(),
        Err(PipelineError::Repository(
            crate::application::ports::RepositoryError::NotFound(message),
        )) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Not found: {}", message),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Verdict override failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Override failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}
