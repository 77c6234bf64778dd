use std::fmt::Write as _;
use std::sync::Arc;

use serde::Deserialize;

use crate::application::ports::{
    CompletionClient, CompletionError, RepositoryError, TranscriptRepository, VerdictRepository,
};
use crate::domain::{
    criterion_catalog, NewSubQuestionEvaluation, NewVerdict, SessionId, CRITERION_COUNT,
};

const SYSTEM_PROMPT: &str = "You are an expert sales coach who evaluates sales calls \
objectively and provides structured, evidence-grounded feedback. Always respond with \
valid JSON matching the requested schema exactly.";

/// Evaluates a transcript against the ten-criterion catalog in a single
/// batched completion call (one pass over the transcript keeps verdicts
/// consistent and bounds latency versus ten separate calls), then atomically
/// replaces the session's verdict set.
pub struct ChecklistAnalyzer {
    completions: Arc<dyn CompletionClient>,
    transcripts: Arc<dyn TranscriptRepository>,
    verdicts: Arc<dyn VerdictRepository>,
}

impl ChecklistAnalyzer {
    pub fn new(
        completions: Arc<dyn CompletionClient>,
        transcripts: Arc<dyn TranscriptRepository>,
        verdicts: Arc<dyn VerdictRepository>,
    ) -> Self {
        Self {
            completions,
            transcripts,
            verdicts,
        }
    }

    pub async fn analyze(&self, session_id: SessionId) -> Result<(), AnalysisError> {
        let transcript = self
            .transcripts
            .get_for_session(session_id)
            .await?
            .ok_or(AnalysisError::MissingTranscript(session_id))?;

        let prompt = build_analysis_prompt(&transcript.text);
        let raw = self.completions.complete_json(SYSTEM_PROMPT, &prompt).await?;
        let verdicts = parse_analysis_response(&raw)?;

        self.verdicts
            .replace_for_session(session_id, verdicts)
            .await?;

        tracing::info!(
            session_id = %session_id.as_uuid(),
            "Checklist analysis completed, verdict set replaced"
        );
        Ok(())
    }
}

fn build_analysis_prompt(transcript: &str) -> String {
    let mut criteria_block = String::new();
    for criterion in criterion_catalog() {
        let _ = writeln!(
            criteria_block,
            "CRITERION {}: {}\nDefinition: {}\nExpected salesperson behavior: {}",
            criterion.position, criterion.name, criterion.definition, criterion.expected_behavior,
        );
        for question in criterion.sub_questions {
            let _ = writeln!(criteria_block, "  Sub-question {}: {}", question.order, question.text);
        }
        let _ = writeln!(criteria_block);
    }

    format!(
        "Evaluate the sales call transcript below against 10 checklist criteria. For each \
criterion decide whether the salesperson clearly demonstrated the behavior (met = true) \
or not (met = false). Be objective and evidence-based: only mark a criterion met when \
the transcript contains clear evidence. For every sub-question report whether evidence \
was found, quote the supporting passage or use null, and explain your reasoning briefly.

=== CHECKLIST CRITERIA ===
{criteria_block}
=== TRANSCRIPT ===
{transcript}

=== OUTPUT FORMAT ===
Return ONLY a JSON object of this exact shape, with one entry per criterion in order \
(positions 1 through 10) and one sub-question entry per sub-question listed above:
{{
  \"criteria\": [
    {{
      \"position\": 1,
      \"met\": true,
      \"rationale\": \"1-2 sentences explaining the verdict\",
      \"sub_questions\": [
        {{\"evidence_found\": true, \"evidence\": \"quoted passage or null\", \"reasoning\": \"short explanation\", \"confidence\": 0.9}}
      ]
    }}
  ]
}}"
    )
}

#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    criteria: Vec<CriterionEntry>,
}

#[derive(Debug, Deserialize)]
struct CriterionEntry {
    position: u8,
    met: bool,
    rationale: String,
    #[serde(default)]
    sub_questions: Vec<SubQuestionEntry>,
}

#[derive(Debug, Deserialize)]
struct SubQuestionEntry {
    evidence_found: bool,
    evidence: Option<String>,
    reasoning: String,
    confidence: Option<f64>,
}

/// Strict schema validation: any missing, duplicate, or malformed entry
/// fails the whole analysis rather than being coerced to a default verdict.
fn parse_analysis_response(raw: &str) -> Result<Vec<NewVerdict>, AnalysisError> {
    let payload: AnalysisPayload =
        serde_json::from_str(raw).map_err(|e| AnalysisError::Parse(e.to_string()))?;

    if payload.criteria.len() != CRITERION_COUNT {
        return Err(AnalysisError::Parse(format!(
            "expected {} criteria entries, got {}",
            CRITERION_COUNT,
            payload.criteria.len()
        )));
    }

    let catalog = criterion_catalog();
    let mut seen = [false; CRITERION_COUNT];
    let mut verdicts = Vec::with_capacity(CRITERION_COUNT);

    for entry in payload.criteria {
        let idx = match entry.position.checked_sub(1) {
            Some(i) if (i as usize) < CRITERION_COUNT => i as usize,
            _ => {
                return Err(AnalysisError::Parse(format!(
                    "criterion position {} out of range",
                    entry.position
                )));
            }
        };
        if seen[idx] {
            return Err(AnalysisError::Parse(format!(
                "duplicate entry for criterion position {}",
                entry.position
            )));
        }
        seen[idx] = true;

        let expected_questions = catalog[idx].sub_questions.len();
        if entry.sub_questions.len() != expected_questions {
            return Err(AnalysisError::Parse(format!(
                "criterion {} expected {} sub-question entries, got {}",
                entry.position,
                expected_questions,
                entry.sub_questions.len()
            )));
        }

        let sub_questions = entry
            .sub_questions
            .into_iter()
            .enumerate()
            .map(|(q_idx, q)| NewSubQuestionEvaluation {
                question_order: (q_idx + 1) as u8,
                evidence_found: q.evidence_found,
                evidence_text: q.evidence,
                reasoning: q.reasoning,
                confidence: q.confidence,
            })
            .collect();

        verdicts.push(NewVerdict {
            position: entry.position,
            ai_met: entry.met,
            ai_rationale: entry.rationale,
            sub_questions,
        });
    }

    verdicts.sort_by_key(|v| v.position);
    Ok(verdicts)
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no transcript for session {}; transcribe first", .0.as_uuid())]
    MissingTranscript(SessionId),
    #[error("analysis response malformed: {0}")]
    Parse(String),
    #[error("analysis service: {0}")]
    Service(#[from] CompletionError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::criterion_at;

    fn payload_with_criteria(count: usize) -> String {
        let entries: Vec<String> = (1..=count)
            .map(|position| {
                let questions = criterion_at(position.min(CRITERION_COUNT) as u8)
                    .map(|c| c.sub_questions.len())
                    .unwrap_or(2);
                let sub_entries: Vec<String> = (0..questions)
                    .map(|_| {
                        r#"{"evidence_found": false, "evidence": null, "reasoning": "none", "confidence": 0.5}"#
                            .to_string()
                    })
                    .collect();
                format!(
                    r#"{{"position": {}, "met": false, "rationale": "no evidence", "sub_questions": [{}]}}"#,
                    position,
                    sub_entries.join(",")
                )
            })
            .collect();
        format!(r#"{{"criteria": [{}]}}"#, entries.join(","))
    }

    #[test]
    fn full_payload_parses_into_ten_ordered_verdicts() {
        let verdicts = parse_analysis_response(&payload_with_criteria(10)).unwrap();
        assert_eq!(verdicts.len(), CRITERION_COUNT);
        for (idx, verdict) in verdicts.iter().enumerate() {
            assert_eq!(verdict.position as usize, idx + 1);
        }
    }

    #[test]
    fn nine_of_ten_criteria_is_a_parse_error() {
        let result = parse_analysis_response(&payload_with_criteria(9));
        assert!(matches!(result, Err(AnalysisError::Parse(_))));
    }

    #[test]
    fn non_json_response_is_a_parse_error() {
        let result = parse_analysis_response("I could not evaluate this call.");
        assert!(matches!(result, Err(AnalysisError::Parse(_))));
    }

    #[test]
    fn duplicate_positions_are_rejected() {
        let raw = payload_with_criteria(10).replacen(r#""position": 2"#, r#""position": 1"#, 1);
        let result = parse_analysis_response(&raw);
        assert!(matches!(result, Err(AnalysisError::Parse(_))));
    }

    #[test]
    fn wrong_sub_question_count_is_rejected() {
        // Criterion 1 has three sub-questions; give it one.
        let raw = format!(
            r#"{{"criteria": [{}]}}"#,
            (1..=10)
                .map(|position| {
                    let questions = if position == 1 {
                        1
                    } else {
                        criterion_at(position as u8).unwrap().sub_questions.len()
                    };
                    let subs: Vec<String> = (0..questions)
                        .map(|_| r#"{"evidence_found": true, "evidence": "q", "reasoning": "r", "confidence": null}"#.to_string())
                        .collect();
                    format!(
                        r#"{{"position": {}, "met": true, "rationale": "ok", "sub_questions": [{}]}}"#,
                        position,
                        subs.join(",")
                    )
                })
                .collect::<Vec<_>>()
                .join(",")
        );
        let result = parse_analysis_response(&raw);
        assert!(matches!(result, Err(AnalysisError::Parse(_))));
    }

    #[test]
    fn prompt_names_every_criterion() {
        let prompt = build_analysis_prompt("hello transcript");
        for criterion in criterion_catalog() {
            assert!(prompt.contains(criterion.name));
        }
        assert!(prompt.contains("hello transcript"));
    }
}
