use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{CompletionClient, CompletionError};
use crate::domain::{CoachingContent, CoachingPoint, Criterion, RiskBand};

/// One failed criterion with the analyzer's rationale for the failure.
#[derive(Debug, Clone)]
pub struct Gap {
    pub criterion: &'static Criterion,
    pub rationale: String,
}

/// Everything a strategy needs to write coaching content for a session.
#[derive(Debug, Clone)]
pub struct GapReport {
    pub score: u32,
    pub risk_band: RiskBand,
    pub customer_name: String,
    /// Criteria that were effectively met, for the strengths section.
    pub met: Vec<&'static Criterion>,
    pub gaps: Vec<Gap>,
}

/// Coaching text generation behind one output contract. The deterministic
/// template and the LLM variant are interchangeable; configuration picks one
/// explicitly, never a silent runtime fallback between them.
#[async_trait]
pub trait CoachingStrategy: Send + Sync {
    async fn generate(&self, report: &GapReport) -> Result<CoachingContent, CoachingStrategyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CoachingStrategyError {
    #[error("completion: {0}")]
    Completion(#[from] CompletionError),
    #[error("coaching response malformed: {0}")]
    Parse(String),
}

/// Deterministic strategy: per-criterion advice from a static lookup table,
/// no external calls.
pub struct TemplateCoach;

struct TemplateAdvice {
    explanation: &'static str,
    action_item: &'static str,
}

fn template_advice(criterion: &Criterion) -> TemplateAdvice {
    match criterion.position {
        1 => TemplateAdvice {
            explanation: "Without a confirmed trigger event the deal has no reason to happen now. Ask what changed in the customer's world and what result they expect, in numbers.",
            action_item: "Open your next call by asking what event started this initiative and what measurable outcome is expected.",
        },
        2 => TemplateAdvice {
            explanation: "You did not confirm that solving this problem is a real priority. Initiatives without a deadline and an owner get deferred.",
            action_item: "Ask where this initiative ranks against the customer's other projects and what happens if it slips a quarter.",
        },
        3 => TemplateAdvice {
            explanation: "What, how much, and when was left open. Vague scope at this stage turns into a stalled procurement later.",
            action_item: "Pin down the intended purchase, its size, and the buying window before discussing anything else.",
        },
        4 => TemplateAdvice {
            explanation: "The people who influence this decision were not mapped. Your contact is rarely the only voice that matters.",
            action_item: "List who will weigh in on the decision and secure a conversation with the key influencer.",
        },
        5 => TemplateAdvice {
            explanation: "You stayed at the business-case level. Understanding what the outcome means personally for each influencer is what moves deals.",
            action_item: "Ask one influencer what a successful outcome would mean for them personally.",
        },
        6 => TemplateAdvice {
            explanation: "No internal champion surfaced on this call. Without a mentor you only see what the customer chooses to show you.",
            action_item: "Identify who inside the account benefits most from your success and test whether they will share inside information.",
        },
        7 => TemplateAdvice {
            explanation: "The decision process was not mapped. Deals die in approval steps you did not know existed.",
            action_item: "Walk the customer through every step from evaluation to signature and note who owns each one.",
        },
        8 => TemplateAdvice {
            explanation: "Fit was asserted rather than confirmed. Fit claimed by the seller is an opinion; fit confirmed by the buyer is progress.",
            action_item: "Have the customer state their requirements and confirm, in their words, how the solution meets them.",
        },
        9 => TemplateAdvice {
            explanation: "Alternatives were not discussed. The most common competitor is no decision at all, and you cannot beat what you have not named.",
            action_item: "Ask directly what other options are being evaluated, including doing nothing.",
        },
        _ => TemplateAdvice {
            explanation: "You do not know where you rank against the alternatives. If you do not know your ranking, assume you are second.",
            action_item: "Ask the customer: if you had to decide today, who would you pick and why?",
        },
    }
}

#[async_trait]
impl CoachingStrategy for TemplateCoach {
    async fn generate(&self, report: &GapReport) -> Result<CoachingContent, CoachingStrategyError> {
        let tone = match report.risk_band {
            RiskBand::Green => "Strong call overall, with a few areas left to close.",
            RiskBand::Yellow => "Good effort on this call, with some areas to strengthen.",
            RiskBand::Red => "This call has significant opportunities for improvement.",
        };

        let mut feedback_text = format!(
            "{} Your score was {}/100 for the call with {}.",
            tone, report.score, report.customer_name
        );
        if !report.met.is_empty() {
            let names: Vec<&str> = report.met.iter().map(|c| c.name).collect();
            let _ = write!(feedback_text, " You validated: {}.", names.join(", "));
        }
        let gap_names: Vec<&str> = report.gaps.iter().map(|g| g.criterion.name).collect();
        let _ = write!(
            feedback_text,
            " Focus next on: {}. Pick one gap and address it deliberately on your next call.",
            gap_names.join(", ")
        );

        let strengths = report
            .met
            .iter()
            .take(3)
            .map(|criterion| CoachingPoint {
                point: criterion.name.to_string(),
                explanation: criterion.expected_behavior.to_string(),
            })
            .collect();

        let improvement_areas = report
            .gaps
            .iter()
            .map(|gap| CoachingPoint {
                point: gap.criterion.name.to_string(),
                explanation: template_advice(gap.criterion).explanation.to_string(),
            })
            .collect();

        let action_items = report
            .gaps
            .iter()
            .take(3)
            .map(|gap| template_advice(gap.criterion).action_item.to_string())
            .collect();

        Ok(CoachingContent {
            feedback_text,
            strengths,
            improvement_areas,
            action_items,
        })
    }
}

const COACH_SYSTEM_PROMPT: &str = "You are an expert B2B sales coach. Provide constructive, \
personalized feedback that helps sales reps improve. Always respond with valid JSON.";

/// LLM strategy: one completion call fed every gap's definition, coaching
/// area, and the analyzer's rationale.
pub struct LlmCoach {
    completions: Arc<dyn CompletionClient>,
}

impl LlmCoach {
    pub fn new(completions: Arc<dyn CompletionClient>) -> Self {
        Self { completions }
    }
}

#[derive(Debug, Deserialize)]
struct CoachPayload {
    feedback_text: String,
    #[serde(default)]
    strengths: Vec<CoachingPoint>,
    improvement_areas: Vec<CoachingPoint>,
    #[serde(default)]
    action_items: Vec<String>,
}

#[async_trait]
impl CoachingStrategy for LlmCoach {
    async fn generate(&self, report: &GapReport) -> Result<CoachingContent, CoachingStrategyError> {
        let mut gaps_block = String::new();
        for gap in &report.gaps {
            let _ = writeln!(
                gaps_block,
                "- {} ({}): {}\n  Why it was missed: {}\n  Key reminder: {}",
                gap.criterion.name,
                gap.criterion.coaching_area,
                gap.criterion.definition,
                gap.rationale,
                gap.criterion.key_reminder,
            );
        }
        let met_names: Vec<&str> = report.met.iter().map(|c| c.name).collect();

        let prompt = format!(
            "A sales representative scored {}/100 ({} - {}) on a call with {}.\n\
Validated criteria: {}.\n\nMissed criteria:\n{}\n\
Write supportive, specific coaching in JSON:\n\
{{\n  \"feedback_text\": \"200-300 word personalized summary. Be encouraging but honest, \
address the rep as 'you', end with one next-call focus directive.\",\n  \
\"strengths\": [{{\"point\": \"title\", \"explanation\": \"why it matters\"}}],\n  \
\"improvement_areas\": [{{\"point\": \"missed criterion name\", \"explanation\": \"a supportive, \
specific paragraph for this gap\"}}],\n  \
\"action_items\": [\"specific task for the next call\"]\n}}\n\
Include one improvement_areas entry per missed criterion. Return ONLY valid JSON.",
            report.score,
            report.risk_band,
            report.risk_band.label(),
            report.customer_name,
            if met_names.is_empty() {
                "none".to_string()
            } else {
                met_names.join(", ")
            },
            gaps_block,
        );

        let raw = self
            .completions
            .complete_json(COACH_SYSTEM_PROMPT, &prompt)
            .await?;
        let payload: CoachPayload =
            serde_json::from_str(&raw).map_err(|e| CoachingStrategyError::Parse(e.to_string()))?;

        if payload.improvement_areas.len() != report.gaps.len() {
            return Err(CoachingStrategyError::Parse(format!(
                "expected {} improvement areas, got {}",
                report.gaps.len(),
                payload.improvement_areas.len()
            )));
        }

        Ok(CoachingContent {
            feedback_text: payload.feedback_text,
            strengths: payload.strengths,
            improvement_areas: payload.improvement_areas,
            action_items: payload.action_items,
        })
    }
}
