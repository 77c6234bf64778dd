use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerdictId(Uuid);

impl VerdictId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for VerdictId {
    fn default() -> Self {
        Self::new()
    }
}

/// AI determination for one criterion on one call, optionally corrected by a
/// human reviewer. Exactly ten exist per session once analysis has run.
#[derive(Debug, Clone)]
pub struct CriterionVerdict {
    pub id: VerdictId,
    pub session_id: SessionId,
    /// 1-based criterion position in the static catalog.
    pub position: u8,
    pub ai_met: bool,
    pub ai_rationale: String,
    pub override_met: Option<bool>,
    pub changed: bool,
    pub changed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CriterionVerdict {
    /// Human override wins over the AI verdict when present.
    pub fn effective_met(&self) -> bool {
        self.override_met.unwrap_or(self.ai_met)
    }

    /// 10 points for a met criterion, 0 otherwise.
    pub fn points(&self) -> u32 {
        if self.effective_met() { 10 } else { 0 }
    }
}

/// Per-sub-question evidence gathered by the analyzer. Immutable; a
/// re-analysis replaces the whole set with its parent verdict.
#[derive(Debug, Clone)]
pub struct SubQuestionEvaluation {
    pub id: Uuid,
    pub verdict_id: VerdictId,
    /// 1-based order of the sub-question within its criterion.
    pub question_order: u8,
    pub evidence_found: bool,
    pub evidence_text: Option<String>,
    pub reasoning: String,
    pub confidence: Option<f64>,
}

/// One analyzer result awaiting persistence, before ids are assigned.
#[derive(Debug, Clone)]
pub struct NewVerdict {
    pub position: u8,
    pub ai_met: bool,
    pub ai_rationale: String,
    pub sub_questions: Vec<NewSubQuestionEvaluation>,
}

#[derive(Debug, Clone)]
pub struct NewSubQuestionEvaluation {
    pub question_order: u8,
    pub evidence_found: bool,
    pub evidence_text: Option<String>,
    pub reasoning: String,
    pub confidence: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(ai_met: bool, override_met: Option<bool>) -> CriterionVerdict {
        CriterionVerdict {
            id: VerdictId::new(),
            session_id: SessionId::new(),
            position: 1,
            ai_met,
            ai_rationale: "rationale".to_string(),
            override_met,
            changed: override_met.is_some(),
            changed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn override_takes_precedence_over_ai_verdict() {
        assert!(verdict(false, Some(true)).effective_met());
        assert!(!verdict(true, Some(false)).effective_met());
        assert!(verdict(true, None).effective_met());
    }

    #[test]
    fn points_follow_effective_verdict() {
        assert_eq!(verdict(true, None).points(), 10);
        assert_eq!(verdict(false, None).points(), 0);
        assert_eq!(verdict(false, Some(true)).points(), 10);
    }
}
