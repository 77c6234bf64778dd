use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::SessionId;

/// Three-band risk classification derived from the 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    Green,
    Yellow,
    Red,
}

impl RiskBand {
    /// Band boundaries are 80 and 60, inclusive on the low end of each band.
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            RiskBand::Green
        } else if score >= 60 {
            RiskBand::Yellow
        } else {
            RiskBand::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Green => "green",
            RiskBand::Yellow => "yellow",
            RiskBand::Red => "red",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Green => "Healthy",
            RiskBand::Yellow => "Caution",
            RiskBand::Red => "At Risk",
        }
    }
}

impl FromStr for RiskBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "green" => Ok(RiskBand::Green),
            "yellow" => Ok(RiskBand::Yellow),
            "red" => Ok(RiskBand::Red),
            _ => Err(format!("Invalid risk band: {}", s)),
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What caused a score recalculation. Recorded on every history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTrigger {
    InitialCalculation,
    ManualCalculation,
    ItemOverride,
}

impl ScoreTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTrigger::InitialCalculation => "initial_calculation",
            ScoreTrigger::ManualCalculation => "manual_calculation",
            ScoreTrigger::ItemOverride => "item_override",
        }
    }
}

impl FromStr for ScoreTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial_calculation" => Ok(ScoreTrigger::InitialCalculation),
            "manual_calculation" => Ok(ScoreTrigger::ManualCalculation),
            "item_override" => Ok(ScoreTrigger::ItemOverride),
            _ => Err(format!("Invalid score trigger: {}", s)),
        }
    }
}

impl fmt::Display for ScoreTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current aggregate score for a session. One row per session, replaced on
/// every recalculation; always derivable from the current verdict set.
#[derive(Debug, Clone)]
pub struct ScoreSnapshot {
    pub session_id: SessionId,
    pub score: u32,
    pub risk_band: RiskBand,
    pub met_count: u32,
    pub total_count: u32,
    pub calculated_at: DateTime<Utc>,
}

/// Immutable audit-trail entry, appended on every recalculation even when
/// the score did not change.
#[derive(Debug, Clone)]
pub struct ScoreHistoryEntry {
    pub id: Uuid,
    pub session_id: SessionId,
    pub score: u32,
    pub risk_band: RiskBand,
    pub met_count: u32,
    pub total_count: u32,
    /// Difference from the previous entry; None for the first entry.
    pub delta: Option<i32>,
    pub trigger: ScoreTrigger,
    pub recorded_at: DateTime<Utc>,
}

impl ScoreHistoryEntry {
    pub fn from_snapshot(
        snapshot: &ScoreSnapshot,
        delta: Option<i32>,
        trigger: ScoreTrigger,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: snapshot.session_id,
            score: snapshot.score,
            risk_band: snapshot.risk_band,
            met_count: snapshot.met_count,
            total_count: snapshot.total_count,
            delta,
            trigger,
            recorded_at: snapshot.calculated_at,
        }
    }
}
