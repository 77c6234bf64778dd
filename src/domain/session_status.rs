use std::fmt;
use std::str::FromStr;

/// Lifecycle of a call session as it moves through the pipeline.
///
/// `Processing` and `Analyzing` double as the in-flight marker: a session in
/// either state has a background run working on it and refuses new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    Draft,
    Uploading,
    Processing,
    Analyzing,
    Scoring,
    PendingReview,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Draft => "draft",
            SessionStatus::Uploading => "uploading",
            SessionStatus::Processing => "processing",
            SessionStatus::Analyzing => "analyzing",
            SessionStatus::Scoring => "scoring",
            SessionStatus::PendingReview => "pending_review",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    /// A pipeline run is currently working on this session.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SessionStatus::Processing | SessionStatus::Analyzing)
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(SessionStatus::Draft),
            "uploading" => Ok(SessionStatus::Uploading),
            "processing" => Ok(SessionStatus::Processing),
            "analyzing" => Ok(SessionStatus::Analyzing),
            "scoring" => Ok(SessionStatus::Scoring),
            "pending_review" => Ok(SessionStatus::PendingReview),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            _ => Err(format!("Invalid session status: {}", s)),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
