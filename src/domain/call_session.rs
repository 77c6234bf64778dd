use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{SessionId, SessionStatus};

/// One recorded sales interaction. Created on call start, mutated by every
/// pipeline stage, never deleted by the pipeline itself.
#[derive(Debug, Clone)]
pub struct CallSession {
    pub id: SessionId,
    pub user_id: Uuid,
    pub customer_name: String,
    pub opportunity_name: Option<String>,
    pub status: SessionStatus,
    pub last_error: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CallSession {
    pub fn new(user_id: Uuid, customer_name: String, opportunity_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            user_id,
            customer_name,
            opportunity_name,
            status: SessionStatus::Draft,
            last_error: None,
            submitted_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
