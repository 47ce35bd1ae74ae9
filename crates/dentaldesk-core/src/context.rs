//! Per-request context.

use std::fmt;

/// Who is making a call, threaded explicitly through every scheduler and
/// chart operation instead of living in a global session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Staff member or system component acting (e.g., "front-desk")
    pub actor: String,
    /// Correlates log lines of one request
    pub request_id: String,
}

impl RequestContext {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Context for internal jobs and tests.
    pub fn system() -> Self {
        Self::new("system")
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.actor, self.request_id)
    }
}
