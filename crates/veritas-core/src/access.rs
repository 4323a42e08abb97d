use tracing::{info, warn};

use crate::{
    error::{Result, VeritasError},
    types::Case,
};

/// Per-view lock in front of a case detail view.
///
/// Cosmetic: the bypass code opens every case and there is no lockout.
#[derive(Debug, Clone)]
pub struct AccessGate {
    bypass_code: String,
    locked: bool,
    error: Option<String>,
}

impl AccessGate {
    pub fn new(bypass_code: impl Into<String>) -> Self {
        Self {
            bypass_code: bypass_code.into(),
            locked: true,
            error: None,
        }
    }

    /// (Re-)entering the detail view always locks it again.
    pub fn enter(&mut self) {
        self.locked = true;
        self.error = None;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Message from the last failed attempt, cleared on success or re-entry.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn unlock(&mut self, case: &Case, code: &str) -> Result<()> {
        if code_matches(case, code, &self.bypass_code) {
            self.locked = false;
            self.error = None;
            info!(case_id = %case.id, "case view unlocked");
            Ok(())
        } else {
            let err = VeritasError::AuthMismatch;
            self.error = Some(err.to_string());
            warn!(case_id = %case.id, "case view unlock rejected");
            Err(err)
        }
    }
}

/// True when `code` equals the case's stored code or the bypass code.
pub fn code_matches(case: &Case, code: &str, bypass_code: &str) -> bool {
    code == case.access_code || (!bypass_code.is_empty() && code == bypass_code)
}
