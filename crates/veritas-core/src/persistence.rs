use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::{seed::seed_cases, store::KvStore, types::Case};

/// Reads and writes the whole case list as one JSON blob under a single key.
#[derive(Clone)]
pub struct CaseStore {
    store: Arc<dyn KvStore>,
    key: String,
}

impl CaseStore {
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the case list. Absent, unreadable or unparsable data yields the
    /// seed dataset; this never fails.
    pub fn load(&self) -> Vec<Case> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(key = %self.key, "no saved cases, using seed dataset");
                return seed_cases();
            }
            Err(e) => {
                warn!(key = %self.key, "failed to read saved cases: {e:#}");
                return seed_cases();
            }
        };

        match serde_json::from_str::<Vec<Case>>(&raw) {
            Ok(cases) => {
                debug!(key = %self.key, count = cases.len(), "loaded saved cases");
                cases
            }
            Err(e) => {
                warn!(key = %self.key, "failed to parse saved cases: {e}");
                seed_cases()
            }
        }
    }

    /// Serialize and write the full list. An empty list is not written.
    pub fn save(&self, cases: &[Case]) -> Result<()> {
        if cases.is_empty() {
            return Ok(());
        }
        let json = serde_json::to_string(cases).context("serialize cases")?;
        self.store.set(&self.key, &json)?;
        debug!(key = %self.key, count = cases.len(), bytes = json.len(), "saved cases");
        Ok(())
    }

    /// Drop the stored blob; the next `load` returns the seed dataset.
    pub fn reset(&self) -> Result<()> {
        self.store.clear(&self.key)
    }

    /// Raw stored blob, if any.
    pub fn raw(&self) -> Result<Option<String>> {
        self.store.get(&self.key)
    }
}
