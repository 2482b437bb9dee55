//! Persisted confidence score (the "brain" carried between runs)

use crate::journal::Outcome;
use crate::types::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// The single persisted confidence record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub score: i64,
    pub wins: u32,
    pub losses: u32,
}

/// Owner of the persisted ledger. All mutation goes through [`apply`];
/// the run holds this `&mut`, which is what serializes writers.
///
/// [`apply`]: ConfidenceLedger::apply
pub struct ConfidenceLedger {
    path: PathBuf,
    state: LedgerState,
}

impl ConfidenceLedger {
    /// Load the ledger, starting from zero when no file exists yet.
    /// A file that exists but does not parse is a run-level failure.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let bytes = std::fs::read(&path)?;
            serde_json::from_slice(&bytes).map_err(|e| {
                EngineError::CorruptState(format!("{}: {}", path.display(), e))
            })?
        } else {
            debug!("No ledger at {}, starting fresh", path.display());
            LedgerState::default()
        };
        Ok(Self { path, state })
    }

    pub fn read(&self) -> LedgerState {
        self.state
    }

    /// Apply one graded outcome: adjust the score, bump the matching
    /// counter, persist, and return the new state.
    ///
    /// The in-memory state commits only after the file write succeeds, so a
    /// failed persist leaves `read()` reporting the old state and the caller
    /// can treat the grade as not yet applied.
    pub fn apply(&mut self, delta: i64, outcome: Outcome) -> Result<LedgerState> {
        let mut next = self.state;
        next.score += delta;
        match outcome {
            Outcome::Win => next.wins += 1,
            Outcome::Loss => next.losses += 1,
            Outcome::Pending => {
                return Err(EngineError::CorruptState(
                    "a pending outcome cannot be applied to the ledger".to_string(),
                ))
            }
        }

        self.persist(&next)?;
        self.state = next;
        Ok(next)
    }

    fn persist(&self, state: &LedgerState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| EngineError::CorruptState(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
