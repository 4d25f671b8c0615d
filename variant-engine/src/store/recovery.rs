//! Corruption recovery decisions
//!
//! When a database file neither parses nor repairs, the store never picks a
//! way forward on its own; the caller answers through [`RecoveryPrompt`].

use std::path::{Path, PathBuf};

/// What to do with a database that could not be repaired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryChoice {
    /// Copy the newest valid snapshot over the working file and load it
    RestoreSnapshot,
    /// Continue with an empty store; the broken file is replaced on the next save
    StartEmpty,
    /// Stop, leaving every file as it is
    Abort,
}

/// Asked once per unrecoverable load
pub trait RecoveryPrompt {
    /// `snapshot` is the newest valid snapshot, if there is one
    fn choose(&mut self, corrupted: &Path, snapshot: Option<&Path>) -> RecoveryChoice;
}

/// Prompt that always gives the same answer
#[derive(Debug, Clone, Copy)]
pub struct FixedChoice(pub RecoveryChoice);

impl RecoveryPrompt for FixedChoice {
    fn choose(&mut self, corrupted: &Path, snapshot: Option<&Path>) -> RecoveryChoice {
        tracing::warn!(
            corrupted = %corrupted.display(),
            snapshot = ?snapshot,
            choice = ?self.0,
            "Database unrecoverable, applying preset recovery choice"
        );
        self.0
    }
}

/// How a store came to hold its current content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Parsed as is
    Loaded,
    /// No file yet; starts empty
    Created,
    /// Truncated after the last closing bracket and rewritten
    Repaired { dropped: usize },
    /// Restored from a snapshot into the working file
    Restored { from: PathBuf },
    /// Unrecoverable file, caller chose to start empty
    StartedEmpty,
}

impl LoadOutcome {
    /// Anything other than a clean load or a fresh file
    pub fn needs_attention(&self) -> bool {
        !matches!(self, Self::Loaded | Self::Created)
    }
}
