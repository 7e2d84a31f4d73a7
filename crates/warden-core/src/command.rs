//! The proposed-command model.
//!
//! A [`ProposedCommand`] is what the agent layer hands the pipeline: shell
//! text plus everything a human needs to decide on it. It arrives fully
//! populated (risk, explanation, undo) — the pipeline never computes any of
//! that. Immutable once created; an approval may carry an *edited* copy of
//! the text, which then becomes the text actually executed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{CommandId, RiskLevel};

/// A shell invocation proposed by the agent, awaiting consent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedCommand {
    /// Unique command identifier.
    pub id: CommandId,
    /// The shell text to execute.
    pub text: String,
    /// Externally assigned risk level.
    pub risk: RiskLevel,
    /// Human-readable explanation of what the command does.
    pub explanation: String,
    /// Whether the command destroys or irreversibly alters data.
    pub destructive: bool,
    /// Command that would undo this one, when one exists.
    pub undo_command: Option<String>,
    /// Filesystem paths the command is expected to touch.
    pub affected_paths: Vec<String>,
}

impl ProposedCommand {
    /// Create a command with the given text and risk level.
    #[must_use]
    pub fn new(text: impl Into<String>, risk: RiskLevel) -> Self {
        Self {
            id: CommandId::new(),
            text: text.into(),
            risk,
            explanation: String::new(),
            destructive: risk.is_destructive(),
            undo_command: None,
            affected_paths: Vec::new(),
        }
    }

    /// Attach an explanation.
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    /// Mark the command destructive (or not), overriding the risk default.
    #[must_use]
    pub fn with_destructive(mut self, destructive: bool) -> Self {
        self.destructive = destructive;
        self
    }

    /// Attach an undo command.
    #[must_use]
    pub fn with_undo(mut self, undo: impl Into<String>) -> Self {
        self.undo_command = Some(undo.into());
        self
    }

    /// Attach the list of affected filesystem paths.
    #[must_use]
    pub fn with_affected_paths(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.affected_paths = paths.into_iter().collect();
        self
    }

    /// Whether an undo command is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_command.is_some()
    }
}

impl fmt::Display for ProposedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.risk, self.text)
    }
}
