//! Identifiers, timestamps, and the risk scale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Unique identifier for an approval request.
    ApprovalId,
    "req"
);
id_type!(
    /// Unique identifier for a proposed command.
    CommandId,
    "cmd"
);
id_type!(
    /// Unique identifier for a plan.
    PlanId,
    "plan"
);
id_type!(
    /// Unique identifier for a plan step.
    StepId,
    "step"
);
id_type!(
    /// Unique identifier for an execution.
    ExecutionId,
    "exec"
);
id_type!(
    /// Unique identifier for a conversation.
    ConversationId,
    "conv"
);

/// A point in time, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// The current time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Check whether this timestamp lies in the future.
    #[must_use]
    pub fn is_future(&self) -> bool {
        self.0 > Utc::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Severity of a proposed action.
///
/// Assigned upstream by whatever classifies commands; the pipeline only
/// consumes it. Ordered: `Safe < Low < Medium < High < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// No meaningful side effects (e.g. listing files).
    Safe,
    /// Reversible, low-impact changes.
    Low,
    /// Changes worth a second look before running.
    Medium,
    /// Destructive or hard-to-reverse changes.
    High,
    /// Potentially catastrophic (e.g. wiping data, privilege changes).
    Critical,
}

impl RiskLevel {
    /// Short lowercase label, matching the wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Whether an action at this level is destructive by default.
    #[must_use]
    pub fn is_destructive(self) -> bool {
        self >= Self::High
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ApprovalId::new(), ApprovalId::new());
        assert_ne!(ExecutionId::new(), ExecutionId::new());
    }

    #[test]
    fn test_id_display_prefix() {
        assert!(ApprovalId::new().to_string().starts_with("req:"));
        assert!(PlanId::new().to_string().starts_with("plan:"));
        assert!(ExecutionId::new().to_string().starts_with("exec:"));
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Safe < RiskLevel::Low);
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_risk_level_serde_is_snake_case() {
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let back: RiskLevel = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(back, RiskLevel::Critical);
    }

    #[test]
    fn test_timestamp_not_future() {
        assert!(!Timestamp::now().is_future());
    }
}
