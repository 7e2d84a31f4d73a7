//! Approval request and decision types.

use serde::{Deserialize, Serialize};
use std::fmt;
use warden_core::{ApprovalId, ConversationId, PlanId, ProposedCommand, RiskLevel, Timestamp};

/// What a request asks consent for: one command, or a whole plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ApprovalSubject {
    /// A single shell command.
    Command {
        /// The proposed command, as submitted.
        command: ProposedCommand,
    },
    /// A plan, referenced by id. Plans are approved as a unit; the plan body
    /// lives with whoever registered it (the kernel), not the gate.
    Plan {
        /// The plan being approved.
        plan_id: PlanId,
        /// Plan title, carried for display.
        title: String,
    },
}

/// Lifecycle of an approval request. A one-way latch out of `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting a human decision.
    Pending,
    /// Approved; execution was (or is being) triggered.
    Approved,
    /// Rejected; nothing executed.
    Rejected,
}

impl ApprovalStatus {
    /// Whether the request has been decided.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// The human decision on a pending approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum Decision {
    /// Approve. If `edited_text` is present it replaces the command text
    /// *before* execution and is the text actually run.
    Approve {
        /// Replacement command text, if the human edited the proposal.
        edited_text: Option<String>,
    },
    /// Reject; the request becomes terminal with no execution.
    Reject,
}

/// The unit of human consent gating execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Unique request identifier.
    pub id: ApprovalId,
    /// Conversation this request belongs to.
    pub conversation_id: ConversationId,
    /// What is being approved.
    pub subject: ApprovalSubject,
    /// Risk level of the subject (mirrors the command, or aggregates the plan).
    pub risk: RiskLevel,
    /// Current status.
    pub status: ApprovalStatus,
    /// When the request was created.
    pub created_at: Timestamp,
}

impl ApprovalRequest {
    /// Create a pending request for a single command.
    #[must_use]
    pub fn for_command(conversation_id: ConversationId, command: ProposedCommand) -> Self {
        let risk = command.risk;
        Self {
            id: ApprovalId::new(),
            conversation_id,
            subject: ApprovalSubject::Command { command },
            risk,
            status: ApprovalStatus::Pending,
            created_at: Timestamp::now(),
        }
    }

    /// Create a pending request for a plan.
    #[must_use]
    pub fn for_plan(
        conversation_id: ConversationId,
        plan_id: PlanId,
        title: impl Into<String>,
        risk: RiskLevel,
    ) -> Self {
        Self {
            id: ApprovalId::new(),
            conversation_id,
            subject: ApprovalSubject::Plan {
                plan_id,
                title: title.into(),
            },
            risk,
            status: ApprovalStatus::Pending,
            created_at: Timestamp::now(),
        }
    }

    /// The plan id, when this request covers a plan.
    #[must_use]
    pub fn plan_id(&self) -> Option<PlanId> {
        match &self.subject {
            ApprovalSubject::Plan { plan_id, .. } => Some(*plan_id),
            ApprovalSubject::Command { .. } => None,
        }
    }
}

impl fmt::Display for ApprovalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            ApprovalSubject::Command { command } => {
                write!(f, "{} [{}] {}", self.id, self.risk, command.text)
            },
            ApprovalSubject::Plan { title, .. } => {
                write!(f, "{} [{}] plan: {}", self.id, self.risk, title)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_request_mirrors_risk() {
        let cmd = ProposedCommand::new("rm -rf /tmp/x", RiskLevel::High);
        let req = ApprovalRequest::for_command(ConversationId::new(), cmd);
        assert_eq!(req.risk, RiskLevel::High);
        assert_eq!(req.status, ApprovalStatus::Pending);
        assert!(req.plan_id().is_none());
    }

    #[test]
    fn test_plan_request_carries_plan_id() {
        let plan_id = PlanId::new();
        let req =
            ApprovalRequest::for_plan(ConversationId::new(), plan_id, "deploy", RiskLevel::Medium);
        assert_eq!(req.plan_id(), Some(plan_id));
    }

    #[test]
    fn test_status_terminality() {
        assert!(!ApprovalStatus::Pending.is_terminal());
        assert!(ApprovalStatus::Approved.is_terminal());
        assert!(ApprovalStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_decision_serialization() {
        let json = serde_json::to_string(&Decision::Approve { edited_text: None }).unwrap();
        assert!(json.contains("\"action\":\"approve\""));
        let back: Decision = serde_json::from_str("{\"action\":\"reject\"}").unwrap();
        assert!(matches!(back, Decision::Reject));
    }
}
