//! The approval gate — owns every [`ApprovalRequest`] for its lifetime.
//!
//! # Flow
//!
//! 1. The agent proposes a command or plan; [`ApprovalGate::submit_command`]
//!    or [`ApprovalGate::submit_plan`] records it `pending`.
//! 2. The UI lists pending requests per conversation.
//! 3. A human decision arrives via [`ApprovalGate::resolve`] — a one-way
//!    latch; the first decision wins and later ones fail.
//! 4. On approval the returned [`Resolution`] tells the caller what to
//!    execute (with any edited text already substituted).
//!
//! [`ApprovalGate::explain`] is side-effect free and keeps answering after
//! resolution — explanations exist for audit, not for re-deciding.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;
use warden_core::{ApprovalId, ConversationId, PlanId, Plan, ProposedCommand, RiskLevel};

use crate::error::{ApprovalError, ApprovalResult};
use crate::request::{ApprovalRequest, ApprovalStatus, ApprovalSubject, Decision};

/// What the caller should do after a successful [`ApprovalGate::resolve`].
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The request was rejected; nothing executes.
    Rejected,
    /// A single command was approved. `text` is the text to actually run —
    /// the edited copy when the human changed it, the original otherwise.
    RunCommand {
        /// The command as originally proposed.
        command: ProposedCommand,
        /// The text to execute.
        text: String,
        /// Whether the text differs from the proposal.
        edited: bool,
    },
    /// A plan was approved as a unit; the caller starts its execution.
    RunPlan {
        /// The approved plan's id.
        plan_id: PlanId,
    },
}

/// Detailed, human-readable account of what an approval would do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandExplanation {
    /// Multi-line composed explanation for display.
    pub detailed_explanation: String,
    /// Cautions the human should read before approving.
    pub warnings: Vec<String>,
    /// Filesystem paths the action is expected to touch.
    pub affected_paths: Vec<String>,
    /// Whether an undo command is available.
    pub can_undo: bool,
    /// The undo command, when one exists. Surfaced for separate approval,
    /// never auto-executed.
    pub undo_command: Option<String>,
    /// Whether the action destroys or irreversibly alters data.
    pub is_destructive: bool,
}

/// Holds pending approvals and records decisions. Safe for concurrent use;
/// per-request locking comes from the underlying map shards.
#[derive(Debug, Default)]
pub struct ApprovalGate {
    requests: DashMap<ApprovalId, ApprovalRequest>,
}

impl ApprovalGate {
    /// Create an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pending approval for a single command.
    pub fn submit_command(
        &self,
        conversation_id: ConversationId,
        command: ProposedCommand,
    ) -> ApprovalRequest {
        let request = ApprovalRequest::for_command(conversation_id, command);
        info!(approval_id = %request.id, risk = %request.risk, "approval submitted");
        self.requests.insert(request.id, request.clone());
        request
    }

    /// Record a pending approval for a plan. The risk is the plan's
    /// aggregate; the plan body stays with the caller.
    pub fn submit_plan(&self, conversation_id: ConversationId, plan: &Plan) -> ApprovalRequest {
        let request = ApprovalRequest::for_plan(
            conversation_id,
            plan.id,
            plan.title.clone(),
            plan.aggregate_risk(),
        );
        info!(approval_id = %request.id, plan_id = %plan.id, risk = %request.risk, "plan approval submitted");
        self.requests.insert(request.id, request.clone());
        request
    }

    /// All requests for a conversation that are still pending.
    #[must_use]
    pub fn list_pending(&self, conversation_id: ConversationId) -> Vec<ApprovalRequest> {
        let mut pending: Vec<ApprovalRequest> = self
            .requests
            .iter()
            .filter(|r| r.conversation_id == conversation_id && !r.status.is_terminal())
            .map(|r| r.clone())
            .collect();
        pending.sort_by_key(|r| r.created_at);
        pending
    }

    /// Fetch a request by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`] for an unknown id.
    pub fn get(&self, approval_id: ApprovalId) -> ApprovalResult<ApprovalRequest> {
        self.requests
            .get(&approval_id)
            .map(|r| r.clone())
            .ok_or(ApprovalError::NotFound { approval_id })
    }

    /// Apply a human decision. The status transition is a one-way latch:
    /// the first decision wins, and a second call fails without touching the
    /// stored status.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::NotFound`] for an unknown id;
    /// [`ApprovalError::AlreadyResolved`] when the request already left
    /// `pending`.
    pub fn resolve(
        &self,
        approval_id: ApprovalId,
        decision: Decision,
    ) -> ApprovalResult<Resolution> {
        // get_mut holds the shard lock, making check-and-latch atomic under
        // concurrent resolvers.
        let mut entry = self
            .requests
            .get_mut(&approval_id)
            .ok_or(ApprovalError::NotFound { approval_id })?;

        if entry.status.is_terminal() {
            return Err(ApprovalError::AlreadyResolved {
                approval_id,
                status: entry.status,
            });
        }

        match decision {
            Decision::Reject => {
                entry.status = ApprovalStatus::Rejected;
                info!(approval_id = %approval_id, "approval rejected");
                Ok(Resolution::Rejected)
            },
            Decision::Approve { edited_text } => {
                entry.status = ApprovalStatus::Approved;
                match &entry.subject {
                    ApprovalSubject::Command { command } => {
                        let text = edited_text.unwrap_or_else(|| command.text.clone());
                        let edited = text != command.text;
                        info!(approval_id = %approval_id, edited, "approval granted");
                        Ok(Resolution::RunCommand {
                            command: command.clone(),
                            text,
                            edited,
                        })
                    },
                    ApprovalSubject::Plan { plan_id, .. } => {
                        // Plans are approved as a unit; per-step edits are not
                        // part of the protocol.
                        info!(approval_id = %approval_id, plan_id = %plan_id, "plan approval granted");
                        Ok(Resolution::RunPlan { plan_id: *plan_id })
                    },
                }
            },
        }
    }

    /// Compose the detailed explanation for a request. Side-effect free and
    /// valid after resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotFound`] for an unknown id.
    pub fn explain(&self, approval_id: ApprovalId) -> ApprovalResult<CommandExplanation> {
        let request = self.get(approval_id)?;
        Ok(match &request.subject {
            ApprovalSubject::Command { command } => explain_command(command),
            ApprovalSubject::Plan { title, .. } => CommandExplanation {
                detailed_explanation: format!(
                    "Plan: {title}\n\nRisk: {}\n\nSteps are listed in the plan preview; the plan executes as a unit once approved.",
                    request.risk
                ),
                warnings: Vec::new(),
                affected_paths: Vec::new(),
                can_undo: false,
                undo_command: None,
                is_destructive: request.risk.is_destructive(),
            },
        })
    }
}

fn explain_command(command: &ProposedCommand) -> CommandExplanation {
    let mut warnings = Vec::new();
    if command.destructive {
        warnings.push("This action is destructive and may not be recoverable.".to_string());
    }
    if command.risk >= RiskLevel::High && command.undo_command.is_none() {
        warnings.push("No undo command is available for this action.".to_string());
    }

    let affected = if command.affected_paths.is_empty() {
        "None".to_string()
    } else {
        command.affected_paths.join(", ")
    };
    let warning_line = if warnings.is_empty() {
        "None".to_string()
    } else {
        warnings.join(", ")
    };

    let detailed_explanation = format!(
        "Command: {}\n\nDescription: {}\n\nAffected paths: {}\n\nWarnings: {}\n\nReversible: {}\nUndo command: {}",
        command.text,
        command.explanation,
        affected,
        warning_line,
        if command.can_undo() { "Yes" } else { "No" },
        command.undo_command.as_deref().unwrap_or("N/A"),
    );

    CommandExplanation {
        detailed_explanation,
        warnings,
        affected_paths: command.affected_paths.clone(),
        can_undo: command.can_undo(),
        undo_command: command.undo_command.clone(),
        is_destructive: command.destructive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{PlanComplexity, PlanStep};

    fn gate_with_command(risk: RiskLevel) -> (ApprovalGate, ApprovalId) {
        let gate = ApprovalGate::new();
        let req = gate.submit_command(
            ConversationId::new(),
            ProposedCommand::new("rm -rf /tmp/cache", risk)
                .with_explanation("Clears the temp cache")
                .with_undo("mkdir -p /tmp/cache")
                .with_affected_paths(["/tmp/cache".to_string()]),
        );
        let id = req.id;
        (gate, id)
    }

    #[test]
    fn test_approve_without_edit_returns_original_text() {
        let (gate, id) = gate_with_command(RiskLevel::Medium);
        let resolution = gate.resolve(id, Decision::Approve { edited_text: None }).unwrap();
        match resolution {
            Resolution::RunCommand { text, edited, .. } => {
                assert_eq!(text, "rm -rf /tmp/cache");
                assert!(!edited);
            },
            other => panic!("unexpected resolution: {other:?}"),
        }
        assert_eq!(gate.get(id).unwrap().status, ApprovalStatus::Approved);
    }

    #[test]
    fn test_edited_text_substitutes_before_execution() {
        let (gate, id) = gate_with_command(RiskLevel::Medium);
        let resolution = gate
            .resolve(
                id,
                Decision::Approve {
                    edited_text: Some("rm -rf /tmp/cache/stale".to_string()),
                },
            )
            .unwrap();
        match resolution {
            Resolution::RunCommand { text, edited, command } => {
                assert_eq!(text, "rm -rf /tmp/cache/stale");
                assert!(edited);
                // The stored proposal is untouched.
                assert_eq!(command.text, "rm -rf /tmp/cache");
            },
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn test_second_decision_fails_and_status_is_unchanged() {
        let (gate, id) = gate_with_command(RiskLevel::Low);
        gate.resolve(id, Decision::Reject).unwrap();

        let err = gate
            .resolve(id, Decision::Approve { edited_text: None })
            .unwrap_err();
        assert!(matches!(
            err,
            ApprovalError::AlreadyResolved {
                status: ApprovalStatus::Rejected,
                ..
            }
        ));
        assert_eq!(gate.get(id).unwrap().status, ApprovalStatus::Rejected);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let gate = ApprovalGate::new();
        let err = gate.resolve(ApprovalId::new(), Decision::Reject).unwrap_err();
        assert!(matches!(err, ApprovalError::NotFound { .. }));
    }

    #[test]
    fn test_list_pending_excludes_terminal() {
        let conversation = ConversationId::new();
        let gate = ApprovalGate::new();
        let a = gate.submit_command(conversation, ProposedCommand::new("ls", RiskLevel::Safe));
        let b = gate.submit_command(conversation, ProposedCommand::new("pwd", RiskLevel::Safe));
        // A request in another conversation must not leak in.
        gate.submit_command(
            ConversationId::new(),
            ProposedCommand::new("whoami", RiskLevel::Safe),
        );

        gate.resolve(a.id, Decision::Reject).unwrap();

        let pending = gate.list_pending(conversation);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, b.id);
    }

    #[test]
    fn test_explain_survives_resolution() {
        let (gate, id) = gate_with_command(RiskLevel::High);
        gate.resolve(id, Decision::Approve { edited_text: None }).unwrap();

        let explanation = gate.explain(id).unwrap();
        assert!(explanation.detailed_explanation.contains("rm -rf /tmp/cache"));
        assert!(explanation.can_undo);
        assert_eq!(explanation.undo_command.as_deref(), Some("mkdir -p /tmp/cache"));
        assert_eq!(explanation.affected_paths, vec!["/tmp/cache"]);
    }

    #[test]
    fn test_explain_warns_on_destructive() {
        let gate = ApprovalGate::new();
        let req = gate.submit_command(
            ConversationId::new(),
            ProposedCommand::new("mkfs.ext4 /dev/sda1", RiskLevel::Critical),
        );
        let explanation = gate.explain(req.id).unwrap();
        assert!(explanation.is_destructive);
        assert_eq!(explanation.warnings.len(), 2);
    }

    #[test]
    fn test_plan_approval_resolves_to_run_plan() {
        let gate = ApprovalGate::new();
        let plan = Plan::new("deploy", PlanComplexity::Simple).with_step(PlanStep::new(
            "build",
            ProposedCommand::new("cargo build", RiskLevel::Low),
        ));
        let req = gate.submit_plan(ConversationId::new(), &plan);
        assert_eq!(req.risk, RiskLevel::Low);

        let resolution = gate
            .resolve(req.id, Decision::Approve { edited_text: None })
            .unwrap();
        assert!(matches!(resolution, Resolution::RunPlan { plan_id } if plan_id == plan.id));
    }
}
