//! Wire-shaped request and response types.
//!
//! One pair per operation, all JSON-serializable. These are the kernel's
//! public contract; internal types leak through only where they are already
//! wire-shaped ([`ExecutionStatus`], [`CommandExplanation`], the store's
//! preview and receipt types).

use serde::{Deserialize, Serialize};
use warden_approval::ApprovalRequest;
use warden_core::{ApprovalId, ConversationId, ExecutionId, PlanComplexity, PlanId, RiskLevel};
use warden_exec::CommandOutcome;
use warden_kb::KbScope;

/// `approval/respond` — deliver a human decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRespondRequest {
    /// The approval being decided.
    pub approval_id: ApprovalId,
    /// The decision.
    pub action: RespondAction,
    /// Replacement command text; only meaningful with `approve`, and only
    /// for single-command approvals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_command: Option<String>,
}

/// The two possible decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespondAction {
    /// Consent; the action executes.
    Approve,
    /// Refusal; nothing executes.
    Reject,
}

/// Outcome of `approval/respond`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRespondResponse {
    /// What happened to the approved action.
    pub status: RespondStatus,
    /// The execution created by an approval. For a single command the
    /// execution is already terminal; for a plan it is live and polled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<ExecutionId>,
    /// The command outcome, for single-command approvals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CommandOutcome>,
}

/// Terminal status of a respond call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespondStatus {
    /// The action was approved and execution happened (or started).
    Executed,
    /// The action was rejected; nothing ran.
    Rejected,
}

/// `approval/pending` — list undecided approvals for a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalPendingRequest {
    /// The conversation to list.
    pub conversation_id: ConversationId,
}

/// Response to `approval/pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalPendingResponse {
    /// Pending approvals, oldest first.
    pub approvals: Vec<ApprovalRequest>,
}

/// `approval/explain` — detailed account of what an approval would do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalExplainRequest {
    /// The approval to explain.
    pub approval_id: ApprovalId,
}

/// `plan/preview` — the plan as shown to the human before approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanPreviewRequest {
    /// The plan to preview.
    pub plan_id: PlanId,
}

/// Response to `plan/preview`. An unknown plan is `has_plan = false`, not an
/// error; the UI renders an empty panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanPreviewResponse {
    /// Whether the plan exists.
    pub has_plan: bool,
    /// The plan's title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The plan's advisory complexity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<PlanComplexity>,
    /// The steps, in execution order.
    pub steps: Vec<PlanStepPreview>,
}

/// One step as rendered in a plan preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStepPreview {
    /// 1-based ordinal.
    pub number: usize,
    /// Short title.
    pub title: String,
    /// The command the step will run.
    pub command: String,
    /// Step-local risk.
    pub risk: RiskLevel,
}

/// `plan/approve` — approve a previewed plan and start executing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanApproveRequest {
    /// The plan to approve.
    pub plan_id: PlanId,
}

/// Response to `plan/approve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanApproveResponse {
    /// The execution to poll.
    pub execution_id: ExecutionId,
}

/// `execution/status` — poll an execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStatusRequest {
    /// The execution to read.
    pub execution_id: ExecutionId,
}

/// `execution/kill` — request a cooperative abort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionKillRequest {
    /// The execution to abort.
    pub execution_id: ExecutionId,
}

/// Response to `execution/kill`. Best-effort: a terminal or unknown
/// execution answers `ok = false` with a message rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionKillResponse {
    /// Whether an abort was actually requested.
    pub ok: bool,
    /// Why not, when `ok = false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `kb/write_preview` — compute what a write would change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbWritePreviewRequest {
    /// Where the document lives.
    pub scope: KbScope,
    /// Scope-relative path.
    pub path: String,
    /// The proposed full text.
    pub text: String,
}

/// `kb/write_apply` — commit a previewed write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbWriteApplyRequest {
    /// Where the document lives.
    pub scope: KbScope,
    /// Scope-relative path.
    pub path: String,
    /// The full text to write.
    pub text: String,
    /// The fencing token from the preview.
    pub expected_sha256_current: String,
}

/// `kb/list` — list a scope's documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbListRequest {
    /// The scope to list.
    pub scope: KbScope,
}

/// Response to `kb/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbListResponse {
    /// Sorted scope-relative paths.
    pub files: Vec<String>,
}

/// `kb/read` — read one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbReadRequest {
    /// The scope to read from.
    pub scope: KbScope,
    /// Scope-relative path; defaults to the scope's `kb.md`.
    #[serde(default = "default_doc")]
    pub path: String,
}

/// Response to `kb/read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbReadResponse {
    /// The document's full text.
    pub text: String,
}

fn default_doc() -> String {
    warden_kb::DEFAULT_DOC.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respond_request_wire_shape() {
        let request: ApprovalRespondRequest = serde_json::from_str(
            r#"{"approval_id": "6e5ae1f0-0000-4000-8000-000000000000", "action": "approve", "edited_command": "ls -la"}"#,
        )
        .unwrap();
        assert_eq!(request.action, RespondAction::Approve);
        assert_eq!(request.edited_command.as_deref(), Some("ls -la"));
    }

    #[test]
    fn test_kb_read_path_defaults() {
        let request: KbReadRequest =
            serde_json::from_str(r#"{"scope": {"act": "act-1"}}"#).unwrap();
        assert_eq!(request.path, "kb.md");
    }

    #[test]
    fn test_rejected_response_omits_empty_fields() {
        let response = ApprovalRespondResponse {
            status: RespondStatus::Rejected,
            execution_id: None,
            result: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"status":"rejected"}"#);
    }
}
