//! The kernel facade: one object owning the gate, the orchestrator, and the
//! store, exposing the wire operations.
//!
//! The kernel is the only place a [`Resolution`] turns into actual
//! execution. The agent layer proposes work through [`Kernel::propose_command`]
//! and [`Kernel::propose_plan`]; the UI decides through the `approval/*` and
//! `plan/*` operations; everything else is observation.

use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use warden_approval::{ApprovalGate, ApprovalRequest, CommandExplanation, Decision, Resolution};
use warden_core::{ApprovalId, ConversationId, ExecutionId, Plan, PlanId, ProposedCommand};
use warden_exec::{CommandRunner, ExecutionStatus, PlanOrchestrator, ShellRunner};
use warden_kb::{AppliedWrite, KbStore, WritePreview};

use crate::api::{
    ApprovalExplainRequest, ApprovalPendingRequest, ApprovalPendingResponse,
    ApprovalRespondRequest, ApprovalRespondResponse, ExecutionKillRequest, ExecutionKillResponse,
    ExecutionStatusRequest, KbListRequest, KbListResponse, KbReadRequest, KbReadResponse,
    KbWriteApplyRequest, KbWritePreviewRequest, PlanApproveRequest, PlanApproveResponse,
    PlanPreviewRequest, PlanPreviewResponse, PlanStepPreview, RespondAction, RespondStatus,
};
use crate::config::Config;
use crate::error::{KernelError, KernelResult};

/// The assembled pipeline.
#[derive(Debug)]
pub struct Kernel {
    gate: ApprovalGate,
    orchestrator: PlanOrchestrator,
    kb: KbStore,
    plans: DashMap<PlanId, Plan>,
    plan_approvals: DashMap<PlanId, ApprovalId>,
}

impl Kernel {
    /// Build a kernel from configuration, running commands through the
    /// configured shell.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let shell = ShellRunner::with_shell(config.execution.shell.clone());
        Self::with_runner(config, Arc::new(shell))
    }

    /// Build a kernel with a custom command runner. This is the seam tests
    /// use to script command behavior.
    #[must_use]
    pub fn with_runner(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            gate: ApprovalGate::new(),
            orchestrator: PlanOrchestrator::new(runner),
            kb: KbStore::new(&config.kb.root),
            plans: DashMap::new(),
            plan_approvals: DashMap::new(),
        }
    }

    // -- intake from the agent layer ------------------------------------

    /// Record a proposed command as a pending approval. The command arrives
    /// pre-classified; the kernel gates and executes, it never assesses.
    pub fn propose_command(
        &self,
        conversation_id: ConversationId,
        command: ProposedCommand,
    ) -> ApprovalRequest {
        self.gate.submit_command(conversation_id, command)
    }

    /// Register a plan and record its pending approval.
    pub fn propose_plan(&self, conversation_id: ConversationId, plan: Plan) -> ApprovalRequest {
        let request = self.gate.submit_plan(conversation_id, &plan);
        self.plan_approvals.insert(plan.id, request.id);
        self.plans.insert(plan.id, plan);
        request
    }

    // -- approval operations --------------------------------------------

    /// `approval/respond`. Approving a single command blocks until the
    /// command exits; approving a plan starts its execution and returns
    /// immediately for polling.
    ///
    /// # Errors
    ///
    /// Unknown id, already-resolved approval, or (for plans) a missing plan
    /// body or an execution already live.
    pub async fn approval_respond(
        &self,
        request: ApprovalRespondRequest,
    ) -> KernelResult<ApprovalRespondResponse> {
        let decision = match request.action {
            RespondAction::Approve => Decision::Approve {
                edited_text: request.edited_command,
            },
            RespondAction::Reject => Decision::Reject,
        };

        match self.gate.resolve(request.approval_id, decision)? {
            Resolution::Rejected => Ok(ApprovalRespondResponse {
                status: RespondStatus::Rejected,
                execution_id: None,
                result: None,
            }),
            Resolution::RunCommand { text, edited, .. } => {
                if edited {
                    // The human's edit runs with the original's classification.
                    info!(approval_id = %request.approval_id, "executing edited command text");
                }
                let (execution_id, outcome) = self.orchestrator.execute_command(&text).await;
                Ok(ApprovalRespondResponse {
                    status: RespondStatus::Executed,
                    execution_id: Some(execution_id),
                    result: Some(outcome),
                })
            },
            Resolution::RunPlan { plan_id } => {
                let execution_id = self.start_plan(plan_id)?;
                Ok(ApprovalRespondResponse {
                    status: RespondStatus::Executed,
                    execution_id: Some(execution_id),
                    result: None,
                })
            },
        }
    }

    /// `approval/pending`.
    #[must_use]
    pub fn approval_pending(&self, request: &ApprovalPendingRequest) -> ApprovalPendingResponse {
        ApprovalPendingResponse {
            approvals: self.gate.list_pending(request.conversation_id),
        }
    }

    /// `approval/explain`.
    ///
    /// # Errors
    ///
    /// Unknown approval id.
    pub fn approval_explain(
        &self,
        request: &ApprovalExplainRequest,
    ) -> KernelResult<CommandExplanation> {
        Ok(self.gate.explain(request.approval_id)?)
    }

    // -- plan operations -------------------------------------------------

    /// `plan/preview`. Unknown plans answer `has_plan = false`.
    #[must_use]
    pub fn plan_preview(&self, request: &PlanPreviewRequest) -> PlanPreviewResponse {
        match self.plans.get(&request.plan_id) {
            Some(plan) => PlanPreviewResponse {
                has_plan: true,
                title: Some(plan.title.clone()),
                complexity: Some(plan.complexity),
                steps: plan
                    .steps
                    .iter()
                    .map(|s| PlanStepPreview {
                        number: s.number,
                        title: s.title.clone(),
                        command: s.command.text.clone(),
                        risk: s.risk,
                    })
                    .collect(),
            },
            None => PlanPreviewResponse {
                has_plan: false,
                title: None,
                complexity: None,
                steps: Vec::new(),
            },
        }
    }

    /// `plan/approve`: resolve the plan's pending approval and start
    /// executing. Consent stays mandatory — a plan that was never proposed
    /// has no approval record and cannot be started this way.
    ///
    /// # Errors
    ///
    /// Unknown plan, missing or already-resolved approval, or an execution
    /// already live for the plan.
    pub fn plan_approve(&self, request: &PlanApproveRequest) -> KernelResult<PlanApproveResponse> {
        if !self.plans.contains_key(&request.plan_id) {
            return Err(KernelError::UnknownPlan {
                plan_id: request.plan_id,
            });
        }
        let approval_id = self
            .plan_approvals
            .get(&request.plan_id)
            .map(|entry| *entry)
            .ok_or_else(|| {
                KernelError::InvalidParams(format!(
                    "no approval recorded for plan {}",
                    request.plan_id
                ))
            })?;
        self.gate
            .resolve(approval_id, Decision::Approve { edited_text: None })?;
        let execution_id = self.start_plan(request.plan_id)?;
        Ok(PlanApproveResponse { execution_id })
    }

    fn start_plan(&self, plan_id: PlanId) -> KernelResult<ExecutionId> {
        let plan = self
            .plans
            .get(&plan_id)
            .map(|entry| entry.clone())
            .ok_or(KernelError::UnknownPlan { plan_id })?;
        Ok(self.orchestrator.start(plan)?)
    }

    // -- execution operations ---------------------------------------------

    /// `execution/status`.
    ///
    /// # Errors
    ///
    /// Unknown execution id.
    pub fn execution_status(
        &self,
        request: &ExecutionStatusRequest,
    ) -> KernelResult<ExecutionStatus> {
        Ok(self.orchestrator.status(request.execution_id)?)
    }

    /// `execution/kill`. Best-effort: terminal and unknown executions come
    /// back `ok = false` with a message instead of an error.
    #[must_use]
    pub fn execution_kill(&self, request: &ExecutionKillRequest) -> ExecutionKillResponse {
        match self.orchestrator.abort(request.execution_id) {
            Ok(()) => ExecutionKillResponse {
                ok: true,
                message: None,
            },
            Err(e) => ExecutionKillResponse {
                ok: false,
                message: Some(e.to_string()),
            },
        }
    }

    // -- knowledge-base operations ----------------------------------------

    /// `kb/write_preview`.
    ///
    /// # Errors
    ///
    /// Invalid scope or path, or a filesystem failure.
    pub async fn kb_write_preview(
        &self,
        request: &KbWritePreviewRequest,
    ) -> KernelResult<WritePreview> {
        Ok(self
            .kb
            .preview(&request.scope, &request.path, &request.text)
            .await?)
    }

    /// `kb/write_apply`.
    ///
    /// # Errors
    ///
    /// A stale fencing token fails with the conflict code; also invalid
    /// scope/path and filesystem failures.
    pub async fn kb_write_apply(&self, request: &KbWriteApplyRequest) -> KernelResult<AppliedWrite> {
        Ok(self
            .kb
            .apply(
                &request.scope,
                &request.path,
                &request.text,
                &request.expected_sha256_current,
            )
            .await?)
    }

    /// `kb/list`.
    ///
    /// # Errors
    ///
    /// Invalid scope or a filesystem failure.
    pub async fn kb_list(&self, request: &KbListRequest) -> KernelResult<KbListResponse> {
        Ok(KbListResponse {
            files: self.kb.list_files(&request.scope).await?,
        })
    }

    /// `kb/read`.
    ///
    /// # Errors
    ///
    /// Missing non-default document, invalid scope/path, or a filesystem
    /// failure.
    pub async fn kb_read(&self, request: &KbReadRequest) -> KernelResult<KbReadResponse> {
        Ok(KbReadResponse {
            text: self.kb.read(&request.scope, &request.path).await?,
        })
    }
}

/// Convenience constructor: load config from `path` and build the kernel.
///
/// # Errors
///
/// Returns a [`crate::config::ConfigError`] when the file exists but is
/// unreadable or invalid.
pub fn kernel_from_config_file(path: &Path) -> Result<Kernel, crate::config::ConfigError> {
    let config = Config::load(path)?;
    crate::telemetry::init(&config.logging.level);
    Ok(Kernel::new(&config))
}
