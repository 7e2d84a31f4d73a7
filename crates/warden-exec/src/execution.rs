//! Execution records and their observable status.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tokio_util::sync::CancellationToken;
use warden_core::{ExecutionId, PlanId, StepId, StepStatus};

/// Aggregate state of an execution. `Running` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    /// Steps are executing (or about to).
    Running,
    /// Every step finished successfully.
    Completed,
    /// A step failed; later steps never ran.
    Failed,
    /// Aborted between steps; later steps never ran.
    Aborted,
}

impl ExecutionState {
    /// Whether the execution has finished, one way or another.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// A step that finished, successfully or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedStep {
    /// The step's id.
    pub step_id: StepId,
    /// Whether the step's command exited 0.
    pub success: bool,
    /// Head of the step's output.
    pub output_preview: String,
}

/// A point-in-time snapshot of an execution, safe to poll on a tight
/// interval. Once `state` is terminal the snapshot never changes again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    /// The execution's id.
    pub execution_id: ExecutionId,
    /// The plan being executed; `None` for a single ad hoc command.
    pub plan_id: Option<PlanId>,
    /// Aggregate state.
    pub state: ExecutionState,
    /// Number of steps that have finished — equivalently, the 0-based index
    /// of the step currently running (or next to run).
    pub current_step: usize,
    /// Steps that finished, in ordinal order. Always a strict prefix of the
    /// plan: nothing is skipped, nothing appears out of order.
    pub completed_steps: Vec<CompletedStep>,
    /// Per-step statuses in ordinal order; steps after a failure or abort
    /// stay `Pending` forever.
    pub step_statuses: Vec<StepStatus>,
    /// Total number of steps.
    pub total_steps: usize,
}

impl ExecutionStatus {
    pub(crate) fn new(
        execution_id: ExecutionId,
        plan_id: Option<PlanId>,
        total_steps: usize,
    ) -> Self {
        Self {
            execution_id,
            plan_id,
            state: ExecutionState::Running,
            current_step: 0,
            completed_steps: Vec::new(),
            step_statuses: vec![StepStatus::Pending; total_steps],
            total_steps,
        }
    }
}

/// Shared mutable record for one execution: the status snapshot plus the
/// cooperative cancellation flag checked between steps.
#[derive(Debug)]
pub(crate) struct ExecutionHandle {
    status: RwLock<ExecutionStatus>,
    pub(crate) cancel: CancellationToken,
}

impl ExecutionHandle {
    pub(crate) fn new(status: ExecutionStatus) -> Self {
        Self {
            status: RwLock::new(status),
            cancel: CancellationToken::new(),
        }
    }

    /// Clone the current snapshot. Lock poisoning cannot leave the snapshot
    /// half-written (writers replace fields, never unwind mid-update), so a
    /// poisoned lock degrades to reading the last value.
    pub(crate) fn snapshot(&self) -> ExecutionStatus {
        match self.status.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Mutate the snapshot. Never called again after a terminal state is
    /// written, which is what keeps terminal reads bit-identical.
    pub(crate) fn update(&self, f: impl FnOnce(&mut ExecutionStatus)) {
        let mut guard = match self.status.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard);
    }
}
