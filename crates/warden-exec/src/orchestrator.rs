//! The plan orchestrator — sequences approved steps through the engine.
//!
//! Each approved plan becomes one [`ExecutionStatus`] record driven by a
//! spawned task. Steps run strictly in ordinal order, the first failure
//! fails the whole execution (fail-fast), and abort is cooperative: the
//! cancellation flag is checked between steps, so a step already in flight
//! finishes and is recorded, but nothing after it ever starts.
//!
//! Status is built for polling: snapshots are cheap clones, and once an
//! execution reaches a terminal state its snapshot never changes again.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tracing::{info, warn};
use warden_core::{ExecutionId, Plan, PlanId, StepId, StepStatus};

use crate::engine::{CommandOutcome, CommandRunner};
use crate::error::{ExecError, ExecResult};
use crate::execution::{CompletedStep, ExecutionHandle, ExecutionState, ExecutionStatus};

/// Tracks executions and enforces the one-live-execution-per-plan rule.
///
/// Independent plans (and ad hoc commands) execute concurrently without
/// coordination; only same-plan starts are rejected.
pub struct PlanOrchestrator {
    runner: Arc<dyn CommandRunner>,
    executions: DashMap<ExecutionId, Arc<ExecutionHandle>>,
    live_plans: DashMap<PlanId, ExecutionId>,
}

impl PlanOrchestrator {
    /// Create an orchestrator running commands through `runner`.
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            executions: DashMap::new(),
            live_plans: DashMap::new(),
        }
    }

    /// Start executing an approved plan. Returns as soon as the execution is
    /// created and running; callers observe progress through
    /// [`Self::status`].
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::PlanAlreadyRunning`] if the plan already has a
    /// non-terminal execution — rejected, not queued.
    pub fn start(&self, plan: Plan) -> ExecResult<ExecutionId> {
        let execution_id = ExecutionId::new();
        let handle = Arc::new(ExecutionHandle::new(ExecutionStatus::new(
            execution_id,
            Some(plan.id),
            plan.len(),
        )));
        self.executions.insert(execution_id, Arc::clone(&handle));

        // The entry guard makes check-and-claim atomic against concurrent
        // starts for the same plan.
        match self.live_plans.entry(plan.id) {
            Entry::Occupied(mut occupied) => {
                let existing = *occupied.get();
                let live = self
                    .executions
                    .get(&existing)
                    .is_some_and(|h| !h.snapshot().state.is_terminal());
                if live {
                    self.executions.remove(&execution_id);
                    return Err(ExecError::PlanAlreadyRunning {
                        plan_id: plan.id,
                        execution_id: existing,
                    });
                }
                occupied.insert(execution_id);
            },
            Entry::Vacant(vacant) => {
                vacant.insert(execution_id);
            },
        }

        info!(execution_id = %execution_id, plan_id = %plan.id, steps = plan.len(), "execution started");
        let runner = Arc::clone(&self.runner);
        tokio::spawn(run_plan(runner, handle, plan));
        Ok(execution_id)
    }

    /// Run a single approved command as a one-step execution with no plan
    /// reference, awaited to completion by the caller.
    ///
    /// A spawn failure is folded into the outcome (`success = false`,
    /// `exit_code = -1`) so execution errors stay normal terminal outcomes.
    pub async fn execute_command(&self, command_text: &str) -> (ExecutionId, CommandOutcome) {
        let execution_id = ExecutionId::new();
        let step_id = StepId::new();
        let handle = Arc::new(ExecutionHandle::new(ExecutionStatus::new(
            execution_id,
            None,
            1,
        )));
        self.executions.insert(execution_id, Arc::clone(&handle));
        handle.update(|s| s.step_statuses[0] = StepStatus::Running);

        let outcome = match self.runner.run(command_text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(execution_id = %execution_id, error = %e, "command could not be spawned");
                CommandOutcome {
                    success: false,
                    stdout: String::new(),
                    stderr: e.to_string(),
                    exit_code: -1,
                    duration_ms: 0,
                }
            },
        };

        let preview = outcome.preview();
        let success = outcome.success;
        handle.update(|s| {
            s.completed_steps.push(CompletedStep {
                step_id,
                success,
                output_preview: preview,
            });
            s.current_step = 1;
            s.step_statuses[0] = if success {
                StepStatus::Success
            } else {
                StepStatus::Failed
            };
            s.state = if success {
                ExecutionState::Completed
            } else {
                ExecutionState::Failed
            };
        });
        info!(execution_id = %execution_id, success, exit_code = outcome.exit_code, "command execution finished");
        (execution_id, outcome)
    }

    /// A pure, repeatable status read — safe to poll on a tight interval.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::ExecutionNotFound`] for an unknown id.
    pub fn status(&self, execution_id: ExecutionId) -> ExecResult<ExecutionStatus> {
        self.executions
            .get(&execution_id)
            .map(|h| h.snapshot())
            .ok_or(ExecError::ExecutionNotFound { execution_id })
    }

    /// Request cooperative abort: no step after the current one will start.
    /// A step already in flight finishes and is recorded.
    ///
    /// # Errors
    ///
    /// [`ExecError::ExecutionNotFound`] for an unknown id;
    /// [`ExecError::AlreadyTerminal`] when the execution already finished.
    pub fn abort(&self, execution_id: ExecutionId) -> ExecResult<()> {
        let handle = self
            .executions
            .get(&execution_id)
            .ok_or(ExecError::ExecutionNotFound { execution_id })?;
        let state = handle.snapshot().state;
        if state.is_terminal() {
            return Err(ExecError::AlreadyTerminal {
                execution_id,
                state,
            });
        }
        info!(execution_id = %execution_id, "abort requested");
        handle.cancel.cancel();
        Ok(())
    }

    /// The live execution for a plan, if one exists.
    #[must_use]
    pub fn live_execution(&self, plan_id: PlanId) -> Option<ExecutionId> {
        let execution_id = *self.live_plans.get(&plan_id)?;
        let live = self
            .executions
            .get(&execution_id)
            .is_some_and(|h| !h.snapshot().state.is_terminal());
        live.then_some(execution_id)
    }
}

impl std::fmt::Debug for PlanOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanOrchestrator")
            .field("executions", &self.executions.len())
            .finish_non_exhaustive()
    }
}

/// Drive one plan to a terminal state, step by step.
async fn run_plan(runner: Arc<dyn CommandRunner>, handle: Arc<ExecutionHandle>, plan: Plan) {
    for (index, step) in plan.steps.iter().enumerate() {
        // Cooperative abort: checked before each step, never mid-step.
        if handle.cancel.is_cancelled() {
            handle.update(|s| s.state = ExecutionState::Aborted);
            info!(plan_id = %plan.id, step = index, "execution aborted between steps");
            return;
        }

        handle.update(|s| s.step_statuses[index] = StepStatus::Running);

        let (success, preview) = match runner.run(&step.command.text).await {
            Ok(outcome) => (outcome.success, outcome.preview()),
            Err(e) => (false, format!("failed to spawn: {e}")),
        };

        handle.update(|s| {
            s.completed_steps.push(CompletedStep {
                step_id: step.id,
                success,
                output_preview: preview,
            });
            s.current_step = s.completed_steps.len();
            s.step_statuses[index] = if success {
                StepStatus::Success
            } else {
                StepStatus::Failed
            };
            if !success {
                s.state = ExecutionState::Failed;
            }
        });

        if !success {
            warn!(plan_id = %plan.id, step_id = %step.id, number = step.number, "step failed; execution fails fast");
            return;
        }
    }

    handle.update(|s| s.state = ExecutionState::Completed);
    info!(plan_id = %plan.id, "execution completed");
}
