//! Orchestration error types.

use thiserror::Error;
use warden_core::{ExecutionId, PlanId};

use crate::execution::ExecutionState;

/// Errors returned by the plan orchestrator.
#[derive(Debug, Error)]
pub enum ExecError {
    /// No execution exists with the given id.
    #[error("execution not found: {execution_id}")]
    ExecutionNotFound {
        /// The id that was looked up.
        execution_id: ExecutionId,
    },

    /// The plan already has a live execution; a second one is rejected,
    /// not queued.
    #[error("plan {plan_id} already has a live execution: {execution_id}")]
    PlanAlreadyRunning {
        /// The plan with the live execution.
        plan_id: PlanId,
        /// The live execution's id.
        execution_id: ExecutionId,
    },

    /// The execution already reached a terminal state.
    #[error("execution {execution_id} is already terminal: {state:?}")]
    AlreadyTerminal {
        /// The execution that was targeted.
        execution_id: ExecutionId,
        /// Its terminal state.
        state: ExecutionState,
    },
}

/// Result alias for orchestration operations.
pub type ExecResult<T> = Result<T, ExecError>;
