//! Kernel error type and wire error codes.
//!
//! Every component error funnels into [`KernelError`], and
//! [`KernelError::code`] maps it to the numeric code clients branch on.
//! Conflict-shaped failures get their own codes so a client can tell
//! "re-preview and retry" apart from "you sent garbage":
//!
//! | code   | meaning                                  |
//! |--------|------------------------------------------|
//! | -32602 | invalid params / unknown id              |
//! | -32603 | internal error (filesystem)              |
//! | -32009 | knowledge-base write conflict            |
//! | -32010 | approval already resolved                |
//! | -32011 | plan already has a live execution        |

use thiserror::Error;
use warden_approval::ApprovalError;
use warden_core::PlanId;
use warden_exec::ExecError;
use warden_kb::KbError;

/// Invalid params / unknown id.
pub const CODE_INVALID_PARAMS: i32 = -32602;
/// Internal error.
pub const CODE_INTERNAL: i32 = -32603;
/// Knowledge-base write conflict; the caller should re-preview.
pub const CODE_KB_CONFLICT: i32 = -32009;
/// The approval was already resolved; the first decision stands.
pub const CODE_ALREADY_RESOLVED: i32 = -32010;
/// The plan already has a live execution.
pub const CODE_PLAN_RUNNING: i32 = -32011;

/// Anything a kernel operation can fail with.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Approval gate failure.
    #[error(transparent)]
    Approval(#[from] ApprovalError),

    /// Orchestration failure.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Knowledge-base failure.
    #[error(transparent)]
    Kb(#[from] KbError),

    /// No plan is registered under the given id.
    #[error("unknown plan: {plan_id}")]
    UnknownPlan {
        /// The id that was looked up.
        plan_id: PlanId,
    },

    /// The request was structurally valid but names nothing actionable.
    #[error("invalid params: {0}")]
    InvalidParams(String),
}

impl KernelError {
    /// The wire error code for this failure.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Approval(ApprovalError::AlreadyResolved { .. }) => CODE_ALREADY_RESOLVED,
            Self::Approval(ApprovalError::NotFound { .. }) => CODE_INVALID_PARAMS,
            Self::Exec(ExecError::PlanAlreadyRunning { .. }) => CODE_PLAN_RUNNING,
            Self::Exec(_) => CODE_INVALID_PARAMS,
            Self::Kb(KbError::Conflict { .. }) => CODE_KB_CONFLICT,
            Self::Kb(KbError::Io(_)) => CODE_INTERNAL,
            Self::Kb(_) | Self::UnknownPlan { .. } | Self::InvalidParams(_) => CODE_INVALID_PARAMS,
        }
    }
}

/// Result alias for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;
