//! Approval gate error types.

use thiserror::Error;
use warden_core::ApprovalId;

use crate::request::ApprovalStatus;

/// Errors returned by the approval gate.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// No approval exists with the given id.
    #[error("approval not found: {approval_id}")]
    NotFound {
        /// The id that was looked up.
        approval_id: ApprovalId,
    },

    /// The approval already left `pending`; the first decision won.
    #[error("approval already resolved: {approval_id} is {status:?}")]
    AlreadyResolved {
        /// The id that was resolved twice.
        approval_id: ApprovalId,
        /// The status recorded by the first decision.
        status: ApprovalStatus,
    },
}

/// Result alias for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
