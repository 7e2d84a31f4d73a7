//! Warden Approval - the consent gate in front of execution.
//!
//! Nothing in the pipeline executes without a matching approval. This crate
//! owns the [`ApprovalRequest`] records: the gate creates them `pending`,
//! hands out read-only views, resolves them exactly once (first decision
//! wins), and answers [`CommandExplanation`] queries before *and* after
//! resolution.
//!
//! The gate does not execute anything itself — resolving an approval returns
//! a [`Resolution`] that the caller (the kernel) converts into an execution.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod gate;
pub mod request;

pub use error::{ApprovalError, ApprovalResult};
pub use gate::{ApprovalGate, CommandExplanation, Resolution};
pub use request::{ApprovalRequest, ApprovalStatus, ApprovalSubject, Decision};
