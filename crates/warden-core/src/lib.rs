//! Warden Core - Foundation types for the approval and execution pipeline.
//!
//! This crate provides:
//! - Typed identifiers for approvals, plans, steps, executions, conversations
//! - The `RiskLevel` scale attached to every proposed action
//! - The immutable `ProposedCommand` model
//! - The `Plan` / `PlanStep` model executed by the orchestrator
//! - A `Timestamp` wrapper used throughout the pipeline

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod command;
pub mod plan;
pub mod types;

pub use command::ProposedCommand;
pub use plan::{Plan, PlanComplexity, PlanStep, StepStatus};
pub use types::{
    ApprovalId, CommandId, ConversationId, ExecutionId, PlanId, RiskLevel, StepId, Timestamp,
};
