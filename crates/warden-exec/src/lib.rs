//! Warden Exec - runs approved work, and nothing else.
//!
//! Two layers live here:
//!
//! - [`engine`] — the [`CommandRunner`] seam and its shell implementation.
//!   The only code in the pipeline that touches the external world; every
//!   other component exists to control when and whether it is invoked.
//! - [`orchestrator`] — sequences approved plans through the engine one step
//!   at a time, tracks per-step and aggregate status for polling, and
//!   honors cooperative abort between steps.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod engine;
pub mod error;
pub mod execution;
pub mod orchestrator;

pub use engine::{CommandOutcome, CommandRunner, ShellRunner};
pub use error::{ExecError, ExecResult};
pub use execution::{CompletedStep, ExecutionState, ExecutionStatus};
pub use orchestrator::PlanOrchestrator;
