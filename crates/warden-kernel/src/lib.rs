//! Warden Kernel - the client-facing surface of the pipeline.
//!
//! The [`Kernel`] owns one [`warden_approval::ApprovalGate`], one
//! [`warden_exec::PlanOrchestrator`], and one [`warden_kb::KbStore`], and
//! exposes them as typed request/response operations:
//!
//! - `approval/respond`, `approval/pending`, `approval/explain`
//! - `plan/preview`, `plan/approve`
//! - `execution/status`, `execution/kill`
//! - `kb/write_preview`, `kb/write_apply`, `kb/list`, `kb/read`
//!
//! Failures map to stable numeric codes (see [`error`]) so clients can
//! distinguish conflicts worth retrying from plain bad requests.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod api;
pub mod config;
pub mod error;
pub mod kernel;
pub mod telemetry;

pub use config::{Config, ConfigError};
pub use error::{KernelError, KernelResult};
pub use kernel::{Kernel, kernel_from_config_file};
