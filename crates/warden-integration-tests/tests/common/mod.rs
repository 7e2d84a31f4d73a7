//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Notify;
use warden_core::{ExecutionId, Plan, PlanComplexity, PlanStep, ProposedCommand, RiskLevel};
use warden_exec::{CommandOutcome, CommandRunner, ExecutionStatus};
use warden_kernel::api::ExecutionStatusRequest;
use warden_kernel::{Config, Kernel};

/// A self-contained test harness: one kernel over a scripted runner and a
/// temp knowledge-base root.
///
/// Owns a `TempDir` cleaned up when the harness is dropped.
pub struct KernelTestHarness {
    /// The kernel under test.
    pub kernel: Kernel,
    /// The scripted runner behind the kernel.
    pub runner: Arc<GatedRunner>,
    /// The knowledge-base tempdir (held to prevent cleanup).
    _kb_dir: TempDir,
}

impl KernelTestHarness {
    /// A harness over a [`GatedRunner`].
    pub fn new() -> Self {
        let kb_dir = TempDir::new().expect("failed to create tempdir");
        let config = Config {
            kb: warden_kernel::config::KbConfig {
                root: kb_dir.path().to_path_buf(),
            },
            ..Config::default()
        };
        let runner = Arc::new(GatedRunner::default());
        let kernel = Kernel::with_runner(&config, Arc::clone(&runner) as Arc<dyn CommandRunner>);
        Self {
            kernel,
            runner,
            _kb_dir: kb_dir,
        }
    }

    /// Poll `execution/status` until the execution is terminal.
    pub async fn wait_terminal(&self, execution_id: ExecutionId) -> ExecutionStatus {
        for _ in 0..500 {
            let status = self
                .kernel
                .execution_status(&ExecutionStatusRequest { execution_id })
                .expect("execution should exist");
            if status.state.is_terminal() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("execution never reached a terminal state");
    }

    /// Poll `execution/status` until at least `n` steps have completed.
    pub async fn wait_completed_steps(&self, execution_id: ExecutionId, n: usize) -> ExecutionStatus {
        for _ in 0..500 {
            let status = self
                .kernel
                .execution_status(&ExecutionStatusRequest { execution_id })
                .expect("execution should exist");
            if status.completed_steps.len() >= n {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("execution never completed {n} steps");
    }
}

impl Default for KernelTestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Scripted command runner.
///
/// - `"fail"` exits non-zero; everything else succeeds.
/// - `"wait"` signals `started` and blocks until `release` is notified.
/// - Every command text is recorded in order.
#[derive(Default)]
pub struct GatedRunner {
    /// Commands in the order they ran.
    pub commands: Mutex<Vec<String>>,
    /// Notified when a `"wait"` command starts blocking.
    pub started: Notify,
    /// Notify to let a blocked `"wait"` command finish.
    pub release: Notify,
}

#[async_trait]
impl CommandRunner for GatedRunner {
    async fn run(&self, command_text: &str) -> io::Result<CommandOutcome> {
        self.commands
            .lock()
            .expect("runner lock")
            .push(command_text.to_string());
        if command_text == "wait" {
            self.started.notify_one();
            self.release.notified().await;
        }
        let success = command_text != "fail";
        Ok(CommandOutcome {
            success,
            stdout: format!("ran {command_text}"),
            stderr: String::new(),
            exit_code: i32::from(!success),
            duration_ms: 1,
        })
    }
}

/// A plan with one low-risk step per command text.
pub fn plan_of(title: &str, commands: &[&str]) -> Plan {
    commands
        .iter()
        .fold(Plan::new(title, PlanComplexity::Simple), |plan, c| {
            plan.with_step(PlanStep::new(*c, ProposedCommand::new(*c, RiskLevel::Low)))
        })
}
