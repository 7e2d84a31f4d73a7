//! The plan model: an ordered sequence of steps approved and executed as one
//! unit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::command::ProposedCommand;
use crate::types::{PlanId, RiskLevel, StepId};

/// Advisory classification of a plan. Does not gate behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanComplexity {
    /// A short, routine sequence.
    Simple,
    /// A longer sequence touching several areas.
    Complex,
    /// Read-mostly steps gathering information.
    Diagnostic,
    /// Contains steps that are hard to reverse.
    Risky,
}

impl fmt::Display for PlanComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Complex => write!(f, "complex"),
            Self::Diagnostic => write!(f, "diagnostic"),
            Self::Risky => write!(f, "risky"),
        }
    }
}

/// Lifecycle of a single plan step.
///
/// `Pending` is the only non-monotonic state: once a step is `Running` it can
/// only move to `Success` or `Failed`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not started.
    Pending,
    /// Currently executing.
    Running,
    /// Finished with exit code 0.
    Success,
    /// Finished with a non-zero exit code.
    Failed,
}

impl StepStatus {
    /// Whether the step has finished, either way.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// One unit of work inside a [`Plan`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    /// Unique step identifier.
    pub id: StepId,
    /// 1-based position within the plan.
    pub number: usize,
    /// Short human-readable title.
    pub title: String,
    /// The command this step runs.
    pub command: ProposedCommand,
    /// Step-local risk level.
    pub risk: RiskLevel,
}

impl PlanStep {
    /// Create a step wrapping a command. The ordinal is assigned by
    /// [`Plan::with_step`].
    #[must_use]
    pub fn new(title: impl Into<String>, command: ProposedCommand) -> Self {
        let risk = command.risk;
        Self {
            id: StepId::new(),
            number: 0,
            title: title.into(),
            command,
            risk,
        }
    }
}

/// An ordered sequence of steps proposed together and approved as a unit.
///
/// Steps are not individually approved; consent covers the whole plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan identifier.
    pub id: PlanId,
    /// Human-readable title.
    pub title: String,
    /// Advisory complexity classification.
    pub complexity: PlanComplexity,
    /// The steps, in execution order.
    pub steps: Vec<PlanStep>,
}

impl Plan {
    /// Create an empty plan.
    #[must_use]
    pub fn new(title: impl Into<String>, complexity: PlanComplexity) -> Self {
        Self {
            id: PlanId::new(),
            title: title.into(),
            complexity,
            steps: Vec::new(),
        }
    }

    /// Append a step, assigning its 1-based ordinal.
    #[must_use]
    pub fn with_step(mut self, mut step: PlanStep) -> Self {
        step.number = self.steps.len() + 1;
        self.steps.push(step);
        self
    }

    /// Number of steps in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The highest risk level across all steps, or `Safe` for an empty plan.
    #[must_use]
    pub fn aggregate_risk(&self) -> RiskLevel {
        self.steps
            .iter()
            .map(|s| s.risk)
            .max()
            .unwrap_or(RiskLevel::Safe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(text: &str, risk: RiskLevel) -> PlanStep {
        PlanStep::new(text, ProposedCommand::new(text, risk))
    }

    #[test]
    fn test_step_ordinals_are_assigned() {
        let plan = Plan::new("setup", PlanComplexity::Simple)
            .with_step(step("mkdir build", RiskLevel::Low))
            .with_step(step("cp config build/", RiskLevel::Low));

        assert_eq!(plan.steps[0].number, 1);
        assert_eq!(plan.steps[1].number, 2);
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_aggregate_risk_is_max() {
        let plan = Plan::new("mixed", PlanComplexity::Risky)
            .with_step(step("ls", RiskLevel::Safe))
            .with_step(step("rm -rf build", RiskLevel::High))
            .with_step(step("echo done", RiskLevel::Safe));

        assert_eq!(plan.aggregate_risk(), RiskLevel::High);
    }

    #[test]
    fn test_aggregate_risk_empty_plan() {
        let plan = Plan::new("empty", PlanComplexity::Simple);
        assert_eq!(plan.aggregate_risk(), RiskLevel::Safe);
    }

    #[test]
    fn test_step_status_terminal() {
        assert!(!StepStatus::Pending.is_terminal());
        assert!(!StepStatus::Running.is_terminal());
        assert!(StepStatus::Success.is_terminal());
        assert!(StepStatus::Failed.is_terminal());
    }
}
