//! Convergence reports produced by the planners.

use serde::{Deserialize, Serialize};

/// Per-sweep convergence trace of an evaluation or value-iteration run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    /// Number of full sweeps performed
    pub sweeps: usize,
    /// Largest absolute value change in each sweep
    pub deltas: Vec<f64>,
}

impl ConvergenceReport {
    pub(crate) fn record(&mut self, max_delta: f64) {
        self.sweeps += 1;
        self.deltas.push(max_delta);
    }

    /// Largest change in the last sweep (0.0 if no sweep ran).
    pub fn final_delta(&self) -> f64 {
        self.deltas.last().copied().unwrap_or(0.0)
    }
}

/// One evaluate-then-improve round of policy iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRound {
    /// 0-based round index
    pub round: usize,
    pub evaluation: ConvergenceReport,
    /// Cells whose action changed in the improvement sweep
    pub policy_changes: usize,
}

/// Trace of a policy-iteration run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyIterationReport {
    pub rounds: Vec<PolicyRound>,
    /// Whether the run stopped because the policy stopped changing
    pub stable: bool,
}

impl PolicyIterationReport {
    /// Evaluation sweeps across all rounds.
    pub fn total_sweeps(&self) -> usize {
        self.rounds.iter().map(|r| r.evaluation.sweeps).sum()
    }
}

/// Report of whichever method [`super::DynamicProgrammingSolver::plan`] ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanReport {
    Value(ConvergenceReport),
    Policy(PolicyIterationReport),
}

impl PlanReport {
    pub fn total_sweeps(&self) -> usize {
        match self {
            PlanReport::Value(report) => report.sweeps,
            PlanReport::Policy(report) => report.total_sweeps(),
        }
    }
}
