//! Policy evaluation, policy iteration and value iteration over a
//! [`GridNetwork`] with a fully known transition model.

use rand::rngs::StdRng;

use super::report::{ConvergenceReport, PlanReport, PolicyIterationReport, PolicyRound};
use crate::{
    Result,
    config::{PlannerConfig, PlanningMethod, validate_planning},
    network::GridNetwork,
    ports::Router,
    selection::{ActionScores, Objective, build_rng, pick_best},
    types::{Action, Position, RouteOutcome},
};

/// Value pinned on inactive cells so they are never preferred.
pub const INACTIVE_VALUE: f64 = -1000.0;

/// Offline planner that writes the value and policy tables of the network
/// it owns.
///
/// Once planned, it routes packets by following the policy table.
#[derive(Debug, Clone)]
pub struct DynamicProgrammingSolver {
    network: GridNetwork,
    config: PlannerConfig,
    rng: StdRng,
    name: String,
}

impl DynamicProgrammingSolver {
    /// Create a solver around `network`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidParameter`] if the configured discount
    /// factor or threshold is out of range.
    pub fn new(network: GridNetwork, config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            network,
            rng: build_rng(config.seed),
            name: config.method.to_string(),
            config,
        })
    }

    /// Reseed the tie-breaking generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = build_rng(Some(seed));
        self.config.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Run the configured method with the configured parameters.
    pub fn plan(&mut self) -> Result<PlanReport> {
        let PlannerConfig {
            method,
            discount,
            theta,
            max_rounds,
            ..
        } = self.config;
        match method {
            PlanningMethod::ValueIteration => self.solve(discount, theta).map(PlanReport::Value),
            PlanningMethod::PolicyIteration => self
                .iterate(discount, theta, max_rounds)
                .map(PlanReport::Policy),
        }
    }

    /// Evaluate the current policy.
    ///
    /// Synchronous sweeps: every cell is updated from the previous sweep's
    /// snapshot, so sweep order cannot bias the result. Stops once the
    /// largest change in a sweep drops below `theta`.
    pub fn evaluate(&mut self, discount: f64, theta: f64) -> Result<ConvergenceReport> {
        validate_planning(discount, theta)?;
        let mut report = ConvergenceReport::default();
        loop {
            let snapshot = self.network.values().clone();
            let mut max_delta: f64 = 0.0;
            for pos in self.network.positions() {
                if self.network.nodes()[pos].is_inactive() {
                    self.network.values_mut()[pos] = INACTIVE_VALUE;
                    continue;
                }
                let transition = self.network.step(pos, self.network.policies()[pos]);
                let value = transition.reward + discount * snapshot[transition.next];
                max_delta = max_delta.max((value - snapshot[pos]).abs());
                self.network.values_mut()[pos] = value;
            }
            report.record(max_delta);
            if max_delta < theta {
                return Ok(report);
            }
        }
    }

    /// Policy iteration: alternate full evaluation with a greedy
    /// improvement sweep, for at most `max_rounds` rounds.
    ///
    /// Stops early when an improvement sweep leaves the policy unchanged.
    pub fn iterate(
        &mut self,
        discount: f64,
        theta: f64,
        max_rounds: usize,
    ) -> Result<PolicyIterationReport> {
        validate_planning(discount, theta)?;
        let mut report = PolicyIterationReport::default();
        for round in 0..max_rounds {
            let evaluation = self.evaluate(discount, theta)?;
            let policy_changes = self.improve(discount);
            report.rounds.push(PolicyRound {
                round,
                evaluation,
                policy_changes,
            });
            if policy_changes == 0 {
                report.stable = true;
                break;
            }
        }
        Ok(report)
    }

    /// Value iteration: each sweep writes the best one-step lookahead into
    /// the value table and its action into the policy table.
    ///
    /// Values are updated in place, so later cells in a sweep already see
    /// earlier cells' new values.
    pub fn solve(&mut self, discount: f64, theta: f64) -> Result<ConvergenceReport> {
        validate_planning(discount, theta)?;
        let mut report = ConvergenceReport::default();
        loop {
            let snapshot = self.network.values().clone();
            let mut max_delta: f64 = 0.0;
            for pos in self.network.positions() {
                if self.network.nodes()[pos].is_inactive() {
                    self.network.values_mut()[pos] = INACTIVE_VALUE;
                    continue;
                }
                let scores = self.lookahead(pos, discount);
                let (value, action) = pick_best(&scores, Objective::Maximize, &mut self.rng);
                max_delta = max_delta.max((value - snapshot[pos]).abs());
                self.network.values_mut()[pos] = value;
                self.network.policies_mut()[pos] = action;
            }
            report.record(max_delta);
            if max_delta < theta {
                return Ok(report);
            }
        }
    }

    /// Greedy improvement sweep. Returns how many cells changed action.
    fn improve(&mut self, discount: f64) -> usize {
        let mut changes = 0;
        for pos in self.network.positions() {
            if self.network.nodes()[pos].is_inactive() {
                continue;
            }
            let scores = self.lookahead(pos, discount);
            let (_, action) = pick_best(&scores, Objective::Maximize, &mut self.rng);
            if self.network.policies()[pos] != action {
                self.network.policies_mut()[pos] = action;
                changes += 1;
            }
        }
        changes
    }

    /// One-step lookahead value of every action at `pos`.
    fn lookahead(&self, pos: Position, discount: f64) -> ActionScores {
        let values = self.network.values();
        Action::ALL.map(|action| {
            let transition = self.network.step(pos, action);
            transition.reward + discount * values[transition.next]
        })
    }
}

impl Router for DynamicProgrammingSolver {
    fn send_packet(&mut self, origin: Position, max_hops: usize) -> Result<RouteOutcome> {
        self.network.follow_policy(origin, max_hops)
    }

    fn network(&self) -> &GridNetwork {
        &self.network
    }

    fn network_mut(&mut self) -> &mut GridNetwork {
        &mut self.network
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn on_topology_changed(&mut self) -> Result<()> {
        self.plan().map(|_| ())
    }
}
