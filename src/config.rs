//! Solver configuration.
//!
//! Both config types follow the same builder style:
//!
//! ```
//! use gridroute::config::{PlannerConfig, PlanningMethod, RouterConfig, RouterKind};
//!
//! let planner = PlannerConfig::default()
//!     .with_method(PlanningMethod::PolicyIteration)
//!     .with_discount(0.95)
//!     .with_seed(7);
//! planner.validate()?;
//!
//! let router = RouterConfig::for_kind(RouterKind::Sarsa)
//!     .with_epsilon(0.1)
//!     .with_seed(7);
//! router.validate()?;
//! # Ok::<(), gridroute::Error>(())
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default discount factor γ.
pub const DEFAULT_DISCOUNT: f64 = 0.9;

/// Default convergence threshold θ.
pub const DEFAULT_THETA: f64 = 0.001;

/// Default cap on policy-iteration rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 15;

/// Default hop budget for a single packet.
pub const DEFAULT_MAX_HOPS: usize = 100;

/// Initial Q-router estimate: "unknown, assume a very long path".
pub const Q_ROUTING_UNKNOWN_COST: f64 = 10_000.0;

/// Dynamic-programming algorithm to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanningMethod {
    #[default]
    ValueIteration,
    PolicyIteration,
}

impl fmt::Display for PlanningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanningMethod::ValueIteration => f.write_str("Value Iteration"),
            PlanningMethod::PolicyIteration => f.write_str("Policy Iteration"),
        }
    }
}

impl FromStr for PlanningMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "value" | "value-iteration" => Ok(PlanningMethod::ValueIteration),
            "policy" | "policy-iteration" => Ok(PlanningMethod::PolicyIteration),
            other => Err(Error::UnknownVariant {
                kind: "planning method",
                input: other.to_string(),
                expected: "value, policy".to_string(),
            }),
        }
    }
}

/// Configuration for the dynamic-programming solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Algorithm used by [`crate::planning::DynamicProgrammingSolver::plan`]
    pub method: PlanningMethod,
    /// Discount factor γ, in (0, 1)
    pub discount: f64,
    /// Convergence threshold θ on the max per-sweep value change
    pub theta: f64,
    /// Cap on policy-iteration rounds
    pub max_rounds: usize,
    /// Random seed for tie-breaking
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            method: PlanningMethod::default(),
            discount: DEFAULT_DISCOUNT,
            theta: DEFAULT_THETA,
            max_rounds: DEFAULT_MAX_ROUNDS,
            seed: None,
        }
    }
}

impl PlannerConfig {
    pub fn with_method(mut self, method: PlanningMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check γ and θ.
    pub fn validate(&self) -> Result<()> {
        validate_discount(self.discount)?;
        validate_theta(self.theta)
    }
}

/// Which online router to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouterKind {
    QRouting,
    Sarsa,
}

impl fmt::Display for RouterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterKind::QRouting => f.write_str("Q-Routing"),
            RouterKind::Sarsa => f.write_str("SARSA"),
        }
    }
}

impl FromStr for RouterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "q" | "q-routing" | "qrouting" => Ok(RouterKind::QRouting),
            "sarsa" => Ok(RouterKind::Sarsa),
            other => Err(Error::UnknownVariant {
                kind: "router",
                input: other.to_string(),
                expected: "q-routing, sarsa".to_string(),
            }),
        }
    }
}

/// Configuration for an online router.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Exploration rate ε
    pub epsilon: f64,
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ (SARSA only; Q-routing propagates raw hop counts)
    pub discount: f64,
    /// Initial Q-value for every (node, action) pair
    pub q_init: f64,
    /// Random seed for exploration and tie-breaking
    pub seed: Option<u64>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::for_kind(RouterKind::Sarsa)
    }
}

impl RouterConfig {
    /// Defaults for the given router: ε = 0.05, α = 0.9, γ = 0.9, with
    /// Q-values starting at [`Q_ROUTING_UNKNOWN_COST`] for Q-routing and at
    /// zero for SARSA.
    pub fn for_kind(kind: RouterKind) -> Self {
        let q_init = match kind {
            RouterKind::QRouting => Q_ROUTING_UNKNOWN_COST,
            RouterKind::Sarsa => 0.0,
        };
        Self {
            epsilon: 0.05,
            learning_rate: 0.9,
            discount: DEFAULT_DISCOUNT,
            q_init,
            seed: None,
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_q_init(mut self, q_init: f64) -> Self {
        self.q_init = q_init;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check ε, α, γ and the initial Q-value.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                value: self.epsilon,
                expected: "a probability in [0, 1]",
            });
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "learning rate",
                value: self.learning_rate,
                expected: "a value in (0, 1]",
            });
        }
        if !self.q_init.is_finite() {
            return Err(Error::InvalidParameter {
                name: "initial Q-value",
                value: self.q_init,
                expected: "a finite number",
            });
        }
        validate_discount(self.discount)
    }
}

fn validate_discount(discount: f64) -> Result<()> {
    if discount > 0.0 && discount < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name: "discount factor",
            value: discount,
            expected: "a value in (0, 1)",
        })
    }
}

fn validate_theta(theta: f64) -> Result<()> {
    if theta > 0.0 && theta.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name: "convergence threshold",
            value: theta,
            expected: "a positive finite number",
        })
    }
}

pub(crate) fn validate_planning(discount: f64, theta: f64) -> Result<()> {
    validate_discount(discount)?;
    validate_theta(theta)
}
