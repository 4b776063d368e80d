//! Experiment configuration files for CLI commands
//!
//! A JSON file may set any subset of the fields; everything else keeps its
//! default, and command-line flags override the file.
//!
//! ```json
//! {
//!   "topology": "torus",
//!   "router": { "epsilon": 0.1, "seed": 7 },
//!   "traffic": { "packets": 5000, "perturb_every": 500 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    config::{PlannerConfig, RouterConfig},
    network::Topology,
    pipeline::TrafficConfig,
};

/// Everything needed to reproduce a planning or simulation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub topology: Topology,
    pub planner: PlannerConfig,
    /// Router settings; a missing `q_init` takes the chosen router's default
    pub router: RouterOverrides,
    pub traffic: TrafficConfig,
}

/// Router settings as read from a file, before the router kind is known
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOverrides {
    pub epsilon: Option<f64>,
    pub learning_rate: Option<f64>,
    pub discount: Option<f64>,
    pub q_init: Option<f64>,
    pub seed: Option<u64>,
}

impl RouterOverrides {
    /// Apply the overrides on top of `base`.
    pub fn apply(&self, mut base: RouterConfig) -> RouterConfig {
        if let Some(epsilon) = self.epsilon {
            base.epsilon = epsilon;
        }
        if let Some(learning_rate) = self.learning_rate {
            base.learning_rate = learning_rate;
        }
        if let Some(discount) = self.discount {
            base.discount = discount;
        }
        if let Some(q_init) = self.q_init {
            base.q_init = q_init;
        }
        if let Some(seed) = self.seed {
            base.seed = Some(seed);
        }
        base
    }
}

impl ExperimentConfig {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open config '{}'", path.display()),
            source,
        })?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
