//! Dynamic-programming planners
//!
//! Planners know the full transition model of the network and compute a
//! policy before any packet is sent.
//!
//! | Method | Per sweep | Stops when |
//! |--------|-----------|------------|
//! | Policy evaluation | `V(s) ← r + γ V_old(s')` for the fixed policy | max change < θ |
//! | Policy iteration | full evaluation, then greedy improvement | policy unchanged or round cap |
//! | Value iteration | `V(s) ← max_a [r + γ V(s')]`, policy updated alongside | max change < θ |
//!
//! ```no_run
//! use gridroute::{
//!     config::PlannerConfig,
//!     network::{GridNetwork, Topology},
//!     planning::DynamicProgrammingSolver,
//! };
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let network = GridNetwork::load("maps/mesh4x4.txt", Topology::Bounded, &mut rng)?;
//! let mut planner = DynamicProgrammingSolver::new(network, PlannerConfig::default())?;
//! let report = planner.solve(0.9, 0.001)?;
//! println!("converged after {} sweeps", report.sweeps);
//! # Ok::<(), gridroute::Error>(())
//! ```

pub mod dynamic;
pub mod report;

pub use dynamic::{DynamicProgrammingSolver, INACTIVE_VALUE};
pub use report::{ConvergenceReport, PlanReport, PolicyIterationReport, PolicyRound};
