//! Grid network model
//!
//! The network is the single source of truth for topology and for the
//! transition and reward function. Solvers never move packets themselves;
//! they ask [`GridNetwork::step`] where an action leads.

pub mod grid;
pub mod map;
pub mod mdp;
pub mod topology;

pub use grid::Grid;
pub use map::{format_nodes, parse_nodes};
pub use mdp::{DESTINATION_REWARD, GridNetwork, STEP_REWARD, Transition};
pub use topology::Topology;
