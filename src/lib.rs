//! Packet routing on grid networks
//!
//! A grid of nodes is modelled as a Markov decision process: each cell is a
//! state, each of the four compass moves is an action, every hop costs one
//! unit and reaching the destination costs nothing. This crate provides:
//! - The network model with bounded or toroidal topology and node failures
//! - Offline planning with policy evaluation, policy iteration and value iteration
//! - Online routing with Q-routing and SARSA
//! - A traffic generator that measures realized versus optimal path length
//! - Observers, a text renderer and the `gridroute` CLI

pub mod cli;
pub mod config;
pub mod error;
pub mod network;
pub mod pipeline;
pub mod planning;
pub mod ports;
pub mod render;
pub mod routing;
pub mod selection;
pub mod types;

pub use config::{PlannerConfig, PlanningMethod, RouterConfig, RouterKind};
pub use error::{Error, Result};
pub use network::{GridNetwork, Topology};
pub use planning::DynamicProgrammingSolver;
pub use ports::{Observer, Router};
pub use routing::{QRouter, SarsaRouter};
pub use types::{Action, NodeType, Position, RouteOutcome};
