//! The routing MDP: topology, transition and reward function, and the
//! value and policy tables every solver writes into.

use rand::Rng;

use super::{grid::Grid, topology::Topology};
use crate::{
    Result,
    selection::random_action,
    types::{Action, NodeType, Position, RouteOutcome},
};

/// Reward for a transition that ends on a destination node.
pub const DESTINATION_REWARD: f64 = 0.0;

/// Reward for every other transition.
pub const STEP_REWARD: f64 = -1.0;

/// Outcome of a single hop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next: Position,
    pub reward: f64,
}

/// Grid-shaped packet network modelled as an MDP.
///
/// The node grid may be perturbed between packets through
/// [`GridNetwork::disable_random_nodes`], but the shape never changes, so
/// the value and policy tables (and any solver's Q-table) stay aligned with
/// it for the network's whole lifetime.
#[derive(Debug, Clone)]
pub struct GridNetwork {
    nodes: Grid<NodeType>,
    original: Grid<NodeType>,
    values: Grid<f64>,
    policy: Grid<Action>,
    topology: Topology,
}

impl GridNetwork {
    /// Create a network over `nodes` with zeroed values and a uniformly
    /// random initial policy.
    pub fn new<R: Rng + ?Sized>(nodes: Grid<NodeType>, topology: Topology, rng: &mut R) -> Self {
        let (rows, cols) = nodes.shape();
        let policy = Grid::from_fn(rows, cols, |_| random_action(rng));
        Self {
            values: Grid::filled(rows, cols, 0.0),
            original: nodes.clone(),
            nodes,
            policy,
            topology,
        }
    }

    pub fn rows(&self) -> usize {
        self.nodes.rows()
    }

    pub fn cols(&self) -> usize {
        self.nodes.cols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.nodes.shape()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Shortest hop count between two cells before any node fails.
    pub fn distance(&self, a: Position, b: Position) -> usize {
        self.topology.distance(a, b, self.rows(), self.cols())
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.nodes.contains(pos)
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        self.nodes.positions()
    }

    /// Current node grid.
    pub fn nodes(&self) -> &Grid<NodeType> {
        &self.nodes
    }

    /// Node grid as loaded, before any perturbation.
    pub fn original_nodes(&self) -> &Grid<NodeType> {
        &self.original
    }

    /// Type of the node at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfRange`] if `pos` is outside the grid.
    pub fn node_type(&self, pos: Position) -> Result<NodeType> {
        self.nodes.try_get(pos).copied()
    }

    pub fn is_destination(&self, pos: Position) -> bool {
        self.nodes.get(pos) == Some(&NodeType::Destination)
    }

    /// Whether `pos` is on the grid and not failed.
    pub fn is_routable(&self, pos: Position) -> bool {
        matches!(
            self.nodes.get(pos),
            Some(NodeType::Active | NodeType::Destination)
        )
    }

    /// Every destination cell, row-major.
    pub fn destinations(&self) -> Vec<Position> {
        self.nodes
            .iter()
            .filter(|(_, node)| **node == NodeType::Destination)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Apply `action` at `pos`.
    ///
    /// Moves off a bounded grid, into a failed node, or out of a failed node
    /// leave the packet where it is. Landing on a destination earns
    /// [`DESTINATION_REWARD`]; every other hop, self-loops included, earns
    /// [`STEP_REWARD`]. Never fails.
    pub fn step(&self, pos: Position, action: Action) -> Transition {
        let next = if self.is_routable(pos) {
            self.topology
                .resolve(pos.offset(action), self.rows(), self.cols())
                .filter(|candidate| self.is_routable(*candidate))
                .unwrap_or(pos)
        } else {
            pos
        };

        let reward = if self.is_destination(next) {
            DESTINATION_REWARD
        } else {
            STEP_REWARD
        };
        Transition { next, reward }
    }

    /// Preferred action at `pos`.
    pub fn policy(&self, pos: Position) -> Result<Action> {
        self.policy.try_get(pos).copied()
    }

    pub fn set_policy(&mut self, pos: Position, action: Action) -> Result<()> {
        *self.policy.try_get_mut(pos)? = action;
        Ok(())
    }

    /// Planning value estimate at `pos`.
    pub fn value(&self, pos: Position) -> Result<f64> {
        self.values.try_get(pos).copied()
    }

    pub fn set_value(&mut self, pos: Position, value: f64) -> Result<()> {
        *self.values.try_get_mut(pos)? = value;
        Ok(())
    }

    pub fn values(&self) -> &Grid<f64> {
        &self.values
    }

    pub fn policies(&self) -> &Grid<Action> {
        &self.policy
    }

    pub(crate) fn values_mut(&mut self) -> &mut Grid<f64> {
        &mut self.values
    }

    pub(crate) fn policies_mut(&mut self) -> &mut Grid<Action> {
        &mut self.policy
    }

    /// Put back the topology the network was created with.
    pub fn restore_topology(&mut self) {
        self.nodes = self.original.clone();
    }

    /// Simulate node failures.
    ///
    /// Restores the original topology, marks between 0 and `max_count`
    /// (inclusive) uniformly chosen cells inactive, then forces `destination`
    /// back to [`NodeType::Destination`]. Cells may be drawn more than once.
    /// Returns the cells that ended up disabled.
    ///
    /// Must not be called while a packet is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfRange`] if `destination` is outside the
    /// grid; the topology is left untouched in that case.
    pub fn disable_random_nodes<R: Rng + ?Sized>(
        &mut self,
        destination: Position,
        max_count: usize,
        rng: &mut R,
    ) -> Result<Vec<Position>> {
        self.nodes.try_get(destination)?;
        self.restore_topology();

        let (rows, cols) = self.shape();
        let count = rng.random_range(0..=max_count);
        let mut disabled = Vec::with_capacity(count);
        for _ in 0..count {
            let pos = Position::new(
                rng.random_range(0..rows) as i32,
                rng.random_range(0..cols) as i32,
            );
            self.nodes[pos] = NodeType::Inactive;
            disabled.push(pos);
        }
        self.nodes[destination] = NodeType::Destination;

        disabled.sort();
        disabled.dedup();
        disabled.retain(|pos| *pos != destination);
        Ok(disabled)
    }

    /// Route a packet by following the policy table without learning.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfRange`] if `origin` is outside the grid.
    pub fn follow_policy(&self, origin: Position, max_hops: usize) -> Result<RouteOutcome> {
        self.node_type(origin)?;
        let mut current = origin;
        let mut hops = 0;
        while !self.is_destination(current) {
            if hops >= max_hops {
                return Ok(RouteOutcome::TimedOut);
            }
            current = self.step(current, self.policy[current]).next;
            hops += 1;
        }
        Ok(RouteOutcome::Delivered(hops))
    }
}
