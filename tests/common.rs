//! Common test utilities for the gridroute test suite.
//!
//! Map builders, seeded networks and a breadth-first reference for
//! shortest hop counts.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use gridroute::{
    Action, GridNetwork, NodeType, Position, Topology,
    network::{Grid, format_nodes},
};
use rand::{SeedableRng, rngs::StdRng};

/// The 4x4 mesh shipped in `maps/mesh4x4.txt`: all active, destination (2, 3).
pub const MESH_4X4: &str = "0 0 0 0\n0 0 0 0\n0 0 0 -1\n0 0 0 0\n";

/// Map text for an all-active `rows` x `cols` grid with one destination.
pub fn mesh(rows: usize, cols: usize, destination: Position) -> String {
    let nodes = Grid::from_fn(rows, cols, |pos| {
        if pos == destination {
            NodeType::Destination
        } else {
            NodeType::Active
        }
    });
    format_nodes(&nodes)
}

/// Map text for a 1 x `len` corridor whose last cell is the destination.
pub fn corridor(len: usize) -> String {
    mesh(1, len, Position::new(0, len as i32 - 1))
}

/// Parse `text` into a bounded network with a seeded initial policy.
pub fn network(text: &str, seed: u64) -> GridNetwork {
    network_with(text, Topology::Bounded, seed)
}

pub fn network_with(text: &str, topology: Topology, seed: u64) -> GridNetwork {
    let mut rng = StdRng::seed_from_u64(seed);
    GridNetwork::parse(text, topology, &mut rng).expect("test map parses")
}

/// Shortest hop count from every cell that can reach a destination, found by
/// breadth-first search over the transition model.
pub fn shortest_hops(network: &GridNetwork) -> HashMap<Position, usize> {
    let mut distances = HashMap::new();
    for origin in network.positions() {
        if let Some(hops) = bfs(network, origin) {
            distances.insert(origin, hops);
        }
    }
    distances
}

fn bfs(network: &GridNetwork, origin: Position) -> Option<usize> {
    let mut seen = vec![origin];
    let mut queue = VecDeque::from([(origin, 0)]);
    while let Some((pos, hops)) = queue.pop_front() {
        if network.is_destination(pos) {
            return Some(hops);
        }
        for action in Action::ALL {
            let next = network.step(pos, action).next;
            if !seen.contains(&next) {
                seen.push(next);
                queue.push_back((next, hops + 1));
            }
        }
    }
    None
}
