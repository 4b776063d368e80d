//! Q-routing: model-free hop-count estimation
//!
//! Q-values are estimated hops to the destination, so lower is better. Each
//! hop bootstraps the current estimate towards the successor's best
//! estimate; once a packet is delivered, every pair it used is overwritten
//! with the hop count it actually took from there.

use rand::rngs::StdRng;

use super::q_table::QTable;
use crate::{
    Result,
    config::RouterConfig,
    network::GridNetwork,
    ports::Router,
    selection::{Objective, build_rng, epsilon_greedy},
    types::{Action, Position, RouteOutcome},
};

/// Q-routing router (off-policy, cost minimizing)
#[derive(Debug, Clone)]
pub struct QRouter {
    network: GridNetwork,
    q_table: QTable,
    epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
    /// (node, action) pairs used by the last packet, in order
    trace: Vec<(Position, Action)>,
}

impl QRouter {
    /// Create a Q-router over `network`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidParameter`] if the configuration is
    /// invalid.
    pub fn new(network: GridNetwork, config: &RouterConfig) -> Result<Self> {
        config.validate()?;
        let (rows, cols) = network.shape();
        Ok(Self {
            q_table: QTable::new(rows, cols, config.learning_rate, 1.0, config.q_init),
            network,
            epsilon: config.epsilon,
            rng: build_rng(config.seed),
            rng_seed: config.seed,
            trace: Vec::new(),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = build_rng(Some(seed));
        self.rng_seed = Some(seed);
        self
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// (node, action) pairs used by the most recent packet, in order.
    pub fn last_trace(&self) -> &[(Position, Action)] {
        &self.trace
    }

    /// Forget everything learned and restart the generator.
    pub fn reset(&mut self) {
        self.q_table.reset();
        self.trace.clear();
        self.rng = build_rng(self.rng_seed);
    }

    /// ε-greedy action selection over estimated hop counts
    fn select_action(&mut self, node: Position) -> Action {
        let costs = self.q_table.row(node);
        epsilon_greedy(&costs, self.epsilon, Objective::Minimize, &mut self.rng)
    }

    /// Overwrite every pair of a delivered packet with its true remaining
    /// hop count. A pair used more than once keeps its last (smallest) count.
    fn replay(&mut self, hops: usize) {
        for (i, &(node, action)) in self.trace.iter().enumerate() {
            self.q_table.set(node, action, (hops - i) as f64);
        }
    }
}

impl Router for QRouter {
    fn send_packet(&mut self, origin: Position, max_hops: usize) -> Result<RouteOutcome> {
        self.network.node_type(origin)?;
        self.trace.clear();

        let mut current = origin;
        let mut action = self.select_action(current);
        let mut hops = 0;

        while !self.network.is_destination(current) {
            if hops >= max_hops {
                return Ok(RouteOutcome::TimedOut);
            }

            let transition = self.network.step(current, action);
            let next_action = self.select_action(transition.next);
            let done = self.network.is_destination(transition.next);

            self.q_table
                .cost_update(current, action, transition.next, done);
            self.network.set_policy(current, action)?;
            self.trace.push((current, action));

            current = transition.next;
            action = next_action;
            hops += 1;
        }

        self.replay(hops);
        Ok(RouteOutcome::Delivered(hops))
    }

    fn network(&self) -> &GridNetwork {
        &self.network
    }

    fn network_mut(&mut self) -> &mut GridNetwork {
        &mut self.network
    }

    fn name(&self) -> &str {
        "Q-Routing"
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{config::RouterKind, network::Topology};

    fn router(text: &str, epsilon: f64, seed: u64) -> QRouter {
        let mut rng = StdRng::seed_from_u64(seed);
        let network = GridNetwork::parse(text, Topology::Bounded, &mut rng).unwrap();
        let config = RouterConfig::for_kind(RouterKind::QRouting)
            .with_epsilon(epsilon)
            .with_seed(seed);
        QRouter::new(network, &config).unwrap()
    }

    #[test]
    fn test_origin_at_destination() {
        let mut q = router("-1", 0.05, 1);
        assert_eq!(
            q.send_packet(Position::new(0, 0), 100).unwrap(),
            RouteOutcome::Delivered(0)
        );
        assert!(q.last_trace().is_empty());
    }

    #[test]
    fn test_out_of_range_origin() {
        let mut q = router("0 -1", 0.05, 2);
        assert!(q.send_packet(Position::new(0, 2), 100).is_err());
    }

    #[test]
    fn test_zero_hop_budget_times_out() {
        let mut q = router("0 -1", 0.0, 3);
        assert_eq!(
            q.send_packet(Position::new(0, 0), 0).unwrap(),
            RouteOutcome::TimedOut
        );
    }

    #[test]
    fn test_replay_writes_remaining_hops() {
        let mut q = router("0 0 0\n0 0 0\n0 0 -1", 0.3, 4);
        let outcome = q.send_packet(Position::new(0, 0), 10_000).unwrap();
        let hops = outcome.hops().expect("3x3 grid is always reachable");
        let trace = q.last_trace().to_vec();
        assert_eq!(trace.len(), hops);

        for (i, &(node, action)) in trace.iter().enumerate() {
            let last_use = trace.iter().rposition(|p| *p == (node, action)).unwrap();
            assert!(last_use >= i);
            assert_eq!(q.q_table().get(node, action), (hops - last_use) as f64);
        }
    }

    #[test]
    fn test_policy_written_for_visited_nodes() {
        let mut q = router("0 0 -1", 0.0, 5);
        q.send_packet(Position::new(0, 0), 10_000).unwrap();
        let (last_node, last_action) = *q.last_trace().last().unwrap();
        assert_eq!(q.network().policy(last_node).unwrap(), last_action);
    }

    #[test]
    fn test_reset_restores_initial_costs() {
        let mut q = router("0 -1", 0.0, 6);
        q.send_packet(Position::new(0, 0), 10_000).unwrap();
        q.reset();
        assert!(
            q.q_table()
                .values()
                .all(|(_, _, cost)| cost == q.q_table().q_init())
        );
        assert!(q.last_trace().is_empty());
    }
}
