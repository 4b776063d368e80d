//! SARSA router (on-policy TD control)
//!
//! Q-values estimate the discounted return of routing from a node: 0 for
//! the hop onto the destination, -1 for every other hop. The update uses
//! the action actually chosen at the next node, so exploration is priced
//! into the estimates.

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

/// SARSA router
#[derive(Debug, Clone)]
pub struct SarsaRouter {
    network: GridNetwork,
    q_table: QTable,
    epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl SarsaRouter {
    /// Create a SARSA router over `network`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidParameter`] if the configuration is
    /// invalid.
    pub fn new(network: GridNetwork, config: &RouterConfig) -> Result<Self> {
        config.validate()?;
        let (rows, cols) = network.shape();
        Ok(Self {
            q_table: QTable::new(
                rows,
                cols,
                config.learning_rate,
                config.discount,
                config.q_init,
            ),
            network,
            epsilon: config.epsilon,
            rng: build_rng(config.seed),
            rng_seed: config.seed,
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

    /// Forget everything learned and restart the generator.
    pub fn reset(&mut self) {
        self.q_table.reset();
        self.rng = build_rng(self.rng_seed);
    }

    fn select_action(&mut self, node: Position) -> Action {
        let returns = self.q_table.row(node);
        epsilon_greedy(&returns, self.epsilon, Objective::Maximize, &mut self.rng)
    }
}

impl Router for SarsaRouter {
    fn send_packet(&mut self, origin: Position, max_hops: usize) -> Result<RouteOutcome> {
        self.network.node_type(origin)?;

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

            self.q_table.sarsa_update(
                current,
                action,
                transition.reward,
                transition.next,
                next_action,
                done,
            );
            self.network.set_policy(current, action)?;

            current = transition.next;
            action = next_action;
            hops += 1;
        }

        Ok(RouteOutcome::Delivered(hops))
    }

    fn network(&self) -> &GridNetwork {
        &self.network
    }

    fn network_mut(&mut self) -> &mut GridNetwork {
        &mut self.network
    }

    fn name(&self) -> &str {
        "SARSA"
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{config::RouterKind, network::Topology};

    fn router(text: &str, epsilon: f64, seed: u64) -> SarsaRouter {
        let mut rng = StdRng::seed_from_u64(seed);
        let network = GridNetwork::parse(text, Topology::Bounded, &mut rng).unwrap();
        let config = RouterConfig::for_kind(RouterKind::Sarsa)
            .with_epsilon(epsilon)
            .with_seed(seed);
        SarsaRouter::new(network, &config).unwrap()
    }

    #[test]
    fn test_origin_at_destination() {
        let mut sarsa = router("-1", 0.05, 1);
        assert_eq!(
            sarsa.send_packet(Position::new(0, 0), 100).unwrap(),
            RouteOutcome::Delivered(0)
        );
    }

    #[test]
    fn test_timeout_is_reported() {
        // Destination walled off
        let mut sarsa = router("0 1 -1", 0.05, 2);
        assert_eq!(
            sarsa.send_packet(Position::new(0, 0), 25).unwrap(),
            RouteOutcome::TimedOut
        );
    }

    #[test]
    fn test_entering_destination_keeps_zero_estimate() {
        let mut sarsa = router("0 -1", 0.0, 3);
        for _ in 0..20 {
            sarsa.send_packet(Position::new(0, 0), 1_000).unwrap();
        }
        let q = sarsa.q_table().get(Position::new(0, 0), Action::Right);
        assert_eq!(q, 0.0);
        assert_eq!(
            sarsa.network().policy(Position::new(0, 0)).unwrap(),
            Action::Right
        );
    }

    #[test]
    fn test_self_loop_is_penalized() {
        let mut sarsa = router("0 -1", 1.0, 4);
        for _ in 0..50 {
            sarsa.send_packet(Position::new(0, 0), 1_000).unwrap();
        }
        let table = sarsa.q_table();
        let origin = Position::new(0, 0);
        for action in [Action::Left, Action::Up, Action::Down] {
            assert!(table.get(origin, action) < table.get(origin, Action::Right));
        }
    }
}
