//! Traffic generation: route random packets and measure path quality

use std::path::Path;

use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::stats::RatioStats;
use crate::{
    Error, Result,
    config::DEFAULT_MAX_HOPS,
    ports::{Observer, PacketRecord, Router},
    selection::build_rng,
    types::{NodeType, Position, RouteOutcome},
};

/// Ratio recorded for a packet that never arrived.
pub const DEFAULT_TIMEOUT_PENALTY: f64 = 100.0;

/// Traffic configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// Number of packets to send
    pub packets: usize,

    /// Hop budget per packet
    pub max_hops: usize,

    /// Destination used for the optimal-distance baseline
    pub destination: Position,

    /// Whether to inject node failures during the run
    pub perturb: bool,

    /// Inject failures after every this many packets
    pub perturb_every: usize,

    /// Upper bound on nodes disabled per perturbation
    pub max_disabled: usize,

    /// Ratio recorded for a timed-out packet
    pub timeout_penalty: f64,

    /// Random seed for origins and failures
    pub seed: Option<u64>,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            packets: 10_000,
            max_hops: DEFAULT_MAX_HOPS,
            destination: Position::new(2, 3),
            perturb: true,
            perturb_every: 1_000,
            max_disabled: 3,
            timeout_penalty: DEFAULT_TIMEOUT_PENALTY,
            seed: None,
        }
    }
}

impl TrafficConfig {
    pub fn with_packets(mut self, packets: usize) -> Self {
        self.packets = packets;
        self
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn with_destination(mut self, destination: Position) -> Self {
        self.destination = destination;
        self
    }

    /// Disable failure injection.
    pub fn without_perturbation(mut self) -> Self {
        self.perturb = false;
        self
    }

    pub fn with_perturbation(mut self, every: usize, max_disabled: usize) -> Self {
        self.perturb = true;
        self.perturb_every = every;
        self.max_disabled = max_disabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a zero perturbation interval
    /// or a non-positive timeout penalty.
    pub fn validate(&self) -> Result<()> {
        if self.perturb && self.perturb_every == 0 {
            return Err(Error::InvalidParameter {
                name: "perturbation interval",
                value: 0.0,
                expected: "at least 1 packet",
            });
        }
        if !(self.timeout_penalty.is_finite() && self.timeout_penalty > 0.0) {
            return Err(Error::InvalidParameter {
                name: "timeout penalty",
                value: self.timeout_penalty,
                expected: "a positive finite number",
            });
        }
        Ok(())
    }

    /// Ratio of realized to optimal path length for one packet.
    ///
    /// A packet that starts at its destination scores 1.0 and a timed-out
    /// packet scores the timeout penalty.
    pub fn ratio(&self, outcome: RouteOutcome, optimal_distance: usize) -> f64 {
        match outcome {
            _ if optimal_distance == 0 => 1.0,
            RouteOutcome::Delivered(hops) => hops as f64 / optimal_distance as f64,
            RouteOutcome::TimedOut => self.timeout_penalty,
        }
    }
}

/// Result of a traffic run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficResult {
    /// Router that carried the traffic
    pub router: String,

    /// Total packets sent
    pub packets: usize,

    /// Packets that reached a destination
    pub delivered: usize,

    /// Packets that ran out of hops
    pub timed_out: usize,

    /// Number of failure injections
    pub perturbations: usize,

    /// Per-packet hop ratio, in send order
    pub ratios: Vec<f64>,

    pub mean_ratio: f64,
    pub median_ratio: f64,
}

#[derive(Serialize)]
struct RatioRow {
    packet: usize,
    ratio: f64,
}

impl TrafficResult {
    /// Create a result from per-packet ratios
    pub fn new(
        router: impl Into<String>,
        ratios: Vec<f64>,
        delivered: usize,
        timed_out: usize,
        perturbations: usize,
    ) -> Self {
        let stats = RatioStats::from_values(&ratios);
        Self {
            router: router.into(),
            packets: ratios.len(),
            delivered,
            timed_out,
            perturbations,
            ratios,
            mean_ratio: stats.mean,
            median_ratio: stats.median,
        }
    }

    /// Fraction of packets delivered
    pub fn delivery_rate(&self) -> f64 {
        if self.packets == 0 {
            0.0
        } else {
            self.delivered as f64 / self.packets as f64
        }
    }

    pub fn stats(&self) -> RatioStats {
        RatioStats::from_values(&self.ratios)
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }

    /// Write `packet,ratio` rows (1-based packet numbers) to a CSV file
    pub fn export_ratios<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for (i, &ratio) in self.ratios.iter().enumerate() {
            writer.serialize(RatioRow {
                packet: i + 1,
                ratio,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Sends random packets through a router, optionally failing nodes as it goes
///
/// Failures do not accumulate: each perturbation first
/// restores the topology the network was loaded with, then disables a fresh
/// random set of nodes. The destination is never disabled.
pub struct TrafficGenerator<'a> {
    config: TrafficConfig,
    rng: StdRng,
    observers: Vec<Box<dyn Observer + 'a>>,
}

impl<'a> TrafficGenerator<'a> {
    /// Create a new traffic generator
    pub fn new(config: TrafficConfig) -> Self {
        Self {
            rng: build_rng(config.seed),
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the generator
    pub fn with_observer(mut self, observer: Box<dyn Observer + 'a>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrafficConfig {
        &self.config
    }

    /// Route `config.packets` packets from uniformly random origins.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, if the configured
    /// destination is outside the grid or not a destination node, or if an
    /// observer fails.
    pub fn run(&mut self, router: &mut dyn Router) -> Result<TrafficResult> {
        self.config.validate()?;

        let destination = self.config.destination;
        if router.network().node_type(destination)? != NodeType::Destination {
            return Err(Error::NotADestination {
                position: destination,
            });
        }

        let (rows, cols) = router.network().shape();
        let mut ratios = Vec::with_capacity(self.config.packets);
        let mut delivered = 0;
        let mut timed_out = 0;
        let mut perturbations = 0;

        for observer in &mut self.observers {
            observer.on_simulation_start(self.config.packets)?;
        }

        for packet in 1..=self.config.packets {
            let origin = Position::new(
                self.rng.random_range(0..rows) as i32,
                self.rng.random_range(0..cols) as i32,
            );

            let outcome = router.send_packet(origin, self.config.max_hops)?;
            match outcome {
                RouteOutcome::Delivered(_) => delivered += 1,
                RouteOutcome::TimedOut => timed_out += 1,
            }

            let optimal_distance = router.network().distance(origin, destination);
            let ratio = self.config.ratio(outcome, optimal_distance);
            ratios.push(ratio);

            let record = PacketRecord {
                packet,
                origin,
                destination,
                outcome,
                optimal_distance,
                ratio,
            };
            for observer in &mut self.observers {
                observer.on_packet(&record)?;
            }

            if self.config.perturb && packet % self.config.perturb_every == 0 {
                let disabled = router.network_mut().disable_random_nodes(
                    destination,
                    self.config.max_disabled,
                    &mut self.rng,
                )?;
                router.on_topology_changed()?;
                perturbations += 1;

                for observer in &mut self.observers {
                    observer.on_topology_changed(packet, &disabled)?;
                }
            }
        }

        for observer in &mut self.observers {
            observer.on_simulation_end()?;
        }

        Ok(TrafficResult::new(
            router.name(),
            ratios,
            delivered,
            timed_out,
            perturbations,
        ))
    }
}
