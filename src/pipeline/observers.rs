//! Observer adapters for traffic simulations
//!
//! Observers allow composable data collection during a run without coupling
//! the traffic loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::stats::RatioStats;
use crate::{
    Error, Result,
    ports::{Observer, PacketRecord},
    types::{Position, RouteOutcome},
};

/// One line of a JSONL observation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TrafficEvent {
    Packet(PacketRecord),
    TopologyChanged {
        after_packet: usize,
        disabled: Vec<Position>,
    },
}

/// Progress bar observer - Shows simulation progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    delivered: usize,
    timed_out: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            delivered: 0,
            timed_out: 0,
        }
    }

    fn message(&self) -> String {
        format!("{} timeouts:{}", self.delivered, self.timed_out)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_simulation_start(&mut self, total_packets: usize) -> Result<()> {
        let pb = ProgressBar::new(total_packets as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} packets (delivered:{msg})",
                )
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_packet(&mut self, record: &PacketRecord) -> Result<()> {
        match record.outcome {
            RouteOutcome::Delivered(_) => self.delivered += 1,
            RouteOutcome::TimedOut => self.timed_out += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(record.packet as u64);
            // Redrawing the message every packet dominates small runs
            if record.packet % 100 == 0 {
                pb.set_message(self.message());
            }
        }
        Ok(())
    }

    fn on_simulation_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks delivery counts and hop ratios
#[derive(Debug, Default)]
pub struct MetricsObserver {
    delivered: usize,
    timed_out: usize,
    hops: Vec<f64>,
    ratios: Vec<f64>,
    topology_changes: usize,
    nodes_disabled: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_packets(&self) -> usize {
        self.delivered + self.timed_out
    }

    /// Get current delivery rate
    pub fn delivery_rate(&self) -> f64 {
        let total = self.total_packets();
        if total == 0 {
            0.0
        } else {
            self.delivered as f64 / total as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_packets: self.total_packets(),
            delivered: self.delivered,
            timed_out: self.timed_out,
            delivery_rate: self.delivery_rate(),
            hops: RatioStats::from_values(&self.hops),
            ratio: RatioStats::from_values(&self.ratios),
            topology_changes: self.topology_changes,
            nodes_disabled: self.nodes_disabled,
        }
    }
}

/// Summary of simulation metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_packets: usize,
    pub delivered: usize,
    pub timed_out: usize,
    pub delivery_rate: f64,
    /// Hop counts of delivered packets
    pub hops: RatioStats,
    /// Hop ratios of all packets, timeouts at their penalty
    pub ratio: RatioStats,
    pub topology_changes: usize,
    /// Disabled cells summed over all topology changes
    pub nodes_disabled: usize,
}

impl Observer for MetricsObserver {
    fn on_packet(&mut self, record: &PacketRecord) -> Result<()> {
        match record.outcome {
            RouteOutcome::Delivered(hops) => {
                self.delivered += 1;
                self.hops.push(hops as f64);
            }
            RouteOutcome::TimedOut => self.timed_out += 1,
        }
        self.ratios.push(record.ratio);
        Ok(())
    }

    fn on_topology_changed(&mut self, _after_packet: usize, disabled: &[Position]) -> Result<()> {
        self.topology_changes += 1;
        self.nodes_disabled += disabled.len();
        Ok(())
    }
}

/// JSONL observer - Exports packets and topology changes as JSON Lines
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create observation log '{}'", path.display()),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write_event(&mut self, event: &TrafficEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }
}

impl Observer for JsonlObserver {
    fn on_packet(&mut self, record: &PacketRecord) -> Result<()> {
        self.write_event(&TrafficEvent::Packet(record.clone()))
    }

    fn on_topology_changed(&mut self, after_packet: usize, disabled: &[Position]) -> Result<()> {
        self.write_event(&TrafficEvent::TopologyChanged {
            after_packet,
            disabled: disabled.to_vec(),
        })?;
        self.writer.flush()?;
        Ok(())
    }

    fn on_simulation_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
