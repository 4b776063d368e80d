//! Traffic simulation pipeline
//!
//! This module provides:
//! - A traffic generator that routes random packets through any router
//! - Optional node-failure injection between packets
//! - Observer adapters for progress, metrics and JSONL logs

pub mod observers;
pub mod stats;
pub mod traffic;

pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver, TrafficEvent};
pub use stats::RatioStats;
pub use traffic::{DEFAULT_TIMEOUT_PENALTY, TrafficConfig, TrafficGenerator, TrafficResult};

pub use crate::ports::{Observer, PacketRecord, Router};
