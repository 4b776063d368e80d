//! Observer port - abstraction for simulation observation and data collection
//!
//! This port defines the interface for observing traffic simulations,
//! allowing composable data collection without coupling the simulation
//! loop to specific output formats or metrics.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    types::{Position, RouteOutcome},
};

/// Everything recorded about one simulated packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// 1-based packet number
    pub packet: usize,
    pub origin: Position,
    pub destination: Position,
    pub outcome: RouteOutcome,
    /// Shortest hop count from origin to destination on the unperturbed grid
    pub optimal_distance: usize,
    /// Realized hops over optimal distance (penalty value on timeout)
    pub ratio: f64,
}

/// Observer trait for monitoring traffic simulations
///
/// # Event Sequence
///
/// 1. `on_simulation_start(total_packets)` - once
/// 2. for each packet: `on_packet(record)`, followed by
///    `on_topology_changed(...)` when failures are injected after it
/// 3. `on_simulation_end()` - once
///
/// # Examples
///
/// ```no_run
/// use gridroute::ports::{Observer, PacketRecord};
///
/// struct TimeoutCounter {
///     timeouts: usize,
/// }
///
/// impl Observer for TimeoutCounter {
///     fn on_packet(&mut self, record: &PacketRecord) -> gridroute::Result<()> {
///         if !record.outcome.is_delivered() {
///             self.timeouts += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when the simulation starts.
    fn on_simulation_start(&mut self, _total_packets: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each packet has been routed.
    fn on_packet(&mut self, _record: &PacketRecord) -> Result<()> {
        Ok(())
    }

    /// Called after node failures were injected.
    ///
    /// # Parameters
    ///
    /// * `after_packet` - number of packets sent before the change
    /// * `disabled` - cells that are now inactive
    fn on_topology_changed(&mut self, _after_packet: usize, _disabled: &[Position]) -> Result<()> {
        Ok(())
    }

    /// Called when the simulation completes.
    fn on_simulation_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Lets a caller keep ownership of an observer and read it back after the run.
impl<O: Observer + ?Sized> Observer for &mut O {
    fn on_simulation_start(&mut self, total_packets: usize) -> Result<()> {
        (**self).on_simulation_start(total_packets)
    }

    fn on_packet(&mut self, record: &PacketRecord) -> Result<()> {
        (**self).on_packet(record)
    }

    fn on_topology_changed(&mut self, after_packet: usize, disabled: &[Position]) -> Result<()> {
        (**self).on_topology_changed(after_packet, disabled)
    }

    fn on_simulation_end(&mut self) -> Result<()> {
        (**self).on_simulation_end()
    }
}
