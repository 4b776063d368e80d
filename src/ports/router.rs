//! Router port - the contract traffic generation relies on
//!
//! Every solver, offline planner or online learner, routes one packet at a
//! time and owns the network it routes over.

use crate::{
    Result,
    network::GridNetwork,
    types::{Position, RouteOutcome},
};

/// Unified interface for every routing strategy.
///
/// # Examples
///
/// ```no_run
/// use gridroute::{Position, RouteOutcome, ports::Router};
///
/// fn mean_hops<R: Router>(router: &mut R, origins: &[Position]) -> gridroute::Result<f64> {
///     let mut total = 0;
///     for &origin in origins {
///         if let RouteOutcome::Delivered(hops) = router.send_packet(origin, 100)? {
///             total += hops;
///         }
///     }
///     Ok(total as f64 / origins.len() as f64)
/// }
/// ```
pub trait Router: Send {
    /// Route a single packet from `origin`, taking at most `max_hops` hops.
    ///
    /// Learning routers update their estimates and the network's policy
    /// table as a side effect.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfRange`] if `origin` is outside the grid.
    /// Running out of hops is not an error; it is reported as
    /// [`RouteOutcome::TimedOut`].
    fn send_packet(&mut self, origin: Position, max_hops: usize) -> Result<RouteOutcome>;

    /// The network this router routes over.
    fn network(&self) -> &GridNetwork;

    /// Mutable access to the network, for topology changes between packets.
    fn network_mut(&mut self) -> &mut GridNetwork;

    /// Name used in reports and renders.
    fn name(&self) -> &str;

    /// Called after the topology was changed between packets.
    ///
    /// Online routers adapt through subsequent packets, so the default does
    /// nothing. Planners override it to re-plan against the new topology.
    fn on_topology_changed(&mut self) -> Result<()> {
        Ok(())
    }
}
