//! Online temporal-difference routers
//!
//! Both routers learn while they forward packets and write the action they
//! used at each node back into the network's policy table.
//!
//! ## Key Differences
//!
//! | Aspect | Q-routing | SARSA |
//! |--------|-----------|-------|
//! | Q-value meaning | Estimated hops to destination | Discounted return (-1 per hop) |
//! | Greedy choice | min_a Q(s,a) | max_a Q(s,a) |
//! | Update target | min_a' Q(s',a') | r + γ Q(s',a') for the chosen a' |
//! | After delivery | Replays the true remaining hop counts | Nothing extra |
//! | Initial Q | Large "unknown" cost | 0 |
//!
//! ```no_run
//! use gridroute::{
//!     config::{RouterConfig, RouterKind},
//!     network::{GridNetwork, Topology},
//!     routing::build_router,
//!     types::Position,
//! };
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let network = GridNetwork::load("maps/mesh4x4.txt", Topology::Bounded, &mut rng)?;
//! let config = RouterConfig::for_kind(RouterKind::QRouting).with_seed(1);
//! let mut router = build_router(RouterKind::QRouting, network, &config)?;
//! let outcome = router.send_packet(Position::new(0, 0), 100)?;
//! println!("{}: {outcome:?}", router.name());
//! # Ok::<(), gridroute::Error>(())
//! ```

pub mod q_router;
pub mod q_table;
pub mod sarsa;

pub use q_router::QRouter;
pub use q_table::QTable;
pub use sarsa::SarsaRouter;

use crate::{
    Result,
    config::{RouterConfig, RouterKind},
    network::GridNetwork,
    ports::Router,
};

/// Build a boxed router of the requested kind.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidParameter`] if `config` is invalid.
pub fn build_router(
    kind: RouterKind,
    network: GridNetwork,
    config: &RouterConfig,
) -> Result<Box<dyn Router>> {
    Ok(match kind {
        RouterKind::QRouting => Box::new(QRouter::new(network, config)?),
        RouterKind::Sarsa => Box::new(SarsaRouter::new(network, config)?),
    })
}
