//! Ports (trait boundaries) between the routing core and its collaborators.
//!
//! Solvers implement [`Router`]; traffic simulations report through
//! [`Observer`] adapters.

pub mod observer;
pub mod router;

pub use observer::{Observer, PacketRecord};
pub use router::Router;
