//! Subcommands of the `gridroute` binary

pub mod plan;
pub mod simulate;
