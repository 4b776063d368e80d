//! CLI infrastructure for the gridroute toolkit
//!
//! This module provides the command-line interface for planning routing
//! policies and simulating traffic through learning routers.

pub mod commands;
pub mod config;
pub mod output;
