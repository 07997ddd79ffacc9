//! Tooling
//!
//! Command-line access to the snapshot hierarchy backed by the disk probe.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
