//! Meeting attendance report CLI library.
//!
//! This crate provides the CLI interface for building attendance reports.

mod cli;
pub mod commands;
mod config;
pub mod csv;

pub use cli::{Cli, Commands};
pub use config::Config;
