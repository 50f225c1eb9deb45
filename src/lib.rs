//! `stock-insight` library crate.
//!
//! The binary (`stockai`) is a thin wrapper around this library so that the
//! chart pipeline is testable without spawning processes or touching the
//! network.

pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod insight;
pub mod logging;
pub mod math;
pub mod report;
pub mod tui;
