//! Numeric utilities: trailing-window statistics over price columns.

pub mod rolling;

pub use rolling::*;
