//! Reporting utilities: table summaries and formatted terminal output.

pub mod format;

pub use format::*;
