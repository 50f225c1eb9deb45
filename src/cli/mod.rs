//! Command-line parsing.
//!
//! Argument parsing and command dispatch stay separate from the pipeline code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Market;

pub const DEFAULT_TICKER: &str = "RELIANCE";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "stockai", version, about = "Daily stock charts with AI narrative analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch daily prices, render the three-panel chart, and print a summary.
    Chart(ChartArgs),
    /// Render the chart and print the model's narrative analysis of it.
    Analyze(ChartArgs),
    /// Launch the interactive TUI (input screen -> results screen).
    Tui(TuiArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ChartArgs {
    /// Ticker symbol (e.g. RELIANCE, AAPL).
    #[arg(short = 't', long, default_value = DEFAULT_TICKER)]
    pub ticker: String,

    /// Market the ticker is listed on.
    #[arg(short = 'm', long, value_enum, ignore_case = true, default_value_t = Market::Bse)]
    pub market: Market,

    /// Directory for rendered charts (overrides STOCK_INSIGHT_OUTPUT_DIR).
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    /// Initial ticker symbol.
    #[arg(short = 't', long, default_value = DEFAULT_TICKER)]
    pub ticker: String,

    /// Initial market.
    #[arg(short = 'm', long, value_enum, ignore_case = true, default_value_t = Market::Bse)]
    pub market: Market,

    /// Directory for rendered charts and the log file.
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_defaults() {
        let cli = Cli::parse_from(["stockai", "chart"]);
        let Command::Chart(args) = cli.command else {
            panic!("expected chart command");
        };
        assert_eq!(args.ticker, DEFAULT_TICKER);
        assert_eq!(args.market, Market::Bse);
        assert!(args.out_dir.is_none());
    }

    #[test]
    fn analyze_accepts_market_and_out_dir() {
        let cli = Cli::parse_from(["stockai", "analyze", "-t", "AAPL", "-m", "NASDAQ", "-o", "out"]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze command");
        };
        assert_eq!(args.market, Market::Nasdaq);
        assert_eq!(args.out_dir, Some(PathBuf::from("out")));
    }
}
