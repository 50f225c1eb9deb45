//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads configuration and credentials
//! - sets up logging and chart fonts
//! - runs the chart/analysis pipeline or the TUI

use std::path::Path;

use clap::Parser;

use crate::chart::fonts;
use crate::cli::{ChartArgs, Command, TuiArgs};
use crate::config::AppConfig;
use crate::data::AlphaVantageClient;
use crate::error::AppError;
use crate::insight::GeminiClient;
use crate::logging::{self, LogTarget};

pub mod pipeline;

/// Entry point for the `stockai` binary.
pub fn run() -> Result<(), AppError> {
    // `stockai` and `stockai -t AAPL` behave like `stockai tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Chart(args) => handle_chart(args, OutputMode::ChartOnly),
        Command::Analyze(args) => handle_chart(args, OutputMode::WithInsight),
        Command::Tui(args) => handle_tui(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    ChartOnly,
    WithInsight,
}

fn handle_chart(args: ChartArgs, mode: OutputMode) -> Result<(), AppError> {
    logging::init(LogTarget::Stderr)?;
    let mut config = AppConfig::from_env(mode == OutputMode::WithInsight)?;
    if let Some(dir) = args.out_dir {
        config.output_dir = dir;
    }
    fonts::ensure_font(config.font_path.as_deref());
    prepare_output_dir(&config.output_dir)?;

    let quotes = AlphaVantageClient::from_config(&config)?;
    let output_path = config.chart_path_for(&args.ticker, args.market);

    match mode {
        OutputMode::ChartOnly => {
            let run = pipeline::run(&args.ticker, args.market, &quotes, &output_path)?;
            print!("{}", crate::report::format_summary(&run.ticker, run.market, &run.table));
            println!("Chart: {}", run.artifact.path().display());
        }
        OutputMode::WithInsight => {
            let insights = GeminiClient::from_config(&config)?;
            let analysis = pipeline::analyze(&args.ticker, args.market, &quotes, &insights, &output_path)?;
            let run = &analysis.run;
            print!("{}", crate::report::format_summary(&run.ticker, run.market, &run.table));
            println!("Chart: {}", run.artifact.path().display());
            println!("\n=== Analysis Results ===\n{}", analysis.narrative.text());
        }
    }

    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let mut config = AppConfig::from_env(true)?;
    if let Some(dir) = args.out_dir.clone() {
        config.output_dir = dir;
    }
    prepare_output_dir(&config.output_dir)?;
    logging::init(LogTarget::File(&config.output_dir))?;
    fonts::ensure_font(config.font_path.as_deref());

    crate::tui::run(config, args)
}

/// Chart output directory creation belongs to the app, not the renderer.
pub fn prepare_output_dir(dir: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create output dir '{}': {e}", dir.display())))
}

/// Rewrite argv so `stockai` defaults to `stockai tui`.
///
/// Rules:
/// - `stockai`                      -> `stockai tui`
/// - `stockai -t AAPL ...`          -> `stockai tui -t AAPL ...`
/// - `stockai --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "chart" | "analyze" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["stockai"])), argv(&["stockai", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["stockai", "-t", "AAPL"])),
            argv(&["stockai", "tui", "-t", "AAPL"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["stockai", "chart"])), argv(&["stockai", "chart"]));
        assert_eq!(rewrite_args(argv(&["stockai", "--help"])), argv(&["stockai", "--help"]));
    }

    #[test]
    fn output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        prepare_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
