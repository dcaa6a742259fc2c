mod analysis;
mod config;
mod error;
mod indicators;
mod models;
mod output;
mod scoring;
mod transcript;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::analysis::Analyzer;
use crate::config::ScoringConfig;
use crate::error::AnalysisError;
use crate::output::OutputFormat;

/// Analyze AI chat session logs and grade conversation quality
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing session log files
    #[arg(long, default_value = "logs")]
    logs_dir: PathBuf,

    /// Export the analysis as JSON, optionally naming the output file
    #[arg(long, num_args = 0..=1, default_missing_value = "log_analysis.json")]
    export: Option<PathBuf>,

    /// Show the N best conversations instead of the summary
    #[arg(long, value_name = "N")]
    best: Option<usize>,

    /// Minimum weighted score for the best-conversations listing
    #[arg(long, default_value_t = 0.8)]
    min_score: f64,

    /// Show the most recent sessions in the summary
    #[arg(long)]
    recent: bool,

    /// Path to a TOML file overriding the scoring weights
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: plain or json
    #[arg(short, long, default_value = "plain")]
    output: OutputFormat,
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        // An absent or empty corpus is reported without failing the process
        if let Some(analysis_err) = err.downcast_ref::<AnalysisError>() {
            if analysis_err.is_empty_corpus() {
                println!("❌ Error: {analysis_err}");
                return;
            }
        }

        error!(error = %err, "analysis failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ScoringConfig::from_file(path)?,
        None => ScoringConfig::default(),
    };

    let analyzer = Analyzer::new(args.logs_dir.clone(), &config)?;

    if let Some(count) = args.best {
        let best = analyzer.best_conversations(args.min_score, count);
        output::print_best_conversations(&best, count);
        return Ok(());
    }

    let report = analyzer.analyze_all()?;
    output::print_report(&report, args.output, args.recent);

    if let Some(path) = &args.export {
        output::write_report(&report, path)?;
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
