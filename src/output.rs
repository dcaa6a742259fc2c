use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::{AnalysisReport, RankedConversation};

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Print the analysis in the specified format
pub fn print_report(report: &AnalysisReport, format: OutputFormat, recent: bool) {
    match format {
        OutputFormat::Plain => print_plain(report, recent),
        OutputFormat::Json => print_json(report),
    }
}

/// Print the corpus summary in plain text format
fn print_plain(report: &AnalysisReport, recent: bool) {
    let summary = &report.summary;

    println!("📊 Log Analysis Summary");
    println!("{}", "=".repeat(40));
    println!(
        "Sessions analyzed: {}/{}",
        summary.valid_sessions, summary.total_sessions
    );
    println!("Average quality: {:.3}", summary.average_score);
    println!("Recent trend: {}", summary.recent_trend);

    println!();
    println!(
        "🎯 Best session: {} (Score: {:.3}, Grade: {})",
        summary.best_session.file, summary.best_session.overall_score, summary.best_session.grade
    );
    println!(
        "⚠️  Worst session: {} (Score: {:.3}, Grade: {})",
        summary.worst_session.file,
        summary.worst_session.overall_score,
        summary.worst_session.grade
    );

    println!();
    println!("📈 Grade Distribution:");
    for (grade, count) in &summary.grade_distribution {
        println!("   {grade}: {count}");
    }

    if recent {
        print_recent_sessions(report);
    }
}

/// List the five most recent sessions with their grades and issues
fn print_recent_sessions(report: &AnalysisReport) {
    println!();
    println!("📅 Recent Sessions:");
    for session in report.sessions.iter().take(5) {
        let Some(modified) = session.modified else {
            continue;
        };
        let issues = if session.issues.is_empty() {
            "No issues".to_string()
        } else {
            session.issues.join(", ")
        };
        println!(
            "   {} | {} | {} ({:.3}) | {}",
            session.file,
            modified.format("%m-%d %H:%M"),
            session.grade,
            session.overall_score,
            issues
        );
    }
}

/// Print the full report as JSON
fn print_json(report: &AnalysisReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing analysis to JSON: {}", e),
    }
}

/// Print the ranked best conversations
pub fn print_best_conversations(conversations: &[RankedConversation], requested: usize) {
    println!("🏆 Top {requested} Conversations:");
    println!("{}", "=".repeat(50));

    for (i, conversation) in conversations.iter().enumerate() {
        println!();
        println!(
            "{}. Score: {:.3} ({})",
            i + 1,
            conversation.weighted_score,
            conversation.session
        );
        println!("   User: {}", conversation.user);
        println!("   AI: {}", conversation.ai);
    }
}

/// Write the full analysis as pretty JSON, creating parent directories
/// as needed
pub fn write_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(report).context("Failed to serialize analysis")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write analysis to {}", path.display()))?;

    println!("Analysis exported to {}", path.display());
    Ok(())
}
