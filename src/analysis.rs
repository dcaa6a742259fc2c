use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;
use crate::error::AnalysisError;
use crate::models::{
    AnalysisReport, CorpusSummary, Dimension, FileError, Grade, PairScore, RankedConversation,
    SessionResult, Trend,
};
use crate::scoring::Scorer;
use crate::transcript;

/// Analyzes every session transcript under one logs directory.
///
/// Nothing is cached between calls: each analysis re-reads and re-scores
/// the corpus, so results always reflect the current file set.
pub struct Analyzer {
    logs_dir: PathBuf,
    scorer: Scorer,
}

impl Analyzer {
    pub fn new(logs_dir: PathBuf, config: &ScoringConfig) -> Result<Self> {
        Ok(Self {
            logs_dir,
            scorer: Scorer::new(config)?,
        })
    }

    /// Analyze the whole corpus, most recent session first.
    ///
    /// A file that cannot be read is recorded in the report's `errors`
    /// and does not stop the rest of the corpus from being analyzed.
    pub fn analyze_all(&self) -> Result<AnalysisReport, AnalysisError> {
        let files = self.session_files()?;
        if files.is_empty() {
            info!("No session log files in {}", self.logs_dir.display());
            return Err(AnalysisError::EmptyCorpus);
        }

        let mut sessions = Vec::new();
        let mut errors = Vec::new();
        for path in &files {
            debug!("Analyzing {}", path.display());
            match self.analyze_file(path) {
                Ok(result) => sessions.push(result),
                Err(err) => {
                    warn!("{err}");
                    errors.push(FileError {
                        file: file_name_of(path),
                        error: err.to_string(),
                    });
                }
            }
        }

        let summary = summarize(&sessions, files.len())?;
        Ok(AnalysisReport {
            summary,
            sessions,
            errors,
            analyzed_at: Utc::now(),
        })
    }

    /// Read and grade a single transcript
    pub fn analyze_file(&self, path: &Path) -> Result<SessionResult, AnalysisError> {
        let file = file_name_of(path);
        let bytes = fs::read(path).map_err(|source| AnalysisError::UnreadableFile {
            file: file.clone(),
            source,
        })?;
        // Non-UTF-8 bytes become replacement characters rather than errors
        let content = String::from_utf8_lossy(&bytes);
        let modified = fs::metadata(path)
            .ok()
            .and_then(|meta| meta.modified().ok())
            .map(DateTime::<Utc>::from);

        Ok(self.grade_session(file, modified, &content))
    }

    /// Score every pair of one transcript and aggregate the session
    fn grade_session(
        &self,
        file: String,
        modified: Option<DateTime<Utc>>,
        content: &str,
    ) -> SessionResult {
        let pairs = transcript::extract_pairs(content);
        if pairs.is_empty() {
            return SessionResult {
                file,
                modified,
                conversations: 0,
                overall_score: 0.0,
                grade: Grade::F,
                details: Vec::new(),
                issues: vec!["No conversations found".to_string()],
            };
        }

        let mut details = Vec::with_capacity(pairs.len());
        let mut weighted_scores = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            let scores = self.scorer.score(pair);
            let weighted = self.scorer.weighted(&scores);
            weighted_scores.push(weighted);
            details.push(PairScore::new(pair, scores, weighted));
        }

        let overall = mean(&weighted_scores);
        let issues = diagnose_issues(overall, &details);

        SessionResult {
            file,
            modified,
            conversations: details.len(),
            overall_score: round3(overall),
            grade: Grade::from_score(overall),
            details,
            issues,
        }
    }

    /// The highest-scoring conversations across the corpus, descending by
    /// weighted score; ties keep most-recent-session-first encounter order.
    /// Corpus-level failures yield an empty list.
    pub fn best_conversations(&self, min_score: f64, limit: usize) -> Vec<RankedConversation> {
        let report = match self.analyze_all() {
            Ok(report) => report,
            Err(err) => {
                warn!("No conversations to rank: {err}");
                return Vec::new();
            }
        };

        let mut ranked = Vec::new();
        for session in &report.sessions {
            for detail in &session.details {
                if detail.weighted_score >= min_score {
                    ranked.push(RankedConversation {
                        session: session.file.clone(),
                        user: detail.user.clone(),
                        ai: detail.ai.clone(),
                        scores: detail.scores,
                        weighted_score: detail.weighted_score,
                    });
                }
            }
        }

        ranked.sort_by(|a, b| {
            b.weighted_score
                .partial_cmp(&a.weighted_score)
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(limit);
        ranked
    }

    /// Session logs under the logs directory, most recently modified
    /// first; equal timestamps fall back to reverse filename order.
    fn session_files(&self) -> Result<Vec<PathBuf>, AnalysisError> {
        if !self.logs_dir.exists() {
            return Err(AnalysisError::CorpusNotFound {
                path: self.logs_dir.clone(),
            });
        }

        let entries = fs::read_dir(&self.logs_dir).map_err(|source| {
            AnalysisError::UnreadableFile {
                file: self.logs_dir.display().to_string(),
                source,
            }
        })?;

        let mut files: Vec<(Option<SystemTime>, String, PathBuf)> = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !(name.starts_with("session-") && name.ends_with(".log")) {
                continue;
            }
            let modified = entry.metadata().ok().and_then(|meta| meta.modified().ok());
            files.push((modified, name, entry.path()));
        }

        files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        Ok(files.into_iter().map(|(_, _, path)| path).collect())
    }
}

/// Corpus statistics over the analyzed sessions, which must already be
/// in most-recent-first order
fn summarize(
    sessions: &[SessionResult],
    attempted: usize,
) -> Result<CorpusSummary, AnalysisError> {
    let valid: Vec<&SessionResult> = sessions.iter().filter(|s| s.conversations > 0).collect();
    if valid.is_empty() {
        return Err(AnalysisError::EmptyCorpus);
    }

    let scores: Vec<f64> = valid.iter().map(|s| s.overall_score).collect();

    let mut best = valid[0];
    let mut worst = valid[0];
    for &session in &valid[1..] {
        if session.overall_score > best.overall_score {
            best = session;
        }
        if session.overall_score < worst.overall_score {
            worst = session;
        }
    }

    let mut grade_distribution = BTreeMap::new();
    for session in &valid {
        *grade_distribution.entry(session.grade).or_insert(0) += 1;
    }

    Ok(CorpusSummary {
        total_sessions: attempted,
        valid_sessions: valid.len(),
        average_score: round3(mean(&scores)),
        median_score: round3(median(&scores)),
        best_session: best.clone(),
        worst_session: worst.clone(),
        grade_distribution,
        recent_trend: compute_trend(&scores),
    })
}

/// Flag weak dimensions when the session scores poorly overall
fn diagnose_issues(overall: f64, details: &[PairScore]) -> Vec<String> {
    let mut issues = Vec::new();
    if overall >= 0.6 {
        return issues;
    }
    for dimension in Dimension::ALL {
        let total: f64 = details.iter().map(|d| d.scores.get(dimension)).sum();
        let dimension_mean = total / details.len() as f64;
        if dimension_mean < 0.5 {
            issues.push(format!("Poor {dimension}"));
        }
    }
    issues
}

/// Score movement over the most recent sessions. `scores` must be in
/// most-recent-first order; the newest half of a window of at most 5
/// sessions is compared against the rest.
fn compute_trend(scores: &[f64]) -> Trend {
    if scores.len() < 3 {
        return Trend::InsufficientData;
    }

    let window = &scores[..scores.len().min(5)];
    let split = window.len() / 2;
    let newer = mean(&window[..split]);
    let older = mean(&window[split..]);
    let diff = older - newer;

    if diff > 0.1 {
        Trend::Improving
    } else if diff < -0.1 {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

fn mean(values: &[f64]) -> f64 {
    let sum: f64 = values.iter().sum();
    sum / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
