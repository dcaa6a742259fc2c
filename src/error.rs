use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced while analyzing a transcript corpus.
///
/// A transcript that reads fine but contains zero conversation pairs is
/// not an error: it becomes a grade-F `SessionResult` with the issue
/// "No conversations found".
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A scoring config was requested from a path that does not exist
    #[error("Config file not found: {}", path.display())]
    ConfigMissing { path: PathBuf },

    /// The logs directory itself is absent
    #[error("Logs directory {} not found", path.display())]
    CorpusNotFound { path: PathBuf },

    /// The directory exists but no session yielded a conversation pair
    #[error("No valid conversations found in any logs")]
    EmptyCorpus,

    /// One transcript could not be read; the rest of the corpus continues
    #[error("Failed to read {file}: {source}")]
    UnreadableFile {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    /// Errors that describe an absent or empty corpus rather than a
    /// broken one; callers report these without failing the process.
    pub fn is_empty_corpus(&self) -> bool {
        matches!(
            self,
            AnalysisError::CorpusNotFound { .. } | AnalysisError::EmptyCorpus
        )
    }
}
