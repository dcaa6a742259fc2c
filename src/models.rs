use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user turn matched with the single response accepted for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPair {
    /// What the user typed
    pub user_input: String,
    /// The assistant text paired with that input
    pub ai_response: String,
}

/// One axis of response quality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Coherence,
    Relevance,
    Completeness,
    Creativity,
    Safety,
}

impl Dimension {
    /// Every dimension, in weight-table order
    pub const ALL: [Dimension; 5] = [
        Dimension::Coherence,
        Dimension::Relevance,
        Dimension::Completeness,
        Dimension::Creativity,
        Dimension::Safety,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Coherence => "coherence",
            Dimension::Relevance => "relevance",
            Dimension::Completeness => "completeness",
            Dimension::Creativity => "creativity",
            Dimension::Safety => "safety",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-dimension scores for a single response; every value in [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    /// Does the response relate to the input?
    pub coherence: f64,
    /// Is it on-topic, free of bad signals?
    pub relevance: f64,
    /// Does it end properly rather than cut off?
    pub completeness: f64,
    /// Varied wording rather than repetition?
    pub creativity: f64,
    /// Free of concerning content?
    pub safety: f64,
}

impl ScoreVector {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Coherence => self.coherence,
            Dimension::Relevance => self.relevance,
            Dimension::Completeness => self.completeness,
            Dimension::Creativity => self.creativity,
            Dimension::Safety => self.safety,
        }
    }

    /// Clamp every dimension into [0.0, 1.0]
    pub fn clamped(self) -> Self {
        Self {
            coherence: self.coherence.clamp(0.0, 1.0),
            relevance: self.relevance.clamp(0.0, 1.0),
            completeness: self.completeness.clamp(0.0, 1.0),
            creativity: self.creativity.clamp(0.0, 1.0),
            safety: self.safety.clamp(0.0, 1.0),
        }
    }

    /// Dot product with the dimension weights
    pub fn weighted(&self, weights: &DimensionWeights) -> f64 {
        self.coherence * weights.coherence
            + self.relevance * weights.relevance
            + self.completeness * weights.completeness
            + self.creativity * weights.creativity
            + self.safety * weights.safety
    }
}

/// Relative importance of each quality dimension; weights sum to 1.0.
/// Keys omitted from a config file keep their default value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionWeights {
    pub coherence: f64,
    pub relevance: f64,
    pub completeness: f64,
    pub creativity: f64,
    pub safety: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            coherence: 0.25,
            relevance: 0.25,
            completeness: 0.20,
            creativity: 0.15,
            safety: 0.15,
        }
    }
}

impl DimensionWeights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Coherence => self.coherence,
            Dimension::Relevance => self.relevance,
            Dimension::Completeness => self.completeness,
            Dimension::Creativity => self.creativity,
            Dimension::Safety => self.safety,
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }
}

/// Letter grade for a session's overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Step function over the overall score; lower bounds are inclusive
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Grade::APlus
        } else if score >= 0.8 {
            Grade::A
        } else if score >= 0.7 {
            Grade::B
        } else if score >= 0.6 {
            Grade::C
        } else if score >= 0.5 {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of recent-session score movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    #[serde(rename = "Insufficient data")]
    InsufficientData,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Improving => "Improving",
            Trend::Declining => "Declining",
            Trend::Stable => "Stable",
            Trend::InsufficientData => "Insufficient data",
        };
        f.write_str(label)
    }
}

/// Scored detail for one conversation pair, with display-truncated text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairScore {
    /// User input, truncated to 50 chars
    pub user: String,
    /// Assistant response, truncated to 100 chars
    pub ai: String,
    /// Full per-dimension scores
    pub scores: ScoreVector,
    /// Dot product of scores and weights
    pub weighted_score: f64,
}

impl PairScore {
    pub fn new(pair: &ConversationPair, scores: ScoreVector, weighted_score: f64) -> Self {
        Self {
            user: truncate(&pair.user_input, 50),
            ai: truncate(&pair.ai_response, 100),
            scores,
            weighted_score,
        }
    }
}

/// Keep the first `max_chars` characters, marking elision with "..."
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}

/// Quality metrics for one analyzed transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    /// Transcript file name
    pub file: String,
    /// File modification time, when the filesystem provides one
    pub modified: Option<DateTime<Utc>>,
    /// Number of conversation pairs found
    pub conversations: usize,
    /// Mean weighted score across pairs, rounded to 3 decimals
    pub overall_score: f64,
    /// Letter grade for the overall score
    pub grade: Grade,
    /// Per-pair scoring details, in transcript order
    pub details: Vec<PairScore>,
    /// Diagnosed problems ("No conversations found", "Poor <dimension>")
    pub issues: Vec<String>,
}

/// Record of a transcript that could not be analyzed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileError {
    /// Transcript file name
    pub file: String,
    /// Why reading it failed
    pub error: String,
}

/// Statistics across every analyzed session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusSummary {
    /// Sessions attempted, including unreadable and empty ones
    pub total_sessions: usize,
    /// Sessions that produced at least one conversation pair
    pub valid_sessions: usize,
    /// Mean overall score across valid sessions, rounded to 3 decimals
    pub average_score: f64,
    /// Median overall score across valid sessions, rounded to 3 decimals
    pub median_score: f64,
    /// Highest-scoring valid session
    pub best_session: SessionResult,
    /// Lowest-scoring valid session
    pub worst_session: SessionResult,
    /// Count of valid sessions per letter grade
    pub grade_distribution: BTreeMap<Grade, usize>,
    /// Score movement over the most recent valid sessions
    pub recent_trend: Trend,
}

/// One conversation surfaced by the best-conversations query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedConversation {
    /// Session file the conversation came from
    pub session: String,
    /// User input, truncated
    pub user: String,
    /// Assistant response, truncated
    pub ai: String,
    /// Full per-dimension scores
    pub scores: ScoreVector,
    /// Dot product of scores and weights
    pub weighted_score: f64,
}

/// Full export artifact: summary plus every session, most recent first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Corpus-wide statistics
    pub summary: CorpusSummary,
    /// Per-session results, most recent first
    pub sessions: Vec<SessionResult>,
    /// Transcripts that could not be read
    pub errors: Vec<FileError>,
    /// When this analysis ran
    pub analyzed_at: DateTime<Utc>,
}
