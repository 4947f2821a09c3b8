use instant::Duration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    DEFAULT_BRANCHING, DEFAULT_EXPAND_DURATION, DEFAULT_EXPAND_WORDS, DEFAULT_REGION_MARGIN,
};

/// How a candidate placement's immediate desirability is computed from its length and the number
/// of letters it shares with the grid. Either way, a placement with no intersections scores 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringPolicy {
    /// length + intersections
    #[default]
    Sum,
    /// length × intersections
    Product,
}

impl ScoringPolicy {
    pub fn score(self, length: usize, intersections: usize) -> u32 {
        if intersections == 0 {
            return 0;
        }
        match self {
            ScoringPolicy::Sum => (length + intersections) as u32,
            ScoringPolicy::Product => (length * intersections) as u32,
        }
    }
}

impl FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(ScoringPolicy::Sum),
            "product" => Ok(ScoringPolicy::Product),
            other => Err(format!("unknown scoring policy {:?} (expected sum or product)", other)),
        }
    }
}

/// Per-lattice settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// May the same dictionary word appear more than once?
    pub allow_repeats: bool,
    pub scoring: ScoringPolicy,
    /// How many continuations each lookahead ply explores.
    pub branching: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            allow_repeats: false,
            scoring: ScoringPolicy::default(),
            branching: DEFAULT_BRANCHING,
        }
    }
}

/// Bounds for a single viewport expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandOptions {
    pub depth: usize,
    pub max_words: usize,
    #[serde(with = "duration_ms")]
    pub max_duration: Duration,
    pub margin: i32,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        ExpandOptions {
            depth: 0,
            max_words: DEFAULT_EXPAND_WORDS,
            max_duration: DEFAULT_EXPAND_DURATION,
            margin: DEFAULT_REGION_MARGIN,
        }
    }
}

/// Durations travel as whole milliseconds.
mod duration_ms {
    use instant::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
