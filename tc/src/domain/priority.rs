//! Priority levels for plan tasks

use serde::{Deserialize, Serialize};

/// Priority level for a Task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Normalized name -> variant. Anything not listed resolves to the default.
const PRIORITY_TABLE: [(&str, Priority); 4] = [
    ("low", Priority::Low),
    ("medium", Priority::Medium),
    ("high", Priority::High),
    ("critical", Priority::Critical),
];

impl Priority {
    /// Resolve free-form model text to a priority.
    ///
    /// The input is trimmed and lower-cased before the table lookup. Unknown
    /// values (typos, synonyms like "urgent") become [`Priority::Medium`].
    pub fn lookup(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        PRIORITY_TABLE
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, priority)| *priority)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
