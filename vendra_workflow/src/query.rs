//! Vague-reference detection for retrieval queries.
//!
//! Requests like "something else" or "show me more" carry no searchable
//! content of their own; they only make sense against the conversation that
//! preceded them. The matcher here flags such queries so the search step can
//! rewrite them with context before hitting the vector store. Patterns are
//! configurable and language-agnostic; the defaults cover the English and
//! Egyptian Arabic phrasings the assistant is deployed against.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Configuration for vague-query detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VagueMatcherConfig {
    /// Patterns treated as vague references. Plain strings match as
    /// case-insensitive substrings; strings containing regex syntax
    /// (alternation, groups, `(?i)`) are compiled as regular expressions.
    #[serde(default = "default_vague_patterns")]
    pub patterns: Vec<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl Default for VagueMatcherConfig {
    fn default() -> Self {
        Self {
            patterns: default_vague_patterns(),
            enabled: true,
        }
    }
}

/// Default vague-reference patterns for English and Egyptian Arabic.
#[must_use]
pub fn default_vague_patterns() -> Vec<String> {
    [
        // English
        "something else",
        "another one",
        "show me more",
        "different",
        "other options",
        "more choices",
        "alternatives",
        "similar",
        // Egyptian Arabic
        "غير كده",
        "تانية",
        "غيرها",
        "اختيارات اكتر",
        "اختيارات تانية",
        "حاجة تانية",
        "الحاجات الشبيهة",
        "منتجات مشابهة",
        "مختلف",
        "خيارات اكتر",
        "اختيار ثاني",
        "منتج تاني",
        "موديل تاني",
        "شوفلي حاتجة تانية",
        // Price references back to earlier results
        "مفيش سعر اقل",
        "سعر اقل",
        "اقل من كده",
        "اقل من ذلك",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Detects queries that need conversation context to be searchable.
pub struct VagueQueryMatcher {
    patterns: Vec<String>,
    enabled: bool,
}

impl VagueQueryMatcher {
    /// Create a matcher from configuration.
    #[must_use]
    pub fn new(config: VagueMatcherConfig) -> Self {
        Self {
            patterns: config.patterns,
            enabled: config.enabled,
        }
    }

    /// Create a matcher with the default pattern set.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(VagueMatcherConfig::default())
    }

    /// Whether the query is a vague reference to earlier conversation.
    #[must_use]
    pub fn is_vague(&self, query: &str) -> bool {
        if !self.enabled {
            return false;
        }

        let lower = query.to_lowercase();
        self.patterns.iter().any(|p| Self::pattern_matches(p, &lower))
    }

    fn pattern_matches(pattern: &str, query_lower: &str) -> bool {
        if pattern.contains("(?i)") || pattern.contains('(') || pattern.contains('|') {
            if let Ok(re) = Regex::new(pattern) {
                return re.is_match(query_lower);
            }
        }
        query_lower.contains(&pattern.to_lowercase())
    }

    /// Add a custom pattern.
    pub fn add_pattern(&mut self, pattern: impl Into<String>) {
        self.patterns.push(pattern.into());
    }

    /// The configured patterns.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for VagueQueryMatcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}
