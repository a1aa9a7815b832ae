//! Match and result records
//!
//! A [`ResultRecord`] bundles the normalized text, its tokens, the rule matches and the
//! statistics derived from them. Statistics are computed once in [`ResultRecord::build`]
//! and cannot be set independently, so they always agree with the tokens and matches.

use serde::Serialize;
use std::collections::HashSet;

/// One rule's hits against the normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    rule_name: String,
    matches: Vec<String>,
}

impl MatchRecord {
    /// Create a record for a rule that produced at least one hit.
    ///
    /// Returns `None` when `matches` is empty: a record only exists for rules that hit.
    pub fn new(rule_name: impl Into<String>, matches: Vec<String>) -> Option<Self> {
        if matches.is_empty() {
            return None;
        }
        Some(Self {
            rule_name: rule_name.into(),
            matches,
        })
    }

    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    /// Matched fragments, in order of appearance
    pub fn matches(&self) -> &[String] {
        &self.matches
    }

    /// Number of fragments
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Always false; present for API symmetry with [`len`](Self::len)
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Derived statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub token_count: usize,
    /// Distinct tokens after case folding
    pub unique_token_count: usize,
    /// Total fragments across all match records
    pub match_count: usize,
}

/// The uniform output of one processing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    normalized_text: String,
    tokens: Vec<String>,
    matches: Vec<MatchRecord>,
    stats: Stats,
}

impl ResultRecord {
    /// Assemble a record and derive its statistics.
    pub fn build(
        normalized_text: impl Into<String>,
        tokens: Vec<String>,
        matches: Vec<MatchRecord>,
    ) -> Self {
        let unique: HashSet<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let stats = Stats {
            token_count: tokens.len(),
            unique_token_count: unique.len(),
            match_count: matches.iter().map(MatchRecord::len).sum(),
        };

        Self {
            normalized_text: normalized_text.into(),
            tokens,
            matches,
            stats,
        }
    }

    /// The canonical text that was matched
    pub fn normalized_text(&self) -> &str {
        &self.normalized_text
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// The record produced by `rule`, if it matched
    pub fn matches_for(&self, rule: &str) -> Option<&MatchRecord> {
        self.matches.iter().find(|m| m.rule_name == rule)
    }

    /// Case-insensitive token membership.
    pub fn contains_token(&self, token: &str) -> bool {
        let needle = token.to_lowercase();
        self.tokens.iter().any(|t| t.to_lowercase() == needle)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
