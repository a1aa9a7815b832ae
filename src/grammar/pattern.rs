//! Pattern-set rules
//!
//! Each rule body is an independent regular expression. Rules are compiled
//! case-insensitively and searched for every non-overlapping occurrence.
//!
//! ## Example
//!
//! ```text
//! Rule:     phone = \b\d{3}-\d{3}-\d{4}\b
//! Text:     "call 555-123-4567 or 555-987-6543"
//! Result:   ["555-123-4567", "555-987-6543"]
//! ```
//!
//! Only the whole match is reported. Capture groups inside a body are allowed but
//! do not change what is returned.

use crate::error::ValidationError;
use regex::{Regex, RegexBuilder};

/// A compiled pattern-set rule.
#[derive(Debug, Clone)]
pub struct RulePattern {
    name: String,
    regex: Regex,
}

impl RulePattern {
    /// Compile a rule body.
    ///
    /// Fails with [`ValidationError::InvalidPattern`] naming the rule and carrying the
    /// compiler message.
    pub fn compile(name: &str, body: &str) -> Result<Self, ValidationError> {
        let regex = RegexBuilder::new(body)
            .case_insensitive(true)
            .build()
            .map_err(|e| ValidationError::InvalidPattern {
                rule: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name: name.to_string(),
            regex,
        })
    }

    /// The rule this pattern was compiled from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pattern source
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Every non-overlapping occurrence in order of appearance.
    pub fn find_all(&self, text: &str) -> Vec<String> {
        self.regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Whether the pattern occurs anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Count case-sensitive, non-overlapping occurrences of an ad-hoc pattern.
pub fn count_occurrences(text: &str, pattern: &str) -> Result<usize, ValidationError> {
    let regex = Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
        rule: "<ad hoc>".to_string(),
        message: e.to_string(),
    })?;
    Ok(regex.find_iter(text).count())
}
