//! Grammar declaration, validation and compilation
//!
//! A [`Grammar`] is a named, ordered rule set compiled once into a matching artifact.
//! Two modes exist and each owns a different artifact:
//!
//!     PatternSet:
//!         Every rule body is an independent regular expression, searched for on its own.
//!         See [pattern].
//!
//!     StructuredParse:
//!         All rule bodies together form one grammar, with the first rule as the start
//!         symbol. Input either parses as a whole or it does not. See [production] for the
//!         notation and [parser] for recognition.
//!
//! All validation happens in the constructors. A grammar that was built successfully is
//! immutable and can be shared freely between processors and threads.

pub mod parser;
pub mod pattern;
pub mod production;

use crate::error::{ConfigurationError, Error, Result, ValidationError};
use indexmap::IndexMap;
use parser::StructuredParser;
use pattern::RulePattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Matching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrammarMode {
    /// Independent pattern search per rule
    PatternSet,
    /// One parser built from all rules
    StructuredParse,
}

impl GrammarMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrammarMode::PatternSet => "pattern-set",
            GrammarMode::StructuredParse => "structured-parse",
        }
    }
}

impl fmt::Display for GrammarMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrammarMode {
    type Err = ConfigurationError;

    /// Accepts `pattern-set` / `regex` and `structured-parse` / `cfg`.
    fn from_str(mode: &str) -> std::result::Result<Self, Self::Err> {
        match mode {
            "pattern-set" | "regex" => Ok(GrammarMode::PatternSet),
            "structured-parse" | "cfg" => Ok(GrammarMode::StructuredParse),
            other => Err(ConfigurationError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Compilation knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GrammarOptions {
    /// Ignore whitespace between terminals in structured-parse mode
    pub skip_whitespace: bool,
}

impl Default for GrammarOptions {
    fn default() -> Self {
        Self {
            skip_whitespace: true,
        }
    }
}

/// The compiled artifact, one shape per mode.
#[derive(Debug, Clone)]
pub enum CompiledGrammar {
    PatternSet(Vec<RulePattern>),
    StructuredParse(StructuredParser),
}

/// A validated, compiled rule set.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: IndexMap<String, String>,
    compiled: CompiledGrammar,
}

impl Grammar {
    /// Build a grammar with default options.
    ///
    /// `rules` is consumed in order; in structured-parse mode the first rule is the start
    /// symbol.
    pub fn new<I, K, V>(rules: I, mode: GrammarMode) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_options(rules, mode, &GrammarOptions::default())
    }

    /// Build a grammar from a textual mode name such as `"regex"` or `"cfg"`.
    ///
    /// An empty rule set is rejected before the mode is looked at.
    pub fn with_mode_name<I, K, V>(rules: I, mode: &str) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let rules = collect_rules(rules)?;
        let mode = mode.parse::<GrammarMode>()?;
        Self::compile(rules, mode, &GrammarOptions::default())
    }

    /// Build a grammar with explicit options.
    pub fn with_options<I, K, V>(
        rules: I,
        mode: GrammarMode,
        options: &GrammarOptions,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let rules = collect_rules(rules)?;
        Self::compile(rules, mode, options)
    }

    fn compile(
        rules: IndexMap<String, String>,
        mode: GrammarMode,
        options: &GrammarOptions,
    ) -> Result<Self> {
        let compiled = match mode {
            GrammarMode::PatternSet => CompiledGrammar::PatternSet(
                rules
                    .iter()
                    .map(|(name, body)| RulePattern::compile(name, body))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            GrammarMode::StructuredParse => CompiledGrammar::StructuredParse(
                StructuredParser::compile(
                    rules.iter().map(|(n, b)| (n.as_str(), b.as_str())),
                    options.skip_whitespace,
                )?,
            ),
        };

        debug!(mode = %mode, rules = rules.len(), "compiled grammar");
        Ok(Self { rules, compiled })
    }

    /// Load a grammar definition document.
    ///
    /// ```text
    /// mode: pattern-set
    /// rules:
    ///   email: '\b[\w.%+-]+@[\w.-]+\.\w{2,}\b'
    ///   phone: '\b\d{3}-\d{3}-\d{4}\b'
    /// ```
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Self::from_yaml_str_with_options(source, &GrammarOptions::default())
    }

    /// Load a grammar definition document with explicit options.
    pub fn from_yaml_str_with_options(source: &str, options: &GrammarOptions) -> Result<Self> {
        let definition: GrammarDefinition = serde_yaml::from_str(source)?;
        let rules = collect_rules(definition.rules)?;
        let mode = definition.mode.parse::<GrammarMode>()?;
        Self::compile(rules, mode, options)
    }

    /// Read and load a grammar definition file.
    pub fn from_yaml_file(path: impl AsRef<Path>, options: &GrammarOptions) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str_with_options(&source, options)
    }

    /// The matching strategy
    pub fn mode(&self) -> GrammarMode {
        match self.compiled {
            CompiledGrammar::PatternSet(_) => GrammarMode::PatternSet,
            CompiledGrammar::StructuredParse(_) => GrammarMode::StructuredParse,
        }
    }

    /// Rules exactly as declared, in declaration order
    pub fn rules(&self) -> &IndexMap<String, String> {
        &self.rules
    }

    /// Rule names in declaration order
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn compiled(&self) -> &CompiledGrammar {
        &self.compiled
    }
}

#[derive(Debug, Deserialize)]
struct GrammarDefinition {
    mode: String,
    rules: IndexMap<String, String>,
}

fn collect_rules<I, K, V>(rules: I) -> Result<IndexMap<String, String>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut collected = IndexMap::new();
    for (name, body) in rules {
        let name = name.into();
        if collected.contains_key(&name) {
            return Err(ValidationError::DuplicateRule(name).into());
        }
        collected.insert(name, body.into());
    }

    if collected.is_empty() {
        return Err(Error::Validation(ValidationError::EmptyRules));
    }
    Ok(collected)
}
