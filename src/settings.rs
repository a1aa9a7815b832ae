//! Processor settings
//!
//! Settings pick the tokenizer, the structured-grammar options and the OCR command.
//! Values come from three layers, later ones winning:
//!
//!     1. `defaults/vogo.default.toml`, compiled into the crate
//!     2. TOML files added with [`Loader::with_file`] / [`Loader::with_optional_file`]
//!     3. dotted-key overrides such as `ocr.language = "spa"`
//!
//! ```toml
//! [tokenizer]
//! kind = "whitespace"
//!
//! [grammar]
//! skip_whitespace = false
//!
//! [ocr]
//! language = "spa+eng"
//! ```

use crate::adapters::OcrConfig;
use crate::error::Result;
use crate::grammar::GrammarOptions;
use crate::tokenizer::TokenizerKind;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/vogo.default.toml");

/// Everything [`Processor::from_settings`](crate::processor::Processor::from_settings)
/// and grammar construction read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub tokenizer: TokenizerSettings,
    /// Pass to [`Grammar::with_options`](crate::grammar::Grammar::with_options)
    pub grammar: GrammarOptions,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerSettings {
    pub kind: TokenizerKind,
}

/// Layers TOML sources over the embedded vogo defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let defaults = File::from_str(DEFAULT_TOML, FileFormat::Toml);
        Self {
            builder: Config::builder().add_source(defaults),
        }
    }

    /// Add a TOML file that must exist; a missing file fails [`build`](Self::build).
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Add a TOML file if present, e.g. a per-user `vogo.toml`.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let file = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(file);
        self
    }

    /// Override one dotted key, e.g. `("tokenizer.kind", "whitespace")`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merge all layers into [`Settings`]. Unknown tokenizer kinds and missing
    /// required files surface as [`Error::Settings`](crate::Error::Settings).
    pub fn build(self) -> Result<Settings> {
        let merged = self.builder.build()?;
        Ok(merged.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings from the embedded defaults alone.
pub fn load_defaults() -> Result<Settings> {
    Loader::new().build()
}
