//! Error types for grammar construction, normalization and matching
//!
//! The taxonomy follows who is at fault:
//!
//!     - [`ConfigurationError`]: the caller asked for something that does not exist
//!       (an unknown grammar mode, an unknown modality tag, an input shape a
//!       modality cannot take). Always a programming error at the call site.
//!     - [`ValidationError`]: the caller supplied malformed data (bad rules, empty input).
//!     - [`TokenizationError`], [`ExtractionError`], [`SpeechError`]: failures reported by
//!       the external collaborators. They are surfaced unchanged, wrapped with the
//!       modality that triggered them.
//!
//! Nothing in the crate retries. The only failure that is deliberately absorbed is a
//! structured parse that does not accept the input, which is a normal empty result.

use crate::modality::Modality;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by every public entry point.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Tokenization(#[from] TokenizationError),

    /// OCR failed for an image-like modality.
    #[error("{modality} input: {source}")]
    Extraction {
        modality: Modality,
        #[source]
        source: ExtractionError,
    },

    /// Transcription failed for the voice modality.
    #[error("{modality} input: {source}")]
    Speech {
        modality: Modality,
        #[source]
        source: SpeechError,
    },

    /// The tokenizer bootstrap step failed. Reported apart from per-call
    /// tokenization failures so hosts can tell startup problems from bad input.
    #[error("tokenizer initialization failed: {0}")]
    Initialization(#[source] TokenizationError),

    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("failed to read grammar definition: {0}")]
    GrammarDefinition(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid mode, modality tag, or input shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("invalid grammar mode '{mode}': expected 'pattern-set' or 'structured-parse'")]
    InvalidMode { mode: String },

    #[error("unsupported modality '{tag}': expected one of {}", supported.join(", "))]
    UnsupportedModality {
        tag: String,
        supported: Vec<&'static str>,
    },

    #[error("{modality} input does not accept {found}")]
    UnsupportedInput {
        modality: Modality,
        found: &'static str,
    },
}

/// Malformed rules or empty input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("grammar rules cannot be empty")]
    EmptyRules,

    #[error("rule '{0}' is declared more than once")]
    DuplicateRule(String),

    #[error("invalid pattern for rule '{rule}': {message}")]
    InvalidPattern { rule: String, message: String },

    #[error("invalid structured grammar: {message}")]
    InvalidGrammar { message: String },

    #[error("{modality} input is empty")]
    EmptyInput { modality: Modality },
}

/// The tokenizer could not split the text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizationError {
    #[error("unrecognized input at {start}..{end}: {fragment:?}")]
    Unrecognized {
        start: usize,
        end: usize,
        fragment: String,
    },

    #[error("tokenizer unavailable: {0}")]
    Unavailable(String),
}

/// The OCR engine could not produce text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("image data is not a recognized raster format")]
    UnrecognizedImage,

    #[error("no OCR engine configured")]
    Unavailable,

    #[error("OCR engine failed: {0}")]
    Engine(String),
}

/// The speech service could not produce a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("could not understand audio")]
    Unintelligible,

    #[error("speech recognition service error: {0}")]
    Service(String),
}

impl Error {
    /// The modality an adapter failure is attributed to, if any.
    pub fn modality(&self) -> Option<Modality> {
        match self {
            Error::Extraction { modality, .. } | Error::Speech { modality, .. } => Some(*modality),
            Error::Validation(ValidationError::EmptyInput { modality }) => Some(*modality),
            Error::Configuration(ConfigurationError::UnsupportedInput { modality, .. }) => {
                Some(*modality)
            }
            _ => None,
        }
    }
}
