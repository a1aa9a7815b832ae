//! Modality normalizers
//!
//! A normalizer reduces one modality's raw input to the single text string that gets
//! tokenized and matched. Each normalizer is an independent value implementing
//! [`Normalize`]; the shared tokenize/match/build pipeline lives in
//! [`process_with`](crate::processor::process_with).
//!
//! | Normalizer        | Accepts                     | Produces                        |
//! |-------------------|-----------------------------|---------------------------------|
//! | `TextNormalizer`  | text, token list            | trimmed text / space-joined list |
//! | `ImageNormalizer` | image bytes                 | OCR output, as-is               |
//! | `VoiceNormalizer` | text, audio bytes           | text unchanged / transcript     |

use crate::adapters::{OcrEngine, SpeechRecognizer};
use crate::error::{
    ConfigurationError, Error, ExtractionError, Result, SpeechError, ValidationError,
};
use crate::modality::{Input, Modality};
use std::sync::Arc;
use tracing::warn;

/// Reduce modality-specific input to text.
pub trait Normalize {
    /// `modality` is the tag the caller used; it only labels errors.
    fn normalize(&self, modality: Modality, input: Input) -> Result<String>;
}

fn unsupported(modality: Modality, input: &Input) -> Error {
    ConfigurationError::UnsupportedInput {
        modality,
        found: input.kind(),
    }
    .into()
}

/// Text and token-list input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl Normalize for TextNormalizer {
    fn normalize(&self, modality: Modality, input: Input) -> Result<String> {
        let text = match input {
            Input::Text(text) => text.trim().to_string(),
            Input::Tokens(tokens) => tokens.join(" "),
            other @ Input::Bytes(_) => return Err(unsupported(modality, &other)),
        };

        if text.trim().is_empty() {
            return Err(ValidationError::EmptyInput { modality }.into());
        }
        Ok(text)
    }
}

/// Image input, through OCR.
#[derive(Clone, Default)]
pub struct ImageNormalizer {
    ocr: Option<Arc<dyn OcrEngine>>,
}

impl ImageNormalizer {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr: Some(ocr) }
    }

    /// A normalizer that reports [`ExtractionError::Unavailable`] for every image
    pub fn unavailable() -> Self {
        Self { ocr: None }
    }
}

impl Normalize for ImageNormalizer {
    fn normalize(&self, modality: Modality, input: Input) -> Result<String> {
        let bytes = match input {
            Input::Bytes(bytes) => bytes,
            other => return Err(unsupported(modality, &other)),
        };

        let ocr = self.ocr.as_ref().ok_or_else(|| Error::Extraction {
            modality,
            source: ExtractionError::Unavailable,
        })?;
        ocr.extract_text(&bytes).map_err(|source| {
            warn!(%modality, error = %source, "OCR failed");
            Error::Extraction { modality, source }
        })
    }
}

/// Voice input: text passes through, audio is transcribed.
#[derive(Clone, Default)]
pub struct VoiceNormalizer {
    speech: Option<Arc<dyn SpeechRecognizer>>,
}

impl VoiceNormalizer {
    pub fn new(speech: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            speech: Some(speech),
        }
    }

    /// A normalizer that only accepts text
    pub fn unavailable() -> Self {
        Self { speech: None }
    }
}

impl Normalize for VoiceNormalizer {
    fn normalize(&self, modality: Modality, input: Input) -> Result<String> {
        let text = match input {
            Input::Text(text) => text,
            Input::Bytes(audio) => {
                let speech = self.speech.as_ref().ok_or_else(|| Error::Speech {
                    modality,
                    source: SpeechError::Service("no speech recognizer configured".to_string()),
                })?;
                speech.transcribe(&audio).map_err(|source| {
                    warn!(%modality, error = %source, "transcription failed");
                    Error::Speech { modality, source }
                })?
            }
            other @ Input::Tokens(_) => return Err(unsupported(modality, &other)),
        };

        if text.is_empty() {
            return Err(ValidationError::EmptyInput { modality }.into());
        }
        Ok(text)
    }
}
