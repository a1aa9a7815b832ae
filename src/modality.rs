//! Modality tags and the raw inputs they carry
//!
//! A [`Modality`] names the kind of input a caller hands to the processor. The set is
//! closed: adding a modality means adding a variant here and a route in
//! [`Processor`](crate::processor::Processor).

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The category of raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Modality {
    Text,
    Gestures,
    Image,
    Video,
    Voice,
}

impl Modality {
    /// Every supported modality, in tag order.
    pub const ALL: [Modality; 5] = [
        Modality::Text,
        Modality::Voice,
        Modality::Gestures,
        Modality::Image,
        Modality::Video,
    ];

    /// The tag callers use to select this modality.
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Gestures => "gestures",
            Modality::Image => "image",
            Modality::Video => "video",
            Modality::Voice => "voice",
        }
    }

    /// All supported tags.
    pub fn tags() -> Vec<&'static str> {
        Self::ALL.iter().map(Modality::as_str).collect()
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = ConfigurationError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|modality| modality.as_str() == tag)
            .ok_or_else(|| ConfigurationError::UnsupportedModality {
                tag: tag.to_string(),
                supported: Self::tags(),
            })
    }
}

/// Raw input as handed over by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A text string (text, or a voice command that is already text)
    Text(String),
    /// An ordered sequence of discrete labels, e.g. recognized gestures
    Tokens(Vec<String>),
    /// Encoded image or audio bytes
    Bytes(Vec<u8>),
}

impl Input {
    /// Short description of the input shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Input::Text(_) => "text",
            Input::Tokens(_) => "a token list",
            Input::Bytes(_) => "binary data",
        }
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::Text(text.to_string())
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::Text(text)
    }
}

impl From<Vec<String>> for Input {
    fn from(tokens: Vec<String>) -> Self {
        Input::Tokens(tokens)
    }
}

impl From<Vec<&str>> for Input {
    fn from(tokens: Vec<&str>) -> Self {
        Input::Tokens(tokens.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Input {
    fn from(tokens: &[&str]) -> Self {
        Input::Tokens(tokens.iter().map(|t| t.to_string()).collect())
    }
}

impl From<Vec<u8>> for Input {
    fn from(bytes: Vec<u8>) -> Self {
        Input::Bytes(bytes)
    }
}

impl From<&[u8]> for Input {
    fn from(bytes: &[u8]) -> Self {
        Input::Bytes(bytes.to_vec())
    }
}
