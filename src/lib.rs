//! # vogo
//!
//! Grammar-driven pattern extraction over multimodal input.
//!
//! Input arrives as text, a list of discrete labels (e.g. gestures), an image or
//! recorded audio. Each modality is normalized to one text string, which is then
//! tokenized and matched against a user-declared [`Grammar`]. The outcome is always
//! the same [`ResultRecord`] shape: normalized text, tokens, rule matches and derived
//! statistics.
//!
//! ## Layout
//!
//!     - [grammar]: rule declaration, validation and compilation (pattern sets and
//!       structured-parse grammars)
//!     - [matching]: the matching engine
//!     - [result]: match and result records
//!     - [tokenizer], [adapters]: the external collaborator seams (tokenizer, OCR, speech)
//!     - [normalize], [modality]: per-modality normalization
//!     - [processor]: routing and the end-to-end pipeline
//!     - [settings]: layered configuration
//!     - [error]: the error taxonomy

pub mod adapters;
pub mod error;
pub mod grammar;
pub mod matching;
pub mod modality;
pub mod normalize;
pub mod processor;
pub mod result;
pub mod settings;
pub mod tokenizer;

pub use error::{Error, Result};
pub use grammar::{Grammar, GrammarMode, GrammarOptions};
pub use modality::{Input, Modality};
pub use processor::Processor;
pub use result::{MatchRecord, ResultRecord, Stats};
