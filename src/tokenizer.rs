//! Tokenizer adapter
//!
//! The processor only needs `text -> [token]`. [`Tokenizer`] is that seam; the crate
//! ships two implementations:
//!
//!     WordTokenizer:
//!         A logos lexer that splits text into words, numbers and punctuation, in the
//!         spirit of common word tokenizers: `"Hello, world!"` becomes
//!         `["Hello", ",", "world", "!"]`.
//!
//!     WhitespaceTokenizer:
//!         Splits on whitespace only.
//!
//! Tokenizers that need assets (models, dictionaries) load them in
//! [`Tokenizer::prepare`], which the processor calls once before first use.

use crate::error::TokenizationError;
use logos::Logos;
use serde::Deserialize;

/// Splits normalized text into tokens.
pub trait Tokenizer: Send + Sync {
    /// One-time bootstrap. Must be idempotent.
    fn prepare(&self) -> Result<(), TokenizationError> {
        Ok(())
    }

    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizationError>;
}

/// Lexical classes recognized by [`WordTokenizer`]
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"\s+")]
pub enum WordToken {
    /// Digits with inner separators: `42`, `3.14`, `1,000`, `10:30`
    #[regex(r"[0-9]+([.,:][0-9]+)*", priority = 4)]
    Number,

    /// Letters, digits and underscores, with inner apostrophes or hyphens
    #[regex(r"\w+(['’\-]\w+)*", priority = 2)]
    Word,

    #[token("...")]
    Ellipsis,

    /// Any other single visible character
    #[regex(r"[^\s\w]", priority = 1)]
    Punctuation,
}

/// The default tokenizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    /// Tokens paired with their classes and byte spans
    pub fn lex(text: &str) -> Result<Vec<(WordToken, logos::Span)>, TokenizationError> {
        let mut lexer = WordToken::lexer(text);
        let mut tokens = Vec::new();

        while let Some(result) = lexer.next() {
            match result {
                Ok(token) => tokens.push((token, lexer.span())),
                Err(()) => {
                    let span = lexer.span();
                    return Err(TokenizationError::Unrecognized {
                        start: span.start,
                        end: span.end,
                        fragment: lexer.slice().to_string(),
                    });
                }
            }
        }

        Ok(tokens)
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizationError> {
        Ok(Self::lex(text)?
            .into_iter()
            .map(|(_, span)| text[span].to_string())
            .collect())
    }
}

/// Splits on Unicode whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizationError> {
        Ok(text.split_whitespace().map(str::to_string).collect())
    }
}

/// Tokenizer selection in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenizerKind {
    Words,
    Whitespace,
}

impl TokenizerKind {
    pub fn build(self) -> Box<dyn Tokenizer> {
        match self {
            TokenizerKind::Words => Box::new(WordTokenizer),
            TokenizerKind::Whitespace => Box::new(WhitespaceTokenizer),
        }
    }
}
