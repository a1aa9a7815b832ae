//! Dispatcher: modality routing and the processing pipeline
//!
//! A call moves through a fixed sequence of steps:
//!
//! ```text
//! received -> normalized -> tokenized + matched -> built -> returned
//! ```
//!
//! [`Processor`] routes a modality to its normalizer:
//!
//!     text, gestures  -> TextNormalizer
//!     image, video    -> ImageNormalizer (video reuses the image path)
//!     voice           -> VoiceNormalizer
//!
//! and hands the normalized text to [`process_with`], which tokenizes it, matches it
//! against the grammar and builds the [`ResultRecord`]. Nothing is kept between calls;
//! the grammar is shared read-only, so one processor (or many) can serve concurrent calls.
//!
//! # Example
//!
//! ```rust,ignore
//! use vogo::{Grammar, GrammarMode, Modality, Processor};
//!
//! let grammar = Grammar::new([("phone", r"\b\d{3}-\d{3}-\d{4}\b")], GrammarMode::PatternSet)?;
//! let processor = Processor::new(grammar);
//! processor.initialize()?;
//! let result = processor.process("call 555-123-4567", Modality::Text)?;
//! assert_eq!(result.stats().match_count, 1);
//! ```

use crate::adapters::{OcrEngine, SpeechRecognizer, TesseractOcr};
use crate::error::{Error, Result};
use crate::grammar::Grammar;
use crate::matching::match_grammar;
use crate::modality::{Input, Modality};
use crate::normalize::{ImageNormalizer, Normalize, TextNormalizer, VoiceNormalizer};
use crate::result::ResultRecord;
use crate::settings::Settings;
use crate::tokenizer::{Tokenizer, WordTokenizer};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

/// Normalize, tokenize, match and build with any normalizer.
pub fn process_with<N>(
    normalizer: &N,
    modality: Modality,
    input: Input,
    tokenizer: &dyn Tokenizer,
    grammar: &Grammar,
) -> Result<ResultRecord>
where
    N: Normalize + ?Sized,
{
    let text = normalizer.normalize(modality, input)?;
    debug!(%modality, chars = text.chars().count(), "normalized input");

    let tokens = tokenizer.tokenize(&text)?;
    let matches = match_grammar(&text, grammar);

    let record = ResultRecord::build(text, tokens, matches);
    debug!(
        %modality,
        tokens = record.stats().token_count,
        matches = record.stats().match_count,
        "built result"
    );
    Ok(record)
}

/// Routes typed input to the right normalizer and runs the pipeline.
pub struct Processor {
    grammar: Arc<Grammar>,
    tokenizer: Arc<dyn Tokenizer>,
    text: TextNormalizer,
    image: ImageNormalizer,
    voice: VoiceNormalizer,
    prepared: OnceCell<()>,
}

impl Processor {
    /// A processor with the word tokenizer and no OCR or speech backend.
    pub fn new(grammar: impl Into<Arc<Grammar>>) -> Self {
        Self::builder(grammar).build()
    }

    pub fn builder(grammar: impl Into<Arc<Grammar>>) -> ProcessorBuilder {
        ProcessorBuilder {
            grammar: grammar.into(),
            tokenizer: Arc::new(WordTokenizer),
            ocr: None,
            speech: None,
        }
    }

    /// Wire tokenizer and OCR from settings.
    ///
    /// The grammar is already compiled, so `settings.grammar` is not applied here. Build
    /// it with [`Grammar::with_options`] (or [`Grammar::from_yaml_file`]) passing
    /// `&settings.grammar` for those options to take effect.
    pub fn from_settings(grammar: impl Into<Arc<Grammar>>, settings: &Settings) -> Self {
        let tokenizer: Arc<dyn Tokenizer> = Arc::from(settings.tokenizer.kind.build());
        let mut builder = Self::builder(grammar).tokenizer(tokenizer);
        if settings.ocr.enabled {
            builder = builder.ocr(Arc::new(TesseractOcr::from_config(&settings.ocr)));
        }
        builder.build()
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Run the tokenizer's bootstrap step.
    ///
    /// Idempotent: only the first successful call does work. [`process`](Self::process)
    /// calls it too, so hosts that skip it pay the cost on the first request instead.
    pub fn initialize(&self) -> Result<()> {
        self.prepared
            .get_or_try_init(|| {
                debug!("preparing tokenizer");
                self.tokenizer.prepare().map_err(Error::Initialization)
            })
            .map(|_| ())
    }

    /// The normalizer serving `modality`.
    pub fn normalizer(&self, modality: Modality) -> &dyn Normalize {
        match modality {
            Modality::Text | Modality::Gestures => &self.text,
            Modality::Image | Modality::Video => &self.image,
            Modality::Voice => &self.voice,
        }
    }

    /// Process one input.
    pub fn process(&self, input: impl Into<Input>, modality: Modality) -> Result<ResultRecord> {
        self.initialize()?;
        process_with(
            self.normalizer(modality),
            modality,
            input.into(),
            self.tokenizer.as_ref(),
            &self.grammar,
        )
    }

    /// Process one input selected by a modality tag such as `"gestures"`.
    pub fn process_tagged(&self, input: impl Into<Input>, tag: &str) -> Result<ResultRecord> {
        let modality = tag.parse::<Modality>()?;
        self.process(input, modality)
    }
}

/// Configures a [`Processor`].
pub struct ProcessorBuilder {
    grammar: Arc<Grammar>,
    tokenizer: Arc<dyn Tokenizer>,
    ocr: Option<Arc<dyn OcrEngine>>,
    speech: Option<Arc<dyn SpeechRecognizer>>,
}

impl ProcessorBuilder {
    pub fn tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn ocr(mut self, ocr: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    pub fn speech(mut self, speech: Arc<dyn SpeechRecognizer>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn build(self) -> Processor {
        Processor {
            grammar: self.grammar,
            tokenizer: self.tokenizer,
            text: TextNormalizer,
            image: self.ocr.map(ImageNormalizer::new).unwrap_or_default(),
            voice: self.speech.map(VoiceNormalizer::new).unwrap_or_default(),
            prepared: OnceCell::new(),
        }
    }
}
