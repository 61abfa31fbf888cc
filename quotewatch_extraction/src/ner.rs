//! Zero-shot entity recognition over short name strings.
//!
//! Runs a GLiNER span-mode model (DeBERTa-based) via ONNX Runtime. GLiNER
//! takes its entity labels at inference time in a special prompt:
//!
//! ```text
//! [CLS] <<ENT>> label1 <<ENT>> label2 ... <<SEP>> word1 word2 ... [SEP]
//! ```
//!
//! The model outputs span logits decoded via sigmoid. Unlike a full-document
//! NER pipeline this recognizer only ever sees candidate name strings a few
//! words long, so it runs single-text with a fixed closed label set and
//! reports every span above threshold.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use ndarray::{Array2, Array3};
use tokenizers::Tokenizer;

use quotewatch_core::{EntityRecognizer, RecognizedSpan, SpanLabel};

// Special token IDs for GLiNER span-mode models.
const START_TOKEN_ID: i64 = 1; // [CLS]
const END_TOKEN_ID: i64 = 2; // [SEP]
const ENTITY_TOKEN_ID: i64 = 128002; // <<ENT>>
const SEP_TOKEN_ID: i64 = 128003; // <<SEP>>

/// Zero-shot label prompts, index-aligned with [`LABEL_SET`].
const LABEL_PROMPTS: [&str; 6] = [
    "person",
    "organization",
    "geopolitical entity",
    "location",
    "facility",
    "event",
];

const LABEL_SET: [SpanLabel; 6] = [
    SpanLabel::Person,
    SpanLabel::Organization,
    SpanLabel::GeopoliticalEntity,
    SpanLabel::Location,
    SpanLabel::Facility,
    SpanLabel::Event,
];

/// Configuration for the GLiNER recognizer.
#[derive(Debug, Clone)]
pub struct GlinerConfig {
    /// Minimum confidence score (0.0-1.0) for reporting a span.
    pub threshold: f32,
    /// Maximum span width in words for candidate spans. Name strings are
    /// short, so this stays small.
    pub max_width: usize,
    /// Number of ONNX inference threads.
    pub num_threads: usize,
}

impl Default for GlinerConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            max_width: 6,
            num_threads: 2,
        }
    }
}

/// GLiNER recognizer over an ONNX session.
///
/// Thread-safe via internal `Mutex` on the session and tokenizer; one
/// instance is shared process-wide across concurrent reconciliation calls.
pub struct GlinerRecognizer {
    session: Mutex<ort::session::Session>,
    tokenizer: Mutex<Tokenizer>,
    config: GlinerConfig,
}

impl GlinerRecognizer {
    /// Load the recognizer from ONNX model and tokenizer files.
    pub fn new(
        model_path: impl AsRef<Path>,
        tokenizer_path: impl AsRef<Path>,
        config: GlinerConfig,
    ) -> Result<Self> {
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.num_threads)?
            .commit_from_file(model_path.as_ref())
            .context("failed to load GLiNER ONNX model")?;

        let tokenizer = Tokenizer::from_file(tokenizer_path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {e}"))?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer: Mutex::new(tokenizer),
            config,
        })
    }

    fn run_inference(&self, text: &str) -> Result<Vec<RecognizedSpan>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }
        let num_words = words.len();

        let (input_ids, attention_mask, words_mask, text_lengths) = {
            let tokenizer = self.tokenizer.lock().unwrap();
            self.encode_prompt(&tokenizer, &words)?
        };

        let (span_idx, span_mask) = self.make_span_tensors(num_words);

        let logits = {
            let input_ids_tensor = ort::value::Tensor::from_array(input_ids)?;
            let attention_mask_tensor = ort::value::Tensor::from_array(attention_mask)?;
            let words_mask_tensor = ort::value::Tensor::from_array(words_mask)?;
            let text_lengths_tensor = ort::value::Tensor::from_array(text_lengths)?;
            let span_idx_tensor = ort::value::Tensor::from_array(span_idx)?;
            let span_mask_tensor = ort::value::Tensor::from_array(span_mask)?;

            let mut session = self.session.lock().unwrap();
            let outputs = session.run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "words_mask" => words_mask_tensor,
                "text_lengths" => text_lengths_tensor,
                "span_idx" => span_idx_tensor,
                "span_mask" => span_mask_tensor,
            ])?;

            let logits_view = if let Some(val) = outputs.get("logits") {
                val.try_extract_array::<f32>()
                    .context("failed to extract logits tensor")?
            } else {
                let first_key = outputs.keys().next().context("no outputs from GLiNER model")?;
                outputs[first_key]
                    .try_extract_array::<f32>()
                    .context("failed to extract first output tensor")?
            };
            logits_view.to_owned()
        };

        Ok(self.decode_spans(&logits, &words, num_words))
    }

    /// Encode the GLiNER prompt for a single text over the fixed label set.
    #[allow(clippy::type_complexity)]
    fn encode_prompt(
        &self,
        tokenizer: &Tokenizer,
        words: &[&str],
    ) -> Result<(Array2<i64>, Array2<i64>, Array2<i64>, Array2<i64>)> {
        let mut entity_token_ids: Vec<i64> = Vec::new();
        for label in LABEL_PROMPTS {
            entity_token_ids.push(ENTITY_TOKEN_ID);
            let encoding = tokenizer
                .encode(label, false)
                .map_err(|e| anyhow::anyhow!("tokenizer error for label {label:?}: {e}"))?;
            entity_token_ids.extend(encoding.get_ids().iter().map(|&id| id as i64));
        }
        entity_token_ids.push(SEP_TOKEN_ID);

        let mut word_token_ids: Vec<Vec<i64>> = Vec::with_capacity(words.len());
        let mut total_text_tokens = 0;
        for word in words {
            let encoding = tokenizer
                .encode(*word, false)
                .map_err(|e| anyhow::anyhow!("tokenizer error for word {word:?}: {e}"))?;
            let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            total_text_tokens += ids.len();
            word_token_ids.push(ids);
        }

        // [CLS] + entity tokens + text tokens + [SEP]
        let seq_len = 1 + entity_token_ids.len() + total_text_tokens + 1;
        let mut input_ids = Array2::<i64>::zeros((1, seq_len));
        let mut attention_mask = Array2::<i64>::zeros((1, seq_len));
        let mut words_mask = Array2::<i64>::zeros((1, seq_len));

        let mut idx = 0;
        input_ids[[0, idx]] = START_TOKEN_ID;
        attention_mask[[0, idx]] = 1;
        idx += 1;

        for &token_id in &entity_token_ids {
            input_ids[[0, idx]] = token_id;
            attention_mask[[0, idx]] = 1;
            idx += 1;
        }

        // Only the first subword of each word gets the 1-indexed word ID.
        let mut word_id: i64 = 1;
        for ids in &word_token_ids {
            for (token_idx, &token_id) in ids.iter().enumerate() {
                input_ids[[0, idx]] = token_id;
                attention_mask[[0, idx]] = 1;
                if token_idx == 0 {
                    words_mask[[0, idx]] = word_id;
                }
                idx += 1;
            }
            word_id += 1;
        }

        input_ids[[0, idx]] = END_TOKEN_ID;
        attention_mask[[0, idx]] = 1;

        let text_lengths = Array2::from_elem((1, 1), words.len() as i64);
        Ok((input_ids, attention_mask, words_mask, text_lengths))
    }

    /// Candidate span index and mask tensors for a single text.
    fn make_span_tensors(&self, num_words: usize) -> (Array3<i64>, Array2<bool>) {
        let max_width = self.config.max_width;
        let num_spans = num_words * max_width;

        let mut span_idx = Array3::<i64>::zeros((1, num_spans, 2));
        let mut span_mask = Array2::from_elem((1, num_spans), false);

        for start in 0..num_words {
            let widths = max_width.min(num_words - start);
            for width in 0..widths {
                let dim = start * max_width + width;
                span_idx[[0, dim, 0]] = start as i64;
                span_idx[[0, dim, 1]] = (start + width) as i64;
                span_mask[[0, dim]] = true;
            }
        }

        (span_idx, span_mask)
    }

    /// Decode output logits into spans, highest confidence first.
    ///
    /// GLiNER models emit either `[batch, num_words, max_width, num_labels]`
    /// or flattened `[batch, num_spans, num_labels]`.
    fn decode_spans(
        &self,
        logits: &ndarray::ArrayD<f32>,
        words: &[&str],
        num_words: usize,
    ) -> Vec<RecognizedSpan> {
        let threshold = self.config.threshold;
        let mut spans = Vec::new();

        let mut push = |start_word: usize, end_word: usize, label_idx: usize, logit: f32| {
            let score = sigmoid(logit);
            if score >= threshold && label_idx < LABEL_SET.len() {
                spans.push(RecognizedSpan {
                    text: words[start_word..=end_word].join(" "),
                    label: LABEL_SET[label_idx],
                    confidence: score,
                });
            }
        };

        let shape = logits.shape();
        match shape.len() {
            4 => {
                let out_num_labels = shape[3].min(LABEL_SET.len());
                for start_word in 0..shape[1].min(num_words) {
                    for width in 0..shape[2] {
                        let end_word = start_word + width;
                        if end_word >= num_words {
                            break;
                        }
                        for label_idx in 0..out_num_labels {
                            push(start_word, end_word, label_idx, logits[[0, start_word, width, label_idx]]);
                        }
                    }
                }
            }
            3 => {
                let max_width = self.config.max_width;
                let out_num_labels = shape[2].min(LABEL_SET.len());
                for span in 0..shape[1] {
                    let start_word = span / max_width;
                    let end_word = start_word + span % max_width;
                    if end_word >= num_words {
                        continue;
                    }
                    for label_idx in 0..out_num_labels {
                        push(start_word, end_word, label_idx, logits[[0, span, label_idx]]);
                    }
                }
            }
            _ => {
                tracing::warn!("unexpected logits shape: {:?}", shape);
            }
        }

        spans.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        spans
    }
}

impl EntityRecognizer for GlinerRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedSpan>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        self.run_inference(text)
    }
}

// Send + Sync hold because Session and Tokenizer sit behind a Mutex.
unsafe impl Send for GlinerRecognizer {}
unsafe impl Sync for GlinerRecognizer {}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
