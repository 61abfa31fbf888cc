//! # Quotewatch Extraction
//!
//! Candidate-source extraction pipelines feeding the reconciliation engine
//! in `quotewatch_core`:
//!
//! - [`patterns`] — regex-based quote/attribution extraction with position
//!   tags
//! - [`ner`] — zero-shot entity recognition using GLiNER models via ONNX
//!   Runtime (implements `quotewatch_core::EntityRecognizer`)
//! - [`proposer`] — LLM source proposal over an OpenAI-compatible chat API
//! - [`pipeline`] — per-article orchestration: extract, propose, reconcile,
//!   apply the direct-quote policy, with per-stage timing metrics
//!
//! ## Test Infrastructure
//!
//! Tests that need the GLiNER ONNX model skip gracefully when it is absent;
//! everything else runs mock-based and CI-safe.

pub mod ner;
pub mod patterns;
pub mod pipeline;
pub mod proposer;

pub use ner::{GlinerConfig, GlinerRecognizer};
pub use patterns::PatternExtractor;
pub use pipeline::{Article, ArticlePipeline, ArticleReport, PipelineMetrics};
pub use proposer::{LlmClient, LlmConfig, LlmSourceProposer, ProposedSource, SourceProposer};
