//! # Quotewatch Core
//!
//! Source reconciliation engine for the Quotewatch sourcing-metrics pipeline.
//!
//! Two independent extraction methods propose "who is quoted in this article":
//! a regex/pattern extractor and an NER/LLM proposer. Both are noisy in
//! different ways. This crate merges the two candidate streams into a single
//! trustworthy list of confirmed human sources, filtering out organizations,
//! places, and brands that masquerade as person names.
//!
//! Components, leaf-first:
//! - [`normalize`] — cleans raw name strings (strips titles, rejects pronouns
//!   and garbage)
//! - [`classify`] — layered non-person classifier (brand blacklist →
//!   single-token gender gate → entity recognition → suffix fallback →
//!   default accept)
//! - [`matching`] — fuzzy same-person matching tolerant of partial names and
//!   word order
//! - [`gender`] — best-effort gender label from a first name
//! - [`reconcile`] — the orchestrator producing `{confirmed, filtered}`
//! - [`postprocess`] — direct-quote position policy applied downstream of
//!   reconciliation
//! - [`filters`] — single source of truth for every hand-maintained rule set
//!
//! Reconciliation is synchronous, pure, and CPU-only. The only shared
//! resource is the optional read-only entity-recognition model behind the
//! [`EntityRecognizer`] trait, injected at construction so tests can
//! substitute a stub or run with recognition disabled.
//!
//! # Test Infrastructure
//!
//! All tests in this crate are mock-based and CI-safe (no models required):
//! - `normalize::tests` — cleaning, prefix stripping, rejection rules
//! - `matching::tests` — token-sort ratio, substring containment, symmetry
//! - `gender::tests` — table lookup, category mapping, label normalization
//! - `classify::tests` — layer ordering with stub recognizers
//! - `reconcile::tests` — merge, dedup, filter semantics
//! - `tests/reconciliation.rs` — end-to-end properties over the public API

pub mod classify;
pub mod filters;
pub mod gender;
pub mod matching;
pub mod normalize;
pub mod postprocess;
pub mod reconcile;
pub mod types;

pub use classify::NonPersonClassifier;
pub use filters::FilterRules;
pub use gender::{Gender, GenderLookup};
pub use matching::{find_match, names_match, DEFAULT_MATCH_THRESHOLD};
pub use normalize::clean_name;
pub use postprocess::direct_quote_sources;
pub use reconcile::SourceReconciler;
pub use types::{CandidateSource, ConfirmedSource, OriginMethod, PositionTag, ReconciledSources};

/// Label assigned to a recognized entity span.
///
/// The recognizer runs zero-shot over exactly this closed label set; the
/// classifier treats `Person` as a trust signal and everything else as a
/// non-person signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanLabel {
    Person,
    Organization,
    GeopoliticalEntity,
    Location,
    Facility,
    Event,
}

/// An entity span recognized within a name string.
#[derive(Debug, Clone)]
pub struct RecognizedSpan {
    /// The span text as it appears in the input.
    pub text: String,
    /// Entity label.
    pub label: SpanLabel,
    /// Recognition confidence (0.0-1.0).
    pub confidence: f32,
}

/// Entity recognition over short name strings.
///
/// Implemented by the GLiNER ONNX pipeline in `quotewatch_extraction`; tests
/// substitute stubs. A failing or absent recognizer is never an error for
/// callers — the classifier falls through to its heuristic layers.
pub trait EntityRecognizer: Send + Sync {
    /// Recognize entity spans in `text` against the closed [`SpanLabel`] set.
    fn recognize(&self, text: &str) -> anyhow::Result<Vec<RecognizedSpan>>;
}
