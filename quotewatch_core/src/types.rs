//! Domain records flowing through reconciliation.

use serde::{Deserialize, Serialize};

use crate::gender::Gender;

/// Which extraction method produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginMethod {
    /// Regex/attribution-pattern extraction.
    Pattern,
    /// Named-entity recognition or LLM proposal.
    Ner,
}

/// How a pattern-based extractor found an attribution.
///
/// Closed vocabulary; only pattern-derived candidates carry one. The five
/// variants are the positions that count as direct-quote attributions for the
/// downstream policy filter (see [`crate::postprocess`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionTag {
    /// "Quote," Name said
    #[serde(rename = "after")]
    After,
    /// Name said, "Quote"
    #[serde(rename = "before")]
    Before,
    /// Blockquote with inline attribution.
    #[serde(rename = "blockquote-inline")]
    BlockquoteInline,
    /// Smith said: "Quote"
    #[serde(rename = "lastname_verb")]
    LastnameVerb,
    /// "Quote" — Name
    #[serde(rename = "standalone_dash")]
    StandaloneDash,
}

impl PositionTag {
    /// The wire/storage label for this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionTag::After => "after",
            PositionTag::Before => "before",
            PositionTag::BlockquoteInline => "blockquote-inline",
            PositionTag::LastnameVerb => "lastname_verb",
            PositionTag::StandaloneDash => "standalone_dash",
        }
    }
}

/// A name proposed by one extraction method, before verification.
///
/// Created fresh per article per reconciliation run, never mutated, discarded
/// once reconciliation completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSource {
    /// Raw name text — may contain titles, attribution verbs, or garbage.
    pub name: String,
    /// Which method produced this candidate.
    pub origin: OriginMethod,
    /// Attribution position; present only on pattern-derived candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionTag>,
}

impl CandidateSource {
    /// A pattern-derived candidate with its attribution position, if the
    /// matching rule recorded one.
    pub fn pattern(name: impl Into<String>, position: Option<PositionTag>) -> Self {
        Self {
            name: name.into(),
            origin: OriginMethod::Pattern,
            position,
        }
    }

    /// An NER/LLM-derived candidate (no position tag).
    pub fn ner(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: OriginMethod::Ner,
            position: None,
        }
    }
}

/// A candidate that survived non-person filtering and cross-method dedup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedSource {
    /// Cleaned name.
    pub name: String,
    /// Inferred gender: male, female, or unknown. Never a collective value.
    pub gender: Gender,
    /// Attribution position carried from the originating candidate, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionTag>,
}

impl ConfirmedSource {
    /// Position label for reporting; empty string when no tag was carried.
    pub fn position_label(&self) -> &'static str {
        self.position.map(|p| p.as_str()).unwrap_or("")
    }
}

/// Output of a reconciliation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciledSources {
    /// Confirmed human sources, deduplicated under fuzzy-match equivalence.
    pub confirmed: Vec<ConfirmedSource>,
    /// Names rejected as non-persons; exact-string deduplicated, kept for
    /// auditing.
    pub filtered: Vec<String>,
}
