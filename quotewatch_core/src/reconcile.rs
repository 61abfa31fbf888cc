//! Cross-method source reconciliation.
//!
//! Merges the two candidate streams (pattern extraction and NER/LLM
//! proposal) into one confirmed list. Pattern candidates go first so their
//! richer attribution metadata survives when both methods agree on a person;
//! NER then contributes only the names the patterns missed. Both methods are
//! equally authoritative: a name found by a single method and passing the
//! non-person check is confirmed immediately, with no intermediate
//! "possible" tier.

use std::sync::Arc;

use tracing::debug;

use crate::classify::NonPersonClassifier;
use crate::filters::FilterRules;
use crate::gender::GenderLookup;
use crate::matching::{names_match, DEFAULT_MATCH_THRESHOLD};
use crate::normalize::clean_name;
use crate::types::{CandidateSource, ConfirmedSource, PositionTag, ReconciledSources};

/// Per-article reconciliation over shared read-only resources.
pub struct SourceReconciler {
    classifier: NonPersonClassifier,
    rules: Arc<FilterRules>,
    gender: Arc<GenderLookup>,
    threshold: u8,
}

impl SourceReconciler {
    pub fn new(
        classifier: NonPersonClassifier,
        rules: Arc<FilterRules>,
        gender: Arc<GenderLookup>,
    ) -> Self {
        Self {
            classifier,
            rules,
            gender,
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    /// Override the fuzzy-match threshold (0-100 scale).
    pub fn with_match_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Merge the two candidate streams into confirmed and filtered sets.
    ///
    /// Never fails: candidates with unparseable names are dropped during
    /// normalization rather than aborting the article.
    pub fn reconcile(
        &self,
        pattern_candidates: &[CandidateSource],
        ner_candidates: &[CandidateSource],
    ) -> ReconciledSources {
        // Working list of unique candidates, pattern-derived entries first.
        let mut working: Vec<(String, Option<PositionTag>)> = Vec::new();

        for cand in pattern_candidates {
            let Some(cleaned) = clean_name(&cand.name, &self.rules) else {
                debug!(raw = %cand.name, "pattern candidate dropped by normalizer");
                continue;
            };
            // First occurrence per cleaned name wins, keeping its position.
            let lower = cleaned.to_lowercase();
            if working.iter().any(|(n, _)| n.to_lowercase() == lower) {
                continue;
            }
            working.push((cleaned, cand.position));
        }

        for cand in ner_candidates {
            let Some(cleaned) = clean_name(&cand.name, &self.rules) else {
                debug!(raw = %cand.name, "ner candidate dropped by normalizer");
                continue;
            };
            // NER contributes only novel names; fuzzy agreement with an
            // existing entry means the pattern record already covers it.
            let known = working
                .iter()
                .any(|(n, _)| names_match(&cleaned, n, self.threshold, &self.rules));
            if known {
                debug!(name = %cleaned, "ner candidate merged into existing entry");
                continue;
            }
            working.push((cleaned, None));
        }

        let mut confirmed: Vec<ConfirmedSource> = Vec::new();
        let mut filtered: Vec<String> = Vec::new();

        for (name, position) in working {
            if self.classifier.is_obvious_non_person(&name) {
                if !filtered.contains(&name) {
                    filtered.push(name);
                }
                continue;
            }
            let duplicate = confirmed
                .iter()
                .any(|c| names_match(&name, &c.name, self.threshold, &self.rules));
            if duplicate {
                continue;
            }
            let gender = self.gender.infer(&name);
            confirmed.push(ConfirmedSource {
                name,
                gender,
                position,
            });
        }

        debug!(
            confirmed = confirmed.len(),
            filtered = filtered.len(),
            "reconciliation complete"
        );
        ReconciledSources { confirmed, filtered }
    }
}
