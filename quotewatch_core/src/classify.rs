//! Layered non-person classification.
//!
//! Decides whether a name string denotes an organization, place, brand, or
//! event rather than an individual human. The default bias is to trust the
//! name as a person: a wrongly rejected name destroys a real source, while a
//! wrongly accepted one merely lets a brand through to human review. Each
//! layer short-circuits, and the ordering is load-bearing: the brand check
//! runs first because the recognizer and gender lookup are known to
//! misclassify exactly those strings.

use std::sync::Arc;

use tracing::debug;

use crate::filters::FilterRules;
use crate::gender::GenderLookup;
use crate::normalize::clean_name;
use crate::{EntityRecognizer, SpanLabel};

/// Non-person classifier over shared, read-only rule and lookup resources.
///
/// The entity recognizer is optional; when absent or erroring, the
/// classifier falls through to its suffix heuristic instead of propagating
/// the failure.
pub struct NonPersonClassifier {
    rules: Arc<FilterRules>,
    gender: Arc<GenderLookup>,
    recognizer: Option<Arc<dyn EntityRecognizer>>,
    /// Gate unrecognized single tokens as non-persons. An unrecognized
    /// single token is more likely a truncated organization name than a
    /// genuinely unusual first name; a deliberate precision/recall tradeoff.
    single_token_gender_gate: bool,
}

impl NonPersonClassifier {
    pub fn new(
        rules: Arc<FilterRules>,
        gender: Arc<GenderLookup>,
        recognizer: Option<Arc<dyn EntityRecognizer>>,
    ) -> Self {
        Self {
            rules,
            gender,
            recognizer,
            single_token_gender_gate: true,
        }
    }

    /// Disable or re-enable the single-token gender gate.
    pub fn with_single_token_gender_gate(mut self, enabled: bool) -> Self {
        self.single_token_gender_gate = enabled;
        self
    }

    /// Whether `name` obviously denotes something other than an individual
    /// human. Returns `false` (is a person) unless a layer finds reasonably
    /// strong evidence otherwise.
    pub fn is_obvious_non_person(&self, name: &str) -> bool {
        // Layer 1: trivial reject. Anything the normalizer refuses cannot
        // be a person name either.
        let Some(cleaned) = clean_name(name, &self.rules) else {
            return true;
        };

        // Layer 2: known-brand and business substrings, before anything
        // else.
        let lower = cleaned.to_lowercase();
        if self.rules.has_brand_substring(&lower) {
            debug!(name = %cleaned, "rejected by brand/business substring");
            return true;
        }

        // Layer 3: single tokens. The recognizer is at its weakest on a
        // lone word, so consult the first-name table instead.
        let token_count = cleaned.split_whitespace().count();
        if token_count == 1 && self.single_token_gender_gate {
            let recognized = self.gender.recognizes(&cleaned);
            if !recognized {
                debug!(name = %cleaned, "single token not a known first name");
            }
            return !recognized;
        }

        // Layer 4: external entity recognition, when available.
        if token_count > 1 {
            if let Some(recognizer) = &self.recognizer {
                match recognizer.recognize(&cleaned) {
                    Ok(spans) => {
                        let best = spans.iter().max_by(|a, b| {
                            a.confidence
                                .partial_cmp(&b.confidence)
                                .unwrap_or(std::cmp::Ordering::Equal)
                        });
                        match best.map(|s| s.label) {
                            Some(SpanLabel::Person) => return false,
                            Some(label) => {
                                debug!(name = %cleaned, ?label, "recognizer tagged non-person");
                                return true;
                            }
                            None => {}
                        }
                    }
                    Err(err) => {
                        debug!(name = %cleaned, error = %err, "entity recognition failed, falling back");
                    }
                }
            }
        }

        // Layer 5: place/institution suffix fallback.
        if self.rules.has_place_suffix(&cleaned) {
            debug!(name = %cleaned, "rejected by place suffix");
            return true;
        }

        // Layer 6: default-accept.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecognizedSpan;
    use anyhow::anyhow;

    /// Recognizer returning a fixed answer, for exercising layer 4
    /// deterministically.
    struct FixedRecognizer(Vec<RecognizedSpan>);

    impl EntityRecognizer for FixedRecognizer {
        fn recognize(&self, _text: &str) -> anyhow::Result<Vec<RecognizedSpan>> {
            Ok(self.0.clone())
        }
    }

    struct FailingRecognizer;

    impl EntityRecognizer for FailingRecognizer {
        fn recognize(&self, _text: &str) -> anyhow::Result<Vec<RecognizedSpan>> {
            Err(anyhow!("session crashed"))
        }
    }

    fn classifier(recognizer: Option<Arc<dyn EntityRecognizer>>) -> NonPersonClassifier {
        NonPersonClassifier::new(
            Arc::new(FilterRules::default()),
            Arc::new(GenderLookup::embedded()),
            recognizer,
        )
    }

    fn span(text: &str, label: SpanLabel, confidence: f32) -> RecognizedSpan {
        RecognizedSpan {
            text: text.to_string(),
            label,
            confidence,
        }
    }

    #[test]
    fn trivial_garbage_is_non_person() {
        let c = classifier(None);
        assert!(c.is_obvious_non_person(""));
        assert!(c.is_obvious_non_person("X"));
        assert!(c.is_obvious_non_person("they"));
    }

    #[test]
    fn brand_substrings_reject_regardless_of_word_count() {
        let c = classifier(None);
        assert!(c.is_obvious_non_person("COVID"));
        assert!(c.is_obvious_non_person("Lambrini"));
        assert!(c.is_obvious_non_person("Covid Response Team"));
        assert!(c.is_obvious_non_person("AFC Bournemouth"));
    }

    #[test]
    fn brand_check_outranks_recognizer() {
        // A recognizer that insists everything is a person must not rescue
        // a blacklisted brand.
        let r: Arc<dyn EntityRecognizer> =
            Arc::new(FixedRecognizer(vec![span("Lambrini Hill", SpanLabel::Person, 0.99)]));
        let c = classifier(Some(r));
        assert!(c.is_obvious_non_person("Lambrini Hill"));
    }

    #[test]
    fn single_token_gender_gate() {
        let c = classifier(None);
        assert!(!c.is_obvious_non_person("David"));
        assert!(!c.is_obvious_non_person("Becca"));
        // Androgynous first names still count as recognized.
        assert!(!c.is_obvious_non_person("Alex"));
        assert!(c.is_obvious_non_person("Zzqx"));
    }

    #[test]
    fn single_token_gate_can_be_disabled() {
        let c = classifier(None).with_single_token_gender_gate(false);
        // Without the gate, an unrecognized single token falls through to
        // the default-accept rule.
        assert!(!c.is_obvious_non_person("Zzqx"));
        assert!(!c.is_obvious_non_person("David"));
    }

    #[test]
    fn recognizer_verdict_drives_multi_token_names() {
        let org: Arc<dyn EntityRecognizer> = Arc::new(FixedRecognizer(vec![span(
            "Dorset Chamber",
            SpanLabel::Organization,
            0.9,
        )]));
        assert!(classifier(Some(org)).is_obvious_non_person("Dorset Chamber"));

        let person: Arc<dyn EntityRecognizer> =
            Arc::new(FixedRecognizer(vec![span("Sarah Wilmot", SpanLabel::Person, 0.8)]));
        assert!(!classifier(Some(person)).is_obvious_non_person("Sarah Wilmot"));
    }

    #[test]
    fn highest_confidence_span_wins() {
        let r: Arc<dyn EntityRecognizer> = Arc::new(FixedRecognizer(vec![
            span("Sandbanks Beach", SpanLabel::Person, 0.3),
            span("Sandbanks Beach", SpanLabel::Location, 0.9),
        ]));
        assert!(classifier(Some(r)).is_obvious_non_person("Sandbanks Beach"));
    }

    #[test]
    fn recognizer_failure_falls_back_to_suffix_heuristic() {
        let r: Arc<dyn EntityRecognizer> = Arc::new(FailingRecognizer);
        let c = classifier(Some(r));
        assert!(c.is_obvious_non_person("Poole Harbour"));
        assert!(!c.is_obvious_non_person("Xyz Abcson"));
    }

    #[test]
    fn suffix_fallback_without_recognizer() {
        let c = classifier(None);
        assert!(c.is_obvious_non_person("Poole Harbour"));
        assert!(c.is_obvious_non_person("Central Park"));
        assert!(c.is_obvious_non_person("Vitality Stadium"));
    }

    #[test]
    fn multi_token_defaults_to_person() {
        let c = classifier(None);
        assert!(!c.is_obvious_non_person("Xyz Abcson"));
        assert!(!c.is_obvious_non_person("Abi Paler"));
    }
}
