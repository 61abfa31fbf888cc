//! End-to-end reconciliation behavior over the public API, with recognition
//! disabled so every verdict is deterministic.

use std::sync::Arc;

use quotewatch_core::{
    clean_name, direct_quote_sources, names_match, CandidateSource, FilterRules, Gender,
    GenderLookup, NonPersonClassifier, PositionTag, SourceReconciler, DEFAULT_MATCH_THRESHOLD,
};

fn reconciler() -> SourceReconciler {
    let rules = Arc::new(FilterRules::default());
    let gender = Arc::new(GenderLookup::embedded());
    let classifier = NonPersonClassifier::new(rules.clone(), gender.clone(), None);
    SourceReconciler::new(classifier, rules, gender)
}

#[test]
fn normalization_is_idempotent_on_its_outputs() {
    let rules = FilterRules::default();
    let raws = [
        "Dr Sarah  Wilmot",
        "  Cllr John O'Neill ",
        "Becca\nParker",
        "Party Leader Jane Smith",
    ];
    for raw in raws {
        let once = clean_name(raw, &rules).expect("reachable cleaned value");
        assert_eq!(clean_name(&once, &rules).as_deref(), Some(once.as_str()));
    }
}

#[test]
fn brand_substrings_filter_at_any_word_count() {
    let r = reconciler();
    let out = r.reconcile(
        &[
            CandidateSource::pattern("COVID", None),
            CandidateSource::pattern("Lambrini Society Chair", None),
        ],
        &[CandidateSource::ner("Frosty Jacks Appreciation")],
    );
    assert!(out.confirmed.is_empty());
    assert_eq!(out.filtered.len(), 3);
}

#[test]
fn single_token_gate_trusts_known_first_names_only() {
    let r = reconciler();
    let out = r.reconcile(
        &[],
        &[CandidateSource::ner("David"), CandidateSource::ner("Zzqx")],
    );
    assert_eq!(out.confirmed.len(), 1);
    assert_eq!(out.confirmed[0].name, "David");
    assert_eq!(out.filtered, vec!["Zzqx".to_string()]);
}

#[test]
fn unusual_multi_token_names_default_to_accept() {
    let out = reconciler().reconcile(&[], &[CandidateSource::ner("Xyz Abcson")]);
    assert_eq!(out.confirmed.len(), 1);
    assert_eq!(out.confirmed[0].name, "Xyz Abcson");
    assert_eq!(out.confirmed[0].gender, Gender::Unknown);
}

#[test]
fn place_suffixes_filter_without_a_recognizer() {
    let out = reconciler().reconcile(
        &[CandidateSource::pattern("Poole Harbour", None)],
        &[CandidateSource::ner("Central Park")],
    );
    assert!(out.confirmed.is_empty());
    assert!(out.filtered.contains(&"Poole Harbour".to_string()));
    assert!(out.filtered.contains(&"Central Park".to_string()));
}

#[test]
fn fuzzy_matching_is_symmetric_over_varied_pairs() {
    let rules = FilterRules::default();
    let pairs = [
        ("Becca", "Becca Parker"),
        ("Andoni Iraola", "Iraola"),
        ("Dr Wilmot", "Wilmot"),
        ("Parker Becca", "Becca Parker"),
        ("Becca Parker", "John Smith"),
        ("", "Becca"),
        ("they", "they"),
    ];
    for (a, b) in pairs {
        assert_eq!(
            names_match(a, b, DEFAULT_MATCH_THRESHOLD, &rules),
            names_match(b, a, DEFAULT_MATCH_THRESHOLD, &rules),
            "asymmetric verdict for {a:?} / {b:?}"
        );
    }
}

#[test]
fn ner_only_finds_are_confirmed_with_equal_trust() {
    let out = reconciler().reconcile(&[], &[CandidateSource::ner("Abi Paler")]);
    assert_eq!(out.confirmed.len(), 1);
    let c = &out.confirmed[0];
    assert_eq!(c.name, "Abi Paler");
    assert_eq!(c.gender, Gender::Unknown);
    assert_eq!(c.position_label(), "");
    assert!(out.filtered.is_empty());
}

#[test]
fn cross_method_agreement_dedups_and_keeps_pattern_tag() {
    let out = reconciler().reconcile(
        &[CandidateSource::pattern("Becca Parker", Some(PositionTag::After))],
        &[CandidateSource::ner("Becca Parker")],
    );
    assert_eq!(out.confirmed.len(), 1);
    assert_eq!(out.confirmed[0].name, "Becca Parker");
    assert_eq!(out.confirmed[0].position_label(), "after");
}

#[test]
fn organizations_from_either_source_are_filtered() {
    let out = reconciler().reconcile(
        &[CandidateSource::pattern("AFC Bournemouth", None)],
        &[CandidateSource::ner("COVID")],
    );
    assert!(out.confirmed.is_empty());
    assert!(out.filtered.contains(&"AFC Bournemouth".to_string()));
    assert!(out.filtered.contains(&"COVID".to_string()));
}

#[test]
fn no_collective_gender_value_ever_escapes() {
    let out = reconciler().reconcile(
        &[
            CandidateSource::pattern("Becca Parker", Some(PositionTag::After)),
            CandidateSource::pattern("David Brooks", Some(PositionTag::Before)),
        ],
        &[
            CandidateSource::ner("Abi Paler"),
            CandidateSource::ner("Alex Morgan"),
            CandidateSource::ner("Zzqx Quorn"),
        ],
    );
    assert!(!out.confirmed.is_empty());
    for c in &out.confirmed {
        assert!(
            matches!(c.gender, Gender::Male | Gender::Female | Gender::Unknown),
            "unexpected gender for {}",
            c.name
        );
    }
}

#[test]
fn filtered_set_dedups_across_methods() {
    let out = reconciler().reconcile(
        &[CandidateSource::pattern("COVID", None)],
        &[CandidateSource::ner("COVID")],
    );
    assert_eq!(
        out.filtered.iter().filter(|n| n.as_str() == "COVID").count(),
        1
    );
}

#[test]
fn quote_policy_composes_with_reconciliation() {
    let rules = FilterRules::default();
    let out = reconciler().reconcile(
        &[CandidateSource::pattern("Becca Parker", Some(PositionTag::After))],
        &[CandidateSource::ner("Abi Paler")],
    );
    assert_eq!(out.confirmed.len(), 2);
    let quoted = direct_quote_sources(&out.confirmed, &rules);
    // Only the pattern-attributed source counts as directly quoted.
    assert_eq!(quoted.len(), 1);
    assert_eq!(quoted[0].name, "Becca Parker");
}

#[test]
fn configurable_threshold_changes_merge_behavior() {
    let rules = Arc::new(FilterRules::default());
    let gender = Arc::new(GenderLookup::embedded());
    let classifier = NonPersonClassifier::new(rules.clone(), gender.clone(), None);
    let strict = SourceReconciler::new(classifier, rules, gender).with_match_threshold(100);
    // At threshold 100 only exact/containment matches merge, so near-equal
    // spellings confirm separately.
    let out = strict.reconcile(
        &[CandidateSource::pattern("Jonathon Smythe", Some(PositionTag::After))],
        &[CandidateSource::ner("Jonathan Smythe")],
    );
    assert_eq!(out.confirmed.len(), 2);
}
