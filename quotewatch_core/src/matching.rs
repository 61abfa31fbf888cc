//! Fuzzy same-person matching.
//!
//! Two independent extractors rarely agree on a person's full surface form
//! ("Iraola" vs "Andoni Iraola", "Wilmot" vs "Dr Wilmot"). Matching is
//! therefore tolerant of partial names, word order, and case: exact match,
//! then substring containment, then a sorted-token similarity score.

use crate::filters::FilterRules;
use crate::normalize::clean_name;

/// Default similarity threshold on the 0-100 scale. Tuned against a small
/// manual sample; callers may override it through configuration.
pub const DEFAULT_MATCH_THRESHOLD: u8 = 85;

/// Order-independent token similarity on a 0-100 scale.
///
/// Tokens are lowercased, sorted, and rejoined before scoring, so
/// "Parker Becca" and "Becca Parker" score 100.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let sort_join = |s: &str| {
        let mut toks: Vec<String> = s.split_whitespace().map(str::to_lowercase).collect();
        toks.sort_unstable();
        toks.join(" ")
    };
    let (a, b) = (sort_join(a), sort_join(b));
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    (strsim::normalized_levenshtein(&a, &b) * 100.0).round() as u8
}

/// Whether `a` and `b` denote the same person.
///
/// Both names are normalized first; if either is rejected the answer is
/// `false`. Exact case-insensitive equality and substring containment in
/// either direction match unconditionally; otherwise the token-sort score
/// must reach `threshold`.
pub fn names_match(a: &str, b: &str, threshold: u8, rules: &FilterRules) -> bool {
    let (Some(a), Some(b)) = (clean_name(a, rules), clean_name(b, rules)) else {
        return false;
    };
    let (la, lb) = (a.to_lowercase(), b.to_lowercase());
    if la == lb {
        return true;
    }
    if la.contains(&lb) || lb.contains(&la) {
        return true;
    }
    token_sort_ratio(&la, &lb) >= threshold
}

/// First candidate that fuzzy-matches `name`, if any. Linear scan in input
/// order.
pub fn find_match<'a>(
    name: &str,
    candidates: &'a [String],
    threshold: u8,
    rules: &FilterRules,
) -> Option<&'a str> {
    candidates
        .iter()
        .find(|c| names_match(name, c, threshold, rules))
        .map(String::as_str)
}
