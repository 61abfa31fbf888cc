//! Name normalization.
//!
//! Upstream extractors hand us raw attribution strings: honorifics
//! ("Dr Wilmot"), party labels ("Cllr Jane Smith"), stray newlines, or
//! outright garbage. Everything downstream assumes a canonical surface
//! form, so all cleaning happens here once.

use crate::filters::FilterRules;

/// Symbols that mark a string as extraction garbage rather than a name.
const FORBIDDEN_SYMBOLS: &[char] = &['@', '#', '/', '\\'];

/// Clean a raw name string into canonical form.
///
/// Returns `None` when the input cannot be a person name: empty after
/// whitespace collapse, contains digits or forbidden symbols, is a bare
/// pronoun, has no letters, or is shorter than two characters once title
/// tokens are stripped. Title/role tokens ("dr", "councillor", "party", ...)
/// are removed at any position, not just the front.
pub fn clean_name(raw: &str, rules: &FilterRules) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    if collapsed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if collapsed.chars().any(|c| FORBIDDEN_SYMBOLS.contains(&c)) {
        return None;
    }
    if rules.is_pronoun(&collapsed.to_lowercase()) {
        return None;
    }

    let kept: Vec<&str> = collapsed
        .split(' ')
        .filter(|tok| {
            let bare = tok.trim_matches(|c: char| !c.is_alphanumeric());
            !rules.is_title_prefix(bare)
        })
        .collect();
    let cleaned = kept.join(" ");
    // Letter and length checks run on the post-strip string, so a title
    // followed by punctuation rejects the same as bare punctuation.
    if !cleaned.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    if cleaned.chars().count() < 2 {
        return None;
    }
    Some(cleaned)
}
