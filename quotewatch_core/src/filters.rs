//! Single source of truth for hand-maintained filtering rules.
//!
//! Every rule set the pipeline consults — pronouns, title prefixes, brand
//! keywords, business words, place suffixes, direct-quote positions, the
//! false-positive denylist — lives here and nowhere else. These sets are
//! intrinsically open-ended and curated over time, so they are carried as
//! data on [`FilterRules`] (extensible from configuration) rather than
//! scattered as literals across call sites.

use std::collections::HashSet;

use crate::types::PositionTag;

/// Pronouns that can never be source names.
const PRONOUNS: &[&str] = &[
    "he", "she", "they", "it", "we", "i", "you", "his", "her", "their",
];

/// Title/role tokens stripped out of names at any position.
const TITLE_PREFIXES: &[&str] = &[
    "party", "councillor", "cllr", "dr", "mr", "mrs", "ms", "prof", "sir", "dame", "lord", "lady",
    "captain", "cpt", "sgt", "rev",
];

/// Brand/product substrings that downstream heuristics are known to
/// misclassify as people. Checked before anything else.
const BRAND_KEYWORDS: &[&str] = &[
    "covid",
    "lambrini",
    "frosty jacks",
    "jack daniels",
    "guinness",
    "yate",
    "walton",
];

/// Business-like substrings that mark a name as an organization.
const BUSINESS_WORDS: &[&str] = &[
    "clothes", "ltd", "inc", "shop", "store", "club", "fc", "afc",
];

/// Place/institution suffixes used as the last-resort non-person check.
const PLACE_SUFFIXES: &[&str] = &[
    "forum", "harbour", "harbor", "centre", "center", "park", "street", "road", "avenue",
    "building", "stadium", "beach",
];

/// Names that keep slipping through as confirmed sources despite being
/// organizations, places, or brands. Applied by the post-processing policy,
/// not by reconciliation itself.
const FALSE_POSITIVE_NAMES: &[&str] = &[
    "afc bournemouth",
    "tottenham hotspur",
    "dorset police",
    "poole harbour",
    "covid",
    "lambrini",
    "dorset mind",
    "economic forum",
];

/// All filtering rule sets, with curated built-in defaults.
///
/// Stored lowercased; all membership checks are case-insensitive by
/// construction.
#[derive(Debug, Clone)]
pub struct FilterRules {
    /// Bare pronouns rejected outright by the normalizer.
    pub pronouns: HashSet<String>,
    /// Title/role tokens the normalizer strips from names.
    pub title_prefixes: HashSet<String>,
    /// Brand substrings — highest-priority non-person signal.
    pub brand_keywords: Vec<String>,
    /// Business-word substrings — grouped with brands in the classifier.
    pub business_words: Vec<String>,
    /// Place/institution suffixes for the classifier's fallback layer.
    pub place_suffixes: HashSet<String>,
    /// Positions that count as direct-quote attributions.
    pub direct_quote_positions: HashSet<PositionTag>,
    /// Curated false-positive names removed by the post-processing policy.
    pub denylist: HashSet<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            pronouns: PRONOUNS.iter().map(|s| s.to_string()).collect(),
            title_prefixes: TITLE_PREFIXES.iter().map(|s| s.to_string()).collect(),
            brand_keywords: BRAND_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            business_words: BUSINESS_WORDS.iter().map(|s| s.to_string()).collect(),
            place_suffixes: PLACE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            direct_quote_positions: [
                PositionTag::After,
                PositionTag::Before,
                PositionTag::BlockquoteInline,
                PositionTag::LastnameVerb,
                PositionTag::StandaloneDash,
            ]
            .into_iter()
            .collect(),
            denylist: FALSE_POSITIVE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FilterRules {
    /// Extend the built-in sets with configured additions. Extensions merge
    /// into the defaults; they never replace them.
    pub fn with_extensions(
        mut self,
        extra_brands: &[String],
        extra_prefixes: &[String],
        extra_suffixes: &[String],
        extra_denylist: &[String],
    ) -> Self {
        self.brand_keywords
            .extend(extra_brands.iter().map(|s| s.to_lowercase()));
        self.title_prefixes
            .extend(extra_prefixes.iter().map(|s| s.to_lowercase()));
        self.place_suffixes
            .extend(extra_suffixes.iter().map(|s| s.to_lowercase()));
        self.denylist
            .extend(extra_denylist.iter().map(|s| s.to_lowercase()));
        self
    }

    /// Whether `token` (already lowercased) is a bare pronoun.
    pub fn is_pronoun(&self, token: &str) -> bool {
        self.pronouns.contains(token)
    }

    /// Whether `token` is a strippable title/role prefix.
    pub fn is_title_prefix(&self, token: &str) -> bool {
        self.title_prefixes.contains(&token.to_lowercase())
    }

    /// Whether the lowercased name contains any brand or business substring.
    pub fn has_brand_substring(&self, lower_name: &str) -> bool {
        self.brand_keywords.iter().any(|b| lower_name.contains(b.as_str()))
            || self.business_words.iter().any(|b| lower_name.contains(b.as_str()))
    }

    /// Whether the name's last token is a place/institution suffix.
    pub fn has_place_suffix(&self, name: &str) -> bool {
        name.split_whitespace()
            .next_back()
            .map(|last| self.place_suffixes.contains(&last.to_lowercase()))
            .unwrap_or(false)
    }

    /// Whether the name is on the curated false-positive denylist.
    pub fn is_denylisted(&self, name: &str) -> bool {
        self.denylist.contains(&name.to_lowercase())
    }

    /// Whether `position` counts as a direct-quote attribution.
    pub fn is_direct_quote_position(&self, position: PositionTag) -> bool {
        self.direct_quote_positions.contains(&position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_known_rule_sets() {
        let rules = FilterRules::default();
        assert!(rules.is_pronoun("they"));
        assert!(rules.is_title_prefix("Cllr"));
        assert!(rules.has_brand_substring("covid-19 update"));
        assert!(rules.has_brand_substring("afc bournemouth"));
        assert!(rules.has_place_suffix("Poole Harbour"));
        assert!(rules.is_denylisted("Dorset Police"));
        assert!(rules.is_direct_quote_position(PositionTag::After));
    }

    #[test]
    fn extensions_merge_into_defaults() {
        let rules = FilterRules::default().with_extensions(
            &["Strongbow".to_string()],
            &["Reverend".to_string()],
            &["pier".to_string()],
            &["Bournemouth Echo".to_string()],
        );
        // New entries take effect.
        assert!(rules.has_brand_substring("strongbow dark fruit"));
        assert!(rules.is_title_prefix("reverend"));
        assert!(rules.has_place_suffix("Boscombe Pier"));
        assert!(rules.is_denylisted("bournemouth echo"));
        // Built-ins are still present.
        assert!(rules.has_brand_substring("lambrini"));
        assert!(rules.is_title_prefix("dr"));
    }

    #[test]
    fn suffix_check_only_looks_at_last_token() {
        let rules = FilterRules::default();
        assert!(!rules.has_place_suffix("Park Ranger"));
        assert!(rules.has_place_suffix("Central Park"));
    }
}
