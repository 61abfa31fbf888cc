//! Regex-based quote/attribution extraction.
//!
//! Finds names attached to quoted speech by their grammatical pattern and
//! records how the attribution was made. Each matching rule carries the
//! position tag that downstream policy uses to decide whether the source was
//! directly quoted.

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use quotewatch_core::{CandidateSource, PositionTag};

/// A capitalized name of one or more words, allowing apostrophes and hyphens.
const NAME: &str = r"[A-Z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+)*";

/// Attribution verbs accepted next to a quote.
const VERBS: &str = r"said|says|added|adds|told|explained|explains|commented";

/// One compiled attribution rule.
struct AttributionRule {
    regex: Regex,
    position: PositionTag,
}

/// Pattern-based candidate extractor over article body text.
pub struct PatternExtractor {
    rules: Vec<AttributionRule>,
    inline_attribution: Regex,
}

impl PatternExtractor {
    pub fn new() -> Result<Self> {
        let rule = |pattern: &str, position: PositionTag| -> Result<AttributionRule> {
            Ok(AttributionRule {
                regex: Regex::new(pattern)
                    .with_context(|| format!("invalid attribution pattern {pattern:?}"))?,
                position,
            })
        };

        // Rule order matters only for readability; every rule runs over the
        // full text and reconciliation dedups the overlap.
        let rules = vec![
            // "…," said Jane Smith
            rule(
                &format!(r#""[^"]+"\s*,?\s*(?:{VERBS})\s+({NAME})"#),
                PositionTag::After,
            )?,
            // Jane Smith said: "…"
            rule(
                &format!(r#"({NAME})\s+(?:{VERBS})\s*[,:]?\s*""#),
                PositionTag::Before,
            )?,
            // Smith added that …  (bare surname + verb, no adjacent quote)
            rule(
                &format!(r"(?m)^\s*([A-Z][A-Za-z'\-]+)\s+(?:{VERBS})\b"),
                PositionTag::LastnameVerb,
            )?,
            // "…" – Jane Smith   (dash attribution at end of line)
            //
            // En/em dash only: an ASCII hyphen inside a hyphenated name
            // ("Anne-Marie") must not read as an attribution dash. A
            // single-word name only counts when a comma-role follows
            // ("– Gabrielle, student at BU"); bare single words at line end
            // ("– Qualifying") are headings, not attributions.
            rule(
                r"(?m)[\u{2013}\u{2014}]\s*([A-Z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+)+)\s*(?:,\s*[^,\n]+)?$",
                PositionTag::StandaloneDash,
            )?,
            rule(
                r"(?m)[\u{2013}\u{2014}]\s*([A-Z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+){0,3}),\s*[^,\n]+$",
                PositionTag::StandaloneDash,
            )?,
        ];

        let inline_attribution = Regex::new(&format!(r"(?:{VERBS})\s+({NAME})|({NAME})\s+(?:{VERBS})"))
            .context("invalid inline attribution pattern")?;

        Ok(Self {
            rules,
            inline_attribution,
        })
    }

    /// Extract attribution candidates from article body text.
    pub fn extract(&self, text: &str) -> Vec<CandidateSource> {
        let mut out = Vec::new();
        for rule in &self.rules {
            for caps in rule.regex.captures_iter(text) {
                if let Some(m) = caps.get(1) {
                    debug!(name = m.as_str(), position = rule.position.as_str(), "pattern hit");
                    out.push(CandidateSource::pattern(m.as_str(), Some(rule.position)));
                }
            }
        }
        out
    }

    /// Extract attribution candidates from blockquote elements.
    ///
    /// Quotes lifted into blockquotes usually carry their attribution inline
    /// in the same block, so any verb-adjacent name counts, in either order.
    pub fn extract_from_blockquotes(&self, blocks: &[String]) -> Vec<CandidateSource> {
        let mut out = Vec::new();
        for block in blocks {
            for caps in self.inline_attribution.captures_iter(block) {
                let m = caps.get(1).or_else(|| caps.get(2));
                if let Some(m) = m {
                    debug!(name = m.as_str(), "blockquote attribution hit");
                    out.push(CandidateSource::pattern(
                        m.as_str(),
                        Some(PositionTag::BlockquoteInline),
                    ));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PatternExtractor {
        PatternExtractor::new().unwrap()
    }

    fn names_with(out: &[CandidateSource], position: PositionTag) -> Vec<&str> {
        out.iter()
            .filter(|c| c.position == Some(position))
            .map(|c| c.name.as_str())
            .collect()
    }

    #[test]
    fn quote_then_verb_then_name() {
        let text = r#""We are delighted with the result," said Becca Parker."#;
        let out = extractor().extract(text);
        assert_eq!(names_with(&out, PositionTag::After), vec!["Becca Parker"]);
    }

    #[test]
    fn name_then_verb_then_quote() {
        let text = r#"Andoni Iraola said: "The performance was not good enough.""#;
        let out = extractor().extract(text);
        assert_eq!(names_with(&out, PositionTag::Before), vec!["Andoni Iraola"]);
    }

    #[test]
    fn bare_surname_with_verb_at_line_start() {
        let text = "Wilmot added that the scheme would continue next year.";
        let out = extractor().extract(text);
        assert_eq!(names_with(&out, PositionTag::LastnameVerb), vec!["Wilmot"]);
    }

    #[test]
    fn dash_attribution_at_line_end() {
        let out = extractor().extract("\"Every penny counts.\" \u{2013} Sarah Wilmot");
        assert_eq!(names_with(&out, PositionTag::StandaloneDash), vec!["Sarah Wilmot"]);
        // Em-dash variant.
        let out = extractor().extract("\"Every penny counts.\" \u{2014} Sarah Wilmot");
        assert_eq!(names_with(&out, PositionTag::StandaloneDash), vec!["Sarah Wilmot"]);
    }

    #[test]
    fn dash_with_comma_role_accepts_single_word_names() {
        let out = extractor().extract("\u{2014} Gabrielle, student at BU");
        assert_eq!(names_with(&out, PositionTag::StandaloneDash), vec!["Gabrielle"]);

        let out = extractor().extract("\u{2013} Dave Richmond, Bournemouth property owner");
        let names = names_with(&out, PositionTag::StandaloneDash);
        assert!(!names.is_empty());
        assert!(names.iter().all(|n| *n == "Dave Richmond"));
    }

    #[test]
    fn dash_rejects_bare_single_words() {
        // Headings and race-report section labels, not attributions.
        for text in ["\u{2013} Qualifying", "\u{2013} Race"] {
            let out = extractor().extract(text);
            assert!(
                names_with(&out, PositionTag::StandaloneDash).is_empty(),
                "{text:?} must not be an attribution"
            );
        }
    }

    #[test]
    fn hyphenated_names_are_not_dash_attributions() {
        // The hyphen in "Anne-Marie" must not read as an attribution dash
        // that captures the trailing half of the name.
        let out = extractor().extract("The event was organised by Anne-Marie");
        assert!(names_with(&out, PositionTag::StandaloneDash).is_empty());
        // ASCII hyphens generally do not introduce attributions.
        let out = extractor().extract("\"Every penny counts.\" - Sarah Wilmot");
        assert!(names_with(&out, PositionTag::StandaloneDash).is_empty());
    }

    #[test]
    fn blockquote_inline_attribution_either_order() {
        let blocks = vec![
            "It has been a difficult season, said Andoni Iraola".to_string(),
            "Becca Parker added it was a team effort".to_string(),
            "No attribution in this one".to_string(),
        ];
        let out = extractor().extract_from_blockquotes(&blocks);
        let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"Andoni Iraola"));
        assert!(names.contains(&"Becca Parker"));
        assert!(out.iter().all(|c| c.position == Some(PositionTag::BlockquoteInline)));
    }

    #[test]
    fn plain_prose_yields_nothing() {
        let out = extractor().extract("The council met on Tuesday to discuss the budget.");
        assert!(out.is_empty());
    }
}
