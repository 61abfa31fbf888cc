//! Best-effort gender inference from first names.
//!
//! Backed by an embedded first-name reference table. The table carries finer
//! categories than the output type (leaning and androgynous entries); those
//! collapse down to the three-valued [`Gender`] at inference time. The finer
//! categories still matter for the single-token person gate, where an
//! androgynous name counts as "recognized as a human first name" even though
//! its inferred gender is unknown.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Embedded reference table, `name<TAB>category` per line.
const FIRST_NAMES_TSV: &str = include_str!("../data/first_names.tsv");

/// Output gender label. The collective pronoun value "they" that some
/// upstream integrations emit must never appear here; it normalizes to
/// [`Gender::Unknown`] at the deserialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }

    /// Normalize a free-text gender label from an external proposer.
    ///
    /// Accepts the common abbreviations; everything else, including "they",
    /// collapses to [`Gender::Unknown`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "m" | "male" => Gender::Male,
            "f" | "female" => Gender::Female,
            other => {
                if other == "they" {
                    warn!("collective gender label 'they' normalized to unknown");
                }
                Gender::Unknown
            }
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-grained category as recorded in the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameGender {
    Male,
    Female,
    MostlyMale,
    MostlyFemale,
    Androgynous,
}

impl NameGender {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(NameGender::Male),
            "female" => Some(NameGender::Female),
            "mostly_male" => Some(NameGender::MostlyMale),
            "mostly_female" => Some(NameGender::MostlyFemale),
            "andy" => Some(NameGender::Androgynous),
            _ => None,
        }
    }

    fn collapse(self) -> Gender {
        match self {
            NameGender::Male | NameGender::MostlyMale => Gender::Male,
            NameGender::Female | NameGender::MostlyFemale => Gender::Female,
            NameGender::Androgynous => Gender::Unknown,
        }
    }
}

/// First-name to gender lookup, loaded once per process and shared read-only.
#[derive(Debug, Clone)]
pub struct GenderLookup {
    table: HashMap<String, NameGender>,
}

impl Default for GenderLookup {
    fn default() -> Self {
        Self::embedded()
    }
}

impl GenderLookup {
    /// Build the lookup from the embedded reference table.
    pub fn embedded() -> Self {
        Self::from_tsv(FIRST_NAMES_TSV)
    }

    /// Load a replacement table from a TSV file on disk.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read names table {}", path.display()))?;
        Ok(Self::from_tsv(&contents))
    }

    fn from_tsv(tsv: &str) -> Self {
        let mut table = HashMap::new();
        for (lineno, line) in tsv.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, category)) = line.split_once('\t') else {
                warn!(lineno = lineno + 1, "malformed first-name table line, skipping");
                continue;
            };
            match NameGender::parse(category.trim()) {
                Some(g) => {
                    table.insert(name.trim().to_lowercase(), g);
                }
                None => {
                    warn!(lineno = lineno + 1, category, "unknown gender category, skipping");
                }
            }
        }
        Self { table }
    }

    /// Infer gender from the first whitespace token of a cleaned name.
    ///
    /// Leaning categories collapse to their base; androgynous and
    /// unrecognized names map to [`Gender::Unknown`].
    pub fn infer(&self, name: &str) -> Gender {
        name.split_whitespace()
            .next()
            .and_then(|first| self.table.get(&first.to_lowercase()))
            .map(|g| g.collapse())
            .unwrap_or(Gender::Unknown)
    }

    /// Whether `token` appears in the reference table at all, androgynous
    /// entries included. Used by the single-token person gate, where being a
    /// known first name is the signal, not the gender itself.
    pub fn recognizes(&self, token: &str) -> bool {
        self.table.contains_key(&token.to_lowercase())
    }
}
