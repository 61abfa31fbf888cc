//! Direct-quote policy over reconciled output.
//!
//! Downstream scoring only wants sources that were actually quoted, not
//! merely mentioned. This is a policy layered on top of reconciliation, not
//! part of it: it keeps confirmed records whose attribution position is in
//! the direct-quote vocabulary and whose name is not on the curated
//! false-positive denylist.

use tracing::debug;

use crate::filters::FilterRules;
use crate::types::ConfirmedSource;

/// Keep only directly quoted, non-denylisted confirmed sources.
///
/// Records without a position tag never count as direct quotes.
pub fn direct_quote_sources(
    confirmed: &[ConfirmedSource],
    rules: &FilterRules,
) -> Vec<ConfirmedSource> {
    confirmed
        .iter()
        .filter(|c| {
            let quoted = c
                .position
                .is_some_and(|p| rules.is_direct_quote_position(p));
            if !quoted {
                return false;
            }
            if rules.is_denylisted(&c.name) {
                debug!(name = %c.name, "denylisted source dropped by quote policy");
                return false;
            }
            true
        })
        .cloned()
        .collect()
}
