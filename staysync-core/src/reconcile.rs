//! Set difference between calendar stays and destination stays.

use tracing::debug;

use crate::matching::{Ambiguity, ExistingIndex, MatchOutcome, MatchPolicy};
use crate::stay::{ExistingStay, Stay};

/// Calendar stays with no counterpart in the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// In calendar order
    pub missing: Vec<Stay>,
    pub ambiguities: Vec<Ambiguity>,
}

/// Find the calendar stays that `policy` cannot match to an existing record.
///
/// A stay is missing only after every existing record was considered. Any
/// ambiguities seen for a stay are kept whether or not it ends up matched.
pub fn find_missing(
    stays: &[Stay],
    existing: &[ExistingStay],
    policy: &dyn MatchPolicy,
) -> Reconciliation {
    let index = ExistingIndex::new(existing);
    let mut reconciliation = Reconciliation::default();

    for stay in stays {
        match policy.classify(stay, &index) {
            MatchOutcome::Present(record, ambiguities) => {
                reconciliation.ambiguities.extend(ambiguities);
                debug!(
                    policy = policy.name(),
                    record = %record.record_id,
                    "{} matched",
                    stay.summary
                );
            }
            MatchOutcome::Missing(ambiguities) => {
                reconciliation.ambiguities.extend(ambiguities);
                reconciliation.missing.push(stay.clone());
            }
        }
    }

    reconciliation
}
