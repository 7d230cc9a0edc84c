//! Policies deciding whether a calendar stay already exists in the destination.
//!
//! Two policies are available and the choice is explicit configuration:
//! - [`IdentityKeyPolicy`]: the stay's feed UID is recorded on the destination
//!   record. Records without an external id are never matched.
//! - [`HeuristicPolicy`]: same first and last night, and the guest's first
//!   name found in the record's guest text or name. A date match with a
//!   failing name check is reported as an [`Ambiguity`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::stay::{ExistingStay, Stay, guest_key};

/// A destination record sharing a stay's dates whose guest could not be matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ambiguity {
    pub stay_summary: String,
    pub stay_source_id: String,
    pub existing_label: String,
    pub existing_record_id: String,
    pub start: NaiveDate,
    /// Checkout day (exclusive), as on the calendar
    pub end: NaiveDate,
}

/// Destination records prepared once per reconciliation.
pub struct ExistingIndex<'a> {
    records: &'a [ExistingStay],
    by_external_id: HashMap<&'a str, &'a ExistingStay>,
}

impl<'a> ExistingIndex<'a> {
    pub fn new(records: &'a [ExistingStay]) -> Self {
        let by_external_id = records
            .iter()
            .filter_map(|r| r.external_id.as_deref().map(|id| (id, r)))
            .collect();

        ExistingIndex {
            records,
            by_external_id,
        }
    }

    pub fn records(&self) -> &'a [ExistingStay] {
        self.records
    }

    pub fn by_external_id(&self, id: &str) -> Option<&'a ExistingStay> {
        self.by_external_id.get(id).copied()
    }
}

/// Result of matching one calendar stay, with the ambiguities met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    Present(&'a ExistingStay, Vec<Ambiguity>),
    Missing(Vec<Ambiguity>),
}

/// Strategy deciding whether a stay is already in the destination.
pub trait MatchPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn classify<'a>(&self, stay: &Stay, existing: &ExistingIndex<'a>) -> MatchOutcome<'a>;
}

/// Match on the feed UID stored as the record's external id.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityKeyPolicy;

impl MatchPolicy for IdentityKeyPolicy {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn classify<'a>(&self, stay: &Stay, existing: &ExistingIndex<'a>) -> MatchOutcome<'a> {
        match existing.by_external_id(&stay.source_id) {
            Some(record) => {
                info!("{} already in destination", stay.summary);
                MatchOutcome::Present(record, Vec::new())
            }
            None => MatchOutcome::Missing(Vec::new()),
        }
    }
}

/// Match on dates plus a first-name substring check.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    /// Same first night and same last night. The record's inclusive end is
    /// the day before the stay's checkout, or the start for a zero-length stay.
    pub fn dates_match(stay: &Stay, record: &ExistingStay) -> bool {
        record.start == stay.start && record.end == stay.last_night()
    }

    /// The guest's lowercased first name appears in the record's guest text or name.
    /// A blank guest never matches.
    pub fn guest_matches(stay: &Stay, record: &ExistingStay) -> bool {
        let Some(first_name) = guest_key(&stay.guest) else {
            return false;
        };

        record.guest_text.to_lowercase().contains(&first_name)
            || record
                .name
                .as_ref()
                .is_some_and(|name| name.to_lowercase().contains(&first_name))
    }
}

impl MatchPolicy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn classify<'a>(&self, stay: &Stay, existing: &ExistingIndex<'a>) -> MatchOutcome<'a> {
        let mut ambiguities = Vec::new();

        for record in existing.records() {
            if !Self::dates_match(stay, record) {
                continue;
            }

            if Self::guest_matches(stay, record) {
                info!("{} already in destination as {}", stay.summary, record.label());
                return MatchOutcome::Present(record, ambiguities);
            }

            warn!(
                "Ambiguity: '{}' and '{}' both run from {} to {}",
                stay.summary,
                record.label(),
                stay.start,
                stay.end
            );
            ambiguities.push(Ambiguity {
                stay_summary: stay.summary.clone(),
                stay_source_id: stay.source_id.clone(),
                existing_label: record.label().to_string(),
                existing_record_id: record.record_id.clone(),
                start: stay.start,
                end: stay.end,
            });
        }

        MatchOutcome::Missing(ambiguities)
    }
}

/// Configured choice of matching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicyKind {
    #[default]
    Identity,
    Heuristic,
}

impl MatchPolicyKind {
    pub fn policy(self) -> Box<dyn MatchPolicy> {
        match self {
            MatchPolicyKind::Identity => Box::new(IdentityKeyPolicy),
            MatchPolicyKind::Heuristic => Box::new(HeuristicPolicy),
        }
    }
}

impl fmt::Display for MatchPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicyKind::Identity => write!(f, "identity"),
            MatchPolicyKind::Heuristic => write!(f, "heuristic"),
        }
    }
}

impl FromStr for MatchPolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identity" => Ok(MatchPolicyKind::Identity),
            "heuristic" => Ok(MatchPolicyKind::Heuristic),
            other => Err(format!(
                "Unknown match policy '{}'. Expected 'identity' or 'heuristic'",
                other
            )),
        }
    }
}
