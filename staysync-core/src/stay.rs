//! Stay and guest records on both sides of the sync.
//!
//! Date conventions differ between the two sides:
//! - [`Stay`] (calendar side) has an EXCLUSIVE end: the checkout day.
//! - [`ExistingStay`] and [`NewStay`] (destination side) have an INCLUSIVE
//!   end: the last night.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A guest stay extracted from the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    pub summary: String,
    /// First night (inclusive)
    pub start: NaiveDate,
    /// Checkout day (exclusive)
    pub end: NaiveDate,
    /// Guest display name extracted from the summary. May be empty.
    pub guest: String,
    /// Feed UID of the source event
    pub source_id: String,
}

impl Stay {
    /// Last night of the stay, i.e. the destination's inclusive end date.
    ///
    /// A zero-length stay (end == start) keeps its start as the last night.
    pub fn last_night(&self) -> NaiveDate {
        if self.end > self.start {
            self.end - Days::new(1)
        } else {
            self.start
        }
    }
}

/// A stay record already present in the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingStay {
    pub record_id: String,
    pub paid: bool,
    pub start: NaiveDate,
    /// Last night (inclusive)
    pub end: NaiveDate,
    /// Guest display text (a rollup of the related guest's name)
    pub guest_text: String,
    pub name: Option<String>,
    /// Feed UID copied at creation. Absent on legacy or hand-made records.
    pub external_id: Option<String>,
}

impl ExistingStay {
    /// Title used in log lines.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.guest_text)
    }
}

/// A guest entity in the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestIdentity {
    pub record_id: String,
    pub display_name: String,
}

impl GuestIdentity {
    pub fn key(&self) -> Option<String> {
        guest_key(&self.display_name)
    }
}

/// A stay creation request in the destination's date convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStay {
    pub summary: String,
    pub start: NaiveDate,
    /// Last night (inclusive)
    pub end: NaiveDate,
    /// Record id of the related guest, if one was resolved
    pub guest_record_id: Option<String>,
    pub external_id: String,
}

impl NewStay {
    pub fn from_stay(stay: &Stay, guest: Option<&GuestIdentity>) -> Self {
        NewStay {
            summary: stay.summary.clone(),
            start: stay.start,
            end: stay.last_night(),
            guest_record_id: guest.map(|g| g.record_id.clone()),
            external_id: stay.source_id.clone(),
        }
    }
}

/// Directory key of a guest: the lowercased first whitespace-delimited token.
///
/// Two guests sharing a first name share a key. Returns `None` for blank names.
pub fn guest_key(name: &str) -> Option<String> {
    name.split_whitespace().next().map(|t| t.to_lowercase())
}
