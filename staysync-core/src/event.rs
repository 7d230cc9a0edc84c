//! Raw calendar events as read from the feed.
//!
//! These are the unfiltered VEVENTs of the calendar. The normalizer turns the
//! qualifying ones into [`Stay`](crate::stay::Stay) records.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A start or end value of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventDate {
    /// All-day value (`VALUE=DATE`)
    Date(NaiveDate),
    /// Value with a time of day. Timezone is irrelevant for stays, so the
    /// wall-clock value is kept as-is.
    DateTime(NaiveDateTime),
}

impl EventDate {
    /// The pure date, or `None` if this value carries a time of day.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            EventDate::Date(d) => Some(*d),
            EventDate::DateTime(_) => None,
        }
    }
}

/// A calendar event straight from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub summary: String,
    pub start: EventDate,
    pub end: Option<EventDate>,
    pub description: String,
    /// Feed UID, stable across fetches
    pub id: String,
}

impl RawEvent {
    /// Convenience constructor for an all-day event.
    pub fn all_day(id: &str, summary: &str, start: NaiveDate, end: NaiveDate) -> Self {
        RawEvent {
            summary: summary.to_string(),
            start: EventDate::Date(start),
            end: Some(EventDate::Date(end)),
            description: String::new(),
            id: id.to_string(),
        }
    }
}
