//! Feed parsing using the icalendar crate's parser.

use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};
use tracing::{debug, warn};

use crate::error::{StaySyncError, StaySyncResult};
use crate::event::{EventDate, RawEvent};

/// Parse a whole calendar feed into raw events, in feed order.
///
/// VEVENTs without a UID or a usable DTSTART are logged and skipped. Any
/// other VEVENT is returned, including timed ones: deciding what counts as a
/// stay is the normalizer's job.
pub fn parse_feed(content: &str) -> StaySyncResult<Vec<RawEvent>> {
    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| StaySyncError::IcsParse(e.to_string()))?;

    let events: Vec<RawEvent> = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .filter_map(parse_vevent)
        .collect();

    debug!(count = events.len(), "parsed calendar feed");
    Ok(events)
}

fn parse_vevent(vevent: &Component) -> Option<RawEvent> {
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| unescape_text(p.val.as_ref()))
        .unwrap_or_default();

    let Some(uid) = vevent.find_prop("UID").map(|p| p.val.to_string()) else {
        warn!("Skipping {summary:?}: event has no UID");
        return None;
    };

    let Some(start) = vevent
        .find_prop("DTSTART")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_date)
    else {
        warn!("Skipping {summary:?}: event has no valid start");
        return None;
    };

    let end = vevent
        .find_prop("DTEND")
        .and_then(|p| DatePerhapsTime::try_from(p).ok())
        .map(to_event_date);

    let description = vevent
        .find_prop("DESCRIPTION")
        .map(|p| unescape_text(p.val.as_ref()))
        .unwrap_or_default();

    Some(RawEvent {
        summary,
        start,
        end,
        description,
        id: uid,
    })
}

fn to_event_date(dpt: DatePerhapsTime) -> EventDate {
    match dpt {
        DatePerhapsTime::Date(d) => EventDate::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => EventDate::DateTime(dt.naive_utc()),
            CalendarDateTime::Floating(naive) => EventDate::DateTime(naive),
            CalendarDateTime::WithTimezone { date_time, .. } => EventDate::DateTime(date_time),
        },
    }
}

/// Undo RFC 5545 TEXT escaping (`\,` `\;` `\n` `\\`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
