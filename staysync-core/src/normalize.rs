//! Turning raw calendar events into stays.
//!
//! Stays are all-day events whose summary names the house, usually written
//! "PERSON at Laplace" or "PERSON à La Place".

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::constants::STAY_MARKER;
use crate::date_range::LookbackWindow;
use crate::event::RawEvent;
use crate::stay::Stay;

static HOUSE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bla ?place$").expect("valid house suffix regex"));

/// Convert raw events into stays, keeping feed order.
///
/// An event is dropped (and logged) when its start or end has a time of day,
/// when its start falls outside `window`, when its end precedes its start, or
/// when its summary does not mention the house. A missing end defaults to the
/// start date.
pub fn normalize(events: &[RawEvent], window: Option<&LookbackWindow>) -> Vec<Stay> {
    events
        .iter()
        .filter_map(|event| to_stay(event, window))
        .collect()
}

fn to_stay(event: &RawEvent, window: Option<&LookbackWindow>) -> Option<Stay> {
    let Some(start) = event.start.as_date() else {
        info!(
            "Skipping {} because it's not a stay (start is not a simple date)",
            event.summary
        );
        return None;
    };

    let end = match event.end {
        None => start,
        Some(end) => match end.as_date() {
            Some(end) => end,
            None => {
                info!(
                    "Skipping {} because it's not a stay (end is not a simple date)",
                    event.summary
                );
                return None;
            }
        },
    };

    if let Some(window) = window {
        if !window.contains(start) {
            return None;
        }
    }

    if end < start {
        info!(
            "Skipping {} because its end ({}) is before its start ({})",
            event.summary, end, start
        );
        return None;
    }

    if !is_stay_summary(&event.summary) {
        info!(
            "Skipping {} because it's not a stay (no Laplace in name)",
            event.summary
        );
        return None;
    }

    Some(Stay {
        summary: event.summary.clone(),
        start,
        end,
        guest: guest_name_from_summary(&event.summary),
        source_id: event.id.clone(),
    })
}

/// Whether a summary carries the house marker, ignoring case and spaces.
pub fn is_stay_summary(summary: &str) -> bool {
    let squashed: String = summary
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    squashed.contains(STAY_MARKER)
}

/// Extract the guest display name from a stay summary.
///
/// Strips a trailing "La Place"/"Laplace", then the " at " and "à"
/// connectors. The result may be empty.
pub fn guest_name_from_summary(summary: &str) -> String {
    let without_house = HOUSE_SUFFIX.replace(summary, "");
    without_house
        .replace(" at ", "")
        .replace('à', "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDate;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn guest_names_are_extracted_from_summaries() {
        assert_eq!(guest_name_from_summary("Alice at Laplace"), "Alice");
        assert_eq!(guest_name_from_summary("Bob à La Place"), "Bob");
        assert_eq!(guest_name_from_summary("Carol Laplace"), "Carol");
        assert_eq!(guest_name_from_summary("Dan & Eve at LAPLACE"), "Dan & Eve");
        assert_eq!(guest_name_from_summary("Laplace"), "");
    }

    #[test]
    fn house_marker_ignores_case_and_spaces() {
        assert!(is_stay_summary("Alice at Laplace"));
        assert!(is_stay_summary("Bob à La Place"));
        assert!(is_stay_summary("Carol at LA  PLACE"));
        assert!(!is_stay_summary("Dentist"));
        assert!(!is_stay_summary("Alice at the place"));
    }

    #[test]
    fn non_stays_and_timed_events_are_dropped() {
        let timed = RawEvent {
            summary: "Dinner at Laplace".to_string(),
            start: EventDate::DateTime(date(2024, 1, 2).and_hms_opt(19, 0, 0).unwrap()),
            end: Some(EventDate::DateTime(
                date(2024, 1, 2).and_hms_opt(22, 0, 0).unwrap(),
            )),
            description: String::new(),
            id: "dinner".to_string(),
        };
        let timed_end = RawEvent {
            end: Some(EventDate::DateTime(
                date(2024, 1, 3).and_hms_opt(10, 0, 0).unwrap(),
            )),
            start: EventDate::Date(date(2024, 1, 2)),
            ..timed.clone()
        };
        let events = vec![
            RawEvent::all_day("a", "Alice at Laplace", date(2024, 1, 1), date(2024, 1, 5)),
            RawEvent::all_day("x", "Dentist", date(2024, 1, 1), date(2024, 1, 2)),
            timed,
            timed_end,
            RawEvent::all_day("b", "Bob à La Place", date(2024, 1, 3), date(2024, 1, 4)),
        ];

        let stays = normalize(&events, None);

        let ids: Vec<&str> = stays.iter().map(|s| s.source_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(stays[0].guest, "Alice");
        assert_eq!(stays[0].end, date(2024, 1, 5));
        assert_eq!(stays[1].guest, "Bob");
    }

    #[test]
    fn missing_end_defaults_to_start() {
        let event = RawEvent {
            end: None,
            ..RawEvent::all_day("c", "Carol Laplace", date(2024, 2, 1), date(2024, 2, 1))
        };

        let stays = normalize(&[event], None);

        assert_eq!(stays.len(), 1);
        assert_eq!(stays[0].start, stays[0].end);
    }

    #[test]
    fn end_before_start_is_dropped() {
        let event = RawEvent::all_day("c", "Carol Laplace", date(2024, 2, 5), date(2024, 2, 1));

        assert!(normalize(&[event], None).is_empty());
    }

    #[test]
    fn window_filters_on_start_date() {
        let window = LookbackWindow::ending_on(date(2024, 3, 10), 5);
        let events = vec![
            RawEvent::all_day("old", "Old at Laplace", date(2024, 3, 4), date(2024, 3, 6)),
            RawEvent::all_day("edge", "Edge at Laplace", date(2024, 3, 5), date(2024, 3, 6)),
            RawEvent::all_day("today", "Now at Laplace", date(2024, 3, 10), date(2024, 3, 12)),
            RawEvent::all_day("future", "Later at Laplace", date(2024, 3, 11), date(2024, 3, 12)),
        ];

        let stays = normalize(&events, Some(&window));

        let ids: Vec<&str> = stays.iter().map(|s| s.source_id.as_str()).collect();
        assert_eq!(ids, vec!["edge", "today"]);
        assert_eq!(normalize(&events, None).len(), 4);
    }

    #[test]
    fn normalization_is_deterministic() {
        let events = vec![
            RawEvent::all_day("a", "Alice at Laplace", date(2024, 1, 1), date(2024, 1, 5)),
            RawEvent::all_day("b", "Bob à La Place", date(2024, 1, 3), date(2024, 1, 4)),
        ];

        assert_eq!(normalize(&events, None), normalize(&events, None));
    }
}
