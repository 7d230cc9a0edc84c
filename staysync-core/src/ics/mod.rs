//! iCalendar feed parsing.
//!
//! This module turns the body of an `.ics` subscription feed into
//! [`RawEvent`](crate::event::RawEvent) values.

mod parse;

pub use parse::parse_feed;
