//! Lookback window for filtering calendar events.

use chrono::{Days, Local, NaiveDate};

/// Inclusive date range `[today - days, today]` that event starts must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl LookbackWindow {
    /// Window ending on the local current date.
    pub fn ending_today(days: u32) -> Self {
        Self::ending_on(Local::now().date_naive(), days)
    }

    pub fn ending_on(today: NaiveDate, days: u32) -> Self {
        let from = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);

        LookbackWindow { from, to: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}
