//! Collaborator interfaces: the calendar feed and the destination database.
//!
//! The sync driver only talks to these traits. Implementations hold their own
//! long-lived client and are passed in by reference.

use async_trait::async_trait;

use crate::error::StaySyncResult;
use crate::event::RawEvent;
use crate::stay::{ExistingStay, GuestIdentity, NewStay};

/// Source of calendar events.
#[async_trait]
pub trait CalendarSource {
    /// Fetch every event of the feed. Transport failures are fatal.
    async fn fetch_all_day_events(&self) -> StaySyncResult<Vec<RawEvent>>;
}

/// Destination database holding guests and stays.
#[async_trait]
pub trait StayStore {
    /// List guests. Rows without a name are skipped by the implementation.
    async fn list_guests(&self) -> StaySyncResult<Vec<GuestIdentity>>;

    /// List stays. Rows without a date range are skipped by the implementation.
    async fn list_stays(&self) -> StaySyncResult<Vec<ExistingStay>>;

    async fn create_guest(&self, display_name: &str) -> StaySyncResult<GuestIdentity>;

    async fn create_stay(&self, stay: &NewStay) -> StaySyncResult<ExistingStay>;
}
