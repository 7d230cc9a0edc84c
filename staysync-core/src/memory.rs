//! In-memory collaborators.
//!
//! [`MemoryStore`] behaves like the destination database (record ids, guest
//! rollup, inclusive end dates) without any network. [`StaticSource`] serves a
//! fixed list of events. Both are used to exercise the sync driver.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::constants::UNKNOWN_GUEST;
use crate::error::{StaySyncError, StaySyncResult};
use crate::event::RawEvent;
use crate::remote::{CalendarSource, StayStore};
use crate::stay::{ExistingStay, GuestIdentity, NewStay};

/// Calendar source returning a fixed set of events.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub Vec<RawEvent>);

#[async_trait]
impl CalendarSource for StaticSource {
    async fn fetch_all_day_events(&self) -> StaySyncResult<Vec<RawEvent>> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    guests: Vec<GuestIdentity>,
    stays: Vec<ExistingStay>,
    next_id: usize,
    failing_external_ids: HashSet<String>,
}

impl MemoryState {
    fn mint_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Destination database kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(guests: Vec<GuestIdentity>, stays: Vec<ExistingStay>) -> Self {
        MemoryStore {
            state: Mutex::new(MemoryState {
                guests,
                stays,
                ..MemoryState::default()
            }),
        }
    }

    /// Make `create_stay` fail for the stay with this external id.
    pub fn fail_stay(&self, external_id: &str) {
        self.lock().failing_external_ids.insert(external_id.to_string());
    }

    pub fn guests(&self) -> Vec<GuestIdentity> {
        self.lock().guests.clone()
    }

    pub fn stays(&self) -> Vec<ExistingStay> {
        self.lock().stays.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StayStore for MemoryStore {
    async fn list_guests(&self) -> StaySyncResult<Vec<GuestIdentity>> {
        Ok(self.guests())
    }

    async fn list_stays(&self) -> StaySyncResult<Vec<ExistingStay>> {
        Ok(self.stays())
    }

    async fn create_guest(&self, display_name: &str) -> StaySyncResult<GuestIdentity> {
        let mut state = self.lock();
        let guest = GuestIdentity {
            record_id: state.mint_id("guest"),
            display_name: display_name.to_string(),
        };
        state.guests.push(guest.clone());
        Ok(guest)
    }

    async fn create_stay(&self, stay: &NewStay) -> StaySyncResult<ExistingStay> {
        let mut state = self.lock();

        if state.failing_external_ids.contains(&stay.external_id) {
            return Err(StaySyncError::Destination(format!(
                "Failed to create stay {}",
                stay.summary
            )));
        }

        let guest_text = stay
            .guest_record_id
            .as_ref()
            .and_then(|id| state.guests.iter().find(|g| &g.record_id == id))
            .map(|g| g.display_name.clone())
            .unwrap_or_else(|| UNKNOWN_GUEST.to_string());

        let record = ExistingStay {
            record_id: state.mint_id("stay"),
            paid: false,
            start: stay.start,
            end: stay.end,
            guest_text,
            name: Some(stay.summary.clone()),
            external_id: Some(stay.external_id.clone()),
        };
        state.stays.push(record.clone());
        Ok(record)
    }
}
