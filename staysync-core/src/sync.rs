//! Sync driver: calendar feed → missing stays → destination writes.
//!
//! A run is split like a diff: [`SyncPlan::build`] loads both sides and
//! computes the missing stays without writing anything, and
//! [`SyncPlan::apply`] creates them. Writes are independent: if one fails,
//! earlier creations stay in place and are reported in [`ApplyError`].

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::date_range::LookbackWindow;
use crate::error::{StaySyncError, StaySyncResult};
use crate::guests::GuestDirectory;
use crate::matching::{Ambiguity, MatchPolicy};
use crate::normalize::normalize;
use crate::reconcile::{Reconciliation, find_missing};
use crate::remote::{CalendarSource, StayStore};
use crate::stay::{ExistingStay, NewStay, Stay};

/// Counts and details of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub found_in_calendar: usize,
    pub found_in_destination: usize,
    pub missing: usize,
    pub created: usize,
    pub guests_created: usize,
    pub ambiguities: Vec<Ambiguity>,
    pub created_records: Vec<ExistingStay>,
    pub dry_run: bool,
}

/// A write failed partway through [`SyncPlan::apply`].
#[derive(Error, Debug)]
#[error("Stopped after adding {} of {} stays: {source}", .report.created, .report.missing)]
pub struct ApplyError {
    /// What was created before the failure
    pub report: SyncReport,
    #[source]
    pub source: StaySyncError,
}

impl From<ApplyError> for StaySyncError {
    fn from(e: ApplyError) -> Self {
        e.source
    }
}

/// Everything needed to bring the destination up to date.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub guests: GuestDirectory,
    pub found_in_calendar: usize,
    pub found_in_destination: usize,
    pub reconciliation: Reconciliation,
}

impl SyncPlan {
    /// Load guests and stays from the destination, fetch and normalize the
    /// calendar, and reconcile the two.
    pub async fn build<C, S>(
        source: &C,
        store: &S,
        window: Option<&LookbackWindow>,
        policy: &dyn MatchPolicy,
    ) -> StaySyncResult<Self>
    where
        C: CalendarSource + ?Sized,
        S: StayStore + ?Sized,
    {
        let guests = GuestDirectory::load(store.list_guests().await?);
        info!("Loaded {} guests from destination", guests.len());

        let existing = store.list_stays().await?;
        let events = source.fetch_all_day_events().await?;
        let stays = normalize(&events, window);

        info!("Found {} stays in calendar", stays.len());
        info!("Found {} stays in destination", existing.len());

        let reconciliation = find_missing(&stays, &existing, policy);
        info!(
            policy = policy.name(),
            "Found {} missing stays",
            reconciliation.missing.len()
        );

        Ok(SyncPlan {
            guests,
            found_in_calendar: stays.len(),
            found_in_destination: existing.len(),
            reconciliation,
        })
    }

    pub fn missing(&self) -> &[Stay] {
        &self.reconciliation.missing
    }

    /// Report of this plan without applying it.
    pub fn dry_run_report(&self) -> SyncReport {
        SyncReport {
            found_in_calendar: self.found_in_calendar,
            found_in_destination: self.found_in_destination,
            missing: self.reconciliation.missing.len(),
            ambiguities: self.reconciliation.ambiguities.clone(),
            dry_run: true,
            ..SyncReport::default()
        }
    }

    /// Create every missing stay, resolving (and if needed creating) its guest
    /// first. Stops at the first failed write.
    pub async fn apply<S>(mut self, store: &S) -> Result<SyncReport, ApplyError>
    where
        S: StayStore + ?Sized,
    {
        let mut report = SyncReport {
            dry_run: false,
            ..self.dry_run_report()
        };

        for stay in &self.reconciliation.missing {
            match create_stay(&mut self.guests, stay, store).await {
                Ok((record, guest_created)) => {
                    report.created += 1;
                    if guest_created {
                        report.guests_created += 1;
                    }
                    report.created_records.push(record);
                }
                Err(e) => {
                    let failure = ApplyError { report, source: e };
                    warn!("{}", failure);
                    return Err(failure);
                }
            }
        }

        info!("Added {} stays to destination", report.created);
        Ok(report)
    }
}

async fn create_stay<S>(
    guests: &mut GuestDirectory,
    stay: &Stay,
    store: &S,
) -> StaySyncResult<(ExistingStay, bool)>
where
    S: StayStore + ?Sized,
{
    let resolution = guests.resolve(&stay.guest, store).await?;
    if resolution.is_none() {
        warn!("No guest name in {}, adding stay without guest", stay.summary);
    }

    let guest = resolution.as_ref().map(|r| &r.guest);
    let new_stay = NewStay::from_stay(stay, guest);

    info!("Adding stay {} to destination", stay.summary);
    let record = store.create_stay(&new_stay).await?;

    Ok((record, resolution.is_some_and(|r| r.created)))
}

/// Build the plan and, unless `dry_run`, apply it.
pub async fn run<C, S>(
    source: &C,
    store: &S,
    window: Option<&LookbackWindow>,
    policy: &dyn MatchPolicy,
    dry_run: bool,
) -> StaySyncResult<SyncReport>
where
    C: CalendarSource + ?Sized,
    S: StayStore + ?Sized,
{
    let plan = SyncPlan::build(source, store, window, policy).await?;

    if dry_run {
        return Ok(plan.dry_run_report());
    }

    Ok(plan.apply(store).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDate, RawEvent};
    use crate::matching::{HeuristicPolicy, IdentityKeyPolicy};
    use crate::memory::{MemoryStore, StaticSource};
    use crate::stay::GuestIdentity;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn three_event_feed() -> StaticSource {
        StaticSource(vec![
            RawEvent::all_day("stay-1", "Alice at Laplace", date(2024, 1, 1), date(2024, 1, 5)),
            RawEvent::all_day("other-1", "Dentist", date(2024, 1, 2), date(2024, 1, 3)),
            RawEvent {
                summary: "Dinner at Laplace".to_string(),
                start: EventDate::DateTime(date(2024, 1, 2).and_hms_opt(19, 0, 0).unwrap()),
                end: Some(EventDate::DateTime(
                    date(2024, 1, 2).and_hms_opt(22, 0, 0).unwrap(),
                )),
                description: String::new(),
                id: "dinner-1".to_string(),
            },
        ])
    }

    #[tokio::test]
    async fn single_qualifying_event_is_created() {
        let source = three_event_feed();
        let store = MemoryStore::new();

        let report = run(&source, &store, None, &IdentityKeyPolicy, false)
            .await
            .unwrap();

        assert_eq!(report.found_in_calendar, 1);
        assert_eq!(report.found_in_destination, 0);
        assert_eq!(report.missing, 1);
        assert_eq!(report.created, 1);
        assert_eq!(report.guests_created, 1);

        let stays = store.stays();
        assert_eq!(stays.len(), 1);
        assert_eq!(stays[0].start, date(2024, 1, 1));
        assert_eq!(stays[0].end, date(2024, 1, 4));
        assert_eq!(stays[0].guest_text, "Alice");
        assert_eq!(stays[0].external_id.as_deref(), Some("stay-1"));
    }

    #[tokio::test]
    async fn second_identity_run_finds_nothing_missing() {
        let source = three_event_feed();
        let store = MemoryStore::new();

        run(&source, &store, None, &IdentityKeyPolicy, false)
            .await
            .unwrap();
        let second = run(&source, &store, None, &IdentityKeyPolicy, false)
            .await
            .unwrap();

        assert_eq!(second.found_in_destination, 1);
        assert_eq!(second.missing, 0);
        assert_eq!(second.created, 0);
        assert_eq!(store.stays().len(), 1);
    }

    #[tokio::test]
    async fn second_heuristic_run_finds_nothing_missing() {
        let source = three_event_feed();
        let store = MemoryStore::new();

        run(&source, &store, None, &HeuristicPolicy, false)
            .await
            .unwrap();
        let second = run(&source, &store, None, &HeuristicPolicy, false)
            .await
            .unwrap();

        assert_eq!(second.missing, 0);
        assert!(second.ambiguities.is_empty());
    }

    #[tokio::test]
    async fn second_heuristic_run_matches_stay_without_end_date() {
        let source = StaticSource(vec![RawEvent {
            end: None,
            ..RawEvent::all_day("z-1", "Zoe at Laplace", date(2024, 1, 1), date(2024, 1, 1))
        }]);
        let store = MemoryStore::new();

        let first = run(&source, &store, None, &HeuristicPolicy, false)
            .await
            .unwrap();
        let second = run(&source, &store, None, &HeuristicPolicy, false)
            .await
            .unwrap();

        assert_eq!(first.created, 1);
        assert_eq!(store.stays()[0].end, date(2024, 1, 1));
        assert_eq!(second.missing, 0);
        assert!(second.ambiguities.is_empty());
        assert_eq!(store.stays().len(), 1);
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let source = three_event_feed();
        let store = MemoryStore::new();

        let report = run(&source, &store, None, &IdentityKeyPolicy, true)
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.missing, 1);
        assert_eq!(report.created, 0);
        assert!(store.stays().is_empty());
        assert!(store.guests().is_empty());
    }

    #[tokio::test]
    async fn guests_sharing_a_first_name_are_created_once() {
        let source = StaticSource(vec![
            RawEvent::all_day("a-1", "Alice at Laplace", date(2024, 1, 1), date(2024, 1, 3)),
            RawEvent::all_day("a-2", "Alice at Laplace", date(2024, 2, 1), date(2024, 2, 3)),
            RawEvent::all_day("b-1", "Bob à La Place", date(2024, 3, 1), date(2024, 3, 3)),
        ]);
        let store = MemoryStore::with_records(
            vec![GuestIdentity {
                record_id: "g-bob".to_string(),
                display_name: "Bob Marley".to_string(),
            }],
            vec![],
        );

        let report = run(&source, &store, None, &IdentityKeyPolicy, false)
            .await
            .unwrap();

        assert_eq!(report.created, 3);
        assert_eq!(report.guests_created, 1);
        assert_eq!(store.guests().len(), 2);
        assert_eq!(store.stays()[2].guest_text, "Bob Marley");
    }

    #[tokio::test]
    async fn heuristic_ambiguity_is_reported_and_stay_still_created() {
        let source = StaticSource(vec![RawEvent::all_day(
            "bob-1",
            "Bob at Laplace",
            date(2024, 1, 1),
            date(2024, 1, 5),
        )]);
        let store = MemoryStore::with_records(
            vec![],
            vec![ExistingStay {
                record_id: "r-1".to_string(),
                paid: false,
                start: date(2024, 1, 1),
                end: date(2024, 1, 4),
                guest_text: "Alice Smith".to_string(),
                name: Some("Alice at Laplace".to_string()),
                external_id: None,
            }],
        );

        let report = run(&source, &store, None, &HeuristicPolicy, false)
            .await
            .unwrap();

        assert_eq!(report.missing, 1);
        assert_eq!(report.created, 1);
        assert_eq!(report.ambiguities.len(), 1);
        assert_eq!(report.ambiguities[0].stay_summary, "Bob at Laplace");
    }

    #[tokio::test]
    async fn failed_write_keeps_earlier_creations() {
        let source = StaticSource(vec![
            RawEvent::all_day("a-1", "Alice at Laplace", date(2024, 1, 1), date(2024, 1, 3)),
            RawEvent::all_day("b-1", "Bob at Laplace", date(2024, 2, 1), date(2024, 2, 3)),
            RawEvent::all_day("c-1", "Carol at Laplace", date(2024, 3, 1), date(2024, 3, 3)),
        ]);
        let store = MemoryStore::new();
        store.fail_stay("b-1");

        let err = run(&source, &store, None, &IdentityKeyPolicy, false)
            .await
            .unwrap_err();

        assert!(matches!(err, StaySyncError::Destination(_)));
        let stays = store.stays();
        assert_eq!(stays.len(), 1);
        assert_eq!(stays[0].external_id.as_deref(), Some("a-1"));
    }

    #[tokio::test]
    async fn failed_apply_reports_stays_created_before_the_failure() {
        let source = StaticSource(vec![
            RawEvent::all_day("a-1", "Alice at Laplace", date(2024, 1, 1), date(2024, 1, 3)),
            RawEvent::all_day("b-1", "Bob at Laplace", date(2024, 2, 1), date(2024, 2, 3)),
        ]);
        let store = MemoryStore::new();
        store.fail_stay("b-1");

        let plan = SyncPlan::build(&source, &store, None, &IdentityKeyPolicy)
            .await
            .unwrap();
        let failure = plan.apply(&store).await.unwrap_err();

        assert!(matches!(failure.source, StaySyncError::Destination(_)));
        assert_eq!(failure.report.created, 1);
        assert_eq!(failure.report.missing, 2);
        assert_eq!(failure.report.guests_created, 1);
        assert_eq!(failure.report.created_records.len(), 1);
        assert_eq!(
            failure.report.created_records[0].external_id.as_deref(),
            Some("a-1")
        );
        assert!(failure.to_string().starts_with("Stopped after adding 1 of 2 stays"));
    }

    #[tokio::test]
    async fn blank_guest_stay_is_created_without_guest() {
        let source = StaticSource(vec![RawEvent::all_day(
            "x-1",
            "Laplace",
            date(2024, 1, 1),
            date(2024, 1, 2),
        )]);
        let store = MemoryStore::new();

        let report = run(&source, &store, None, &IdentityKeyPolicy, false)
            .await
            .unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.guests_created, 0);
        assert!(store.guests().is_empty());
    }

    #[tokio::test]
    async fn lookback_window_limits_calendar_stays() {
        let source = StaticSource(vec![
            RawEvent::all_day("old", "Alice at Laplace", date(2023, 1, 1), date(2023, 1, 3)),
            RawEvent::all_day("new", "Bob at Laplace", date(2024, 3, 8), date(2024, 3, 9)),
        ]);
        let store = MemoryStore::new();
        let window = LookbackWindow::ending_on(date(2024, 3, 10), 30);

        let report = run(&source, &store, Some(&window), &IdentityKeyPolicy, true)
            .await
            .unwrap();

        assert_eq!(report.found_in_calendar, 1);
        assert_eq!(report.missing, 1);
    }
}
