//! Guest directory: first-name keyed cache of destination guests.

use std::collections::HashMap;

use tracing::info;

use crate::error::StaySyncResult;
use crate::remote::StayStore;
use crate::stay::{GuestIdentity, guest_key};

/// Outcome of [`GuestDirectory::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub guest: GuestIdentity,
    /// Whether the guest was created in the destination by this call
    pub created: bool,
}

/// Guests of one sync run, keyed by [`guest_key`].
///
/// Guests sharing a first name collide: the last one loaded wins, and a
/// lookup always prefers an existing entry over creating a new guest. The
/// cache is append-only for the duration of the run.
#[derive(Debug, Default, Clone)]
pub struct GuestDirectory {
    by_key: HashMap<String, GuestIdentity>,
}

impl GuestDirectory {
    pub fn load(guests: impl IntoIterator<Item = GuestIdentity>) -> Self {
        let mut directory = GuestDirectory::default();
        for guest in guests {
            directory.insert(guest);
        }
        directory
    }

    pub fn get(&self, name: &str) -> Option<&GuestIdentity> {
        self.by_key.get(&guest_key(name)?)
    }

    /// Insert a guest under its key, returning the guest it replaced.
    /// Guests with a blank display name are ignored.
    pub fn insert(&mut self, guest: GuestIdentity) -> Option<GuestIdentity> {
        let key = guest.key()?;
        self.by_key.insert(key, guest)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Look up a guest by name, creating it in `store` when its key is absent.
    ///
    /// Returns `None` for a blank name: no guest is looked up or created.
    pub async fn resolve<S>(&mut self, name: &str, store: &S) -> StaySyncResult<Option<Resolution>>
    where
        S: StayStore + ?Sized,
    {
        let Some(key) = guest_key(name) else {
            return Ok(None);
        };

        if let Some(guest) = self.by_key.get(&key) {
            info!("Guest {} found as {}", name, guest.display_name);
            return Ok(Some(Resolution {
                guest: guest.clone(),
                created: false,
            }));
        }

        info!("Guest {} not found, adding to database", name);
        let guest = store.create_guest(name).await?;
        self.by_key.insert(key, guest.clone());

        Ok(Some(Resolution {
            guest,
            created: true,
        }))
    }
}
