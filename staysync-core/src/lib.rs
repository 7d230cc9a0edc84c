//! Core of staysync: reconciling guest stays from a calendar feed with a
//! destination database.
//!
//! - [`normalize`] turns raw feed events into [`Stay`](stay::Stay) records
//! - [`guests::GuestDirectory`] caches destination guests by first name
//! - [`matching`] holds the two matching policies
//! - [`reconcile::find_missing`] computes the stays to create
//! - [`sync`] drives a full run against the [`remote`] collaborators

pub mod config;
pub mod constants;
pub mod date_range;
pub mod error;
pub mod event;
pub mod guests;
pub mod ics;
pub mod matching;
pub mod memory;
pub mod normalize;
pub mod reconcile;
pub mod remote;
pub mod stay;
pub mod sync;
