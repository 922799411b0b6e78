//! Local VIN history store.
//!
//! A single SQLite table keyed by VIN:
//! - insert-or-replace on decode, point lookup, listing and substring search
//! - favorite flag updates and explicit deletes
//! - live queries that re-run after every mutation
//!
//! Nothing is evicted automatically.

mod record;
mod storage;
mod watch;

pub use record::DecodedVin;
pub use storage::{SqliteStorage, VinStorage};
pub use watch::Subscription;
