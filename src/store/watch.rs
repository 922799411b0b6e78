//! Live queries over a `VinStorage`.

use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use tokio::sync::watch;

use super::storage::VinStorage;

type Query<S, T> = Box<dyn Fn(&S) -> Result<T> + Send + Sync>;

/// A query that is re-run whenever the store changes.
///
/// The first `next` returns the current result immediately. Each later call
/// waits for a mutation and returns the fresh result. Several mutations that
/// land between two calls are observed as one update.
pub struct Subscription<S, T> {
  storage: Arc<S>,
  changes: watch::Receiver<u64>,
  query: Query<S, T>,
  primed: bool,
}

impl<S: VinStorage, T> Subscription<S, T> {
  pub fn new<F>(storage: Arc<S>, query: F) -> Self
  where
    F: Fn(&S) -> Result<T> + Send + Sync + 'static,
  {
    let changes = storage.subscribe();
    Self {
      storage,
      changes,
      query: Box::new(query),
      primed: false,
    }
  }

  /// Wait for the next result.
  pub async fn next(&mut self) -> Result<T> {
    if self.primed {
      self
        .changes
        .changed()
        .await
        .map_err(|_| eyre!("Store closed"))?;
    }
    self.primed = true;
    self.changes.borrow_and_update();

    (self.query)(&self.storage)
  }
}
