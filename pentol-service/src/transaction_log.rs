use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::store::{LogStore, StoreError};

/// Result of a mutation, tells [`TransactionLog::update`] whether the log
/// has to be written back.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome<R> {
    Changed(R),
    Unchanged(R),
}

/// The transaction log of one server process.
///
/// Every operation runs under the same lock, so a load-mutate-save cycle
/// never interleaves with another one from this process. The store is
/// re-read on every call, nothing is cached between requests.
pub struct TransactionLog<T> {
    store: Box<dyn LogStore<T>>,
    lock: Mutex<()>,
}

impl<T> TransactionLog<T> {
    pub fn new<S>(store: S) -> Self
    where
        S: LogStore<T> + 'static,
    {
        Self {
            store: Box::new(store),
            lock: Mutex::new(()),
        }
    }

    // The mutex guards no data of its own, a panic in a mutation leaves
    // nothing inconsistent behind.
    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn all(&self) -> Result<Vec<T>, StoreError> {
        let _guard = self.guard();
        self.store.load()
    }

    pub fn update<R, E, F>(&self, mutate: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<Outcome<R>, E>,
        E: From<StoreError>,
    {
        let _guard = self.guard();
        let mut records = self.store.load()?;

        match mutate(&mut records)? {
            Outcome::Changed(result) => {
                self.store.save(&records)?;
                Ok(result)
            }
            Outcome::Unchanged(result) => Ok(result),
        }
    }

    pub fn replace(&self, records: Vec<T>) -> Result<(), StoreError> {
        let _guard = self.guard();
        self.store.save(&records)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.replace(vec![])
    }
}
