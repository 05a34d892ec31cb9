//! Per-group mutual exclusion for reconciliation writes.

use std::sync::Arc;

use dashmap::DashMap;
use neraca_shared::types::TransactionGroupId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Async locks keyed by transaction group.
///
/// Fixes of the same group run one after another inside this process;
/// fixes of different groups never wait on each other.
#[derive(Debug, Default)]
pub struct GroupLocks {
    inner: DashMap<TransactionGroupId, Arc<Mutex<()>>>,
}

/// A handle on a group's entry, held while waiting and while locked.
///
/// Dropping it removes the entry once nobody else holds or waits on it,
/// including when the owning future is cancelled mid-wait.
#[derive(Debug)]
struct Slot<'a> {
    locks: &'a GroupLocks,
    group: TransactionGroupId,
    lock: Option<Arc<Mutex<()>>>,
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        drop(self.lock.take());
        self.locks
            .inner
            .remove_if(&self.group, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Exclusive access to one transaction group.
///
/// The mutex is unlocked first, then the table entry is dropped if idle.
#[derive(Debug)]
pub struct GroupGuard<'a> {
    _guard: OwnedMutexGuard<()>,
    _slot: Slot<'a>,
}

impl GroupLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to a group.
    pub async fn acquire(&self, group: TransactionGroupId) -> GroupGuard<'_> {
        let lock = Arc::clone(&self.inner.entry(group).or_default());
        let slot = Slot {
            locks: self,
            group,
            lock: Some(Arc::clone(&lock)),
        };
        let guard = lock.lock_owned().await;
        GroupGuard {
            _guard: guard,
            _slot: slot,
        }
    }

    /// Number of groups with a live entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no group has a live entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
