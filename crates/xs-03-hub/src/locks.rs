//! Ordered lock hand-off for command execution.
//!
//! [`KeyLocks::reserve`] never blocks. It records the command behind every
//! earlier command it conflicts with and returns a [`Reservation`]; awaiting
//! [`Reservation::ready`] yields the guard once those predecessors are done.
//! The run loop reserves in arrival order and moves the wait into the task
//! that executes the command, so a busy key never stalls admission of
//! commands for other keys.
//!
//! A key command waits for the previous command on each of its keys and for
//! the last whole-store command. A whole-store command waits for everything
//! reserved before it.

use crate::domain::LockScope;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::watch;

/// Closes when the command holding it releases its scope.
type Release = watch::Receiver<()>;

#[derive(Debug, Default)]
pub struct KeyLocks {
    table: Mutex<Table>,
}

#[derive(Debug, Default)]
struct Table {
    /// Latest reservation per key.
    keys: HashMap<String, Release>,
    /// Latest whole-store reservation.
    store: Option<Release>,
}

/// A place in line for one scope.
///
/// Dropping it without calling [`Reservation::ready`] gives the place up.
#[derive(Debug)]
pub struct Reservation {
    waits: Vec<Release>,
    done: watch::Sender<()>,
}

/// Held for the duration of one command.
#[derive(Debug)]
pub struct ScopeGuard {
    _done: watch::Sender<()>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a place in line for `scope` behind every conflicting command
    /// reserved so far.
    pub fn reserve(&self, scope: &LockScope) -> Reservation {
        let (done, release) = watch::channel(());
        let mut table = self.table.lock();
        table.prune();

        let mut waits: Vec<Release> = table.store.iter().cloned().collect();
        match scope {
            LockScope::Store => {
                waits.extend(table.keys.drain().map(|(_, previous)| previous));
                table.store = Some(release);
            }
            LockScope::Keys(keys) => {
                for key in keys.iter().collect::<BTreeSet<_>>() {
                    if let Some(previous) = table.keys.insert(key.clone(), release.clone()) {
                        waits.push(previous);
                    }
                }
            }
        }

        Reservation { waits, done }
    }

    /// Reserve and wait in one step.
    pub async fn acquire(&self, scope: &LockScope) -> ScopeGuard {
        self.reserve(scope).ready().await
    }

    /// Keys with a reservation that may still be outstanding.
    pub fn tracked(&self) -> usize {
        let mut table = self.table.lock();
        table.prune();
        table.keys.len()
    }
}

impl Table {
    fn prune(&mut self) {
        self.keys.retain(|_, release| !is_released(release));
        if self.store.as_ref().is_some_and(is_released) {
            self.store = None;
        }
    }
}

fn is_released(release: &Release) -> bool {
    release.has_changed().is_err()
}

impl Reservation {
    pub async fn ready(self) -> ScopeGuard {
        for mut predecessor in self.waits {
            // Nothing is ever sent; this resolves when the sender drops.
            let _ = predecessor.changed().await;
        }
        ScopeGuard { _done: self.done }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    const BRIEF: Duration = Duration::from_millis(20);

    fn keys(names: &[&str]) -> LockScope {
        LockScope::Keys(names.iter().map(|k| k.to_string()).collect())
    }

    #[tokio::test]
    async fn test_disjoint_keys_do_not_block() {
        let locks = KeyLocks::new();
        let _a = locks.acquire(&keys(&["a"])).await;
        assert!(timeout(BRIEF, locks.acquire(&keys(&["b"]))).await.is_ok());
    }

    #[tokio::test]
    async fn test_same_key_blocks_until_released() {
        let locks = KeyLocks::new();
        let first = locks.acquire(&keys(&["a"])).await;
        let second = locks.reserve(&keys(&["a", "b"]));
        let third = locks.reserve(&keys(&["b"]));

        let mut second = tokio::spawn(second.ready());
        assert!(timeout(BRIEF, &mut second).await.is_err());
        // Queued behind `second` on "b".
        let mut third = tokio::spawn(third.ready());
        assert!(timeout(BRIEF, &mut third).await.is_err());

        drop(first);
        let second = timeout(BRIEF, second).await.unwrap().unwrap();
        assert!(timeout(BRIEF, &mut third).await.is_err());
        drop(second);
        assert!(timeout(BRIEF, third).await.is_ok());
    }

    #[tokio::test]
    async fn test_grants_follow_reservation_order() {
        let locks = KeyLocks::new();
        let earlier = locks.reserve(&keys(&["a"]));
        let later = locks.reserve(&keys(&["a"]));

        // Waiting first does not jump the line.
        let mut later = tokio::spawn(later.ready());
        assert!(timeout(BRIEF, &mut later).await.is_err());

        let earlier = earlier.ready().await;
        assert!(timeout(BRIEF, &mut later).await.is_err());
        drop(earlier);
        assert!(timeout(BRIEF, later).await.is_ok());
    }

    #[tokio::test]
    async fn test_store_scope_is_exclusive() {
        let locks = KeyLocks::new();
        let key_guard = locks.acquire(&keys(&["a"])).await;
        let mut store = tokio::spawn(locks.reserve(&LockScope::Store).ready());
        assert!(timeout(BRIEF, &mut store).await.is_err());

        drop(key_guard);
        let store = timeout(BRIEF, store).await.unwrap().unwrap();
        let mut key = tokio::spawn(locks.reserve(&keys(&["z"])).ready());
        assert!(timeout(BRIEF, &mut key).await.is_err());

        drop(store);
        assert!(timeout(BRIEF, key).await.is_ok());
    }

    #[tokio::test]
    async fn test_abandoned_reservation_releases_successors() {
        let locks = KeyLocks::new();
        let abandoned = locks.reserve(&LockScope::Store);
        let next = locks.reserve(&keys(&["a"]));

        drop(abandoned);
        assert!(timeout(BRIEF, next.ready()).await.is_ok());
    }

    #[tokio::test]
    async fn test_idle_entries_pruned() {
        let locks = KeyLocks::new();
        drop(locks.acquire(&keys(&["a", "b"])).await);
        let held = locks.acquire(&keys(&["c"])).await;
        assert_eq!(locks.tracked(), 1);

        drop(held);
        assert_eq!(locks.tracked(), 0);
    }
}
