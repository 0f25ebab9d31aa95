use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Async mutex partitioned by key (here: a chat user id). Holders of
/// different keys never contend; holders of the same key run one at a time.
#[derive(Debug)]
pub struct KeyedMutex<K: Eq + Hash> {
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K: Eq + Hash + Clone> KeyedMutex<K> {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Waits for the lock on `key`. Released when the guard drops.
    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        // Clone the Arc out before awaiting so the shard lock is not held
        // across the suspension point.
        let mutex = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        mutex.lock_owned().await
    }

    /// Runs `work` under the lock on `key`, then forgets the key if nobody
    /// else holds or waits on it.
    pub async fn scoped<F, T>(&self, key: &K, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let guard = self.lock(key).await;
        let out = work.await;
        drop(guard);
        self.release(key);
        out
    }

    /// Removes the entry for `key` unless another caller still holds a handle.
    pub fn release(&self, key: &K) {
        self.locks
            .remove_if(key, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedMutex<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = Arc::new(KeyedMutex::<i64>::new());
        let guard = locks.lock(&7).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock(&7).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_contend() {
        let locks = KeyedMutex::<i64>::new();
        let _a = locks.lock(&1).await;
        let acquired = tokio::time::timeout(Duration::from_millis(50), locks.lock(&2)).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_release_keeps_held_locks() {
        let locks = KeyedMutex::<i64>::new();
        let held = locks.lock(&1).await;
        drop(locks.lock(&2).await);

        locks.release(&1);
        locks.release(&2);
        assert_eq!(locks.len(), 1);

        drop(held);
        locks.release(&1);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_scoped_forgets_key_afterwards() {
        let locks = KeyedMutex::<i64>::new();
        let out = locks.scoped(&5, async { 42 }).await;
        assert_eq!(out, 42);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_release_keeps_contended_key() {
        let locks = Arc::new(KeyedMutex::<i64>::new());
        let guard = locks.lock(&3).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.scoped(&3, async {}).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(guard);
        locks.release(&3);
        // The waiter still holds a handle, so the entry survives
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}
