use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::value_objects::UserId;

/// In-process advisory locks, one per user.
///
/// Serializes check-then-act sequences of a single user inside this process
/// only. Another process writing to the same bucket is not excluded.
#[derive(Clone, Default)]
pub struct UserLocks {
    locks: Arc<Mutex<HashMap<UserId, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the user's lock; it is released when the guard drops
    pub async fn acquire(&self, user: UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // drop entries nobody holds or waits on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(user).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub async fn tracked_users(&self) -> usize {
        self.locks.lock().await.len()
    }
}
