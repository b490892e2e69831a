//! Cross-instance serialization of named operations.
//!
//! The coordinator avoids lock traffic when the work is already done: the
//! caller's `should_skip` check runs before any backend round-trip, again
//! before each acquisition retry, and once more after the lock is held
//! (check-lock-check). Failing to acquire is an outcome, not an error.

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::errors::{Error, Result};

/// Lock expiry, so a crashed holder cannot wedge the resource forever.
pub const LOCK_TTL: Duration = Duration::from_secs(30);
/// Acquisition retries after the initial attempt.
pub const ACQUIRE_RETRIES: u32 = 2;
/// Delay between acquisition attempts.
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Proof of a held lock. The token ties release to the acquisition that
/// created it, so an expired-and-reacquired lock is never released by the
/// old holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHandle {
    pub key: String,
    pub token: Uuid,
}

/// External coordination store (Redis-compatible in production).
/// `acquire` has zero built-in wait; retry policy lives in the coordinator.
#[async_trait]
pub trait LockBackend: Send + Sync {
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockHandle>>;
    async fn release(&self, handle: LockHandle) -> Result<()>;
    async fn get_flag(&self, key: &str) -> Result<bool>;
    async fn set_flag(&self, key: &str, ttl: Duration) -> Result<()>;
    async fn remove_flag(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// `should_skip` found the work already done.
    Skipped,
    /// The action ran to completion under the lock.
    Completed,
    /// Lock not acquired within the retry budget; someone else is handling it.
    NotAcquired,
}

pub struct LockCoordinator {
    backend: Arc<dyn LockBackend>,
    ttl: Duration,
    retries: u32,
    retry_delay: Duration,
}

impl LockCoordinator {
    pub fn new(backend: Arc<dyn LockBackend>) -> Self {
        Self {
            backend,
            ttl: LOCK_TTL,
            retries: ACQUIRE_RETRIES,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn with_retry(mut self, retries: u32, retry_delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = retry_delay;
        self
    }

    /// Runs `action` under the named lock unless `should_skip` says the work
    /// is already done. The lock is released in all cases; a release failure
    /// is logged and otherwise ignored because the TTL bounds the damage.
    pub async fn execute_if_needed<S, SF, A, AF>(
        &self,
        key: &str,
        should_skip: S,
        action: A,
    ) -> Result<LockOutcome>
    where
        S: Fn() -> SF,
        SF: Future<Output = Result<bool>>,
        A: FnOnce() -> AF,
        AF: Future<Output = Result<()>>,
    {
        if should_skip().await? {
            return Ok(LockOutcome::Skipped);
        }

        let mut attempt = 0;
        let handle = loop {
            if attempt > 0 {
                tokio::time::sleep(self.retry_delay).await;
                if should_skip().await? {
                    return Ok(LockOutcome::Skipped);
                }
            }
            match self.backend.acquire(key, self.ttl).await? {
                Some(handle) => break handle,
                None if attempt >= self.retries => return Ok(LockOutcome::NotAcquired),
                None => attempt += 1,
            }
        };

        let outcome = if should_skip().await? {
            Ok(LockOutcome::Skipped)
        } else {
            action().await.map(|()| LockOutcome::Completed)
        };

        if let Err(err) = self.backend.release(handle).await {
            log::warn!("Failed to release lock {}: {}", key, err);
        }
        outcome
    }
}

/// Two-tier coordinator: a process-local semaphore per key in front of the
/// distributed tier. Contention local to one instance is resolved without a
/// backend round-trip; the local tier never substitutes for the distributed
/// one when multiple instances compete.
pub struct HybridLockCoordinator {
    coordinator: LockCoordinator,
    locals: Mutex<HashMap<String, Arc<tokio::sync::Semaphore>>>,
}

impl HybridLockCoordinator {
    pub fn new(coordinator: LockCoordinator) -> Self {
        Self {
            coordinator,
            locals: Mutex::new(HashMap::new()),
        }
    }

    pub async fn execute_if_needed<S, SF, A, AF>(
        &self,
        key: &str,
        should_skip: S,
        action: A,
    ) -> Result<LockOutcome>
    where
        S: Fn() -> SF,
        SF: Future<Output = Result<bool>>,
        A: FnOnce() -> AF,
        AF: Future<Output = Result<()>>,
    {
        if should_skip().await? {
            return Ok(LockOutcome::Skipped);
        }

        let semaphore = {
            let mut locals = self
                .locals
                .lock()
                .map_err(|_| Error::Lock("local lock table poisoned".into()))?;
            locals
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Semaphore::new(1)))
                .clone()
        };
        let _permit = match semaphore.try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => return Ok(LockOutcome::NotAcquired),
        };

        self.coordinator
            .execute_if_needed(key, should_skip, action)
            .await
    }
}

/// TTL-expiring lock and flag store for tests and single-instance use.
#[derive(Default)]
pub struct InMemoryLockBackend {
    locks: Mutex<HashMap<String, (Uuid, Instant)>>,
    flags: Mutex<HashMap<String, Instant>>,
}

impl InMemoryLockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn locks(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, (Uuid, Instant)>>> {
        self.locks
            .lock()
            .map_err(|_| Error::Lock("lock table poisoned".into()))
    }

    fn flags(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Instant>>> {
        self.flags
            .lock()
            .map_err(|_| Error::Lock("flag table poisoned".into()))
    }
}

#[async_trait]
impl LockBackend for InMemoryLockBackend {
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockHandle>> {
        let now = Instant::now();
        let mut locks = self.locks()?;
        if let Some((_, expires)) = locks.get(key) {
            if *expires > now {
                return Ok(None);
            }
        }
        let token = Uuid::new_v4();
        locks.insert(key.to_string(), (token, now + ttl));
        Ok(Some(LockHandle {
            key: key.to_string(),
            token,
        }))
    }

    async fn release(&self, handle: LockHandle) -> Result<()> {
        let mut locks = self.locks()?;
        if let Some((token, _)) = locks.get(&handle.key) {
            if *token == handle.token {
                locks.remove(&handle.key);
            }
        }
        Ok(())
    }

    async fn get_flag(&self, key: &str) -> Result<bool> {
        let flags = self.flags()?;
        Ok(flags
            .get(key)
            .map(|expires| *expires > Instant::now())
            .unwrap_or(false))
    }

    async fn set_flag(&self, key: &str, ttl: Duration) -> Result<()> {
        self.flags()?.insert(key.to_string(), Instant::now() + ttl);
        Ok(())
    }

    async fn remove_flag(&self, key: &str) -> Result<()> {
        self.flags()?.remove(key);
        Ok(())
    }
}
