//! Per-user conversation sessions
//!
//! Sessions live in process memory only. Each user has their own lock; the
//! map-wide lock is held just long enough to find or insert a user's slot, so
//! requests for different users never wait on each other while one user's
//! messages are handled strictly one at a time.
//!
//! Expiry: sessions idle for longer than the configured TTL are dropped by
//! [`SessionStore::evict_idle`]. A session someone is holding or waiting on
//! is never evicted.

use crate::state_machine::ChatState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Conversation state for one user
#[derive(Debug, Clone)]
pub struct Session {
    pub state: ChatState,
    pub created_at: DateTime<Utc>,
    pub last_active: Instant,
    /// Messages handled since the session was created
    pub turns: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: ChatState::AwaitingLanguage,
            created_at: Utc::now(),
            last_active: Instant::now(),
            turns: 0,
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
        self.turns += 1;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive access to one user's session.
///
/// Holds the user's lock until dropped; callers must not keep it beyond the
/// request that acquired it.
pub struct SessionLease {
    guard: OwnedMutexGuard<Session>,
    created: bool,
}

impl SessionLease {
    /// Whether this lease created the session
    pub fn created(&self) -> bool {
        self.created
    }

    /// Replace the session with a fresh one
    pub fn reset(&mut self) {
        *self.guard = Session::new();
    }
}

impl Deref for SessionLease {
    type Target = Session;

    fn deref(&self) -> &Session {
        &self.guard
    }
}

impl DerefMut for SessionLease {
    fn deref_mut(&mut self) -> &mut Session {
        &mut self.guard
    }
}

type Slot = Arc<Mutex<Session>>;

/// Process-wide map from user identifier to session
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Slot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the user's session, creating it first if the user is unseen
    pub async fn get_or_create(&self, user_id: &str) -> SessionLease {
        let (slot, created) = self.slot(user_id).await;
        SessionLease {
            guard: slot.lock_owned().await,
            created,
        }
    }

    /// Discard any existing session for the user and start a fresh one
    #[allow(dead_code)] // The chat runtime resets through its lease
    pub async fn reset(&self, user_id: &str) -> Session {
        let mut lease = self.get_or_create(user_id).await;
        lease.reset();
        Session::clone(&lease)
    }

    /// Copy of the user's session, if any. Waits for in-flight requests.
    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn snapshot(&self, user_id: &str) -> Option<Session> {
        let slot = self.sessions.read().await.get(user_id).cloned()?;
        let session = slot.lock().await.clone();
        Some(session)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for at least `ttl`. Returns how many were removed.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        // Slots are only cloned under the map lock, which we hold, so a
        // strong count of one means nobody is using or waiting on the slot.
        sessions.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(session) => session.last_active.elapsed() < ttl,
                Err(_) => true,
            }
        });

        before - sessions.len()
    }

    /// Run [`SessionStore::evict_idle`] every `every` until the task is aborted
    pub fn spawn_sweeper(self: &Arc<Self>, ttl: Duration, every: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(ttl).await;
                if evicted > 0 {
                    let remaining = store.len().await;
                    tracing::info!(evicted, remaining, "Evicted idle sessions");
                }
            }
        })
    }

    async fn slot(&self, user_id: &str) -> (Slot, bool) {
        if let Some(slot) = self.sessions.read().await.get(user_id) {
            return (slot.clone(), false);
        }

        let mut sessions = self.sessions.write().await;
        // Another request may have inserted it while we waited for the write lock
        if let Some(slot) = sessions.get(user_id) {
            return (slot.clone(), false);
        }
        let slot = Arc::new(Mutex::new(Session::new()));
        sessions.insert(user_id.to_string(), slot.clone());
        tracing::debug!(user_id = %user_id, "Created session");
        (slot, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::{Language, Step};

    #[tokio::test]
    async fn test_get_or_create_reports_creation() {
        let store = SessionStore::new();

        let lease = store.get_or_create("u1").await;
        assert!(lease.created());
        assert_eq!(lease.state.step(), Step::AwaitingLanguage);
        assert_eq!(lease.state.language(), None);
        drop(lease);

        let lease = store.get_or_create("u1").await;
        assert!(!lease.created());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_mutation_persists_between_leases() {
        let store = SessionStore::new();
        {
            let mut lease = store.get_or_create("u1").await;
            lease.state = ChatState::Chatting {
                language: Language::Hindi,
            };
        }

        let session = store.snapshot("u1").await.unwrap();
        assert_eq!(session.state.language(), Some(Language::Hindi));
    }

    #[tokio::test]
    async fn test_reset_discards_state() {
        let store = SessionStore::new();
        {
            let mut lease = store.get_or_create("u1").await;
            lease.state = ChatState::Chatting {
                language: Language::English,
            };
            lease.touch();
        }

        let fresh = store.reset("u1").await;
        assert_eq!(fresh.state, ChatState::AwaitingLanguage);
        assert_eq!(fresh.turns, 0);
        assert_eq!(
            store.snapshot("u1").await.unwrap().state,
            ChatState::AwaitingLanguage
        );
    }

    #[tokio::test]
    async fn test_reset_unseen_user_creates_session() {
        let store = SessionStore::new();
        let session = store.reset("new").await;
        assert_eq!(session.state, ChatState::AwaitingLanguage);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let store = Arc::new(SessionStore::new());
        let held = store.get_or_create("slow").await;

        // Another user is served while "slow" is locked
        let other = tokio::time::timeout(Duration::from_secs(1), store.get_or_create("fast"))
            .await
            .expect("other user blocked");
        assert!(other.created());
        drop(held);
    }

    #[tokio::test]
    async fn test_same_user_is_serialized() {
        let store = Arc::new(SessionStore::new());
        let held = store.get_or_create("u1").await;

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.get_or_create("u1").await.state })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(held);
        let state = waiter.await.unwrap();
        assert_eq!(state, ChatState::AwaitingLanguage);
    }

    #[tokio::test]
    async fn test_evict_idle() {
        let store = SessionStore::new();
        drop(store.get_or_create("idle").await);
        assert_eq!(store.evict_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(store.evict_idle(Duration::ZERO).await, 1);
        assert_eq!(store.len().await, 0);

        // An evicted user starts over
        assert!(store.get_or_create("idle").await.created());
    }

    #[tokio::test]
    async fn test_evict_skips_leased_session() {
        let store = SessionStore::new();
        let lease = store.get_or_create("busy").await;
        assert_eq!(store.evict_idle(Duration::ZERO).await, 0);
        drop(lease);
        assert_eq!(store.evict_idle(Duration::ZERO).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_after_ttl() {
        let store = Arc::new(SessionStore::new());
        drop(store.get_or_create("idle").await);
        let sweeper = store.spawn_sweeper(Duration::from_secs(60), Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(store.len().await, 1);

        tokio::time::sleep(Duration::from_secs(40)).await;
        assert_eq!(store.len().await, 0);

        // A user active since the last sweep survives the next one
        drop(store.get_or_create("active").await);
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(store.len().await, 1);

        sweeper.abort();
    }
}
