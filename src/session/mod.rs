// src/session/mod.rs
// Per-user usage records for non-repeating selection

pub mod scope;

pub use scope::{UserScope, userify_fn};

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::config::RotorConfig;

/// Session store boundary consumed by the selector.
///
/// Implementations decide persistence; the selector only needs get/set of the
/// usage record for a (user, key) pair.
pub trait UsageStore: Send + Sync {
    /// Create the user's session if missing and mark it active
    fn touch(&self, user_id: &str);

    fn usage(&self, user_id: &str, key: &str) -> Option<Vec<usize>>;

    fn set_usage(&self, user_id: &str, key: &str, used: Vec<usize>);
}

/// State of a single user's session
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub last_active: DateTime<Utc>,
    usage: HashMap<String, Vec<usize>>,
    // Position in the eviction order
    touch_seq: u64,
}

impl Session {
    pub fn new(user_id: String) -> Self {
        Self {
            user_id,
            last_active: Utc::now(),
            usage: HashMap::new(),
            touch_seq: 0,
        }
    }

    pub fn mark_active(&mut self) {
        self.last_active = Utc::now();
    }

    /// A timeout too large to represent never expires
    pub fn is_stale(&self, now: DateTime<Utc>, timeout_minutes: i64) -> bool {
        match Duration::try_minutes(timeout_minutes) {
            Some(timeout) => now - self.last_active > timeout,
            None => false,
        }
    }

    /// Number of selection keys tracked for this user
    pub fn tracked_keys(&self) -> usize {
        self.usage.len()
    }
}

#[derive(Debug, Default)]
struct Sessions {
    by_user: HashMap<String, Session>,
    // touch_seq -> user, least recently touched first
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl Sessions {
    fn touch(&mut self, user_id: &str) -> &mut Session {
        self.next_seq += 1;
        let seq = self.next_seq;
        if let Some(previous) = self.by_user.get(user_id).map(|s| s.touch_seq) {
            self.order.remove(&previous);
        }
        self.order.insert(seq, user_id.to_string());

        let session = self
            .by_user
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(user_id.to_string()));
        session.touch_seq = seq;
        session.mark_active();
        session
    }

    fn evict_over(&mut self, limit: usize) -> usize {
        let mut evicted = 0;
        while self.by_user.len() > limit {
            let Some((_, oldest)) = self.order.pop_first() else { break };
            self.by_user.remove(&oldest);
            debug!(user_id = %oldest, "evicted least recently active session");
            evicted += 1;
        }
        evicted
    }

    fn remove(&mut self, user_id: &str) -> Option<Session> {
        let session = self.by_user.remove(user_id)?;
        self.order.remove(&session.touch_seq);
        Some(session)
    }
}

/// In-memory session store bounded by `sessions_limit`.
///
/// Touching a user moves it to the back of the eviction queue; once the store
/// holds more than `limit` sessions the least recently touched ones are dropped
/// together with their usage records.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<Sessions>,
    limit: usize,
}

impl SessionStore {
    pub fn new(limit: usize) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            limit: limit.max(1),
        }
    }

    pub fn from_config(config: &RotorConfig) -> Self {
        Self::new(config.sessions_limit)
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        // A panic mid-update leaves plain data behind; keep serving it
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.lock().by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.lock().by_user.contains_key(user_id)
    }

    pub fn get_session(&self, user_id: &str) -> Option<Session> {
        self.lock().by_user.get(user_id).cloned()
    }

    pub fn remove(&self, user_id: &str) -> Option<Session> {
        self.lock().remove(user_id)
    }

    /// Drop sessions idle for longer than `timeout_minutes`
    pub fn remove_stale(&self, timeout_minutes: i64) -> usize {
        self.remove_stale_at(Utc::now(), timeout_minutes)
    }

    pub fn remove_stale_at(&self, now: DateTime<Utc>, timeout_minutes: i64) -> usize {
        let mut sessions = self.lock();
        let stale: Vec<String> = sessions
            .by_user
            .values()
            .filter(|s| s.is_stale(now, timeout_minutes))
            .map(|s| s.user_id.clone())
            .collect();
        for user_id in &stale {
            sessions.remove(user_id);
        }
        if !stale.is_empty() {
            info!("Removed {} stale sessions", stale.len());
        }
        stale.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::from_config(&RotorConfig::default())
    }
}

impl UsageStore for SessionStore {
    fn touch(&self, user_id: &str) {
        let mut sessions = self.lock();
        sessions.touch(user_id);
        sessions.evict_over(self.limit);
    }

    fn usage(&self, user_id: &str, key: &str) -> Option<Vec<usize>> {
        self.lock()
            .by_user
            .get(user_id)
            .and_then(|s| s.usage.get(key))
            .cloned()
    }

    fn set_usage(&self, user_id: &str, key: &str, used: Vec<usize>) {
        let mut sessions = self.lock();
        sessions.touch(user_id).usage.insert(key.to_string(), used);
        sessions.evict_over(self.limit);
    }
}
