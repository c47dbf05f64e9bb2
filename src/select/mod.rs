//! Response selection
//!
//! `Selector::select` returns one candidate per call. With a user scope the
//! choice is tracked per (user, key) so that:
//!
//! - the same index never comes back twice in a row
//! - all indices are used once before any of them repeats
//!
//! Without a scope, or when a key can't be derived, every call is an
//! independent uniform choice. Lists of length 0 or 1 and `disable_random`
//! short-circuit to the first element and never touch session state.

pub mod key;
pub mod picker;

pub use key::{SelectionKey, derive_key};
pub use picker::{Pick, pick};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::config::RotorConfig;
use crate::session::UserScope;

pub struct Selector {
    disable_random: bool,
    rng: Mutex<StdRng>,
}

impl Selector {
    pub fn new(config: &RotorConfig) -> Self {
        Self {
            disable_random: config.disable_random,
            rng: Mutex::new(StdRng::from_rng(&mut rand::rng())),
        }
    }

    /// Selector with a fixed seed, for reproducible runs
    pub fn with_seed(config: &RotorConfig, seed: u64) -> Self {
        Self {
            disable_random: config.disable_random,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn random_disabled(&self) -> bool {
        self.disable_random
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Select one candidate, keyed by the list's own contents.
    ///
    /// Returns `None` only for an empty list.
    pub fn select<'a, T: Serialize>(&self, scope: Option<&UserScope<'_>>, items: &'a [T]) -> Option<&'a T> {
        // Only derive a key when it will actually be used
        if items.len() <= 1 || self.disable_random || scope.is_none() {
            return self.select_index(None, items.len(), None).map(|index| &items[index]);
        }
        match derive_key(items) {
            Ok(key) => self.select_keyed(scope, items, &key),
            Err(e) => {
                debug!("Selection key unavailable ({}), picking untracked", e);
                self.select_index(None, items.len(), None).map(|index| &items[index])
            }
        }
    }

    /// Select one candidate tracked under an explicit key
    pub fn select_keyed<'a, T>(&self, scope: Option<&UserScope<'_>>, items: &'a [T], key: &SelectionKey) -> Option<&'a T> {
        self.select_index(scope, items.len(), Some(key))
            .map(|index| &items[index])
    }

    /// Index-level selection over `0..n`.
    ///
    /// Tracking happens only when both `scope` and `key` are present.
    pub fn select_index(&self, scope: Option<&UserScope<'_>>, n: usize, key: Option<&SelectionKey>) -> Option<usize> {
        if n == 0 {
            return None;
        }
        if n == 1 || self.disable_random {
            return Some(0);
        }
        match (scope, key) {
            (Some(scope), Some(key)) => Some(self.next_tracked(scope, n, key)),
            _ => self.random_index(n),
        }
    }

    fn random_index(&self, n: usize) -> Option<usize> {
        let indices: Vec<usize> = (0..n).collect();
        indices.choose(&mut *self.rng()).copied()
    }

    fn next_tracked(&self, scope: &UserScope<'_>, n: usize, key: &SelectionKey) -> usize {
        let used = match scope.usage(key.as_str()) {
            Some(used) if used.iter().any(|&i| i >= n) => {
                // Key was reused for a list of a different size
                debug!(
                    user_id = scope.user_id(),
                    key = %key,
                    n,
                    "usage record out of range, starting a new cycle"
                );
                Vec::new()
            }
            Some(used) => used,
            None => Vec::new(),
        };

        let Pick { index, used, wrapped } = match pick(n, used, &mut *self.rng()) {
            Some(p) => p,
            None => return 0,
        };
        if wrapped {
            debug!(user_id = scope.user_id(), key = %key, "all candidates used, wrapping");
        }
        scope.set_usage(key.as_str(), used);
        index
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new(&RotorConfig::default())
    }
}
