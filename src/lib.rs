// src/lib.rs
//! Varied, non-repeating response selection for conversational renderers.
//!
//! ```
//! use rotor::{Rotor, RotorConfig};
//!
//! let rotor = Rotor::new(RotorConfig::default());
//! let user = rotor.userify("user-42");
//! let greetings = ["Hi!", "Hello!", "Good to see you!"];
//! let first = user.select(&greetings);
//! let second = user.select(&greetings);
//! assert_ne!(first, second);
//! ```

pub mod config;
pub mod error;
pub mod select;
pub mod session;

pub use config::{CONFIG, RotorConfig};
pub use error::{KeyError, Result, RotorError};
pub use select::{SelectionKey, Selector, derive_key, pick};
pub use session::{SessionStore, UsageStore, UserScope, userify_fn};

use serde::Serialize;

/// Selector plus the session store it tracks usage in.
pub struct Rotor<S: UsageStore = SessionStore> {
    config: RotorConfig,
    selector: Selector,
    store: S,
}

impl Rotor<SessionStore> {
    pub fn new(config: RotorConfig) -> Self {
        let store = SessionStore::from_config(&config);
        Self::with_store(config, store)
    }

    /// Same as `new` with a seeded RNG
    pub fn with_seed(config: RotorConfig, seed: u64) -> Self {
        let store = SessionStore::from_config(&config);
        let selector = Selector::with_seed(&config, seed);
        Self { config, selector, store }
    }

    /// Drop sessions idle longer than `session_stale_timeout` minutes
    pub fn prune_stale(&self) -> usize {
        self.store.remove_stale(self.config.session_stale_timeout)
    }
}

impl<S: UsageStore> Rotor<S> {
    pub fn with_store(config: RotorConfig, store: S) -> Self {
        let selector = Selector::new(&config);
        Self { config, selector, store }
    }

    pub fn config(&self) -> &RotorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Untracked selection: no user, every call independent
    pub fn select<'a, T: Serialize>(&self, items: &'a [T]) -> Option<&'a T> {
        self.selector.select(None, items)
    }

    /// Bind a user. Every selection made through the returned handle is
    /// tracked in that user's session.
    pub fn userify<'r>(&'r self, user_id: &'r str) -> UserRotor<'r> {
        UserRotor {
            scope: UserScope::new(user_id, &self.store),
            selector: &self.selector,
        }
    }
}

/// Selection operations bound to one user's session
#[derive(Clone, Copy)]
pub struct UserRotor<'r> {
    scope: UserScope<'r>,
    selector: &'r Selector,
}

impl<'r> UserRotor<'r> {
    pub fn user_id(&self) -> &str {
        self.scope.user_id()
    }

    pub fn scope(&self) -> &UserScope<'r> {
        &self.scope
    }

    pub fn select<'a, T: Serialize>(&self, items: &'a [T]) -> Option<&'a T> {
        self.selector.select(Some(&self.scope), items)
    }

    pub fn select_keyed<'a, T>(&self, items: &'a [T], key: impl Into<SelectionKey>) -> Option<&'a T> {
        self.selector.select_keyed(Some(&self.scope), items, &key.into())
    }
}

impl std::fmt::Debug for UserRotor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRotor").field("scope", &self.scope).finish()
    }
}
