// src/session/scope.rs
// Explicit user binding for tracked selection

use super::UsageStore;

/// A user id bound to the store that holds its usage records.
///
/// Passing a scope to a selection call is what makes it tracked; there is no
/// ambient "current user".
#[derive(Clone, Copy)]
pub struct UserScope<'s> {
    user_id: &'s str,
    store: &'s dyn UsageStore,
}

impl<'s> UserScope<'s> {
    /// Bind `user_id` to `store`, creating or refreshing its session
    pub fn new(user_id: &'s str, store: &'s dyn UsageStore) -> Self {
        store.touch(user_id);
        Self { user_id, store }
    }

    pub fn user_id(&self) -> &str {
        self.user_id
    }

    pub fn usage(&self, key: &str) -> Option<Vec<usize>> {
        self.store.usage(self.user_id, key)
    }

    pub fn set_usage(&self, key: &str, used: Vec<usize>) {
        self.store.set_usage(self.user_id, key, used)
    }
}

impl std::fmt::Debug for UserScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserScope").field("user_id", &self.user_id).finish()
    }
}

/// Bind a handler to a user: the returned closure calls `handler` with the
/// scope already supplied, so callers only pass the request argument.
pub fn userify_fn<'s, A, R, F>(scope: UserScope<'s>, handler: F) -> impl Fn(A) -> R
where
    F: Fn(&UserScope<'s>, A) -> R + 's,
{
    move |arg| handler(&scope, arg)
}
