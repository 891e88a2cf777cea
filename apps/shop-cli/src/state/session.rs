//! # Session Store
//!
//! Holds the currently logged-in user for the lifetime of the process.
//!
//! ## Session Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session State Operations                             │
//! │                                                                         │
//! │  Console Action           ShopService            Session Change         │
//! │  ──────────────           ───────────            ──────────────         │
//! │                                                                         │
//! │  Register / Log in ─────► register() / login() ─► set("user", u)       │
//! │                                                                         │
//! │  Redeem / Buy ──────────► redeem_ticket() ──────► set("user", fresh)   │
//! │                           buy_product()                                 │
//! │                                                                         │
//! │  Log out ───────────────► logout() ─────────────► delete("user")       │
//! │                                                                         │
//! │  Menu rendering ────────► current_user() ───────► (read only)          │
//! │                                                                         │
//! │  Nothing here is written to disk. Restarting the program logs out.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are stored as JSON. The stored user never carries a password
//! because `User::password` is skipped on serialization.

use serde_json::Value;
use shop_core::User;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Key under which the logged-in user is stored.
pub const USER_KEY: &str = "user";

/// Name-keyed ephemeral storage.
pub trait SessionStore: fmt::Debug + Send + Sync {
    /// Returns the item stored under `name`.
    fn get(&self, name: &str) -> Option<Value>;

    /// Stores `item` under `name`, replacing any previous item.
    fn set(&self, name: &str, item: Value);

    /// Removes the item stored under `name`.
    fn delete(&self, name: &str);
}

/// In-process session storage.
///
/// ## Thread Safety
/// Wrapped in `Arc<Mutex<T>>` so clones share one map. The console runs on
/// one thread, so the lock is never contended.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl SessionStore for MemoryStorage {
    fn get(&self, name: &str) -> Option<Value> {
        self.items
            .lock()
            .ok()
            .and_then(|items| items.get(name).cloned())
    }

    fn set(&self, name: &str, item: Value) {
        if let Ok(mut items) = self.items.lock() {
            items.insert(name.to_string(), item);
        }
    }

    fn delete(&self, name: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.remove(name);
        }
    }
}

// =============================================================================
// Current User Helpers
// =============================================================================

/// The logged-in user, if any.
///
/// An entry that no longer decodes as a `User` is treated as logged out.
pub fn current_user(store: &dyn SessionStore) -> Option<User> {
    let value = store.get(USER_KEY)?;
    match serde_json::from_value(value) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!(error = %e, "Discarding undecodable session user");
            None
        }
    }
}

/// Records `user` as the logged-in user.
pub fn set_current_user(store: &dyn SessionStore, user: &User) {
    match serde_json::to_value(user) {
        Ok(value) => store.set(USER_KEY, value),
        Err(e) => warn!(error = %e, "Could not store session user"),
    }
}

/// Logs out.
pub fn clear_current_user(store: &dyn SessionStore) {
    store.delete(USER_KEY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alice() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            password: "longenough1".to_string(),
            points: 20,
        }
    }

    #[test]
    fn test_get_set_delete() {
        let store = MemoryStorage::new();
        assert_eq!(store.get("k"), None);

        store.set("k", json!(1));
        store.set("k", json!(2));
        assert_eq!(store.get("k"), Some(json!(2)));

        store.delete("k");
        assert_eq!(store.get("k"), None);

        // Deleting an absent key is fine
        store.delete("k");
    }

    #[test]
    fn test_clones_share_storage() {
        let store = MemoryStorage::new();
        let other = store.clone();
        other.set("k", json!("v"));
        assert_eq!(store.get("k"), Some(json!("v")));
    }

    #[test]
    fn test_current_user_round_trip() {
        let store = MemoryStorage::new();
        assert!(current_user(&store).is_none());

        set_current_user(&store, &alice());
        let user = current_user(&store).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.points, 20);
        assert!(user.password.is_empty());

        clear_current_user(&store);
        assert!(current_user(&store).is_none());
    }

    #[test]
    fn test_garbage_user_is_logged_out() {
        let store = MemoryStorage::new();
        store.set(USER_KEY, json!("not a user"));
        assert!(current_user(&store).is_none());
    }
}
