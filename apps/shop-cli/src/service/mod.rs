//! # Shop Service
//!
//! The business operations behind every menu entry.
//!
//! ## Session State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │               register() / login()                                      │
//! │   Anonymous ───────────────────────────► Authenticated(user)            │
//! │       ▲                                        │                        │
//! │       │               logout()                 │ redeem_ticket()        │
//! │       └────────────────────────────────────────┤ buy_product()          │
//! │                                                │ view_profile()         │
//! │                                                ▼                        │
//! │                                    session "user" rewritten from the    │
//! │                                    stored record after every write      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`account`] - register, login, logout
//! - [`ticket`] - ticket redemption
//! - [`product`] - catalogue, purchases, profile
//!
//! ## Stale Copies
//! The session holds a JSON copy of the user. It is only used to find the
//! user's id: every operation re-reads the user from the database before
//! checking or changing the balance, and the session is rewritten from the
//! record the database returns.

mod account;
mod product;
mod ticket;

pub use product::{OrderLine, Profile, Purchase};
pub use ticket::Redemption;

use std::sync::Arc;
use tracing::warn;

use crate::error::ShopResult;
use crate::state::{clear_current_user, current_user, set_current_user, SessionStore};
use shop_core::{CoreError, CredentialCheck, PlaintextCredentials, User};
use shop_db::{CommitPolicy, ConnectionManager, TransactionScope, UnitOfWork};

/// Shop operations over one database and one session.
///
/// ## Usage
/// ```rust,ignore
/// let service = ShopService::new(db, Arc::new(MemoryStorage::new()), CommitPolicy::PerCall);
///
/// service.register("alice", "longenough1").await?;
/// service.redeem_ticket("ABC123").await?;
/// let purchase = service.buy_product(1, 1).await?;
/// ```
#[derive(Debug)]
pub struct ShopService {
    db: ConnectionManager,
    session: Arc<dyn SessionStore>,
    credentials: Box<dyn CredentialCheck>,
    policy: CommitPolicy,
}

impl ShopService {
    /// Creates a service using plaintext credential comparison.
    pub fn new(db: ConnectionManager, session: Arc<dyn SessionStore>, policy: CommitPolicy) -> Self {
        ShopService {
            db,
            session,
            credentials: Box::new(PlaintextCredentials),
            policy,
        }
    }

    /// Replaces the credential check.
    pub fn with_credentials(mut self, credentials: impl CredentialCheck + 'static) -> Self {
        self.credentials = Box::new(credentials);
        self
    }

    pub fn db(&self) -> &ConnectionManager {
        &self.db
    }

    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    /// The session copy of the logged-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        current_user(self.session.as_ref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    // =========================================================================
    // Internals shared by the operation modules
    // =========================================================================

    fn scope(&self) -> TransactionScope {
        TransactionScope::new(&self.db, self.policy)
    }

    fn remember(&self, user: &User) {
        set_current_user(self.session.as_ref(), user);
    }

    /// Remembers `user` now if each step commits on its own; otherwise the
    /// caller remembers it after `finish`.
    fn remember_committed(&self, user: &User) {
        if self.policy == CommitPolicy::PerCall {
            self.remember(user);
        }
    }

    /// Re-reads the logged-in user inside `uow`.
    ///
    /// ## Errors
    /// `CoreError::NotAuthenticated` when nobody is logged in, or when the
    /// session names a user that no longer exists (the session is cleared).
    async fn require_user_in(&self, uow: &mut UnitOfWork) -> ShopResult<User> {
        let cached = self.current_user().ok_or(CoreError::NotAuthenticated)?;

        match self.db.users().get_by_id_in(uow, cached.id).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = cached.id, "Session user no longer exists");
                clear_current_user(self.session.as_ref());
                Err(CoreError::NotAuthenticated.into())
            }
        }
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::state::MemoryStorage;
    use shop_core::{NewProduct, NewTicket, Product};
    use shop_db::DbConfig;

    pub(crate) async fn service(policy: CommitPolicy) -> ShopService {
        let db = ConnectionManager::connect(DbConfig::in_memory())
            .await
            .unwrap();
        db.ensure_schema().await.unwrap();
        ShopService::new(db, Arc::new(MemoryStorage::new()), policy)
    }

    pub(crate) async fn add_ticket(service: &ShopService, code: &str) {
        service
            .db()
            .tickets()
            .create(NewTicket {
                code: code.to_string(),
            })
            .await
            .unwrap();
    }

    pub(crate) async fn add_product(
        service: &ShopService,
        name: &str,
        cost: i64,
        count: i64,
    ) -> Product {
        service
            .db()
            .products()
            .create(NewProduct {
                name: name.to_string(),
                cost,
                count,
            })
            .await
            .unwrap()
    }
}
