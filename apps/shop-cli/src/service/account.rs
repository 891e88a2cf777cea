//! Registration, login and logout.

use tracing::{info, warn};

use super::ShopService;
use crate::error::ShopResult;
use crate::state::clear_current_user;
use shop_core::validation::{validate_password, validate_username};
use shop_core::{CoreError, NewUser, User};

impl ShopService {
    /// Creates an account with zero points and logs it in.
    ///
    /// ## Checks (first failure wins)
    /// 1. Username present and not too long
    /// 2. Username not taken → `UsernameTaken`
    /// 3. Password at least 8 characters
    pub async fn register(&self, username: &str, password: &str) -> ShopResult<User> {
        let username = username.trim();
        validate_username(username).map_err(CoreError::from)?;

        let users = self.db.users();
        if users.exists(username).await? {
            warn!(username = %username, "Registration rejected: username taken");
            return Err(CoreError::UsernameTaken(username.to_string()).into());
        }

        validate_password(password).map_err(CoreError::from)?;

        let user = users
            .create(NewUser {
                username: username.to_string(),
                password: self.credentials.prepare(password),
                points: 0,
            })
            .await?;

        self.remember(&user);
        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Logs in an existing user.
    ///
    /// ## Errors
    /// * `UnknownUser` - no user with that name
    /// * `InvalidCredentials` - password does not match
    pub async fn login(&self, username: &str, password: &str) -> ShopResult<User> {
        let username = username.trim();
        validate_username(username).map_err(CoreError::from)?;

        let user = self
            .db
            .users()
            .by_username(username)
            .await?
            .ok_or_else(|| CoreError::UnknownUser(username.to_string()))?;

        if !self.credentials.verify(&user.password, password) {
            warn!(username = %username, "Login rejected: wrong password");
            return Err(CoreError::InvalidCredentials.into());
        }

        self.remember(&user);
        info!(user_id = user.id, username = %user.username, "User logged in");
        Ok(user)
    }

    /// Logs out, returning who was logged in.
    pub fn logout(&self) -> Option<User> {
        let user = self.current_user();
        clear_current_user(self.session.as_ref());
        if let Some(user) = &user {
            info!(user_id = user.id, "User logged out");
        }
        user
    }
}
