//! # User Repository
//!
//! Column descriptors for `users` plus the lookups account handling needs.

use crate::error::DbResult;
use crate::record::{Column, Entity, Fields};
use crate::repository::Repository;
use shop_core::{NewUser, User};

/// Columns of the `users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    Id,
    Username,
    Password,
    Points,
}

impl Column for UserColumn {
    fn name(self) -> &'static str {
        match self {
            UserColumn::Id => "id",
            UserColumn::Username => "username",
            UserColumn::Password => "password",
            UserColumn::Points => "points",
        }
    }
}

impl Entity for User {
    type Column = UserColumn;

    const TABLE: &'static str = "users";
    const NAME: &'static str = "User";
    const ID: UserColumn = UserColumn::Id;

    fn id(&self) -> i64 {
        self.id
    }
}

impl From<NewUser> for Fields<User> {
    fn from(new: NewUser) -> Self {
        Fields::new()
            .with(UserColumn::Username, new.username)
            .with(UserColumn::Password, new.password)
            .with(UserColumn::Points, new.points)
    }
}

impl Repository<User> {
    /// Looks a user up by username.
    pub async fn by_username(&self, username: &str) -> DbResult<Option<User>> {
        self.get(Fields::new().with(UserColumn::Username, username))
            .await
    }

    /// Whether a user with this username exists.
    pub async fn exists(&self, username: &str) -> DbResult<bool> {
        let n = self
            .count_where(Fields::new().with(UserColumn::Username, username))
            .await?;
        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::tests::{new_user, test_db};

    #[tokio::test]
    async fn test_exists_and_by_username() {
        let db = test_db().await;
        let users = db.users();

        assert!(!users.exists("alice").await.unwrap());
        let alice = users.create(new_user("alice", 0)).await.unwrap();
        assert!(users.exists("alice").await.unwrap());
        assert!(!users.exists("Alice").await.unwrap());

        let found = users.by_username("alice").await.unwrap().unwrap();
        assert_eq!(found, alice);
        assert_eq!(found.password, "longenough1");
        assert!(users.by_username("bob").await.unwrap().is_none());
    }
}
