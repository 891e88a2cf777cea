//! # Ticket Repository
//!
//! Column descriptors for `tickets` and redemption lookups.
//!
//! A ticket is valid for redemption only while it exists, is still
//! `available`, and has no owner. Unknown codes are simply invalid.

use crate::error::DbResult;
use crate::record::{Column, Entity, Fields};
use crate::repository::Repository;
use shop_core::{NewTicket, Ticket};

/// Columns of the `tickets` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketColumn {
    Id,
    Code,
    Available,
    UserId,
}

impl Column for TicketColumn {
    fn name(self) -> &'static str {
        match self {
            TicketColumn::Id => "id",
            TicketColumn::Code => "code",
            TicketColumn::Available => "available",
            TicketColumn::UserId => "user_id",
        }
    }
}

impl Entity for Ticket {
    type Column = TicketColumn;

    const TABLE: &'static str = "tickets";
    const NAME: &'static str = "Ticket";
    const ID: TicketColumn = TicketColumn::Id;

    fn id(&self) -> i64 {
        self.id
    }
}

impl From<NewTicket> for Fields<Ticket> {
    fn from(new: NewTicket) -> Self {
        Fields::new()
            .with(TicketColumn::Code, new.code)
            .with(TicketColumn::Available, true)
            .with(TicketColumn::UserId, None::<i64>)
    }
}

impl Repository<Ticket> {
    /// Looks a ticket up by code, redeemed or not.
    pub async fn by_code(&self, code: &str) -> DbResult<Option<Ticket>> {
        self.get(Fields::new().with(TicketColumn::Code, code)).await
    }

    /// Whether `code` names a ticket that can still be redeemed.
    ///
    /// Unknown codes are reported as `false`, not as an error.
    pub async fn is_valid(&self, code: &str) -> DbResult<bool> {
        Ok(self
            .by_code(code)
            .await?
            .is_some_and(|ticket| ticket.is_redeemable()))
    }

    /// Tickets redeemed by `user_id`, ordered by id.
    pub async fn redeemed_by(&self, user_id: i64) -> DbResult<Vec<Ticket>> {
        self.filter(Fields::new().with(TicketColumn::UserId, user_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::{new_user, test_db};

    fn ticket(code: &str) -> NewTicket {
        NewTicket {
            code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_new_ticket_is_valid() {
        let db = test_db().await;
        let created = db.tickets().create(ticket("ABC123")).await.unwrap();

        assert!(created.available);
        assert_eq!(created.user_id, None);
        assert!(db.tickets().is_valid("ABC123").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_code_is_invalid() {
        let db = test_db().await;
        assert!(!db.tickets().is_valid("NOPE").await.unwrap());
    }

    #[tokio::test]
    async fn test_redeemed_ticket_is_invalid() {
        let db = test_db().await;
        let alice = db.users().create(new_user("alice", 0)).await.unwrap();
        let t = db.tickets().create(ticket("ABC123")).await.unwrap();

        let redeemed = db
            .tickets()
            .update(
                &t,
                Fields::new()
                    .with(TicketColumn::Available, false)
                    .with(TicketColumn::UserId, alice.id),
            )
            .await
            .unwrap();

        assert!(!redeemed.available);
        assert_eq!(redeemed.user_id, Some(alice.id));
        assert!(!db.tickets().is_valid("ABC123").await.unwrap());
        assert_eq!(db.tickets().redeemed_by(alice.id).await.unwrap(), vec![redeemed]);
    }

    #[tokio::test]
    async fn test_owned_but_available_is_invalid() {
        let db = test_db().await;
        let alice = db.users().create(new_user("alice", 0)).await.unwrap();
        let t = db.tickets().create(ticket("ABC123")).await.unwrap();

        db.tickets()
            .update(&t, Fields::new().with(TicketColumn::UserId, alice.id))
            .await
            .unwrap();

        assert!(!db.tickets().is_valid("ABC123").await.unwrap());
    }

    #[tokio::test]
    async fn test_filter_on_missing_owner() {
        let db = test_db().await;
        let alice = db.users().create(new_user("alice", 0)).await.unwrap();
        let free = db.tickets().create(ticket("ABC123")).await.unwrap();
        let taken = db.tickets().create(ticket("XYZ789")).await.unwrap();
        db.tickets()
            .update(&taken, Fields::new().with(TicketColumn::UserId, alice.id))
            .await
            .unwrap();

        let unowned = db
            .tickets()
            .filter(Fields::new().with(TicketColumn::UserId, None::<i64>))
            .await
            .unwrap();
        assert_eq!(unowned, vec![free.clone()]);

        let found = db
            .tickets()
            .get(
                Fields::new()
                    .with(TicketColumn::Code, "ABC123")
                    .with(TicketColumn::UserId, None::<i64>),
            )
            .await
            .unwrap();
        assert_eq!(found, Some(free));

        let owned = db
            .tickets()
            .count_where(Fields::new().with(TicketColumn::UserId, alice.id))
            .await
            .unwrap();
        assert_eq!(owned, 1);
    }

    #[tokio::test]
    async fn test_owner_must_exist() {
        let db = test_db().await;
        let t = db.tickets().create(ticket("ABC123")).await.unwrap();

        let err = db
            .tickets()
            .update(&t, Fields::new().with(TicketColumn::UserId, 999))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::DbError::ForeignKeyViolation { .. }));
    }
}
