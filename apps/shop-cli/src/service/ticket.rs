//! # Ticket Redemption
//!
//! ```text
//! redeem_ticket("ABC123")
//!      │
//!      ├── step 1: re-read user, look up ticket ── invalid? ──► InvalidTicket
//!      │                                                        (nothing written)
//!      ├── step 2: user.points += 20          ──► session rewritten
//!      │
//!      └── step 3: ticket.available = false, ticket.user_id = user.id
//! ```

use serde::Serialize;
use tracing::{info, warn};

use super::ShopService;
use crate::error::ShopResult;
use shop_core::validation::validate_ticket_code;
use shop_core::{CoreError, Points, Ticket, User, TICKET_REWARD_POINTS};
use shop_db::{Fields, TicketColumn, UserColumn};

/// Outcome of a successful redemption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub ticket: Ticket,
    pub user: User,
    pub reward: Points,
}

impl ShopService {
    /// Redeems a ticket code for the logged-in user.
    ///
    /// ## Errors
    /// * `NotAuthenticated` - nobody logged in
    /// * `InvalidTicket` - unknown, unavailable or already owned; no state
    ///   changes
    pub async fn redeem_ticket(&self, code: &str) -> ShopResult<Redemption> {
        let code = validate_ticket_code(code).map_err(CoreError::from)?;
        let users = self.db.users();
        let tickets = self.db.tickets();
        let mut scope = self.scope();

        let step = scope.step().await?;
        let user = self.require_user_in(step).await?;
        let ticket = tickets
            .get_in(step, Fields::new().with(TicketColumn::Code, code.as_str()))
            .await?
            .filter(Ticket::is_redeemable);
        let Some(ticket) = ticket else {
            warn!(user_id = user.id, code = %code, "Redemption rejected: invalid ticket");
            return Err(CoreError::InvalidTicket(code).into());
        };
        scope.checkpoint().await?;

        let balance = user.balance().credit(TICKET_REWARD_POINTS)?;
        let user = users
            .update_in(
                scope.step().await?,
                &user,
                Fields::new().with(UserColumn::Points, balance.value()),
            )
            .await?;
        scope.checkpoint().await?;
        self.remember_committed(&user);

        let ticket = tickets
            .update_in(
                scope.step().await?,
                &ticket,
                Fields::new()
                    .with(TicketColumn::Available, false)
                    .with(TicketColumn::UserId, user.id),
            )
            .await?;
        scope.finish().await?;
        self.remember(&user);

        info!(
            user_id = user.id,
            ticket_id = ticket.id,
            points = user.points,
            "Ticket redeemed"
        );

        Ok(Redemption {
            ticket,
            user,
            reward: TICKET_REWARD_POINTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorCode;
    use crate::service::test_support::{add_ticket, service};
    use shop_db::CommitPolicy;

    #[tokio::test]
    async fn test_redeem_credits_and_claims() {
        let service = service(CommitPolicy::PerCall).await;
        let alice = service.register("alice", "longenough1").await.unwrap();
        add_ticket(&service, "ABC123").await;

        let redemption = service.redeem_ticket("ABC123").await.unwrap();
        assert_eq!(redemption.user.points, 20);
        assert_eq!(redemption.reward.value(), 20);
        assert!(!redemption.ticket.available);
        assert_eq!(redemption.ticket.user_id, Some(alice.id));

        assert_eq!(service.current_user().unwrap().points, 20);
        assert!(!service.db().tickets().is_valid("ABC123").await.unwrap());
        let stored = service.db().users().get_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.points, 20);
    }

    #[tokio::test]
    async fn test_redeem_twice_rejected() {
        let service = service(CommitPolicy::PerCall).await;
        let alice = service.register("alice", "longenough1").await.unwrap();
        add_ticket(&service, "ABC123").await;
        service.redeem_ticket("ABC123").await.unwrap();

        let err = service.redeem_ticket("ABC123").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessRule);

        let stored = service.db().users().get_by_id(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.points, 20);
    }

    #[tokio::test]
    async fn test_redeem_unknown_code() {
        let service = service(CommitPolicy::Atomic).await;
        service.register("alice", "longenough1").await.unwrap();

        let err = service.redeem_ticket("NOPE").await.unwrap_err();
        assert_eq!(err.message, "Invalid ticket: NOPE");
        assert_eq!(service.current_user().unwrap().points, 0);
    }

    #[tokio::test]
    async fn test_redeem_requires_login() {
        let service = service(CommitPolicy::PerCall).await;
        add_ticket(&service, "ABC123").await;

        let err = service.redeem_ticket("ABC123").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
        assert!(service.db().tickets().is_valid("ABC123").await.unwrap());
    }

    #[tokio::test]
    async fn test_redeem_atomic() {
        let service = service(CommitPolicy::Atomic).await;
        let alice = service.register("alice", "longenough1").await.unwrap();
        add_ticket(&service, "ABC123").await;

        let redemption = service.redeem_ticket(" ABC123 ").await.unwrap();
        assert_eq!(redemption.user.points, 20);
        assert_eq!(redemption.ticket.user_id, Some(alice.id));
        assert_eq!(service.current_user().unwrap().points, 20);
    }
}
