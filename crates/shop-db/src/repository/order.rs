//! # Order Repository
//!
//! Column descriptors for `orders`. Orders are append-only; nothing in the
//! shop updates or deletes one after `create`.

use crate::error::DbResult;
use crate::record::{Column, Entity, Fields};
use crate::repository::Repository;
use crate::unit_of_work::UnitOfWork;
use shop_core::{NewOrder, Order};

/// Columns of the `orders` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderColumn {
    Id,
    UserId,
    ProductId,
    Quantity,
    OrderedAt,
}

impl Column for OrderColumn {
    fn name(self) -> &'static str {
        match self {
            OrderColumn::Id => "id",
            OrderColumn::UserId => "user_id",
            OrderColumn::ProductId => "product_id",
            OrderColumn::Quantity => "quantity",
            OrderColumn::OrderedAt => "ordered_at",
        }
    }
}

impl Entity for Order {
    type Column = OrderColumn;

    const TABLE: &'static str = "orders";
    const NAME: &'static str = "Order";
    const ID: OrderColumn = OrderColumn::Id;

    fn id(&self) -> i64 {
        self.id
    }
}

impl From<NewOrder> for Fields<Order> {
    fn from(new: NewOrder) -> Self {
        Fields::new()
            .with(OrderColumn::UserId, new.user_id)
            .with(OrderColumn::ProductId, new.product_id)
            .with(OrderColumn::Quantity, new.quantity)
            .with(OrderColumn::OrderedAt, new.ordered_at)
    }
}

impl Repository<Order> {
    /// A user's orders, oldest first.
    pub async fn for_user(&self, user_id: i64) -> DbResult<Vec<Order>> {
        self.filter(Fields::new().with(OrderColumn::UserId, user_id))
            .await
    }

    pub async fn for_user_in(&self, uow: &mut UnitOfWork, user_id: i64) -> DbResult<Vec<Order>> {
        self.filter_in(uow, Fields::new().with(OrderColumn::UserId, user_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::{new_product, new_user, test_db};
    use chrono::Utc;

    #[tokio::test]
    async fn test_for_user() {
        let db = test_db().await;
        let alice = db.users().create(new_user("alice", 0)).await.unwrap();
        let bob = db.users().create(new_user("bob", 0)).await.unwrap();
        let mug = db.products().create(new_product("Mug", 15, 5)).await.unwrap();

        let first = db
            .orders()
            .create(NewOrder {
                user_id: alice.id,
                product_id: mug.id,
                quantity: 1,
                ordered_at: Utc::now(),
            })
            .await
            .unwrap();
        let second = db
            .orders()
            .create(NewOrder {
                user_id: alice.id,
                product_id: mug.id,
                quantity: 2,
                ordered_at: Utc::now(),
            })
            .await
            .unwrap();

        let orders = db.orders().for_user(alice.id).await.unwrap();
        assert_eq!(
            orders.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
        assert_eq!(orders[1].quantity, 2);
        assert_eq!(orders[0].ordered_at, first.ordered_at);

        assert!(db.orders().for_user(bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_requires_existing_product() {
        let db = test_db().await;
        let alice = db.users().create(new_user("alice", 0)).await.unwrap();

        let err = db
            .orders()
            .create(NewOrder {
                user_id: alice.id,
                product_id: 404,
                quantity: 1,
                ordered_at: Utc::now(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, crate::DbError::ForeignKeyViolation { .. }));
    }
}
