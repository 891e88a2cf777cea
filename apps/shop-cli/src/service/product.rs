//! # Catalogue, Purchases and Profile
//!
//! ## Purchase Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  buy_product(product_id, quantity)                                     │
//! │                                                                         │
//! │  1. Check                                                               │
//! │     ├── logged in?                       no  → NotAuthenticated         │
//! │     ├── product exists?                  no  → ProductNotFound          │
//! │     ├── points ≥ cost × quantity?        no  → InsufficientPoints       │
//! │     └── count ≥ quantity?                no  → OutOfStock               │
//! │                                                                         │
//! │  2. Write                                                               │
//! │     ├── create Order(user, product, quantity, now)                      │
//! │     ├── user.points  -= cost × quantity   → session rewritten           │
//! │     └── product.count -= quantity                                       │
//! │                                                                         │
//! │  A failed check writes nothing.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::ShopService;
use crate::error::ShopResult;
use shop_core::validation::validate_quantity;
use shop_core::{CoreError, NewOrder, Order, Points, Product, User};
use shop_db::{Fields, ProductColumn, UserColumn};

/// Outcome of a successful purchase.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub order: Order,
    pub product: Product,
    pub user: User,
    pub total: Points,
}

/// One row of the order history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub order: Order,
    pub product_name: String,
}

/// The logged-in user with their order history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user: User,
    pub orders: Vec<OrderLine>,
}

impl ShopService {
    /// All products, ordered by id. No login needed.
    pub async fn list_products(&self) -> ShopResult<Vec<Product>> {
        Ok(self.db.products().all().await?)
    }

    /// Buys `quantity` units of a product with the logged-in user's points.
    pub async fn buy_product(&self, product_id: i64, quantity: i64) -> ShopResult<Purchase> {
        validate_quantity(quantity).map_err(CoreError::from)?;
        let users = self.db.users();
        let products = self.db.products();
        let orders = self.db.orders();
        let mut scope = self.scope();

        let step = scope.step().await?;
        let user = self.require_user_in(step).await?;
        let product = products
            .get_by_id_in(step, product_id)
            .await?
            .ok_or(CoreError::ProductNotFound(product_id))?;

        let total = product.price().times(quantity)?;
        let remaining = match user.balance().debit(total) {
            Ok(remaining) => remaining,
            Err(e) => {
                warn!(user_id = user.id, product_id, total = %total, "Purchase rejected: insufficient points");
                return Err(e.into());
            }
        };
        if !product.in_stock(quantity) {
            warn!(product_id, count = product.count, quantity, "Purchase rejected: out of stock");
            return Err(CoreError::OutOfStock {
                product: product.name.clone(),
                available: product.count,
                requested: quantity,
            }
            .into());
        }
        scope.checkpoint().await?;

        let order = orders
            .create_in(
                scope.step().await?,
                NewOrder {
                    user_id: user.id,
                    product_id: product.id,
                    quantity,
                    ordered_at: Utc::now(),
                },
            )
            .await?;
        scope.checkpoint().await?;

        let user = users
            .update_in(
                scope.step().await?,
                &user,
                Fields::new().with(UserColumn::Points, remaining.value()),
            )
            .await?;
        scope.checkpoint().await?;
        self.remember_committed(&user);

        let product = products
            .update_in(
                scope.step().await?,
                &product,
                Fields::new().with(ProductColumn::Count, product.count - quantity),
            )
            .await?;
        scope.finish().await?;
        self.remember(&user);

        info!(
            user_id = user.id,
            order_id = order.id,
            product = %product.name,
            quantity,
            total = %total,
            "Product purchased"
        );

        Ok(Purchase {
            order,
            product,
            user,
            total,
        })
    }

    /// The logged-in user, re-read from the database, with their orders.
    pub async fn view_profile(&self) -> ShopResult<Profile> {
        let products = self.db.products();
        let mut uow = self.db.open_unit_of_work().await?;

        let user = self.require_user_in(&mut uow).await?;
        let orders = self.db.orders().for_user_in(&mut uow, user.id).await?;

        let mut lines = Vec::with_capacity(orders.len());
        for order in orders {
            let product_name = products
                .get_by_id_in(&mut uow, order.product_id)
                .await?
                .map(|p| p.name)
                .unwrap_or_else(|| format!("#{}", order.product_id));
            lines.push(OrderLine {
                order,
                product_name,
            });
        }
        uow.commit().await?;

        self.remember(&user);
        Ok(Profile {
            user,
            orders: lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorCode;
    use crate::service::test_support::{add_product, add_ticket, service};
    use crate::service::ShopService;
    use shop_db::{CommitPolicy, Fields, UserColumn};

    async fn alice_with_points(service: &ShopService, points: i64) {
        let alice = service.register("alice", "longenough1").await.unwrap();
        service
            .db()
            .users()
            .update(&alice, Fields::new().with(UserColumn::Points, points))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_buy_success() {
        let service = service(CommitPolicy::PerCall).await;
        alice_with_points(&service, 20).await;
        let mug = add_product(&service, "Mug", 15, 5).await;

        let purchase = service.buy_product(mug.id, 1).await.unwrap();
        assert_eq!(purchase.user.points, 5);
        assert_eq!(purchase.product.count, 4);
        assert_eq!(purchase.total.value(), 15);
        assert_eq!(purchase.order.product_id, mug.id);
        assert_eq!(purchase.order.user_id, purchase.user.id);
        assert_eq!(purchase.order.quantity, 1);

        assert_eq!(service.current_user().unwrap().points, 5);
        assert_eq!(service.db().orders().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_buy_insufficient_points_changes_nothing() {
        let service = service(CommitPolicy::PerCall).await;
        alice_with_points(&service, 10).await;
        let mug = add_product(&service, "Mug", 15, 5).await;

        let err = service.buy_product(mug.id, 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessRule);
        assert_eq!(err.message, "Not enough points: need 15, have 10");

        let user = service.db().users().by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.points, 10);
        let mug = service.db().products().get_by_id(mug.id).await.unwrap().unwrap();
        assert_eq!(mug.count, 5);
        assert_eq!(service.db().orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_buy_multiple_units() {
        let service = service(CommitPolicy::Atomic).await;
        alice_with_points(&service, 50).await;
        let pen = add_product(&service, "Pen", 5, 10).await;

        let purchase = service.buy_product(pen.id, 3).await.unwrap();
        assert_eq!(purchase.total.value(), 15);
        assert_eq!(purchase.user.points, 35);
        assert_eq!(purchase.product.count, 7);
        assert_eq!(service.current_user().unwrap().points, 35);
    }

    #[tokio::test]
    async fn test_buy_out_of_stock() {
        let service = service(CommitPolicy::PerCall).await;
        alice_with_points(&service, 100).await;
        let cap = add_product(&service, "Cap", 15, 0).await;

        let err = service.buy_product(cap.id, 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessRule);
        assert_eq!(service.db().orders().count().await.unwrap(), 0);

        let user = service.db().users().by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.points, 100);
    }

    #[tokio::test]
    async fn test_buy_unknown_product() {
        let service = service(CommitPolicy::PerCall).await;
        alice_with_points(&service, 100).await;

        let err = service.buy_product(404, 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: 404");
    }

    #[tokio::test]
    async fn test_buy_requires_login() {
        let service = service(CommitPolicy::PerCall).await;
        let mug = add_product(&service, "Mug", 15, 5).await;

        let err = service.buy_product(mug.id, 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }

    #[tokio::test]
    async fn test_buy_bad_quantity() {
        let service = service(CommitPolicy::PerCall).await;
        alice_with_points(&service, 100).await;
        let mug = add_product(&service, "Mug", 15, 5).await;

        let err = service.buy_product(mug.id, 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[tokio::test]
    async fn test_profile_lists_orders_with_names() {
        let service = service(CommitPolicy::PerCall).await;
        service.register("alice", "longenough1").await.unwrap();
        add_ticket(&service, "ABC123").await;
        service.redeem_ticket("ABC123").await.unwrap();
        let mug = add_product(&service, "Mug", 15, 5).await;
        service.buy_product(mug.id, 1).await.unwrap();

        let profile = service.view_profile().await.unwrap();
        assert_eq!(profile.user.username, "alice");
        assert_eq!(profile.user.points, 5);
        assert_eq!(profile.orders.len(), 1);
        assert_eq!(profile.orders[0].product_name, "Mug");
        assert_eq!(profile.orders[0].order.quantity, 1);
    }

    #[tokio::test]
    async fn test_profile_requires_login() {
        let service = service(CommitPolicy::PerCall).await;
        let err = service.view_profile().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
    }

    #[tokio::test]
    async fn test_list_products_stable() {
        let service = service(CommitPolicy::PerCall).await;
        add_product(&service, "Mug", 15, 5).await;
        add_product(&service, "Pen", 5, 10).await;

        let first = service.list_products().await.unwrap();
        let second = service.list_products().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].name, "Mug");
    }
}
