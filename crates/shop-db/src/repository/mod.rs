//! # Repository Module
//!
//! One generic repository serves all four entities.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Generic Repository                                   │
//! │                                                                         │
//! │  Shop service                                                          │
//! │       │                                                                 │
//! │       │  db.tickets().get(Fields::new().with(TicketColumn::Code, c))   │
//! │       ▼                                                                 │
//! │  Repository<E: Entity>                                                 │
//! │  ├── get / get_by_id / refresh    ← at most one record                 │
//! │  ├── filter / all / count         ← ordered by id                      │
//! │  ├── create                       ← returns the stored record          │
//! │  └── update                       ← returns the refreshed record       │
//! │       │                                                                 │
//! │       │  SQL built from E::TABLE and E::Column names                    │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Entity-specific helpers live next to each entity's column enum:       │
//! │  users().exists(), tickets().is_valid(), orders().for_user(), ...      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Units of Work
//! Every plain method opens its own unit of work and commits it before
//! returning. The `*_in` variants run inside a caller-supplied
//! [`UnitOfWork`] and leave committing to the caller.

pub mod order;
pub mod product;
pub mod ticket;
pub mod user;

pub use order::OrderColumn;
pub use product::ProductColumn;
pub use ticket::TicketColumn;
pub use user::UserColumn;

use std::marker::PhantomData;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::pool::ConnectionManager;
use crate::record::{
    bind_scalar_values, bind_values, count_sql, insert_sql, select_sql, update_sql, Entity,
    Fields,
};
use crate::unit_of_work::UnitOfWork;

/// Data access for one entity type.
///
/// ## Usage
/// ```rust,ignore
/// let users = db.users();
///
/// let alice = users
///     .create(NewUser { username: "alice".into(), password, points: 0 })
///     .await?;
///
/// let alice = users
///     .update(&alice, Fields::new().with(UserColumn::Points, 20))
///     .await?;
/// assert_eq!(alice.points, 20);
/// ```
#[derive(Debug, Clone)]
pub struct Repository<E: Entity> {
    conn: ConnectionManager,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    pub fn new(conn: ConnectionManager) -> Self {
        Repository {
            conn,
            _entity: PhantomData,
        }
    }

    // =========================================================================
    // Own unit of work per call
    // =========================================================================

    /// Returns the single record matching every pair in `predicate`.
    ///
    /// ## Returns
    /// * `Ok(Some(record))` - exactly one match
    /// * `Ok(None)` - no match
    /// * `Err(DbError::AmbiguousLookup)` - more than one match
    pub async fn get(&self, predicate: Fields<E>) -> DbResult<Option<E>> {
        let mut uow = self.conn.open_unit_of_work().await?;
        let found = self.get_in(&mut uow, predicate).await?;
        uow.commit().await?;
        Ok(found)
    }

    /// Returns the record with the given id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<E>> {
        self.get(Fields::by_id(id)).await
    }

    /// Returns every record matching `predicate`, ordered by id.
    pub async fn filter(&self, predicate: Fields<E>) -> DbResult<Vec<E>> {
        let mut uow = self.conn.open_unit_of_work().await?;
        let records = self.filter_in(&mut uow, predicate).await?;
        uow.commit().await?;
        Ok(records)
    }

    /// Returns every record, ordered by id.
    pub async fn all(&self) -> DbResult<Vec<E>> {
        self.filter(Fields::new()).await
    }

    /// Counts records matching `predicate`.
    pub async fn count_where(&self, predicate: Fields<E>) -> DbResult<i64> {
        let mut uow = self.conn.open_unit_of_work().await?;
        let n = self.count_in(&mut uow, predicate).await?;
        uow.commit().await?;
        Ok(n)
    }

    /// Counts all records.
    pub async fn count(&self) -> DbResult<i64> {
        self.count_where(Fields::new()).await
    }

    /// Persists a new record and returns it with its assigned id.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - duplicate unique attribute
    /// * `DbError::ForeignKeyViolation` - dangling reference
    pub async fn create(&self, fields: impl Into<Fields<E>>) -> DbResult<E> {
        let mut uow = self.conn.open_unit_of_work().await?;
        let record = self.create_in(&mut uow, fields).await?;
        uow.commit().await?;
        Ok(record)
    }

    /// Sets the given attributes on `record` and returns the stored result.
    ///
    /// The returned record reflects the database after the write, not the
    /// (possibly stale) copy that was passed in.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - the record no longer exists
    pub async fn update(&self, record: &E, fields: Fields<E>) -> DbResult<E> {
        let mut uow = self.conn.open_unit_of_work().await?;
        let updated = self.update_in(&mut uow, record, fields).await?;
        uow.commit().await?;
        Ok(updated)
    }

    /// Re-reads `record` from the database.
    pub async fn refresh(&self, record: &E) -> DbResult<E> {
        let mut uow = self.conn.open_unit_of_work().await?;
        let fresh = self.refresh_in(&mut uow, record).await?;
        uow.commit().await?;
        Ok(fresh)
    }

    // =========================================================================
    // Caller-supplied unit of work
    // =========================================================================

    pub async fn get_in(&self, uow: &mut UnitOfWork, predicate: Fields<E>) -> DbResult<Option<E>> {
        // Two rows are enough to tell "one" from "many"
        let sql = select_sql(&predicate, Some(2));
        debug!(entity = E::NAME, sql = %sql, "get");

        let mut rows: Vec<E> = bind_values(sqlx::query_as::<_, E>(&sql), predicate.into_values())
            .fetch_all(uow.connection())
            .await?;

        if rows.len() > 1 {
            return Err(DbError::ambiguous(E::NAME));
        }
        Ok(rows.pop())
    }

    pub async fn get_by_id_in(&self, uow: &mut UnitOfWork, id: i64) -> DbResult<Option<E>> {
        self.get_in(uow, Fields::by_id(id)).await
    }

    pub async fn filter_in(&self, uow: &mut UnitOfWork, predicate: Fields<E>) -> DbResult<Vec<E>> {
        let sql = select_sql(&predicate, None);
        debug!(entity = E::NAME, sql = %sql, "filter");

        let rows = bind_values(sqlx::query_as::<_, E>(&sql), predicate.into_values())
            .fetch_all(uow.connection())
            .await?;
        Ok(rows)
    }

    pub async fn count_in(&self, uow: &mut UnitOfWork, predicate: Fields<E>) -> DbResult<i64> {
        let sql = count_sql(&predicate);
        debug!(entity = E::NAME, sql = %sql, "count");

        let n: i64 = bind_scalar_values(sqlx::query_scalar::<_, i64>(&sql), predicate.into_values())
            .fetch_one(uow.connection())
            .await?;
        Ok(n)
    }

    pub async fn create_in(
        &self,
        uow: &mut UnitOfWork,
        fields: impl Into<Fields<E>>,
    ) -> DbResult<E> {
        let fields = fields.into();
        let sql = insert_sql(&fields);
        debug!(entity = E::NAME, sql = %sql, "create");

        let record = bind_values(sqlx::query_as::<_, E>(&sql), fields.clone().into_values())
            .fetch_one(uow.connection())
            .await
            .map_err(|e| with_known_value(e.into(), &fields))?;

        debug!(entity = E::NAME, id = record.id(), "Record created");
        Ok(record)
    }

    pub async fn update_in(&self, uow: &mut UnitOfWork, record: &E, fields: Fields<E>) -> DbResult<E> {
        if fields.is_empty() {
            return self.refresh_in(uow, record).await;
        }

        let id = record.id();
        let sql = update_sql(&fields);
        debug!(entity = E::NAME, id, sql = %sql, "update");

        let mut values = fields.clone().into_values();
        values.push(id.into());

        bind_values(sqlx::query_as::<_, E>(&sql), values)
            .fetch_optional(uow.connection())
            .await
            .map_err(|e| with_known_value(e.into(), &fields))?
            .ok_or_else(|| DbError::not_found(E::NAME, id))
    }

    pub async fn refresh_in(&self, uow: &mut UnitOfWork, record: &E) -> DbResult<E> {
        let id = record.id();
        self.get_by_id_in(uow, id)
            .await?
            .ok_or_else(|| DbError::not_found(E::NAME, id))
    }
}

/// Fills in the offending value of a unique violation from the written
/// fields. SQLite names the column (`table.column`) but not the value.
fn with_known_value<E: Entity>(err: DbError, fields: &Fields<E>) -> DbError {
    match err {
        DbError::UniqueViolation { field, value } => {
            let column = field.rsplit('.').next().unwrap_or(field.as_str());
            match fields.value_of(column) {
                Some(known) => DbError::duplicate(field.as_str(), known.to_string()),
                None => DbError::UniqueViolation { field, value },
            }
        }
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use shop_core::{NewProduct, NewUser, Product, User};

    pub(crate) async fn test_db() -> ConnectionManager {
        let db = ConnectionManager::connect(DbConfig::in_memory())
            .await
            .unwrap();
        db.ensure_schema().await.unwrap();
        db
    }

    pub(crate) fn new_user(username: &str, points: i64) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "longenough1".to_string(),
            points,
        }
    }

    pub(crate) fn new_product(name: &str, cost: i64, count: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            cost,
            count,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let db = test_db().await;
        let users = db.users();

        let a = users.create(new_user("alice", 0)).await.unwrap();
        let b = users.create(new_user("bob", 0)).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.username, "alice");
        assert_eq!(a.points, 0);
    }

    #[tokio::test]
    async fn test_get_none_and_some() {
        let db = test_db().await;
        let users = db.users();
        let alice = users.create(new_user("alice", 0)).await.unwrap();

        let found = users
            .get(Fields::new().with(UserColumn::Username, "alice"))
            .await
            .unwrap();
        assert_eq!(found, Some(alice.clone()));

        let missing = users
            .get(Fields::new().with(UserColumn::Username, "nobody"))
            .await
            .unwrap();
        assert_eq!(missing, None);

        assert_eq!(users.get_by_id(alice.id).await.unwrap(), Some(alice));
        assert_eq!(users.get_by_id(9999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_ambiguous() {
        let db = test_db().await;
        let users = db.users();
        users.create(new_user("alice", 5)).await.unwrap();
        users.create(new_user("bob", 5)).await.unwrap();

        let err = users
            .get(Fields::new().with(UserColumn::Points, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::AmbiguousLookup { .. }));
    }

    #[tokio::test]
    async fn test_filter_and_all_ordered_by_id() {
        let db = test_db().await;
        let products = db.products();
        let mug = products.create(new_product("Mug", 15, 5)).await.unwrap();
        let pen = products.create(new_product("Pen", 5, 0)).await.unwrap();
        let cap = products.create(new_product("Cap", 15, 2)).await.unwrap();

        let all: Vec<Product> = products.all().await.unwrap();
        assert_eq!(all, vec![mug.clone(), pen, cap.clone()]);

        let fifteen = products
            .filter(Fields::new().with(ProductColumn::Cost, 15))
            .await
            .unwrap();
        assert_eq!(fifteen, vec![mug, cap]);

        let none = products
            .filter(Fields::new().with(ProductColumn::Cost, 1000))
            .await
            .unwrap();
        assert!(none.is_empty());

        assert_eq!(products.count().await.unwrap(), 3);
        assert_eq!(
            products
                .count_where(Fields::new().with(ProductColumn::Cost, 15))
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_update_returns_refreshed_record() {
        let db = test_db().await;
        let users = db.users();
        let alice = users.create(new_user("alice", 0)).await.unwrap();

        let updated = users
            .update(&alice, Fields::new().with(UserColumn::Points, 20))
            .await
            .unwrap();
        assert_eq!(updated.points, 20);
        assert_eq!(updated.id, alice.id);

        // A stale copy is refreshed by the update rather than written back
        let again = users
            .update(&alice, Fields::new().with(UserColumn::Points, 35))
            .await
            .unwrap();
        assert_eq!(again.points, 35);
        assert_eq!(again.username, "alice");

        let reread = users.refresh(&alice).await.unwrap();
        assert_eq!(reread, again);
    }

    #[tokio::test]
    async fn test_update_empty_fields_is_refresh() {
        let db = test_db().await;
        let users = db.users();
        let alice = users.create(new_user("alice", 7)).await.unwrap();

        let same = users.update(&alice, Fields::new()).await.unwrap();
        assert_eq!(same, alice);
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let db = test_db().await;
        let ghost = User {
            id: 42,
            username: "ghost".to_string(),
            password: String::new(),
            points: 0,
        };

        let err = db
            .users()
            .update(&ghost, Fields::new().with(UserColumn::Points, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db.users().refresh(&ghost).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_duplicate_unique() {
        let db = test_db().await;
        db.users().create(new_user("alice", 0)).await.unwrap();

        let err = db.users().create(new_user("alice", 0)).await.unwrap_err();
        assert!(matches!(
            &err,
            DbError::UniqueViolation { field, value } if field == "users.username" && value == "alice"
        ));
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_to_taken_name_reports_value() {
        let db = test_db().await;
        db.products().create(new_product("Mug", 15, 5)).await.unwrap();
        let pen = db.products().create(new_product("Pen", 5, 10)).await.unwrap();

        let err = db
            .products()
            .update(&pen, Fields::new().with(ProductColumn::Name, "Mug"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate products.name: 'Mug' already exists");
    }
}
