//! # Units of Work
//!
//! A [`UnitOfWork`] is one database transaction. A [`TransactionScope`]
//! strings several repository calls together under a [`CommitPolicy`].
//!
//! ## Commit Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  redeem ticket = credit user ─► mark ticket redeemed                   │
//! │                                                                         │
//! │  PerCall (default)                                                      │
//! │    [ BEGIN credit COMMIT ] [ BEGIN mark COMMIT ]                        │
//! │    A failure in "mark" leaves the credit in place.                      │
//! │                                                                         │
//! │  Atomic                                                                 │
//! │    [ BEGIN credit ─► mark COMMIT ]                                      │
//! │    A failure anywhere rolls back the whole operation.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::fmt;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::pool::ConnectionManager;

// =============================================================================
// Unit of Work
// =============================================================================

/// One transaction on the shared pool.
///
/// Consumed by [`commit`](Self::commit) or [`rollback`](Self::rollback).
/// Dropping it uncommitted rolls back.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool.begin().await.map_err(|e| match e {
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            other => DbError::TransactionFailed(other.to_string()),
        })?;
        Ok(UnitOfWork { tx })
    }

    /// The connection statements in this unit run on.
    pub(crate) fn connection(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Makes every change in this unit durable.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    /// Discards every change in this unit.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork").finish_non_exhaustive()
    }
}

// =============================================================================
// Transaction Scope
// =============================================================================

/// How a multi-step business operation groups its writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Every step commits on its own.
    #[default]
    PerCall,

    /// All steps commit together in `finish`, or not at all.
    Atomic,
}

impl CommitPolicy {
    /// `Atomic` when `atomic` is true.
    pub fn from_flag(atomic: bool) -> Self {
        if atomic {
            CommitPolicy::Atomic
        } else {
            CommitPolicy::PerCall
        }
    }
}

/// Runs a sequence of repository calls under a [`CommitPolicy`].
///
/// ## Usage
/// ```rust,ignore
/// let mut scope = TransactionScope::new(&db, policy);
///
/// let user = db.users().update_in(scope.step().await?, &user, credit).await?;
/// scope.checkpoint().await?;
///
/// db.tickets().update_in(scope.step().await?, &ticket, redeemed).await?;
/// scope.finish().await?;
/// ```
///
/// `checkpoint` commits the open unit under `PerCall` and does nothing under
/// `Atomic`. A scope dropped before `finish` rolls back whatever is still
/// open.
#[derive(Debug)]
pub struct TransactionScope {
    conn: ConnectionManager,
    policy: CommitPolicy,
    current: Option<UnitOfWork>,
}

impl TransactionScope {
    pub fn new(conn: &ConnectionManager, policy: CommitPolicy) -> Self {
        TransactionScope {
            conn: conn.clone(),
            policy,
            current: None,
        }
    }

    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    /// The unit of work for the next step, opened on first use.
    pub async fn step(&mut self) -> DbResult<&mut UnitOfWork> {
        let uow = match self.current.take() {
            Some(uow) => uow,
            None => self.conn.open_unit_of_work().await?,
        };
        Ok(self.current.insert(uow))
    }

    /// Ends a step.
    pub async fn checkpoint(&mut self) -> DbResult<()> {
        if self.policy == CommitPolicy::PerCall {
            self.commit_current().await?;
        }
        Ok(())
    }

    /// Commits whatever is still open.
    pub async fn finish(mut self) -> DbResult<()> {
        self.commit_current().await
    }

    async fn commit_current(&mut self) -> DbResult<()> {
        if let Some(uow) = self.current.take() {
            uow.commit().await?;
            debug!(policy = ?self.policy, "Unit of work committed");
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
