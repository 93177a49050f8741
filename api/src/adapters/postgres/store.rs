//! PostgreSQL transactional store
//!
//! Each unit of work is one database transaction. Row-lock waits inside it
//! are bounded with `SET LOCAL lock_timeout`, so a blocked claim fails with
//! SQLSTATE 55P03 instead of hanging past the caller's deadline.

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait};

use super::errors::db_error;
use crate::domain::ports::{TransactionalStore, UnitOfWork};
use crate::error::DomainError;

/// PostgreSQL implementation of TransactionalStore
pub struct PostgresStore {
    db: DatabaseConnection,
}

impl PostgresStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionalStore for PostgresStore {
    type Unit = PostgresUnitOfWork;

    async fn begin(&self, lock_timeout: Duration) -> Result<Self::Unit, DomainError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        // Postgres treats 0 as "no timeout"
        let millis = lock_timeout.as_millis().max(1);
        txn.execute_unprepared(&format!("SET LOCAL lock_timeout = '{}ms'", millis))
            .await
            .map_err(db_error)?;

        Ok(PostgresUnitOfWork { txn })
    }
}

/// One open transaction; dropping it without commit rolls it back
pub struct PostgresUnitOfWork {
    pub(super) txn: DatabaseTransaction,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn commit(self) -> Result<(), DomainError> {
        self.txn.commit().await.map_err(db_error)
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.txn.rollback().await.map_err(db_error)
    }
}
