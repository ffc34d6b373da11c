use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TxError {
    #[error("transaction already closed")]
    Closed,
    #[error("transaction failed: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<TxError> for crate::domain::Error {
    fn from(err: TxError) -> Self {
        crate::domain::Error::Unexpected(err.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    fn sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    fn sql(&self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "READ ONLY",
            AccessMode::ReadWrite => "READ WRITE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Open,
    Committed,
    RolledBack,
}

/// Transaction handle with idempotent cleanup semantics: commit on a closed
/// handle fails cleanly, rollback on a closed handle is a no-op, and dropping
/// an open handle rolls back through sqlx's drop guard. A handle is owned by
/// exactly one operation and never crosses tasks.
pub struct Tx {
    inner: Option<Transaction<'static, Postgres>>,
    state: TxState,
}

impl Tx {
    pub(crate) async fn begin(
        pool: &PgPool,
        isolation: IsolationLevel,
        access: AccessMode,
    ) -> Result<Tx, TxError> {
        let mut inner = pool.begin().await?;

        // Must be the first statement of the transaction.
        let set = format!(
            "SET TRANSACTION ISOLATION LEVEL {} {}",
            isolation.sql(),
            access.sql()
        );
        sqlx::query(&set).execute(&mut *inner).await?;

        Ok(Tx {
            inner: Some(inner),
            state: TxState::Open,
        })
    }

    /// Handle with no underlying transaction, for store implementations that
    /// do not talk to Postgres. The state machine behaves identically.
    #[cfg(test)]
    pub(crate) fn detached() -> Tx {
        Tx {
            inner: None,
            state: TxState::Open,
        }
    }

    /// The live connection of an open transaction.
    pub fn conn(&mut self) -> Result<&mut PgConnection, TxError> {
        if self.state != TxState::Open {
            return Err(TxError::Closed);
        }
        match self.inner.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(TxError::Closed),
        }
    }

    /// Finalizes the transaction. The handle is unusable afterwards whether
    /// or not the commit succeeded.
    pub async fn commit(&mut self) -> Result<(), TxError> {
        if self.state != TxState::Open {
            return Err(TxError::Closed);
        }
        self.state = TxState::Committed;

        if let Some(tx) = self.inner.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    /// Rolls back the transaction. Safe to call any number of times,
    /// including after a commit.
    pub async fn rollback(&mut self) -> Result<(), TxError> {
        if self.state != TxState::Open {
            return Ok(());
        }
        self.state = TxState::RolledBack;

        if let Some(tx) = self.inner.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_is_single_shot() {
        let mut tx = Tx::detached();
        tx.commit().await.unwrap();
        assert!(matches!(tx.commit().await, Err(TxError::Closed)));
    }

    #[tokio::test]
    async fn rollback_is_idempotent() {
        let mut tx = Tx::detached();
        tx.rollback().await.unwrap();
        tx.rollback().await.unwrap();
        assert!(matches!(tx.commit().await, Err(TxError::Closed)));
    }

    #[tokio::test]
    async fn rollback_after_commit_is_a_noop() {
        let mut tx = Tx::detached();
        tx.commit().await.unwrap();
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn closed_handle_yields_no_connection() {
        let mut tx = Tx::detached();
        tx.rollback().await.unwrap();
        assert!(tx.conn().is_err());
    }
}
