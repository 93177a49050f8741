//! Transaction Coordinator
//!
//! Groups slot and reservation writes into one all-or-nothing unit:
//! - `run_atomic`: open a unit, run the work, commit on `Ok`, roll back on `Err`
//! - `run_atomic_within`: same, with an explicit deadline
//! - `run_nested`: run more work inside an already-open unit
//!
//! The deadline bounds opening the unit and running the work, which is where
//! every lock wait happens. When it expires the unit is dropped, which
//! discards its writes, and `DomainError::Timeout` is returned.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::{TransactionalStore, UnitOfWork};
use crate::error::DomainError;

/// Runs closures against a fresh unit of work from the store
pub struct TransactionCoordinator<S>
where
    S: TransactionalStore,
{
    store: Arc<S>,
    default_deadline: Duration,
}

impl<S> TransactionCoordinator<S>
where
    S: TransactionalStore,
{
    pub fn new(store: Arc<S>, default_deadline: Duration) -> Self {
        Self {
            store,
            default_deadline,
        }
    }

    pub fn default_deadline(&self) -> Duration {
        self.default_deadline
    }

    /// Run `work` atomically using the default deadline
    pub async fn run_atomic<T, F, Fut>(&self, work: F) -> Result<T, DomainError>
    where
        T: Send,
        F: FnOnce(Arc<S::Unit>) -> Fut + Send,
        Fut: Future<Output = Result<T, DomainError>> + Send,
    {
        self.run_atomic_within(self.default_deadline, work).await
    }

    /// Run `work` atomically, giving up after `deadline`
    ///
    /// Errors raised by `work` are returned unchanged after the rollback.
    pub async fn run_atomic_within<T, F, Fut>(
        &self,
        deadline: Duration,
        work: F,
    ) -> Result<T, DomainError>
    where
        T: Send,
        F: FnOnce(Arc<S::Unit>) -> Fut + Send,
        Fut: Future<Output = Result<T, DomainError>> + Send,
    {
        let attempt = async {
            let unit = Arc::new(self.store.begin(deadline).await?);
            let outcome = work(Arc::clone(&unit)).await;
            Ok::<_, DomainError>((unit, outcome))
        };

        let (unit, outcome) = match tokio::time::timeout(deadline, attempt).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    deadline_ms = deadline.as_millis() as u64,
                    "Unit of work exceeded its deadline, rolled back"
                );
                return Err(DomainError::Timeout(format!(
                    "Unit of work did not complete within {}ms",
                    deadline.as_millis()
                )));
            }
        };

        match outcome {
            Ok(value) => {
                let unit = Arc::try_unwrap(unit).map_err(|_| {
                    DomainError::Internal(
                        "Unit of work is still referenced after its work finished".to_string(),
                    )
                })?;
                unit.commit().await?;
                Ok(value)
            }
            Err(err) => {
                match Arc::try_unwrap(unit) {
                    Ok(unit) => {
                        if let Err(rollback_err) = unit.rollback().await {
                            tracing::error!(error = %rollback_err, "Rollback failed");
                        }
                    }
                    // The last handle to go away discards the writes
                    Err(_) => tracing::warn!("Unit of work still referenced at rollback"),
                }
                tracing::debug!(kind = err.kind(), "Unit of work rolled back");
                Err(err)
            }
        }
    }

    /// Run `work` inside an outer unit; the outer scope commits or rolls back
    pub async fn run_nested<T, F, Fut>(&self, outer: &Arc<S::Unit>, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(Arc<S::Unit>) -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        work(Arc::clone(outer)).await
    }
}
