use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::{
    application::usecases::payments::{PaymentError, UseCaseResult},
    domain::repositories::transactions::TransactionRepository,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OwnershipVerifier {
    /// Fails with `PaymentError::NotFound` when the payment does not exist,
    /// otherwise reports whether `email` is the owner email on file.
    async fn verify(&self, payment_id: i64, email: &str) -> UseCaseResult<bool>;
}

/// Authorises by possession of the original email: the comparison is exact
/// and case-sensitive.
pub struct EmailOwnershipVerifier<T>
where
    T: TransactionRepository + Send + Sync + 'static,
{
    transaction_repository: Arc<T>,
}

impl<T> EmailOwnershipVerifier<T>
where
    T: TransactionRepository + Send + Sync + 'static,
{
    pub fn new(transaction_repository: Arc<T>) -> Self {
        Self {
            transaction_repository,
        }
    }
}

#[async_trait]
impl<T> OwnershipVerifier for EmailOwnershipVerifier<T>
where
    T: TransactionRepository + Send + Sync + 'static,
{
    async fn verify(&self, payment_id: i64, email: &str) -> UseCaseResult<bool> {
        let transaction = self
            .transaction_repository
            .find_by_id(payment_id)
            .await
            .map_err(|err| {
                PaymentError::Store(err.context(format!(
                    "failed to load payment {payment_id} for ownership check"
                )))
            })?
            .ok_or(PaymentError::NotFound(payment_id))?;

        let matched = transaction.user_email == email;
        debug!(%payment_id, matched, "ownership_verifier: email compared");
        Ok(matched)
    }
}
