use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::domain::{
    entities::transactions::{InsertTransactionEntity, TransactionEntity},
    value_objects::enums::payment_statuses::PaymentStatus,
};

#[async_trait]
#[automock]
pub trait TransactionRepository {
    async fn insert(&self, transaction: InsertTransactionEntity) -> Result<TransactionEntity>;
    async fn find_by_id(&self, payment_id: i64) -> Result<Option<TransactionEntity>>;
    async fn list_by_user_id(&self, user_id: i64) -> Result<Vec<TransactionEntity>>;
    async fn list_by_email(&self, email: &str) -> Result<Vec<TransactionEntity>>;

    /// Moves the row from `from` to `to` only if it is still in `from`.
    /// Returns `false` when the row is missing or already left `from`.
    async fn compare_and_set_status(
        &self,
        payment_id: i64,
        from: PaymentStatus,
        to: PaymentStatus,
        changed_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Deletes the row only if it is still in `status`.
    async fn delete_if_status(&self, payment_id: i64, status: PaymentStatus) -> Result<bool>;
}
