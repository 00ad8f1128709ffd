use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::{
    entities::transactions::{InsertTransactionEntity, TransactionEntity},
    repositories::transactions::TransactionRepository,
    value_objects::enums::payment_statuses::PaymentStatus,
};

#[derive(Debug, Default)]
struct TransactionTable {
    last_id: i64,
    rows: BTreeMap<i64, TransactionEntity>,
}

/// Process-local transaction store.
///
/// Ids are assigned from 1 upwards and listings come back in id order, which
/// is also insertion order. Conditional updates run under the write lock so a
/// status check and its write cannot interleave with another writer.
#[derive(Debug, Default)]
pub struct TransactionInMemory {
    table: RwLock<TransactionTable>,
}

impl TransactionInMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for TransactionInMemory {
    async fn insert(&self, transaction: InsertTransactionEntity) -> Result<TransactionEntity> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let entity = transaction.into_entity(table.last_id);
        table.rows.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, payment_id: i64) -> Result<Option<TransactionEntity>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&payment_id).cloned())
    }

    async fn list_by_user_id(&self, user_id: i64) -> Result<Vec<TransactionEntity>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_email(&self, email: &str) -> Result<Vec<TransactionEntity>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|row| row.user_email == email)
            .cloned()
            .collect())
    }

    async fn compare_and_set_status(
        &self,
        payment_id: i64,
        from: PaymentStatus,
        to: PaymentStatus,
        changed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&payment_id) {
            Some(row) if row.status == from.as_str() => {
                row.status = to.to_string();
                row.change_date = changed_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_if_status(&self, payment_id: i64, status: PaymentStatus) -> Result<bool> {
        let mut table = self.table.write().await;
        let matches = table
            .rows
            .get(&payment_id)
            .is_some_and(|row| row.status == status.as_str());
        if matches {
            table.rows.remove(&payment_id);
        }
        Ok(matches)
    }
}
