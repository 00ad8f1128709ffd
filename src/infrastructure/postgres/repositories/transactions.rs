use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{OptionalExtension, delete, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain::{
        entities::transactions::{InsertTransactionEntity, TransactionEntity},
        repositories::transactions::TransactionRepository,
        value_objects::enums::payment_statuses::PaymentStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::transactions},
};

pub struct TransactionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl TransactionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl TransactionRepository for TransactionPostgres {
    async fn insert(&self, transaction: InsertTransactionEntity) -> Result<TransactionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let inserted = insert_into(transactions::table)
            .values(&transaction)
            .returning(TransactionEntity::as_returning())
            .get_result::<TransactionEntity>(&mut conn)?;

        Ok(inserted)
    }

    async fn find_by_id(&self, payment_id: i64) -> Result<Option<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = transactions::table
            .find(payment_id)
            .select(TransactionEntity::as_select())
            .first::<TransactionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_user_id(&self, user_id: i64) -> Result<Vec<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = transactions::table
            .filter(transactions::user_id.eq(user_id))
            .order(transactions::id.asc())
            .select(TransactionEntity::as_select())
            .load::<TransactionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_by_email(&self, email: &str) -> Result<Vec<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = transactions::table
            .filter(transactions::user_email.eq(email))
            .order(transactions::id.asc())
            .select(TransactionEntity::as_select())
            .load::<TransactionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn compare_and_set_status(
        &self,
        payment_id: i64,
        from: PaymentStatus,
        to: PaymentStatus,
        changed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // The status predicate makes the row update atomic: a concurrent
        // writer that already moved the row leaves nothing to match.
        let updated = update(
            transactions::table
                .filter(transactions::id.eq(payment_id))
                .filter(transactions::status.eq(from.as_str())),
        )
        .set((
            transactions::status.eq(to.as_str()),
            transactions::change_date.eq(changed_at),
        ))
        .execute(&mut conn)?;

        Ok(updated == 1)
    }

    async fn delete_if_status(&self, payment_id: i64, status: PaymentStatus) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(
            transactions::table
                .filter(transactions::id.eq(payment_id))
                .filter(transactions::status.eq(status.as_str())),
        )
        .execute(&mut conn)?;

        Ok(deleted == 1)
    }
}
