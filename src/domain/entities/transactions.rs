use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infrastructure::postgres::schema::transactions;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = transactions)]
pub struct TransactionEntity {
    pub id: i64,
    pub user_id: i64,
    pub user_email: String,
    pub amount_minor: i64,
    pub currency: String,
    pub creation_date: DateTime<Utc>,
    pub change_date: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = transactions)]
pub struct InsertTransactionEntity {
    pub user_id: i64,
    pub user_email: String,
    pub amount_minor: i64,
    pub currency: String,
    pub creation_date: DateTime<Utc>,
    pub change_date: DateTime<Utc>,
    pub status: String,
}

impl InsertTransactionEntity {
    pub fn into_entity(self, id: i64) -> TransactionEntity {
        TransactionEntity {
            id,
            user_id: self.user_id,
            user_email: self.user_email,
            amount_minor: self.amount_minor,
            currency: self.currency,
            creation_date: self.creation_date,
            change_date: self.change_date,
            status: self.status,
        }
    }
}
