use anyhow::Result;
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::transactions::TransactionEntity,
    value_objects::{amounts, enums::payment_statuses::PaymentStatus},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentModel {
    pub id: i64,
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
    pub currency: String,
    #[serde(rename = "creationDate")]
    pub creation_date: DateTime<Local>,
    #[serde(rename = "changeDate")]
    pub change_date: DateTime<Local>,
    pub status: PaymentStatus,
}

impl TransactionEntity {
    pub fn payment_status(&self) -> Result<PaymentStatus> {
        self.status.parse()
    }

    pub fn to_model(&self) -> Result<PaymentModel> {
        Ok(PaymentModel {
            id: self.id,
            user_id: self.user_id,
            email: self.user_email.clone(),
            sum: amounts::from_minor_units(self.amount_minor),
            currency: self.currency.clone(),
            creation_date: self.creation_date.with_timezone(&Local),
            change_date: self.change_date.with_timezone(&Local),
            status: self.payment_status()?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsertPaymentModel {
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CreatedPaymentModel {
    #[serde(rename = "paymentID")]
    pub payment_id: i64,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessPaymentModel {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentsByEmailModel {
    pub email: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CancelledPaymentModel {
    #[serde(rename = "paymentID")]
    pub payment_id: i64,
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn sample_entity() -> TransactionEntity {
        TransactionEntity {
            id: 114,
            user_id: 1,
            user_email: "ann@mail.ru".to_string(),
            amount_minor: 100000,
            currency: "KZ".to_string(),
            creation_date: Utc.timestamp_opt(1_654_951_547, 724_748_000).unwrap(),
            change_date: Utc.timestamp_opt(1_654_951_642, 683_292_000).unwrap(),
            status: "SUCCESS".to_string(),
        }
    }

    #[test]
    fn entity_maps_to_model() {
        let model = sample_entity().to_model().unwrap();

        assert_eq!(model.id, 114);
        assert_eq!(model.sum, dec!(1000));
        assert_eq!(model.status, PaymentStatus::Success);
        assert_eq!(model.creation_date, sample_entity().creation_date);
    }

    #[test]
    fn unknown_stored_status_is_an_error() {
        let mut entity = sample_entity();
        entity.status = "PENDING".to_string();

        assert!(entity.to_model().is_err());
    }

    #[test]
    fn payment_json_round_trips_timestamps_exactly() {
        let model = sample_entity().to_model().unwrap();

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["userID"], 1);
        assert_eq!(json["sum"], 1000.0);
        assert_eq!(json["status"], "SUCCESS");

        let decoded: PaymentModel = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, model);
    }

    #[test]
    fn creation_request_accepts_float_sum() {
        let body = r#"{"userID":1,"email":"ann@mail.ru","sum":502.3,"currency":"USD"}"#;
        let model: InsertPaymentModel = serde_json::from_str(body).unwrap();

        assert_eq!(model.user_id, 1);
        assert_eq!(model.sum, dec!(502.3));
        assert_eq!(model.currency, "USD");
    }
}
