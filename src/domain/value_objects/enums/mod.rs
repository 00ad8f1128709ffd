pub mod payment_statuses;
