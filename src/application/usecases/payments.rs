use std::{sync::Arc, time::Duration};

use chrono::{SubsecRound, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    application::usecases::{
        outcome_simulator::OutcomeSimulator,
        ownership_verifier::OwnershipVerifier,
        processing_dispatcher::{ProcessingDispatcher, ProcessingJob},
    },
    domain::{
        entities::transactions::{InsertTransactionEntity, TransactionEntity},
        repositories::transactions::TransactionRepository,
        value_objects::{
            amounts,
            enums::payment_statuses::PaymentStatus,
            payments::{CreatedPaymentModel, InsertPaymentModel, PaymentModel},
        },
    },
};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("payment {0} not found")]
    NotFound(i64),
    #[error("not enough rights")]
    Unauthorized,
    #[error("ownership verification failed for payment {0}")]
    VerificationFailed(i64),
    #[error("payment {payment_id} is {status}, expected NEW")]
    InvalidState {
        payment_id: i64,
        status: PaymentStatus,
    },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type UseCaseResult<T> = std::result::Result<T, PaymentError>;

/// The payment lifecycle engine.
///
/// ```text
/// create ──► NEW ──► process ──► SUCCESS | FAIL
///        │       └─► cancel  ──► (deleted)
///        └─► ERROR
/// ```
///
/// Every status write goes through a conditional store operation keyed on
/// `NEW`, so concurrent processing or cancellation of one payment has exactly
/// one winner.
pub struct PaymentUseCase<T, O, V>
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    transaction_repository: Arc<T>,
    outcome_simulator: Arc<O>,
    ownership_verifier: Arc<V>,
    processing_dispatcher: Arc<dyn ProcessingDispatcher + Send + Sync>,
    settlement_delay: Duration,
}

impl<T, O, V> PaymentUseCase<T, O, V>
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    pub fn new(
        transaction_repository: Arc<T>,
        outcome_simulator: Arc<O>,
        ownership_verifier: Arc<V>,
        processing_dispatcher: Arc<dyn ProcessingDispatcher + Send + Sync>,
        settlement_delay: Duration,
    ) -> Self {
        Self {
            transaction_repository,
            outcome_simulator,
            ownership_verifier,
            processing_dispatcher,
            settlement_delay,
        }
    }

    pub async fn create_payment(
        &self,
        insert_payment_model: InsertPaymentModel,
    ) -> UseCaseResult<CreatedPaymentModel> {
        info!(
            user_id = insert_payment_model.user_id,
            currency = %insert_payment_model.currency,
            "payments: create payment requested"
        );

        let amount_minor = validate_new_payment(&insert_payment_model).map_err(|err| {
            warn!(
                user_id = insert_payment_model.user_id,
                error = %err,
                "payments: rejected invalid payment"
            );
            err
        })?;

        let status = if self.outcome_simulator.creation_proceeds() {
            PaymentStatus::New
        } else {
            PaymentStatus::Error
        };

        // Postgres keeps microseconds; truncating here keeps the returned and
        // stored timestamps identical.
        let now = Utc::now().trunc_subsecs(6);
        let insert_entity = InsertTransactionEntity {
            user_id: insert_payment_model.user_id,
            user_email: insert_payment_model.email,
            amount_minor,
            currency: insert_payment_model.currency,
            creation_date: now,
            change_date: now,
            status: status.to_string(),
        };

        let transaction = self
            .transaction_repository
            .insert(insert_entity)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "payments: failed to persist new payment");
                PaymentError::Store(err.context("failed to persist new payment"))
            })?;

        let payment_id = transaction.id;
        info!(%payment_id, %status, "payments: payment created");

        if status == PaymentStatus::New {
            let job = ProcessingJob {
                payment_id,
                email: transaction.user_email,
            };
            if let Err(err) = self.processing_dispatcher.dispatch(job) {
                warn!(%payment_id, error = %err, "payments: processing trigger not scheduled");
            }
        } else {
            debug!(%payment_id, "payments: payment failed at creation, nothing to process");
        }

        Ok(CreatedPaymentModel { payment_id, status })
    }

    pub async fn process_payment(&self, payment_id: i64, email: &str) -> UseCaseResult<PaymentStatus> {
        info!(%payment_id, "payments: processing requested");

        let is_owner = match self.ownership_verifier.verify(payment_id, email).await {
            Ok(is_owner) => is_owner,
            Err(PaymentError::NotFound(_)) => {
                warn!(%payment_id, "payments: ownership verification found no payment");
                return Err(PaymentError::VerificationFailed(payment_id));
            }
            Err(err) => {
                error!(%payment_id, error = %err, "payments: ownership verification failed");
                return Err(err);
            }
        };
        if !is_owner {
            warn!(%payment_id, "payments: processing refused, email does not match");
            return Err(PaymentError::Unauthorized);
        }

        let transaction = self.load(payment_id).await?;
        let current = parse_status(&transaction)?;
        if !current.can_transition_to(PaymentStatus::Success) {
            warn!(%payment_id, status = %current, "payments: processing refused for settled payment");
            return Err(PaymentError::InvalidState {
                payment_id,
                status: current,
            });
        }

        if !self.settlement_delay.is_zero() {
            debug!(
                %payment_id,
                delay_ms = self.settlement_delay.as_millis() as u64,
                "payments: waiting for settlement"
            );
            tokio::time::sleep(self.settlement_delay).await;
        }

        let outcome = if self.outcome_simulator.processing_succeeds() {
            PaymentStatus::Success
        } else {
            PaymentStatus::Fail
        };

        let changed_at = Utc::now().trunc_subsecs(6);
        let applied = self
            .transaction_repository
            .compare_and_set_status(payment_id, PaymentStatus::New, outcome, changed_at)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: failed to store processing outcome");
                PaymentError::Store(err.context(format!(
                    "failed to store processing outcome for payment {payment_id}"
                )))
            })?;

        if !applied {
            let err = self.refusal_after_lost_race(payment_id).await;
            warn!(%payment_id, error = %err, "payments: lost processing race");
            return Err(err);
        }

        info!(%payment_id, status = %outcome, "payments: payment processed");
        Ok(outcome)
    }

    pub async fn get_status(&self, payment_id: i64) -> UseCaseResult<PaymentStatus> {
        let transaction = self.load(payment_id).await?;
        parse_status(&transaction)
    }

    pub async fn list_by_user_id(&self, user_id: i64) -> UseCaseResult<Vec<PaymentModel>> {
        let transactions = self
            .transaction_repository
            .list_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "payments: failed to list payments by user");
                PaymentError::Store(err.context(format!("failed to list payments of user {user_id}")))
            })?;

        debug!(user_id, count = transactions.len(), "payments: listed payments by user");
        to_models(&transactions)
    }

    pub async fn list_by_email(&self, email: &str) -> UseCaseResult<Vec<PaymentModel>> {
        let transactions = self
            .transaction_repository
            .list_by_email(email)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "payments: failed to list payments by email");
                PaymentError::Store(err.context("failed to list payments by email"))
            })?;

        debug!(count = transactions.len(), "payments: listed payments by email");
        to_models(&transactions)
    }

    pub async fn cancel_payment(&self, payment_id: i64) -> UseCaseResult<()> {
        info!(%payment_id, "payments: cancellation requested");

        let transaction = self.load(payment_id).await?;
        let current = parse_status(&transaction)?;
        if !current.is_cancellable() {
            warn!(%payment_id, status = %current, "payments: cancellation refused");
            return Err(PaymentError::InvalidState {
                payment_id,
                status: current,
            });
        }

        let deleted = self
            .transaction_repository
            .delete_if_status(payment_id, PaymentStatus::New)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: failed to delete payment");
                PaymentError::Store(err.context(format!("failed to delete payment {payment_id}")))
            })?;

        if !deleted {
            let err = self.refusal_after_lost_race(payment_id).await;
            warn!(%payment_id, error = %err, "payments: lost cancellation race");
            return Err(err);
        }

        info!(%payment_id, "payments: payment cancelled");
        Ok(())
    }

    async fn load(&self, payment_id: i64) -> UseCaseResult<TransactionEntity> {
        self.transaction_repository
            .find_by_id(payment_id)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: failed to load payment");
                PaymentError::Store(err.context(format!("failed to load payment {payment_id}")))
            })?
            .ok_or(PaymentError::NotFound(payment_id))
    }

    /// Explains a conditional write that matched nothing by looking at what
    /// the winner left behind.
    async fn refusal_after_lost_race(&self, payment_id: i64) -> PaymentError {
        match self.load(payment_id).await {
            Ok(transaction) => match parse_status(&transaction) {
                Ok(status) => PaymentError::InvalidState { payment_id, status },
                Err(err) => err,
            },
            Err(err) => err,
        }
    }
}

fn validate_new_payment(model: &InsertPaymentModel) -> UseCaseResult<i64> {
    if model.user_id == 0 {
        return Err(PaymentError::InvalidInput("userID must be non-zero".to_string()));
    }
    if model.email.is_empty() {
        return Err(PaymentError::InvalidInput("email is required".to_string()));
    }
    if !validator::validate_email(model.email.as_str()) {
        return Err(PaymentError::InvalidInput(format!(
            "email {:?} is not a valid address",
            model.email
        )));
    }
    if model.currency.trim().is_empty() {
        return Err(PaymentError::InvalidInput("currency is required".to_string()));
    }

    amounts::to_minor_units(model.sum).map_err(|err| PaymentError::InvalidInput(err.to_string()))
}

fn parse_status(transaction: &TransactionEntity) -> UseCaseResult<PaymentStatus> {
    transaction
        .payment_status()
        .map_err(|err| PaymentError::Store(err.context(format!("payment {} has a corrupt status", transaction.id))))
}

fn to_models(transactions: &[TransactionEntity]) -> UseCaseResult<Vec<PaymentModel>> {
    transactions
        .iter()
        .map(|transaction| transaction.to_model().map_err(PaymentError::Store))
        .collect()
}
