use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;

use crate::{
    application::usecases::{
        outcome_simulator::OutcomeSimulator,
        ownership_verifier::OwnershipVerifier,
        payments::{PaymentError, PaymentUseCase},
    },
    domain::{
        repositories::transactions::TransactionRepository,
        value_objects::payments::{
            CancelledPaymentModel, InsertPaymentModel, PaymentsByEmailModel, ProcessPaymentModel,
        },
    },
};

pub fn routes<T, O, V>(payment_usecase: Arc<PaymentUseCase<T, O, V>>) -> Router
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    Router::new()
        .route("/new", post(create_payment::<T, O, V>))
        .route("/status/:payment_id", get(payment_status::<T, O, V>))
        .route("/processing/:payment_id", post(process_payment::<T, O, V>))
        .route("/by-user-id/:user_id", get(list_by_user_id::<T, O, V>))
        .route("/by-email", get(list_by_email::<T, O, V>))
        .route("/cancel/:payment_id", post(cancel_payment::<T, O, V>))
        .with_state(payment_usecase)
}

pub async fn create_payment<T, O, V>(
    State(payment_usecase): State<Arc<PaymentUseCase<T, O, V>>>,
    payload: Result<Json<InsertPaymentModel>, JsonRejection>,
) -> Result<impl IntoResponse, PaymentError>
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    let Json(insert_payment_model) = payload?;
    let created = payment_usecase.create_payment(insert_payment_model).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn payment_status<T, O, V>(
    State(payment_usecase): State<Arc<PaymentUseCase<T, O, V>>>,
    payment_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, PaymentError>
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    let Path(payment_id) = payment_id?;
    let status = payment_usecase.get_status(payment_id).await?;

    Ok(Json(status))
}

pub async fn process_payment<T, O, V>(
    State(payment_usecase): State<Arc<PaymentUseCase<T, O, V>>>,
    payment_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProcessPaymentModel>, JsonRejection>,
) -> Result<impl IntoResponse, PaymentError>
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    let Path(payment_id) = payment_id?;
    let Json(process_payment_model) = payload?;
    info!(%payment_id, "payments router: processing request received");

    let status = payment_usecase
        .process_payment(payment_id, &process_payment_model.email)
        .await?;

    Ok(Json(status))
}

pub async fn list_by_user_id<T, O, V>(
    State(payment_usecase): State<Arc<PaymentUseCase<T, O, V>>>,
    user_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, PaymentError>
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    let Path(user_id) = user_id?;
    let payments = payment_usecase.list_by_user_id(user_id).await?;

    Ok(Json(payments))
}

pub async fn list_by_email<T, O, V>(
    State(payment_usecase): State<Arc<PaymentUseCase<T, O, V>>>,
    payload: Result<Json<PaymentsByEmailModel>, JsonRejection>,
) -> Result<impl IntoResponse, PaymentError>
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    let Json(by_email_model) = payload?;
    let payments = payment_usecase.list_by_email(&by_email_model.email).await?;

    Ok(Json(payments))
}

pub async fn cancel_payment<T, O, V>(
    State(payment_usecase): State<Arc<PaymentUseCase<T, O, V>>>,
    payment_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, PaymentError>
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    let Path(payment_id) = payment_id?;
    payment_usecase.cancel_payment(payment_id).await?;

    Ok(Json(CancelledPaymentModel {
        payment_id,
        cancelled: true,
    }))
}
