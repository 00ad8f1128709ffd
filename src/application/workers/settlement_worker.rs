use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    application::usecases::{
        outcome_simulator::OutcomeSimulator,
        ownership_verifier::OwnershipVerifier,
        payments::{PaymentError, PaymentUseCase},
        processing_dispatcher::{ProcessingJob, ProcessingReceiver},
    },
    domain::repositories::transactions::TransactionRepository,
};

/// Drains the processing queue, settling every job on its own task so one
/// slow settlement never holds back the others. Returns once every dispatcher
/// has been dropped.
pub async fn run<T, O, V>(mut jobs: ProcessingReceiver, usecase: Arc<PaymentUseCase<T, O, V>>)
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    info!("settlement worker: started");

    while let Some(job) = jobs.recv().await {
        spawn_settlement(Arc::clone(&usecase), job);
    }

    info!("settlement worker: queue closed, stopping");
}

fn spawn_settlement<T, O, V>(usecase: Arc<PaymentUseCase<T, O, V>>, job: ProcessingJob)
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let payment_id = job.payment_id;
        match usecase.process_payment(payment_id, &job.email).await {
            Ok(status) => {
                info!(%payment_id, %status, "settlement worker: payment settled");
            }
            Err(err @ PaymentError::Store(_)) => {
                error!(%payment_id, error = ?err, "settlement worker: settlement failed");
            }
            Err(err) => {
                warn!(%payment_id, error = %err, "settlement worker: settlement refused");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::usecases::{
            outcome_simulator::MockOutcomeSimulator,
            ownership_verifier::EmailOwnershipVerifier,
            processing_dispatcher::{ProcessingDispatcher, processing_queue},
        },
        domain::value_objects::{enums::payment_statuses::PaymentStatus, payments::InsertPaymentModel},
        infrastructure::in_memory::transactions::TransactionInMemory,
    };
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[tokio::test]
    async fn settles_created_payments_in_the_background() {
        let repository = Arc::new(TransactionInMemory::new());
        let verifier = EmailOwnershipVerifier::new(Arc::clone(&repository));
        let mut simulator = MockOutcomeSimulator::new();
        simulator.expect_creation_proceeds().return_const(true);
        simulator.expect_processing_succeeds().return_const(true);
        let (dispatcher, jobs) = processing_queue(8);
        let dispatcher: Arc<dyn ProcessingDispatcher + Send + Sync> = Arc::new(dispatcher);

        let usecase = Arc::new(PaymentUseCase::new(
            repository,
            Arc::new(simulator),
            Arc::new(verifier),
            Arc::clone(&dispatcher),
            Duration::ZERO,
        ));
        let worker = tokio::spawn(run(jobs, Arc::clone(&usecase)));

        let created = usecase
            .create_payment(InsertPaymentModel {
                user_id: 1,
                email: "ann@mail.ru".to_string(),
                sum: dec!(502.3),
                currency: "USD".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(created.status, PaymentStatus::New);

        let mut status = PaymentStatus::New;
        for _ in 0..100 {
            status = usecase.get_status(created.payment_id).await.unwrap();
            if status != PaymentStatus::New {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(status, PaymentStatus::Success);

        worker.abort();
    }

    #[tokio::test]
    async fn refused_jobs_do_not_stop_the_worker() {
        let repository = Arc::new(TransactionInMemory::new());
        let verifier = EmailOwnershipVerifier::new(Arc::clone(&repository));
        let (dispatcher, jobs) = processing_queue(8);
        let usecase = Arc::new(PaymentUseCase::new(
            repository,
            Arc::new(MockOutcomeSimulator::new()),
            Arc::new(verifier),
            Arc::new(dispatcher.clone()),
            Duration::ZERO,
        ));
        let worker = tokio::spawn(run(jobs, Arc::clone(&usecase)));

        dispatcher
            .dispatch(ProcessingJob {
                payment_id: 404,
                email: "ghost@mail.ru".to_string(),
            })
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(!worker.is_finished());
        assert!(matches!(
            usecase.get_status(404).await,
            Err(PaymentError::NotFound(404))
        ));
        worker.abort();
    }

    #[tokio::test]
    async fn stops_when_the_queue_closes() {
        let repository = Arc::new(TransactionInMemory::new());
        let verifier = EmailOwnershipVerifier::new(Arc::clone(&repository));
        let (unused_dispatcher, _unused_jobs) = processing_queue(1);
        let usecase = Arc::new(PaymentUseCase::new(
            repository,
            Arc::new(MockOutcomeSimulator::new()),
            Arc::new(verifier),
            Arc::new(unused_dispatcher),
            Duration::ZERO,
        ));
        let (dispatcher, jobs) = processing_queue(1);
        let worker = tokio::spawn(run(jobs, usecase));

        drop(dispatcher);

        tokio::time::timeout(Duration::from_secs(1), worker)
            .await
            .unwrap()
            .unwrap();
    }
}
