pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod observability;

use anyhow::Result;
use application::{
    usecases::{
        outcome_simulator::RandomOutcomeSimulator, ownership_verifier::EmailOwnershipVerifier,
        payments::PaymentUseCase, processing_dispatcher::processing_queue,
    },
    workers::settlement_worker,
};
use config::{config_loader, config_model::DotEnvyConfig};
use domain::repositories::transactions::TransactionRepository;
use infrastructure::{
    axum_http::http_serve,
    in_memory::transactions::TransactionInMemory,
    postgres::{postgres_connection, repositories::transactions::TransactionPostgres},
};
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

pub async fn run() -> Result<()> {
    let dotenvy_env = Arc::new(config_loader::load()?);
    info!("ENV has been loaded");

    match &dotenvy_env.database {
        Some(database) => {
            let postgres_pool = postgres_connection::establish_connection(&database.url)?;
            info!("Postgres connection has been established");

            let repository = Arc::new(TransactionPostgres::new(Arc::new(postgres_pool)));
            serve(dotenvy_env, repository).await
        }
        None => {
            warn!("DATABASE_URL is not set; payments are kept in memory");
            serve(dotenvy_env, Arc::new(TransactionInMemory::new())).await
        }
    }
}

async fn serve<T>(dotenvy_env: Arc<DotEnvyConfig>, transaction_repository: Arc<T>) -> Result<()>
where
    T: TransactionRepository + Send + Sync + 'static,
{
    let processing = &dotenvy_env.processing;

    let outcome_simulator = Arc::new(match processing.simulator_seed {
        Some(seed) => {
            info!(seed, "Outcome simulator is seeded");
            RandomOutcomeSimulator::seeded(seed)
        }
        None => RandomOutcomeSimulator::from_entropy(),
    });
    let ownership_verifier = Arc::new(EmailOwnershipVerifier::new(Arc::clone(
        &transaction_repository,
    )));
    let (processing_dispatcher, processing_jobs) = processing_queue(processing.queue_capacity);

    let payment_usecase = Arc::new(PaymentUseCase::new(
        transaction_repository,
        outcome_simulator,
        ownership_verifier,
        Arc::new(processing_dispatcher),
        Duration::from_millis(processing.delay_ms),
    ));

    let settlement_loop = tokio::spawn(settlement_worker::run(
        processing_jobs,
        Arc::clone(&payment_usecase),
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let http_server =
        tokio::spawn(async move { http_serve::start(server_config, payment_usecase).await });

    tokio::select! {
        result = http_server => result??,
        result = settlement_loop => result?,
    };

    Ok(())
}
