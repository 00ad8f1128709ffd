use crate::{
    application::usecases::{
        outcome_simulator::OutcomeSimulator, ownership_verifier::OwnershipVerifier,
        payments::PaymentUseCase,
    },
    config::config_model::DotEnvyConfig,
    domain::repositories::transactions::TransactionRepository,
    infrastructure::axum_http::{default_routers, routers},
};
use anyhow::Result;
use axum::{Router, http::Method, routing::get};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

pub fn app<T, O, V>(config: &DotEnvyConfig, payment_usecase: Arc<PaymentUseCase<T, O, V>>) -> Result<Router>
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest("/api/v1/payments", routers::payments::routes(payment_usecase))
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(RequestBodyLimitLayer::new(
            (config.server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

pub async fn start<T, O, V>(
    config: Arc<DotEnvyConfig>,
    payment_usecase: Arc<PaymentUseCase<T, O, V>>,
) -> Result<()>
where
    T: TransactionRepository + Send + Sync + 'static,
    O: OutcomeSimulator + Send + Sync + 'static,
    V: OwnershipVerifier + Send + Sync + 'static,
{
    let app = app(&config, payment_usecase)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(port = config.server.port, "Server is running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
