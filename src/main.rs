use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canteen_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    payment::SimulatedGateway,
    routes::create_app,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,canteen_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;

    run_migrations(&pool).await?;

    let gateway = SimulatedGateway::new(config.payment_latency, config.payment_success_rate);
    tracing::info!(
        latency_ms = %config.payment_latency.as_millis(),
        success_rate = gateway.success_rate(),
        "using simulated payment gateway"
    );

    let state = AppState::new(pool, Arc::new(gateway), config.jwt_secret.as_str());
    let app = create_app(state);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
