mod auth;
mod clock;
mod config;
mod dao;
mod error;
mod gateway;
#[cfg(test)]
mod memory;
mod model;
mod routes;
mod service;
mod store;
mod utils;

use axum::serve;
use clock::{Clock, SystemClock};
use config::Config;
use dao::PgStore;
use dotenvy::dotenv;
use routes::{create_router, AppState};
use service::ShareLinkService;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_TRACING_LEVEL: &str = "profile_share=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    _ = dotenv();
    let config = Config::from_env();
    configure_tracing();
    let db_connection_pool = create_db_connection_pool(&config).await;
    run_migrations(&db_connection_pool).await;

    let store = Arc::new(PgStore::new(db_connection_pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState::new(config.clone(), store.clone(), store, clock);
    if let Some(cron_expression) = &config.sweep_cron {
        configure_scheduler(cron_expression, state.share_links.clone()).await;
    }

    let listener = create_listener(&config.server_address).await;
    serve(listener, create_router(state))
        .await
        .expect("Server failed to start");
}

fn configure_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or(DEFAULT_TRACING_LEVEL.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn create_db_connection_pool(config: &Config) -> Pool<Postgres> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .expect("Creating database connection pool failed")
}

async fn run_migrations(db_connection_pool: &Pool<Postgres>) {
    sqlx::migrate!("./migrations")
        .run(db_connection_pool)
        .await
        .expect("Running database migrations failed");
}

async fn configure_scheduler(cron_expression: &str, share_links: ShareLinkService) {
    let scheduler = JobScheduler::new()
        .await
        .expect("Creating scheduler failed");
    scheduler
        .add(create_sweep_job(cron_expression, share_links))
        .await
        .expect("Adding sweep job to scheduler failed");
    scheduler.start().await.expect("Starting scheduler failed");
    tracing::info!("Scheduled expiry sweep: {}", cron_expression);
}

fn create_sweep_job(cron_expression: &str, share_links: ShareLinkService) -> Job {
    Job::new_async(cron_expression, move |_, _| {
        let share_links = share_links.clone();
        Box::pin(async move {
            if let Err(err) = share_links.expire_sweep().await {
                tracing::error!("Scheduled expiry sweep failed: {}", err);
            }
        })
    })
    .expect("Creating sweep job failed")
}

async fn create_listener(server_address: &str) -> TcpListener {
    let listener = TcpListener::bind(&server_address)
        .await
        .expect("Creating tcp listener failed");
    tracing::info!("Listening on address: {}", server_address);
    listener
}
