use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use parkade_server::config::Config;
use parkade_server::lifecycle::TicketService;
use parkade_server::routes::{create_routes, AppState};
use parkade_server::store::PgTicketStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let store = Arc::new(PgTicketStore::new(pool));
    let service = Arc::new(TicketService::new(store, config.rates));
    let app: Router = create_routes(AppState { service });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Parkade server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
