//! Bookstore API server binary.
//!
//! Connects to PostgreSQL, runs migrations, provisions any seed accounts and
//! serves the catalog API until interrupted.

mod seed;

use std::sync::Arc;

use bookstore_api::config::ApiConfig;
use bookstore_api::{AppState, router};
use bookstore_core::auth::queries::PgCredentialStore;
use bookstore_core::catalog::queries::{PgAuthorRepository, PgBookRepository};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "bookstore_api_server", about = "Bookstore catalog API server")]
struct Args {
    /// Address to listen on. Overrides `BIND_ADDR`.
    #[arg(long)]
    bind: Option<String>,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Skip running embedded migrations at startup.
    #[arg(long, default_value_t = false)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,bookstore_api=debug,bookstore_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(url) = args.database_url {
        config.pg_connection_url = url;
    }

    info!(
        bind_addr = %config.bind_addr,
        max_connections = args.max_connections,
        issuer = %config.jwt.issuer,
        expiration_minutes = config.jwt.expiration_minutes,
        "starting bookstore_api_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.pg_connection_url)
        .await?;

    if args.skip_migrations {
        info!("skipping database migrations");
    } else {
        info!("running database migrations");
        bookstore_core::migrate::migrate(&pool).await?;
    }

    let credentials = Arc::new(PgCredentialStore::new(pool.clone()));
    let state = AppState::new(
        config.clone(),
        credentials.clone(),
        Arc::new(PgAuthorRepository::new(pool.clone())),
        Arc::new(PgBookRepository::new(pool)),
    );

    seed::seed_accounts(&state.auth, credentials.as_ref(), &seed::accounts_from_env()).await?;

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
