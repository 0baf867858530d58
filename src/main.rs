use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use lawdesk::archival::StoredProcedureArchival;
use lawdesk::auth::jwt::SessionTokenService;
use lawdesk::config::AppConfig;
use lawdesk::db;
use lawdesk::routes::create_router;
use lawdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "api",
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        server_host = %config.server_host,
        server_port = config.server_port,
        gate_redirect_anonymous = config.gate_redirect_anonymous,
        "loaded lawdesk configuration"
    );

    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    let applied = db::run_migrations(&pool)?;
    if applied > 0 {
        tracing::info!(applied, "applied pending migrations");
    }

    let tokens = SessionTokenService::from_config(&config)?;
    let listen_addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    let state = AppState::new(pool, config, Arc::new(StoredProcedureArchival), tokens);
    let router = create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, router).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
