use std::net::SocketAddr;

use tokio::net::TcpListener;

use fleetdesk::auth::jwt::JwtService;
use fleetdesk::config::AppConfig;
use fleetdesk::db;
use fleetdesk::routes;
use fleetdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    fleetdesk::init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "api",
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        server_host = %config.server_host,
        server_port = config.server_port,
        list_cache_ttl_secs = config.list_cache_ttl.as_secs(),
        "loaded fleetdesk configuration"
    );

    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    if config.run_migrations {
        let applied = db::run_migrations(&pool)?;
        tracing::info!(applied, "database migrations up to date");
    }

    let jwt = JwtService::from_config(&config)?;
    let state = AppState::new(pool, config, jwt);
    let listen_addr: SocketAddr = {
        let config = state.config.clone();
        format!("{}:{}", config.server_host, config.server_port).parse()?
    };
    let router = routes::create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, router).await?;
    Ok(())
}
