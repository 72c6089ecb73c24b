use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use k1s0_data_transfer_server::adapter::gateway::StorageConnectionTester;
use k1s0_data_transfer_server::adapter::handler::{self, AppState};
use k1s0_data_transfer_server::adapter::middleware::auth::DataTransferAuthState;
use k1s0_data_transfer_server::adapter::repository::credential_store_postgres::CredentialStorePostgresRepository;
use k1s0_data_transfer_server::adapter::repository::job_item_postgres::JobItemPostgresRepository;
use k1s0_data_transfer_server::adapter::repository::mapping_template_postgres::MappingTemplatePostgresRepository;
use k1s0_data_transfer_server::domain::repository::{
    CredentialStore, JobItemRepository, MappingTemplateRepository,
};
use k1s0_data_transfer_server::infrastructure::config::Config;
use k1s0_data_transfer_server::infrastructure::in_memory::{
    InMemoryCredentialStore, InMemoryJobItemRepository, InMemoryMappingTemplateRepository,
};
use k1s0_data_transfer_server::infrastructure::jwks_verifier::{HttpJwksFetcher, JwksVerifier};
use k1s0_data_transfer_server::infrastructure::logger::init_logger;
use k1s0_data_transfer_server::infrastructure::metrics::Metrics;

type Repositories = (
    Arc<dyn JobItemRepository>,
    Arc<dyn MappingTemplateRepository>,
    Arc<dyn CredentialStore>,
);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/config.yaml".to_string());
    let cfg = Config::load(&config_path)?;

    // Logger
    init_logger(&cfg.app.environment, &cfg.observability.log_format);

    info!(
        app_name = %cfg.app.name,
        version = %cfg.app.version,
        environment = %cfg.app.environment,
        "starting data-transfer server"
    );

    // Metrics
    let metrics = Arc::new(Metrics::new(&cfg.app.name));

    // Repositories: PostgreSQL if DATABASE_URL or database config is set, otherwise in-memory
    let (job_repo, mapping_repo, credential_store): Repositories =
        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            let max_conns = cfg.database.as_ref().map_or(25, |db| db.max_open_conns);
            let options = PgConnectOptions::from_str(&database_url)?;
            postgres_repositories(connect(options, max_conns).await?)
        } else if let Some(ref db_cfg) = cfg.database {
            postgres_repositories(connect(db_cfg.connect_options()?, db_cfg.max_open_conns).await?)
        } else {
            info!("no database configured, using in-memory repositories");
            (
                Arc::new(InMemoryJobItemRepository::new()),
                Arc::new(InMemoryMappingTemplateRepository::new()),
                Arc::new(InMemoryCredentialStore::new()),
            )
        };

    let connection_tester = Arc::new(StorageConnectionTester::new(Duration::from_secs(
        cfg.storage_test.timeout_secs,
    )));

    let mut state = AppState::new(
        job_repo,
        mapping_repo,
        credential_store,
        connection_tester,
        metrics,
    );

    // Token verifier (JWKS verifier if auth configured)
    if let Some(ref auth_cfg) = cfg.auth {
        info!(jwks_url = %auth_cfg.jwks_url, "initializing JWKS verifier for data-transfer");
        let fetcher = Arc::new(HttpJwksFetcher::new()?);
        let verifier = Arc::new(JwksVerifier::new(
            &auth_cfg.jwks_url,
            &auth_cfg.issuer,
            &auth_cfg.audience,
            Duration::from_secs(auth_cfg.jwks_cache_ttl_secs),
            fetcher,
        ));
        state = state.with_auth(DataTransferAuthState { verifier });
    } else {
        info!("no auth configured, data-transfer running without authentication");
    }

    let app = handler::router(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!("REST server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("data-transfer server stopped");
    Ok(())
}

async fn connect(options: PgConnectOptions, max_connections: u32) -> anyhow::Result<PgPool> {
    info!("connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("connected to PostgreSQL, migrations applied");
    Ok(pool)
}

fn postgres_repositories(pool: PgPool) -> Repositories {
    (
        Arc::new(JobItemPostgresRepository::new(pool.clone())),
        Arc::new(MappingTemplatePostgresRepository::new(pool.clone())),
        Arc::new(CredentialStorePostgresRepository::new(pool)),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
