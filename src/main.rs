mod auth;
mod config;
mod error;
mod routes;
mod state;
mod store;

use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth::{CredentialPolicy, PresenceOnly, RegisterOnFirstLogin, TokenIssuer};
use config::{AuthPolicy, Config};
use store::{
    CredentialStore, InMemoryCredentialStore, InMemoryTaskRepository, PgCredentialStore,
    PgTaskRepository, TaskRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();

    let tasks: Arc<dyn TaskRepository>;
    let users: Arc<dyn CredentialStore>;
    match &config.database_url {
        Some(url) => {
            let db = PgPool::connect(url).await.context("Error connecting DB")?;
            sqlx::migrate!("./migrations")
                .run(&db)
                .await
                .context("Error running migrations")?;
            tracing::info!("using postgres task store");
            tasks = Arc::new(PgTaskRepository::new(db.clone()));
            users = Arc::new(PgCredentialStore::new(db));
        }
        None => {
            tracing::warn!("DATABASE_URL not set, tasks are kept in memory");
            tasks = Arc::new(InMemoryTaskRepository::new());
            users = Arc::new(InMemoryCredentialStore::new());
        }
    }

    let credentials: Arc<dyn CredentialPolicy> = match config.auth_policy {
        AuthPolicy::Presence => Arc::new(PresenceOnly),
        AuthPolicy::Registered => Arc::new(RegisterOnFirstLogin::new(users)),
    };

    let state = state::AppState {
        tasks,
        tokens: Arc::new(TokenIssuer::new(&config.jwt_secret, config.token_ttl_secs)),
        credentials,
    };

    let app = routes::routes(state, config.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("could not bind {}", config.addr()))?;

    tracing::info!("server is chilling at http://{}", config.addr());

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
