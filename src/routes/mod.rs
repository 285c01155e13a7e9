use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::path::Path;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

mod auth;
mod health;
mod middleware_auth;
mod tasks;

pub use auth::login;
pub use health::health;

use crate::state::AppState;

/// Builds the application. Paths no route matches are served from
/// `static_dir` when one is given.
pub fn routes(state: AppState, static_dir: Option<&Path>) -> Router {
    let task_router = Router::new()
        .route("/", post(tasks::routes::create).get(tasks::routes::list))
        .route(
            "/{id}",
            put(tasks::routes::update).delete(tasks::routes::delete),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_auth::require_auth,
        ));

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .route("/login", post(login))
                .nest("/tasks", task_router),
        );

    if let Some(dir) = static_dir {
        tracing::info!("serving static client from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "ToDo API is running."
}
