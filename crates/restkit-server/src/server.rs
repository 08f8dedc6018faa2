use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;

use crate::handlers::{
    health::{health_check, health_with_state},
    metrics::metrics_handler,
    throttle::{STATUS_VIEW, throttle_status},
    todos::{
        complete_todo, create_todo, delete_todo, get_todo, list_todos, todo_choices, todo_stats,
        todo_summary, update_todo,
    },
};
use crate::middleware::{IdentityLayer, ResponseTimeLayer, ThrottleInfoLayer, ThrottleLayer};
use crate::state::AppState;
use crate::todos::BASENAME;

/// Creates a router with the given application state and metrics handle.
///
/// The todos routes are throttled; `/throttle` only reports usage and
/// `/health` and `/metrics` are never throttled.
pub fn create_router_with_state(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let inspector = state.inspector();
    let authenticator = state.authenticator();

    // Headers por fuera para que los 429 tambien los lleven
    let todo_throttles = state.throttles_for(BASENAME);
    let todos_router = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/stats", get(todo_stats))
        .route("/todos/choices", get(todo_choices))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(update_todo)
                .patch(update_todo)
                .delete(delete_todo),
        )
        .route("/todos/{id}/summary", get(todo_summary))
        .route("/todos/{id}/complete", post(complete_todo))
        .layer(
            ServiceBuilder::new()
                .layer(ThrottleInfoLayer::new(inspector.clone(), todo_throttles.clone()))
                .layer(ThrottleLayer::new(inspector.clone(), todo_throttles)),
        )
        .with_state(state.clone());

    let status_router = Router::new()
        .route("/throttle", get(throttle_status))
        .layer(ThrottleInfoLayer::new(inspector, state.throttles_for(STATUS_VIEW)))
        .with_state(state.clone());

    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    let health_router = Router::new()
        .route("/health", get(health_with_state))
        .with_state(state);

    // Merge routers and apply middleware
    Router::new()
        .merge(todos_router)
        .merge(status_router)
        .merge(health_router)
        .merge(metrics_router)
        // Identidad resuelta antes que cualquier throttle
        .layer(IdentityLayer::new(authenticator))
        // HTTP metrics middleware
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        .layer(ResponseTimeLayer)
}

/// Creates a router without state (health endpoint only).
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .layer(ResponseTimeLayer)
}

/// Runs the server with the given state and metrics handle.
pub async fn run_server_with_state(
    addr: SocketAddr,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router_with_state(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    // ConnectInfo da la direccion del peer a los throttles
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
