use crate::core::api::*;

use axum::{error_handling::HandleErrorLayer, http::StatusCode, routing::get, Router};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tokio::time;
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

/// Longer than a node check so a slow node never trips the request timeout.
const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);

pub fn router(app_state: Arc<AppState>) -> Router {
    // Compose the routes
    Router::new()
        .route("/", get(dashboard))
        .route("/api/status", get(status_index))
        .route("/styles.css", get(styles_css))
        .route("/script.js", get(script_js))
        // Add middleware to all routes
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|error: BoxError| async move {
                    if error.is::<tower::timeout::error::Elapsed>() {
                        Ok(StatusCode::REQUEST_TIMEOUT)
                    } else {
                        Err((
                            StatusCode::INTERNAL_SERVER_ERROR,
                            format!("Unhandled internal error: {}", error),
                        ))
                    }
                }))
                .timeout(REQUEST_TIMEOUT)
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
        .with_state(app_state)
}

/// Serves the dashboard on `addr` until `shutdown` resolves.
pub async fn listen(
    addr: SocketAddr,
    app_state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), BoxError> {
    let app = router(app_state);
    tracing::info!("listening on {}", addr);
    axum::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
