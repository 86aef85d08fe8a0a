use std::net::SocketAddr;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use super::errors::GifError;
use super::tenor::TenorClient;
use super::types::{ErrorResponse, GifQuery, GifResponse};

pub const GIFS_ROUTE: &str = "/api/gifs";

const NO_CACHE_HEADERS: [(HeaderName, &str); 3] = [
    (
        CACHE_CONTROL,
        "no-store, no-cache, must-revalidate, proxy-revalidate",
    ),
    (PRAGMA, "no-cache"),
    (EXPIRES, "0"),
];

/// Router exposing the GIF search endpoint.
pub fn router(tenor: TenorClient) -> Router {
    Router::new()
        .route(GIFS_ROUTE, get(get_gif))
        .with_state(tenor)
}

async fn get_gif(
    State(tenor): State<TenorClient>,
    query: Result<Query<GifQuery>, QueryRejection>,
) -> Response {
    // An unreadable query string (e.g. `q` given twice) counts as no term.
    let term = match &query {
        Ok(Query(query)) => query.q.as_deref().filter(|term| !term.is_empty()),
        Err(rejection) => {
            tracing::debug!(target: "gifs", error = %rejection, "Malformed GIF query");
            None
        }
    };

    let result = match term {
        Some(term) => tenor.search(term).await,
        None => Err(GifError::MissingTerm),
    };

    match result {
        Ok(gif) => {
            tracing::info!(target: "gifs", "Served GIF");
            (StatusCode::OK, NO_CACHE_HEADERS, Json(GifResponse { gif })).into_response()
        }
        Err(e) => {
            if matches!(e, GifError::MissingTerm) {
                tracing::debug!(target: "gifs", "Rejected GIF request without search term");
            } else {
                tracing::error!(target: "gifs", error = %e, "Error fetching GIF");
            }
            (
                e.status(),
                NO_CACHE_HEADERS,
                Json(ErrorResponse {
                    error: e.public_message().to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Serves the proxy until Ctrl-C.
pub async fn serve(addr: SocketAddr, tenor: TenorClient) -> std::io::Result<()> {
    if !tenor.has_api_key() {
        tracing::warn!(target: "gifs", "TENOR_API_KEY is not set, every search will fail");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(target: "system", "GIF proxy listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(tenor))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "system", error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "system", "Shutting down");
}
