//! HTTP surface: `GET /download?url=<tiktok-url>`.
//!
//! The handler is the only place that turns [`PipelineError`] into a status
//! code. Everything before the first body byte maps to a plain-text `500`;
//! a missing or empty `url` is a `400`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::pipeline::{DownloadPipeline, PipelineError};

/// Message returned when the `url` parameter is missing or empty.
pub const MISSING_URL_MESSAGE: &str = "Please provide a TikTok video URL";

/// State shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The request pipeline.
    pub pipeline: Arc<DownloadPipeline>,
}

impl AppState {
    /// Wraps a pipeline for the router.
    #[must_use]
    pub fn new(pipeline: DownloadPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Query string of `GET /download`.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// The platform URL to download.
    pub url: Option<String>,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/download", get(download))
        .with_state(state)
}

/// Serves `router` on `listener` until Ctrl-C.
///
/// # Errors
///
/// Returns the I/O error that stopped the accept loop.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(error) = signal::ctrl_c().await {
        warn!(error = %error, "Failed to install Ctrl-C handler");
        return;
    }
    info!("Shutdown requested");
}

async fn download(State(state): State<AppState>, Query(query): Query<DownloadQuery>) -> Response {
    let Some(url) = query.url.filter(|url| !url.is_empty()) else {
        return (StatusCode::BAD_REQUEST, MISSING_URL_MESSAGE).into_response();
    };

    match state.pipeline.start(&url).await {
        Ok(download) => {
            let headers = [
                (header::CONTENT_TYPE, download.content_type().to_string()),
                (header::CONTENT_DISPOSITION, download.content_disposition()),
            ];
            (
                StatusCode::OK,
                headers,
                Body::from_stream(download.into_stream()),
            )
                .into_response()
        }
        Err(error) => failure_response(&error),
    }
}

fn failure_response(error: &PipelineError) -> Response {
    warn!(error = %error, "Download request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, error.user_message()).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::observe::RecordingObserver;
    use crate::provider::ProviderChain;
    use crate::relay::Relay;

    fn empty_app() -> Router {
        let pipeline = DownloadPipeline::new(
            ProviderChain::new(),
            Relay::new().unwrap(),
            Arc::new(RecordingObserver::new()),
        );
        router(AppState::new(pipeline))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        let response = empty_app()
            .oneshot(Request::get("/download").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, MISSING_URL_MESSAGE);
    }

    #[tokio::test]
    async fn test_invalid_domain_is_server_error() {
        let response = empty_app()
            .oneshot(
                Request::get("/download?url=https%3A%2F%2Fexample.com%2Fx")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Not a valid TikTok URL");
    }

    #[tokio::test]
    async fn test_whitespace_url_is_not_treated_as_missing() {
        let response = empty_app()
            .oneshot(Request::get("/download?url=%20").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Not a valid TikTok URL");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = empty_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
