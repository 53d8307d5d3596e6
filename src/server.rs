use axum::{
    Json, Router,
    extract::{Request, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::{error, info};

use crate::config::AppConfig;
use crate::reply::{ChatReply, ReplySource};

/// State shared by the endpoint handlers.
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Produces the bot's answer for each request.
    pub responder: Arc<dyn ReplySource>,
}

/// Build the router: `POST /chat`, open CORS, HTTP tracing and a request
/// timeout.
pub fn router(state: ServerState, request_timeout: Duration) -> Router {
    Router::new()
        .route(
            "/chat",
            post(chat_endpoint).layer(CorsLayer::permissive()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(request_timeout, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .with_state(state)
}

/// Start the demo chat endpoint with the provided configuration.
pub async fn start_server(
    config: Arc<AppConfig>,
    responder: Arc<dyn ReplySource>,
) -> anyhow::Result<()> {
    let app = router(
        ServerState { responder },
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Request body accepted by `/chat`. `message` is optional here so a missing
/// field is answered with 400 instead of the extractor's 422.
#[derive(Debug, Deserialize)]
struct IncomingChat {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

fn error_response(status: StatusCode, error: &'static str) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

/// POST /chat - Answer one message.
async fn chat_endpoint(
    State(state): State<ServerState>,
    payload: Result<Json<IncomingChat>, JsonRejection>,
) -> Response {
    let Some(message) = payload.ok().and_then(|Json(body)| body.message) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "JSON body must contain 'message'",
        );
    };

    let message = message.trim();
    if message.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Empty message");
    }

    match state.responder.obtain_reply(message).await {
        Ok(reply) => {
            let reply = reply.map(|r| r.trim().to_string()).unwrap_or_default();
            Json(ChatReply { reply: Some(reply) }).into_response()
        }
        Err(err) => {
            error!(name: "server.chat.failed", error = %err, "Responder failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::SimulatedReplySource;
    use axum::body::Body;
    use tower::ServiceExt;

    fn app() -> Router {
        router(
            ServerState {
                responder: Arc::new(SimulatedReplySource::instant()),
            },
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let response = app()
            .oneshot(axum::http::Request::get("/chat").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app()
            .oneshot(axum::http::Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
