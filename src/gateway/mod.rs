//! HTTP server for the Dialogflow fulfillment webhook.
//!
//! Each POST is handled on its own: pull the sender id, fetch the Messenger
//! profile, expand it into the intent's response and reply. Nothing is shared
//! between requests except the read-only lookup client and observer.

mod observer;

pub use observer::{ExchangeObserver, TracingObserver};

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tracing::{error, info};

use crate::config::GatewayConfig;
use crate::errors::{BridgeError, BridgeResult};
use crate::fulfillment::{ContextInjection, Reply, build_reply, extract_user_id};
use crate::profile::{GraphProfileClient, ProfileLookup};

/// Terminal state of one webhook exchange.
#[derive(Debug)]
pub enum Outcome {
    /// 200 with the reply body.
    Replied(Value),
    /// 400 with the JSON-encoded failure reason.
    Errored(BridgeError),
}

impl Outcome {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Replied(_) => StatusCode::OK,
            Self::Errored(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Replied(body) => (status, Json(body)).into_response(),
            Self::Errored(err) => {
                let body = serde_json::to_string(&err.reason())
                    .unwrap_or_else(|_| "\"internal error\"".to_string());
                (
                    status,
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
                    .into_response()
            }
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.to_body())).into_response()
    }
}

/// Runs one fulfillment exchange per inbound request.
#[derive(Clone)]
pub struct FulfillmentService {
    lookup: Arc<dyn ProfileLookup>,
    observer: Arc<dyn ExchangeObserver>,
}

impl FulfillmentService {
    pub fn new(lookup: Arc<dyn ProfileLookup>) -> Self {
        Self {
            lookup,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Service backed by the Messenger User Profile API with default settings.
    pub fn from_access_token(access_token: impl Into<String>) -> Self {
        Self::new(Arc::new(GraphProfileClient::new(access_token)))
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExchangeObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Handle one webhook body. Never fails: every error becomes `Outcome::Errored`.
    pub async fn run(&self, body: &Value) -> Outcome {
        self.observer.inbound(body);
        match self.fulfill(body).await {
            Ok(reply) => {
                let body = reply.to_body();
                self.observer.outbound(&body);
                Outcome::Replied(body)
            }
            Err(err) => self.reject(err),
        }
    }

    fn reject(&self, err: BridgeError) -> Outcome {
        self.observer.failure(&err);
        Outcome::Errored(err)
    }

    async fn fulfill(&self, body: &Value) -> BridgeResult<Reply> {
        // A body without a sender id can never produce a profile; fail it the
        // same way a rejected lookup would.
        let user_id = extract_user_id(body)
            .ok_or_else(|| BridgeError::lookup("no sender id in request"))?;
        let profile = self.lookup.lookup(&user_id).await?;
        build_reply(body, &ContextInjection::user_profile(&profile))
    }
}

/// Build the webhook router.
fn build_router(service: FulfillmentService, path: &str, max_body_bytes: usize) -> Router {
    let mut router: Router<FulfillmentService> = Router::new()
        .route("/", post(fulfillment_handler))
        .route("/api/health", get(health_handler));
    if path != "/" {
        router = router.route(path, post(fulfillment_handler));
    }
    router
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(service)
}

/// POST <path>: Dialogflow fulfillment request.
async fn fulfillment_handler(State(service): State<FulfillmentService>, body: Bytes) -> Outcome {
    match serde_json::from_slice::<Value>(&body) {
        Ok(value) => service.run(&value).await,
        Err(e) => service.reject(BridgeError::Shape(format!(
            "request body is not valid JSON: {}",
            e
        ))),
    }
}

/// GET /api/health: health check endpoint.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

/// Bind and start serving. Returns the server task and the bound address
/// (useful when the configured port is 0).
pub async fn start(
    config: &GatewayConfig,
    service: FulfillmentService,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr)> {
    let app = build_router(service, &config.path, config.max_body_bytes);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let local_addr = listener.local_addr()?;
    info!(
        "fulfillment webhook listening on http://{}{}",
        local_addr, config.path
    );

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("fulfillment server error: {}", e);
        }
    });

    Ok((handle, local_addr))
}
