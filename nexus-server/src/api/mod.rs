//! HTTP API server.
//!
//! Built on Axum. Exposes the stats counters, the configured payout wallet
//! addresses, and the credential-injecting proxies under `/api`. The SPA
//! frontend is served by external tooling and is not part of this service.

mod proxy;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::Result;
use crate::store::{StatsRecord, StatsStore};

/// Timeout applied to every upstream proxy call.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared application state for API endpoints.
#[derive(Clone)]
pub struct AppState {
    /// Stats record store
    pub store: StatsStore,
    /// Startup configuration
    pub config: Arc<Config>,
    /// Shared upstream HTTP client, bounded timeout
    pub http: reqwest::Client,
}

impl AppState {
    /// Create the application state with the default upstream client.
    pub fn new(config: Config, store: StatsStore) -> Self {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .expect("default reqwest client");

        Self {
            store,
            config: Arc::new(config),
            http,
        }
    }
}

/// Health check response payload.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: &'static str,
    /// Human-readable service banner
    pub message: &'static str,
}

/// Visit tracking response payload.
#[derive(Debug, Clone, Serialize)]
pub struct TrackVisitResponse {
    /// Whether the visit was recorded
    pub success: bool,
}

/// Configured payout addresses, one key per supported asset. Unset assets
/// serialize as null rather than being omitted, matching what the
/// monetization page expects.
#[derive(Debug, Clone, Serialize)]
pub struct WalletsResponse {
    pub btc: Option<String>,
    pub usdt: Option<String>,
    pub sol: Option<String>,
    pub eth: Option<String>,
    pub ltc: Option<String>,
    pub bnb: Option<String>,
}

/// Liveness check endpoint handler.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Nexus Server is running",
    })
}

/// Stats endpoint handler. Returns the persisted counters.
async fn stats(State(state): State<AppState>) -> Result<Json<StatsRecord>> {
    let record = state.store.read().await?;
    Ok(Json(record))
}

/// Visit tracking endpoint handler. Counts every call; the counter is raw
/// page loads, not unique visitors.
async fn track_visit(
    State(state): State<AppState>,
) -> Result<Json<TrackVisitResponse>> {
    state.store.increment_visitors(1).await?;
    Ok(Json(TrackVisitResponse { success: true }))
}

/// Wallet address endpoint handler. The addresses come from startup
/// configuration, never from storage.
async fn wallets(State(state): State<AppState>) -> Json<WalletsResponse> {
    let w = &state.config.wallets;
    Json(WalletsResponse {
        btc: w.btc.clone(),
        usdt: w.usdt.clone(),
        sol: w.sol.clone(),
        eth: w.eth.clone(),
        ltc: w.ltc.clone(),
        bnb: w.bnb.clone(),
    })
}

/// Build the API routes.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/track-visit", post(track_visit))
        .route("/api/wallets", get(wallets))
        .route("/api/market-data", get(proxy::market_data))
        .route("/api/ai/generate-image", post(proxy::generate_image))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Wallets;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    pub(crate) fn test_config() -> Config {
        Config {
            listen: "127.0.0.1:0".into(),
            db_path: ":memory:".into(),
            wallets: Wallets::default(),
            rapidapi_key: "test-key".into(),
            hf_api_token: None,
            market_data_url: "http://127.0.0.1:9/coins".into(),
            image_api_url: "http://127.0.0.1:9/generate".into(),
        }
    }

    pub(crate) async fn test_router(config: Config) -> Router {
        let store = StatsStore::open_in_memory().await.unwrap();
        store.ensure_initialized().await.unwrap();
        let state = AppState {
            store,
            config: Arc::new(config),
            http: reqwest::Client::builder()
                .timeout(Duration::from_millis(200))
                .build()
                .unwrap(),
        };
        routes(state)
    }

    pub(crate) async fn body_json(
        response: axum::response::Response,
    ) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = test_router(test_config()).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn stats_returns_seeded_record() {
        let app = test_router(test_config()).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], "main");
        assert_eq!(body["visitors"], 1240);
    }

    #[tokio::test]
    async fn track_visit_increments_counter() {
        let app = test_router(test_config()).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/track-visit")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], true);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await["visitors"], 1241);
    }

    #[tokio::test]
    async fn concurrent_track_visits_all_count() {
        let app = test_router(test_config()).await;

        let mut handles = Vec::new();
        for _ in 0..100 {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                let response = app
                    .oneshot(
                        Request::builder()
                            .method("POST")
                            .uri("/api/track-visit")
                            .body(Body::empty())
                            .unwrap(),
                    )
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::OK);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await["visitors"], 1240 + 100);
    }

    #[tokio::test]
    async fn wallets_returns_configured_and_null_assets() {
        let mut config = test_config();
        config.wallets.btc = Some("bc1qexample".into());

        let app = test_router(config).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/wallets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["btc"], "bc1qexample");
        for asset in ["usdt", "sol", "eth", "ltc", "bnb"] {
            assert!(body.as_object().unwrap().contains_key(asset));
            assert!(body[asset].is_null());
        }
    }
}
