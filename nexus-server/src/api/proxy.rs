//! Upstream proxy handlers.
//!
//! Both handlers exist to keep credentials on the server: the browser calls
//! these routes and the server-held key or token is attached on the way out.
//! Every upstream failure (unreachable, timeout, non-success status,
//! malformed body) collapses to a structured JSON error with a generic
//! message; upstream error internals are logged, never forwarded.

use std::collections::HashMap;

use axum::{
    extract::{Json, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::error::{Error, Result};
use crate::tracing::prelude::*;

const RAPIDAPI_HOST: &str = "coinranking1.p.rapidapi.com";

/// Coins returned per market-data request unless the client asks otherwise.
const DEFAULT_COIN_LIMIT: &str = "5";

/// Image generation request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateImageRequest {
    /// Text prompt forwarded to the model.
    pub prompt: String,
}

/// Market-data proxy handler.
///
/// Forwards to the Coinranking API with the server-held RapidAPI key and
/// passes the upstream JSON through unchanged. Client query params are
/// forwarded; `limit` defaults to 5.
pub async fn market_data(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>> {
    let mut query: Vec<(String, String)> = params.into_iter().collect();
    if !query.iter().any(|(k, _)| k == "limit") {
        query.push(("limit".into(), DEFAULT_COIN_LIMIT.into()));
    }

    let response = state
        .http
        .get(&state.config.market_data_url)
        .header("x-rapidapi-key", &state.config.rapidapi_key)
        .header("x-rapidapi-host", RAPIDAPI_HOST)
        .query(&query)
        .send()
        .await
        .map_err(|e| {
            warn!("market-data upstream request failed: {e}");
            market_data_failed()
        })?;

    if !response.status().is_success() {
        warn!(
            status = %response.status(),
            "market-data upstream returned non-success"
        );
        return Err(market_data_failed());
    }

    let body: serde_json::Value = response.json().await.map_err(|e| {
        warn!("market-data upstream returned malformed JSON: {e}");
        market_data_failed()
    })?;

    Ok(Json(body))
}

fn market_data_failed() -> Error {
    Error::Upstream("Failed to fetch market data".into())
}

/// Image-generation proxy handler.
///
/// Requires the image token to be configured; refuses the request before
/// any network activity otherwise. On success, returns the raw image bytes
/// with the upstream-reported content type.
pub async fn generate_image(
    State(state): State<AppState>,
    Json(req): Json<GenerateImageRequest>,
) -> Result<Response> {
    let token = state
        .config
        .hf_api_token
        .as_deref()
        .ok_or_else(|| Error::Config("Image generation is not configured".into()))?;

    let response = state
        .http
        .post(&state.config.image_api_url)
        .bearer_auth(token)
        .json(&json!({ "inputs": req.prompt }))
        .send()
        .await
        .map_err(|e| {
            warn!("image upstream request failed: {e}");
            image_generation_failed()
        })?;

    if !response.status().is_success() {
        warn!(
            status = %response.status(),
            "image upstream returned non-success"
        );
        return Err(image_generation_failed());
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("image/png"));

    let bytes = response.bytes().await.map_err(|e| {
        warn!("image upstream body read failed: {e}");
        image_generation_failed()
    })?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

fn image_generation_failed() -> Error {
    Error::Upstream("Failed to generate image".into())
}
