//! Environment configuration.
//!
//! Every setting the service needs is read from the environment exactly once
//! at startup and carried in a [`Config`] injected into the HTTP state.
//! Handlers never touch the environment themselves.

use std::env;

use crate::tracing::prelude::*;

/// Coinranking demo key used when no RAPIDAPI_KEY is configured. Heavily
/// rate-limited but enough for local development.
const DEMO_RAPIDAPI_KEY: &str =
    "fd43cd59cbmsh016b54d400085b6p1dae09jsn666f2499a427";

/// Runtime configuration for the daemon.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the HTTP server binds.
    pub listen: String,

    /// Path of the sqlite file holding the stats record.
    pub db_path: String,

    /// Payout wallet addresses, one per supported asset.
    pub wallets: Wallets,

    /// RapidAPI key for the market-data upstream.
    pub rapidapi_key: String,

    /// Hugging Face token for the image-generation upstream. Optional; the
    /// image endpoint refuses requests when it is absent.
    pub hf_api_token: Option<String>,

    /// Market-data upstream URL. Overridable so tests can point it at a
    /// local listener.
    pub market_data_url: String,

    /// Image-generation upstream URL.
    pub image_api_url: String,
}

/// Configured payout addresses. An unset asset stays `None` and is returned
/// to the client as null.
#[derive(Debug, Clone, Default)]
pub struct Wallets {
    pub btc: Option<String>,
    pub usdt: Option<String>,
    pub sol: Option<String>,
    pub eth: Option<String>,
    pub ltc: Option<String>,
    pub bnb: Option<String>,
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        Self {
            listen: or_default("NEXUS_LISTEN", "0.0.0.0:3000"),
            db_path: or_default("NEXUS_DB_PATH", "nexus-hub.sqlite"),
            wallets: Wallets {
                btc: optional("VITE_WALLET_BTC"),
                usdt: optional("VITE_WALLET_USDT"),
                sol: optional("VITE_WALLET_SOL"),
                eth: optional("VITE_WALLET_ETH"),
                ltc: optional("VITE_WALLET_LTC"),
                bnb: optional("VITE_WALLET_BNB"),
            },
            rapidapi_key: env::var("RAPIDAPI_KEY").unwrap_or_else(|_| {
                info!("RAPIDAPI_KEY not set, using demo key");
                DEMO_RAPIDAPI_KEY.to_string()
            }),
            hf_api_token: optional("HF_API_TOKEN"),
            market_data_url: or_default(
                "NEXUS_MARKET_DATA_URL",
                "https://coinranking1.p.rapidapi.com/coins",
            ),
            image_api_url: or_default(
                "NEXUS_IMAGE_API_URL",
                "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0",
            ),
        }
    }
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => {
            warn!("{key} not set");
            None
        }
    }
}
