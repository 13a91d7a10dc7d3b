//! Backend service for the Nexus Hub dashboard.
//!
//! The frontend is a single-page app that talks to this service over a small
//! JSON API: a persisted visitor/earnings counter, a wallet-address endpoint,
//! and a pair of proxies that attach server-held credentials to third-party
//! API calls so those credentials never reach the browser.

pub mod api;
pub mod config;
pub mod error;
pub mod growth;
pub mod store;
pub mod tracing;

pub use config::Config;
pub use error::{Error, Result};
pub use store::StatsStore;
