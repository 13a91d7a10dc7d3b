//! Tracing setup for the daemon.
//!
//! `main` calls [`init`] once at startup to install a subscriber; everything
//! else pulls in `crate::tracing::prelude::*` for the level macros.

use std::env;
use time::OffsetDateTime;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{format::Writer, time::FormatTime},
    prelude::*,
};

pub mod prelude {
    #[allow(unused_imports)]
    pub use tracing::{trace, debug, info, warn, error};
}

use prelude::*;

/// Install the tracing subscriber: journald when running under systemd,
/// stdout otherwise.
pub fn init() {
    // systemd sets JOURNAL_STREAM for services whose output is connected
    // to the journal.
    let journald_layer = if env::var("JOURNAL_STREAM").is_ok() {
        tracing_journald::layer().ok()
    } else {
        None
    };

    match journald_layer {
        Some(layer) => tracing_subscriber::registry().with(layer).init(),
        None => init_stdout(),
    }
}

// Stdout logging, filtered by RUST_LOG with a default of INFO.
fn init_stdout() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_timer(WallClock))
        .init();

    if env::var("JOURNAL_STREAM").is_ok() {
        warn!("journald unavailable, logging to stdout");
    }
}

// Second-resolution local-time timestamps; the default formatter's UTC
// microsecond strings are noise at this service's log volume.
struct WallClock;

impl FormatTime for WallClock {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = OffsetDateTime::now_local().unwrap_or(OffsetDateTime::now_utc());
        write!(
            w,
            "{}",
            now.format(time::macros::format_description!(
                "[hour]:[minute]:[second]"
            ))
            .unwrap(),
        )
    }
}
