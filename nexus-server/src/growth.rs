//! Simulated traffic growth.
//!
//! The dashboard shows its counters moving even when nobody is clicking, so
//! a periodic task adds one visitor and a small random earnings delta on
//! every tick. Each tick is one atomic store update; a failed tick is logged
//! and skipped.

use rand::Rng;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::store::StatsStore;
use crate::tracing::prelude::*;

/// Seconds between growth ticks.
const TICK_PERIOD: Duration = Duration::from_secs(30);

/// Upper bound (exclusive) of the random earnings delta per tick.
const MAX_EARNINGS_DELTA: f64 = 0.05;

/// Draw the earnings delta for one tick, in `[0, MAX_EARNINGS_DELTA)`.
fn earnings_delta() -> f64 {
    rand::thread_rng().gen_range(0.0..MAX_EARNINGS_DELTA)
}

/// Task that applies one growth tick per period until cancelled.
pub async fn task(running: CancellationToken, store: StatsStore) {
    trace!("Task started.");

    let mut ticker = time::interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first interval tick fires immediately; swallow it so boot does
    // not count as a tick.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = running.cancelled() => break,
            _ = ticker.tick() => {
                let delta = earnings_delta();
                if let Err(e) = store.record_tick(1, delta).await {
                    warn!("growth tick failed, skipping: {e}");
                }
            }
        }
    }

    trace!("Task stopped.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earnings_delta_stays_in_bounds() {
        for _ in 0..1000 {
            let delta = earnings_delta();
            assert!((0.0..MAX_EARNINGS_DELTA).contains(&delta));
        }
    }

    #[tokio::test]
    async fn one_tick_bumps_visitors_and_earnings() {
        let store = StatsStore::open_in_memory().await.unwrap();
        store.ensure_initialized().await.unwrap();
        let before = store.read().await.unwrap();

        store.record_tick(1, earnings_delta()).await.unwrap();

        let after = store.read().await.unwrap();
        assert_eq!(after.visitors, before.visitors + 1);
        let gained = after.earnings - before.earnings;
        assert!((0.0..MAX_EARNINGS_DELTA).contains(&gained));
    }

    #[tokio::test]
    async fn task_stops_on_cancellation() {
        let store = StatsStore::open_in_memory().await.unwrap();
        store.ensure_initialized().await.unwrap();

        let running = CancellationToken::new();
        let handle = tokio::spawn(task(running.clone(), store));

        running.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("task did not stop after cancellation")
            .unwrap();
    }
}
