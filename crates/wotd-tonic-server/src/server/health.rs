//! Keeps the `grpc.health.v1` status of the word service in line with the
//! database.

use core::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tonic::server::NamedService;
use tonic_health::server::HealthReporter;

/// Anything that can answer "is the backend reachable right now".
#[tonic::async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn probe(&self) -> bool;
}

#[tonic::async_trait]
impl Probe for crate::server::store::PgWordStore {
    async fn probe(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Database ping failed");
                false
            }
        }
    }
}

/// Probes every `period` and publishes SERVING or NOT_SERVING for `S`.
///
/// Only transitions are logged. Returns when `token` is cancelled, leaving the
/// last published status in place. A check still in flight at cancellation is
/// discarded, so nothing is published after shutdown begins.
pub async fn watch<S, P>(
    reporter: HealthReporter,
    probe: P,
    period: Duration,
    token: CancellationToken,
) where
    S: NamedService,
    P: Probe,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut serving = None;

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let healthy = probe.probe().await;
        if token.is_cancelled() {
            break;
        }
        if serving == Some(healthy) {
            continue;
        }
        if healthy {
            tracing::info!(service = S::NAME, "Marking service as serving");
            reporter.set_serving::<S>().await;
        } else {
            tracing::warn!(service = S::NAME, "Marking service as not serving");
            reporter.set_not_serving::<S>().await;
        }
        serving = Some(healthy);
    }
}
