//! Background worker applying click events to the durable store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::UrlRepository;

/// Base delay of the exponential retry backoff, in milliseconds.
const RETRY_BASE_MS: u64 = 10;

/// Retries after the first failed attempt.
const MAX_RETRIES: usize = 2;

/// Upper bound for a single backoff delay.
const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Drains the click queue and increments stored click counters.
///
/// Up to `concurrency` updates run at the same time. Each update is retried with
/// exponential backoff; an update that still fails is logged and dropped, so the
/// stored counter may under-count (at-most-once per click).
///
/// The worker exits once every sender has been dropped and the buffered events
/// have been applied.
pub async fn run_click_worker<R>(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<R>,
    concurrency: usize,
) where
    R: UrlRepository + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        in_flight.spawn(async move {
            let _permit = permit;
            apply_click(repository.as_ref(), &event).await;
        });

        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
    info!("Click worker stopped");
}

/// Applies one click event with retries. Never fails.
async fn apply_click<R>(repository: &R, event: &ClickEvent)
where
    R: UrlRepository + ?Sized,
{
    let strategy = ExponentialBackoff::from_millis(RETRY_BASE_MS)
        .max_delay(MAX_RETRY_DELAY)
        .map(jitter)
        .take(MAX_RETRIES);

    let result = Retry::spawn(strategy, move || {
        repository.increment_clicks(&event.short_code, 1)
    })
    .await;

    match result {
        Ok(true) => {
            metrics::counter!("clicks_recorded_total").increment(1);
            debug!(short_code = %event.short_code, "Stored click");
        }
        Ok(false) => {
            debug!(short_code = %event.short_code, "Click for a removed record ignored");
        }
        Err(e) => {
            metrics::counter!("click_store_failures_total").increment(1);
            warn!(
                short_code = %event.short_code,
                clicked_at = %event.clicked_at,
                error = %e,
                "Dropping click after retries"
            );
        }
    }
}
