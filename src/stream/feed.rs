//! Per-connection aggregate feed

use futures_util::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::storage::{PlayerCount, PlayerStore};

/// Unique identifier for a stream connection
pub type ConnectionId = String;

/// Snapshots waiting to be written when a client reads slowly
const FEED_CAPACITY: usize = 4;

/// A client's stream of aggregate snapshots
///
/// Yields the snapshot taken at connect time first, then whatever the ticker
/// produces. Ends when the server shuts down.
pub struct AggregateFeed {
    id: ConnectionId,
    initial: Option<PlayerCount>,
    rx: mpsc::Receiver<PlayerCount>,
    ticker: JoinHandle<()>,
    active: Arc<AtomicUsize>,
}

impl AggregateFeed {
    pub(super) fn start(
        id: ConnectionId,
        initial: PlayerCount,
        store: Arc<PlayerStore>,
        period: Duration,
        shutdown: watch::Receiver<bool>,
        active: Arc<AtomicUsize>,
    ) -> Self {
        // Ticks are counted from connect time, not from when the task first runs
        let first_tick = Instant::now() + period;
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        let ticker = tokio::spawn(run_ticker(store, tx, first_tick, period, shutdown));

        active.fetch_add(1, Ordering::SeqCst);
        tracing::info!(connection_id = %id, "Stream connected");

        Self {
            id,
            initial: Some(initial),
            rx,
            ticker,
            active,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Stream for AggregateFeed {
    type Item = PlayerCount;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if let Some(snapshot) = this.initial.take() {
            return Poll::Ready(Some(snapshot));
        }
        this.rx.poll_recv(cx)
    }
}

impl Drop for AggregateFeed {
    fn drop(&mut self) {
        self.ticker.abort();
        self.active.fetch_sub(1, Ordering::SeqCst);
        tracing::info!(connection_id = %self.id, "Stream disconnected");
    }
}

/// Take a snapshot every `period` until the feed is gone or shutdown is signalled
async fn run_ticker(
    store: Arc<PlayerStore>,
    tx: mpsc::Sender<PlayerCount>,
    first_tick: Instant,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    if *shutdown.borrow() {
        return;
    }

    // The connect-time snapshot stands in for the tick at connect time
    let mut ticks = interval_at(first_tick, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                let snapshot = store.aggregate().await;
                if tx.send(snapshot).await.is_err() {
                    break;
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
