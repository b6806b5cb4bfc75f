//! Stream Hub
//!
//! Creates aggregate feeds and tracks how many are open. Holds the shutdown
//! signal every ticker listens to.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

use super::feed::AggregateFeed;
use crate::storage::PlayerStore;

/// Configuration for the stream hub
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Time between snapshots after the initial one
    pub interval: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Hands out one independent feed per connection
pub struct StreamHub {
    config: StreamConfig,
    /// Number of feeds not yet dropped
    active: Arc<AtomicUsize>,
    shutdown: watch::Sender<bool>,
}

impl StreamHub {
    pub fn new(config: StreamConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            active: Arc::new(AtomicUsize::new(0)),
            shutdown,
        }
    }

    /// Open a feed: snapshot now, then one per interval
    pub async fn subscribe(&self, store: Arc<PlayerStore>) -> AggregateFeed {
        let initial = store.aggregate().await;
        AggregateFeed::start(
            Uuid::new_v4().to_string(),
            initial,
            store,
            self.config.interval,
            self.shutdown.subscribe(),
            Arc::clone(&self.active),
        )
    }

    /// Number of open feeds
    pub fn connection_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop every ticker; open feeds end after their pending snapshots
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
        tracing::info!(
            connections = self.connection_count(),
            "Closing aggregate streams"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{PlayerCount, StorageConfig, Submission};
    use futures_util::StreamExt;
    use tempfile::tempdir;
    use tokio::time::Instant;

    async fn create_test_store() -> (Arc<PlayerStore>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = PlayerStore::open(StorageConfig::new(dir.path())).await;
        (Arc::new(store), dir)
    }

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.interval, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_snapshot_is_immediate() {
        let (store, _dir) = create_test_store().await;
        store.submit(Submission::new("a", 3)).await.unwrap();

        let hub = StreamHub::new(StreamConfig::default());
        let mut feed = hub.subscribe(Arc::clone(&store)).await;

        let start = Instant::now();
        let first = feed.next().await.unwrap();
        assert_eq!(first, PlayerCount::from_sum(3));
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshots_follow_interval() {
        let (store, _dir) = create_test_store().await;
        let hub = StreamHub::new(StreamConfig::default());
        let mut feed = hub.subscribe(Arc::clone(&store)).await;

        let start = Instant::now();
        assert_eq!(feed.next().await.unwrap(), PlayerCount::default());

        store.submit(Submission::new("a", 4)).await.unwrap();
        let second = feed.next().await.unwrap();
        assert_eq!(second, PlayerCount::from_sum(4));
        assert_eq!(start.elapsed(), Duration::from_secs(5));

        store.submit(Submission::new("b", 1)).await.unwrap();
        let third = feed.next().await.unwrap();
        assert_eq!(third, PlayerCount::from_sum(5));
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_feeds_are_independent() {
        let (store, _dir) = create_test_store().await;
        let hub = StreamHub::new(StreamConfig::default());

        let mut early = hub.subscribe(Arc::clone(&store)).await;
        early.next().await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        let mut late = hub.subscribe(Arc::clone(&store)).await;
        late.next().await.unwrap();
        assert_ne!(early.id(), late.id());

        let start = Instant::now();
        early.next().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        late.next().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_counts_from_connect() {
        let (store, _dir) = create_test_store().await;
        let hub = StreamHub::new(StreamConfig::default());

        let start = Instant::now();
        let mut feed = hub.subscribe(Arc::clone(&store)).await;

        // Client reads nothing for a while after connecting
        tokio::time::advance(Duration::from_secs(2)).await;
        feed.next().await.unwrap();
        feed.next().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_connection() {
        let (store, _dir) = create_test_store().await;
        let hub = StreamHub::new(StreamConfig::default());

        let first = hub.subscribe(Arc::clone(&store)).await;
        let second = hub.subscribe(Arc::clone(&store)).await;
        assert_eq!(hub.connection_count(), 2);

        drop(first);
        assert_eq!(hub.connection_count(), 1);
        drop(second);
        assert_eq!(hub.connection_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_ends_feed() {
        let (store, _dir) = create_test_store().await;
        let hub = StreamHub::new(StreamConfig::default());
        let mut feed = hub.subscribe(Arc::clone(&store)).await;

        assert!(feed.next().await.is_some());
        hub.shutdown();
        assert!(feed.next().await.is_none());
    }
}
