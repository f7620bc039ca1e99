//! Update Broadcaster
//!
//! Owns the subscriber set and the single periodic task that renames random
//! nodes and pushes the resulting batch to every subscriber.
//!
//! The task is started by the first subscriber and stopped when the last one
//! leaves. Both decisions are taken under the same lock that guards the
//! subscriber map, so concurrent connects and disconnects can never leave two
//! loops running or a loop running with nobody listening.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::messages::{encode_batch, NameUpdate};
use super::rename::next_name;
use crate::config::BroadcasterConfig;
use crate::store::{NodeStore, StoreError};

/// Unique identifier for a subscriber connection
pub type SubscriberId = String;

/// Channel through which a connection receives encoded batches
pub type SubscriberSender = mpsc::UnboundedSender<String>;

/// Handle to the running periodic task
struct ActiveTask {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct BroadcastState {
    subscribers: HashMap<SubscriberId, SubscriberSender>,
    task: Option<ActiveTask>,
    tasks_started: u64,
}

struct Shared {
    store: Arc<dyn NodeStore>,
    config: BroadcasterConfig,
    state: Mutex<BroadcastState>,
}

/// Snapshot of the broadcaster for health reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcasterStats {
    pub subscribers: usize,
    pub broadcasting: bool,
    /// Number of times the periodic task has been (re)started
    pub tasks_started: u64,
}

/// Fans out simulated name changes to WebSocket subscribers
pub struct UpdateBroadcaster {
    shared: Arc<Shared>,
}

impl UpdateBroadcaster {
    pub fn new(store: Arc<dyn NodeStore>, config: BroadcasterConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                config,
                state: Mutex::new(BroadcastState::default()),
            }),
        }
    }

    /// Register a subscriber, starting the periodic task if it is the first.
    pub async fn subscribe(&self, sender: SubscriberSender) -> Result<SubscriberId, BroadcastError> {
        let mut state = self.shared.state.lock().await;
        let limit = self.shared.config.max_subscribers;
        if state.subscribers.len() >= limit {
            return Err(BroadcastError::TooManySubscribers(limit));
        }

        let id = Uuid::new_v4().to_string();
        state.subscribers.insert(id.clone(), sender);

        if state.task.is_none() {
            state.task = Some(spawn_task(Arc::clone(&self.shared)));
            state.tasks_started += 1;
            tracing::info!(
                interval_secs = self.shared.config.interval_secs,
                "Broadcast loop started"
            );
        }

        tracing::info!(
            subscriber_id = %id,
            subscribers = state.subscribers.len(),
            "Subscriber connected"
        );
        Ok(id)
    }

    /// Remove a subscriber, stopping the periodic task if it was the last.
    pub async fn unsubscribe(&self, id: &str) {
        let mut state = self.shared.state.lock().await;
        if state.subscribers.remove(id).is_none() {
            return;
        }

        tracing::info!(
            subscriber_id = %id,
            subscribers = state.subscribers.len(),
            "Subscriber disconnected"
        );

        if state.subscribers.is_empty() {
            if let Some(task) = state.task.take() {
                let _ = task.stop.send(());
                tracing::info!("Broadcast loop stopped");
            }
        }
    }

    /// Run one tick immediately.
    ///
    /// Returns the batch that was delivered; empty when there were no
    /// subscribers or no nodes to rename.
    pub async fn tick(&self) -> Result<Vec<NameUpdate>, BroadcastError> {
        self.shared.tick().await
    }

    pub async fn stats(&self) -> BroadcasterStats {
        let state = self.shared.state.lock().await;
        BroadcasterStats {
            subscribers: state.subscribers.len(),
            broadcasting: state.task.is_some(),
            tasks_started: state.tasks_started,
        }
    }

    pub fn config(&self) -> &BroadcasterConfig {
        &self.shared.config
    }

    /// Drop every subscriber and wait for the periodic task to finish.
    pub async fn shutdown(&self) {
        let task = {
            let mut state = self.shared.state.lock().await;
            state.subscribers.clear();
            state.task.take()
        };

        if let Some(task) = task {
            let _ = task.stop.send(());
            if let Err(e) = task.handle.await {
                tracing::warn!(error = %e, "Broadcast loop ended abnormally");
            }
        }
        tracing::info!("Broadcaster shut down");
    }
}

impl Shared {
    async fn tick(&self) -> Result<Vec<NameUpdate>, BroadcastError> {
        // Deliver to the set as it was when the tick began
        let recipients: Vec<(SubscriberId, SubscriberSender)> = {
            let state = self.state.lock().await;
            state
                .subscribers
                .iter()
                .map(|(id, sender)| (id.clone(), sender.clone()))
                .collect()
        };

        if recipients.is_empty() {
            return Ok(Vec::new());
        }

        let batch = self.rename_random_nodes()?;
        if batch.is_empty() {
            return Ok(batch);
        }

        let payload = encode_batch(&batch)?;
        let mut delivered = 0;
        for (id, sender) in &recipients {
            if sender.send(payload.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(subscriber_id = %id, "Skipping closed subscriber");
            }
        }

        tracing::info!(
            updates = batch.len(),
            subscribers = delivered,
            "Broadcast name updates"
        );
        Ok(batch)
    }

    fn rename_random_nodes(&self) -> Result<Vec<NameUpdate>, BroadcastError> {
        let nodes = self.store.all_nodes()?;
        if nodes.is_empty() {
            return Ok(Vec::new());
        }

        let min = self.config.min_updates.max(1);
        let max = self.config.max_updates.max(min);

        let mut rng = rand::thread_rng();
        let count = rng.gen_range(min..=max);
        let mut batch = Vec::with_capacity(count);

        for _ in 0..count {
            let Some(picked) = nodes.choose(&mut rng) else {
                break;
            };
            // Re-read so a node picked twice builds on its latest name
            let Some(current) = self.store.find_node(&picked.id)? else {
                continue;
            };

            let new_name = next_name(&current.name, &mut rng)?;
            if let Some(updated) = self.store.rename_node(&current.id, &new_name)? {
                batch.push(NameUpdate::new(updated.id, updated.name));
            }
        }

        Ok(batch)
    }
}

fn spawn_task(shared: Arc<Shared>) -> ActiveTask {
    let (stop, mut stop_rx) = oneshot::channel::<()>();

    let period = Duration::from_secs(shared.config.interval_secs.max(1));
    let start = tokio::time::Instant::now() + Duration::from_secs(shared.config.initial_delay_secs);

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(start, period);

        loop {
            // The stop signal is only observed between ticks, never mid-tick,
            // and wins over a tick that is already due
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    if let Err(e) = shared.tick().await {
                        tracing::error!(error = %e, "Broadcast tick failed");
                    }
                }
            }
        }

        tracing::debug!("Broadcast loop exited");
    });

    ActiveTask { stop, handle }
}

/// Errors that can occur in the broadcaster
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("Too many subscribers (limit: {0})")]
    TooManySubscribers(usize),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rename error: {0}")]
    Rename(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SeedData};

    /// Config whose loop never fires during a test
    fn idle_config() -> BroadcasterConfig {
        BroadcasterConfig {
            interval_secs: 3600,
            initial_delay_secs: 3600,
            ..Default::default()
        }
    }

    fn seeded_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::from_seed(SeedData::bootstrap()).unwrap())
    }

    fn broadcaster(config: BroadcasterConfig) -> (UpdateBroadcaster, Arc<MemoryStore>) {
        let store = seeded_store();
        (UpdateBroadcaster::new(store.clone(), config), store)
    }

    #[tokio::test]
    async fn test_lifecycle_follows_subscriber_count() {
        let (broadcaster, _store) = broadcaster(idle_config());
        assert!(!broadcaster.stats().await.broadcasting);

        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        // 0 -> 1 starts the loop
        let id1 = broadcaster.subscribe(tx1).await.unwrap();
        let stats = broadcaster.stats().await;
        assert!(stats.broadcasting);
        assert_eq!(stats.tasks_started, 1);

        // 1 -> 2 and 2 -> 1 leave it alone
        let id2 = broadcaster.subscribe(tx2).await.unwrap();
        broadcaster.unsubscribe(&id1).await;
        let stats = broadcaster.stats().await;
        assert!(stats.broadcasting);
        assert_eq!(stats.tasks_started, 1);
        assert_eq!(stats.subscribers, 1);

        // 1 -> 0 stops it
        broadcaster.unsubscribe(&id2).await;
        let stats = broadcaster.stats().await;
        assert!(!stats.broadcasting);
        assert_eq!(stats.subscribers, 0);

        // Next first subscriber gets a fresh loop
        let (tx3, _rx3) = mpsc::unbounded_channel();
        broadcaster.subscribe(tx3).await.unwrap();
        assert_eq!(broadcaster.stats().await.tasks_started, 2);

        broadcaster.shutdown().await;
        assert!(!broadcaster.stats().await.broadcasting);
    }

    #[tokio::test]
    async fn test_unknown_unsubscribe_is_noop() {
        let (broadcaster, _store) = broadcaster(idle_config());
        let (tx, _rx) = mpsc::unbounded_channel();
        broadcaster.subscribe(tx).await.unwrap();

        broadcaster.unsubscribe("not-a-subscriber").await;
        assert!(broadcaster.stats().await.broadcasting);
        broadcaster.shutdown().await;
    }

    #[tokio::test]
    async fn test_concurrent_connects_start_one_loop() {
        let (broadcaster, _store) = broadcaster(idle_config());
        let broadcaster = Arc::new(broadcaster);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let b = Arc::clone(&broadcaster);
            handles.push(tokio::spawn(async move {
                let (tx, _rx) = mpsc::unbounded_channel();
                b.subscribe(tx).await.unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        assert_eq!(broadcaster.stats().await.tasks_started, 1);

        let mut handles = Vec::new();
        for id in ids {
            let b = Arc::clone(&broadcaster);
            handles.push(tokio::spawn(async move { b.unsubscribe(&id).await }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = broadcaster.stats().await;
        assert_eq!(stats.subscribers, 0);
        assert!(!stats.broadcasting);
    }

    #[tokio::test]
    async fn test_subscriber_limit() {
        let config = BroadcasterConfig {
            max_subscribers: 1,
            ..idle_config()
        };
        let (broadcaster, _store) = broadcaster(config);

        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        broadcaster.subscribe(tx1).await.unwrap();

        let result = broadcaster.subscribe(tx2).await;
        assert!(matches!(result, Err(BroadcastError::TooManySubscribers(1))));
        broadcaster.shutdown().await;
    }

    #[tokio::test]
    async fn test_tick_delivers_identical_payload() {
        let (broadcaster, store) = broadcaster(idle_config());

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        broadcaster.subscribe(tx1).await.unwrap();
        broadcaster.subscribe(tx2).await.unwrap();

        let batch = broadcaster.tick().await.unwrap();
        assert!((1..=3).contains(&batch.len()));

        let payload1 = rx1.try_recv().unwrap();
        let payload2 = rx2.try_recv().unwrap();
        assert_eq!(payload1, payload2);

        let decoded: Vec<NameUpdate> = serde_json::from_str(&payload1).unwrap();
        assert_eq!(decoded, batch);

        // The last rename of each node is what the store now holds
        let mut latest = HashMap::new();
        for update in &batch {
            latest.insert(update.id.clone(), update.new_name.clone());
        }
        for (id, name) in latest {
            assert_eq!(store.find_node(&id).unwrap().unwrap().name, name);
        }

        broadcaster.shutdown().await;
    }

    #[tokio::test]
    async fn test_tick_without_subscribers_does_nothing() {
        let (broadcaster, store) = broadcaster(idle_config());
        let before = store.all_nodes().unwrap();

        let batch = broadcaster.tick().await.unwrap();
        assert!(batch.is_empty());
        assert_eq!(store.all_nodes().unwrap(), before);
    }

    #[tokio::test]
    async fn test_tick_with_empty_store_sends_nothing() {
        let store = Arc::new(MemoryStore::new());
        let broadcaster = UpdateBroadcaster::new(store, idle_config());

        let (tx, mut rx) = mpsc::unbounded_channel();
        broadcaster.subscribe(tx).await.unwrap();

        let batch = broadcaster.tick().await.unwrap();
        assert!(batch.is_empty());
        assert!(rx.try_recv().is_err());
        broadcaster.shutdown().await;
    }

    #[tokio::test]
    async fn test_closed_subscriber_is_skipped() {
        let (broadcaster, _store) = broadcaster(idle_config());

        let (closed_tx, closed_rx) = mpsc::unbounded_channel();
        let (open_tx, mut open_rx) = mpsc::unbounded_channel();
        broadcaster.subscribe(closed_tx).await.unwrap();
        broadcaster.subscribe(open_tx).await.unwrap();
        drop(closed_rx);

        let batch = broadcaster.tick().await.unwrap();
        assert!(!batch.is_empty());
        assert!(open_rx.try_recv().is_ok());
        broadcaster.shutdown().await;
    }

    #[tokio::test]
    async fn test_stopped_loop_does_not_tick_after_restart() {
        // First tick of every loop is due immediately, the next one never
        let config = BroadcasterConfig {
            interval_secs: 3600,
            initial_delay_secs: 0,
            ..Default::default()
        };
        let (broadcaster, _store) = broadcaster(config);

        // Start and stop a loop before it is ever polled, then start another
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let id1 = broadcaster.subscribe(tx1).await.unwrap();
        broadcaster.unsubscribe(&id1).await;

        let (tx2, mut rx2) = mpsc::unbounded_channel();
        broadcaster.subscribe(tx2).await.unwrap();
        assert_eq!(broadcaster.stats().await.tasks_started, 2);

        tokio::time::sleep(Duration::from_millis(200)).await;

        // Only the live loop delivered its first batch
        assert!(rx2.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());

        broadcaster.shutdown().await;
    }

    #[tokio::test]
    async fn test_loop_pushes_batches() {
        let config = BroadcasterConfig {
            interval_secs: 1,
            initial_delay_secs: 0,
            ..Default::default()
        };
        let (broadcaster, _store) = broadcaster(config);

        let (tx, mut rx) = mpsc::unbounded_channel();
        broadcaster.subscribe(tx).await.unwrap();

        let payload = tokio::time::timeout(Duration::from_secs(3), rx.recv())
            .await
            .expect("batch within timeout")
            .expect("channel open");
        let batch: Vec<NameUpdate> = serde_json::from_str(&payload).unwrap();
        assert!((1..=3).contains(&batch.len()));

        broadcaster.shutdown().await;
    }
}
