mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{MockUpstream, config, init_tracing, storage, url};
use pretty_assertions::assert_eq;
use swcache::{
    ClientMessage, ClientRegistry, FnResync, Notification, Resync, ResyncError, ServiceWorker,
    SyncBridge, SyncEvent, SyncOutcome,
};

/// Counts runs and fails the first `failures` of them.
#[derive(Clone, Default)]
struct ScriptedResync {
    runs: Arc<AtomicUsize>,
    failures: usize,
}

impl ScriptedResync {
    fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Self::default()
        }
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Resync for ScriptedResync {
    async fn resync(&self) -> Result<(), ResyncError> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst);
        if run < self.failures {
            Err("server unreachable".into())
        } else {
            Ok(())
        }
    }
}

fn worker_with(resync: impl Resync + 'static) -> ServiceWorker<MockUpstream> {
    let storage = storage();
    ServiceWorker::builder()
        .config(config(&[]))
        .storage(storage)
        .upstream(MockUpstream::new())
        .resync(resync)
        .build()
        .unwrap()
}

#[tokio::test]
async fn sync_broadcasts_data_synced_to_every_client() {
    init_tracing();
    let resync = ScriptedResync::default();
    let worker = worker_with(resync.clone());
    let (_, mut songs) = worker.clients().connect(url("/songs"));
    let (_, mut rehearsals) = worker.clients().connect(url("/rehearsals"));

    let outcome = worker.on_sync(SyncEvent::new("background-sync")).await;

    assert_eq!(outcome, SyncOutcome::Synced { notified: 2 });
    assert_eq!(resync.runs(), 1);
    for rx in [&mut songs, &mut rehearsals] {
        match rx.try_recv().unwrap() {
            ClientMessage::Notify(notification) => {
                let wire = notification.to_json();
                assert_eq!(wire["type"], "DATA_SYNCED");
                let timestamp = wire["timestamp"].as_str().unwrap();
                assert!(timestamp.ends_with('Z'), "{timestamp}");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}

#[tokio::test]
async fn other_tags_are_ignored() {
    let resync = ScriptedResync::default();
    let worker = worker_with(resync.clone());
    let (_, mut rx) = worker.clients().connect(url("/"));

    let outcome = worker.on_sync(SyncEvent::new("periodic-refresh")).await;

    assert_eq!(outcome, SyncOutcome::Ignored);
    assert_eq!(resync.runs(), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn failed_resync_notifies_nobody() {
    let resync = ScriptedResync::failing(1);
    let worker = worker_with(resync.clone());
    let (_, mut rx) = worker.clients().connect(url("/"));

    let outcome = worker.on_sync(SyncEvent::new("background-sync")).await;

    assert_eq!(outcome, SyncOutcome::Failed);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn closed_clients_are_skipped() {
    let clients = ClientRegistry::new();
    let (_, open) = clients.connect(url("/songs"));
    let (_, closed) = clients.connect(url("/categories"));
    drop(closed);
    let bridge = SyncBridge::new(
        "background-sync",
        Arc::new(FnResync::new(|| async { Ok::<(), ResyncError>(()) })),
        clients.clone(),
    );

    let outcome = bridge.on_sync("background-sync").await;

    assert_eq!(outcome, SyncOutcome::Synced { notified: 1 });
    assert_eq!(clients.len(), 1);
    drop(open);
}

#[tokio::test]
async fn registered_sync_fires_on_reconnect() {
    let resync = ScriptedResync::default();
    let worker = worker_with(resync.clone());
    let (_, mut rx) = worker.clients().connect(url("/"));

    worker.register_sync("background-sync");
    worker.register_sync("background-sync");
    assert_eq!(worker.sync().pending(), vec!["background-sync"]);
    assert_eq!(resync.runs(), 0);

    assert_eq!(worker.connectivity_restored(), 1);
    worker.sync().wait_idle().await;

    assert_eq!(resync.runs(), 1);
    assert!(worker.sync().pending().is_empty());
    assert!(matches!(
        rx.try_recv().unwrap(),
        ClientMessage::Notify(Notification::DataSynced { .. })
    ));
}

#[tokio::test]
async fn failed_deferred_sync_retries_on_next_reconnect() {
    let resync = ScriptedResync::failing(1);
    let worker = worker_with(resync.clone());

    worker.register_sync("background-sync");
    worker.connectivity_restored();
    worker.sync().wait_idle().await;

    assert_eq!(resync.runs(), 1);
    assert_eq!(worker.sync().pending(), vec!["background-sync"]);

    worker.connectivity_restored();
    worker.sync().wait_idle().await;

    assert_eq!(resync.runs(), 2);
    assert!(worker.sync().pending().is_empty());
}

#[tokio::test]
async fn reconnect_with_nothing_pending_spawns_nothing() {
    let worker = worker_with(ScriptedResync::default());

    assert_eq!(worker.connectivity_restored(), 0);
}

#[tokio::test]
async fn slow_resync_is_cancelled_after_timeout() {
    let runs = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));
    let resync = {
        let runs = runs.clone();
        let finished = finished.clone();
        FnResync::new(move || {
            let runs = runs.clone();
            let finished = finished.clone();
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(10)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok::<(), ResyncError>(())
            }
        })
    };
    let mut config = config(&[]);
    config.sync.timeout = Some(Duration::from_millis(50));
    let worker = ServiceWorker::builder()
        .config(config)
        .storage(storage())
        .upstream(MockUpstream::new())
        .resync(resync)
        .build()
        .unwrap();
    let (_, mut rx) = worker.clients().connect(url("/"));

    worker.register_sync("background-sync");
    worker.connectivity_restored();
    tokio::time::timeout(Duration::from_secs(5), worker.sync().wait_idle())
        .await
        .unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(finished.load(Ordering::SeqCst), 0);
    assert!(rx.try_recv().is_err());
}
