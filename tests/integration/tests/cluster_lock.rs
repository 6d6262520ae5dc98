//! Periodic jobs coordinated across nodes sharing one lock store.

use std::sync::Arc;
use std::time::Duration;

use md_core::Config;
use md_lock::{ClusterLock, ExclusiveJob, JobOutcome};
use md_storage::{InMemoryStore, LockStore};
use tokio::sync::oneshot;

const JOB: &str = "metadata-push";

fn node(store: &Arc<InMemoryStore>, node_id: &str) -> ClusterLock {
    let mut config = Config::default();
    config.lock.node_id = node_id.to_string();
    ClusterLock::from_config(Arc::clone(store) as Arc<dyn LockStore>, &config.lock)
}

#[tokio::test]
async fn only_one_node_runs_the_job() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let first = Arc::new(ExclusiveJob::new(JOB, node(&store, "node-a"), Duration::from_secs(60)));
    let second = ExclusiveJob::new(JOB, node(&store, "node-b"), Duration::from_secs(60));

    let (started_tx, started_rx) = oneshot::channel();
    let (finish_tx, finish_rx) = oneshot::channel::<()>();
    let running = tokio::spawn({
        let first = Arc::clone(&first);
        async move {
            first
                .run(|| async move {
                    let _ = started_tx.send(());
                    let _ = finish_rx.await;
                    "pushed"
                })
                .await
        }
    });
    started_rx.await?;

    assert_eq!(second.run(|| async { "pushed" }).await?, JobOutcome::HeldElsewhere);
    assert_eq!(first.run(|| async { "pushed" }).await?, JobOutcome::AlreadyRunningLocally);

    let _ = finish_tx.send(());
    assert_eq!(running.await??, JobOutcome::Completed("pushed"));

    assert_eq!(second.run(|| async { "pushed" }).await?, JobOutcome::Completed("pushed"));
    Ok(())
}

#[tokio::test]
async fn crashed_holder_blocks_only_until_lease_expiry() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let crashed = node(&store, "node-a");
    assert!(crashed.try_acquire(JOB, Duration::from_millis(50)).await?);
    drop(crashed);

    let survivor = ExclusiveJob::new(JOB, node(&store, "node-b"), Duration::from_secs(60));
    assert_eq!(survivor.run(|| async {}).await?, JobOutcome::HeldElsewhere);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(survivor.run(|| async {}).await?, JobOutcome::Completed(()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_nodes_never_share_a_lease() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let attempts: Vec<_> = (0..8)
        .map(|i| {
            let lock = node(&store, &format!("node-{i}"));
            tokio::spawn(async move { lock.try_acquire(JOB, Duration::from_secs(60)).await })
        })
        .collect();

    let mut holders = 0;
    for attempt in attempts {
        if attempt.await?? {
            holders += 1;
        }
    }
    assert_eq!(holders, 1);
    assert_eq!(store.purge_expired().await?, 0);
    Ok(())
}
