
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use tokio_util::sync::CancellationToken;

use coursework_lifecycle::store::{AssignmentStatus, NewAssignment};
use test_harness::{assert_eventually, TestContext};

/// Completion racing a pass on a just-overdue record must always end completed.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_complete_wins_race_with_pass() {
    let ctx = TestContext::new();
    let due = ctx.now() + Duration::hours(1);

    let mut ids = Vec::new();
    for i in 0..200 {
        let a = ctx
            .store
            .create(NewAssignment::new(format!("race {i}"), due))
            .await
            .unwrap();
        ids.push(a.id);
    }
    ctx.clock.set(due + Duration::seconds(1));

    let completer = {
        let scheduler = ctx.scheduler.clone();
        let ids = ids.clone();
        tokio::spawn(async move {
            for id in ids {
                scheduler.complete(id).await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };
    let reconciler = {
        let scheduler = ctx.scheduler.clone();
        tokio::spawn(async move {
            for _ in 0..5 {
                scheduler.run_pass().await;
                tokio::task::yield_now().await;
            }
        })
    };

    completer.await.unwrap();
    reconciler.await.unwrap();
    ctx.scheduler.run_pass().await;

    for id in ids {
        assert_eq!(ctx.status_of(id).await, AssignmentStatus::Completed);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_passes_do_not_duplicate_transitions() {
    let ctx = TestContext::new();
    for i in 0..50 {
        ctx.store
            .create(NewAssignment::new(format!("late {i}"), ctx.now() - Duration::minutes(1)))
            .await
            .unwrap();
    }

    let passes: Vec<_> = (0..4)
        .map(|_| {
            let scheduler = ctx.scheduler.clone();
            tokio::spawn(async move { scheduler.run_pass().await })
        })
        .collect();

    let mut closed = 0;
    for pass in passes {
        closed += pass.await.unwrap().closed;
    }
    assert_eq!(closed, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_creates_during_passes_get_unique_ids() {
    let ctx = TestContext::new();
    let due = ctx.now() + Duration::days(1);

    let creators: Vec<_> = (0..8)
        .map(|worker| {
            let store = ctx.store.clone();
            tokio::spawn(async move {
                let mut ids = Vec::new();
                for i in 0..25 {
                    let a = store
                        .create(NewAssignment::new(format!("w{worker}-{i}"), due))
                        .await
                        .unwrap();
                    ids.push(a.id);
                }
                ids
            })
        })
        .collect();
    let reconciler = {
        let scheduler = ctx.scheduler.clone();
        tokio::spawn(async move {
            for _ in 0..10 {
                scheduler.run_pass().await;
            }
        })
    };

    let mut ids = Vec::new();
    for creator in creators {
        ids.extend(creator.await.unwrap());
    }
    reconciler.await.unwrap();

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 200);
    assert_eq!(ctx.store.len().await, 200);
}

#[tokio::test]
async fn test_periodic_loop_reconciles_and_stops_on_shutdown() {
    let ctx = TestContext::with_interval_ms(20);
    let shutdown = CancellationToken::new();
    let handle = ctx.scheduler.spawn(shutdown.clone());

    let a = ctx
        .store
        .create(NewAssignment::new("late", ctx.now() + Duration::minutes(1)))
        .await
        .unwrap();
    ctx.clock.advance(Duration::minutes(2));

    let store = ctx.store.clone();
    assert_eventually(
        || {
            let store = store.clone();
            async move { store.get(a.id).await.unwrap().status == AssignmentStatus::Closed }
        },
        StdDuration::from_secs(2),
        "periodic pass should close an overdue assignment",
    )
    .await;

    shutdown.cancel();
    tokio::time::timeout(StdDuration::from_secs(1), handle)
        .await
        .expect("scheduler should stop after shutdown")
        .unwrap();

    // No further passes once the loop has exited.
    let b = ctx
        .store
        .create(NewAssignment::new("after shutdown", ctx.now() - Duration::minutes(1)))
        .await
        .unwrap();
    tokio::time::sleep(StdDuration::from_millis(100)).await;
    assert_eq!(ctx.status_of(b.id).await, AssignmentStatus::Open);
}

#[tokio::test]
async fn test_shutdown_before_first_tick_exits_promptly() {
    let ctx = TestContext::with_interval_ms(60_000);
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let scheduler = Arc::clone(&ctx.scheduler);
    let handle = scheduler.spawn(shutdown);
    tokio::time::timeout(StdDuration::from_secs(1), handle)
        .await
        .expect("cancelled scheduler should exit")
        .unwrap();
}
