//! Expiry sweep behavior over the full service graph.

mod helpers;

use chrono::Duration;

use filecask_core::types::DenyReason;
use filecask_core::Clock;
use filecask_entity::admin::AdminLoginAttempt;
use filecask_service::RedeemOutcome;
use filecask_store::ShareStore;

use helpers::TestEngine;

#[tokio::test]
async fn sweep_removes_expired_records() {
    let engine = TestEngine::new();
    let expired = engine.upload(0, 1).await;
    let live = engine.upload(0, 7).await;

    engine.clock.advance_seconds(2 * 86_400);
    let report = engine.sweep.run_cycle().await.unwrap();
    assert_eq!(report.shares_removed, 1);

    assert!(engine.shares.find_by_id(expired.id).await.unwrap().is_none());
    assert!(engine.shares.find_by_id(live.id).await.unwrap().is_some());

    // The swept code no longer resolves.
    let outcome = engine
        .redemption
        .redeem(&expired.code, "10.0.0.2")
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        RedeemOutcome::Denied(DenyReason::InvalidCode)
    ));
}

#[tokio::test]
async fn sweep_prunes_logs_past_retention() {
    let engine = TestEngine::new();
    let record = engine.upload(0, 30).await;

    // Lift the deadline so only the logs age out, not the record.
    let mut stored = engine.shares.find_by_id(record.id).await.unwrap().unwrap();
    stored.expires_at = None;
    engine.shares.update(stored).await.unwrap();

    // One download event and one old attempt row.
    let outcome = engine
        .redemption
        .authorize_transfer(&record.code, "10.0.0.2", None)
        .await
        .unwrap();
    assert!(outcome.is_authorized());

    let old = engine.clock.now() - Duration::days(45);
    engine
        .attempts
        .append(AdminLoginAttempt::new("1.2.3.4", old, false))
        .await
        .unwrap();

    engine.clock.advance_seconds(31 * 86_400);
    let report = engine.sweep.run_cycle().await.unwrap();

    assert_eq!(report.shares_removed, 0);
    assert_eq!(report.events_pruned, 1);
    assert_eq!(report.attempts_pruned, 1);
    assert!(engine.shares.find_by_id(record.id).await.unwrap().is_some());
}

#[tokio::test]
async fn repeated_sweeps_are_idempotent() {
    let engine = TestEngine::new();
    engine.upload(0, 1).await;

    engine.clock.advance_seconds(2 * 86_400);
    let first = engine.sweep.run_cycle().await.unwrap();
    assert_eq!(first.shares_removed, 1);

    let second = engine.sweep.run_cycle().await.unwrap();
    assert_eq!(second.shares_removed, 0);
    assert_eq!(second.events_pruned, 0);
}
