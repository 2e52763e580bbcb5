//! Integration tests for the guard lifecycle.
//!
//! Drives guards through a real EntitlementProvider:
//! - loading placeholder before resolution
//! - single notification across re-renders
//! - invalidation and refresh
//! - unmount while loading

use entitle_auth::{Principal, Requirement};
use entitle_guard::testing::RecordingNotifier;
use entitle_guard::{
    EntitlementProvider, Guard, GuardOutcome, GuardSpec, GuardState, OnDeny, ProviderSnapshot,
};
use std::sync::Arc;

// =============================================================================
// Fixtures
// =============================================================================

fn guard_with_recorder(spec: GuardSpec) -> (Guard, Arc<RecordingNotifier>) {
    let recorder = Arc::new(RecordingNotifier::new());
    let guard = Guard::new("reports", spec)
        .at("/messaging/reports")
        .with_notifier(recorder.clone());
    (guard, recorder)
}

fn reports_spec() -> GuardSpec {
    GuardSpec::feature(["MESSAGING_REPORT_VIEW"])
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn placeholder_regardless_of_eventual_decision() {
    let provider = EntitlementProvider::new();

    for spec in [
        GuardSpec::unrestricted(),
        reports_spec(),
        GuardSpec::Feature(vec![]),
    ] {
        let (mut guard, recorder) = guard_with_recorder(spec);
        assert_eq!(guard.evaluate(&provider.snapshot()), GuardOutcome::Placeholder);
        assert_eq!(guard.state(), GuardState::Loading);
        assert_eq!(recorder.count(), 0);
    }
}

#[tokio::test]
async fn settle_resolves_after_provider_load() {
    let provider = EntitlementProvider::new();
    let mut rx = provider.subscribe();
    let (mut guard, recorder) = guard_with_recorder(reports_spec());

    let handle = tokio::spawn(async move {
        let outcome = guard.settle(&mut rx).await;
        (outcome, recorder.count())
    });

    tokio::task::yield_now().await;
    provider.resolve(Principal::new().grant("MESSAGING_SEND"));

    let (outcome, notices) = handle.await.expect("guard task");
    assert!(matches!(outcome, Some(GuardOutcome::Fallback(_))));
    assert_eq!(notices, 1);
}

#[tokio::test]
async fn failed_load_settles_as_denied_not_loading() {
    let provider = EntitlementProvider::new();
    let mut rx = provider.subscribe();
    let (mut guard, _) = guard_with_recorder(reports_spec());

    provider.fail("permissions endpoint returned 503");

    let outcome = guard.settle(&mut rx).await.expect("still mounted");
    assert_eq!(outcome.state(), GuardState::Denied);
}

#[tokio::test]
async fn provider_dropped_while_loading() {
    let provider = EntitlementProvider::new();
    let mut rx = provider.subscribe();
    let (mut guard, _) = guard_with_recorder(reports_spec());

    drop(provider);

    assert_eq!(guard.settle(&mut rx).await, None);
    assert_eq!(guard.state(), GuardState::Loading);
}

// =============================================================================
// Notification latch
// =============================================================================

#[test]
fn exactly_one_notification_across_rerenders() {
    let provider = EntitlementProvider::new();
    let (mut guard, recorder) = guard_with_recorder(reports_spec());

    guard.evaluate(&provider.snapshot());
    provider.resolve(Principal::new().grant("MESSAGING_SEND"));

    for _ in 0..10 {
        let outcome = guard.evaluate(&provider.snapshot());
        assert_eq!(outcome.state(), GuardState::Denied);
    }

    let notices = recorder.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].guard, "reports");
    assert_eq!(notices[0].path, "/messaging/reports");
}

#[test]
fn refetch_with_same_denial_does_not_renotify() {
    let provider = EntitlementProvider::new();
    let (mut guard, recorder) = guard_with_recorder(reports_spec());

    provider.resolve(Principal::new());
    guard.evaluate(&provider.snapshot());

    provider.invalidate();
    assert_eq!(guard.evaluate(&provider.snapshot()), GuardOutcome::Placeholder);

    provider.resolve(Principal::new());
    guard.evaluate(&provider.snapshot());

    assert_eq!(recorder.count(), 1);
}

// =============================================================================
// Refresh and navigation
// =============================================================================

#[test]
fn upgrade_flips_denied_to_allowed() {
    let provider = EntitlementProvider::new();
    let (mut guard, _) = guard_with_recorder(reports_spec());

    provider.resolve(Principal::new().grant("MESSAGING_SEND"));
    assert_eq!(guard.evaluate(&provider.snapshot()).state(), GuardState::Denied);

    provider.invalidate();
    guard.evaluate(&provider.snapshot());
    assert_eq!(guard.state(), GuardState::Loading);

    provider.resolve(
        Principal::new()
            .grant("MESSAGING_SEND")
            .grant("MESSAGING_REPORT_VIEW"),
    );
    assert_eq!(guard.evaluate(&provider.snapshot()), GuardOutcome::Content);
}

#[test]
fn navigation_swaps_requirement() {
    let snapshot = ProviderSnapshot::ready(Principal::new().with_role("business"));
    let (guard, _) = guard_with_recorder(GuardSpec::unrestricted());
    let mut guard = guard.on_deny(OnDeny::Redirect {
        to: "/no-access".into(),
    });

    assert_eq!(guard.evaluate(&snapshot), GuardOutcome::Content);

    guard.set_path("/admin/plans");
    guard.set_spec(GuardSpec::rule(Requirement::roles_any_of(["admin"])));
    assert_eq!(guard.state(), GuardState::Loading);

    match guard.evaluate(&snapshot) {
        GuardOutcome::Redirect(redirect) => {
            assert_eq!(
                redirect.location(),
                "/no-access?reason=role&from=%2Fadmin%2Fplans"
            );
        }
        other => panic!("expected redirect, got {other:?}"),
    }
}

// =============================================================================
// Unmount
// =============================================================================

#[tokio::test]
async fn unmount_while_loading_stops_everything() {
    let provider = EntitlementProvider::new();
    let mut rx = provider.subscribe();
    let (mut guard, recorder) = guard_with_recorder(reports_spec());
    let mount = guard.mount_handle();

    let handle = tokio::spawn(async move {
        let outcome = guard.settle(&mut rx).await;
        (outcome, guard.state())
    });

    tokio::task::yield_now().await;
    mount.unmount();
    provider.resolve(Principal::new());

    let (outcome, state) = handle.await.expect("guard task");
    assert_eq!(outcome, None);
    assert_eq!(state, GuardState::Loading);
    assert_eq!(recorder.count(), 0);
}
