use std::time::{Duration, Instant};

use pausesync::{ResyncDecision, ResyncScheduler, RESYNC_QUIET};

#[test]
fn first_request_sends_immediately() {
    let mut scheduler = ResyncScheduler::new();
    assert_eq!(scheduler.request(Instant::now(), true), ResyncDecision::SendNow);
    assert_eq!(scheduler.pending(), None);
}

#[test]
fn request_inside_the_window_defers_to_its_edge() {
    let t0 = Instant::now();
    let mut scheduler = ResyncScheduler::new();
    assert_eq!(scheduler.request(t0, true), ResyncDecision::SendNow);
    let decision = scheduler.request(t0 + Duration::from_secs(2), true);
    assert_eq!(decision, ResyncDecision::ScheduledAt(t0 + RESYNC_QUIET));
    assert_eq!(scheduler.pending(), Some(t0 + RESYNC_QUIET));
}

#[test]
fn further_requests_coalesce_into_the_pending_send() {
    let t0 = Instant::now();
    let mut scheduler = ResyncScheduler::new();
    scheduler.request(t0, true);
    scheduler.request(t0 + Duration::from_secs(1), true);
    assert_eq!(
        scheduler.request(t0 + Duration::from_secs(2), true),
        ResyncDecision::Coalesced
    );
    assert_eq!(
        scheduler.request(t0 + Duration::from_secs(3), true),
        ResyncDecision::Coalesced
    );
    // Still exactly one pending send, at the first deadline.
    assert_eq!(scheduler.pending(), Some(t0 + RESYNC_QUIET));
}

#[test]
fn deferral_disabled_drops_the_request() {
    let t0 = Instant::now();
    let mut scheduler = ResyncScheduler::new();
    scheduler.request(t0, true);
    assert_eq!(
        scheduler.request(t0 + Duration::from_secs(2), false),
        ResyncDecision::Skipped
    );
    assert_eq!(scheduler.pending(), None);
}

#[test]
fn poll_fires_exactly_once() {
    let t0 = Instant::now();
    let mut scheduler = ResyncScheduler::new();
    scheduler.request(t0, true);
    scheduler.request(t0 + Duration::from_secs(2), true);
    let edge = t0 + RESYNC_QUIET;
    assert!(!scheduler.poll(edge - Duration::from_millis(1)));
    assert!(scheduler.poll(edge));
    assert!(!scheduler.poll(edge + Duration::from_millis(1)));
    assert_eq!(scheduler.pending(), None);
}

#[test]
fn window_restarts_after_a_deferred_send() {
    let t0 = Instant::now();
    let mut scheduler = ResyncScheduler::new();
    scheduler.request(t0, true);
    scheduler.request(t0 + Duration::from_secs(1), true);
    let fired_at = t0 + RESYNC_QUIET + Duration::from_millis(10);
    assert!(scheduler.poll(fired_at));
    // The deferred send opened a fresh quiet window.
    assert_eq!(
        scheduler.request(fired_at + Duration::from_secs(1), true),
        ResyncDecision::ScheduledAt(fired_at + RESYNC_QUIET)
    );
}

#[test]
fn request_outside_the_window_sends_now_again() {
    let t0 = Instant::now();
    let mut scheduler = ResyncScheduler::new();
    scheduler.request(t0, true);
    assert_eq!(
        scheduler.request(t0 + RESYNC_QUIET + Duration::from_millis(1), true),
        ResyncDecision::SendNow
    );
}

#[test]
fn exact_window_boundary_still_defers() {
    let t0 = Instant::now();
    let mut scheduler = ResyncScheduler::new();
    scheduler.request(t0, true);
    assert_eq!(
        scheduler.request(t0 + RESYNC_QUIET, true),
        ResyncDecision::ScheduledAt(t0 + RESYNC_QUIET)
    );
}
