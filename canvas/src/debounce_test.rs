#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn new_debouncer_is_idle() {
    let mut d = Debouncer::new();
    assert!(!d.is_pending());
    assert!(!d.poll(1_000_000.0));
}

#[test]
fn fires_at_deadline_once() {
    let mut d = Debouncer::new();
    d.schedule(1000.0, 50.0);
    assert!(!d.poll(1049.0));
    assert!(d.poll(1050.0));
    assert!(!d.poll(1100.0));
    assert!(!d.is_pending());
}

#[test]
fn reschedule_replaces_deadline() {
    let mut d = Debouncer::new();
    d.schedule(1000.0, 50.0);
    d.schedule(1030.0, 50.0);
    assert!(!d.is_due(1079.0));
    assert!(!d.poll(1050.0));
    assert!(d.poll(1080.0));
}

#[test]
fn shorter_reschedule_still_wins() {
    let mut d = Debouncer::new();
    d.schedule(1000.0, 100.0);
    d.schedule(1010.0, 50.0);
    assert!(d.poll(1060.0));
}

#[test]
fn cancel_clears_pending() {
    let mut d = Debouncer::new();
    d.schedule(0.0, 50.0);
    d.cancel();
    assert!(!d.poll(100.0));
}

#[test]
fn is_due_does_not_consume() {
    let mut d = Debouncer::new();
    d.schedule(0.0, 10.0);
    assert!(d.is_due(10.0));
    assert!(d.is_pending());
    assert!(d.poll(10.0));
}

#[test]
fn negative_delay_fires_immediately() {
    let mut d = Debouncer::new();
    d.schedule(500.0, -20.0);
    assert!(d.poll(500.0));
}
