use super::*;

#[test]
fn begin_flips_and_locks() {
    let mut toggle = OptimisticToggle::new(false);
    assert_eq!(toggle.begin(), Some(true));
    assert!(toggle.value());
    assert!(toggle.is_pending());
    assert_eq!(toggle.begin(), None);
    assert!(toggle.value());
}

#[test]
fn settle_keeps_new_value() {
    let mut toggle = OptimisticToggle::new(false);
    toggle.begin();
    toggle.settle();
    assert!(toggle.value());
    assert!(!toggle.is_pending());
}

#[test]
fn revert_restores_old_value() {
    let mut toggle = OptimisticToggle::new(true);
    toggle.begin();
    toggle.revert();
    assert!(toggle.value());
    assert!(!toggle.is_pending());
}

#[test]
fn sync_waits_for_pending_write() {
    let mut toggle = OptimisticToggle::new(false);
    toggle.begin();
    toggle.sync(false);
    assert!(toggle.value());
    toggle.settle();
    toggle.sync(false);
    assert!(!toggle.value());
}
