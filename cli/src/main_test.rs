use super::*;
use clap::CommandFactory;
use time::macros::datetime;
use wizard::reconcile::{Orphan, OrphanReason};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("foodctl").chain(args.iter().copied())).unwrap()
}

#[test]
fn command_tree_is_well_formed() {
    Cli::command().debug_assert();
}

#[test]
fn reconcile_defaults_to_a_dry_run_with_standard_ages() {
    let Command::Reconcile(args) = parse(&["reconcile"]).command else { panic!("expected reconcile") };
    assert_eq!(args.max_age_hours, 24);
    assert_eq!(args.discard_after_hours, 168);
    assert!(!args.apply);
}

#[test]
fn reconcile_accepts_custom_ages_and_apply() {
    let Command::Reconcile(args) =
        parse(&["reconcile", "--max-age-hours", "48", "--discard-after-hours", "72", "--apply"]).command
    else {
        panic!("expected reconcile")
    };
    assert_eq!((args.max_age_hours, args.discard_after_hours, args.apply), (48, 72, true));
}

#[test]
fn review_actions_map_to_statuses() {
    let Command::Vendors(v) = parse(&["vendors", "approve", "v-1"]).command else { panic!("expected vendors") };
    assert_eq!(v.command.target(), Some(("v-1", ReviewStatus::Approved)));
    let Command::Riders(r) = parse(&["riders", "reject", "r-1"]).command else { panic!("expected riders") };
    assert_eq!(r.command.target(), Some(("r-1", ReviewStatus::Rejected)));
    let Command::Vendors(v) = parse(&["vendors", "pending"]).command else { panic!("expected vendors") };
    assert_eq!(v.command.target(), None);
}

#[test]
fn pending_cutoff_only_when_asked() {
    let now = datetime!(2026-03-10 12:00 UTC);
    let Command::Vendors(v) = parse(&["vendors", "pending", "--older-than-hours", "48"]).command else {
        panic!("expected vendors")
    };
    assert_eq!(v.command.cutoff(now), Some(datetime!(2026-03-08 12:00 UTC)));
    let Command::Vendors(v) = parse(&["vendors", "pending"]).command else { panic!("expected vendors") };
    assert_eq!(v.command.cutoff(now), None);
}

#[test]
fn order_filters_are_mutually_exclusive() {
    assert!(Cli::try_parse_from(["foodctl", "orders", "list", "--customer", "a", "--vendor", "b"]).is_err());
    let Command::Orders(o) = parse(&["orders", "list", "--rider", "r-9"]).command else { panic!("expected orders") };
    let OrdersSubcommand::List(filter) = o.command;
    assert_eq!(filter.participant(), (Role::Rider, "r-9"));
    assert_eq!(OrderFilter::default().participant(), (Role::Admin, ""));
}

#[test]
fn plan_lists_one_line_per_account() {
    let orphan = Orphan {
        user_id: "u-1".into(),
        email: None,
        role: Role::Vendor,
        reason: OrphanReason::StuckDraft,
        created_at: datetime!(2026-03-01 0:00 UTC),
    };
    let rendered = render_plan(&[PlannedAction { orphan, action: Action::Discard }]);
    assert_eq!(rendered.lines().count(), 1);
    assert!(rendered.starts_with("discard"));
    assert!(rendered.contains("stuck_draft"));
    assert!(rendered.trim_end().ends_with("u-1 -"));
    assert_eq!(render_plan(&[]), "no abandoned registrations\n");
}

#[test]
fn report_names_failures() {
    let report = ReconcileReport {
        resumable: 2,
        discarded: vec!["a".into()],
        failed: vec![("b".into(), AppError::network("timeout"))],
    };
    let rendered = render_report(&report);
    assert!(rendered.starts_with("discarded 1, left 2 to resume"));
    assert!(rendered.contains("failed b:"));
}
