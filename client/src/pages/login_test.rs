use super::*;

#[test]
fn matching_role_signs_in() {
    assert_eq!(role_mismatch(Role::Vendor, Some(Role::Vendor)), None);
}

#[test]
fn other_portal_is_refused_with_a_pointer() {
    let message = role_mismatch(Role::Rider, Some(Role::Vendor)).unwrap();
    assert!(message.contains("vendor"));
}

#[test]
fn accounts_without_a_role_only_reach_the_customer_portal() {
    assert_eq!(role_mismatch(Role::Customer, None), None);
    assert!(role_mismatch(Role::Admin, None).is_some());
}

#[test]
fn unfinished_applications_resume_when_a_draft_exists() {
    assert_eq!(post_login_path(Role::Vendor, Some(ReviewStatus::Draft), true), "/vendor/signup");
    assert_eq!(post_login_path(Role::Rider, None, true), "/rider/signup");
}

#[test]
fn everything_else_goes_home() {
    assert_eq!(post_login_path(Role::Vendor, Some(ReviewStatus::Draft), false), "/dashboard");
    assert_eq!(post_login_path(Role::Vendor, Some(ReviewStatus::Approved), true), "/dashboard");
    assert_eq!(post_login_path(Role::Customer, None, true), "/market");
}

fn cached(role: Option<Role>) -> AuthUser {
    AuthUser { id: "u1".into(), email: "ada@test.com".into(), role }
}

#[test]
fn remembered_email_only_for_the_same_portal() {
    let vendor = cached(Some(Role::Vendor));
    assert_eq!(remembered_email(Some(&vendor), Role::Vendor).as_deref(), Some("ada@test.com"));
    assert_eq!(remembered_email(Some(&vendor), Role::Rider), None);
    assert_eq!(remembered_email(Some(&cached(None)), Role::Customer).as_deref(), Some("ada@test.com"));
    assert_eq!(remembered_email(None, Role::Customer), None);
}

#[test]
fn failed_role_lookup_is_an_error_not_a_missing_row() {
    let down = Err(AppError::network("offline"));
    let err = landing(Role::Vendor, down, true).unwrap_err();
    assert!(!err.is_empty());
    assert_eq!(landing(Role::Vendor, Ok(Some(ReviewStatus::Approved)), true).unwrap(), "/dashboard");
    assert_eq!(landing(Role::Vendor, Ok(None), true).unwrap(), "/vendor/signup");
}
