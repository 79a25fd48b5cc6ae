use super::*;

#[test]
fn missing_type_means_customer() {
    assert_eq!(role_from_query(None), Ok(Role::Customer));
    assert_eq!(role_from_query(Some(" ")), Ok(Role::Customer));
}

#[test]
fn known_types_parse() {
    assert_eq!(role_from_query(Some("user")), Ok(Role::Customer));
    assert_eq!(role_from_query(Some("vendor")), Ok(Role::Vendor));
    assert_eq!(role_from_query(Some("rider")), Ok(Role::Rider));
    assert_eq!(role_from_query(Some("admin")), Ok(Role::Admin));
}

#[test]
fn unknown_type_is_an_error() {
    let err = role_from_query(Some("chef")).unwrap_err();
    assert!(err.to_string().contains("chef"));
}

#[test]
fn paths_round_trip_through_query_parsing() {
    for role in Role::ALL {
        let path = login_path(role);
        let value = path.split_once("type=").map(|(_, v)| v);
        assert_eq!(role_from_query(value), Ok(role));
    }
    assert_eq!(signup_path(Role::Admin), None);
    assert_eq!(signup_path(Role::Rider), Some("/rider/signup"));
}
