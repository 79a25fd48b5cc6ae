use super::*;

fn base() -> Profile {
    serde_json::from_value(serde_json::json!({
        "id": "u1",
        "email": "ada@test.com",
        "role": "customer",
        "full_name": "Ada",
        "phone": "+234 801 234 5678",
        "address": "12 Marina Road",
    }))
    .unwrap()
}

#[test]
fn blank_name_is_required() {
    let err = edited_profile(&base(), "  ", "", "").unwrap_err();
    assert_eq!(err.field(), Some("full_name"));
}

#[test]
fn malformed_phone_is_refused() {
    assert_eq!(edited_profile(&base(), "Ada", "12", "").unwrap_err(), ValidationError::InvalidPhone);
}

#[test]
fn blanks_clear_optional_columns_and_keep_identity() {
    let updated = edited_profile(&base(), " Ada Obi ", " ", "").unwrap();
    assert_eq!(updated.full_name.as_deref(), Some("Ada Obi"));
    assert_eq!(updated.phone, None);
    assert_eq!(updated.address, None);
    assert_eq!(updated.id, "u1");
    assert_eq!(updated.email.as_deref(), Some("ada@test.com"));
    assert_eq!(updated.role, Role::Customer);
}
