use super::*;

// =============================================================================
// from_response: auth service
// =============================================================================

#[test]
fn auth_invalid_credentials_maps_from_error_code() {
    let body = r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#;
    let err = AppError::from_response(400, body);
    assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    assert_eq!(err.status, 400);
    assert_eq!(err.message, "Invalid login credentials");
}

#[test]
fn auth_email_not_confirmed_maps_from_error_code() {
    let body = r#"{"code":400,"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#;
    assert_eq!(AppError::from_response(400, body).kind, ErrorKind::EmailNotConfirmed);
}

#[test]
fn auth_duplicate_signup_maps_to_already_registered() {
    let body = r#"{"code":422,"error_code":"user_already_exists","msg":"User already registered"}"#;
    assert_eq!(AppError::from_response(422, body).kind, ErrorKind::AlreadyRegistered);
}

#[test]
fn auth_expired_code_maps_to_invalid_code() {
    let body = r#"{"code":403,"error_code":"otp_expired","msg":"Token has expired or is invalid"}"#;
    assert_eq!(AppError::from_response(403, body).kind, ErrorKind::InvalidCode);
}

#[test]
fn message_text_does_not_drive_classification() {
    // Same wording as a credentials failure, but no structured code.
    let body = r#"{"msg":"Invalid login credentials"}"#;
    assert_eq!(AppError::from_response(500, body).kind, ErrorKind::Unknown);
}

// =============================================================================
// from_response: row and storage services
// =============================================================================

#[test]
fn rest_unique_violation_maps_to_conflict() {
    let body = r#"{"code":"23505","details":null,"hint":null,"message":"duplicate key value violates unique constraint"}"#;
    let err = AppError::from_response(409, body);
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.message.starts_with("duplicate key"));
}

#[test]
fn rest_rls_violation_maps_to_permission_denied() {
    let body = r#"{"code":"42501","message":"new row violates row-level security policy"}"#;
    assert_eq!(AppError::from_response(403, body).kind, ErrorKind::PermissionDenied);
}

#[test]
fn rest_single_row_missing_maps_to_not_found() {
    let body = r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#;
    assert_eq!(AppError::from_response(406, body).kind, ErrorKind::NotFound);
}

#[test]
fn storage_status_code_string_is_structured() {
    let body = r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#;
    let err = AppError::from_response(400, body);
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(err.message, "The resource already exists");
}

#[test]
fn unknown_code_falls_back_to_status() {
    let body = r#"{"error_code":"something_new","msg":"new failure"}"#;
    assert_eq!(AppError::from_response(429, body).kind, ErrorKind::RateLimited);
    assert_eq!(AppError::from_response(503, body).kind, ErrorKind::Unknown);
}

#[test]
fn non_json_body_uses_status_and_generic_message() {
    let err = AppError::from_response(404, "<html>nope</html>");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.message, "request failed with status 404");
}

// =============================================================================
// humanize
// =============================================================================

#[test]
fn humanize_uses_friendly_copy_for_known_kinds() {
    let err = AppError::new(ErrorKind::InvalidCredentials, 400, "Invalid login credentials");
    assert_eq!(err.humanize(), "Incorrect email or password.");
    let err = AppError::new(ErrorKind::AlreadyRegistered, 422, "User already registered");
    assert!(err.humanize().contains("already exists"));
}

#[test]
fn humanize_falls_back_to_raw_message() {
    let err = AppError::new(ErrorKind::Validation, 400, "  phone must be 10 digits ");
    assert_eq!(err.humanize(), "phone must be 10 digits");
}

#[test]
fn humanize_falls_back_to_generic_when_raw_empty() {
    let err = AppError::new(ErrorKind::Unknown, 500, "");
    assert_eq!(err.humanize(), GENERIC_MESSAGE);
}

#[test]
fn display_is_raw_message() {
    let err = AppError::network("connection refused");
    assert_eq!(err.to_string(), "connection refused");
    assert_eq!(err.status, 0);
    assert_eq!(err.kind.as_str(), "network");
}
