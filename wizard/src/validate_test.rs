use super::*;

// =============================================================================
// email
// =============================================================================

#[test]
fn normalize_email_trims_and_lowercases() {
    assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
}

#[test]
fn email_shape() {
    assert!(is_valid_email("user@test.com"));
    assert!(is_valid_email("a.b+c@mail.example.org"));
    assert!(!is_valid_email("user@test"));
    assert!(!is_valid_email("@test.com"));
    assert!(!is_valid_email("user@@test.com"));
    assert!(!is_valid_email("us er@test.com"));
    assert!(!is_valid_email("user@test..com"));
}

#[test]
fn check_email_distinguishes_blank_from_malformed() {
    assert_eq!(check_email(" "), Err(ValidationError::Required { field: "email", label: "Email" }));
    assert_eq!(check_email("nope"), Err(ValidationError::InvalidEmail));
    assert!(check_email("user@test.com").is_ok());
}

// =============================================================================
// password
// =============================================================================

#[test]
fn password_strength_rules() {
    assert!(is_strong_password("Passw0rd"));
    assert!(is_strong_password("Abcd1234"));
    assert!(!is_strong_password("password"));
    assert!(!is_strong_password("PASS1234"));
    assert!(!is_strong_password("Pass123"));
    assert!(!is_strong_password("Password"));
}

#[test]
fn new_password_must_match_confirmation() {
    assert_eq!(check_new_password("Passw0rd", "Passw0rd!"), Err(ValidationError::PasswordMismatch));
    assert_eq!(check_new_password("password", "password"), Err(ValidationError::WeakPassword));
    assert!(check_new_password("Passw0rd", "Passw0rd").is_ok());
}

// =============================================================================
// code
// =============================================================================

#[test]
fn code_input_keeps_digits_only() {
    assert_eq!(normalize_code_input("12a456"), "12456");
    assert!(!is_complete_code(&normalize_code_input("12a456")));
    assert_eq!(normalize_code_input(" 123-456 "), "123456");
    assert_eq!(normalize_code_input("1234567"), "123456");
}

#[test]
fn check_code_requires_six_digits() {
    assert_eq!(check_code("12345"), Err(ValidationError::IncompleteCode));
    assert!(check_code("123456").is_ok());
}

// =============================================================================
// misc fields
// =============================================================================

#[test]
fn phone_accepts_common_formats() {
    assert!(is_valid_phone("+1 (555) 123-4567"));
    assert!(is_valid_phone("0803 555 1234"));
    assert!(!is_valid_phone("12345"));
    assert!(!is_valid_phone("call me"));
    assert!(!is_valid_phone("+1 555 123 4567 8901 23"));
}

#[test]
fn account_number_digits_only() {
    assert!(check_account_number("0123 4567 89").is_ok());
    assert!(check_account_number("12ab56").is_err());
    assert!(check_account_number("123").is_err());
}

#[test]
fn terms_requires_true() {
    assert!(check_terms("true").is_ok());
    assert_eq!(check_terms(""), Err(ValidationError::TermsNotAccepted));
}

#[test]
fn errors_name_their_field_and_read_well() {
    let err = ValidationError::Required { field: "full_name", label: "Full name" };
    assert_eq!(err.field(), Some("full_name"));
    assert_eq!(err.to_string(), "Full name is required");
    assert_eq!(ValidationError::PasswordMismatch.field(), Some("confirm_password"));
}
