//! Field validation for registration steps.
//!
//! Everything here is pure and runs before any remote call. Failures are
//! [`ValidationError`] values whose `Display` is the inline message shown
//! next to the form.

pub const MIN_PASSWORD_LEN: usize = 8;
pub const CODE_LEN: usize = 6;
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{label} is required")]
    Required { field: &'static str, label: &'static str },
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least 8 characters and include an uppercase letter, a lowercase letter, and a number")]
    WeakPassword,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Enter the 6-digit code from your email")]
    IncompleteCode,
    #[error("Enter a valid phone number")]
    InvalidPhone,
    #[error("{label} is not valid")]
    Invalid { field: &'static str, label: &'static str },
    #[error("{label} must be uploaded")]
    MissingDocument { field: &'static str, label: &'static str },
    #[error("Please accept the terms to continue")]
    TermsNotAccepted,
}

impl ValidationError {
    /// Form field the error belongs to, for focusing and highlighting.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Required { field, .. } | Self::Invalid { field, .. } | Self::MissingDocument { field, .. } => {
                Some(*field)
            }
            Self::InvalidEmail => Some("email"),
            Self::WeakPassword => Some("password"),
            Self::PasswordMismatch => Some("confirm_password"),
            Self::IncompleteCode => Some("code"),
            Self::InvalidPhone => Some("phone"),
            Self::TermsNotAccepted => Some("accept_terms"),
        }
    }
}

#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Shape check only: one `@`, a non-empty local part, and a dotted domain.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

/// At least [`MIN_PASSWORD_LEN`] characters with upper, lower, and a digit.
#[must_use]
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Keep only digits, capped at [`CODE_LEN`]. Applied on every keystroke.
#[must_use]
pub fn normalize_code_input(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).take(CODE_LEN).collect()
}

#[must_use]
pub fn is_complete_code(code: &str) -> bool {
    code.len() == CODE_LEN && code.chars().all(|c| c.is_ascii_digit())
}

/// Digits with optional leading `+` and common separators.
#[must_use]
pub fn is_valid_phone(raw: &str) -> bool {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !body.chars().all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '.')) {
        return false;
    }
    let digits = body.chars().filter(char::is_ascii_digit).count();
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

// =============================================================================
// CHECKS
// =============================================================================

/// # Errors
///
/// `Required` when the trimmed value is empty.
pub fn require(value: &str, field: &'static str, label: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field, label });
    }
    Ok(())
}

/// # Errors
///
/// `Required` or `InvalidEmail`.
pub fn check_email(email: &str) -> Result<(), ValidationError> {
    require(email, "email", "Email")?;
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// # Errors
///
/// `Required`, `WeakPassword`, or `PasswordMismatch`.
pub fn check_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required { field: "password", label: "Password" });
    }
    if !is_strong_password(password) {
        return Err(ValidationError::WeakPassword);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// # Errors
///
/// `IncompleteCode` unless exactly six digits.
pub fn check_code(code: &str) -> Result<(), ValidationError> {
    if !is_complete_code(code) {
        return Err(ValidationError::IncompleteCode);
    }
    Ok(())
}

/// # Errors
///
/// `Required` or `InvalidPhone`.
pub fn check_phone(phone: &str) -> Result<(), ValidationError> {
    require(phone, "phone", "Phone number")?;
    if !is_valid_phone(phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

/// Bank account numbers: 6 to 18 digits, separators ignored.
///
/// # Errors
///
/// `Required` or `Invalid`.
pub fn check_account_number(raw: &str) -> Result<(), ValidationError> {
    require(raw, "account_number", "Account number")?;
    let ok = raw.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
        && (6..=18).contains(&raw.chars().filter(char::is_ascii_digit).count());
    if !ok {
        return Err(ValidationError::Invalid { field: "account_number", label: "Account number" });
    }
    Ok(())
}

/// Checkbox values arrive as `"true"`.
///
/// # Errors
///
/// `TermsNotAccepted` unless the box is ticked.
pub fn check_terms(value: &str) -> Result<(), ValidationError> {
    if value != "true" {
        return Err(ValidationError::TermsNotAccepted);
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
