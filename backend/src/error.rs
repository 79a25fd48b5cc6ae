//! Uniform application error.
//!
//! DESIGN
//! ======
//! Backend rejections are classified from the structured code fields each
//! service returns (auth `error_code`, row-store SQLSTATE / `PGRST*` codes,
//! storage `statusCode`) with the HTTP status as the fallback signal. Message
//! text is carried for display but never inspected for classification.

use serde::Deserialize;

const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Application-level error classes shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidCredentials,
    EmailNotConfirmed,
    AlreadyRegistered,
    WeakPassword,
    InvalidCode,
    RateLimited,
    Unauthorized,
    PermissionDenied,
    NotFound,
    Conflict,
    Validation,
    Network,
    Decode,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::EmailNotConfirmed => "email_not_confirmed",
            Self::AlreadyRegistered => "already_registered",
            Self::WeakPassword => "weak_password",
            Self::InvalidCode => "invalid_code",
            Self::RateLimited => "rate_limited",
            Self::Unauthorized => "unauthorized",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Decode => "decode",
            Self::Unknown => "unknown",
        }
    }
}

/// Error returned by every façade operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    pub kind: ErrorKind,
    /// HTTP status of the failed call; `0` when no response was received.
    pub status: u16,
    /// Raw message reported by the backend (or the transport).
    pub message: String,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self { kind, status, message: message.into() }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, 0, message)
    }

    #[must_use]
    pub fn decode(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, status, message)
    }

    /// Classify a non-success response from any backend service.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let wire: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let kind = wire
            .structured_code()
            .and_then(|code| kind_from_code(&code))
            .unwrap_or_else(|| kind_from_status(status));
        let message = wire
            .message()
            .unwrap_or_else(|| format!("request failed with status {status}"));
        Self { kind, status, message }
    }

    /// Friendly copy for toasts and inline banners.
    #[must_use]
    pub fn humanize(&self) -> String {
        let canned = match self.kind {
            ErrorKind::InvalidCredentials => "Incorrect email or password.",
            ErrorKind::EmailNotConfirmed => "Please confirm your email address before signing in.",
            ErrorKind::AlreadyRegistered => "An account with this email already exists. Try signing in instead.",
            ErrorKind::WeakPassword => {
                "Password is too weak. Use at least 8 characters with upper and lower case letters and a number."
            }
            ErrorKind::InvalidCode => "That code is invalid or has expired. Request a new one.",
            ErrorKind::RateLimited => "Too many attempts. Please wait a moment and try again.",
            ErrorKind::Unauthorized => "Your session has expired. Please sign in again.",
            ErrorKind::PermissionDenied => "You don't have permission to do that.",
            ErrorKind::NotFound => "We couldn't find what you were looking for.",
            ErrorKind::Conflict => "This record already exists.",
            ErrorKind::Network => "Unable to reach the server. Check your connection and try again.",
            ErrorKind::Validation | ErrorKind::Decode | ErrorKind::Unknown => "",
        };
        if !canned.is_empty() {
            return canned.to_owned();
        }
        let raw = self.message.trim();
        if raw.is_empty() { GENERIC_MESSAGE.to_owned() } else { raw.to_owned() }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::decode(e.status().map_or(0, |s| s.as_u16()), e.to_string())
        } else {
            Self::network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        Self::decode(0, e.to_string())
    }
}

// =============================================================================
// WIRE SHAPES
// =============================================================================

/// Union of the error body fields used by the auth, row, and storage services.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_code: Option<String>,
    code: Option<serde_json::Value>,
    #[serde(rename = "statusCode")]
    status_code: Option<serde_json::Value>,
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn structured_code(&self) -> Option<String> {
        if let Some(code) = self.error_code.as_deref().filter(|c| !c.is_empty()) {
            return Some(code.to_owned());
        }
        // Auth responses echo the numeric status in `code`; only string codes carry meaning.
        if let Some(serde_json::Value::String(code)) = &self.code {
            return Some(code.clone());
        }
        match &self.status_code {
            Some(serde_json::Value::String(code)) => Some(format!("storage:{code}")),
            Some(serde_json::Value::Number(code)) => Some(format!("storage:{code}")),
            _ => None,
        }
    }

    fn message(&self) -> Option<String> {
        [&self.msg, &self.message, &self.error_description, &self.error]
            .into_iter()
            .flatten()
            .map(|m| m.trim())
            .find(|m| !m.is_empty())
            .map(str::to_owned)
    }
}

fn kind_from_code(code: &str) -> Option<ErrorKind> {
    let kind = match code {
        "invalid_credentials" | "invalid_grant" => ErrorKind::InvalidCredentials,
        "email_not_confirmed" | "phone_not_confirmed" => ErrorKind::EmailNotConfirmed,
        "user_already_exists" | "email_exists" | "phone_exists" => ErrorKind::AlreadyRegistered,
        "weak_password" => ErrorKind::WeakPassword,
        "otp_expired" | "otp_disabled" | "flow_state_expired" => ErrorKind::InvalidCode,
        "over_email_send_rate_limit" | "over_request_rate_limit" | "over_sms_send_rate_limit" => {
            ErrorKind::RateLimited
        }
        "bad_jwt" | "no_authorization" | "session_not_found" | "session_expired" | "refresh_token_not_found"
        | "PGRST301" | "PGRST302" => ErrorKind::Unauthorized,
        "not_admin" | "42501" | "storage:403" => ErrorKind::PermissionDenied,
        "user_not_found" | "PGRST116" | "storage:404" => ErrorKind::NotFound,
        "23505" | "storage:409" => ErrorKind::Conflict,
        "validation_failed" | "email_address_invalid" | "23502" | "23503" | "23514" | "22P02" | "PGRST204"
        | "storage:413" => ErrorKind::Validation,
        _ => return None,
    };
    Some(kind)
}

fn kind_from_status(status: u16) -> ErrorKind {
    match status {
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::PermissionDenied,
        404 => ErrorKind::NotFound,
        409 => ErrorKind::Conflict,
        400 | 422 => ErrorKind::Validation,
        429 => ErrorKind::RateLimited,
        _ => ErrorKind::Unknown,
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
