//! The four registration flows and the step pieces they share.
//!
//! Credentials, verification, personal details, documents, banking, and
//! terms look the same across roles; only the rows they land in differ.

pub mod customer;
pub mod password_reset;
pub mod rider;
pub mod vendor;

pub use customer::CustomerSignup;
pub use password_reset::PasswordReset;
pub use rider::RiderRegistration;
pub use vendor::VendorOnboarding;

use backend::rows::ReviewStatus;
use backend::{Bucket, OtpPurpose, Query, Role, Table};
use serde_json::{Map, Value, json};

use crate::draft::Draft;
use crate::effect::Effect;
use crate::machine::StepError;
use crate::validate::{
    ValidationError, check_account_number, check_code, check_email, check_new_password, check_phone, check_terms,
    normalize_email, require,
};

pub(crate) const CREDENTIAL_FIELDS: &[&str] = &["email", "password", "confirm_password"];
pub(crate) const CODE_FIELDS: &[&str] = &["code"];
pub(crate) const PERSONAL_FIELDS: &[&str] = &["full_name", "phone"];
pub(crate) const BANK_FIELDS: &[&str] = &["bank_name", "account_name", "account_number"];
pub(crate) const TERMS_FIELDS: &[&str] = &["accept_terms"];

pub(crate) fn user_id(draft: &Draft) -> Result<String, StepError> {
    draft.user_id().map(str::to_owned).ok_or(StepError::SessionRequired)
}

pub(crate) fn by_id(id: &str) -> Query {
    Query::new().eq("id", id)
}

// =============================================================================
// CREDENTIALS & VERIFICATION
// =============================================================================

pub(crate) fn validate_credentials(draft: &Draft) -> Result<(), ValidationError> {
    check_email(draft.get("email"))?;
    check_new_password(draft.get("password"), draft.get("confirm_password"))
}

pub(crate) fn sign_up(draft: &Draft, role: Role) -> Vec<Effect> {
    vec![Effect::SignUp { email: normalize_email(draft.get("email")), password: draft.get("password").to_owned(), role }]
}

pub(crate) fn validate_code(draft: &Draft) -> Result<(), ValidationError> {
    check_code(draft.trimmed("code"))
}

/// Verify the sign-up code, then create the profile row for the new account.
///
/// Codes are single-use. Once the draft holds a session for this email the
/// code has been spent, so a retry only writes the profile row.
pub(crate) fn verify_sign_up(draft: &Draft, role: Role) -> Result<Vec<Effect>, StepError> {
    let id = user_id(draft)?;
    let email = normalize_email(draft.get("email"));
    let mut effects = Vec::with_capacity(2);
    if !draft.session().is_some_and(|s| s.user.email == email) {
        effects.push(Effect::VerifyCode {
            email: email.clone(),
            code: draft.trimmed("code").to_owned(),
            purpose: OtpPurpose::Signup,
        });
    }
    effects.push(Effect::Upsert {
        table: Table::Profiles,
        row: json!({ "id": id, "email": email, "role": role }),
        on_conflict: "id",
    });
    Ok(effects)
}

// =============================================================================
// PERSONAL
// =============================================================================

pub(crate) fn validate_personal(draft: &Draft) -> Result<(), ValidationError> {
    require(draft.get("full_name"), "full_name", "Full name")?;
    check_phone(draft.get("phone"))
}

pub(crate) fn update_personal(draft: &Draft) -> Result<Vec<Effect>, StepError> {
    let id = user_id(draft)?;
    Ok(vec![Effect::Update {
        table: Table::Profiles,
        query: by_id(&id),
        patch: json!({ "full_name": draft.trimmed("full_name"), "phone": draft.trimmed("phone") }),
    }])
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// An attachment slot on a documents step.
pub(crate) struct DocumentSlot {
    pub key: &'static str,
    pub label: &'static str,
    /// Object name without extension, e.g. `business-license`.
    pub stem: &'static str,
    pub bucket: Bucket,
    /// Row column that stores the object path.
    pub column: &'static str,
}

/// A slot is satisfied by a fresh attachment or by an earlier upload.
pub(crate) fn require_document(draft: &Draft, slot: &DocumentSlot) -> Result<(), ValidationError> {
    if draft.attachment(slot.key).is_some_and(|f| !f.is_empty()) || draft.upload_path(slot.key).is_some() {
        return Ok(());
    }
    Err(ValidationError::MissingDocument { field: slot.key, label: slot.label })
}

/// Upload every attached slot not already stored and point `table`'s row at
/// the stored paths.
pub(crate) fn store_documents(draft: &Draft, table: Table, slots: &[&DocumentSlot]) -> Result<Vec<Effect>, StepError> {
    let id = user_id(draft)?;
    let mut effects = Vec::new();
    let mut patch = Map::new();
    for slot in slots {
        let fresh = draft.attachment(slot.key).filter(|f| !f.is_empty() && !draft.is_uploaded(slot.key));
        let path = if let Some(file) = fresh {
            let path = format!("{id}/{}.{}", slot.stem, file.extension());
            effects.push(Effect::Upload { key: slot.key.to_owned(), bucket: slot.bucket, path: path.clone(), file: file.clone() });
            Some(path)
        } else {
            draft.upload_path(slot.key).map(str::to_owned)
        };
        if let Some(path) = path {
            patch.insert(slot.column.to_owned(), Value::String(path));
        }
    }
    effects.push(Effect::Update { table, query: by_id(&id), patch: Value::Object(patch) });
    Ok(effects)
}

// =============================================================================
// BANKING & TERMS
// =============================================================================

pub(crate) fn validate_banking(draft: &Draft) -> Result<(), ValidationError> {
    require(draft.get("bank_name"), "bank_name", "Bank name")?;
    require(draft.get("account_name"), "account_name", "Account holder name")?;
    check_account_number(draft.get("account_number"))
}

pub(crate) fn update_banking(draft: &Draft, table: Table) -> Result<Vec<Effect>, StepError> {
    let id = user_id(draft)?;
    let digits: String = draft.get("account_number").chars().filter(char::is_ascii_digit).collect();
    Ok(vec![Effect::Update {
        table,
        query: by_id(&id),
        patch: json!({
            "bank_name": draft.trimmed("bank_name"),
            "account_name": draft.trimmed("account_name"),
            "account_number": digits,
        }),
    }])
}

pub(crate) fn validate_terms(draft: &Draft) -> Result<(), ValidationError> {
    check_terms(draft.get("accept_terms"))
}

/// Accepting the terms submits the application for review.
pub(crate) fn submit_for_review(draft: &Draft, table: Table) -> Result<Vec<Effect>, StepError> {
    let id = user_id(draft)?;
    Ok(vec![Effect::Update {
        table,
        query: by_id(&id),
        patch: json!({ "terms_accepted": true, "status": ReviewStatus::PendingReview }),
    }])
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
