//! Vendor onboarding: Credentials → Verify → Personal → Business →
//! Documents → Banking → Terms → Done.
//!
//! The vendor row is created on the Business step in `draft` status and
//! moves to `pending_review` when the terms are accepted.

use backend::rows::ReviewStatus;
use backend::{Bucket, OtpPurpose, Role, Table};
use serde_json::json;

use super::{
    BANK_FIELDS, CODE_FIELDS, CREDENTIAL_FIELDS, DocumentSlot, PERSONAL_FIELDS, TERMS_FIELDS, require_document,
    sign_up, store_documents, submit_for_review, update_banking, update_personal, user_id, validate_banking,
    validate_code, validate_credentials, validate_personal, validate_terms, verify_sign_up,
};
use crate::draft::Draft;
use crate::effect::Effect;
use crate::machine::{Flow, FlowKind, StepError, StepId};
use crate::validate::{ValidationError, require};

const BUSINESS_FIELDS: &[&str] = &["business_name", "cuisine", "description", "address", "city"];
const DOCUMENT_KEYS: &[&str] = &["business_license", "id_document", "logo"];

const BUSINESS_LICENSE: DocumentSlot = DocumentSlot {
    key: "business_license",
    label: "Business license",
    stem: "business-license",
    bucket: Bucket::Documents,
    column: "business_license_path",
};
const ID_DOCUMENT: DocumentSlot = DocumentSlot {
    key: "id_document",
    label: "Government ID",
    stem: "id-document",
    bucket: Bucket::Documents,
    column: "id_document_path",
};
const LOGO: DocumentSlot =
    DocumentSlot { key: "logo", label: "Logo", stem: "logo", bucket: Bucket::Avatars, column: "logo_url" };

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VendorOnboarding;

impl Flow for VendorOnboarding {
    const KIND: FlowKind = FlowKind::Vendor;
    const STEPS: &'static [StepId] = &[
        StepId::Credentials,
        StepId::Verify,
        StepId::Personal,
        StepId::Business,
        StepId::Documents,
        StepId::Banking,
        StepId::Terms,
        StepId::Done,
    ];

    fn role(&self) -> Role {
        Role::Vendor
    }

    fn fields(&self, step: StepId) -> &'static [&'static str] {
        match step {
            StepId::Credentials => CREDENTIAL_FIELDS,
            StepId::Verify => CODE_FIELDS,
            StepId::Personal => PERSONAL_FIELDS,
            StepId::Business => BUSINESS_FIELDS,
            StepId::Banking => BANK_FIELDS,
            StepId::Terms => TERMS_FIELDS,
            _ => &[],
        }
    }

    fn attachments(&self, step: StepId) -> &'static [&'static str] {
        if step == StepId::Documents { DOCUMENT_KEYS } else { &[] }
    }

    fn validate(&self, step: StepId, draft: &Draft) -> Result<(), ValidationError> {
        match step {
            StepId::Credentials => validate_credentials(draft),
            StepId::Verify => validate_code(draft),
            StepId::Personal => validate_personal(draft),
            StepId::Business => {
                require(draft.get("business_name"), "business_name", "Business name")?;
                require(draft.get("cuisine"), "cuisine", "Cuisine")?;
                require(draft.get("address"), "address", "Business address")?;
                require(draft.get("city"), "city", "City")
            }
            StepId::Documents => {
                require_document(draft, &BUSINESS_LICENSE)?;
                require_document(draft, &ID_DOCUMENT)
            }
            StepId::Banking => validate_banking(draft),
            StepId::Terms => validate_terms(draft),
            _ => Ok(()),
        }
    }

    fn effects(&self, step: StepId, draft: &Draft) -> Result<Vec<Effect>, StepError> {
        match step {
            StepId::Credentials => Ok(sign_up(draft, Role::Vendor)),
            StepId::Verify => verify_sign_up(draft, Role::Vendor),
            StepId::Personal => update_personal(draft),
            StepId::Business => {
                let id = user_id(draft)?;
                let description = Some(draft.trimmed("description")).filter(|d| !d.is_empty());
                Ok(vec![Effect::Upsert {
                    table: Table::Vendors,
                    row: json!({
                        "id": id,
                        "business_name": draft.trimmed("business_name"),
                        "cuisine": draft.trimmed("cuisine"),
                        "description": description,
                        "address": draft.trimmed("address"),
                        "city": draft.trimmed("city"),
                        "status": ReviewStatus::Draft,
                    }),
                    on_conflict: "id",
                }])
            }
            StepId::Documents => store_documents(draft, Table::Vendors, &[&BUSINESS_LICENSE, &ID_DOCUMENT, &LOGO]),
            StepId::Banking => update_banking(draft, Table::Vendors),
            StepId::Terms => submit_for_review(draft, Table::Vendors),
            _ => Ok(Vec::new()),
        }
    }

    fn code_purpose(&self, step: StepId) -> Option<OtpPurpose> {
        (step == StepId::Verify).then_some(OtpPurpose::Signup)
    }
}

#[cfg(test)]
#[path = "vendor_test.rs"]
mod tests;
