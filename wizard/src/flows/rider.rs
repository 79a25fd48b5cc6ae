//! Rider registration: Credentials → Verify → Personal → Vehicle →
//! Documents → Payout → Terms → Done.
//!
//! Bicycles need neither a plate nor a driving licence; motorised vehicles
//! need both.

use backend::rows::{ReviewStatus, VehicleType};
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

const VEHICLE_FIELDS: &[&str] = &["vehicle_type", "plate_number"];
const DOCUMENT_KEYS: &[&str] = &["id_document", "driver_license"];

const ID_DOCUMENT: DocumentSlot = DocumentSlot {
    key: "id_document",
    label: "Government ID",
    stem: "id-document",
    bucket: Bucket::Documents,
    column: "id_document_path",
};
const DRIVER_LICENSE: DocumentSlot = DocumentSlot {
    key: "driver_license",
    label: "Driving licence",
    stem: "driver-license",
    bucket: Bucket::Documents,
    column: "driver_license_path",
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiderRegistration;

impl RiderRegistration {
    /// Vehicle chosen on the vehicle step, if valid.
    #[must_use]
    pub fn vehicle(draft: &Draft) -> Option<VehicleType> {
        VehicleType::parse(draft.get("vehicle_type"))
    }

    fn is_motorised(draft: &Draft) -> bool {
        Self::vehicle(draft).is_some_and(VehicleType::is_motorised)
    }
}

impl Flow for RiderRegistration {
    const KIND: FlowKind = FlowKind::Rider;
    const STEPS: &'static [StepId] = &[
        StepId::Credentials,
        StepId::Verify,
        StepId::Personal,
        StepId::Vehicle,
        StepId::Documents,
        StepId::Payout,
        StepId::Terms,
        StepId::Done,
    ];

    fn role(&self) -> Role {
        Role::Rider
    }

    fn fields(&self, step: StepId) -> &'static [&'static str] {
        match step {
            StepId::Credentials => CREDENTIAL_FIELDS,
            StepId::Verify => CODE_FIELDS,
            StepId::Personal => PERSONAL_FIELDS,
            StepId::Vehicle => VEHICLE_FIELDS,
            StepId::Payout => BANK_FIELDS,
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
            StepId::Vehicle => {
                require(draft.get("vehicle_type"), "vehicle_type", "Vehicle type")?;
                let Some(vehicle) = Self::vehicle(draft) else {
                    return Err(ValidationError::Invalid { field: "vehicle_type", label: "Vehicle type" });
                };
                if vehicle.is_motorised() {
                    require(draft.get("plate_number"), "plate_number", "Plate number")?;
                }
                Ok(())
            }
            StepId::Documents => {
                require_document(draft, &ID_DOCUMENT)?;
                if Self::is_motorised(draft) {
                    require_document(draft, &DRIVER_LICENSE)?;
                }
                Ok(())
            }
            StepId::Payout => validate_banking(draft),
            StepId::Terms => validate_terms(draft),
            _ => Ok(()),
        }
    }

    fn effects(&self, step: StepId, draft: &Draft) -> Result<Vec<Effect>, StepError> {
        match step {
            StepId::Credentials => Ok(sign_up(draft, Role::Rider)),
            StepId::Verify => verify_sign_up(draft, Role::Rider),
            StepId::Personal => update_personal(draft),
            StepId::Vehicle => {
                let id = user_id(draft)?;
                let vehicle = Self::vehicle(draft);
                let plate = if Self::is_motorised(draft) {
                    Some(draft.trimmed("plate_number").to_ascii_uppercase())
                } else {
                    None
                };
                Ok(vec![Effect::Upsert {
                    table: Table::Riders,
                    row: json!({
                        "id": id,
                        "vehicle_type": vehicle,
                        "plate_number": plate,
                        "status": ReviewStatus::Draft,
                    }),
                    on_conflict: "id",
                }])
            }
            StepId::Documents => {
                if Self::is_motorised(draft) {
                    store_documents(draft, Table::Riders, &[&ID_DOCUMENT, &DRIVER_LICENSE])
                } else {
                    store_documents(draft, Table::Riders, &[&ID_DOCUMENT])
                }
            }
            StepId::Payout => update_banking(draft, Table::Riders),
            StepId::Terms => submit_for_review(draft, Table::Riders),
            _ => Ok(Vec::new()),
        }
    }

    fn code_purpose(&self, step: StepId) -> Option<OtpPurpose> {
        (step == StepId::Verify).then_some(OtpPurpose::Signup)
    }
}

#[cfg(test)]
#[path = "rider_test.rs"]
mod tests;
