//! Customer signup: Credentials → Verify → Profile → Done.

use backend::{OtpPurpose, Role, Table};
use serde_json::json;

use super::{
    CODE_FIELDS, CREDENTIAL_FIELDS, by_id, sign_up, user_id, validate_code, validate_credentials, validate_personal,
    verify_sign_up,
};
use crate::draft::Draft;
use crate::effect::Effect;
use crate::machine::{Flow, FlowKind, StepError, StepId};
use crate::validate::{ValidationError, require};

const PROFILE_FIELDS: &[&str] = &["full_name", "phone", "address"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomerSignup;

impl Flow for CustomerSignup {
    const KIND: FlowKind = FlowKind::Customer;
    const STEPS: &'static [StepId] = &[StepId::Credentials, StepId::Verify, StepId::Profile, StepId::Done];

    fn role(&self) -> Role {
        Role::Customer
    }

    fn fields(&self, step: StepId) -> &'static [&'static str] {
        match step {
            StepId::Credentials => CREDENTIAL_FIELDS,
            StepId::Verify => CODE_FIELDS,
            StepId::Profile => PROFILE_FIELDS,
            _ => &[],
        }
    }

    fn validate(&self, step: StepId, draft: &Draft) -> Result<(), ValidationError> {
        match step {
            StepId::Credentials => validate_credentials(draft),
            StepId::Verify => validate_code(draft),
            StepId::Profile => {
                validate_personal(draft)?;
                require(draft.get("address"), "address", "Delivery address")
            }
            _ => Ok(()),
        }
    }

    fn effects(&self, step: StepId, draft: &Draft) -> Result<Vec<Effect>, StepError> {
        match step {
            StepId::Credentials => Ok(sign_up(draft, Role::Customer)),
            StepId::Verify => verify_sign_up(draft, Role::Customer),
            StepId::Profile => {
                let id = user_id(draft)?;
                Ok(vec![Effect::Update {
                    table: Table::Profiles,
                    query: by_id(&id),
                    patch: json!({
                        "full_name": draft.trimmed("full_name"),
                        "phone": draft.trimmed("phone"),
                        "address": draft.trimmed("address"),
                    }),
                }])
            }
            _ => Ok(Vec::new()),
        }
    }

    fn code_purpose(&self, step: StepId) -> Option<OtpPurpose> {
        (step == StepId::Verify).then_some(OtpPurpose::Signup)
    }
}

#[cfg(test)]
#[path = "customer_test.rs"]
mod tests;
