//! Password reset: Email → Code → NewPassword → Done.
//!
//! The flow is the same for every role; the role only picks the theme and
//! where the user lands afterwards.

use backend::{OtpPurpose, Role};

use super::{CODE_FIELDS, validate_code};
use crate::draft::Draft;
use crate::effect::Effect;
use crate::machine::{Flow, FlowKind, StepError, StepId};
use crate::validate::{ValidationError, check_email, check_new_password, normalize_email};

const EMAIL_FIELDS: &[&str] = &["email"];
const PASSWORD_FIELDS: &[&str] = &["password", "confirm_password"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordReset {
    role: Role,
}

impl PasswordReset {
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    /// Sign-in page for this role once the password is changed.
    #[must_use]
    pub fn redirect_path(&self) -> String {
        format!("/login?type={}", self.role.query_value())
    }
}

impl Flow for PasswordReset {
    const KIND: FlowKind = FlowKind::PasswordReset;
    const STEPS: &'static [StepId] = &[StepId::Email, StepId::Code, StepId::NewPassword, StepId::Done];

    fn role(&self) -> Role {
        self.role
    }

    fn fields(&self, step: StepId) -> &'static [&'static str] {
        match step {
            StepId::Email => EMAIL_FIELDS,
            StepId::Code => CODE_FIELDS,
            StepId::NewPassword => PASSWORD_FIELDS,
            _ => &[],
        }
    }

    fn validate(&self, step: StepId, draft: &Draft) -> Result<(), ValidationError> {
        match step {
            StepId::Email => check_email(draft.get("email")),
            StepId::Code => validate_code(draft),
            StepId::NewPassword => check_new_password(draft.get("password"), draft.get("confirm_password")),
            _ => Ok(()),
        }
    }

    fn effects(&self, step: StepId, draft: &Draft) -> Result<Vec<Effect>, StepError> {
        let email = normalize_email(draft.get("email"));
        let effects = match step {
            StepId::Email => vec![Effect::SendCode { email, purpose: OtpPurpose::Recovery }],
            StepId::Code => vec![Effect::VerifyCode {
                email,
                code: draft.trimmed("code").to_owned(),
                purpose: OtpPurpose::Recovery,
            }],
            StepId::NewPassword => {
                if draft.session().is_none() {
                    return Err(StepError::SessionRequired);
                }
                vec![Effect::UpdatePassword { password: draft.get("password").to_owned() }, Effect::SignOut]
            }
            _ => Vec::new(),
        };
        Ok(effects)
    }

    fn code_purpose(&self, step: StepId) -> Option<OtpPurpose> {
        (step == StepId::Code).then_some(OtpPurpose::Recovery)
    }
}

#[cfg(test)]
#[path = "password_reset_test.rs"]
mod tests;
