use super::*;
use crate::machine::Wizard;
use crate::validate::ValidationError;
use backend::{Backend, MemoryBackend, Session};

const EMAIL: &str = "ada@test.com";

#[test]
fn redirect_follows_role() {
    assert_eq!(PasswordReset::new(Role::Vendor).redirect_path(), "/login?type=vendor");
    assert_eq!(PasswordReset::new(Role::Customer).redirect_path(), format!("/login?type={}", Role::Customer.query_value()));
}

#[test]
fn new_password_needs_verified_session() {
    let mut draft = Draft::new();
    draft.set("password", "Newpass123");
    draft.set("confirm_password", "Newpass123");
    let err = PasswordReset::new(Role::Rider).effects(StepId::NewPassword, &draft).unwrap_err();
    assert_eq!(err, StepError::SessionRequired);
}

#[tokio::test]
async fn reset_end_to_end() {
    let backend = MemoryBackend::new();
    backend.seed_user(EMAIL, "Oldpass123", Some(Role::Customer));
    let mut wizard = Wizard::new(PasswordReset::new(Role::Customer));

    wizard.update_field("email", "Ada@Test.com ");
    assert_eq!(wizard.advance(&backend).await.unwrap(), StepId::Code);
    let code = backend.issued_code(EMAIL, OtpPurpose::Recovery).unwrap();

    wizard.update_field("code", code);
    assert_eq!(wizard.advance(&backend).await.unwrap(), StepId::NewPassword);
    assert!(wizard.draft().session().is_some());

    wizard.update_field("password", "Newpass123");
    wizard.update_field("confirm_password", "Newpass12");
    assert_eq!(wizard.advance(&backend).await.unwrap_err(), StepError::Validation(ValidationError::PasswordMismatch));

    wizard.update_field("confirm_password", "Newpass123");
    assert_eq!(wizard.finalize(&backend).await.unwrap(), StepId::Done);
    assert_eq!(backend.call_count("sign_out"), 1);

    let session: Session = backend.sign_in(EMAIL, "Newpass123").await.unwrap();
    assert_eq!(session.user.email, EMAIL);
    assert!(backend.sign_in(EMAIL, "Oldpass123").await.is_err());
}

#[tokio::test]
async fn resend_on_code_step_sends_recovery_code() {
    let backend = MemoryBackend::new();
    backend.seed_user(EMAIL, "Oldpass123", None);
    let mut wizard = Wizard::new(PasswordReset::new(Role::Vendor));
    wizard.update_field("email", EMAIL);
    wizard.advance(&backend).await.unwrap();

    wizard.resend_code(&backend).await.unwrap();
    assert_eq!(wizard.step(), StepId::Code);
    assert_eq!(backend.call_count("send_otp"), 2);
}
