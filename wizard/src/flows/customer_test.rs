use super::*;
use crate::machine::Wizard;
use backend::{Backend, MemoryBackend};

#[tokio::test]
async fn customer_signup_end_to_end() {
    let backend = MemoryBackend::new();
    let mut wizard = Wizard::new(CustomerSignup);

    wizard.update_field("email", "user@test.com");
    wizard.update_field("password", "Abcd1234");
    wizard.update_field("confirm_password", "Abcd1234");
    assert_eq!(wizard.advance(&backend).await.unwrap(), StepId::Verify);

    let code = backend.issued_code("user@test.com", OtpPurpose::Signup).unwrap();
    wizard.update_field("code", code);
    assert_eq!(wizard.advance(&backend).await.unwrap(), StepId::Profile);

    wizard.update_field("full_name", "Ada Obi");
    wizard.update_field("phone", "08012345678");
    wizard.update_field("address", "12 Marina Road");
    assert_eq!(wizard.finalize(&backend).await.unwrap(), StepId::Done);

    let profiles = backend.rows(Table::Profiles);
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["role"], "customer");
    assert_eq!(profiles[0]["full_name"], "Ada Obi");
    assert_eq!(profiles[0]["address"], "12 Marina Road");

    assert_eq!(wizard.advance(&backend).await.unwrap_err(), StepError::Finished);
    assert_eq!(wizard.retreat().unwrap_err(), StepError::Finished);
    backend.sign_in("user@test.com", "Abcd1234").await.unwrap();
}

#[test]
fn profile_needs_address() {
    let mut draft = Draft::new();
    draft.set("full_name", "Ada");
    draft.set("phone", "08012345678");
    let err = CustomerSignup.validate(StepId::Profile, &draft).unwrap_err();
    assert_eq!(err.field(), Some("address"));
}

#[test]
fn only_verify_takes_a_code() {
    assert_eq!(CustomerSignup.code_purpose(StepId::Verify), Some(OtpPurpose::Signup));
    assert_eq!(CustomerSignup.code_purpose(StepId::Profile), None);
}
