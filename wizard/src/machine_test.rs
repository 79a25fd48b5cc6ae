use super::*;
use crate::flows::{CustomerSignup, VendorOnboarding};
use backend::{AppError, ErrorKind, MemoryBackend};

const EMAIL: &str = "user@test.com";
const PASSWORD: &str = "Abcd1234";

fn customer() -> Wizard<CustomerSignup> {
    Wizard::new(CustomerSignup)
}

fn fill_credentials<F: Flow>(wizard: &mut Wizard<F>) {
    wizard.update_field("email", EMAIL);
    wizard.update_field("password", PASSWORD);
    wizard.update_field("confirm_password", PASSWORD);
}

async fn to_verify(backend: &MemoryBackend) -> Wizard<CustomerSignup> {
    let mut wizard = customer();
    fill_credentials(&mut wizard);
    assert_eq!(wizard.advance(backend).await.unwrap(), StepId::Verify);
    wizard
}

async fn to_profile(backend: &MemoryBackend) -> Wizard<CustomerSignup> {
    let mut wizard = to_verify(backend).await;
    let code = backend.issued_code(EMAIL, OtpPurpose::Signup).unwrap();
    wizard.update_field("code", code);
    assert_eq!(wizard.advance(backend).await.unwrap(), StepId::Profile);
    wizard
}

fn fill_profile(wizard: &mut Wizard<CustomerSignup>) {
    wizard.update_field("full_name", "Ada Obi");
    wizard.update_field("phone", "+234 801 234 5678");
    wizard.update_field("address", "12 Marina Road");
}

// =============================================================================
// VALIDATION GATE
// =============================================================================

#[tokio::test]
async fn missing_field_keeps_cursor_and_sets_error() {
    let backend = MemoryBackend::new();
    let mut wizard = customer();
    wizard.update_field("email", EMAIL);
    wizard.update_field("password", PASSWORD);

    let err = wizard.advance(&backend).await.unwrap_err();
    assert!(matches!(err, StepError::Validation(ValidationError::PasswordMismatch | ValidationError::Required { .. })));
    assert_eq!(wizard.cursor(), 0);
    assert!(!wizard.error_message().unwrap().is_empty());
    assert_eq!(backend.call_count("sign_up"), 0);
}

#[tokio::test]
async fn every_step_refuses_empty_input() {
    let backend = MemoryBackend::new();
    let mut wizard = to_profile(&backend).await;
    let cursor = wizard.cursor();

    let err = wizard.advance(&backend).await.unwrap_err();
    assert!(matches!(err, StepError::Validation(_)));
    assert_eq!(wizard.cursor(), cursor);
    assert!(!wizard.error_message().unwrap().is_empty());
    assert_eq!(backend.call_count("update"), 0);
}

#[tokio::test]
async fn error_clears_on_successful_advance() {
    let backend = MemoryBackend::new();
    let mut wizard = customer();
    assert!(wizard.advance(&backend).await.is_err());
    assert!(wizard.last_error().is_some());

    fill_credentials(&mut wizard);
    wizard.advance(&backend).await.unwrap();
    assert!(wizard.last_error().is_none());
}

// =============================================================================
// CHECKPOINTS
// =============================================================================

#[tokio::test]
async fn back_then_next_does_not_repeat_sign_up() {
    let backend = MemoryBackend::new();
    let mut wizard = to_verify(&backend).await;
    assert_eq!(backend.call_count("sign_up"), 1);

    assert_eq!(wizard.retreat().unwrap(), StepId::Credentials);
    let plan = wizard.begin_advance().unwrap();
    assert!(matches!(plan, Plan::Moved(StepId::Verify)));
    assert!(!wizard.is_submitting());
    assert_eq!(backend.call_count("sign_up"), 1);
}

#[tokio::test]
async fn changing_only_the_password_does_not_repeat_sign_up() {
    let backend = MemoryBackend::new();
    let mut wizard = to_verify(&backend).await;
    wizard.retreat().unwrap();
    wizard.update_field("password", "Other9876");
    wizard.update_field("confirm_password", "Other9876");

    assert_eq!(wizard.advance(&backend).await.unwrap(), StepId::Verify);
    assert_eq!(backend.call_count("sign_up"), 1);
}

#[tokio::test]
async fn changed_input_reruns_the_step() {
    let backend = MemoryBackend::new();
    let mut wizard = to_verify(&backend).await;
    wizard.retreat().unwrap();
    wizard.update_field("email", "other@test.com");

    assert_eq!(wizard.advance(&backend).await.unwrap(), StepId::Verify);
    assert_eq!(backend.call_count("sign_up"), 2);
}

#[tokio::test]
async fn invalidate_forces_a_rerun() {
    let backend = MemoryBackend::new();
    let mut wizard = to_profile(&backend).await;
    fill_profile(&mut wizard);
    wizard.retreat().unwrap();
    wizard.retreat().unwrap();

    assert!(wizard.invalidate(StepId::Credentials));
    assert!(!wizard.invalidate(StepId::Credentials));
    let err = wizard.advance(&backend).await.unwrap_err();
    assert!(matches!(err, StepError::Remote(ref e) if e.kind == ErrorKind::AlreadyRegistered));
    assert_eq!(wizard.step(), StepId::Credentials);
}

// =============================================================================
// REMOTE FAILURES
// =============================================================================

#[tokio::test]
async fn remote_failure_keeps_cursor_and_humanizes() {
    let backend = MemoryBackend::new();
    backend.seed_user(EMAIL, PASSWORD, None);
    let mut wizard = customer();
    fill_credentials(&mut wizard);

    let err = wizard.advance(&backend).await.unwrap_err();
    assert!(matches!(err, StepError::Remote(_)));
    assert_eq!(wizard.step(), StepId::Credentials);
    assert!(!wizard.is_submitting());
    assert!(wizard.error_message().unwrap().contains("already"));
}

#[tokio::test]
async fn verify_retry_after_profile_write_failure_reaches_profile() {
    let backend = MemoryBackend::new();
    let mut wizard = to_verify(&backend).await;
    let code = backend.issued_code(EMAIL, OtpPurpose::Signup).unwrap();
    wizard.update_field("code", code);
    backend.fail_next("upsert", AppError::network("offline"));

    let err = wizard.advance(&backend).await.unwrap_err();
    assert!(matches!(err, StepError::Remote(ref e) if e.kind == ErrorKind::Network));
    assert_eq!(wizard.step(), StepId::Verify);
    assert!(wizard.draft().session().is_some());

    assert_eq!(wizard.advance(&backend).await.unwrap(), StepId::Profile);
    assert_eq!(backend.call_count("verify_otp"), 1);
    assert_eq!(backend.call_count("upsert"), 2);
}

#[tokio::test]
async fn wrong_code_stays_on_verify() {
    let backend = MemoryBackend::new();
    let mut wizard = to_verify(&backend).await;
    let code = backend.issued_code(EMAIL, OtpPurpose::Signup).unwrap();
    let first = if code.starts_with('1') { '2' } else { '1' };
    wizard.update_field("code", format!("{first}{}", &code[1..]));

    assert!(matches!(wizard.advance(&backend).await, Err(StepError::Remote(_))));
    assert_eq!(wizard.step(), StepId::Verify);
}

// =============================================================================
// IN-FLIGHT & TERMINAL STATES
// =============================================================================

#[tokio::test]
async fn second_advance_while_submitting_is_busy() {
    let backend = MemoryBackend::new();
    let mut wizard = customer();
    fill_credentials(&mut wizard);

    let Plan::Commit(commit) = wizard.begin_advance().unwrap() else { panic!("expected a commit") };
    assert!(wizard.is_submitting());
    assert_eq!(wizard.begin_advance().unwrap_err(), StepError::Busy);
    assert_eq!(wizard.retreat().unwrap_err(), StepError::Busy);

    let outcome = commit.execute(&backend).await;
    assert_eq!(wizard.complete(outcome).unwrap(), StepId::Verify);
    assert!(!wizard.is_submitting());
}

#[tokio::test]
async fn outcome_for_another_position_is_stale() {
    let backend = MemoryBackend::new();
    let mut wizard = customer();
    fill_credentials(&mut wizard);
    let Plan::Commit(commit) = wizard.begin_advance().unwrap() else { panic!("expected a commit") };
    let outcome = commit.execute(&backend).await;

    let mut snapshot = wizard.snapshot();
    snapshot.cursor = 1;
    let mut other = Wizard::restore(CustomerSignup, snapshot);
    assert_eq!(other.complete(outcome).unwrap_err(), StepError::Stale);
    assert_eq!(other.cursor(), 1);
}

#[test]
fn retreat_on_first_step_is_refused() {
    let mut wizard = customer();
    assert_eq!(wizard.retreat().unwrap_err(), StepError::AtFirstStep);
}

#[tokio::test]
async fn finalize_only_on_last_input_step() {
    let backend = MemoryBackend::new();
    let mut wizard = customer();
    fill_credentials(&mut wizard);
    assert_eq!(wizard.finalize(&backend).await.unwrap_err(), StepError::NotFinalStep);
    assert_eq!(backend.call_count("sign_up"), 0);
}

#[tokio::test]
async fn done_is_absorbing() {
    let backend = MemoryBackend::new();
    let mut wizard = to_profile(&backend).await;
    fill_profile(&mut wizard);
    assert!(wizard.is_final_input_step());
    assert_eq!(wizard.finalize(&backend).await.unwrap(), StepId::Done);

    assert!(wizard.is_done());
    assert_eq!(wizard.advance(&backend).await.unwrap_err(), StepError::Finished);
    assert_eq!(wizard.retreat().unwrap_err(), StepError::Finished);
    assert_eq!(wizard.step(), StepId::Done);
}

// =============================================================================
// RESEND
// =============================================================================

#[tokio::test]
async fn resend_issues_new_code_without_moving() {
    let backend = MemoryBackend::new();
    let mut wizard = to_verify(&backend).await;
    wizard.update_field("code", "12");

    wizard.resend_code(&backend).await.unwrap();
    assert_eq!(wizard.step(), StepId::Verify);
    assert_eq!(wizard.draft().get("code"), "");
    assert_eq!(backend.call_count("send_otp"), 1);
    assert_eq!(backend.call_count("sign_up"), 1);

    let code = backend.issued_code(EMAIL, OtpPurpose::Signup).unwrap();
    wizard.update_field("code", code);
    assert_eq!(wizard.advance(&backend).await.unwrap(), StepId::Profile);
}

#[test]
fn resend_needs_a_code_step() {
    let mut wizard = customer();
    assert_eq!(wizard.begin_resend().unwrap_err(), StepError::NothingToResend);
    assert!(!wizard.is_submitting());
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

#[tokio::test]
async fn snapshot_restores_position_without_secrets() {
    let backend = MemoryBackend::new();
    let wizard = to_verify(&backend).await;
    let snapshot = wizard.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(!json.contains(PASSWORD));

    let restored = Wizard::restore(CustomerSignup, serde_json::from_str(&json).unwrap());
    assert_eq!(restored.step(), StepId::Verify);
    assert_eq!(restored.draft().get("email"), EMAIL);
    assert_eq!(restored.draft().get("password"), "");
    assert!(restored.draft().account().is_some());
}

#[test]
fn snapshot_of_another_flow_starts_fresh() {
    let mut vendor = Wizard::new(VendorOnboarding);
    vendor.update_field("email", EMAIL);
    let restored = Wizard::restore(CustomerSignup, vendor.snapshot());
    assert_eq!(restored.cursor(), 0);
    assert_eq!(restored.draft().get("email"), "");
}

#[test]
fn restore_clamps_out_of_range_cursor() {
    let snapshot = WizardSnapshot { kind: FlowKind::Customer, cursor: 99, draft: Draft::new().snapshot() };
    let restored = Wizard::restore(CustomerSignup, snapshot);
    assert!(restored.is_done());
}
