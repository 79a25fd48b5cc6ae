use super::*;
use backend::MemoryBackend;
use serde_json::json;

#[test]
fn debug_output_hides_secrets() {
    let effect = Effect::SignUp { email: "a@test.com".into(), password: "Secret123".into(), role: Role::Customer };
    let shown = format!("{effect:?}");
    assert_eq!(shown, "sign_up");
    let upload = Effect::Upload {
        key: "id_document".into(),
        bucket: Bucket::Documents,
        path: "u1/id-document.pdf".into(),
        file: Attachment::new("id.pdf", "application/pdf", vec![1]),
    };
    assert_eq!(format!("{upload:?}"), "upload(documents/u1/id-document.pdf)");
}

#[tokio::test]
async fn verify_session_is_threaded_into_later_effects() {
    let backend = MemoryBackend::new();
    backend.sign_up("a@test.com", "Secret123", Role::Vendor).await.unwrap();
    let code = backend.issued_code("a@test.com", OtpPurpose::Signup).unwrap();

    let effects = [
        Effect::VerifyCode { email: "a@test.com".into(), code, purpose: OtpPurpose::Signup },
        Effect::Upsert { table: Table::Profiles, row: json!({ "id": "u1", "role": "vendor" }), on_conflict: "id" },
    ];
    let output = run_effects(&backend, None, &effects).await.unwrap();
    assert!(output.session.is_some());
    assert_eq!(backend.rows(Table::Profiles).len(), 1);
}

#[tokio::test]
async fn sign_up_records_account() {
    let backend = MemoryBackend::new();
    let effects = [Effect::SignUp { email: "a@test.com".into(), password: "Secret123".into(), role: Role::Rider }];
    let output = run_effects(&backend, None, &effects).await.unwrap();
    assert_eq!(output.account.unwrap().email, "a@test.com");
    assert!(output.session.is_none());
}

#[tokio::test]
async fn first_failure_stops_the_run() {
    let backend = MemoryBackend::new();
    backend.fail_next("upsert", AppError::network("offline"));
    let effects = [
        Effect::Upsert { table: Table::Vendors, row: json!({ "id": "v1" }), on_conflict: "id" },
        Effect::Upsert { table: Table::Riders, row: json!({ "id": "r1" }), on_conflict: "id" },
    ];
    let err = run_effects(&backend, None, &effects).await.unwrap_err();
    assert_eq!(err.error.kind, ErrorKind::Network);
    assert_eq!(backend.call_count("upsert"), 1);
}

#[tokio::test]
async fn failure_keeps_what_earlier_effects_produced() {
    let backend = MemoryBackend::new();
    backend.sign_up("a@test.com", "Secret123", Role::Vendor).await.unwrap();
    let code = backend.issued_code("a@test.com", OtpPurpose::Signup).unwrap();
    backend.fail_next("upsert", AppError::network("offline"));

    let effects = [
        Effect::VerifyCode { email: "a@test.com".into(), code, purpose: OtpPurpose::Signup },
        Effect::Upsert { table: Table::Profiles, row: json!({ "id": "u1", "role": "vendor" }), on_conflict: "id" },
    ];
    let failure = run_effects(&backend, None, &effects).await.unwrap_err();
    assert_eq!(failure.error.kind, ErrorKind::Network);
    assert_eq!(failure.output.session.unwrap().user.email, "a@test.com");
}

#[tokio::test]
async fn failed_update_still_reports_uploads() {
    let backend = MemoryBackend::new();
    let effects = [
        Effect::Upload {
            key: "id_document".into(),
            bucket: Bucket::Documents,
            path: "u1/id-document.pdf".into(),
            file: Attachment::new("id.pdf", "application/pdf", vec![1, 2]),
        },
        Effect::Update { table: Table::Riders, query: Query::new().eq("id", "u1"), patch: json!({ "x": 1 }) },
    ];
    let failure = run_effects(&backend, None, &effects).await.unwrap_err();
    assert_eq!(failure.error.kind, ErrorKind::NotFound);
    assert_eq!(failure.output.uploads, vec![("id_document".to_owned(), "u1/id-document.pdf".to_owned())]);
}

#[tokio::test]
async fn update_matching_nothing_is_not_found() {
    let backend = MemoryBackend::new();
    let effects = [Effect::Update { table: Table::Vendors, query: Query::new().eq("id", "ghost"), patch: json!({ "x": 1 }) }];
    let err = run_effects(&backend, None, &effects).await.unwrap_err();
    assert_eq!(err.error.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn password_update_without_session_is_unauthorized() {
    let backend = MemoryBackend::new();
    let effects = [Effect::UpdatePassword { password: "Secret123".into() }];
    let err = run_effects(&backend, None, &effects).await.unwrap_err();
    assert_eq!(err.error.kind, ErrorKind::Unauthorized);
    assert_eq!(backend.call_count("update_password"), 0);
}

#[tokio::test]
async fn uploads_are_reported_by_key() {
    let backend = MemoryBackend::new();
    let effects = [Effect::Upload {
        key: "id_document".into(),
        bucket: Bucket::Documents,
        path: "u1/id-document.pdf".into(),
        file: Attachment::new("id.pdf", "application/pdf", vec![1, 2]),
    }];
    let output = run_effects(&backend, None, &effects).await.unwrap();
    assert_eq!(output.uploads, vec![("id_document".to_owned(), "u1/id-document.pdf".to_owned())]);
}

#[tokio::test]
async fn sign_out_clears_the_threaded_session() {
    let backend = MemoryBackend::new();
    backend.seed_user("a@test.com", "Secret123", None);
    let session = backend.sign_in("a@test.com", "Secret123").await.unwrap();
    let output = run_effects(&backend, Some(session), &[Effect::SignOut]).await.unwrap();
    assert!(output.session.is_none());
    assert_eq!(backend.call_count("sign_out"), 1);
}
