use super::*;
use backend::Attachment;

const LICENSE: DocumentSlot = DocumentSlot {
    key: "business_license",
    label: "Business license",
    stem: "business-license",
    bucket: Bucket::Documents,
    column: "business_license_path",
};

fn signed_up() -> Draft {
    let mut draft = Draft::new();
    draft.set_account(backend::AuthUser { id: "u1".into(), email: "v@test.com".into(), role: Some(Role::Vendor) });
    draft
}

#[test]
fn steps_after_sign_up_need_an_account() {
    let draft = Draft::new();
    assert_eq!(update_personal(&draft).unwrap_err(), StepError::SessionRequired);
    assert_eq!(verify_sign_up(&draft, Role::Vendor).unwrap_err(), StepError::SessionRequired);
}

#[test]
fn verify_upserts_profile_with_role() {
    let mut draft = signed_up();
    draft.set("email", " V@Test.com ");
    draft.set("code", "123456");
    let effects = verify_sign_up(&draft, Role::Vendor).unwrap();
    assert_eq!(effects.len(), 2);
    let Effect::Upsert { table, row, on_conflict } = &effects[1] else { panic!("expected upsert") };
    assert_eq!(*table, Table::Profiles);
    assert_eq!(*on_conflict, "id");
    assert_eq!(row["role"], "vendor");
    assert_eq!(row["email"], "v@test.com");
}

#[test]
fn verify_skips_the_code_once_the_email_has_a_session() {
    let mut draft = signed_up();
    draft.set("email", "v@test.com");
    draft.set("code", "123456");
    draft.set_session(backend::Session {
        access_token: "at".into(),
        refresh_token: "rt".into(),
        expires_at: None,
        user: backend::AuthUser { id: "u1".into(), email: "v@test.com".into(), role: Some(Role::Vendor) },
    });
    let effects = verify_sign_up(&draft, Role::Vendor).unwrap();
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::Upsert { table: Table::Profiles, .. }));
}

#[test]
fn document_is_satisfied_by_attachment_or_earlier_upload() {
    let mut draft = signed_up();
    assert!(matches!(require_document(&draft, &LICENSE), Err(ValidationError::MissingDocument { .. })));

    draft.attach("business_license", Attachment::new("lic.pdf", "application/pdf", Vec::new()));
    assert!(require_document(&draft, &LICENSE).is_err());

    draft.detach("business_license");
    draft.record_upload("business_license".into(), "u1/business-license.pdf".into());
    assert!(require_document(&draft, &LICENSE).is_ok());
}

#[test]
fn documents_upload_fresh_files_and_reuse_stored_paths() {
    let mut draft = signed_up();
    draft.attach("business_license", Attachment::new("Scan.PDF", "application/pdf", vec![1, 2]));
    let effects = store_documents(&draft, Table::Vendors, &[&LICENSE]).unwrap();
    assert_eq!(effects.len(), 2);
    let Effect::Upload { path, .. } = &effects[0] else { panic!("expected upload") };
    assert_eq!(path, "u1/business-license.pdf");

    let mut draft = signed_up();
    draft.record_upload("business_license".into(), "u1/business-license.png".into());
    let effects = store_documents(&draft, Table::Vendors, &[&LICENSE]).unwrap();
    assert_eq!(effects.len(), 1);
    let Effect::Update { patch, .. } = &effects[0] else { panic!("expected update") };
    assert_eq!(patch["business_license_path"], "u1/business-license.png");
}

#[test]
fn documents_upload_again_only_when_the_file_changes() {
    let mut draft = signed_up();
    draft.attach("business_license", Attachment::new("scan.pdf", "application/pdf", vec![1, 2]));
    draft.record_upload("business_license".into(), "u1/business-license.pdf".into());
    assert!(draft.is_uploaded("business_license"));
    assert_eq!(store_documents(&draft, Table::Vendors, &[&LICENSE]).unwrap().len(), 1);

    draft.attach("business_license", Attachment::new("scan.pdf", "application/pdf", vec![3]));
    assert!(!draft.is_uploaded("business_license"));
    let effects = store_documents(&draft, Table::Vendors, &[&LICENSE]).unwrap();
    assert!(matches!(effects[0], Effect::Upload { .. }));
}

#[test]
fn banking_keeps_only_account_digits() {
    let mut draft = signed_up();
    draft.set("bank_name", "First Bank");
    draft.set("account_name", "Ada Obi");
    draft.set("account_number", "0123 456 789");
    validate_banking(&draft).unwrap();
    let effects = update_banking(&draft, Table::Vendors).unwrap();
    let Effect::Update { patch, .. } = &effects[0] else { panic!("expected update") };
    assert_eq!(patch["account_number"], "0123456789");
}

#[test]
fn terms_submit_for_review() {
    let draft = signed_up();
    let effects = submit_for_review(&draft, Table::Riders).unwrap();
    let Effect::Update { table, patch, .. } = &effects[0] else { panic!("expected update") };
    assert_eq!(*table, Table::Riders);
    assert_eq!(patch["status"], "pending_review");
    assert_eq!(patch["terms_accepted"], true);
}
