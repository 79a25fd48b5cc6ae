use super::*;
use backend::MemoryBackend;

async fn vendor_with_account(backend: &MemoryBackend) -> Wizard<VendorOnboarding> {
    let mut wizard = Wizard::new(VendorOnboarding);
    wizard.update_field("email", "chef@test.com");
    wizard.update_field("password", "Abcd1234");
    wizard.update_field("confirm_password", "Abcd1234");
    wizard.advance(backend).await.unwrap();
    wizard
}

#[test]
fn nothing_is_remembered_before_sign_up() {
    assert_eq!(temporary_vendor_id(&Wizard::new(VendorOnboarding)), None);
}

#[tokio::test]
async fn vendor_id_is_remembered_once_the_account_exists() {
    let backend = MemoryBackend::new();
    let wizard = vendor_with_account(&backend).await;
    let account_id = wizard.draft().account().map(|a| a.id.clone());
    assert!(account_id.is_some());
    assert_eq!(temporary_vendor_id(&wizard), account_id);
}
