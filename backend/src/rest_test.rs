use super::*;
use mockito::Matcher;

const SESSION_BODY: &str = r#"{
    "access_token": "at-1",
    "refresh_token": "rt-1",
    "expires_at": 1700000000,
    "user": { "id": "u1", "email": "ada@example.com", "user_metadata": { "role": "vendor" } }
}"#;

fn client(server: &mockito::ServerGuard) -> SupabaseClient {
    SupabaseClient::new(BackendConfig::new(&server.url(), "anon")).expect("client")
}

fn session() -> Session {
    Session {
        access_token: "user-token".into(),
        refresh_token: "rt".into(),
        expires_at: None,
        user: AuthUser { id: "u1".into(), email: "ada@example.com".into(), role: Some(Role::Customer) },
    }
}

// =============================================================================
// parsing
// =============================================================================

#[test]
fn parse_session_reads_role_from_metadata() {
    let session = parse_session(SESSION_BODY).unwrap();
    assert_eq!(session.access_token, "at-1");
    assert_eq!(session.expires_at, Some(1_700_000_000));
    assert_eq!(session.user.role, Some(Role::Vendor));
}

#[test]
fn parse_session_tolerates_missing_metadata() {
    let body = r#"{"access_token":"a","user":{"id":"u2","email":"b@example.com"}}"#;
    let session = parse_session(body).unwrap();
    assert_eq!(session.user.role, None);
    assert_eq!(session.refresh_token, "");
}

#[test]
fn parse_session_rejects_garbage_as_decode() {
    let err = parse_session("not json").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Decode);
}

#[test]
fn parse_sign_up_with_session() {
    let outcome = parse_sign_up(SESSION_BODY, "ada@example.com").unwrap();
    assert!(outcome.session.is_some());
    assert_eq!(outcome.user.id, "u1");
}

#[test]
fn parse_sign_up_awaiting_confirmation_bare_user() {
    let body = r#"{"id":"u3","email":"new@example.com","user_metadata":{"role":"rider"}}"#;
    let outcome = parse_sign_up(body, "new@example.com").unwrap();
    assert!(outcome.session.is_none());
    assert_eq!(outcome.user.role, Some(Role::Rider));
}

#[test]
fn parse_sign_up_nested_user_with_null_session() {
    let body = r#"{"user":{"id":"u4"},"session":null}"#;
    let outcome = parse_sign_up(body, "fallback@example.com").unwrap();
    assert_eq!(outcome.user.email, "fallback@example.com");
    assert!(outcome.session.is_none());
}

#[test]
fn first_row_takes_head_of_array() {
    assert_eq!(first_row(r#"[{"id":1},{"id":2}]"#).unwrap()["id"], 1);
    assert_eq!(first_row("[]").unwrap_err().kind, ErrorKind::NotFound);
    assert_eq!(first_row(r#"{"id":3}"#).unwrap()["id"], 3);
}

#[test]
fn public_object_url_uses_public_path() {
    let client = SupabaseClient::new(BackendConfig::new("https://abc.example.co/", "anon")).unwrap();
    assert_eq!(
        client.public_object_url(Bucket::MenuImages, "v1/taco.png"),
        "https://abc.example.co/storage/v1/object/public/menu-images/v1/taco.png"
    );
}

// =============================================================================
// auth over HTTP
// =============================================================================

#[tokio::test]
async fn sign_in_posts_password_grant() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
        .match_header("apikey", "anon")
        .match_header("authorization", "Bearer anon")
        .match_body(Matcher::PartialJson(json!({ "email": "ada@example.com", "password": "Secret123" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SESSION_BODY)
        .create_async()
        .await;

    let session = client(&server).sign_in("ada@example.com", "Secret123").await.unwrap();
    assert_eq!(session.access_token, "at-1");
    mock.assert_async().await;
}

#[tokio::test]
async fn sign_in_failure_is_classified_from_error_code() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#)
        .create_async()
        .await;

    let err = client(&server).sign_in("ada@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    assert_eq!(err.status, 400);
    assert_eq!(err.message, "Invalid login credentials");
}

#[tokio::test]
async fn sign_up_sends_role_in_metadata() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/v1/signup")
        .match_body(Matcher::PartialJson(json!({ "data": { "role": "rider" } })))
        .with_status(200)
        .with_body(r#"{"id":"u9","email":"r@example.com","user_metadata":{"role":"rider"}}"#)
        .create_async()
        .await;

    let outcome = client(&server).sign_up("r@example.com", "Secret123", Role::Rider).await.unwrap();
    assert_eq!(outcome.user.id, "u9");
    assert!(outcome.session.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn recovery_otp_uses_recover_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/v1/recover")
        .match_body(Matcher::PartialJson(json!({ "email": "ada@example.com" })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    client(&server).send_otp("ada@example.com", OtpPurpose::Recovery).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn verify_otp_sends_purpose_and_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/auth/v1/verify")
        .match_body(Matcher::PartialJson(json!({ "type": "signup", "token": "123456" })))
        .with_status(200)
        .with_body(SESSION_BODY)
        .create_async()
        .await;

    let session = client(&server)
        .verify_otp("ada@example.com", "123456", OtpPurpose::Signup)
        .await
        .unwrap();
    assert_eq!(session.user.id, "u1");
    mock.assert_async().await;
}

#[tokio::test]
async fn update_password_uses_session_bearer() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/auth/v1/user")
        .match_header("authorization", "Bearer user-token")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    client(&server).update_password(&session(), "NewSecret1").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn delete_user_without_service_key_is_refused_locally() {
    let server = mockito::Server::new_async().await;
    let err = client(&server).delete_user("u1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
    assert_eq!(err.status, 0);
}

#[tokio::test]
async fn delete_user_with_service_key_sends_service_bearer() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/auth/v1/admin/users/u1")
        .match_header("authorization", "Bearer service")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let config = BackendConfig::new(&server.url(), "anon").with_service_key("service");
    SupabaseClient::new(config).unwrap().delete_user("u1").await.unwrap();
    mock.assert_async().await;
}

// =============================================================================
// rows and storage over HTTP
// =============================================================================

#[tokio::test]
async fn select_renders_filters_order_and_limit() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/menu_items")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "*".into()),
            Matcher::UrlEncoded("vendor_id".into(), "eq.v1".into()),
            Matcher::UrlEncoded("order".into(), "name.asc".into()),
            Matcher::UrlEncoded("limit".into(), "20".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"id":"m1"},{"id":"m2"}]"#)
        .create_async()
        .await;

    let query = Query::new().eq("vendor_id", "v1").order_asc("name").limit(20);
    let rows = client(&server).select(None, Table::MenuItems, &query).await.unwrap();
    assert_eq!(rows.len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn insert_asks_for_representation() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/profiles")
        .match_header("prefer", "return=representation")
        .with_status(201)
        .with_body(r#"[{"id":"u1","role":"customer"}]"#)
        .create_async()
        .await;

    let row = client(&server)
        .insert(Some(&session()), Table::Profiles, json!({ "id": "u1", "role": "customer" }))
        .await
        .unwrap();
    assert_eq!(row["id"], "u1");
    mock.assert_async().await;
}

#[tokio::test]
async fn upsert_merges_on_conflict_column() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/vendors")
        .match_query(Matcher::UrlEncoded("on_conflict".into(), "id".into()))
        .match_header("prefer", PREFER_UPSERT)
        .with_status(201)
        .with_body(r#"[{"id":"v1","business_name":"Tacos"}]"#)
        .create_async()
        .await;

    let row = client(&server)
        .upsert(None, Table::Vendors, json!({ "id": "v1", "business_name": "Tacos" }), "id")
        .await
        .unwrap();
    assert_eq!(row["business_name"], "Tacos");
    mock.assert_async().await;
}

#[tokio::test]
async fn duplicate_key_maps_to_conflict() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/rest/v1/favorites")
        .with_status(409)
        .with_body(r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#)
        .create_async()
        .await;

    let err = client(&server)
        .insert(None, Table::Favorites, json!({ "user_id": "u1", "vendor_id": "v1" }))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn unfiltered_update_and_delete_are_refused() {
    let server = mockito::Server::new_async().await;
    let client = client(&server);
    let update = client.update(None, Table::Orders, &Query::new(), json!({})).await.unwrap_err();
    let delete = client.delete(None, Table::Orders, &Query::new()).await.unwrap_err();
    assert_eq!(update.kind, ErrorKind::Validation);
    assert_eq!(delete.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn upload_posts_bytes_with_upsert_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/storage/v1/object/documents/u1/business-license.pdf")
        .match_header("x-upsert", "true")
        .match_header("content-type", "application/pdf")
        .match_body("%PDF")
        .with_status(200)
        .with_body(r#"{"Key":"documents/u1/business-license.pdf"}"#)
        .create_async()
        .await;

    let file = Attachment::new("license.pdf", "application/pdf", b"%PDF".to_vec());
    let path = client(&server)
        .upload(Some(&session()), Bucket::Documents, "u1/business-license.pdf", &file)
        .await
        .unwrap();
    assert_eq!(path, "u1/business-license.pdf");
    mock.assert_async().await;
}

#[tokio::test]
async fn oversized_upload_maps_storage_status_code() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/storage/v1/object/avatars/u1/avatar.png")
        .with_status(400)
        .with_body(r#"{"statusCode":"413","error":"Payload too large","message":"The object exceeded the maximum allowed size"}"#)
        .create_async()
        .await;

    let file = Attachment::new("me.png", "image/png", vec![0; 8]);
    let err = client(&server)
        .upload(None, Bucket::Avatars, "u1/avatar.png", &file)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let client = SupabaseClient::new(BackendConfig::new("http://127.0.0.1:9", "anon")).unwrap();
    let err = client.health().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
}
