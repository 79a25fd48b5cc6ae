use super::*;
use serial_test::serial;

/// # Safety
/// Callers are serialized with `#[serial]` so env mutation does not race.
unsafe fn clear_backend_env() {
    unsafe {
        std::env::remove_var(URL_VAR);
        std::env::remove_var(ANON_KEY_VAR);
        std::env::remove_var(SERVICE_KEY_VAR);
        std::env::remove_var(REQUEST_TIMEOUT_VAR);
        std::env::remove_var(CONNECT_TIMEOUT_VAR);
    }
}

#[test]
#[serial]
fn from_env_reads_required_values_and_defaults() {
    unsafe {
        clear_backend_env();
        std::env::set_var(URL_VAR, "https://demo.supabase.co/");
        std::env::set_var(ANON_KEY_VAR, "anon");
    }

    let cfg = BackendConfig::from_env().unwrap();
    assert_eq!(cfg.url, "https://demo.supabase.co");
    assert_eq!(cfg.anon_key, "anon");
    assert_eq!(cfg.service_key, None);
    assert_eq!(cfg.timeouts, Timeouts::default());

    unsafe { clear_backend_env() };
}

#[test]
#[serial]
fn from_env_parses_overrides() {
    unsafe {
        clear_backend_env();
        std::env::set_var(URL_VAR, "http://localhost:54321");
        std::env::set_var(ANON_KEY_VAR, "anon");
        std::env::set_var(SERVICE_KEY_VAR, "service");
        std::env::set_var(REQUEST_TIMEOUT_VAR, "5");
        std::env::set_var(CONNECT_TIMEOUT_VAR, "2");
    }

    let cfg = BackendConfig::from_env().unwrap();
    assert_eq!(cfg.service_key.as_deref(), Some("service"));
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(cfg.fallback_bearer(), "service");

    unsafe { clear_backend_env() };
}

#[test]
#[serial]
fn from_env_ignores_unparsable_timeouts() {
    unsafe {
        clear_backend_env();
        std::env::set_var(URL_VAR, "http://localhost:54321");
        std::env::set_var(ANON_KEY_VAR, "anon");
        std::env::set_var(REQUEST_TIMEOUT_VAR, "soon");
    }

    let cfg = BackendConfig::from_env().unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

    unsafe { clear_backend_env() };
}

#[test]
#[serial]
fn from_env_requires_url_and_key() {
    unsafe { clear_backend_env() };
    let err = BackendConfig::from_env().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.message.contains(URL_VAR));

    unsafe { std::env::set_var(URL_VAR, "https://demo.supabase.co") };
    let err = BackendConfig::from_env().unwrap_err();
    assert!(err.message.contains(ANON_KEY_VAR));

    unsafe { clear_backend_env() };
}

#[test]
fn from_parts_rejects_non_http_url() {
    let err = BackendConfig::from_parts(Some("ftp://x"), Some("k")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[test]
fn fallback_bearer_is_anon_without_service_key() {
    let cfg = BackendConfig::new("https://demo.supabase.co", "anon");
    assert_eq!(cfg.fallback_bearer(), "anon");
    assert_eq!(cfg.with_service_key("svc").fallback_bearer(), "svc");
}
