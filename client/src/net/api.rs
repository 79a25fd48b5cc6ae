//! Backend client construction and browser file bridging.
//!
//! Client-side (hydrate): the reqwest client runs over `fetch`.
//! Server-side (SSR): pages never issue backend calls during render, so the
//! same constructor only fails when the build carried no configuration.
//!
//! ERROR HANDLING
//! ==============
//! Everything returns `AppError` so pages show one humanized message shape
//! whether the failure was configuration, network, or a rejected row.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

#[cfg(feature = "hydrate")]
use backend::Attachment;
use backend::{AppError, BackendConfig, Bucket, SupabaseClient};

/// HTTP backend configured from build-time environment.
///
/// # Errors
///
/// `Validation` when the build did not set the backend URL and key.
pub fn client() -> Result<SupabaseClient, AppError> {
    let config = BackendConfig::from_build_env()?;
    SupabaseClient::new(config)
}

/// Resolve a stored image reference to something an `<img>` can load.
/// Absolute URLs pass through; bucket paths become public object URLs.
pub fn image_src(base_url: &str, bucket: Bucket, stored: Option<&str>) -> Option<String> {
    let stored = stored.map(str::trim).filter(|s| !s.is_empty())?;
    if stored.starts_with("http://") || stored.starts_with("https://") {
        return Some(stored.to_owned());
    }
    Some(format!("{}/storage/v1/object/public/{}/{}", base_url.trim_end_matches('/'), bucket.as_str(), stored))
}

/// Public image URL using the build-time backend URL.
pub fn public_image(bucket: Bucket, stored: Option<&str>) -> Option<String> {
    let base = BackendConfig::from_build_env().map(|c| c.url).unwrap_or_default();
    image_src(&base, bucket, stored)
}

/// Read a browser `File` into memory.
///
/// # Errors
///
/// `Network` when the browser refuses to read the file.
#[cfg(feature = "hydrate")]
pub async fn read_file(file: web_sys::File) -> Result<Attachment, AppError> {
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| AppError::network(format!("could not read {}: {e:?}", file.name())))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(Attachment::new(file.name(), file.type_(), bytes))
}

/// First file selected in an `<input type="file">` change event.
#[cfg(feature = "hydrate")]
pub fn selected_file(ev: &leptos::ev::Event) -> Option<web_sys::File> {
    use wasm_bindgen::JsCast;
    let input = ev.target()?.dyn_into::<web_sys::HtmlInputElement>().ok()?;
    input.files()?.get(0)
}
