//! HTTP implementation of [`Backend`] for the hosted platform.
//!
//! Thin wrapper over the auth (`/auth/v1`), row (`/rest/v1`), and storage
//! (`/storage/v1`) endpoints. Response parsing lives in pure helpers so it can
//! be tested without a server.

use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::BackendConfig;
use crate::error::{AppError, ErrorKind};
use crate::facade::Backend;
use crate::types::{Attachment, AuthUser, Bucket, OtpPurpose, Query, Role, Session, SignUpOutcome, Table};

const PREFER_RETURN: &str = "return=representation";
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=representation";

// =============================================================================
// CLIENT
// =============================================================================

pub struct SupabaseClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl SupabaseClient {
    /// # Errors
    ///
    /// Returns a `Network` error if the HTTP client cannot be constructed.
    pub fn new(config: BackendConfig) -> Result<Self, AppError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder
            .timeout(std::time::Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(std::time::Duration::from_secs(config.timeouts.connect_secs));
        let http = builder
            .build()
            .map_err(|e| AppError::network(format!("http client build failed: {e}")))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Public URL of an object in a public bucket.
    #[must_use]
    pub fn public_object_url(&self, bucket: Bucket, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{path}", self.config.url, bucket.as_str())
    }

    /// Probe the auth service health endpoint.
    ///
    /// # Errors
    ///
    /// Returns the mapped error when the service is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), AppError> {
        let req = self.request(Method::GET, &self.auth_url("health"), None);
        self.send("health", req).await.map(|_| ())
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.config.url)
    }

    fn rest_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.config.url, table.as_str())
    }

    fn object_url(&self, bucket: Bucket, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{path}", self.config.url, bucket.as_str())
    }

    fn bearer<'a>(&'a self, session: Option<&'a Session>) -> &'a str {
        session.map_or_else(|| self.config.fallback_bearer(), |s| s.access_token.as_str())
    }

    fn request(&self, method: Method, url: &str, session: Option<&Session>) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer(session))
    }

    async fn send(&self, op: &'static str, req: RequestBuilder) -> Result<String, AppError> {
        let response = req.send().await.map_err(|e| {
            tracing::warn!(op, error = %e, "backend unreachable");
            AppError::network(e.to_string())
        })?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::network(e.to_string()))?;
        if !(200..300).contains(&status) {
            let err = AppError::from_response(status, &text);
            tracing::warn!(op, status, kind = err.kind.as_str(), "backend call failed");
            return Err(err);
        }
        tracing::debug!(op, status, "backend call ok");
        Ok(text)
    }
}

fn require_filters(op: &str, query: &Query) -> Result<(), AppError> {
    if query.filters.is_empty() {
        return Err(AppError::new(ErrorKind::Validation, 0, format!("{op} requires at least one filter")));
    }
    Ok(())
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl Backend for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str, role: Role) -> Result<SignUpOutcome, AppError> {
        let body = json!({ "email": email, "password": password, "data": { "role": role } });
        let req = self.request(Method::POST, &self.auth_url("signup"), None).json(&body);
        let text = self.send("sign_up", req).await?;
        parse_sign_up(&text, email)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let body = json!({ "email": email, "password": password });
        let req = self
            .request(Method::POST, &self.auth_url("token"), None)
            .query(&[("grant_type", "password")])
            .json(&body);
        let text = self.send("sign_in", req).await?;
        parse_session(&text)
    }

    async fn sign_out(&self, session: &Session) -> Result<(), AppError> {
        let req = self.request(Method::POST, &self.auth_url("logout"), Some(session));
        self.send("sign_out", req).await.map(|_| ())
    }

    async fn send_otp(&self, email: &str, purpose: OtpPurpose) -> Result<(), AppError> {
        let req = match purpose {
            OtpPurpose::Signup => self
                .request(Method::POST, &self.auth_url("resend"), None)
                .json(&json!({ "type": "signup", "email": email })),
            OtpPurpose::Recovery => self
                .request(Method::POST, &self.auth_url("recover"), None)
                .json(&json!({ "email": email })),
        };
        self.send("send_otp", req).await.map(|_| ())
    }

    async fn verify_otp(&self, email: &str, code: &str, purpose: OtpPurpose) -> Result<Session, AppError> {
        let body = json!({ "type": purpose.as_str(), "email": email, "token": code });
        let req = self.request(Method::POST, &self.auth_url("verify"), None).json(&body);
        let text = self.send("verify_otp", req).await?;
        parse_session(&text)
    }

    async fn update_password(&self, session: &Session, password: &str) -> Result<(), AppError> {
        let req = self
            .request(Method::PUT, &self.auth_url("user"), Some(session))
            .json(&json!({ "password": password }));
        self.send("update_password", req).await.map(|_| ())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        if self.config.service_key.is_none() {
            return Err(AppError::new(ErrorKind::PermissionDenied, 0, "deleting users requires the service key"));
        }
        let url = self.auth_url(&format!("admin/users/{user_id}"));
        let req = self.request(Method::DELETE, &url, None);
        self.send("delete_user", req).await.map(|_| ())
    }

    async fn select(&self, session: Option<&Session>, table: Table, query: &Query) -> Result<Vec<Value>, AppError> {
        let req = self
            .request(Method::GET, &self.rest_url(table), session)
            .query(&[("select", "*")])
            .query(&query.to_pairs());
        let text = self.send("select", req).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn insert(&self, session: Option<&Session>, table: Table, row: Value) -> Result<Value, AppError> {
        let req = self
            .request(Method::POST, &self.rest_url(table), session)
            .header("Prefer", PREFER_RETURN)
            .json(&row);
        let text = self.send("insert", req).await?;
        first_row(&text)
    }

    async fn update(
        &self,
        session: Option<&Session>,
        table: Table,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, AppError> {
        require_filters("update", query)?;
        let req = self
            .request(Method::PATCH, &self.rest_url(table), session)
            .query(&query.to_pairs())
            .header("Prefer", PREFER_RETURN)
            .json(&patch);
        let text = self.send("update", req).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn upsert(
        &self,
        session: Option<&Session>,
        table: Table,
        row: Value,
        on_conflict: &str,
    ) -> Result<Value, AppError> {
        let req = self
            .request(Method::POST, &self.rest_url(table), session)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", PREFER_UPSERT)
            .json(&row);
        let text = self.send("upsert", req).await?;
        first_row(&text)
    }

    async fn delete(&self, session: Option<&Session>, table: Table, query: &Query) -> Result<(), AppError> {
        require_filters("delete", query)?;
        let req = self
            .request(Method::DELETE, &self.rest_url(table), session)
            .query(&query.to_pairs());
        self.send("delete", req).await.map(|_| ())
    }

    async fn upload(
        &self,
        session: Option<&Session>,
        bucket: Bucket,
        path: &str,
        file: &Attachment,
    ) -> Result<String, AppError> {
        let req = self
            .request(Method::POST, &self.object_url(bucket, path), session)
            .header("Content-Type", &file.content_type)
            .header("x-upsert", "true")
            .body(file.bytes.clone());
        self.send("upload", req).await?;
        Ok(path.to_owned())
    }
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Debug, Deserialize)]
struct UserWire {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<Value>,
}

impl UserWire {
    fn into_user(self, fallback_email: &str) -> AuthUser {
        let role = self
            .user_metadata
            .as_ref()
            .and_then(|m| m.get("role"))
            .and_then(Value::as_str)
            .and_then(|r| r.parse::<Role>().ok());
        AuthUser { id: self.id, email: self.email.unwrap_or_else(|| fallback_email.to_owned()), role }
    }
}

#[derive(Debug, Deserialize)]
struct SessionWire {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserWire,
}

fn parse_session(body: &str) -> Result<Session, AppError> {
    let wire: SessionWire = serde_json::from_str(body).map_err(|e| AppError::decode(200, e.to_string()))?;
    Ok(Session {
        access_token: wire.access_token,
        refresh_token: wire.refresh_token,
        expires_at: wire.expires_at,
        user: wire.user.into_user(""),
    })
}

/// Sign-up answers with a full session when confirmation is disabled, with
/// `{ "user": ..., "session": null }` on older deployments, or with the bare
/// user object when the email still needs confirming.
fn parse_sign_up(body: &str, email: &str) -> Result<SignUpOutcome, AppError> {
    let value: Value = serde_json::from_str(body).map_err(|e| AppError::decode(200, e.to_string()))?;
    if value.get("access_token").is_some() {
        let session = parse_session(body)?;
        return Ok(SignUpOutcome { user: session.user.clone(), session: Some(session) });
    }
    let user_value = match value.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => value,
    };
    let wire: UserWire = serde_json::from_value(user_value).map_err(|e| AppError::decode(200, e.to_string()))?;
    Ok(SignUpOutcome { user: wire.into_user(email), session: None })
}

fn first_row(body: &str) -> Result<Value, AppError> {
    let value: Value = serde_json::from_str(body).map_err(|e| AppError::decode(200, e.to_string()))?;
    match value {
        Value::Array(rows) => rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::new(ErrorKind::NotFound, 200, "no row returned")),
        other => Ok(other),
    }
}

#[cfg(test)]
#[path = "rest_test.rs"]
mod tests;
