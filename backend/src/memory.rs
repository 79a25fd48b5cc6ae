//! In-process [`Backend`] for tests and offline runs.
//!
//! Keeps users, one-time codes, table rows, and stored objects behind a
//! mutex. Rejections are produced through [`AppError::from_response`] with the
//! same structured codes the hosted services return, so error mapping is
//! exercised end to end.
//!
//! Every call is recorded by name; tests use [`MemoryBackend::call_count`] to
//! assert that committed steps are not re-run, and [`MemoryBackend::fail_next`]
//! to inject a one-shot failure.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::AppError;
use crate::facade::Backend;
use crate::types::{
    Attachment, AuthUser, Bucket, Filter, FilterOp, OtpPurpose, Query, Role, Session, SignUpOutcome, Table,
};

/// Shortest password the hosted auth service accepts.
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct MemUser {
    id: String,
    email: String,
    password: String,
    role: Option<Role>,
    confirmed: bool,
}

impl MemUser {
    fn auth_user(&self) -> AuthUser {
        AuthUser { id: self.id.clone(), email: self.email.clone(), role: self.role }
    }
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<String, MemUser>,
    codes: BTreeMap<(String, OtpPurpose), String>,
    tables: BTreeMap<Table, Vec<Value>>,
    objects: BTreeMap<(Bucket, String), Attachment>,
    calls: Vec<&'static str>,
    failures: BTreeMap<&'static str, (usize, AppError)>,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and return an injected failure, if one is armed.
    fn enter(&self, op: &'static str) -> Result<MutexGuard<'_, State>, AppError> {
        let mut state = self.lock();
        state.calls.push(op);
        tracing::debug!(op, "memory backend call");
        let armed = match state.failures.get(op).map(|(skip, _)| *skip) {
            Some(0) => state.failures.remove(op).map(|(_, err)| err),
            Some(_) => {
                if let Some((skip, _)) = state.failures.get_mut(op) {
                    *skip -= 1;
                }
                None
            }
            None => None,
        };
        match armed {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }

    // -------------------------------------------------------------------------
    // test controls
    // -------------------------------------------------------------------------

    /// Make the next call to `op` (a [`Backend`] method name) fail with `err`.
    pub fn fail_next(&self, op: &'static str, err: AppError) {
        self.fail_after(op, 0, err);
    }

    /// Let `skip` calls to `op` succeed, then fail the next one with `err`.
    pub fn fail_after(&self, op: &'static str, skip: usize, err: AppError) {
        self.lock().failures.insert(op, (skip, err));
    }

    /// Number of times `op` has been called.
    #[must_use]
    pub fn call_count(&self, op: &str) -> usize {
        self.lock().calls.iter().filter(|c| **c == op).count()
    }

    /// The outstanding one-time code for `email`, as the user would read it
    /// from their inbox.
    #[must_use]
    pub fn issued_code(&self, email: &str, purpose: OtpPurpose) -> Option<String> {
        self.lock().codes.get(&(email.to_owned(), purpose)).cloned()
    }

    /// Create a confirmed account directly. Returns the user id.
    pub fn seed_user(&self, email: &str, password: &str, role: Option<Role>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let user = MemUser { id: id.clone(), email: email.to_owned(), password: password.to_owned(), role, confirmed: true };
        self.lock().users.insert(email.to_owned(), user);
        id
    }

    /// Insert rows verbatim, bypassing id and timestamp defaults.
    pub fn seed_rows(&self, table: Table, rows: impl IntoIterator<Item = Value>) {
        self.lock().tables.entry(table).or_default().extend(rows);
    }

    #[must_use]
    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.lock().tables.get(&table).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn object(&self, bucket: Bucket, path: &str) -> Option<Attachment> {
        self.lock().objects.get(&(bucket, path.to_owned())).cloned()
    }

    #[must_use]
    pub fn user_exists(&self, user_id: &str) -> bool {
        self.lock().users.values().any(|u| u.id == user_id)
    }
}

// =============================================================================
// BACKEND
// =============================================================================

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl Backend for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str, role: Role) -> Result<SignUpOutcome, AppError> {
        let mut state = self.enter("sign_up")?;
        if state.users.contains_key(email) {
            return Err(reject(422, json!({ "error_code": "user_already_exists", "msg": "User already registered" })));
        }
        check_password(password)?;
        let user = MemUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_owned(),
            password: password.to_owned(),
            role: Some(role),
            confirmed: false,
        };
        let auth_user = user.auth_user();
        state.users.insert(email.to_owned(), user);
        state.codes.insert((email.to_owned(), OtpPurpose::Signup), new_code());
        Ok(SignUpOutcome { user: auth_user, session: None })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let state = self.enter("sign_in")?;
        let user = state
            .users
            .get(email)
            .filter(|u| u.password == password)
            .ok_or_else(|| reject(400, json!({ "error_code": "invalid_credentials", "msg": "Invalid login credentials" })))?;
        if !user.confirmed {
            return Err(reject(400, json!({ "error_code": "email_not_confirmed", "msg": "Email not confirmed" })));
        }
        Ok(session_for(user))
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), AppError> {
        self.enter("sign_out").map(|_| ())
    }

    async fn send_otp(&self, email: &str, purpose: OtpPurpose) -> Result<(), AppError> {
        let mut state = self.enter("send_otp")?;
        // Unknown addresses succeed silently so callers cannot probe for accounts.
        if state.users.contains_key(email) {
            state.codes.insert((email.to_owned(), purpose), new_code());
        }
        Ok(())
    }

    async fn verify_otp(&self, email: &str, code: &str, purpose: OtpPurpose) -> Result<Session, AppError> {
        let mut state = self.enter("verify_otp")?;
        let key = (email.to_owned(), purpose);
        if state.codes.get(&key).map(String::as_str) != Some(code) {
            return Err(reject(403, json!({ "error_code": "otp_expired", "msg": "Token has expired or is invalid" })));
        }
        state.codes.remove(&key);
        let user = state
            .users
            .get_mut(email)
            .ok_or_else(|| reject(404, json!({ "error_code": "user_not_found", "msg": "User not found" })))?;
        user.confirmed = true;
        Ok(session_for(user))
    }

    async fn update_password(&self, session: &Session, password: &str) -> Result<(), AppError> {
        let mut state = self.enter("update_password")?;
        check_password(password)?;
        let user = state
            .users
            .values_mut()
            .find(|u| u.id == session.user.id)
            .ok_or_else(|| reject(401, json!({ "error_code": "session_not_found", "msg": "Session not found" })))?;
        user.password = password.to_owned();
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        let mut state = self.enter("delete_user")?;
        let before = state.users.len();
        state.users.retain(|_, u| u.id != user_id);
        if state.users.len() == before {
            return Err(reject(404, json!({ "error_code": "user_not_found", "msg": "User not found" })));
        }
        Ok(())
    }

    async fn select(&self, _session: Option<&Session>, table: Table, query: &Query) -> Result<Vec<Value>, AppError> {
        let state = self.enter("select")?;
        let mut rows: Vec<Value> = state
            .tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| matches(r, &query.filters)).cloned().collect())
            .unwrap_or_default();
        if let Some((column, asc)) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(column), b.get(column));
                if *asc { ord } else { ord.reverse() }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, _session: Option<&Session>, table: Table, row: Value) -> Result<Value, AppError> {
        let mut state = self.enter("insert")?;
        let row = with_defaults(row)?;
        let rows = state.tables.entry(table).or_default();
        if rows.iter().any(|r| r.get("id") == row.get("id")) {
            return Err(reject(409, json!({ "code": "23505", "message": "duplicate key value violates unique constraint" })));
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        _session: Option<&Session>,
        table: Table,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, AppError> {
        let mut state = self.enter("update")?;
        let Value::Object(patch) = patch else {
            return Err(reject(400, json!({ "code": "PGRST204", "message": "patch must be an object" })));
        };
        let mut updated = Vec::new();
        for row in state.tables.entry(table).or_default().iter_mut() {
            if matches(row, &query.filters) {
                merge(row, &patch);
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn upsert(
        &self,
        _session: Option<&Session>,
        table: Table,
        row: Value,
        on_conflict: &str,
    ) -> Result<Value, AppError> {
        let mut state = self.enter("upsert")?;
        let Value::Object(fields) = &row else {
            return Err(reject(400, json!({ "code": "PGRST204", "message": "row must be an object" })));
        };
        let keys: Vec<&str> = on_conflict.split(',').map(str::trim).collect();
        let rows = state.tables.entry(table).or_default();
        let existing = rows
            .iter_mut()
            .find(|r| keys.iter().all(|k| r.get(*k).is_some() && r.get(*k) == fields.get(*k)));
        if let Some(existing) = existing {
            merge(existing, fields);
            return Ok(existing.clone());
        }
        let row = with_defaults(row)?;
        rows.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, _session: Option<&Session>, table: Table, query: &Query) -> Result<(), AppError> {
        let mut state = self.enter("delete")?;
        if let Some(rows) = state.tables.get_mut(&table) {
            rows.retain(|r| !matches(r, &query.filters));
        }
        Ok(())
    }

    async fn upload(
        &self,
        _session: Option<&Session>,
        bucket: Bucket,
        path: &str,
        file: &Attachment,
    ) -> Result<String, AppError> {
        let mut state = self.enter("upload")?;
        state.objects.insert((bucket, path.to_owned()), file.clone());
        Ok(path.to_owned())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn reject(status: u16, body: Value) -> AppError {
    AppError::from_response(status, &body.to_string())
}

fn check_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(reject(
            422,
            json!({ "error_code": "weak_password", "msg": "Password should be at least 6 characters" }),
        ));
    }
    Ok(())
}

fn new_code() -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    let n = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) % 1_000_000;
    format!("{n:06}")
}

fn session_for(user: &MemUser) -> Session {
    Session {
        access_token: format!("mem-{}", uuid::Uuid::new_v4()),
        refresh_token: uuid::Uuid::new_v4().to_string(),
        expires_at: None,
        user: user.auth_user(),
    }
}

fn with_defaults(row: Value) -> Result<Value, AppError> {
    let Value::Object(mut fields) = row else {
        return Err(reject(400, json!({ "code": "PGRST204", "message": "row must be an object" })));
    };
    if !fields.get("id").is_some_and(|v| !v.is_null()) {
        fields.insert("id".to_owned(), Value::String(uuid::Uuid::new_v4().to_string()));
    }
    if !fields.get("created_at").is_some_and(|v| !v.is_null()) {
        let now = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        fields.insert("created_at".to_owned(), Value::String(now));
    }
    Ok(Value::Object(fields))
}

fn merge(row: &mut Value, patch: &Map<String, Value>) {
    if let Value::Object(fields) = row {
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => cell_text(a).cmp(&cell_text(b)),
    }
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| {
        let cell = row.get(&f.column).unwrap_or(&Value::Null);
        let target = Value::String(f.value.clone());
        let numeric = f.value.parse::<f64>().ok().map(Value::from);
        let ord = || compare(Some(cell), Some(numeric.as_ref().filter(|_| cell.is_number()).unwrap_or(&target)));
        match f.op {
            FilterOp::Eq => cell_text(cell) == f.value,
            FilterOp::Neq => cell_text(cell) != f.value,
            FilterOp::Lt => ord().is_lt(),
            FilterOp::Lte => ord().is_le(),
            FilterOp::Gt => ord().is_gt(),
            FilterOp::Gte => ord().is_ge(),
            FilterOp::In => f.value.split(',').any(|v| cell_text(cell) == v.trim()),
            FilterOp::Is => match f.value.as_str() {
                "null" => cell.is_null(),
                "true" => cell == &Value::Bool(true),
                "false" => cell == &Value::Bool(false),
                _ => false,
            },
        }
    })
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
