//! Registration draft: the data a wizard accumulates across steps.
//!
//! A draft is owned by exactly one wizard. Besides form values it remembers
//! which steps have been committed remotely (as checkpoints) and what those
//! commits produced (account, session, stored file paths), so revisiting a
//! step with unchanged input does not repeat its remote call.
//!
//! Secrets and file contents never leave memory: [`Draft::snapshot`] drops
//! password fields and attachments before anything is written to browser
//! storage.

use std::collections::BTreeMap;

use backend::{Attachment, AuthUser, Session};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Field keys that are never persisted or fingerprinted.
pub const SECRET_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Marker that a step's remote effect succeeded for a given input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub step: String,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    fields: BTreeMap<String, String>,
    attachments: BTreeMap<String, Attachment>,
    checkpoints: BTreeMap<String, Checkpoint>,
    account: Option<AuthUser>,
    session: Option<Session>,
    uploads: BTreeMap<String, String>,
    /// Digest of the attachment behind each recorded upload.
    uploaded_files: BTreeMap<String, String>,
}

/// Storage-safe copy of a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub checkpoints: BTreeMap<String, Checkpoint>,
    #[serde(default)]
    pub account: Option<AuthUser>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub uploads: BTreeMap<String, String>,
}

fn is_secret(key: &str) -> bool {
    SECRET_FIELDS.contains(&key)
}

fn hex(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn file_digest(file: &Attachment) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file.file_name.as_bytes());
    hasher.update(b"\x1e");
    hasher.update(&file.bytes);
    hex(&hasher.finalize())
}

impl Draft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // form values
    // -------------------------------------------------------------------------

    /// Field value, or `""` when unset.
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map_or("", String::as_str)
    }

    /// Trimmed field value.
    #[must_use]
    pub fn trimmed(&self, key: &str) -> &str {
        self.get(key).trim()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_owned(), value.into());
    }

    pub fn attach(&mut self, key: &str, file: Attachment) {
        self.attachments.insert(key.to_owned(), file);
    }

    pub fn detach(&mut self, key: &str) {
        self.attachments.remove(key);
    }

    #[must_use]
    pub fn attachment(&self, key: &str) -> Option<&Attachment> {
        self.attachments.get(key)
    }

    // -------------------------------------------------------------------------
    // commit results
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn account(&self) -> Option<&AuthUser> {
        self.account.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Id of the account this draft registers, once known.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|s| s.user.id.as_str())
            .or_else(|| self.account.as_ref().map(|a| a.id.as_str()))
    }

    pub(crate) fn set_account(&mut self, account: AuthUser) {
        self.account = Some(account);
    }

    pub(crate) fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Storage path recorded for an uploaded attachment.
    #[must_use]
    pub fn upload_path(&self, key: &str) -> Option<&str> {
        self.uploads.get(key).map(String::as_str)
    }

    /// Whether the current attachment for `key` is the one already stored.
    #[must_use]
    pub fn is_uploaded(&self, key: &str) -> bool {
        match (self.attachments.get(key), self.uploaded_files.get(key)) {
            (Some(file), Some(digest)) => self.uploads.contains_key(key) && file_digest(file) == *digest,
            _ => false,
        }
    }

    pub(crate) fn record_upload(&mut self, key: String, path: String) {
        match self.attachments.get(&key) {
            Some(file) => self.uploaded_files.insert(key.clone(), file_digest(file)),
            None => self.uploaded_files.remove(&key),
        };
        self.uploads.insert(key, path);
    }

    // -------------------------------------------------------------------------
    // checkpoints
    // -------------------------------------------------------------------------

    /// SHA-256 over the step's field values and attachment contents, hex encoded.
    #[must_use]
    pub fn fingerprint(&self, step: &str, fields: &[&str], attachments: &[&str]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(step.as_bytes());
        for key in fields.iter().filter(|k| !is_secret(k)) {
            hasher.update(b"\x1f");
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(self.trimmed(key).as_bytes());
        }
        for key in attachments {
            hasher.update(b"\x1e");
            hasher.update(key.as_bytes());
            if let Some(file) = self.attachments.get(*key) {
                hasher.update(file.file_name.as_bytes());
                hasher.update(&file.bytes);
            }
        }
        hex(&hasher.finalize())
    }

    #[must_use]
    pub fn checkpoint(&self, step: &str) -> Option<&Checkpoint> {
        self.checkpoints.get(step)
    }

    /// Whether `step` was committed with exactly this fingerprint.
    #[must_use]
    pub fn is_committed(&self, step: &str, fingerprint: &str) -> bool {
        self.checkpoint(step).is_some_and(|c| c.fingerprint == fingerprint)
    }

    pub(crate) fn record_checkpoint(&mut self, step: &str, fingerprint: String) {
        self.checkpoints
            .insert(step.to_owned(), Checkpoint { step: step.to_owned(), fingerprint });
    }

    pub(crate) fn drop_checkpoint(&mut self, step: &str) -> bool {
        self.checkpoints.remove(step).is_some()
    }

    // -------------------------------------------------------------------------
    // persistence
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            fields: self
                .fields
                .iter()
                .filter(|(k, _)| !is_secret(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            checkpoints: self.checkpoints.clone(),
            account: self.account.clone(),
            session: self.session.clone(),
            uploads: self.uploads.clone(),
        }
    }

    #[must_use]
    pub fn restore(snapshot: DraftSnapshot) -> Self {
        Self {
            fields: snapshot.fields,
            attachments: BTreeMap::new(),
            checkpoints: snapshot.checkpoints,
            account: snapshot.account,
            session: snapshot.session,
            uploads: snapshot.uploads,
            uploaded_files: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
#[path = "draft_test.rs"]
mod tests;
