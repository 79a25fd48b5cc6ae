//! Realtime channel codec.
//!
//! The hosted realtime service speaks the Phoenix channel protocol over a
//! WebSocket: JSON envelopes of `{topic, event, payload, ref}`. This module
//! only encodes and decodes envelopes; the socket loop lives with the caller
//! (the browser client drives it with `gloo-net`).
//!
//! DESIGN
//! ======
//! - One socket may carry several channel topics (`realtime:<name>`).
//! - A heartbeat on the `phoenix` topic must be sent every
//!   [`HEARTBEAT_SECS`] or the server drops the socket.
//! - Row changes arrive as `postgres_changes` events and are surfaced as
//!   [`RowChange`] values; callers dedupe on the row id.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::BackendConfig;
use crate::error::AppError;
use crate::types::Table;

pub const HEARTBEAT_SECS: u64 = 25;
pub const RECONNECT_BASE_MS: u64 = 1_000;
pub const RECONNECT_MAX_MS: u64 = 10_000;

const PHOENIX_TOPIC: &str = "phoenix";
const PROTOCOL_VSN: &str = "1.0.0";

/// WebSocket endpoint for the configured project.
#[must_use]
pub fn realtime_url(config: &BackendConfig) -> String {
    let base = if let Some(rest) = config.url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = config.url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        config.url.clone()
    };
    format!("{base}/realtime/v1/websocket?apikey={}&vsn={PROTOCOL_VSN}", config.anon_key)
}

/// Delay before reconnect attempt `attempt` (zero-based), doubling up to the cap.
#[must_use]
pub fn backoff_ms(attempt: u32) -> u64 {
    RECONNECT_BASE_MS
        .saturating_mul(1_u64.checked_shl(attempt).unwrap_or(u64::MAX))
        .min(RECONNECT_MAX_MS)
}

#[must_use]
pub fn topic_for(name: &str) -> String {
    format!("realtime:{name}")
}

// =============================================================================
// ENVELOPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

/// A `postgres_changes` subscription within a channel join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub table: Table,
    /// Row filter in `column=op.value` form, e.g. `conversation_id=eq.c1`.
    pub filter: Option<String>,
}

impl Subscription {
    #[must_use]
    pub fn table(table: Table) -> Self {
        Self { table, filter: None }
    }

    #[must_use]
    pub fn filtered(table: Table, column: &str, value: &str) -> Self {
        Self { table, filter: Some(format!("{column}=eq.{value}")) }
    }

    fn to_config(&self) -> Value {
        let mut entry = json!({ "event": "*", "schema": "public", "table": self.table.as_str() });
        if let Some(filter) = &self.filter {
            entry["filter"] = Value::String(filter.clone());
        }
        entry
    }
}

/// Encoder that owns the per-socket message reference counter.
#[derive(Debug, Default)]
pub struct ChannelCodec {
    next_ref: u64,
}

impl ChannelCodec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn take_ref(&mut self) -> String {
        self.next_ref += 1;
        self.next_ref.to_string()
    }

    fn encode(&mut self, topic: &str, event: &str, payload: Value) -> String {
        let envelope = Envelope {
            topic: topic.to_owned(),
            event: event.to_owned(),
            payload,
            reference: Some(self.take_ref()),
        };
        // Serializing a struct of strings and a Value cannot fail.
        serde_json::to_string(&envelope).unwrap_or_default()
    }

    /// Join `topic` with the given row subscriptions.
    pub fn join(&mut self, topic: &str, subscriptions: &[Subscription], access_token: Option<&str>) -> String {
        let changes: Vec<Value> = subscriptions.iter().map(Subscription::to_config).collect();
        let mut payload = json!({
            "config": {
                "broadcast": { "self": false },
                "presence": { "key": "" },
                "postgres_changes": changes,
            }
        });
        if let Some(token) = access_token {
            payload["access_token"] = Value::String(token.to_owned());
        }
        self.encode(topic, "phx_join", payload)
    }

    pub fn heartbeat(&mut self) -> String {
        self.encode(PHOENIX_TOPIC, "heartbeat", json!({}))
    }

    pub fn leave(&mut self, topic: &str) -> String {
        self.encode(topic, "phx_leave", json!({}))
    }
}

// =============================================================================
// DECODING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowChange {
    pub kind: ChangeKind,
    pub table: String,
    /// New row; `null` for deletes.
    pub record: Value,
    /// Previous row (primary key only unless replica identity is full).
    pub old_record: Value,
}

impl RowChange {
    /// Decode the new row into a typed value.
    ///
    /// # Errors
    ///
    /// Returns a `Decode` error when the record does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        Ok(serde_json::from_value(self.record.clone())?)
    }

    /// Row id of the affected record, from the new row or the old one.
    #[must_use]
    pub fn row_id(&self) -> Option<&str> {
        self.record
            .get("id")
            .and_then(Value::as_str)
            .or_else(|| self.old_record.get("id").and_then(Value::as_str))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    JoinOk { topic: String },
    JoinError { topic: String, reason: String },
    Change { topic: String, change: RowChange },
    HeartbeatAck,
    Closed { topic: String },
    Other { topic: String, event: String },
}

/// Decode one text frame.
///
/// # Errors
///
/// Returns a `Decode` error for frames that are not valid envelopes.
pub fn parse_frame(text: &str) -> Result<ChannelEvent, AppError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    let Envelope { topic, event, payload, .. } = envelope;
    let event = match event.as_str() {
        "phx_reply" if topic == PHOENIX_TOPIC => ChannelEvent::HeartbeatAck,
        "phx_reply" => {
            if payload.get("status").and_then(Value::as_str) == Some("ok") {
                ChannelEvent::JoinOk { topic }
            } else {
                let reason = payload
                    .pointer("/response/reason")
                    .and_then(Value::as_str)
                    .unwrap_or("join rejected")
                    .to_owned();
                ChannelEvent::JoinError { topic, reason }
            }
        }
        "phx_error" => ChannelEvent::JoinError { topic, reason: "channel error".to_owned() },
        "phx_close" => ChannelEvent::Closed { topic },
        "postgres_changes" => match parse_change(&payload) {
            Some(change) => ChannelEvent::Change { topic, change },
            None => ChannelEvent::Other { topic, event },
        },
        _ => ChannelEvent::Other { topic, event },
    };
    Ok(event)
}

fn parse_change(payload: &Value) -> Option<RowChange> {
    let data = payload.get("data")?;
    let kind = match data.get("type")?.as_str()? {
        "INSERT" => ChangeKind::Insert,
        "UPDATE" => ChangeKind::Update,
        "DELETE" => ChangeKind::Delete,
        _ => return None,
    };
    Some(RowChange {
        kind,
        table: data.get("table").and_then(Value::as_str).unwrap_or_default().to_owned(),
        record: data.get("record").cloned().unwrap_or(Value::Null),
        old_record: data.get("old_record").cloned().unwrap_or(Value::Null),
    })
}

#[cfg(test)]
#[path = "realtime_test.rs"]
mod tests;
