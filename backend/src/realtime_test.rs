use super::*;
use crate::rows::ChatMessage;

fn envelope(text: &str) -> Envelope {
    serde_json::from_str(text).unwrap()
}

#[test]
fn realtime_url_switches_scheme() {
    let secure = BackendConfig::new("https://abc.example.co", "anon");
    assert_eq!(realtime_url(&secure), "wss://abc.example.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0");
    let local = BackendConfig::new("http://localhost:54321/", "k");
    assert!(realtime_url(&local).starts_with("ws://localhost:54321/realtime/v1/websocket"));
}

#[test]
fn backoff_doubles_and_caps() {
    assert_eq!(backoff_ms(0), 1_000);
    assert_eq!(backoff_ms(1), 2_000);
    assert_eq!(backoff_ms(3), 8_000);
    assert_eq!(backoff_ms(4), RECONNECT_MAX_MS);
    assert_eq!(backoff_ms(200), RECONNECT_MAX_MS);
}

#[test]
fn refs_increase_per_message() {
    let mut codec = ChannelCodec::new();
    let first = envelope(&codec.heartbeat());
    let second = envelope(&codec.leave("realtime:chat"));
    assert_eq!(first.reference.as_deref(), Some("1"));
    assert_eq!(second.reference.as_deref(), Some("2"));
    assert_eq!(first.topic, "phoenix");
    assert_eq!(second.event, "phx_leave");
}

#[test]
fn join_carries_subscriptions_and_token() {
    let mut codec = ChannelCodec::new();
    let subs = [Subscription::filtered(Table::Messages, "conversation_id", "c1"), Subscription::table(Table::Orders)];
    let join = envelope(&codec.join(&topic_for("chat-c1"), &subs, Some("jwt")));
    assert_eq!(join.topic, "realtime:chat-c1");
    assert_eq!(join.event, "phx_join");
    assert_eq!(join.payload["access_token"], "jwt");
    let changes = join.payload["config"]["postgres_changes"].as_array().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0]["table"], "messages");
    assert_eq!(changes[0]["filter"], "conversation_id=eq.c1");
    assert!(changes[1].get("filter").is_none());
}

#[test]
fn join_without_token_omits_it() {
    let mut codec = ChannelCodec::new();
    let join = envelope(&codec.join("realtime:x", &[], None));
    assert!(join.payload.get("access_token").is_none());
}

#[test]
fn parse_join_replies() {
    let ok = r#"{"topic":"realtime:chat","event":"phx_reply","payload":{"status":"ok","response":{}},"ref":"1"}"#;
    assert_eq!(parse_frame(ok).unwrap(), ChannelEvent::JoinOk { topic: "realtime:chat".into() });

    let err = r#"{"topic":"realtime:chat","event":"phx_reply","payload":{"status":"error","response":{"reason":"unauthorized"}},"ref":"1"}"#;
    assert_eq!(
        parse_frame(err).unwrap(),
        ChannelEvent::JoinError { topic: "realtime:chat".into(), reason: "unauthorized".into() }
    );

    let beat = r#"{"topic":"phoenix","event":"phx_reply","payload":{"status":"ok"},"ref":"2"}"#;
    assert_eq!(parse_frame(beat).unwrap(), ChannelEvent::HeartbeatAck);
}

#[test]
fn parse_insert_change_and_decode_row() {
    let text = r#"{
        "topic": "realtime:chat-c1",
        "event": "postgres_changes",
        "payload": { "data": {
            "type": "INSERT", "table": "messages", "schema": "public",
            "record": { "id": "m1", "conversation_id": "c1", "sender_id": "u1", "body": "hi" },
            "old_record": null
        }, "ids": [1] },
        "ref": null
    }"#;
    let ChannelEvent::Change { change, .. } = parse_frame(text).unwrap() else {
        panic!("expected change");
    };
    assert_eq!(change.kind, ChangeKind::Insert);
    assert_eq!(change.row_id(), Some("m1"));
    let message: ChatMessage = change.decode().unwrap();
    assert_eq!(message.body, "hi");
}

#[test]
fn delete_change_uses_old_record_id() {
    let text = r#"{"topic":"realtime:o","event":"postgres_changes","payload":{"data":{"type":"DELETE","table":"orders","old_record":{"id":"o9"}}}}"#;
    let ChannelEvent::Change { change, .. } = parse_frame(text).unwrap() else {
        panic!("expected change");
    };
    assert_eq!(change.kind, ChangeKind::Delete);
    assert_eq!(change.record, Value::Null);
    assert_eq!(change.row_id(), Some("o9"));
}

#[test]
fn unknown_events_pass_through() {
    let text = r#"{"topic":"realtime:o","event":"presence_state","payload":{}}"#;
    assert!(matches!(parse_frame(text).unwrap(), ChannelEvent::Other { .. }));
    let close = r#"{"topic":"realtime:o","event":"phx_close","payload":{}}"#;
    assert_eq!(parse_frame(close).unwrap(), ChannelEvent::Closed { topic: "realtime:o".into() });
}

#[test]
fn malformed_frame_is_decode_error() {
    assert_eq!(parse_frame("{").unwrap_err().kind, crate::error::ErrorKind::Decode);
}
