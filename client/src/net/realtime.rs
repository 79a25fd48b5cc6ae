//! Live chat channel over the realtime websocket.
//!
//! SYSTEM CONTEXT
//! ==============
//! The chat page opens one channel per conversation with [`open_chat`] and
//! closes it on cleanup. Inserted `messages` rows for that conversation are
//! appended to the page's [`ChatLog`], which drops duplicates by id.
//!
//! DESIGN
//! ======
//! - Join with a `postgres_changes` filter on `conversation_id`, then send a
//!   heartbeat every `HEARTBEAT_SECS`.
//! - On any disconnect, wait `backoff_ms(attempt)` and reconnect. A
//!   successful join resets the attempt counter.
//! - Closing flips a shared flag; the loop notices within a second, sends
//!   `phx_leave`, and drops the socket.
//!
//! All websocket logic is gated behind `hydrate`; on the server the handle
//! is inert.

#[cfg(test)]
#[path = "realtime_test.rs"]
mod realtime_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use backend::Table;
use backend::realtime::{Subscription, topic_for};
#[cfg(feature = "hydrate")]
use backend::Session;
#[cfg(feature = "hydrate")]
use leptos::prelude::*;

#[cfg(feature = "hydrate")]
use crate::state::chat::{ChannelStatus, ChatLog};

/// Channel topic for one conversation.
pub fn chat_topic(conversation_id: &str) -> String {
    topic_for(&format!("messages:{conversation_id}"))
}

pub fn chat_subscriptions(conversation_id: &str) -> Vec<Subscription> {
    vec![Subscription::filtered(Table::Messages, "conversation_id", conversation_id)]
}

/// Shared stop flag for a running channel loop.
#[derive(Clone, Debug)]
pub struct ChannelHandle {
    alive: Arc<AtomicBool>,
}

impl ChannelHandle {
    pub fn new() -> Self {
        Self { alive: Arc::new(AtomicBool::new(true)) }
    }

    pub fn is_open(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    pub fn close(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }
}

impl Default for ChannelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the channel loop for `conversation_id`.
#[cfg(feature = "hydrate")]
pub fn open_chat(
    conversation_id: String,
    session: Option<Session>,
    log: RwSignal<ChatLog>,
    status: RwSignal<ChannelStatus>,
) -> ChannelHandle {
    let handle = ChannelHandle::new();
    let alive = handle.alive.clone();
    leptos::task::spawn_local(channel_loop(conversation_id, session, log, status, alive));
    handle
}

#[cfg(feature = "hydrate")]
async fn channel_loop(
    conversation_id: String,
    session: Option<Session>,
    log: RwSignal<ChatLog>,
    status: RwSignal<ChannelStatus>,
    alive: Arc<AtomicBool>,
) {
    use std::cell::Cell;

    let url = match backend::BackendConfig::from_build_env() {
        Ok(config) => backend::realtime::realtime_url(&config),
        Err(e) => {
            leptos::logging::warn!("realtime disabled: {e}");
            status.set(ChannelStatus::Offline);
            return;
        }
    };
    let token = session.as_ref().map(|s| s.access_token.clone());
    let attempt = Cell::new(0_u32);

    while alive.load(Ordering::Relaxed) {
        status.set(ChannelStatus::Connecting);
        match connect_and_run(&url, &conversation_id, token.as_deref(), log, status, &alive, &attempt).await {
            Ok(()) => leptos::logging::log!("chat channel closed"),
            Err(e) => leptos::logging::warn!("chat channel error: {e}"),
        }
        if !alive.load(Ordering::Relaxed) {
            break;
        }
        status.set(ChannelStatus::Offline);
        let delay = backend::realtime::backoff_ms(attempt.get());
        attempt.set(attempt.get().saturating_add(1));
        gloo_timers::future::sleep(std::time::Duration::from_millis(delay)).await;
    }
}

#[cfg(feature = "hydrate")]
async fn connect_and_run(
    url: &str,
    conversation_id: &str,
    token: Option<&str>,
    log: RwSignal<ChatLog>,
    status: RwSignal<ChannelStatus>,
    alive: &AtomicBool,
    attempt: &std::cell::Cell<u32>,
) -> Result<(), String> {
    use backend::realtime::{ChannelCodec, ChannelEvent, HEARTBEAT_SECS, parse_frame};
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::Message;
    use gloo_net::websocket::futures::WebSocket;

    let ws = WebSocket::open(url).map_err(|e| e.to_string())?;
    let (mut ws_write, mut ws_read) = ws.split();

    let topic = chat_topic(conversation_id);
    let mut codec = ChannelCodec::new();
    let join = codec.join(&topic, &chat_subscriptions(conversation_id), token);
    ws_write.send(Message::Text(join)).await.map_err(|e| e.to_string())?;

    // Heartbeat and shutdown: tick each second, beat every HEARTBEAT_SECS.
    let heartbeat_task = async {
        let mut ticks = 0_u64;
        loop {
            gloo_timers::future::sleep(std::time::Duration::from_secs(1)).await;
            if !alive.load(Ordering::Relaxed) {
                let _ = ws_write.send(Message::Text(codec.leave(&topic))).await;
                break;
            }
            ticks += 1;
            if ticks % HEARTBEAT_SECS == 0 && ws_write.send(Message::Text(codec.heartbeat())).await.is_err() {
                break;
            }
        }
    };

    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text,
                Ok(Message::Bytes(_)) => continue,
                Err(e) => {
                    leptos::logging::warn!("chat recv error: {e}");
                    break;
                }
            };
            match parse_frame(&text) {
                Ok(ChannelEvent::JoinOk { topic: joined }) if joined == topic => {
                    attempt.set(0);
                    status.set(ChannelStatus::Live);
                }
                Ok(ChannelEvent::JoinError { reason, .. }) => {
                    leptos::logging::warn!("chat join rejected: {reason}");
                    break;
                }
                Ok(ChannelEvent::Change { change, .. }) => {
                    log.update(|l| {
                        l.apply(&change);
                    });
                }
                Ok(ChannelEvent::Closed { topic: closed }) if closed == topic => break,
                Ok(_) => {}
                Err(e) => leptos::logging::warn!("unreadable realtime frame: {e}"),
            }
        }
    };

    futures::future::select(Box::pin(heartbeat_task), Box::pin(recv_task)).await;
    Ok(())
}
