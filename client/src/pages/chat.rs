//! Order conversation with live updates.
//!
//! SYSTEM CONTEXT
//! ==============
//! `/chat/:id` loads the conversation's history, then opens a realtime
//! channel filtered to it. Sent messages are appended from the insert
//! response; the realtime echo is de-duplicated by `ChatLog`. The channel
//! closes when the page unmounts.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use backend::Role;
use backend::rows::Conversation;
use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::{use_navigate, use_params_map};

use crate::net::realtime::ChannelHandle;
use crate::state::app::AppContext;
use crate::state::chat::{ChannelStatus, ChatLog};
use crate::util::auth::{allowed_signal, install_guard};
use crate::util::format;

const ANY_ROLE: &[Role] = &Role::ALL;

/// Participants read their own conversations; admins read any.
pub fn can_view(conversation: &Conversation, role: Role, user_id: &str) -> bool {
    role == Role::Admin || conversation.includes(user_id)
}

#[derive(Clone, Debug, PartialEq)]
enum Load {
    Loading,
    Ready(Conversation),
    Missing,
}

#[component]
pub fn ChatPage(ctx: AppContext) -> impl IntoView {
    install_guard(ctx, ANY_ROLE, use_navigate());
    let allowed = allowed_signal(ctx, ANY_ROLE);
    let params = use_params_map();
    let conversation_id = Memo::new(move |_| params.read().get("id").unwrap_or_default());

    let state = RwSignal::new(Load::Loading);
    let log = RwSignal::new(ChatLog::default());
    let status = RwSignal::new(ChannelStatus::default());
    let draft = RwSignal::new(String::new());
    let sending = RwSignal::new(false);
    let channel = StoredValue::new(None::<ChannelHandle>);

    Effect::new(move |_| {
        if !allowed.get() {
            return;
        }
        let id = conversation_id.get();
        let (Some(role), Some(user_id)) = (ctx.role(), ctx.user_id()) else { return };
        if let Some(old) = channel.get_value() {
            old.close();
        }
        state.set(Load::Loading);
        log.set(ChatLog::new(id.clone()));
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                let repo = backend::repo::Repo::new(&client, session.as_ref());
                let Some(conversation) = repo.conversation(&id).await? else { return Ok(None) };
                if !can_view(&conversation, role, &user_id) {
                    return Ok(None);
                }
                let history = repo.messages(&id).await?;
                Ok::<_, backend::AppError>(Some((conversation, history)))
            }
            .await;
            match result {
                Ok(Some((conversation, history))) => {
                    log.update(|l| l.load(history));
                    state.set(Load::Ready(conversation));
                    let handle = crate::net::realtime::open_chat(id, session, log, status);
                    channel.set_value(Some(handle));
                }
                Ok(None) => state.set(Load::Missing),
                Err(e) => {
                    state.set(Load::Missing);
                    ctx.error(e.humanize());
                }
            }
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (id, role, user_id);
        }
    });

    on_cleanup(move || {
        if let Some(handle) = channel.try_get_value().flatten() {
            handle.close();
        }
    });

    let on_send = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let body = draft.get_untracked();
        if body.trim().is_empty() || sending.get_untracked() {
            return;
        }
        let Some(user_id) = ctx.user_id() else { return };
        let id = conversation_id.get_untracked();
        sending.set(true);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).send_message(&id, &user_id, &body).await
            }
            .await;
            match result {
                Ok(message) => {
                    log.update(|l| {
                        l.push(message);
                    });
                    draft.set(String::new());
                }
                Err(e) => ctx.error(e.humanize()),
            }
            sending.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (body, user_id, id);
        }
    };

    view! {
        <main class="chat">
            <Show when=move || allowed.get() fallback=|| view! { <p class="loading">"Loading…"</p> }>
                {move || match state.get() {
                    Load::Loading => view! { <p class="loading">"Loading conversation…"</p> }.into_any(),
                    Load::Missing => view! {
                        <p class="muted">"This conversation is not available. " <A href="/orders">"Back to orders"</A></p>
                    }
                    .into_any(),
                    Load::Ready(conversation) => {
                        let me = ctx.user_id().unwrap_or_default();
                        view! {
                            <header class="chat__header">
                                <h1>
                                    {conversation
                                        .order_id
                                        .as_deref()
                                        .map_or_else(|| "Conversation".to_owned(), |o| format!("Order #{}", o.chars().take(8).collect::<String>()))}
                                </h1>
                                <span class="chat__status" class:chat__status--live=move || status.get() == ChannelStatus::Live>
                                    {move || status.get().label()}
                                </span>
                            </header>
                            <ol class="chat__log" aria-live="polite">
                                <For
                                    each=move || log.with(|l| l.messages().to_vec())
                                    key=|message| message.id.clone()
                                    children=move |message| {
                                        let mine = message.sender_id == me;
                                        view! {
                                            <li class="bubble" class:bubble--mine=mine>
                                                <p>{message.body.clone()}</p>
                                                <time>{format::clock_time(message.created_at)}</time>
                                            </li>
                                        }
                                    }
                                />
                            </ol>
                            <form class="chat__composer" on:submit=on_send>
                                <input
                                    class="input"
                                    type="text"
                                    placeholder="Write a message"
                                    maxlength="1000"
                                    prop:value=move || draft.get()
                                    on:input=move |ev| draft.set(event_target_value(&ev))
                                />
                                <button
                                    class="btn btn--primary"
                                    type="submit"
                                    disabled=move || sending.get() || draft.with(|d| d.trim().is_empty())
                                >
                                    "Send"
                                </button>
                            </form>
                        }
                        .into_any()
                    }
                }}
            </Show>
        </main>
    }
}
