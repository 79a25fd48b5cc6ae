//! Order history for every signed-in role.
//!
//! Customers see what they ordered, vendors what they received, riders what
//! they carried, admins everything. Active orders expose the role's status
//! actions; each card can open the order's conversation.

use backend::Role;
use backend::rows::{NewOrder, Order, OrderStatus};
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::order_card::OrderList;
use crate::state::app::AppContext;
use crate::state::orders::merge_order;
use crate::util::auth::{allowed_signal, install_guard};
use crate::util::route;
use crate::util::storage::{self, StorageKey};

const ANY_ROLE: &[Role] = &Role::ALL;

#[component]
pub fn OrdersPage(ctx: AppContext) -> impl IntoView {
    install_guard(ctx, ANY_ROLE, use_navigate());
    let allowed = allowed_signal(ctx, ANY_ROLE);
    let redirect = route::redirect_signal();

    let current = RwSignal::new(Vec::<Order>::new());
    let history = RwSignal::new(Vec::<Order>::new());
    let busy = RwSignal::new(false);
    let loading = RwSignal::new(true);
    // Set when a checkout was interrupted before the insert answered.
    let interrupted = RwSignal::new(false);

    Effect::new(move |done: Option<bool>| {
        if done == Some(true) || !allowed.get() {
            return done.unwrap_or(false);
        }
        interrupted.set(storage::load_json::<NewOrder>(StorageKey::PendingOrder).is_some());
        let (Some(role), Some(user_id)) = (ctx.role(), ctx.user_id()) else { return false };
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).orders_for(role, &user_id).await
            }
            .await;
            match result {
                Ok(list) => {
                    let (past, open): (Vec<Order>, Vec<Order>) = list.into_iter().partition(|o| o.status.is_terminal());
                    current.set(open);
                    history.set(past);
                }
                Err(e) => ctx.error(e.humanize()),
            }
            loading.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (role, user_id);
        }
        true
    });

    let on_action = Callback::new(move |(order_id, status): (String, OrderStatus)| {
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).update_order_status(&order_id, status).await
            }
            .await;
            match result {
                Ok(order) if order.status.is_terminal() => {
                    current.update(|list| list.retain(|o| o.id != order.id));
                    history.update(|list| merge_order(list, order));
                }
                Ok(order) => current.update(|list| merge_order(list, order)),
                Err(e) => ctx.error(e.humanize()),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (order_id, status);
        }
    });

    let on_chat = Callback::new(move |order: Order| {
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).conversation_for_order(&order).await
            }
            .await;
            match result {
                Ok(conversation) => redirect.set(Some(route::chat_path(&conversation.id))),
                Err(e) => ctx.error(e.humanize()),
            }
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (order, redirect);
        }
    });

    let dismiss = move |_| {
        storage::remove(StorageKey::PendingOrder);
        interrupted.set(false);
    };

    view! {
        <main class="orders">
            <Show when=move || allowed.get() fallback=|| view! { <p class="loading">"Loading…"</p> }>
                <h1>"Orders"</h1>
                <Show when=move || interrupted.get()>
                    <div class="notice notice--warning" role="status">
                        <p>"Your last checkout was interrupted. Check the list below before ordering again."</p>
                        <button class="btn btn--ghost" on:click=dismiss>"Dismiss"</button>
                    </div>
                </Show>
                <Show when=move || !loading.get() fallback=|| view! { <p class="loading">"Loading orders…"</p> }>
                    {move || {
                        let role = ctx.role().unwrap_or(Role::Customer);
                        let user_id = ctx.user_id().unwrap_or_default();
                        view! {
                            <h2>"In progress"</h2>
                            <OrderList
                                role=role
                                user_id=user_id.clone()
                                orders=current
                                busy=busy
                                on_action=on_action
                                on_chat=on_chat
                            />
                            <h2>"Past orders"</h2>
                            <OrderList
                                role=role
                                user_id=user_id
                                orders=history
                                busy=busy
                                on_action=on_action
                                on_chat=on_chat
                            />
                        }
                    }}
                </Show>
            </Show>
        </main>
    }
}
