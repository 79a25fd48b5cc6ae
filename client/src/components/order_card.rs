//! Order summary with progress and the viewer's allowed status changes.

use backend::Role;
use backend::rows::{Order, OrderStatus};
use leptos::prelude::*;

use crate::state::orders::{action_label, actions_for};
use crate::util::format;

const PROGRESS_STEPS: usize = 5;

#[component]
pub fn OrderCard(
    order: Order,
    role: Role,
    user_id: String,
    #[prop(into)] busy: Signal<bool>,
    on_action: Callback<(String, OrderStatus)>,
    /// Open the order's conversation.
    #[prop(optional)]
    on_chat: Option<Callback<Order>>,
) -> impl IntoView {
    let actions = actions_for(role, &user_id, &order);
    let progress = order.status.progress_index();
    let status_class = format!("order-card__status order-card__status--{}", order.status.as_str());
    let short_id: String = order.id.chars().take(8).collect();
    let order_id = order.id.clone();
    let chat_order = order.clone();

    view! {
        <article class="order-card">
            <header class="order-card__header">
                <span class="order-card__id">"#" {short_id}</span>
                <span class=status_class>{order.status.label()}</span>
            </header>
            <progress class="order-card__progress" max=PROGRESS_STEPS value=progress></progress>
            <dl class="order-card__meta">
                <dt>"Placed"</dt>
                <dd>{format::date_time(order.created_at)}</dd>
                <dt>"Deliver to"</dt>
                <dd>{order.delivery_address.clone()}</dd>
                <dt>"Total"</dt>
                <dd>{format::money(order.total_cents)}</dd>
            </dl>
            {order.notes.clone().filter(|n| !n.trim().is_empty()).map(|n| view! { <p class="order-card__notes">{n}</p> })}
            <footer class="order-card__actions">
                {actions
                    .into_iter()
                    .map(|to| {
                        let order_id = order_id.clone();
                        let class = if to == OrderStatus::Cancelled { "btn btn--danger" } else { "btn btn--primary" };
                        view! {
                            <button
                                class=class
                                disabled=move || busy.get()
                                on:click=move |_| on_action.run((order_id.clone(), to))
                            >
                                {action_label(to)}
                            </button>
                        }
                    })
                    .collect_view()}
                {on_chat
                    .map(|on_chat| {
                        let chat_order = chat_order.clone();
                        view! {
                            <button class="btn btn--ghost" on:click=move |_| on_chat.run(chat_order.clone())>
                                "Message"
                            </button>
                        }
                    })}
            </footer>
        </article>
    }
}

/// Cards for a list of orders, or an empty-state line.
#[component]
pub fn OrderList(
    role: Role,
    user_id: String,
    orders: RwSignal<Vec<Order>>,
    busy: RwSignal<bool>,
    on_action: Callback<(String, OrderStatus)>,
    #[prop(optional)] on_chat: Option<Callback<Order>>,
) -> impl IntoView {
    view! {
        <Show when=move || orders.with(|o| !o.is_empty()) fallback=|| view! { <p class="muted">"No orders yet."</p> }>
            <div class="order-list">
                <For
                    each=move || orders.get()
                    key=|order| (order.id.clone(), order.status)
                    children={
                        let user_id = user_id.clone();
                        move |order| {
                            match on_chat {
                                Some(on_chat) => view! {
                                    <OrderCard order=order role=role user_id=user_id.clone() busy=busy on_action=on_action on_chat=on_chat/>
                                }
                                .into_any(),
                                None => view! {
                                    <OrderCard order=order role=role user_id=user_id.clone() busy=busy on_action=on_action/>
                                }
                                .into_any(),
                            }
                        }
                    }
                />
            </div>
        </Show>
    }
}
