//! Cart review and order placement.
//!
//! The pending order is written to storage before the insert and cleared
//! after it, so a reload mid-request leaves a trace the orders page can
//! warn about instead of silently double-ordering.

#[cfg(test)]
#[path = "checkout_test.rs"]
mod checkout_test;

use backend::Role;
use backend::rows::NewOrder;
use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::state::app::AppContext;
use crate::state::cart::Cart;
use crate::util::auth::{allowed_signal, install_guard};
use crate::util::{format, route};

const CUSTOMER_ONLY: &[Role] = &[Role::Customer];

/// Build the order, or say what is missing.
///
/// # Errors
///
/// A user-facing message when the cart is empty or the address is blank.
pub fn prepare_order(cart: &Cart, customer_id: &str, address: &str, notes: &str) -> Result<NewOrder, &'static str> {
    if address.trim().is_empty() {
        return Err("Enter a delivery address");
    }
    cart.to_order(customer_id, address, notes).ok_or("Your cart is empty")
}

#[component]
pub fn CheckoutPage(ctx: AppContext) -> impl IntoView {
    install_guard(ctx, CUSTOMER_ONLY, use_navigate());
    let allowed = allowed_signal(ctx, CUSTOMER_ONLY);
    let redirect = route::redirect_signal();

    let address = RwSignal::new(String::new());
    let notes = RwSignal::new(String::new());
    let error = RwSignal::new(None::<&'static str>);
    let placing = RwSignal::new(false);

    // Prefill the address once from the profile.
    Effect::new(move |done: Option<bool>| {
        if done == Some(true) || !allowed.get() {
            return done.unwrap_or(false);
        }
        let Some(user_id) = ctx.user_id() else { return false };
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).profile(&user_id).await
            }
            .await;
            if let Ok(Some(profile)) = result {
                if address.get_untracked().is_empty() {
                    address.set(profile.address.unwrap_or_default());
                }
            }
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = user_id;
        }
        true
    });

    let on_place = move |_| {
        if placing.get_untracked() {
            return;
        }
        let Some(user_id) = ctx.user_id() else { return };
        let order = match ctx.cart.with_untracked(|cart| {
            prepare_order(cart, &user_id, &address.get_untracked(), &notes.get_untracked())
        }) {
            Ok(order) => order,
            Err(message) => {
                error.set(Some(message));
                return;
            }
        };
        error.set(None);
        placing.set(true);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            use crate::util::storage::{self, StorageKey};

            storage::save_json(StorageKey::PendingOrder, &order);
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).place_order(&order).await
            }
            .await;
            storage::remove(StorageKey::PendingOrder);
            match result {
                Ok(_) => {
                    ctx.update_cart(Cart::clear);
                    ctx.success("Order placed");
                    redirect.set(Some("/orders".to_owned()));
                }
                Err(e) => ctx.error(e.humanize()),
            }
            placing.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (order, redirect);
        }
    };

    view! {
        <main class="checkout">
            <Show when=move || allowed.get() fallback=|| view! { <p class="loading">"Loading…"</p> }>
                <h1>"Checkout"</h1>
                <Show
                    when=move || ctx.cart.with(|c| !c.is_empty())
                    fallback=|| view! {
                        <p class="muted">"Your cart is empty. " <A href="/market">"Browse vendors"</A></p>
                    }
                >
                    <h2>{move || ctx.cart.with(|c| c.vendor_name.clone())}</h2>
                    <ul class="cart-lines">
                        <For
                            each=move || ctx.cart.with(|c| c.lines.clone())
                            key=|line| (line.menu_item_id.clone(), line.quantity)
                            children=move |line| {
                                let dec = line.menu_item_id.clone();
                                let inc = line.menu_item_id.clone();
                                view! {
                                    <li class="cart-line">
                                        <span class="cart-line__name">{line.name.clone()}</span>
                                        <span class="cart-line__qty">
                                            <button
                                                class="btn btn--ghost"
                                                aria-label="Remove one"
                                                on:click=move |_| ctx.update_cart(|c| c.decrement(&dec))
                                            >
                                                "−"
                                            </button>
                                            {line.quantity}
                                            <button
                                                class="btn btn--ghost"
                                                aria-label="Add one"
                                                on:click=move |_| ctx.update_cart(|c| c.increment(&inc))
                                            >
                                                "+"
                                            </button>
                                        </span>
                                        <span class="cart-line__total">{format::money(line.total_cents())}</span>
                                    </li>
                                }
                            }
                        />
                    </ul>
                    <dl class="checkout__totals">
                        <dt>"Subtotal"</dt>
                        <dd>{move || format::money(ctx.cart.with(Cart::subtotal_cents))}</dd>
                        <dt>"Delivery"</dt>
                        <dd>{move || format::money(ctx.cart.with(|c| c.delivery_fee_cents))}</dd>
                        <dt>"Total"</dt>
                        <dd class="checkout__total">{move || format::money(ctx.cart.with(Cart::total_cents))}</dd>
                    </dl>
                    <label class="field">
                        <span class="field__label">"Delivery address"</span>
                        <textarea
                            class="input"
                            prop:value=move || address.get()
                            on:input=move |ev| address.set(event_target_value(&ev))
                        ></textarea>
                    </label>
                    <label class="field">
                        <span class="field__label">"Notes for the kitchen (optional)"</span>
                        <input
                            class="input"
                            type="text"
                            prop:value=move || notes.get()
                            on:input=move |ev| notes.set(event_target_value(&ev))
                        />
                    </label>
                    {move || error.get().map(|e| view! { <p class="form-error" role="alert">{e}</p> })}
                    <button class="btn btn--primary" disabled=move || placing.get() on:click=on_place>
                        {move || if placing.get() { "Placing order…" } else { "Place order" }}
                    </button>
                </Show>
            </Show>
        </main>
    }
}
