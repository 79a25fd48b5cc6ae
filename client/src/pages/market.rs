//! Vendor directory and per-vendor menus.
//!
//! `/market` lists approved vendors with a search box; signed-in customers
//! can heart vendors (optimistic) and filter to favourites.
//! `/market/:vendor_id` shows the menu and feeds the cart. Adding an item
//! from a second vendor asks before replacing the cart.

#[cfg(test)]
#[path = "market_test.rs"]
mod market_test;

use std::collections::{HashMap, HashSet};

use backend::rows::{MenuItem, VendorProfile};
use backend::{Bucket, Role};
use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

use crate::net::api::public_image;
use crate::state::app::AppContext;
use crate::state::cart::{AddOutcome, Cart};
use crate::state::optimistic::OptimisticToggle;
use crate::util::{format, route};

/// Vendors matching `query` (name, cuisine, or city), favourites first.
pub fn filter_vendors(
    vendors: &[VendorProfile],
    query: &str,
    favorites_only: bool,
    favorites: &HashSet<String>,
) -> Vec<VendorProfile> {
    let needle = query.trim().to_lowercase();
    let matches = |v: &VendorProfile| {
        needle.is_empty()
            || [Some(&v.business_name), v.cuisine.as_ref(), v.city.as_ref()]
                .into_iter()
                .flatten()
                .any(|s| s.to_lowercase().contains(&needle))
    };
    let mut out: Vec<VendorProfile> = vendors
        .iter()
        .filter(|v| matches(v) && (!favorites_only || favorites.contains(&v.id)))
        .cloned()
        .collect();
    out.sort_by_key(|v| !favorites.contains(&v.id));
    out
}

/// Menu items grouped by category in first-seen order; uncategorised last.
pub fn group_menu(items: &[MenuItem]) -> Vec<(String, Vec<MenuItem>)> {
    let mut groups: Vec<(String, Vec<MenuItem>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut other = Vec::new();
    for item in items {
        match item.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(category) => {
                let slot = *index.entry(category.to_owned()).or_insert_with(|| {
                    groups.push((category.to_owned(), Vec::new()));
                    groups.len() - 1
                });
                groups[slot].1.push(item.clone());
            }
            None => other.push(item.clone()),
        }
    }
    if !other.is_empty() {
        groups.push(("More".to_owned(), other));
    }
    groups
}

// =============================================================================
// DIRECTORY
// =============================================================================

#[component]
pub fn MarketPage(ctx: AppContext) -> impl IntoView {
    let vendors = RwSignal::new(Vec::<VendorProfile>::new());
    let favorites = RwSignal::new(HashMap::<String, OptimisticToggle>::new());
    let loading = RwSignal::new(true);
    let query = RwSignal::new(String::new());
    let favorites_only = RwSignal::new(false);
    let is_customer = Memo::new(move |_| ctx.role() == Some(Role::Customer));

    Effect::new(move |_| {
        if !ctx.ready.get() {
            return;
        }
        let user_id = ctx.user_id().filter(|_| ctx.role() == Some(Role::Customer));
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                let repo = backend::repo::Repo::new(&client, session.as_ref());
                let list = repo.approved_vendors().await?;
                let liked = match &user_id {
                    Some(id) => repo.favorites(id).await?,
                    None => Vec::new(),
                };
                Ok::<_, backend::AppError>((list, liked))
            }
            .await;
            match result {
                Ok((list, liked)) => {
                    vendors.set(list);
                    favorites.set(liked.into_iter().map(|f| (f.vendor_id, OptimisticToggle::new(true))).collect());
                }
                Err(e) => ctx.error(e.humanize()),
            }
            loading.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = user_id;
        }
    });

    let on_favorite = Callback::new(move |vendor_id: String| {
        let Some(user_id) = ctx.user_id() else { return };
        let next = favorites
            .try_update(|map| map.entry(vendor_id.clone()).or_default().begin())
            .flatten();
        let Some(liked) = next else { return };
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).set_favorite(&user_id, &vendor_id, liked).await
            }
            .await;
            favorites.update(|map| {
                if let Some(toggle) = map.get_mut(&vendor_id) {
                    if result.is_ok() { toggle.settle() } else { toggle.revert() }
                }
            });
            if let Err(e) = result {
                ctx.error(e.humanize());
            }
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (user_id, liked);
        }
    });

    let visible = Memo::new(move |_| {
        let liked: HashSet<String> =
            favorites.with(|map| map.iter().filter(|(_, t)| t.value()).map(|(id, _)| id.clone()).collect());
        vendors.with(|list| filter_vendors(list, &query.get(), favorites_only.get(), &liked))
    });

    view! {
        <main class="market">
            <header class="market__header">
                <h1>"Order from local kitchens"</h1>
                <input
                    class="input market__search"
                    type="search"
                    placeholder="Search by name, cuisine, or city"
                    prop:value=move || query.get()
                    on:input=move |ev| query.set(event_target_value(&ev))
                />
                <Show when=move || is_customer.get()>
                    <label class="checkbox">
                        <input
                            type="checkbox"
                            prop:checked=move || favorites_only.get()
                            on:change=move |ev| favorites_only.set(event_target_checked(&ev))
                        />
                        "Favourites only"
                    </label>
                </Show>
            </header>
            <Show when=move || !loading.get() fallback=|| view! { <p class="loading">"Loading vendors…"</p> }>
                <Show
                    when=move || visible.with(|v| !v.is_empty())
                    fallback=|| view! { <p class="muted">"No vendors match your search."</p> }
                >
                    <ul class="vendor-grid">
                        <For
                            each=move || visible.get()
                            key=|vendor| vendor.id.clone()
                            children=move |vendor| {
                                let id = vendor.id.clone();
                                let heart_id = vendor.id.clone();
                                let toggle = Signal::derive(move || favorites.with(|m| m.get(&id).copied().unwrap_or_default()));
                                view! {
                                    <li class="vendor-card" class:vendor-card--closed=!vendor.is_online>
                                        <A href=route::vendor_path(&vendor.id) attr:class="vendor-card__link">
                                            {public_image(Bucket::Avatars, vendor.logo_url.as_deref())
                                                .map(|src| view! { <img class="vendor-card__logo" src=src alt=""/> })}
                                            <h2>{vendor.business_name.clone()}</h2>
                                            <p class="muted">
                                                {vendor.cuisine.clone().unwrap_or_default()} " · "
                                                {vendor.city.clone().unwrap_or_default()}
                                            </p>
                                            <p class="vendor-card__meta">
                                                {if vendor.is_online { "Open" } else { "Closed" }} " · Delivery "
                                                {format::money(vendor.delivery_fee_cents)}
                                            </p>
                                        </A>
                                        <Show when=move || is_customer.get()>
                                            {
                                                let heart_id = heart_id.clone();
                                                view! {
                                                    <button
                                                        class="vendor-card__heart"
                                                        class:vendor-card__heart--on=move || toggle.get().value()
                                                        aria-pressed=move || toggle.get().value().to_string()
                                                        aria-label="Favourite"
                                                        disabled=move || toggle.get().is_pending()
                                                        on:click=move |_| on_favorite.run(heart_id.clone())
                                                    >
                                                        "♥"
                                                    </button>
                                                }
                                            }
                                        </Show>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </Show>
            </Show>
        </main>
    }
}

// =============================================================================
// MENU
// =============================================================================

#[component]
pub fn VendorMenuPage(ctx: AppContext) -> impl IntoView {
    let params = use_params_map();
    let vendor_id = Memo::new(move |_| params.read().get("vendor_id").unwrap_or_default());
    let vendor = RwSignal::new(None::<VendorProfile>);
    let items = RwSignal::new(Vec::<MenuItem>::new());
    let loading = RwSignal::new(true);
    // Item waiting on "replace your cart?" confirmation.
    let conflict = RwSignal::new(None::<(MenuItem, String)>);

    Effect::new(move |_| {
        let id = vendor_id.get();
        loading.set(true);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                let repo = backend::repo::Repo::new(&client, session.as_ref());
                let row = repo.vendor(&id).await?;
                let menu = repo.menu(&id).await?;
                Ok::<_, backend::AppError>((row, menu))
            }
            .await;
            match result {
                Ok((row, menu)) => {
                    vendor.set(row);
                    items.set(menu);
                }
                Err(e) => ctx.error(e.humanize()),
            }
            loading.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = id;
        }
    });

    let can_order = Memo::new(move |_| {
        ctx.role() == Some(Role::Customer) && vendor.with(|v| v.as_ref().is_some_and(|v| v.is_online))
    });

    let on_add = Callback::new(move |item: MenuItem| {
        let Some(current_vendor) = vendor.get_untracked() else { return };
        let mut outcome = AddOutcome::Unavailable;
        ctx.update_cart(|cart| outcome = cart.add(&current_vendor, &item));
        match outcome {
            AddOutcome::Added => ctx.success(format!("Added {}", item.name)),
            AddOutcome::OtherVendor { current } => conflict.set(Some((item, current))),
            AddOutcome::Unavailable => ctx.error(format!("{} is not available right now", item.name)),
        }
    });

    let on_replace = move |_| {
        let Some((item, _)) = conflict.get_untracked() else { return };
        let Some(current_vendor) = vendor.get_untracked() else { return };
        ctx.update_cart(|cart| {
            cart.replace_with(&current_vendor, &item);
        });
        conflict.set(None);
        ctx.success(format!("Started a new order with {}", item.name));
    };

    view! {
        <main class="menu">
            <Show when=move || !loading.get() fallback=|| view! { <p class="loading">"Loading menu…"</p> }>
                {move || match vendor.get() {
                    None => view! { <p class="muted">"This vendor is not available."</p> }.into_any(),
                    Some(v) => view! {
                        <header class="menu__header">
                            <h1>{v.business_name.clone()}</h1>
                            <p class="muted">{v.description.clone().unwrap_or_default()}</p>
                            <p>
                                {if v.is_online { "Open now" } else { "Closed" }} " · Delivery "
                                {format::money(v.delivery_fee_cents)}
                            </p>
                        </header>
                    }
                    .into_any(),
                }}
                {move || conflict.get().map(|(_, current)| view! {
                    <div class="notice notice--warning" role="alertdialog">
                        <p>{format!("Your cart has items from {current}. Start a new order instead?")}</p>
                        <button class="btn btn--primary" on:click=on_replace>"Start new order"</button>
                        <button class="btn btn--ghost" on:click=move |_| conflict.set(None)>"Keep cart"</button>
                    </div>
                })}
                {move || {
                    group_menu(&items.get())
                        .into_iter()
                        .map(|(category, list)| {
                            view! {
                                <section class="menu__section">
                                    <h2>{category}</h2>
                                    <ul class="menu__items">
                                        {list
                                            .into_iter()
                                            .map(|item| {
                                                let quantity = {
                                                    let id = item.id.clone();
                                                    move || ctx.cart.with(|c| c.quantity_of(&id))
                                                };
                                                let available = item.is_available;
                                                let add_item = item.clone();
                                                view! {
                                                    <li class="menu-item" class:menu-item--sold-out=!item.is_available>
                                                        {public_image(Bucket::MenuImages, item.image_url.as_deref())
                                                            .map(|src| view! { <img class="menu-item__image" src=src alt=""/> })}
                                                        <div class="menu-item__body">
                                                            <h3>{item.name.clone()}</h3>
                                                            <p class="muted">{item.description.clone().unwrap_or_default()}</p>
                                                            <span class="menu-item__price">{format::money(item.price_cents)}</span>
                                                        </div>
                                                        <button
                                                            class="btn btn--primary"
                                                            disabled=move || !can_order.get() || !available
                                                            on:click=move |_| on_add.run(add_item.clone())
                                                        >
                                                            {move || quantity().map_or_else(|| "Add".to_owned(), |q| format!("Add ({q})"))}
                                                        </button>
                                                    </li>
                                                }
                                            })
                                            .collect_view()}
                                    </ul>
                                </section>
                            }
                        })
                        .collect_view()
                }}
                <Show when=move || ctx.role().is_none()>
                    <p class="muted">
                        <A href=route::login_path(Role::Customer)>"Sign in"</A>
                        " to order."
                    </p>
                </Show>
                <Show when=move || ctx.cart.with(|c| !c.is_empty()) && ctx.role() == Some(Role::Customer)>
                    <A href="/checkout" attr:class="btn btn--primary menu__checkout">
                        {move || format!("Checkout · {}", format::money(ctx.cart.with(Cart::total_cents)))}
                    </A>
                </Show>
            </Show>
        </main>
    }
}
