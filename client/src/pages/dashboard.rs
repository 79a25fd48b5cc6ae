//! Dashboards for vendors, riders, and admins.
//!
//! SYSTEM CONTEXT
//! ==============
//! `/dashboard` is the home route for every non-customer role. The page
//! guards on role and renders the matching panel. Vendor online status and
//! rider availability use optimistic toggles: the switch flips at once,
//! stays disabled until the write settles, and flips back on failure.

use backend::Role;
use backend::rows::{Order, OrderStatus, ReviewStatus, RiderProfile, VendorProfile};
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::order_card::OrderList;
use crate::state::app::AppContext;
use crate::state::optimistic::OptimisticToggle;
use crate::state::orders::{active, merge_order, review_notice};
use crate::util::auth::{allowed_signal, install_guard};
use crate::util::format;

const DASHBOARD_ROLES: &[Role] = &[Role::Vendor, Role::Rider, Role::Admin];

#[component]
pub fn DashboardPage(ctx: AppContext) -> impl IntoView {
    install_guard(ctx, DASHBOARD_ROLES, use_navigate());
    let allowed = allowed_signal(ctx, DASHBOARD_ROLES);

    view! {
        <main class="dashboard">
            <Show when=move || allowed.get() fallback=|| view! { <p class="loading">"Loading…"</p> }>
                {move || match ctx.role() {
                    Some(Role::Vendor) => view! { <VendorDashboard ctx=ctx/> }.into_any(),
                    Some(Role::Rider) => view! { <RiderDashboard ctx=ctx/> }.into_any(),
                    _ => view! { <AdminDashboard ctx=ctx/> }.into_any(),
                }}
            </Show>
        </main>
    }
}

/// Banner for accounts not yet approved.
#[component]
fn ReviewBanner(#[prop(into)] status: Signal<Option<ReviewStatus>>) -> impl IntoView {
    move || {
        status.get().and_then(review_notice).map(|notice| {
            view! { <p class="notice notice--warning" role="status">{notice}</p> }
        })
    }
}

#[component]
fn ToggleSwitch(
    label: &'static str,
    toggle: RwSignal<OptimisticToggle>,
    #[prop(into)] enabled: Signal<bool>,
    on_toggle: Callback<()>,
) -> impl IntoView {
    view! {
        <label class="switch" class:switch--pending=move || toggle.get().is_pending()>
            <input
                type="checkbox"
                role="switch"
                prop:checked=move || toggle.get().value()
                disabled=move || !enabled.get() || toggle.get().is_pending()
                on:change=move |_| on_toggle.run(())
            />
            <span class="switch__label">{label}</span>
        </label>
    }
}

/// Shared "change this order's status" action.
fn order_action(ctx: AppContext, orders: RwSignal<Vec<Order>>, busy: RwSignal<bool>) -> Callback<(String, OrderStatus)> {
    Callback::new(move |(order_id, status): (String, OrderStatus)| {
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
                Ok(order) => {
                    orders.update(|list| merge_order(list, order));
                    ctx.success(format!("Order marked {}", status.label().to_lowercase()));
                }
                Err(e) => ctx.error(e.humanize()),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (ctx, orders, order_id, status);
        }
    })
}

// =============================================================================
// VENDOR
// =============================================================================

#[component]
fn VendorDashboard(ctx: AppContext) -> impl IntoView {
    let vendor = RwSignal::new(None::<VendorProfile>);
    let online = RwSignal::new(OptimisticToggle::default());
    let orders = RwSignal::new(Vec::<Order>::new());
    let busy = RwSignal::new(false);
    let user_id = ctx.user_id().unwrap_or_default();

    #[cfg(feature = "hydrate")]
    {
        let user_id = user_id.clone();
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                let repo = backend::repo::Repo::new(&client, session.as_ref());
                let row = repo.vendor(&user_id).await?;
                let list = repo.orders_for(Role::Vendor, &user_id).await?;
                Ok::<_, backend::AppError>((row, list))
            }
            .await;
            match result {
                Ok((row, list)) => {
                    online.update(|t| t.sync(row.as_ref().is_some_and(|v| v.is_online)));
                    vendor.set(row);
                    orders.set(active(&list));
                }
                Err(e) => ctx.error(e.humanize()),
            }
        });
    }

    let on_toggle = Callback::new(move |()| {
        let Some(Some(next)) = online.try_update(OptimisticToggle::begin) else { return };
        let Some(id) = vendor.with_untracked(|v| v.as_ref().map(|v| v.id.clone())) else {
            online.update(OptimisticToggle::revert);
            return;
        };
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).set_vendor_online(&id, next).await
            }
            .await;
            match result {
                Ok(row) => {
                    online.update(OptimisticToggle::settle);
                    vendor.set(Some(row));
                }
                Err(e) => {
                    online.update(OptimisticToggle::revert);
                    ctx.error(e.humanize());
                }
            }
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (id, next);
        }
    });

    let status = Signal::derive(move || vendor.with(|v| Some(v.as_ref().map_or(ReviewStatus::Draft, |v| v.status))));
    let approved = Signal::derive(move || status.get() == Some(ReviewStatus::Approved));
    let on_action = order_action(ctx, orders, busy);

    view! {
        <section class="dashboard__panel">
            <header class="dashboard__header">
                <h1>{move || vendor.with(|v| v.as_ref().map_or_else(|| "Your kitchen".to_owned(), |v| v.business_name.clone()))}</h1>
                <ToggleSwitch label="Open for orders" toggle=online enabled=approved on_toggle=on_toggle/>
            </header>
            <ReviewBanner status=status/>
            <h2>"Incoming orders"</h2>
            <OrderList role=Role::Vendor user_id=user_id orders=orders busy=busy on_action=on_action/>
        </section>
    }
}

// =============================================================================
// RIDER
// =============================================================================

#[component]
fn RiderDashboard(ctx: AppContext) -> impl IntoView {
    let rider = RwSignal::new(None::<RiderProfile>);
    let available = RwSignal::new(OptimisticToggle::default());
    let deliveries = RwSignal::new(Vec::<Order>::new());
    let open_orders = RwSignal::new(Vec::<Order>::new());
    let busy = RwSignal::new(false);
    let user_id = ctx.user_id().unwrap_or_default();

    #[cfg(feature = "hydrate")]
    {
        let user_id = user_id.clone();
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                let repo = backend::repo::Repo::new(&client, session.as_ref());
                let row = repo.rider(&user_id).await?;
                let mine = repo.orders_for(Role::Rider, &user_id).await?;
                let open = repo.unassigned_orders().await?;
                Ok::<_, backend::AppError>((row, mine, open))
            }
            .await;
            match result {
                Ok((row, mine, open)) => {
                    available.update(|t| t.sync(row.as_ref().is_some_and(|r| r.is_available)));
                    rider.set(row);
                    deliveries.set(active(&mine));
                    open_orders.set(open);
                }
                Err(e) => ctx.error(e.humanize()),
            }
        });
    }

    let on_toggle = Callback::new(move |()| {
        let Some(Some(next)) = available.try_update(OptimisticToggle::begin) else { return };
        let Some(id) = rider.with_untracked(|r| r.as_ref().map(|r| r.id.clone())) else {
            available.update(OptimisticToggle::revert);
            return;
        };
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).set_rider_available(&id, next).await
            }
            .await;
            match result {
                Ok(row) => {
                    available.update(OptimisticToggle::settle);
                    rider.set(Some(row));
                }
                Err(e) => {
                    available.update(OptimisticToggle::revert);
                    ctx.error(e.humanize());
                }
            }
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (id, next);
        }
    });

    let rider_id = user_id.clone();
    let on_claim = Callback::new(move |order_id: String| {
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        #[cfg(feature = "hydrate")]
        {
            let rider_id = rider_id.clone();
            leptos::task::spawn_local(async move {
                let session = ctx.session.get_untracked();
                let result = async {
                    let client = crate::net::api::client()?;
                    backend::repo::Repo::new(&client, session.as_ref()).assign_rider(&order_id, &rider_id).await
                }
                .await;
                match result {
                    Ok(order) => {
                        open_orders.update(|list| list.retain(|o| o.id != order.id));
                        deliveries.update(|list| merge_order(list, order));
                        ctx.success("Delivery accepted");
                    }
                    Err(e) => {
                        open_orders.update(|list| list.retain(|o| o.id != order_id));
                        ctx.error(e.humanize());
                    }
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (&rider_id, order_id);
        }
    });

    let status = Signal::derive(move || rider.with(|r| Some(r.as_ref().map_or(ReviewStatus::Draft, |r| r.status))));
    let approved = Signal::derive(move || status.get() == Some(ReviewStatus::Approved));
    let on_action = order_action(ctx, deliveries, busy);

    view! {
        <section class="dashboard__panel">
            <header class="dashboard__header">
                <h1>"Deliveries"</h1>
                <ToggleSwitch label="Available" toggle=available enabled=approved on_toggle=on_toggle/>
            </header>
            <ReviewBanner status=status/>
            <h2>"My deliveries"</h2>
            <OrderList role=Role::Rider user_id=user_id orders=deliveries busy=busy on_action=on_action/>
            <Show when=move || approved.get() && available.get().value()>
                <h2>"Ready for pickup"</h2>
                <ul class="pickup-list">
                    <For
                        each=move || open_orders.get()
                        key=|order| order.id.clone()
                        children=move |order| {
                            let order_id = order.id.clone();
                            view! {
                                <li class="pickup-list__item">
                                    <span>{order.delivery_address.clone()}</span>
                                    <span>{format::money(order.delivery_fee_cents)}</span>
                                    <button
                                        class="btn btn--primary"
                                        disabled=move || busy.get()
                                        on:click=move |_| on_claim.run(order_id.clone())
                                    >
                                        "Accept delivery"
                                    </button>
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
        </section>
    }
}

// =============================================================================
// ADMIN
// =============================================================================

#[component]
fn AdminDashboard(ctx: AppContext) -> impl IntoView {
    let pending = RwSignal::new(Vec::<VendorProfile>::new());
    let busy = RwSignal::new(false);

    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        let session = ctx.session.get_untracked();
        let result = async {
            let client = crate::net::api::client()?;
            backend::repo::Repo::new(&client, session.as_ref())
                .vendors_with_status(ReviewStatus::PendingReview)
                .await
        }
        .await;
        match result {
            Ok(list) => pending.set(list),
            Err(e) => ctx.error(e.humanize()),
        }
    });

    let on_review = Callback::new(move |(vendor_id, status): (String, ReviewStatus)| {
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let session = ctx.session.get_untracked();
            let result = async {
                let client = crate::net::api::client()?;
                backend::repo::Repo::new(&client, session.as_ref()).set_vendor_status(&vendor_id, status).await
            }
            .await;
            match result {
                Ok(vendor) => {
                    pending.update(|list| list.retain(|v| v.id != vendor.id));
                    ctx.success(format!("{} {}", vendor.business_name, status.label().to_lowercase()));
                }
                Err(e) => ctx.error(e.humanize()),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (vendor_id, status);
        }
    });

    view! {
        <section class="dashboard__panel">
            <h1>"Vendor applications"</h1>
            <Show when=move || pending.with(|p| !p.is_empty()) fallback=|| view! { <p>"No applications waiting."</p> }>
                <ul class="review-list">
                    <For
                        each=move || pending.get()
                        key=|vendor| vendor.id.clone()
                        children=move |vendor| {
                            let approve_id = vendor.id.clone();
                            let reject_id = vendor.id.clone();
                            view! {
                                <li class="review-list__item">
                                    <div>
                                        <strong>{vendor.business_name.clone()}</strong>
                                        <span class="muted">
                                            {vendor.cuisine.clone().unwrap_or_default()} " · "
                                            {vendor.city.clone().unwrap_or_default()}
                                        </span>
                                    </div>
                                    <button
                                        class="btn btn--primary"
                                        disabled=move || busy.get()
                                        on:click=move |_| on_review.run((approve_id.clone(), ReviewStatus::Approved))
                                    >
                                        "Approve"
                                    </button>
                                    <button
                                        class="btn btn--danger"
                                        disabled=move || busy.get()
                                        on:click=move |_| on_review.run((reject_id.clone(), ReviewStatus::Rejected))
                                    >
                                        "Reject"
                                    </button>
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
        </section>
    }
}
