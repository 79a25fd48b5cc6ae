//! Top navigation: role-specific links, cart badge, theme toggle, sign out.

#[cfg(test)]
#[path = "nav_bar_test.rs"]
mod nav_bar_test;

use backend::Role;
use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::state::app::AppContext;
use crate::state::cart::Cart;
use crate::util::theme::Theme;

/// `(label, href)` pairs for the signed-in role, or for guests.
pub fn nav_links(role: Option<Role>) -> Vec<(&'static str, &'static str)> {
    match role {
        None => vec![("Market", "/market"), ("Sign in", "/login"), ("Sign up", "/signup")],
        Some(Role::Customer) => vec![("Market", "/market"), ("Orders", "/orders"), ("Profile", "/profile")],
        Some(Role::Vendor | Role::Rider) => {
            vec![("Dashboard", "/dashboard"), ("Orders", "/orders"), ("Profile", "/profile")]
        }
        Some(Role::Admin) => vec![("Dashboard", "/dashboard"), ("Orders", "/orders")],
    }
}

#[component]
pub fn NavBar(ctx: AppContext) -> impl IntoView {
    let navigate = use_navigate();
    let role = Signal::derive(move || ctx.role());
    let cart_count = move || ctx.cart.with(Cart::item_count);
    let show_cart = move || role.get() == Some(Role::Customer) && cart_count() > 0;

    let on_sign_out = move |_| {
        let session = ctx.session.get_untracked();
        ctx.sign_out();
        navigate("/", leptos_router::NavigateOptions::default());
        #[cfg(feature = "hydrate")]
        if let Some(session) = session {
            leptos::task::spawn_local(async move {
                use backend::Backend;
                if let Ok(client) = crate::net::api::client() {
                    if let Err(e) = client.sign_out(&session).await {
                        leptos::logging::warn!("remote sign-out failed: {e}");
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = session;
        }
    };

    view! {
        <header class="nav-bar">
            <A href="/" attr:class="nav-bar__brand">"FoodHub"</A>
            <nav class="nav-bar__links">
                {move || {
                    nav_links(role.get())
                        .into_iter()
                        .map(|(label, href)| view! { <A href=href attr:class="nav-bar__link">{label}</A> })
                        .collect_view()
                }}
                <Show when=show_cart>
                    <A href="/checkout" attr:class="nav-bar__link nav-bar__cart">
                        "Cart "
                        <span class="badge">{cart_count}</span>
                    </A>
                </Show>
            </nav>
            <div class="nav-bar__actions">
                <button class="btn btn--ghost" on:click=move |_| ctx.toggle_theme()>
                    {move || if ctx.theme.get() == Theme::Dark { "Light mode" } else { "Dark mode" }}
                </button>
                <button class="btn btn--ghost" hidden=move || role.get().is_none() on:click=on_sign_out>
                    "Sign out"
                </button>
            </div>
        </header>
    }
}
