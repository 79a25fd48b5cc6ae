//! Public landing page with an entry point per portal.

use backend::Role;
use leptos::prelude::*;
use leptos_router::components::A;

use crate::state::app::AppContext;
use crate::util::route;

fn pitch(role: Role) -> &'static str {
    match role {
        Role::Customer => "Order from kitchens near you and track delivery live.",
        Role::Vendor => "List your menu, take orders, and grow your kitchen.",
        Role::Rider => "Deliver on your schedule and get paid weekly.",
        Role::Admin => "Review applications and keep the marketplace running.",
    }
}

#[component]
pub fn LandingPage(ctx: AppContext) -> impl IntoView {
    let signed_in_home = move || ctx.role().map(Role::home_path);

    view! {
        <main class="landing">
            <section class="landing__hero">
                <h1>"FoodHub"</h1>
                <p class="landing__tagline">"Local food, delivered."</p>
                {move || {
                    signed_in_home()
                        .map(|home| {
                            view! { <A href=home attr:class="btn btn--primary">"Continue"</A> }
                        })
                }}
            </section>
            <section class="landing__portals">
                {Role::ALL
                    .into_iter()
                    .map(|role| {
                        let signup = route::signup_path(role);
                        view! {
                            <article class="portal-card" data-role=role.as_str()>
                                <h2>{role.display_name()}</h2>
                                <p>{pitch(role)}</p>
                                <div class="portal-card__actions">
                                    <A href=route::login_path(role) attr:class="btn btn--ghost">"Sign in"</A>
                                    {signup
                                        .map(|href| {
                                            view! { <A href=href attr:class="btn btn--primary">"Get started"</A> }
                                        })}
                                </div>
                            </article>
                        }
                    })
                    .collect_view()}
            </section>
        </main>
    }
}
