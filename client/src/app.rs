//! Root application component with routing and the shared context.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::{nav_bar::NavBar, toast_host::ToastHost};
use crate::pages::{
    chat::ChatPage,
    checkout::CheckoutPage,
    dashboard::DashboardPage,
    forgot_password::ForgotPasswordPage,
    landing::LandingPage,
    login::LoginPage,
    market::{MarketPage, VendorMenuPage},
    orders::OrdersPage,
    profile::ProfilePage,
    signup::{CustomerSignupPage, RiderSignupPage, VendorSignupPage},
};
use crate::state::app::AppContext;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Creates the shared [`AppContext`] and reads stored session, cart, and
/// theme once the browser has hydrated.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let ctx = AppContext::init();
    // Effects only run in the browser, after hydration.
    Effect::new(move |_| ctx.load());
    on_cleanup(move || ctx.teardown());

    view! {
        <Stylesheet id="leptos" href="/pkg/foodhub.css"/>
        <Title text="FoodHub"/>

        <Router>
            <NavBar ctx=ctx/>
            <ToastHost ctx=ctx/>
            <Routes fallback=|| view! { <main class="not-found">"Page not found."</main> }>
                <Route path=StaticSegment("") view=move || view! { <LandingPage ctx=ctx/> }/>
                <Route path=StaticSegment("login") view=move || view! { <LoginPage ctx=ctx/> }/>
                <Route path=StaticSegment("signup") view=move || view! { <CustomerSignupPage ctx=ctx/> }/>
                <Route
                    path=(StaticSegment("vendor"), StaticSegment("signup"))
                    view=move || view! { <VendorSignupPage ctx=ctx/> }
                />
                <Route
                    path=(StaticSegment("rider"), StaticSegment("signup"))
                    view=move || view! { <RiderSignupPage ctx=ctx/> }
                />
                <Route path=StaticSegment("forgot-password") view=move || view! { <ForgotPasswordPage ctx=ctx/> }/>
                <Route path=StaticSegment("dashboard") view=move || view! { <DashboardPage ctx=ctx/> }/>
                <Route path=StaticSegment("market") view=move || view! { <MarketPage ctx=ctx/> }/>
                <Route
                    path=(StaticSegment("market"), ParamSegment("vendor_id"))
                    view=move || view! { <VendorMenuPage ctx=ctx/> }
                />
                <Route path=StaticSegment("checkout") view=move || view! { <CheckoutPage ctx=ctx/> }/>
                <Route path=StaticSegment("orders") view=move || view! { <OrdersPage ctx=ctx/> }/>
                <Route path=StaticSegment("profile") view=move || view! { <ProfilePage ctx=ctx/> }/>
                <Route path=(StaticSegment("chat"), ParamSegment("id")) view=move || view! { <ChatPage ctx=ctx/> }/>
            </Routes>
        </Router>
    }
}
