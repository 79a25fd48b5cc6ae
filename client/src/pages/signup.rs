//! Registration pages: customer signup, vendor onboarding, rider registration.
//!
//! Each page owns its `Wizard` signal and decides where a finished flow
//! lands. The wizard mechanics live in `components::wizard_view`.

#[cfg(test)]
#[path = "signup_test.rs"]
mod signup_test;

use backend::Session;
use leptos::prelude::*;
use wizard::{CustomerSignup, Flow, RiderRegistration, VendorOnboarding, Wizard};

use crate::components::wizard_view::WizardScreen;
use crate::state::app::AppContext;
use crate::util::route;
use crate::util::storage::{self, StorageKey};

/// Vendor id to remember while onboarding is unfinished, `None` to forget it.
pub fn temporary_vendor_id<F: Flow>(wizard: &Wizard<F>) -> Option<String> {
    if wizard.is_done() {
        return None;
    }
    wizard.draft().user_id().map(str::to_owned)
}

/// Sign in with the session the flow obtained and go to `path`.
fn finish<F: Flow + Send + Sync + 'static>(
    ctx: AppContext,
    wizard: RwSignal<Wizard<F>>,
    redirect: RwSignal<Option<String>>,
    path: &'static str,
    message: &'static str,
) {
    let session: Option<Session> = wizard.with_untracked(|w| w.draft().session().cloned());
    if let Some(session) = session {
        ctx.sign_in(session);
    }
    ctx.success(message);
    redirect.set(Some(path.to_owned()));
}

#[component]
pub fn CustomerSignupPage(ctx: AppContext) -> impl IntoView {
    let wizard = RwSignal::new(Wizard::new(CustomerSignup));
    let redirect = route::redirect_signal();

    let on_done = Callback::new(move |()| finish(ctx, wizard, redirect, "/market", "Welcome to FoodHub!"));

    view! {
        <main class="signup-page" data-role="customer">
            <WizardScreen ctx=ctx wizard=wizard title="Create your account" on_done=on_done/>
        </main>
    }
}

#[component]
pub fn VendorSignupPage(ctx: AppContext) -> impl IntoView {
    let wizard = RwSignal::new(Wizard::new(VendorOnboarding));
    let redirect = route::redirect_signal();

    Effect::new(move || match wizard.with(temporary_vendor_id) {
        Some(id) => storage::save_json(StorageKey::TemporaryVendorId, &id),
        None => {
            if wizard.with(Wizard::is_done) {
                storage::remove(StorageKey::TemporaryVendorId);
            }
        }
    });

    let on_done = Callback::new(move |()| {
        finish(ctx, wizard, redirect, "/dashboard", "Application submitted. We will review it shortly.");
    });

    view! {
        <main class="signup-page" data-role="vendor">
            <WizardScreen ctx=ctx wizard=wizard title="Open your kitchen on FoodHub" on_done=on_done/>
        </main>
    }
}

#[component]
pub fn RiderSignupPage(ctx: AppContext) -> impl IntoView {
    let wizard = RwSignal::new(Wizard::new(RiderRegistration));
    let redirect = route::redirect_signal();

    let on_done = Callback::new(move |()| {
        finish(ctx, wizard, redirect, "/dashboard", "Application submitted. We will review it shortly.");
    });

    view! {
        <main class="signup-page" data-role="rider">
            <WizardScreen ctx=ctx wizard=wizard title="Ride with FoodHub" on_done=on_done/>
        </main>
    }
}
