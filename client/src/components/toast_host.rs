//! Fixed-position stack of transient notifications.

use leptos::prelude::*;

use crate::state::app::AppContext;

#[component]
pub fn ToastHost(ctx: AppContext) -> impl IntoView {
    view! {
        <div class="toast-host" role="status" aria-live="polite">
            <For
                each=move || ctx.toasts.with(|q| q.toasts().to_vec())
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div class=format!("toast {}", toast.kind.css_modifier())>
                            <span class="toast__message">{toast.message}</span>
                            <button
                                class="toast__close"
                                aria-label="Dismiss"
                                on:click=move |_| {
                                    ctx.toasts.update(|q| {
                                        q.dismiss(id);
                                    });
                                }
                            >
                                "×"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
