//! One labelled wizard input, rendered from its `FieldSpec`.

use backend::Attachment;
use leptos::prelude::*;

use crate::util::forms::{FieldSpec, InputKind, html_type};

#[component]
pub fn FieldInput(
    field: FieldSpec,
    #[prop(into)] value: Signal<String>,
    /// Inline error when this field failed validation.
    #[prop(into)]
    error: Signal<Option<String>>,
    #[prop(into)] disabled: Signal<bool>,
    on_input: Callback<String>,
    /// File inputs only: the selected file, read into memory.
    #[prop(optional)]
    on_attach: Option<Callback<Attachment>>,
) -> impl IntoView {
    let id = format!("field-{}", field.key);
    let class = move || if error.with(Option::is_some) { "field field--invalid" } else { "field" };

    let control = match field.kind {
        InputKind::TextArea => view! {
            <textarea
                id=id.clone()
                class="field__input"
                placeholder=field.placeholder
                disabled=move || disabled.get()
                prop:value=move || value.get()
                on:input=move |ev| on_input.run(event_target_value(&ev))
            ></textarea>
        }
        .into_any(),
        InputKind::Select(choices) => view! {
            <select
                id=id.clone()
                class="field__input"
                disabled=move || disabled.get()
                prop:value=move || value.get()
                on:change=move |ev| on_input.run(event_target_value(&ev))
            >
                <option value="">"Choose…"</option>
                {choices
                    .iter()
                    .map(|(v, label)| view! { <option value=*v>{*label}</option> })
                    .collect_view()}
            </select>
        }
        .into_any(),
        InputKind::Checkbox => view! {
            <input
                id=id.clone()
                class="field__checkbox"
                type="checkbox"
                disabled=move || disabled.get()
                prop:checked=move || value.get() == "true"
                on:change=move |ev| {
                    let checked = event_target_checked(&ev);
                    on_input.run(if checked { "true".to_owned() } else { String::new() });
                }
            />
        }
        .into_any(),
        InputKind::File { accept } => view! {
            <input
                id=id.clone()
                class="field__file"
                type="file"
                accept=accept
                disabled=move || disabled.get()
                on:change=move |ev| {
                    #[cfg(feature = "hydrate")]
                    {
                        let Some(file) = crate::net::api::selected_file(&ev) else { return };
                        let Some(on_attach) = on_attach else { return };
                        leptos::task::spawn_local(async move {
                            match crate::net::api::read_file(file).await {
                                Ok(attachment) => on_attach.run(attachment),
                                Err(e) => leptos::logging::warn!("file read failed: {e}"),
                            }
                        });
                    }
                    #[cfg(not(feature = "hydrate"))]
                    {
                        let _ = (ev, on_attach);
                    }
                }
            />
            <span class="field__file-name">{move || value.get()}</span>
        }
        .into_any(),
        kind => {
            let is_code = kind == InputKind::Code;
            view! {
                <input
                    id=id.clone()
                    class="field__input"
                    class:field__input--code=is_code
                    type=html_type(kind)
                    inputmode=if is_code { "numeric" } else { "text" }
                    maxlength=if is_code { Some("6") } else { None }
                    placeholder=field.placeholder
                    autocomplete=field.autocomplete
                    disabled=move || disabled.get()
                    prop:value=move || value.get()
                    on:input=move |ev| on_input.run(event_target_value(&ev))
                />
            }
            .into_any()
        }
    };

    view! {
        <div class=class>
            <label class="field__label" for=id>{field.label}</label>
            {control}
            <Show when=move || error.with(Option::is_some)>
                <p class="field__error">{move || error.get().unwrap_or_default()}</p>
            </Show>
        </div>
    }
}
