//! Progress row above a wizard form.

use leptos::prelude::*;
use wizard::StepId;

/// One dot per input step; `Done` is not shown.
#[component]
pub fn StepIndicator(steps: &'static [StepId], #[prop(into)] cursor: Signal<usize>) -> impl IntoView {
    let input_steps = &steps[..steps.len().saturating_sub(1)];
    view! {
        <ol class="step-indicator">
            {input_steps
                .iter()
                .enumerate()
                .map(|(index, step)| {
                    let class = move || {
                        let current = cursor.get();
                        if index < current {
                            "step-indicator__step step-indicator__step--done"
                        } else if index == current {
                            "step-indicator__step step-indicator__step--active"
                        } else {
                            "step-indicator__step"
                        }
                    };
                    view! {
                        <li class=class>
                            <span class="step-indicator__index">{index + 1}</span>
                            <span class="step-indicator__title">{step.title()}</span>
                        </li>
                    }
                })
                .collect_view()}
        </ol>
    }
}
