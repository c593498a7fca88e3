//! Form Field Component
//!
//! Renders one configured field: label, the control for its kind,
//! description and inline error.

use leptos::prelude::*;

use crate::forms::{parse_number, FieldConfig, FieldKind, FieldValue, FormModel, FormState};

#[component]
pub fn FormField<M>(
    state: RwSignal<FormState<M>>,
    config: FieldConfig<M::Field>,
    #[prop(into)] disabled: Signal<bool>,
) -> impl IntoView
where
    M: FormModel,
{
    let name = config.name;
    let field_id = format!("field-{:?}", name).to_lowercase();
    let disabled = move || disabled.get() || config.disabled;
    let text = move || state.with(|s| s.value(name).as_text());
    let set_text = move |raw: String| state.update(|s| s.set(name, FieldValue::Text(raw)));
    let error = move || state.with(|s| s.error(name).map(str::to_string));
    let invalid = move || error().is_some();
    let placeholder = config.placeholder.clone().unwrap_or_default();

    let control = match config.kind.clone() {
        FieldKind::Text | FieldKind::Email | FieldKind::Password | FieldKind::Phone => view! {
            <input
                id=field_id.clone()
                class="form-input"
                type=config.kind.input_type()
                placeholder=placeholder
                aria-invalid=move || invalid().to_string()
                disabled=disabled
                prop:value=text
                on:input=move |ev| set_text(event_target_value(&ev))
            />
        }
        .into_any(),
        FieldKind::TextArea { rows } => view! {
            <textarea
                id=field_id.clone()
                class="form-input"
                rows=rows.to_string()
                placeholder=placeholder
                aria-invalid=move || invalid().to_string()
                disabled=disabled
                prop:value=text
                on:input=move |ev| set_text(event_target_value(&ev))
            />
        }
        .into_any(),
        FieldKind::Number { step } => view! {
            <input
                id=field_id.clone()
                class="form-input"
                type="number"
                step=step.map(|s| s.to_string())
                placeholder=placeholder
                aria-invalid=move || invalid().to_string()
                disabled=disabled
                prop:value=text
                on:input=move |ev| {
                    let number = parse_number(&event_target_value(&ev));
                    state.update(|s| s.set(name, FieldValue::Number(number)));
                }
            />
        }
        .into_any(),
        FieldKind::Select(options) => {
            let empty = options.is_empty();
            view! {
                <select
                    id=field_id.clone()
                    class="form-select"
                    aria-invalid=move || invalid().to_string()
                    disabled=move || empty || disabled()
                    prop:value=text
                    on:change=move |ev| set_text(event_target_value(&ev))
                >
                    <option value="">{placeholder}</option>
                    {options
                        .into_iter()
                        .map(|option| view! { <option value=option.value>{option.label}</option> })
                        .collect_view()}
                </select>
            }
            .into_any()
        }
        FieldKind::Toggle => view! {
            <label class="form-toggle">
                <input
                    id=field_id.clone()
                    type="checkbox"
                    disabled=disabled
                    prop:checked=move || state.with(|s| s.value(name).as_bool())
                    on:change=move |ev| state.update(|s| s.set(name, FieldValue::Bool(event_target_checked(&ev))))
                />
                <span>{config.label.clone()}</span>
            </label>
        }
        .into_any(),
    };

    // Toggles carry their label inline
    let heading = (!matches!(config.kind, FieldKind::Toggle)).then(|| {
        let label = config.label.clone();
        let required = config.required;
        view! {
            <label class="form-label" for=field_id>
                {label}
                {required.then(|| view! { <span class="required">"*"</span> })}
            </label>
        }
    });

    view! {
        <div class="form-field">
            {heading}
            {control}
            {config.description.clone().map(|text| view! { <p class="form-description">{text}</p> })}
            <Show when=invalid>
                <p class="form-error">{error}</p>
            </Show>
        </div>
    }
}
