//! Generic Form Component
//!
//! Lays configured fields out on the 12-column grid and drives submit and
//! reset through `FormState`. Validation failures stay inline; the submit
//! callback only ever sees valid values.

use std::future::Future;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::FormField;
use crate::error::AppResult;
use crate::forms::{check_fields, FieldConfig, FormModel, FormState, SubmitBlocked, GRID_CLASS};

#[component]
pub fn GenericForm<M>(
    state: RwSignal<FormState<M>>,
    #[prop(into)] fields: Signal<Vec<FieldConfig<M::Field>>>,
    /// Receives validated values; pair with `spawn_submit`
    on_submit: Callback<M>,
    #[prop(into, optional)] is_loading: MaybeProp<bool>,
    #[prop(into, optional)] submit_text: MaybeProp<String>,
    #[prop(optional)] show_reset: bool,
    #[prop(optional)] on_cancel: Option<Callback<()>>,
    #[prop(into, optional)] cancel_text: MaybeProp<String>,
) -> impl IntoView
where
    M: FormModel,
{
    let external_loading = move || is_loading.get().unwrap_or(false);
    let busy = move || state.with(|s| s.is_submitting()) || external_loading();

    Effect::new(move |_| {
        if let Err(e) = fields.with(|f| check_fields(f)) {
            log::warn!("Form configuration problem: {}", e);
        }
    });

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let loading = external_loading();
        match state.try_update(|s| s.begin_submit(loading)) {
            Some(Ok(values)) => on_submit.run(values),
            Some(Err(SubmitBlocked::Invalid)) => log::debug!("Submit blocked: form has errors"),
            Some(Err(SubmitBlocked::Busy)) => log::debug!("Submit ignored: already submitting"),
            None => {}
        }
    };

    view! {
        <form class="generic-form" novalidate=true on:submit=submit>
            <div class=GRID_CLASS>
                {move || {
                    fields
                        .get()
                        .into_iter()
                        .map(|config| {
                            let class = config.layout.grid_class();
                            view! {
                                <div class=class>
                                    <FormField state=state config=config disabled=Signal::derive(busy) />
                                </div>
                            }
                        })
                        .collect_view()
                }}
            </div>
            <div class="form-actions">
                {show_reset.then(|| view! {
                    <button
                        type="button"
                        class="btn btn-ghost"
                        disabled=busy
                        on:click=move |_| state.update(|s| s.reset())
                    >
                        "Reset"
                    </button>
                })}
                {on_cancel.map(|cancel| view! {
                    <button type="button" class="btn btn-secondary" on:click=move |_| cancel.run(())>
                        {move || cancel_text.get().unwrap_or_else(|| "Cancel".to_string())}
                    </button>
                })}
                <button type="submit" class="btn btn-primary" disabled=busy>
                    {move || {
                        if busy() {
                            "Saving...".to_string()
                        } else {
                            submit_text.get().unwrap_or_else(|| "Submit".to_string())
                        }
                    }}
                </button>
            </div>
        </form>
    }
}

/// Run a submit future, then clear the submitting flag whatever happened.
/// Errors are logged and leave the form as it was.
pub fn spawn_submit<M, Fut>(state: RwSignal<FormState<M>>, work: Fut, on_success: impl FnOnce() + 'static)
where
    M: FormModel,
    Fut: Future<Output = AppResult<()>> + 'static,
{
    spawn_local(async move {
        let result = work.await;
        let _ = state.try_update(|s| s.finish_submit());
        match result {
            Ok(()) => on_success(),
            Err(e) => log::error!("Form submit failed: {}", e),
        }
    });
}
