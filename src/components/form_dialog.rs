//! Form Dialog Component
//!
//! Modal wrapper around `GenericForm` with create/edit semantics. Opening
//! resets the form to the supplied defaults; closing always resets it.
//! A failed submit keeps the dialog open.

use futures::future::LocalBoxFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::GenericForm;
use crate::error::AppResult;
use crate::forms::{FieldConfig, FormModel, FormState};

/// Which dialog a list page has open
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DialogState<T> {
    #[default]
    Closed,
    Create,
    Edit(T),
}

impl<T> DialogState<T> {
    pub fn open_create(&mut self) {
        *self = DialogState::Create;
    }

    pub fn open_edit(&mut self, item: T) {
        *self = DialogState::Edit(item);
    }

    pub fn close(&mut self) {
        *self = DialogState::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::Closed)
    }

    pub fn editing(&self) -> Option<&T> {
        match self {
            DialogState::Edit(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing().is_some()
    }
}

// ========================
// Form transitions
// ========================

/// Form side of an open/close edge: opening loads fresh defaults, closing resets
pub fn sync_open<M: FormModel>(form: &mut FormState<M>, was_open: bool, is_open: bool, defaults: impl FnOnce() -> M) {
    match (was_open, is_open) {
        (false, true) => form.reset_to(defaults()),
        (true, false) => form.reset(),
        _ => {}
    }
}

/// Settle a finished submit. Returns whether the dialog should close;
/// on failure the entered values stay put.
pub fn settle_submit<M: FormModel>(form: &mut FormState<M>, outcome: &AppResult<()>) -> bool {
    form.finish_submit();
    match outcome {
        Ok(()) => {
            form.reset();
            true
        }
        Err(e) => {
            log::error!("Dialog submit failed: {}", e);
            false
        }
    }
}

#[component]
pub fn GenericFormDialog<M, H>(
    #[prop(into)] open: Signal<bool>,
    on_close: Callback<()>,
    #[prop(into)] title: Signal<String>,
    #[prop(into, optional)] description: MaybeProp<String>,
    /// Values loaded into the form each time the dialog opens
    #[prop(into)] defaults: Signal<M>,
    #[prop(into)] fields: Signal<Vec<FieldConfig<M::Field>>>,
    on_submit: H,
    #[prop(into, optional)] is_loading: MaybeProp<bool>,
    #[prop(into, optional)] submit_text: MaybeProp<String>,
) -> impl IntoView
where
    M: FormModel,
    H: Fn(M) -> LocalBoxFuture<'static, AppResult<()>> + 'static,
{
    let state = RwSignal::new(FormState::new(defaults.get_untracked()));
    let handler = StoredValue::new_local(on_submit);

    Effect::new(move |was_open: Option<bool>| {
        let is_open = open.get();
        let was_open = was_open.unwrap_or(false);
        if was_open != is_open {
            state.update(|s| sync_open(s, was_open, is_open, || defaults.get_untracked()));
        }
        is_open
    });

    let close = move || {
        state.update(|s| s.reset());
        on_close.run(());
    };

    let submit = Callback::new(move |values: M| {
        let work = handler.with_value(|h| h(values));
        spawn_local(async move {
            let outcome = work.await;
            if state.try_update(|s| settle_submit(s, &outcome)) == Some(true) {
                on_close.run(());
            }
        });
    });

    view! {
        <Show when=move || open.get()>
            <div class="dialog-backdrop" on:click=move |_| close()>
                <div
                    class="dialog"
                    role="dialog"
                    aria-modal="true"
                    on:click=|ev| ev.stop_propagation()
                >
                    <header class="dialog-header">
                        <h2 class="dialog-title">{move || title.get()}</h2>
                        {move || description.get().map(|text| view! { <p class="dialog-description">{text}</p> })}
                        <button class="dialog-close" aria-label="Close" on:click=move |_| close()>"×"</button>
                    </header>
                    <GenericForm
                        state=state
                        fields=fields
                        on_submit=submit
                        is_loading=is_loading
                        submit_text=submit_text
                        on_cancel=Callback::new(move |_| close())
                    />
                </div>
            </div>
        </Show>
    }
}
