//! Toaster Component
//!
//! Renders the toast queue mirrored into the store. Each toast dismisses
//! itself after a few seconds or on click.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_app_context;
use crate::notify::ToastKind;
use crate::store::{use_app_store, AppStateStoreFields};

const TOAST_LIFETIME_MS: u32 = 4_000;

#[component]
pub fn Toaster() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    view! {
        <div class="toaster" aria-live="polite">
            <For
                each=move || store.toasts().get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    spawn_local(async move {
                        TimeoutFuture::new(TOAST_LIFETIME_MS).await;
                        ctx.dismiss_toast(id);
                    });
                    let class = match toast.kind {
                        ToastKind::Success => "toast toast-success",
                        ToastKind::Error => "toast toast-error",
                    };
                    view! {
                        <div class=class role="status" on:click=move |_| ctx.dismiss_toast(id)>
                            {toast.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
