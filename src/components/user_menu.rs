//! User Menu Component
//!
//! Signed-in user's name and email, profile editing, recent log lines
//! and logout.

use futures::FutureExt;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::GenericFormDialog;
use crate::context::use_app_context;
use crate::entities::account::{profile_fields, ProfileForm};
use crate::hooks;
use crate::services::push_history;
use crate::store::{use_app_store, AppStateStoreFields};

const ACTIVITY_LINES: usize = 20;

/// Newest `limit` lines, newest first
fn latest_first(mut lines: Vec<String>, limit: usize) -> Vec<String> {
    let skip = lines.len().saturating_sub(limit);
    lines.drain(..skip);
    lines.reverse();
    lines
}

#[component]
pub fn UserMenu() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let (menu_open, set_menu_open) = signal(false);
    let (editing, set_editing) = signal(false);
    let (saving, set_saving) = signal(false);
    let (activity, set_activity) = signal(None::<Vec<String>>);

    let display_name = move || store.user().with(|u| u.as_ref().map(|u| u.display_name()).unwrap_or_default());
    let email = move || store.user().with(|u| u.as_ref().map(|u| u.email.clone()).unwrap_or_default());

    let logout = move |_: web_sys::MouseEvent| {
        set_menu_open.set(false);
        let services = ctx.services();
        let login_path = ctx.login_path();
        spawn_local(async move {
            hooks::auth::logout(&services).await;
            push_history(&login_path);
        });
    };

    let on_submit = move |values: ProfileForm| {
        let services = ctx.services();
        let patch = values.to_patch();
        set_saving.set(true);
        async move {
            let result = hooks::auth::update_profile(&services, &patch).await.map(|_| ());
            set_saving.set(false);
            result
        }
        .boxed_local()
    };

    view! {
        <div class="user-menu">
            <button class="user-menu-trigger" on:click=move |_| set_menu_open.update(|o| *o = !*o)>
                {display_name}
            </button>
            <Show when=move || menu_open.get()>
                <div class="user-menu-panel">
                    <div class="user-menu-identity">
                        <strong>{display_name}</strong>
                        <span class="text-muted">{email}</span>
                    </div>
                    <button
                        class="btn btn-ghost"
                        on:click=move |_| {
                            set_menu_open.set(false);
                            set_editing.set(true);
                        }
                    >
                        "Edit profile"
                    </button>
                    <button
                        class="btn btn-ghost"
                        on:click=move |_| {
                            set_activity.update(|a| {
                                *a = match a {
                                    Some(_) => None,
                                    None => Some(latest_first(rolling_logger::recent_lines(), ACTIVITY_LINES)),
                                }
                            })
                        }
                    >
                        "Recent activity"
                    </button>
                    {move || activity.get().map(|lines| view! {
                        <ul class="user-menu-activity">
                            {lines.into_iter().map(|line| view! { <li class="text-muted">{line}</li> }).collect_view()}
                        </ul>
                    })}
                    <button class="btn btn-ghost" on:click=logout>"Log out"</button>
                </div>
            </Show>
            <GenericFormDialog
                open=editing
                on_close=Callback::new(move |_| set_editing.set(false))
                title="Edit profile"
                defaults=Signal::derive(move || store.user().with(|u| u.as_ref().map(ProfileForm::from).unwrap_or_default()))
                fields=profile_fields()
                on_submit=on_submit
                is_loading=saving
                submit_text="Save profile"
            />
        </div>
    }
}
