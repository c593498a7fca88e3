//! Login Page Component
//!
//! Sign-in and registration forms shown while no user is authenticated.

use leptos::prelude::*;

use crate::components::{spawn_submit, GenericForm};
use crate::context::use_app_context;
use crate::entities::account::{login_fields, register_fields, LoginForm, RegisterForm};
use crate::forms::FormState;
use crate::hooks;
use crate::services::push_history;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let (registering, set_registering) = signal(false);
    let login_state = RwSignal::new(FormState::new(LoginForm::default()));
    let register_state = RwSignal::new(FormState::new(RegisterForm::default()));
    let is_loading = Signal::derive(move || store.is_loading().get());

    let on_login = Callback::new(move |values: LoginForm| {
        let services = ctx.services();
        let request = values.to_request();
        let home = ctx.home_path();
        spawn_submit(
            login_state,
            async move { hooks::auth::login(&services, &request).await.map(|_| ()) },
            move || push_history(&home),
        );
    });

    let on_register = Callback::new(move |values: RegisterForm| {
        let services = ctx.services();
        let request = values.to_request();
        let home = ctx.home_path();
        spawn_submit(
            register_state,
            async move { hooks::auth::register(&services, &request).await.map(|_| ()) },
            move || push_history(&home),
        );
    });

    view! {
        <div class="login-page">
            <div class="login-card">
                <Show
                    when=move || registering.get()
                    fallback=move || view! {
                        <h1 class="login-title">"Sign in"</h1>
                        <p class="login-subtitle">"Use your inventory account"</p>
                        <GenericForm
                            state=login_state
                            fields=login_fields()
                            on_submit=on_login
                            is_loading=is_loading
                            submit_text="Sign in"
                        />
                    }
                >
                    <h1 class="login-title">"Create an account"</h1>
                    <GenericForm
                        state=register_state
                        fields=register_fields()
                        on_submit=on_register
                        is_loading=is_loading
                        submit_text="Register"
                    />
                </Show>
                <button class="btn btn-link" on:click=move |_| set_registering.update(|r| *r = !*r)>
                    {move || {
                        if registering.get() {
                            "Already have an account? Sign in"
                        } else {
                            "No account yet? Register"
                        }
                    }}
                </button>
            </div>
        </div>
    }
}
