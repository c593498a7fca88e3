//! Supplier List Page
//!
//! Supplier table with create/edit dialog and inline deactivation.

use futures::FutureExt;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::{DataTable, DeleteConfirmButton, DialogState, GenericFormDialog};
use crate::context::use_app_context;
use crate::entities::supplier::{self, SupplierForm};
use crate::hooks;
use crate::models::Supplier;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn SupplierList() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let (suppliers, set_suppliers) = signal(Vec::<Supplier>::new());
    let (loading, set_loading) = signal(true);
    let (saving, set_saving) = signal(false);
    let dialog = RwSignal::new(DialogState::<Supplier>::Closed);

    // Reload whenever the query cache changes
    Effect::new(move |_| {
        let _ = store.cache_version().get();
        if !store.is_authenticated().get_untracked() {
            return;
        }
        let services = ctx.services();
        spawn_local(async move {
            match hooks::suppliers::list(&services).await {
                Ok(loaded) => set_suppliers.set(loaded),
                Err(e) => log::error!("Failed to load suppliers: {}", e),
            }
            set_loading.set(false);
        });
    });

    let columns = supplier::columns(move |s: &Supplier| {
        let edit_target = s.clone();
        let id = s.id;
        let deactivate = Callback::new(move |_: ()| {
            let services = ctx.services();
            spawn_local(async move {
                // Failures are toasted by the hook
                let _ = hooks::suppliers::deactivate(&services, id).await;
            });
        });
        view! {
            <div class="row-actions">
                <button
                    class="btn btn-ghost"
                    on:click=move |_| dialog.update(|d| d.open_edit(edit_target.clone()))
                >
                    "Edit"
                </button>
                {s.is_active.then(|| view! {
                    <DeleteConfirmButton
                        button_class="btn btn-danger"
                        label="Deactivate"
                        on_confirm=deactivate
                    />
                })}
            </div>
        }
        .into_any()
    });

    let on_submit = move |values: SupplierForm| {
        let services = ctx.services();
        let editing = dialog.with_untracked(|d| d.editing().map(|s| s.id));
        let input = values.to_input();
        set_saving.set(true);
        async move {
            let result = match editing {
                Some(id) => hooks::suppliers::update(&services, id, &input).await.map(|_| ()),
                None => hooks::suppliers::create(&services, &input).await.map(|_| ()),
            };
            set_saving.set(false);
            result
        }
        .boxed_local()
    };

    view! {
        <section class="page">
            <header class="page-header">
                <h1>"Suppliers"</h1>
                <p class="page-subtitle">{move || format!("{} suppliers", suppliers.with(|s| s.len()))}</p>
            </header>

            <DataTable
                columns=columns
                page_size=ctx.page_size()
                rows=suppliers
                filter_placeholder="Filter suppliers..."
                loading=loading
                toolbar=move || view! {
                    <button class="btn btn-primary" on:click=move |_| dialog.update(|d| d.open_create())>
                        "Add supplier"
                    </button>
                }
            />

            <GenericFormDialog
                open=Signal::derive(move || dialog.with(|d| d.is_open()))
                on_close=Callback::new(move |_| dialog.update(|d| d.close()))
                title=Signal::derive(move || {
                    let title = if dialog.with(|d| d.is_editing()) { "Edit supplier" } else { "New supplier" };
                    title.to_string()
                })
                description="Contact details used on purchase orders"
                defaults=Signal::derive(move || {
                    dialog.with(|d| d.editing().map(SupplierForm::from).unwrap_or_default())
                })
                fields=supplier::form_fields()
                on_submit=on_submit
                is_loading=saving
                submit_text=Signal::derive(move || {
                    let text = if dialog.with(|d| d.is_editing()) { "Save changes" } else { "Create supplier" };
                    text.to_string()
                })
            />
        </section>
    }
}
