//! Product List Page
//!
//! Product table with create/edit dialog, inline delete and a low-stock
//! counter. The supplier select is filled from the active suppliers.

use futures::FutureExt;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::{DataTable, DeleteConfirmButton, DialogState, GenericFormDialog};
use crate::context::use_app_context;
use crate::entities::product::{self, ProductForm};
use crate::hooks;
use crate::models::{Product, Supplier};
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn ProductList() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let (products, set_products) = signal(Vec::<Product>::new());
    let (active_suppliers, set_active_suppliers) = signal(Vec::<Supplier>::new());
    let (low_stock, set_low_stock) = signal(0usize);
    let (loading, set_loading) = signal(true);
    let (saving, set_saving) = signal(false);
    let dialog = RwSignal::new(DialogState::<Product>::Closed);

    // Reload whenever the query cache changes
    Effect::new(move |_| {
        let _ = store.cache_version().get();
        if !store.is_authenticated().get_untracked() {
            return;
        }
        let services = ctx.services();
        spawn_local(async move {
            match hooks::products::list(&services).await {
                Ok(loaded) => set_products.set(loaded),
                Err(e) => log::error!("Failed to load products: {}", e),
            }
            set_loading.set(false);
            match hooks::suppliers::active(&services).await {
                Ok(loaded) => set_active_suppliers.set(loaded),
                Err(e) => log::error!("Failed to load active suppliers: {}", e),
            }
            match hooks::products::low_stock(&services).await {
                Ok(loaded) => set_low_stock.set(loaded.len()),
                Err(e) => log::warn!("Failed to load low-stock products: {}", e),
            }
        });
    });

    let columns = product::columns(move |p: &Product| {
        let edit_target = p.clone();
        let id = p.id;
        let delete = Callback::new(move |_: ()| {
            let services = ctx.services();
            spawn_local(async move {
                // Failures are toasted by the hook
                let _ = hooks::products::delete(&services, id).await;
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
                <DeleteConfirmButton button_class="btn btn-danger" label="Delete" on_confirm=delete />
            </div>
        }
        .into_any()
    });

    let on_submit = move |values: ProductForm| {
        let services = ctx.services();
        let editing = dialog.with_untracked(|d| d.editing().map(|p| p.id));
        let input = values.to_input();
        set_saving.set(true);
        async move {
            let result = match editing {
                Some(id) => hooks::products::update(&services, id, &input).await.map(|_| ()),
                None => hooks::products::create(&services, &input).await.map(|_| ()),
            };
            set_saving.set(false);
            result
        }
        .boxed_local()
    };

    view! {
        <section class="page">
            <header class="page-header">
                <h1>"Products"</h1>
                <Show when=move || { low_stock.get() > 0 }>
                    <span class="badge badge-warning">
                        {move || format!("{} low on stock", low_stock.get())}
                    </span>
                </Show>
            </header>

            <DataTable
                columns=columns
                page_size=ctx.page_size()
                rows=products
                filter_placeholder="Filter products..."
                loading=loading
                toolbar=move || view! {
                    <button class="btn btn-primary" on:click=move |_| dialog.update(|d| d.open_create())>
                        "Add product"
                    </button>
                }
            />

            <GenericFormDialog
                open=Signal::derive(move || dialog.with(|d| d.is_open()))
                on_close=Callback::new(move |_| dialog.update(|d| d.close()))
                title=Signal::derive(move || {
                    let title = if dialog.with(|d| d.is_editing()) { "Edit product" } else { "New product" };
                    title.to_string()
                })
                defaults=Signal::derive(move || {
                    dialog.with(|d| d.editing().map(ProductForm::from).unwrap_or_default())
                })
                fields=Signal::derive(move || active_suppliers.with(|s| product::form_fields(s)))
                on_submit=on_submit
                is_loading=saving
                submit_text=Signal::derive(move || {
                    let text = if dialog.with(|d| d.is_editing()) { "Save changes" } else { "Create product" };
                    text.to_string()
                })
            />
        </section>
    }
}
