//! Supplier queries and mutations

use crate::api::suppliers as endpoints;
use crate::error::AppResult;
use crate::models::{Supplier, SupplierInput, SupplierListParams};
use crate::query::{QueryKey, Resource, Scope};
use crate::services::Services;

use super::{report_failure, success_message};

pub mod keys {
    use super::*;

    pub fn list() -> QueryKey {
        QueryKey::new(Resource::Suppliers, Scope::List)
    }

    pub fn detail(id: u32) -> QueryKey {
        QueryKey::new(Resource::Suppliers, Scope::Detail(id))
    }

    pub fn active() -> QueryKey {
        QueryKey::new(Resource::Suppliers, Scope::Active)
    }

    pub fn search(term: &str) -> QueryKey {
        QueryKey::new(Resource::Suppliers, Scope::Search(term.to_string()))
    }
}

fn invalidate_collections(services: &Services) {
    services
        .queries
        .invalidate(|key| key.resource == Resource::Suppliers && key.is_collection());
}

// ========================
// Queries
// ========================

pub async fn list(services: &Services) -> AppResult<Vec<Supplier>> {
    let params = SupplierListParams {
        page_size: Some(services.config.supplier_page_size),
        ..Default::default()
    };
    fetch_page(services, keys::list(), params).await
}

/// Server-side name/email search; a blank term never hits the network
pub async fn search(services: &Services, term: &str) -> AppResult<Vec<Supplier>> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(Vec::new());
    }
    let params = SupplierListParams {
        page_size: Some(services.config.supplier_page_size),
        search: Some(term.to_string()),
        ..Default::default()
    };
    fetch_page(services, keys::search(term), params).await
}

async fn fetch_page(services: &Services, key: QueryKey, params: SupplierListParams) -> AppResult<Vec<Supplier>> {
    let api = services.api.clone();
    services
        .queries
        .fetch(key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { Ok(endpoints::get_all(&api, &params).await?.results) }
        })
        .await
}

/// Id 0 means "nothing selected" and is never fetched
pub async fn by_id(services: &Services, id: u32) -> AppResult<Option<Supplier>> {
    if id == 0 {
        return Ok(None);
    }
    let api = services.api.clone();
    services
        .queries
        .fetch(keys::detail(id), move || {
            let api = api.clone();
            async move { endpoints::get_by_id(&api, id).await }
        })
        .await
        .map(Some)
}

/// Active suppliers, used to fill supplier select boxes
pub async fn active(services: &Services) -> AppResult<Vec<Supplier>> {
    let api = services.api.clone();
    services
        .queries
        .fetch(keys::active(), move || {
            let api = api.clone();
            async move { endpoints::get_active(&api).await }
        })
        .await
}

// ========================
// Mutations
// ========================

pub async fn create(services: &Services, input: &SupplierInput) -> AppResult<Supplier> {
    match endpoints::create(&services.api, input).await {
        Ok(response) => {
            let supplier = response.data;
            services.queries.set_query_data(keys::detail(supplier.id), &supplier);
            invalidate_collections(services);
            services
                .notifier
                .success(success_message(&response.message, "Supplier created successfully"));
            Ok(supplier)
        }
        Err(e) => {
            report_failure(services, "Create supplier", &e, "Could not create supplier");
            Err(e)
        }
    }
}

pub async fn update(services: &Services, id: u32, input: &SupplierInput) -> AppResult<Supplier> {
    match endpoints::update(&services.api, id, input).await {
        Ok(response) => {
            let supplier = response.data;
            services.queries.set_query_data(keys::detail(id), &supplier);
            invalidate_collections(services);
            services
                .notifier
                .success(success_message(&response.message, "Supplier updated successfully"));
            Ok(supplier)
        }
        Err(e) => {
            report_failure(services, "Update supplier", &e, "Could not update supplier");
            Err(e)
        }
    }
}

/// Soft delete; the supplier stays readable with `is_active == false`
pub async fn deactivate(services: &Services, id: u32) -> AppResult<()> {
    match endpoints::deactivate(&services.api, id).await {
        Ok(response) => {
            let patched = services.queries.update_query_data(&keys::detail(id), |mut s: Supplier| {
                s.is_active = false;
                s
            });
            if !patched {
                // Seed the detail entry from the list when it was never opened
                let from_list = services
                    .queries
                    .get_query_data::<Vec<Supplier>>(&keys::list())
                    .and_then(|all| all.into_iter().find(|s| s.id == id));
                if let Some(mut supplier) = from_list {
                    supplier.is_active = false;
                    services.queries.set_query_data(keys::detail(id), &supplier);
                }
            }
            invalidate_collections(services);
            services
                .notifier
                .success(success_message(&response.message, "Supplier deactivated successfully"));
            Ok(())
        }
        Err(e) => {
            report_failure(services, "Deactivate supplier", &e, "Could not deactivate supplier");
            Err(e)
        }
    }
}
