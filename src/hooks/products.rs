//! Product queries and mutations

use crate::api::products as endpoints;
use crate::error::AppResult;
use crate::models::{Product, ProductInput};
use crate::query::{QueryKey, Resource, Scope};
use crate::services::Services;

use super::report_failure;

pub mod keys {
    use super::*;

    pub fn list() -> QueryKey {
        QueryKey::new(Resource::Products, Scope::List)
    }

    pub fn detail(id: u32) -> QueryKey {
        QueryKey::new(Resource::Products, Scope::Detail(id))
    }

    pub fn low_stock() -> QueryKey {
        QueryKey::new(Resource::Products, Scope::LowStock)
    }
}

fn invalidate_collections(services: &Services) {
    services
        .queries
        .invalidate(|key| key.resource == Resource::Products && key.is_collection());
}

pub async fn list(services: &Services) -> AppResult<Vec<Product>> {
    let api = services.api.clone();
    services
        .queries
        .fetch(keys::list(), move || {
            let api = api.clone();
            async move { Ok(endpoints::get_all(&api).await?.results) }
        })
        .await
}

pub async fn by_id(services: &Services, id: u32) -> AppResult<Option<Product>> {
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

pub async fn low_stock(services: &Services) -> AppResult<Vec<Product>> {
    let api = services.api.clone();
    services
        .queries
        .fetch(keys::low_stock(), move || {
            let api = api.clone();
            async move { endpoints::get_low_stock(&api).await }
        })
        .await
}

pub async fn create(services: &Services, input: &ProductInput) -> AppResult<Product> {
    match endpoints::create(&services.api, input).await {
        Ok(product) => {
            services.queries.set_query_data(keys::detail(product.id), &product);
            invalidate_collections(services);
            services.notifier.success("Product created successfully");
            Ok(product)
        }
        Err(e) => {
            report_failure(services, "Create product", &e, "Could not create product");
            Err(e)
        }
    }
}

pub async fn update(services: &Services, id: u32, input: &ProductInput) -> AppResult<Product> {
    match endpoints::update(&services.api, id, input).await {
        Ok(product) => {
            services.queries.set_query_data(keys::detail(id), &product);
            invalidate_collections(services);
            services.notifier.success("Product updated successfully");
            Ok(product)
        }
        Err(e) => {
            report_failure(services, "Update product", &e, "Could not update product");
            Err(e)
        }
    }
}

pub async fn delete(services: &Services, id: u32) -> AppResult<()> {
    match endpoints::delete(&services.api, id).await {
        Ok(()) => {
            let detail = keys::detail(id);
            services.queries.remove(|key| *key == detail);
            invalidate_collections(services);
            services.notifier.success("Product deleted successfully");
            Ok(())
        }
        Err(e) => {
            report_failure(services, "Delete product", &e, "Could not delete product");
            Err(e)
        }
    }
}
