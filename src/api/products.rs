//! Product endpoints

use serde::de::IgnoredAny;

use super::ApiClient;
use crate::error::AppResult;
use crate::models::{Paginated, Product, ProductInput};

pub const PRODUCTS_PATH: &str = "/products/";
pub const LOW_STOCK_PATH: &str = "/products/low-stock/";

pub fn detail_path(id: u32) -> String {
    format!("/products/{}", id)
}

pub async fn get_all(api: &ApiClient) -> AppResult<Paginated<Product>> {
    api.get(PRODUCTS_PATH).await
}

pub async fn get_by_id(api: &ApiClient, id: u32) -> AppResult<Product> {
    api.get(&detail_path(id)).await
}

pub async fn get_low_stock(api: &ApiClient) -> AppResult<Vec<Product>> {
    api.get(LOW_STOCK_PATH).await
}

pub async fn create(api: &ApiClient, input: &ProductInput) -> AppResult<Product> {
    api.post(PRODUCTS_PATH, input).await
}

pub async fn update(api: &ApiClient, id: u32, input: &ProductInput) -> AppResult<Product> {
    api.patch(&detail_path(id), input).await
}

/// Success replies may be empty or carry a message; either way the body is skipped
pub async fn delete(api: &ApiClient, id: u32) -> AppResult<()> {
    let _: IgnoredAny = api.delete(&detail_path(id)).await?;
    Ok(())
}
