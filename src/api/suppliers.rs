//! Supplier endpoints
//!
//! Mutations answer with a `{ message, data }` envelope; the message is
//! what the console shows in its toast.

use super::ApiClient;
use crate::error::AppResult;
use crate::models::{MessageData, MessageResponse, Paginated, Supplier, SupplierInput, SupplierListParams};

pub const SUPPLIERS_PATH: &str = "/suppliers/";
pub const ACTIVE_PATH: &str = "/suppliers/active/";

/// Page size used when loading every active supplier for a select box
const ACTIVE_PAGE_SIZE: u32 = 1000;

pub fn detail_path(id: u32) -> String {
    format!("/suppliers/{}/", id)
}

pub async fn get_all(api: &ApiClient, params: &SupplierListParams) -> AppResult<Paginated<Supplier>> {
    api.get_with_query(SUPPLIERS_PATH, params.to_query()).await
}

pub async fn get_by_id(api: &ApiClient, id: u32) -> AppResult<Supplier> {
    api.get(&detail_path(id)).await
}

pub async fn get_active(api: &ApiClient) -> AppResult<Vec<Supplier>> {
    let query = vec![("page_size".to_string(), ACTIVE_PAGE_SIZE.to_string())];
    api.get_with_query(ACTIVE_PATH, query).await
}

pub async fn create(api: &ApiClient, input: &SupplierInput) -> AppResult<MessageData<Supplier>> {
    api.post(SUPPLIERS_PATH, input).await
}

pub async fn update(api: &ApiClient, id: u32, input: &SupplierInput) -> AppResult<MessageData<Supplier>> {
    api.patch(&detail_path(id), input).await
}

/// Soft delete: the server flips `is_active` to false
pub async fn deactivate(api: &ApiClient, id: u32) -> AppResult<MessageResponse> {
    let response: Option<MessageResponse> = api.delete(&detail_path(id)).await?;
    Ok(response.unwrap_or_default())
}
