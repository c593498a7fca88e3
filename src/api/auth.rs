//! Auth endpoints

use super::ApiClient;
use crate::error::AppResult;
use crate::models::{
    AuthResponse, LoginRequest, MessageResponse, ProfileUpdateResponse, RefreshRequest, RefreshResponse,
    RegisterRequest, User, UserPatch,
};

pub const LOGIN_PATH: &str = "/auth/login/";
pub const REGISTER_PATH: &str = "/auth/register/";
pub const LOGOUT_PATH: &str = "/auth/logout/";
pub const PROFILE_PATH: &str = "/auth/profile/";
pub const REFRESH_PATH: &str = "/auth/token/refresh/";

pub async fn login(api: &ApiClient, credentials: &LoginRequest) -> AppResult<AuthResponse> {
    api.post(LOGIN_PATH, credentials).await
}

pub async fn register(api: &ApiClient, data: &RegisterRequest) -> AppResult<AuthResponse> {
    api.post(REGISTER_PATH, data).await
}

/// Blacklist the refresh token server-side
pub async fn logout(api: &ApiClient, refresh: &str) -> AppResult<MessageResponse> {
    let response: Option<MessageResponse> =
        api.post(LOGOUT_PATH, &RefreshRequest { refresh: refresh.to_string() }).await?;
    Ok(response.unwrap_or_default())
}

pub async fn get_profile(api: &ApiClient) -> AppResult<User> {
    api.get(PROFILE_PATH).await
}

pub async fn update_profile(api: &ApiClient, patch: &UserPatch) -> AppResult<ProfileUpdateResponse> {
    api.put(PROFILE_PATH, patch).await
}

pub async fn refresh_token(api: &ApiClient, refresh: &str) -> AppResult<RefreshResponse> {
    api.post(REFRESH_PATH, &RefreshRequest { refresh: refresh.to_string() }).await
}
