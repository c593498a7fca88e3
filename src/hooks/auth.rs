//! Auth flows: login, registration, logout, profile

use crate::api::auth as endpoints;
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, AuthTokens, LoginRequest, RegisterRequest, User, UserPatch};
use crate::query::{QueryKey, Resource, Scope};
use crate::services::Services;

use super::{report_failure, success_message};

pub mod keys {
    use super::*;

    pub fn profile() -> QueryKey {
        QueryKey::new(Resource::Auth, Scope::Profile)
    }
}

fn start_session(services: &Services, response: AuthResponse, fallback: &str) -> User {
    let AuthResponse { message, user, access, refresh } = response;
    services.session.set_auth(user.clone(), AuthTokens { access, refresh });
    services.queries.set_query_data(keys::profile(), &user);
    services.notifier.success(success_message(&message, fallback));
    user
}

pub async fn login(services: &Services, credentials: &LoginRequest) -> AppResult<User> {
    services.session.set_loading(true);
    match endpoints::login(&services.api, credentials).await {
        Ok(response) => Ok(start_session(services, response, "Login successful")),
        Err(e) => {
            services.session.set_loading(false);
            report_failure(services, "Login", &e, "Login failed");
            Err(e)
        }
    }
}

pub async fn register(services: &Services, data: &RegisterRequest) -> AppResult<User> {
    services.session.set_loading(true);
    match endpoints::register(&services.api, data).await {
        Ok(response) => Ok(start_session(services, response, "Registration successful")),
        Err(e) => {
            services.session.set_loading(false);
            report_failure(services, "Registration", &e, "Registration failed");
            Err(e)
        }
    }
}

/// Ends the session locally no matter what the server says
pub async fn logout(services: &Services) {
    if let Some(refresh) = services.session.persisted_refresh_token() {
        if let Err(e) = endpoints::logout(&services.api, &refresh).await {
            log::warn!("Server-side logout failed, clearing local session anyway: {}", e);
        }
    }
    services.session.clear();
    services.queries.clear();
    services.notifier.success("Logged out successfully");
}

pub async fn update_profile(services: &Services, patch: &UserPatch) -> AppResult<User> {
    match endpoints::update_profile(&services.api, patch).await {
        Ok(response) => {
            services.session.update_user(&response.user);
            let user = services.session.user().ok_or_else(|| {
                AppError::Storage("profile updated after the session ended".to_string())
            })?;
            services.queries.set_query_data(keys::profile(), &user);
            services
                .notifier
                .success(success_message(&response.message, "Profile updated successfully"));
            Ok(user)
        }
        Err(e) => {
            report_failure(services, "Profile update", &e, "Failed to update profile");
            Err(e)
        }
    }
}

/// Explicit refresh; the API client also does this on its own after a 401
pub async fn refresh_token(services: &Services) -> AppResult<()> {
    let refresh = services
        .session
        .persisted_refresh_token()
        .ok_or(AppError::MissingRefreshToken)?;
    let response = endpoints::refresh_token(&services.api, &refresh).await?;
    services.session.set_access_token(response.access);
    Ok(())
}

/// Current user's profile; only fetched while authenticated
pub async fn profile(services: &Services) -> AppResult<Option<User>> {
    if !services.session.is_authenticated() {
        return Ok(None);
    }
    let api = services.api.clone();
    services
        .queries
        .fetch(keys::profile(), move || {
            let api = api.clone();
            async move { endpoints::get_profile(&api).await }
        })
        .await
        .map(Some)
}

/// Restored sessions get a fresh access token and the server's copy of the user
pub async fn resume_session(services: &Services) -> AppResult<()> {
    if !services.session.is_authenticated() {
        return Ok(());
    }
    refresh_token(services).await?;
    if let Some(user) = profile(services).await? {
        services.session.update_user(&UserPatch::from(&user));
    }
    log::info!("Resumed session");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::json_reply;
    use crate::api::Method;
    use crate::hooks::suppliers;
    use crate::notify::ToastKind;
    use crate::services::testing::services_with;
    use serde_json::json;

    fn user_json() -> serde_json::Value {
        json!({
            "id": 1,
            "username": "admin",
            "email": "admin@example.com",
            "first_name": "Ada",
            "last_name": "Lovelace"
        })
    }

    fn credentials() -> LoginRequest {
        LoginRequest { email: "admin@example.com".to_string(), password: "secret1".to_string() }
    }

    #[tokio::test]
    async fn test_login_starts_session_and_seeds_profile() {
        let (services, transport, _) = services_with(|req| match req.path.as_str() {
            "/auth/login/" => json_reply(
                200,
                json!({ "message": "Welcome back", "user": user_json(), "access": "a1", "refresh": "r1" }),
            ),
            _ => json_reply(404, json!({})),
        });

        let user = login(&services, &credentials()).await.unwrap();
        assert_eq!(user.username, "admin");
        let snapshot = services.session.snapshot();
        assert!(snapshot.is_authenticated);
        assert!(!snapshot.is_loading);
        assert_eq!(services.session.persisted_access_token().as_deref(), Some("a1"));

        // Profile comes from the cache, not the network
        let cached = profile(&services).await.unwrap().unwrap();
        assert_eq!(cached.email, "admin@example.com");
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(services.notifier.toasts()[0].message, "Welcome back");
    }

    #[tokio::test]
    async fn test_login_failure_resets_loading() {
        let (services, _, _) =
            services_with(|_| json_reply(400, json!({ "non_field_errors": ["Invalid credentials"] })));

        let result = login(&services, &credentials()).await;
        assert!(result.is_err());
        let snapshot = services.session.snapshot();
        assert!(!snapshot.is_authenticated);
        assert!(!snapshot.is_loading);
        let toast = services.notifier.toasts().pop().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Invalid credentials");
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let (services, transport, _) = services_with(|req| match (req.method, req.path.as_str()) {
            (Method::Post, "/auth/login/") => json_reply(
                200,
                json!({ "user": user_json(), "access": "a1", "refresh": "r1" }),
            ),
            (Method::Get, "/suppliers/") => json_reply(200, json!({ "results": [] })),
            _ => json_reply(500, json!({ "detail": "Server error" })),
        });

        login(&services, &credentials()).await.unwrap();
        suppliers::list(&services).await.unwrap();
        logout(&services).await;

        assert!(!services.session.is_authenticated());
        assert_eq!(services.session.persisted_refresh_token(), None);
        assert!(!services.queries.contains(&suppliers::keys::list()));
        assert!(!services.queries.contains(&keys::profile()));
        assert_eq!(transport.count("/auth/logout/"), 1);
    }

    #[tokio::test]
    async fn test_update_profile_merges_partial_user() {
        let (services, _, _) = services_with(|req| match req.path.as_str() {
            "/auth/login/" => json_reply(200, json!({ "user": user_json(), "access": "a1", "refresh": "r1" })),
            "/auth/profile/" => json_reply(
                200,
                json!({ "message": "Profile updated", "user": { "last_name": "Byron" } }),
            ),
            _ => json_reply(404, json!({})),
        });

        login(&services, &credentials()).await.unwrap();
        let patch = UserPatch { last_name: Some("Byron".to_string()), ..Default::default() };
        let user = update_profile(&services, &patch).await.unwrap();

        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name, "Byron");
        assert_eq!(services.session.user().unwrap().last_name, "Byron");
        let cached: User = services.queries.get_query_data(&keys::profile()).unwrap();
        assert_eq!(cached.last_name, "Byron");
    }

    #[tokio::test]
    async fn test_expired_session_redirects_to_login() {
        let (services, _, visited) = services_with(|req| match req.path.as_str() {
            "/auth/login/" => json_reply(200, json!({ "user": user_json(), "access": "a1", "refresh": "r1" })),
            "/auth/token/refresh/" => json_reply(401, json!({ "detail": "Token is blacklisted" })),
            _ => json_reply(401, json!({ "detail": "Token expired" })),
        });

        login(&services, &credentials()).await.unwrap();
        let result = suppliers::list(&services).await;

        assert_eq!(result, Err(AppError::Unauthorized("Token expired".to_string())));
        assert!(!services.session.is_authenticated());
        assert_eq!(visited.borrow().as_slice(), ["/login".to_string()]);
        assert!(!services.queries.contains(&keys::profile()));
    }

    #[tokio::test]
    async fn test_profile_skipped_when_logged_out() {
        let (services, transport, _) = services_with(|_| json_reply(200, user_json()));
        assert_eq!(profile(&services).await.unwrap(), None);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_register_starts_session_and_seeds_profile() {
        let (services, transport, _) = services_with(|req| match (req.method, req.path.as_str()) {
            (Method::Post, "/auth/register/") => {
                let body = req.body.clone().unwrap_or_default();
                assert_eq!(body["password_confirm"], "secret1");
                json_reply(201, json!({ "user": user_json(), "access": "a1", "refresh": "r1" }))
            }
            _ => json_reply(404, json!({})),
        });

        let data = RegisterRequest {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "secret1".to_string(),
            password_confirm: "secret1".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
        };
        let user = register(&services, &data).await.unwrap();

        assert_eq!(user.first_name, "Ada");
        assert!(services.session.is_authenticated());
        assert!(!services.session.snapshot().is_loading);
        assert_eq!(services.session.persisted_refresh_token().as_deref(), Some("r1"));
        assert_eq!(profile(&services).await.unwrap(), Some(user));
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(services.notifier.toasts()[0].message, "Registration successful");
    }

    #[tokio::test]
    async fn test_refresh_token_replaces_only_access() {
        let (services, transport, _) = services_with(|req| match req.path.as_str() {
            "/auth/login/" => json_reply(200, json!({ "user": user_json(), "access": "a1", "refresh": "r1" })),
            "/auth/token/refresh/" => json_reply(200, json!({ "access": "a2" })),
            _ => json_reply(404, json!({})),
        });

        login(&services, &credentials()).await.unwrap();
        let before = services.session.user();
        refresh_token(&services).await.unwrap();

        assert_eq!(services.session.persisted_access_token().as_deref(), Some("a2"));
        assert_eq!(services.session.persisted_refresh_token().as_deref(), Some("r1"));
        assert_eq!(services.session.user(), before);
        assert!(services.session.is_authenticated());
        let sent = transport.requests();
        assert_eq!(sent[1].body.as_ref().unwrap()["refresh"], "r1");
    }

    #[tokio::test]
    async fn test_refresh_without_token_fails() {
        let (services, transport, visited) = services_with(|_| json_reply(200, json!({ "access": "a2" })));

        assert_eq!(refresh_token(&services).await, Err(AppError::MissingRefreshToken));
        assert!(transport.requests().is_empty());
        assert!(visited.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_resume_session_refreshes_and_reloads_profile() {
        let (services, transport, _) = services_with(|req| match req.path.as_str() {
            "/auth/login/" => json_reply(200, json!({ "user": user_json(), "access": "a1", "refresh": "r1" })),
            "/auth/token/refresh/" => json_reply(200, json!({ "access": "a2" })),
            "/auth/profile/" => {
                assert_eq!(req.bearer.as_deref(), Some("a2"));
                let mut renamed = user_json();
                renamed["first_name"] = json!("Augusta");
                json_reply(200, renamed)
            }
            _ => json_reply(404, json!({})),
        });

        login(&services, &credentials()).await.unwrap();
        // A page reload starts with an empty cache
        services.queries.clear();
        resume_session(&services).await.unwrap();

        assert_eq!(services.session.user().unwrap().first_name, "Augusta");
        assert_eq!(transport.count("/auth/token/refresh/"), 1);
        assert_eq!(transport.count("/auth/profile/"), 1);
    }

    #[tokio::test]
    async fn test_resume_session_noop_when_logged_out() {
        let (services, transport, _) = services_with(|_| json_reply(200, json!({ "access": "a2" })));
        resume_session(&services).await.unwrap();
        assert!(transport.requests().is_empty());
    }
}
