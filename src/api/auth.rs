use crate::error::ApiResult;
use crate::http::{ApiRequest, HttpClient};
use crate::middleware::Transport;
use crate::models::{AuthResponse, SignInPayload, SignUpPayload};

use super::{MSG_SIGN_IN_FAILED, MSG_SIGN_UP_FAILED};

pub async fn sign_up(http: &HttpClient, payload: &SignUpPayload) -> ApiResult<AuthResponse> {
    let response = http
        .post_json("auth/sign-up", payload)
        .await?
        .ensure_success(Some(MSG_SIGN_UP_FAILED))?;
    let body: AuthResponse = response.json().unwrap_or_default();
    store_token(http, &body);
    Ok(body)
}

pub async fn sign_in(http: &HttpClient, payload: &SignInPayload) -> ApiResult<AuthResponse> {
    let response = http
        .post_json("auth/sign-in", payload)
        .await?
        .ensure_success(Some(MSG_SIGN_IN_FAILED))?;
    let body: AuthResponse = response.json().unwrap_or_default();
    store_token(http, &body);
    Ok(body)
}

/// Exchange the refresh cookie for a new access token outside of a retry.
/// Returns `false` (session untouched) when the server refuses.
pub async fn refresh(http: &HttpClient) -> ApiResult<bool> {
    match http.refresh().await? {
        Some(token) => {
            http.session().set_access_token(Some(token));
            tracing::info!("Access token refreshed");
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Tell the server to drop the refresh cookie, then clear the local
/// session whatever the server said.
pub async fn logout(http: &HttpClient) {
    match http.request(&ApiRequest::post("auth/logout")).await {
        Ok(response) if response.is_success() => tracing::info!("Logged out"),
        Ok(response) => tracing::warn!("Server logout returned HTTP {}", response.status().as_u16()),
        Err(e) => tracing::warn!("Server logout failed, clearing local session anyway: {}", e),
    }
    http.session().clear();
}

fn store_token(http: &HttpClient, body: &AuthResponse) {
    match body.access_token.as_deref() {
        Some(token) if !token.is_empty() => http.session().set_access_token(Some(token.to_string())),
        _ => tracing::warn!("Authentication succeeded without an access_token in the response"),
    }
}
