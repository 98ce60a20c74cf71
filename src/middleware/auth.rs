use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::ApiResult;
use crate::http::{ApiRequest, ApiResponse};
use crate::session::SessionStore;

/// What the refresh interceptor needs from the network layer
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send once with the given bearer token, no refresh handling
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult<ApiResponse>;

    /// Exchange the session cookie for a new access token.
    ///
    /// `Ok(None)` means the server refused or returned no token.
    async fn refresh(&self) -> ApiResult<Option<String>>;
}

/// One-shot refresh-and-retry on 401.
///
/// NORMAL: send with the current token. On 401 move to REFRESHING: call
/// [`Transport::refresh`] exactly once. A new token is stored in the session
/// and the request is replayed once with it; the replay's outcome is final
/// even if it is another 401. If the refresh fails for any reason the
/// original 401 response is returned unchanged.
pub struct RefreshInterceptor;

impl RefreshInterceptor {
    pub async fn execute<T>(transport: &T, session: &SessionStore, request: &ApiRequest) -> ApiResult<ApiResponse>
    where
        T: Transport + ?Sized,
    {
        let token = session.access_token();
        let response = transport.send(request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::info!("{} {} returned 401, attempting token refresh", request.method, request.path);
        let new_token = match transport.refresh().await {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(response),
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                return Ok(response);
            }
        };

        session.set_access_token(Some(new_token.clone()));
        transport.send(request, Some(&new_token)).await
    }
}
