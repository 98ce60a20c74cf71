//! HTTP client core.
//!
//! Three `reqwest` clients share one cookie jar where credentials matter:
//! - `api`: every resource call; bearer token from the session, cookies on
//! - `auth`: the refresh call only; cookies on, no bearer header, never
//!   routed through the refresh interceptor
//! - `storage`: direct uploads to presigned URLs; no cookies, no auth

pub mod request;
pub mod response;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{RefreshInterceptor, Transport};
use crate::models::RefreshResponse;
use crate::session::SessionStore;
use crate::upload::UploadFile;

pub use request::{ApiRequest, RequestBody};
pub use response::ApiResponse;

pub const REFRESH_PATH: &str = "auth/refresh";

pub struct HttpClient {
    base_url: Url,
    refresh_url: Url,
    api: reqwest::Client,
    auth: reqwest::Client,
    storage: reqwest::Client,
    cookies: Arc<Jar>,
    session: SessionStore,
    log_requests: bool,
}

impl HttpClient {
    pub fn new(config: &ApiConfig, session: SessionStore) -> ApiResult<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        let refresh_url = base_url.join(REFRESH_PATH)?;
        let timeout = Duration::from_secs(config.request_timeout_secs.max(1));

        let cookies = Arc::new(Jar::default());
        for pair in session.refresh_cookies() {
            cookies.add_cookie_str(&format!("{}; Path=/", pair), &refresh_url);
        }

        let api = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::config(format!("failed to build API client: {}", e)))?;

        let auth = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::config(format!("failed to build auth client: {}", e)))?;

        let storage = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::config(format!("failed to build storage client: {}", e)))?;

        Ok(Self {
            base_url,
            refresh_url,
            api,
            auth,
            storage,
            cookies,
            session,
            log_requests: config.enable_request_logging,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path relative to the base URL
    pub fn url(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Credential-less client for presigned storage URLs
    pub(crate) fn storage_client(&self) -> &reqwest::Client {
        &self.storage
    }

    /// Send through the refresh interceptor
    pub async fn request(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        RefreshInterceptor::execute(self, &self.session, request).await
    }

    pub async fn get(&self, path: &str, query: Vec<(String, String)>) -> ApiResult<ApiResponse> {
        self.request(&ApiRequest::get(path).with_query(query)).await
    }

    pub async fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> ApiResult<ApiResponse> {
        self.request(&ApiRequest::post(path).with_json(body)?).await
    }

    pub async fn delete_json<T: serde::Serialize>(&self, path: &str, body: &T) -> ApiResult<ApiResponse> {
        self.request(&ApiRequest::delete(path).with_json(body)?).await
    }

    pub async fn post_multipart(&self, path: &str, field: &str, file: UploadFile) -> ApiResult<ApiResponse> {
        self.request(&ApiRequest::post(path).with_multipart(field, file)).await
    }

    fn build(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult<reqwest::RequestBuilder> {
        let url = self.url(&request.path)?;
        let mut builder = self.api.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart { field, file } => builder.multipart(file.to_form(field)?),
        };
        Ok(builder)
    }

    /// Mirror the refresh cookie into the session so later processes can refresh
    fn persist_cookies(&self) {
        let pairs = self
            .cookies
            .cookies(&self.refresh_url)
            .and_then(|header| header.to_str().ok().map(str::to_string))
            .map(|header| {
                header
                    .split(';')
                    .map(|pair| pair.trim().to_string())
                    .filter(|pair| !pair.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        self.session.set_refresh_cookies(pairs);
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult<ApiResponse> {
        if self.log_requests {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                has_token = token.is_some(),
                "api request"
            );
        }

        let response = self
            .build(request, token)?
            .send()
            .await
            .map_err(|e| ApiError::network(format!("{} {}: {}", request.method, request.path, e)))?;
        self.persist_cookies();

        let response = ApiResponse::read(response).await?;
        if self.log_requests {
            tracing::debug!(path = %request.path, status = response.status().as_u16(), "api response");
        }
        Ok(response)
    }

    async fn refresh(&self) -> ApiResult<Option<String>> {
        let response = self
            .auth
            .post(self.refresh_url.clone())
            .send()
            .await
            .map_err(|e| ApiError::network(format!("token refresh: {}", e)))?;
        self.persist_cookies();

        let response = ApiResponse::read(response).await?;
        if !response.is_success() {
            tracing::warn!("Token refresh rejected with HTTP {}", response.status().as_u16());
            return Ok(None);
        }

        let token = response
            .json::<RefreshResponse>()
            .ok()
            .and_then(|body| body.token)
            .filter(|token| !token.is_empty());
        if token.is_none() {
            tracing::warn!("Token refresh response carried no token");
        }
        Ok(token)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .finish()
    }
}

/// Parse the configured base URL so relative paths append to it
fn normalize_base_url(raw: &str) -> ApiResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::config("API base URL is not configured (set RAMP_API_URL)"));
    }
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Ok(Url::parse(&with_slash)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn client(base: &str) -> HttpClient {
        let config = AppConfig::development().with_base_url(base);
        HttpClient::new(&config.api, SessionStore::in_memory()).unwrap()
    }

    #[test]
    fn paths_join_under_base_prefix() {
        let http = client("https://api.example.kr/v1");
        assert_eq!(http.url("ramps").unwrap().as_str(), "https://api.example.kr/v1/ramps");
        assert_eq!(http.url("/users/3").unwrap().as_str(), "https://api.example.kr/v1/users/3");
        assert_eq!(http.refresh_url.as_str(), "https://api.example.kr/v1/auth/refresh");
    }

    #[test]
    fn empty_base_url_is_a_config_error() {
        assert!(matches!(normalize_base_url("  "), Err(ApiError::Config(_))));
        assert!(matches!(normalize_base_url("not a url"), Err(ApiError::Config(_))));
    }

    #[test]
    fn bearer_header_only_when_token_present() {
        let http = client("http://localhost:3000");
        let req = ApiRequest::get("users/me");

        let with = http.build(&req, Some("tok")).unwrap().build().unwrap();
        assert_eq!(
            with.headers().get(reqwest::header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer tok")
        );

        let without = http.build(&req, None).unwrap().build().unwrap();
        assert!(without.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn query_pairs_are_encoded() {
        let http = client("http://localhost:3000");
        let req = ApiRequest::get("ramps").with_query(vec![
            ("page".to_string(), "1".to_string()),
            ("where__district".to_string(), "강남구".to_string()),
        ]);
        let built = http.build(&req, None).unwrap().build().unwrap();
        let pairs: Vec<(String, String)> = built.url().query_pairs().into_owned().collect();
        assert_eq!(pairs[1], ("where__district".to_string(), "강남구".to_string()));
    }
}
