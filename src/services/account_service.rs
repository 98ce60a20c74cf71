use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{auth, users};
use crate::error::ApiResult;
use crate::forms::{SignInForm, SignUpForm};
use crate::http::HttpClient;
use crate::models::User;
use crate::query::QueryCache;

/// What the local session knows without asking the server
#[derive(Debug, Clone, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub subject: Option<String>,
    pub email: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired: bool,
    pub has_refresh_cookie: bool,
}

pub struct AccountService {
    http: Arc<HttpClient>,
    profile: QueryCache<(), User>,
}

impl AccountService {
    pub fn new(http: Arc<HttpClient>, stale_time: Duration) -> Self {
        Self {
            http,
            profile: QueryCache::new(stale_time),
        }
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> ApiResult<()> {
        let payload = form.validate()?;
        auth::sign_up(&self.http, &payload).await?;
        self.profile.invalidate();
        tracing::info!(email = %payload.email, "signed up");
        Ok(())
    }

    pub async fn sign_in(&self, form: &SignInForm) -> ApiResult<()> {
        let payload = form.validate()?;
        auth::sign_in(&self.http, &payload).await?;
        self.profile.invalidate();
        tracing::info!(email = %payload.email, "signed in");
        Ok(())
    }

    pub async fn logout(&self) {
        auth::logout(&self.http).await;
        self.profile.invalidate();
    }

    pub async fn refresh(&self) -> ApiResult<bool> {
        let refreshed = auth::refresh(&self.http).await?;
        if refreshed {
            self.profile.invalidate();
        }
        Ok(refreshed)
    }

    /// Current user's profile, cached
    pub async fn me(&self) -> ApiResult<Arc<User>> {
        let http = self.http.clone();
        self.profile
            .fetch((), || async move { users::get_me(&http).await })
            .await
    }

    pub async fn user(&self, id: i64) -> ApiResult<User> {
        users::get_user(&self.http, id).await
    }

    pub fn status(&self) -> AuthStatus {
        let session = self.http.session();
        let claims = session.claims();
        let now = Utc::now();
        AuthStatus {
            authenticated: session.is_authenticated(),
            subject: claims.as_ref().and_then(|c| c.subject()),
            email: claims.as_ref().and_then(|c| c.email.clone()),
            expires_at: claims.as_ref().and_then(|c| c.expires_at()),
            expired: claims.as_ref().map(|c| c.is_expired_at(now)).unwrap_or(false),
            has_refresh_cookie: !session.refresh_cookies().is_empty(),
        }
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}
