use crate::error::ApiResult;
use crate::http::HttpClient;
use crate::models::User;

pub async fn get_me(http: &HttpClient) -> ApiResult<User> {
    let response = http.get("users/me", Vec::new()).await?.ensure_success(None)?;
    response.json()
}

pub async fn get_user(http: &HttpClient, id: i64) -> ApiResult<User> {
    let response = http
        .get(&format!("users/{}", id), Vec::new())
        .await?
        .ensure_success(None)?;
    response.json()
}
