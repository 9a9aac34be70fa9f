use academix_core::Paginated;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error::ActionError;
use crate::resource::Resource;
use crate::store::Remote;

/// Page size used when fetching whole lists.
const PAGE_SIZE: i64 = 100;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Authenticated HTTP access to the API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Exchanges credentials for an access token and keeps it for later
    /// requests.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ActionError> {
        let request = self
            .http
            .post(self.url("auth/login"))
            .json(&json!({ "email": email, "password": password }));
        let response: TokenResponse = self.send(request).await?;
        self.token = Some(response.access_token);
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn dispatch(&self, request: RequestBuilder) -> Result<reqwest::Response, ActionError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "API request failed");
        Err(ActionError::from_response(status.as_u16(), &body))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ActionError> {
        Ok(self.dispatch(request).await?.json::<T>().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ActionError> {
        self.dispatch(request).await?;
        Ok(())
    }

    pub async fn list_page<R: Resource>(
        &self,
        page: i64,
    ) -> Result<Paginated<R::Entity>, ActionError> {
        let request = self
            .http
            .get(self.url(R::PATH))
            .query(&[("limit", PAGE_SIZE), ("page", page)]);
        self.send(request).await
    }
}

impl<R: Resource> Remote<R> for ApiClient {
    async fn list(&self) -> Result<Vec<R::Entity>, ActionError> {
        let mut rows = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.list_page::<R>(page).await?;
            rows.extend(batch.data);
            if !batch.meta.has_more {
                return Ok(rows);
            }
            page += 1;
        }
    }

    async fn create(&self, input: &R::Create) -> Result<R::Saved, ActionError> {
        self.send(self.http.post(self.url(R::PATH)).json(input)).await
    }

    async fn update(&self, id: R::Id, changes: &R::Update) -> Result<R::Saved, ActionError> {
        let url = self.url(&format!("{}/{}", R::PATH, id));
        self.send(self.http.put(url).json(changes)).await
    }

    async fn delete(&self, id: R::Id) -> Result<(), ActionError> {
        let url = self.url(&format!("{}/{}", R::PATH, id));
        self.send_empty(self.http.delete(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_api_prefix() {
        let client = ApiClient::new("http://localhost:3000/");
        assert_eq!(
            client.url("promo-codes"),
            "http://localhost:3000/api/promo-codes"
        );
        assert_eq!(client.url("/auth/login"), "http://localhost:3000/api/auth/login");
    }

    #[test]
    fn test_with_token() {
        let client = ApiClient::new("http://localhost:3000").with_token("abc");
        assert_eq!(client.token(), Some("abc"));
    }
}
