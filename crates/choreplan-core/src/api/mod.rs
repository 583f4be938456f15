//! HTTP client for the chore-planner backend.
//!
//! `ApiClient` owns the base URL and the reqwest client; the domain
//! services (`auth`, `chores`, `timer`) build their requests through
//! the JSON verbs here. Every non-2xx response is mapped onto
//! [`ApiError`] with the user-facing message for its status class.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ApiError;

/// Default backend location, overridable via configuration.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/api";

/// Error body shape the backend uses for 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// REST client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8081/api`).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|source| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            base: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn apply_token(
        req: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let req = Self::apply_token(self.http.get(self.endpoint(path)), token).query(query);
        let resp = check(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let req = Self::apply_token(self.http.post(self.endpoint(path)), token).json(body);
        let resp = check(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    /// POST where only the status matters (timer notifications).
    pub(crate) async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut req = Self::apply_token(self.http.post(self.endpoint(path)), token);
        if let Some(body) = body {
            req = req.json(body);
        }
        check(req.send().await?).await?;
        Ok(())
    }

    pub(crate) async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let req = Self::apply_token(self.http.put(self.endpoint(path)), token).json(body);
        let resp = check(req.send().await?).await?;
        Ok(resp.json().await?)
    }

    pub(crate) async fn delete(&self, path: &str, token: Option<&str>) -> Result<(), ApiError> {
        let req = Self::apply_token(self.http.delete(self.endpoint(path)), token);
        check(req.send().await?).await?;
        Ok(())
    }
}

/// Map a response to `Ok` or the status-classified error, extracting
/// the backend's `{"message": ...}` body when present.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message);
    Err(ApiError::from_status(status.as_u16(), message))
}

/// Drive a client future to completion from synchronous code.
///
/// Reuses the ambient runtime when one exists (e.g. from a
/// `spawn_blocking` thread of the timer service) and otherwise spins up
/// a fresh one. Must not be called from inside an async task; the
/// timer's notification path goes through `spawn_blocking` for exactly
/// that reason.
pub(crate) fn wait<T>(
    fut: impl std::future::Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle.block_on(fut),
        Err(_) => tokio::runtime::Runtime::new()
            .map_err(|e| ApiError::Runtime(e.to_string()))?
            .block_on(fut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalized() {
        let api = ApiClient::new("http://localhost:8081/api/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:8081/api");
        assert_eq!(api.endpoint("/chores"), "http://localhost:8081/api/chores");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn error_body_message_is_surfaced() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/boom")
            .with_status(418)
            .with_body(r#"{"message":"teapot overload"}"#)
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        let err = wait(api.get_json::<serde_json::Value>("/boom", &[], None)).unwrap_err();
        assert_eq!(err.to_string(), "teapot overload");
    }

    #[test]
    fn missing_error_body_falls_back_to_generic_message() {
        let mut server = mockito::Server::new();
        let _m = server.mock("GET", "/boom").with_status(502).create();

        let api = ApiClient::new(&server.url()).unwrap();
        let err = wait(api.get_json::<serde_json::Value>("/boom", &[], None)).unwrap_err();
        assert_eq!(err.to_string(), "An error occurred on the server.");
    }

    #[test]
    fn unauthorized_maps_to_its_own_variant() {
        let mut server = mockito::Server::new();
        let _m = server.mock("GET", "/private").with_status(401).create();

        let api = ApiClient::new(&server.url()).unwrap();
        let err = wait(api.get_json::<serde_json::Value>("/private", &[], None)).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn bearer_token_is_attached_when_present() {
        let mut server = mockito::Server::new();
        let m = server
            .mock("GET", "/private")
            .match_header("authorization", "Bearer sekrit")
            .with_status(200)
            .with_body("{}")
            .create();

        let api = ApiClient::new(&server.url()).unwrap();
        wait(api.get_json::<serde_json::Value>("/private", &[], Some("sekrit"))).unwrap();
        m.assert();
    }
}
