//! Catalog HTTP client.
//!
//! A thin async transport over the catalog REST API. Authentication is
//! supplied per call by a [`TokenSource`] (usually the caller's
//! [`Session`]), so no credential is looked up ambiently.
//!
//! # Usage
//!
//! ```ignore
//! use catalog_client::{RestClient, Session};
//! use catalog_core::ListQuery;
//!
//! let session = Session::with_token(saved_token);
//! let client = RestClient::new("http://localhost:3000");
//! let page = client.list::<Product>("/products", &ListQuery::new(1, 8, ""), &session).await?;
//! ```

mod session;

use std::time::Duration;

use catalog_core::{normalize_base_url, CatalogError, ListQuery, Page, TOTAL_COUNT_HEADER};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

pub use reqwest::multipart;
pub use session::Session;

// ── Error ───────────────────────────────────────────────────────────

/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("auth: {0}")]
    Auth(String),

    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    /// Missing credential or HTTP 401.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ApiError::Auth(_) => true,
            ApiError::Server { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Convert a failure of a page load into the catalog taxonomy.
    pub fn into_load_error(self) -> CatalogError {
        if self.is_unauthorized() {
            return CatalogError::AuthExpired(self.to_string());
        }
        match self {
            ApiError::Decode(msg) => CatalogError::Validation(msg),
            other => CatalogError::Request(other.to_string()),
        }
    }

    /// Convert a failure of a create/update/delete into the catalog taxonomy.
    pub fn into_mutation_error(self, action: &str) -> CatalogError {
        if self.is_unauthorized() {
            return CatalogError::AuthExpired(self.to_string());
        }
        CatalogError::Mutation(format!("{}: {}", action, self))
    }
}

// ── TokenSource ─────────────────────────────────────────────────────

/// Pluggable token provider. Called before every API request.
///
/// Returns `Ok(None)` to skip the Authorization header (anonymous).
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

/// No authentication, for anonymous requests (login).
pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// Static bearer token (already obtained externally).
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(Some(self.0.clone()))
    }
}

// ── RestClient ──────────────────────────────────────────────────────

/// JSON-over-HTTP transport for the catalog API.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(base_url.as_ref()),
        }
    }

    /// Client with a per-request timeout.
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: normalize_base_url(base_url.as_ref()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a request with auth header.
    async fn authed(
        &self,
        builder: reqwest::RequestBuilder,
        auth: &dyn TokenSource,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        match auth.token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    /// Map non-2xx responses to `ApiError::Server`.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let code = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Server { status: code, message: body })
    }

    /// Parse an API response body.
    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
        let resp = Self::check(resp).await?;
        resp.json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }

    /// GET a single JSON document.
    pub async fn get<R: DeserializeOwned>(&self, path: &str, auth: &dyn TokenSource) -> Result<R, ApiError> {
        debug!(path, "GET");
        let req = self.authed(self.http.get(self.url(path)), auth).await?;
        let resp = req.send().await?;
        Self::parse(resp).await
    }

    /// GET one page of a collection.
    ///
    /// The body must be a JSON array. The total comes from the
    /// `X-Total-Count` header, falling back to the page length.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &ListQuery,
        auth: &dyn TokenSource,
    ) -> Result<Page<T>, ApiError> {
        debug!(path, page = query.page, limit = query.limit, q = %query.q, "GET page");
        let req = self
            .http
            .get(self.url(path))
            .query(&query.query_pairs());
        let req = self.authed(req, auth).await?;
        let resp = Self::check(req.send().await?).await?;

        let header_total = resp
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))?;
        if !body.is_array() {
            return Err(ApiError::Decode(format!("{} did not return a collection", path)));
        }
        let items: Vec<T> = serde_json::from_value(body)
            .map_err(|e| ApiError::Decode(format!("collection item: {}", e)))?;

        if header_total.is_none() {
            debug!(path, len = items.len(), "no total-count header; approximating total from page length");
        }
        Ok(Page::from_parts(items, header_total))
    }

    /// POST a JSON body.
    pub async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        auth: &dyn TokenSource,
    ) -> Result<R, ApiError> {
        debug!(path, "POST");
        let req = self.authed(self.http.post(self.url(path)).json(body), auth).await?;
        let resp = req.send().await?;
        Self::parse(resp).await
    }

    /// PATCH a JSON body.
    pub async fn patch<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        auth: &dyn TokenSource,
    ) -> Result<R, ApiError> {
        debug!(path, "PATCH");
        let req = self.authed(self.http.patch(self.url(path)).json(body), auth).await?;
        let resp = req.send().await?;
        Self::parse(resp).await
    }

    /// PATCH a multipart form.
    pub async fn patch_multipart<R: DeserializeOwned>(
        &self,
        path: &str,
        form: multipart::Form,
        auth: &dyn TokenSource,
    ) -> Result<R, ApiError> {
        debug!(path, "PATCH multipart");
        let req = self.authed(self.http.patch(self.url(path)).multipart(form), auth).await?;
        let resp = req.send().await?;
        Self::parse(resp).await
    }

    /// DELETE a resource. Any response body is ignored.
    pub async fn delete(&self, path: &str, auth: &dyn TokenSource) -> Result<(), ApiError> {
        debug!(path, "DELETE");
        let req = self.authed(self.http.delete(self.url(path)), auth).await?;
        Self::check(req.send().await?).await?;
        Ok(())
    }
}
