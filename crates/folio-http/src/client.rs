//! HTTP client for the document API.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use folio_core::Result;
use folio_core::error::{Error, RejectedRequest, StoreError};
use folio_core::types::StoreUrl;

use crate::endpoints::ErrorResponse;

/// Request timeout unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn map_reqwest(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else if err.is_connect() {
        StoreError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        StoreError::Corrupt {
            message: err.to_string(),
        }
    } else {
        StoreError::Http {
            message: err.to_string(),
        }
    }
}

/// JSON client bound to one store base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base: StoreUrl,
    token: Option<String>,
}

impl HttpClient {
    /// Create a client for the given store.
    pub fn new(base: StoreUrl, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(map_reqwest)?;

        Ok(Self {
            client,
            base,
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn base(&self) -> &StoreUrl {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.base.endpoint(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await.map_err(map_reqwest)?;
        trace!(status = %response.status(), "HTTP response");
        Ok(response)
    }

    /// GET a JSON resource.
    #[instrument(skip(self), fields(store = %self.base))]
    pub async fn get_json<Q, R>(&self, path: &str, query: &Q) -> Result<R>
    where
        Q: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        debug!(path, "GET");
        let response = self.send(self.request(Method::GET, path).query(query)).await?;
        self.handle_response(response).await
    }

    /// GET a JSON resource, mapping 404 to `None`.
    #[instrument(skip(self), fields(store = %self.base))]
    pub async fn get_optional<R>(&self, path: &str) -> Result<Option<R>>
    where
        R: DeserializeOwned,
    {
        debug!(path, "GET");
        let response = self.send(self.request(Method::GET, path)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(response).await.map(Some)
    }

    /// Send a JSON body and parse a JSON reply.
    #[instrument(skip(self, body), fields(store = %self.base))]
    pub async fn send_json<B, R>(&self, method: Method, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        debug!(%method, path, "JSON request");
        let response = self.send(self.request(method, path).json(body)).await?;
        self.handle_response(response).await
    }

    /// Send a JSON body, ignoring any reply body.
    #[instrument(skip(self, body), fields(store = %self.base))]
    pub async fn send_json_no_response<B>(&self, method: Method, path: &str, body: &B) -> Result<()>
    where
        B: Serialize,
    {
        debug!(%method, path, "JSON request (no response)");
        let response = self.send(self.request(method, path).json(body)).await?;
        self.check_status(response).await
    }

    /// DELETE a resource.
    #[instrument(skip(self), fields(store = %self.base))]
    pub async fn delete(&self, path: &str) -> Result<()> {
        debug!(path, "DELETE");
        let response = self.send(self.request(Method::DELETE, path)).await?;
        self.check_status(response).await
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.parse_error_response(response).await.into())
        }
    }

    async fn handle_response<R: DeserializeOwned>(&self, response: reqwest::Response) -> Result<R> {
        if response.status().is_success() {
            response
                .json::<R>()
                .await
                .map_err(|e| Error::StoreUnavailable(map_reqwest(e)))
        } else {
            Err(self.parse_error_response(response).await.into())
        }
    }

    async fn parse_error_response(&self, response: reqwest::Response) -> RejectedRequest {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => RejectedRequest::new(status, body.error, body.message),
            Err(_) => RejectedRequest::new(status, None, None),
        }
    }
}
