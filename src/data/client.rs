//! HTTP client for the upstream employee API
//!
//! Issues the four upstream calls and hands back the HTTP status with the
//! decoded body, or a classified failure. No caching and no interpretation
//! of the body happens here; see [`super::normalize`] for that.

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use super::{Employee, NewEmployee};
use crate::config::FacadeConfig;

/// Errors that can occur when calling the upstream API
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered with a 4xx or 5xx status
    #[error("Upstream returned {status} {reason}")]
    Status { status: u16, reason: String },

    /// HTTP request failed (connection refused, timeout, broken body)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// An endpoint URL could not be built from the base URL
    #[error("Cannot build endpoint URL from base '{0}'")]
    InvalidUrl(String),
}

/// A non-error upstream response with its decoded body
#[derive(Debug, Clone, PartialEq)]
pub struct Upstream<T> {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase from the status line, or the canonical one for the status
    pub reason: String,
    /// Decoded JSON body
    pub body: T,
}

/// Body shape shared by the list, get-by-id and delete endpoints
///
/// Every field is optional: delete omits `data`, get-by-id omits `message`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmployeesBody {
    /// Logical status, `"success"` when upstream considers the call successful
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Employee>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Client for the upstream employee API
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http_client: Client,
    base_url: Url,
}

impl UpstreamClient {
    /// Creates a client whose every request is bounded by the configured timeout
    pub fn new(config: &FacadeConfig) -> Result<Self, UpstreamError> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
        })
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(http_client: Client, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET `employees`
    pub async fn list_employees(&self) -> Result<Upstream<EmployeesBody>, UpstreamError> {
        let url = self.endpoint(&["employees"])?;
        self.send(self.http_client.get(url)).await
    }

    /// GET `employee/{id}`
    ///
    /// The body may legally carry zero or several records for one id.
    pub async fn get_employee(&self, id: &str) -> Result<Upstream<EmployeesBody>, UpstreamError> {
        let url = self.endpoint(&["employee", id])?;
        self.send(self.http_client.get(url)).await
    }

    /// POST `create` with a form-urlencoded body
    ///
    /// The success body carries `data` as a loose object rather than an
    /// employee record, so it is returned undecoded.
    pub async fn create_employee(
        &self,
        employee: &NewEmployee,
    ) -> Result<Upstream<serde_json::Value>, UpstreamError> {
        let url = self.endpoint(&["create"])?;
        self.send(self.http_client.post(url).form(employee)).await
    }

    /// DELETE `delete/{id}`
    pub async fn delete_employee(
        &self,
        id: &str,
    ) -> Result<Upstream<EmployeesBody>, UpstreamError> {
        let url = self.endpoint(&["delete", id])?;
        self.send(self.http_client.delete(url)).await
    }

    /// Appends path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Upstream<T>, UpstreamError> {
        let response = request.send().await?;
        let status = response.status();
        let reason = response
            .extensions()
            .get::<hyper::ext::ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "Unknown Status".to_string());

        if status.is_client_error() || status.is_server_error() {
            tracing::debug!(
                status = status.as_u16(),
                url = %response.url(),
                "Upstream error status"
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        let text = response.text().await?;
        let body = serde_json::from_str(&text)?;

        Ok(Upstream {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}
