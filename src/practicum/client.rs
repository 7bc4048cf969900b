//! HTTP client for the Practicum homework status endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::StatusSource;
use crate::config::mask_secret;

/// Keys the API uses to report its own errors inside a JSON body.
const REMOTE_ERROR_KEYS: [&str; 2] = ["error", "code"];

/// Errors that can occur while fetching homework statuses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {url} with params {params} and headers {headers} failed: {source}")]
    Transport {
        url: String,
        params: String,
        headers: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Endpoint {url} with params {params} returned status {status}")]
    Endpoint {
        status: u16,
        url: String,
        params: String,
    },

    #[error("API reported {key}: {value}")]
    Remote { key: String, value: String },

    #[error("Response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Client for the Practicum homework status API.
#[derive(Clone)]
pub struct PracticumClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// Creates a client for `endpoint` authorized with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    /// The polled endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Requests statuses updated since `cursor` and decodes the body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] on network failure,
    /// [`ApiError::Endpoint`] on any status other than 200,
    /// [`ApiError::Decode`] if the body is not JSON, and
    /// [`ApiError::Remote`] if the body carries an `error` or `code` key.
    pub async fn fetch(&self, cursor: i64) -> Result<Value, ApiError> {
        let params = format!("from_date={cursor}");
        debug!(url = %self.endpoint, %params, "Requesting homework statuses");

        let response = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", cursor)])
            .send()
            .await
            .map_err(|source| self.transport_error(&params, source))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ApiError::Endpoint {
                status: status.as_u16(),
                url: self.endpoint.clone(),
                params,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| self.transport_error(&params, source))?;

        let payload: Value = serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: self.endpoint.clone(),
            source,
        })?;

        check_remote_error(&payload)?;
        Ok(payload)
    }

    fn transport_error(&self, params: &str, source: reqwest::Error) -> ApiError {
        ApiError::Transport {
            url: self.endpoint.clone(),
            params: params.to_owned(),
            headers: format!("Authorization: OAuth {}", mask_secret(&self.token)),
            source,
        }
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, cursor: i64) -> Result<Value, ApiError> {
        PracticumClient::fetch(self, cursor).await
    }
}

impl std::fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .field("token", &mask_secret(&self.token))
            .finish_non_exhaustive()
    }
}

/// Fails if the payload uses the API's in-body error convention.
fn check_remote_error(payload: &Value) -> Result<(), ApiError> {
    let Value::Object(fields) = payload else {
        return Ok(());
    };

    for key in REMOTE_ERROR_KEYS {
        if let Some(value) = fields.get(key) {
            return Err(ApiError::Remote {
                key: key.to_owned(),
                value: match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            });
        }
    }
    Ok(())
}
