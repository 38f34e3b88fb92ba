use std::marker::PhantomData;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::auth::Authorizer;
use crate::config::Config;
use crate::errors::{AlertsError, Result};

/// Service error payload shape, fixed per client at construction
///
/// The REST and Infrastructure APIs wrap errors differently; implementors
/// decode their shape and surface a human-readable message.
pub trait ErrorEnvelope: DeserializeOwned {
    /// Error message carried by the payload, if any
    fn message(&self) -> Option<String>;
}

/// REST API error payload: `{"error":{"title":"..."}}`
#[derive(Debug, Deserialize)]
pub struct RestErrorEnvelope {
    error: Option<RestErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct RestErrorDetail {
    title: Option<String>,
}

impl ErrorEnvelope for RestErrorEnvelope {
    fn message(&self) -> Option<String> {
        self.error.as_ref()?.title.clone()
    }
}

/// Infrastructure API error payload: `{"errors":[{"status":...,"detail":"..."}]}`
#[derive(Debug, Deserialize)]
pub struct InfrastructureErrorEnvelope {
    #[serde(default)]
    errors: Vec<InfrastructureErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct InfrastructureErrorDetail {
    status: Option<u16>,
    detail: Option<String>,
}

impl ErrorEnvelope for InfrastructureErrorEnvelope {
    fn message(&self) -> Option<String> {
        let first = self.errors.first()?;
        match (&first.detail, first.status) {
            (Some(detail), _) => Some(detail.clone()),
            (None, Some(status)) => Some(format!("status {status}")),
            (None, None) => None,
        }
    }
}

/// A completed API call: the raw status and headers plus the decoded body
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: T,
}

/// Low-level HTTP client for one New Relic service
///
/// Bound at construction to one [`Authorizer`] and one [`ErrorEnvelope`]
/// type; neither can change afterwards. Holds no mutable state, so a
/// single instance can serve concurrent callers.
///
/// Performs exactly one HTTP round-trip per call: no retries, no caching.
pub struct ApiClient<E: ErrorEnvelope> {
    http: ClientWithMiddleware,
    config: Config,
    auth: Authorizer,
    _error_envelope: PhantomData<E>,
}

impl<E: ErrorEnvelope> ApiClient<E> {
    /// Create a client
    ///
    /// # Errors
    ///
    /// Returns [`AlertsError::Configuration`] when the credential required
    /// by `auth` is missing from `config`, and
    /// [`AlertsError::BuildHttpClient`] when the HTTP client cannot be
    /// built.
    pub fn new(config: Config, auth: Authorizer) -> Result<Self> {
        auth.validate(&config)?;

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(AlertsError::BuildHttpClient)?;
        let http = ClientBuilder::new(http).build();

        Ok(Self {
            http,
            config,
            auth,
            _error_envelope: PhantomData,
        })
    }

    /// Issue a GET request and decode the 2xx body into `T`
    pub async fn get<P, T>(&self, url: Url, params: Option<&P>) -> Result<ApiResponse<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (status, headers, text) = self
            .dispatch(Method::GET, url, params, None::<&()>)
            .await?;
        let body = serde_json::from_str(&text).map_err(AlertsError::Decode)?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// Issue a POST request with a JSON body and decode the 2xx response
    pub async fn post<P, B, T>(
        &self,
        url: Url,
        params: Option<&P>,
        body: &B,
    ) -> Result<ApiResponse<T>>
    where
        P: Serialize + ?Sized,
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (status, headers, text) = self
            .dispatch(Method::POST, url, params, Some(body))
            .await?;
        let body = serde_json::from_str(&text).map_err(AlertsError::Decode)?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// Issue a PUT request with a JSON body and decode the 2xx response
    pub async fn put<P, B, T>(
        &self,
        url: Url,
        params: Option<&P>,
        body: &B,
    ) -> Result<ApiResponse<T>>
    where
        P: Serialize + ?Sized,
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (status, headers, text) = self.dispatch(Method::PUT, url, params, Some(body)).await?;
        let body = serde_json::from_str(&text).map_err(AlertsError::Decode)?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// Issue a DELETE request
    ///
    /// Some endpoints echo the deleted resource, others return an empty
    /// body; an empty body decodes to `None` rather than an error.
    pub async fn delete<P, T>(&self, url: Url, params: Option<&P>) -> Result<ApiResponse<Option<T>>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (status, headers, text) = self
            .dispatch(Method::DELETE, url, params, None::<&()>)
            .await?;
        let body = if text.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(&text).map_err(AlertsError::Decode)?)
        };
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// Build, authorize and send one request, returning the raw outcome
    ///
    /// Non-success statuses are mapped here: 404 becomes
    /// [`AlertsError::NotFound`], anything else non-2xx becomes
    /// [`AlertsError::Api`] with the message extracted from the error
    /// envelope `E` (falling back to the raw body text when the envelope
    /// does not decode).
    #[instrument(
        name = "ApiClient::dispatch",
        skip_all,
        fields(method = %method, url = %url)
    )]
    async fn dispatch<P, B>(
        &self,
        method: Method,
        url: Url,
        params: Option<&P>,
        body: Option<&B>,
    ) -> Result<(StatusCode, HeaderMap, String)>
    where
        P: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let mut request = self.http.request(method, url);

        if let Some(params) = params {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request = self.auth.apply(&self.config, request);

        let response = request.send().await.map_err(AlertsError::Transport)?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| AlertsError::Transport(e.into()))?;

        debug!(status = status.as_u16(), "Received response");

        if !status.is_success() {
            let message = serde_json::from_str::<E>(&text)
                .ok()
                .and_then(|envelope| envelope.message())
                .unwrap_or_else(|| text.trim().to_string());

            if status == StatusCode::NOT_FOUND {
                return Err(AlertsError::NotFound(message));
            }
            return Err(AlertsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok((status, headers, text))
    }
}
