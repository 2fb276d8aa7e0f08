use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiError,
    protocol::{CreateLogoRequest, CreateLogoResponse, SurpriseMeResponse},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

mod controller;
mod state;

pub use controller::{ControllerEvent, ControllerOptions, LogoRequestController, SubmitError};
pub use state::{
    LogoResult, NavigationIntent, RequestState, RequestStatus, Toast, CREATE_FAILED_MESSAGE,
    EMPTY_PROMPT_MESSAGE,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(120_000);

const CREATE_LOGO_PATH: &str = "api/logos";
const SURPRISE_ME_PATH: &str = "api/logos/surprise-me";

/// Remote side of logo generation. The controller only ever talks to this seam.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn create_logo(&self, request: CreateLogoRequest) -> Result<CreateLogoResponse>;
    async fn surprise_me(&self) -> Result<SurpriseMeResponse>;
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid generation service url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("{endpoint} timed out")]
    Timeout { endpoint: &'static str },
    #[error("transport failure calling {endpoint}: {source}")]
    Transport {
        endpoint: &'static str,
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {message}")]
    Rejected {
        endpoint: &'static str,
        status: StatusCode,
        message: String,
    },
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        source: serde_json::Error,
    },
}

impl GenerationError {
    fn from_reqwest(endpoint: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { endpoint }
        } else {
            Self::Transport { endpoint, source }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

pub struct HttpGenerationClient {
    http: Client,
    base_url: Url,
}

impl HttpGenerationClient {
    pub fn new(config: &ClientConfig) -> std::result::Result<Self, GenerationError> {
        let base_url = normalize_base_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(GenerationError::ClientBuild)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn create_logo(
        &self,
        request: &CreateLogoRequest,
    ) -> std::result::Result<CreateLogoResponse, GenerationError> {
        let url = self.endpoint(CREATE_LOGO_PATH)?;
        debug!(%url, style = %request.style, "posting logo request");
        let res = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::from_reqwest(CREATE_LOGO_PATH, e))?;
        read_json(CREATE_LOGO_PATH, res).await
    }

    pub async fn surprise_me(&self) -> std::result::Result<SurpriseMeResponse, GenerationError> {
        let url = self.endpoint(SURPRISE_ME_PATH)?;
        debug!(%url, "requesting surprise prompt");
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GenerationError::from_reqwest(SURPRISE_ME_PATH, e))?;
        read_json(SURPRISE_ME_PATH, res).await
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, GenerationError> {
        self.base_url
            .join(path)
            .map_err(|source| GenerationError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl GenerationService for HttpGenerationClient {
    async fn create_logo(&self, request: CreateLogoRequest) -> Result<CreateLogoResponse> {
        Ok(HttpGenerationClient::create_logo(self, &request).await?)
    }

    async fn surprise_me(&self) -> Result<SurpriseMeResponse> {
        Ok(HttpGenerationClient::surprise_me(self).await?)
    }
}

/// Relative endpoint paths are joined onto the base, so the base must end in `/`
/// for any path prefix (e.g. `https://host/gateway`) to survive the join.
fn normalize_base_url(raw: &str) -> std::result::Result<Url, GenerationError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|source| GenerationError::InvalidBaseUrl {
        url: trimmed.to_string(),
        source,
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn read_json<T: DeserializeOwned>(
    endpoint: &'static str,
    res: Response,
) -> std::result::Result<T, GenerationError> {
    let status = res.status();
    let body = res
        .bytes()
        .await
        .map_err(|e| GenerationError::from_reqwest(endpoint, e))?;

    if !status.is_success() {
        let message = match serde_json::from_slice::<ApiError>(&body) {
            Ok(api_error) => api_error.error,
            Err(_) => String::from_utf8_lossy(&body).trim().to_string(),
        };
        return Err(GenerationError::Rejected {
            endpoint,
            status,
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|source| GenerationError::Decode { endpoint, source })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
