use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use usergrid_core::{FailureKind, FetchFailure, UserRecord, UserSource};
use usergrid_logging::{grid_debug, grid_warn};

use crate::parse_users;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec!["application/json".to_string()],
        }
    }
}

/// Fetches the user dataset over HTTP.
#[derive(Debug, Clone)]
pub struct HttpUserSource {
    url: String,
    settings: FetchSettings,
}

impl HttpUserSource {
    pub fn new(url: impl Into<String>, settings: FetchSettings) -> Self {
        Self {
            url: url.into(),
            settings,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchFailure> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.settings.redirect_limit))
            .build()
            .map_err(|err| FetchFailure::new(FailureKind::Network, err.to_string()))
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    fn too_large(&self, actual: u64) -> FetchFailure {
        FetchFailure::new(
            FailureKind::MalformedPayload,
            format!(
                "response too large (max {}, actual {actual})",
                self.settings.max_bytes
            ),
        )
    }
}

#[async_trait::async_trait(?Send)]
impl UserSource for HttpUserSource {
    async fn fetch_users(&self) -> Result<Vec<UserRecord>, FetchFailure> {
        let parsed = url::Url::parse(&self.url)
            .map_err(|err| FetchFailure::new(FailureKind::Unexpected, err.to_string()))?;
        let client = self.build_client()?;
        grid_debug!("GET {}", parsed);

        let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::new(
                FailureKind::from_status(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        match content_type.as_deref() {
            Some(ct) if !self.is_content_type_allowed(ct) => {
                return Err(FetchFailure::new(
                    FailureKind::MalformedPayload,
                    format!("unsupported content type {ct}"),
                ));
            }
            Some(_) => {}
            None => grid_warn!("Response from {} has no content type", self.url),
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        parse_users(&bytes)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        return FetchFailure::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchFailure::new(FailureKind::MalformedPayload, err.to_string());
    }
    FetchFailure::new(FailureKind::Network, err.to_string())
}
