use flagvault_lib::{
    validate_flag_name, CreateFlagRequest, FlagError, FlagResponse, FlagValueResponse,
    UpdateFlagValueRequest, ValueInput,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::server::config::RemoteConfig;

pub const DEFAULT_REMOTE: &str = "http://localhost:8080";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Flag(#[from] FlagError),
    #[error("cannot parse {0:?} as a flag value, expected true, false or a number")]
    BadValue(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

/// Resolve the remote URL from: CLI arg > FV_REMOTE / fv.toml `[remote]` > default
pub fn resolve_remote_url(remote_arg: Option<&str>, config: &RemoteConfig) -> String {
    remote_arg
        .map(String::from)
        .or_else(|| config.url.clone())
        .unwrap_or_else(|| DEFAULT_REMOTE.to_string())
}

/// `true`/`false` become a bool, anything else must parse as a number.
pub fn parse_value(raw: &str) -> Result<ValueInput, ClientError> {
    match raw.trim() {
        "true" => Ok(ValueInput::boolean(true)),
        "false" => Ok(ValueInput::boolean(false)),
        other => other
            .parse::<f64>()
            .map(ValueInput::numeric)
            .map_err(|_| ClientError::BadValue(raw.to_string())),
    }
}

/// Thin JSON client for a running flag server.
pub struct FlagClient {
    http: reqwest::Client,
    base: String,
}

impl FlagClient {
    pub fn new(remote: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: remote.trim_end_matches('/').to_string(),
        }
    }

    fn flag_url(&self, name: &str) -> String {
        format!("{}/v1/flags/{}", self.base, name)
    }

    pub async fn create(&self, req: &CreateFlagRequest) -> Result<FlagResponse, ClientError> {
        // Fail fast before a round trip the server would reject anyway.
        validate_flag_name(&req.name)?;
        let response = self
            .http
            .post(format!("{}/v1/flags", self.base))
            .json(req)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn get(&self, name: &str) -> Result<FlagResponse, ClientError> {
        validate_flag_name(name)?;
        let response = self.http.get(self.flag_url(name)).send().await?;
        read_json(response).await
    }

    pub async fn value(&self, name: &str) -> Result<FlagValueResponse, ClientError> {
        validate_flag_name(name)?;
        let response = self
            .http
            .get(format!("{}/value", self.flag_url(name)))
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn set(&self, name: &str, value: ValueInput) -> Result<FlagResponse, ClientError> {
        validate_flag_name(name)?;
        let response = self
            .http
            .put(format!("{}/value", self.flag_url(name)))
            .json(&UpdateFlagValueRequest { value })
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(body);
    Err(ClientError::Api { status, message })
}

/// Human-readable form of a value for terminal output.
pub fn display_value(value: &ValueInput) -> String {
    match (value.boolean, value.numeric) {
        (Some(b), None) => b.to_string(),
        (None, Some(n)) => n.to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
