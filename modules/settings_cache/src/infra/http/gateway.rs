//! reqwest-backed gateway for the settings endpoint
//!
//! `GET` reads the current user's settings, `POST` upserts them. The session
//! is carried by an optional `Cookie` header.

use super::dto::{SaveSettingsRequest, SettingsDto};
use super::mapper::error_for_status;
use crate::config::GatewayConfig;
use crate::contract::{GatewayError, RemoteSettingsGateway, SettingsPatch, SettingsRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, RequestBuilder};
use url::Url;

/// HTTP implementation of [`RemoteSettingsGateway`]
#[derive(Debug, Clone)]
pub struct HttpSettingsGateway {
    client: Client,
    endpoint: Url,
}

impl HttpSettingsGateway {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let endpoint = settings_endpoint(&config.base_url, &config.settings_path)
            .with_context(|| format!("invalid settings path '{}'", config.settings_path))?;

        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie).context("invalid session cookie")?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self::new(client, endpoint))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn send(&self, request: RequestBuilder) -> Result<SettingsRecord, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::transport(e.to_string()))?;

        if !status.is_success() {
            let error = error_for_status(status, &body);
            tracing::debug!(status = status.as_u16(), error = %error, "settings endpoint returned an error");
            return Err(error);
        }

        let dto: SettingsDto =
            serde_json::from_str(&body).map_err(|e| GatewayError::malformed(e.to_string()))?;
        SettingsRecord::try_from(dto)
    }
}

/// Join `path` under `base`, keeping any path prefix `base` already carries
fn settings_endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let prefixed = format!("{}/", base.path());
        base.set_path(&prefixed);
    }
    base.join(path.trim_start_matches('/'))
}

#[async_trait]
impl RemoteSettingsGateway for HttpSettingsGateway {
    async fn fetch(&self) -> Result<SettingsRecord, GatewayError> {
        self.send(self.client.get(self.endpoint.clone())).await
    }

    async fn save(&self, patch: &SettingsPatch) -> Result<SettingsRecord, GatewayError> {
        let request = SaveSettingsRequest::try_from(patch)?;
        self.send(self.client.post(self.endpoint.clone()).json(&request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(base: &str, path: &str) -> String {
        settings_endpoint(&Url::parse(base).unwrap(), path)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_endpoint_at_host_root() {
        assert_eq!(
            endpoint("http://localhost:3000", "/api/user-settings"),
            "http://localhost:3000/api/user-settings"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        assert_eq!(
            endpoint("https://host/app", "/api/user-settings"),
            "https://host/app/api/user-settings"
        );
        assert_eq!(
            endpoint("https://host/app/", "api/user-settings"),
            "https://host/app/api/user-settings"
        );
    }

    #[test]
    fn test_from_config_uses_prefixed_endpoint() {
        let config = GatewayConfig {
            base_url: Url::parse("https://learn.example.com/v2").unwrap(),
            ..GatewayConfig::default()
        };
        let gateway = HttpSettingsGateway::from_config(&config).unwrap();
        assert_eq!(
            gateway.endpoint().as_str(),
            "https://learn.example.com/v2/api/user-settings"
        );
    }
}
