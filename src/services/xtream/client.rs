//! Xtream panel API client.
//!
//! One HTTP GET per panel action. Responses are passed through as raw JSON:
//! the panel's shape varies too much between versions to type here, and the
//! browser consumes it as-is anyway. No retries, no caching; a failure
//! surfaces immediately to the caller.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::types::Credentials;
use super::urls;
use crate::error::AppError;

pub struct PanelClient {
    http: Client,
    creds: Credentials,
}

impl PanelClient {
    /// Create a client for one request's credentials.
    pub fn new(creds: Credentials, user_agent: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .danger_accept_invalid_certs(true) // Many panels run self-signed certs
            .build()?;
        Ok(Self { http, creds })
    }

    /// Shared fetch contract: GET the panel API URL, surface non-2xx as an
    /// upstream error with a truncated body snippet, parse 2xx bodies as
    /// JSON and return them verbatim.
    async fn fetch(&self, extra: &[(&str, &str)]) -> Result<Value, AppError> {
        let url = urls::build_panel_api_url(
            &self.creds.base_url,
            &self.creds.username,
            &self.creds.password,
            extra,
        )?;

        debug!(
            "panel request: action={}",
            extra
                .iter()
                .find(|(key, _)| *key == "action")
                .map(|(_, value)| *value)
                .unwrap_or("account_info")
        );

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(status.as_u16(), &body));
        }
        Ok(response.json::<Value>().await?)
    }

    /// Account and server info (`player_api.php` with no action).
    pub async fn get_account_info(&self) -> Result<Value, AppError> {
        self.fetch(&[]).await
    }

    pub async fn get_live_categories(&self) -> Result<Value, AppError> {
        self.fetch(&[("action", "get_live_categories")]).await
    }

    pub async fn get_live_streams(&self) -> Result<Value, AppError> {
        self.fetch(&[("action", "get_live_streams")]).await
    }

    pub async fn get_vod_categories(&self) -> Result<Value, AppError> {
        self.fetch(&[("action", "get_vod_categories")]).await
    }

    pub async fn get_vod_streams(&self) -> Result<Value, AppError> {
        self.fetch(&[("action", "get_vod_streams")]).await
    }

    pub async fn get_series_categories(&self) -> Result<Value, AppError> {
        self.fetch(&[("action", "get_series_categories")]).await
    }

    pub async fn get_series_list(&self) -> Result<Value, AppError> {
        self.fetch(&[("action", "get_series")]).await
    }

    /// Short EPG for one stream (roughly the next few hours of listings).
    pub async fn get_short_epg(&self, stream_id: &str, limit: u32) -> Result<Value, AppError> {
        let limit = limit.to_string();
        self.fetch(&[
            ("action", "get_short_epg"),
            ("stream_id", stream_id),
            ("limit", &limit),
        ])
        .await
    }

    /// Fetch the XMLTV guide endpoint, returning the raw response so the
    /// caller can stream the body through without buffering it.
    pub async fn fetch_xmltv(&self) -> Result<reqwest::Response, AppError> {
        let url = urls::build_xmltv_url(
            &self.creds.base_url,
            &self.creds.username,
            &self.creds.password,
        )?;
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(status.as_u16(), &body));
        }
        Ok(response)
    }
}
