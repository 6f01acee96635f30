use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::UpstreamError;
use super::{ContentProvider, EditionRecord, UnitResponse};

/// Client for the api.alquran.cloud edition API
#[derive(Debug, Clone)]
pub struct AlQuranCloud {
    /// Base URL, e.g. "https://api.alquran.cloud/v1"
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Envelope returned by the edition endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct EditionEnvelope {
    /// Status code mirrored in the payload
    pub code: u16,
    /// Status text, e.g. "OK"
    #[serde(default)]
    pub status: String,
    /// One record per requested edition on success, an error string otherwise
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One edition record of the envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct AyahRecord {
    /// Unit text
    pub text: String,
    /// Audio URL for voice editions
    #[serde(default)]
    pub audio: Option<String>,
    /// Edition metadata
    #[serde(default)]
    pub edition: Option<EditionInfo>,
}

/// Edition metadata of a record
#[derive(Debug, Serialize, Deserialize)]
pub struct EditionInfo {
    pub identifier: String,
}

impl AlQuranCloud {
    /// Create a client for the given base URL
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
        }
    }

    /// URL of the edition lookup for one unit
    pub fn unit_url(&self, collection: u32, unit: u32, editions: &[&str]) -> String {
        format!("{}/ayah/{}:{}/editions/{}", self.base_url, collection, unit, editions.join(","))
    }

    /// Turn a raw response body into a unit response
    pub fn parse_envelope(body: &str, editions: &[&str]) -> Result<UnitResponse, UpstreamError> {
        let envelope: EditionEnvelope = serde_json::from_str(body)
            .map_err(|e| UpstreamError::ParseError(format!("invalid edition envelope: {}", e)))?;

        if !(200..300).contains(&envelope.code) {
            return Ok(UnitResponse { code: envelope.code, records: Vec::new() });
        }

        let records: Vec<AyahRecord> = serde_json::from_value(envelope.data)
            .map_err(|e| UpstreamError::ParseError(format!("invalid edition records: {}", e)))?;

        let records = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| EditionRecord {
                edition: record
                    .edition
                    .map(|info| info.identifier)
                    .or_else(|| editions.get(i).map(|e| e.to_string()))
                    .unwrap_or_default(),
                text: record.text,
                audio: record.audio.filter(|url| !url.trim().is_empty()),
            })
            .collect();

        Ok(UnitResponse { code: envelope.code, records })
    }
}

#[async_trait]
impl ContentProvider for AlQuranCloud {
    async fn fetch_unit(&self, collection: u32, unit: u32, editions: &[&str]) -> Result<UnitResponse, UpstreamError> {
        let url = self.unit_url(collection, unit, editions);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // The service mirrors the status in the body; keep whatever it says
            return match Self::parse_envelope(&body, editions) {
                Ok(parsed) if !parsed.is_success() => Ok(parsed),
                _ => Ok(UnitResponse { code: status.as_u16(), records: Vec::new() }),
            };
        }

        Self::parse_envelope(&body, editions)
    }

    async fn fetch_audio(&self, url: &str) -> Result<Bytes, UpstreamError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            error!("Audio download failed with status {}: {}", status, url);
            return Err(UpstreamError::ApiError {
                status_code: status.as_u16(),
                message: format!("audio download failed for {}", url),
            });
        }

        Ok(response.bytes().await?)
    }
}
