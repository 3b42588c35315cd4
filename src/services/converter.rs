use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Converts an HTML fragment into Markdown.
#[async_trait]
pub trait ContentConverter: Send + Sync {
    async fn to_markdown(&self, html: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<String>,
}

/// Client for the remote turndown service (`POST /convert`).
pub struct RemoteConverter {
    client: Client,
    endpoint: String,
}

impl RemoteConverter {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/convert", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ContentConverter for RemoteConverter {
    async fn to_markdown(&self, html: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/html")
            .body(html.to_string())
            .send()
            .await
            .map_err(|e| AppError::Conversion(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Conversion(e.to_string()))?;

        markdown_from_response(status, &body)
    }
}

fn markdown_from_response(status: StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        return Err(AppError::Conversion(format!("HTTP {}: {}", status, body.trim())));
    }

    let parsed: ConvertResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Conversion(format!("malformed response: {}", e)))?;

    if parsed.code != 0 {
        return Err(AppError::Conversion(format!(
            "converter returned code {}: {}",
            parsed.code, parsed.message
        )));
    }

    parsed
        .data
        .ok_or_else(|| AppError::Conversion("converter returned no data".to_string()))
}

/// In-process conversion through html2text, for setups without the remote
/// service.
pub struct LocalConverter {
    width: usize,
}

impl LocalConverter {
    pub fn new() -> Self {
        Self { width: 100 }
    }
}

impl Default for LocalConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentConverter for LocalConverter {
    async fn to_markdown(&self, html: &str) -> Result<String> {
        html2text::from_read(html.as_bytes(), self.width)
            .map(|text| text.trim_end().to_string())
            .map_err(|e| AppError::Conversion(e.to_string()))
    }
}
