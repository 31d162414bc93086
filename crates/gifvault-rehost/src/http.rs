use async_trait::async_trait;
use gifvault_core::{RehostError, RehostGateway};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, RehostError>;

/// Settings for [`HttpRehostGateway`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct GatewayConfig {
    /// Base URL of the upload API, e.g. `https://media.example.com/api`.
    pub upload_base_url: String,
    /// Transport-level ceiling for any single request. The per-operation
    /// deadlines enforced by [`Rehoster`](crate::Rehoster) are shorter.
    #[builder(default = Duration::from_secs(15))]
    pub request_timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest<'a> {
    url: &'a str,
    media_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    cdn_url: String,
}

/// A [`RehostGateway`] speaking JSON over HTTP.
///
/// Uploads are `POST {base}/upload` with `{"url", "mediaType"}` answered by
/// `{"cdnUrl"}`; existence checks are plain `HEAD` requests against the CDN
/// URL.
#[derive(Debug, Clone)]
pub struct HttpRehostGateway {
    client: Client,
    upload_url: String,
}

impl HttpRehostGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RehostError::Upload(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, &config))
    }

    pub fn with_client(client: Client, config: &GatewayConfig) -> Self {
        Self {
            client,
            upload_url: format!("{}/upload", config.upload_base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl RehostGateway for HttpRehostGateway {
    async fn upload(&self, source_url: &str, media_type: &str) -> Result<String> {
        trace!(source_url, media_type, "uploading to CDN");

        let response = self
            .client
            .post(&self.upload_url)
            .json(&UploadRequest {
                url: source_url,
                media_type,
            })
            .send()
            .await
            .map_err(|e| RehostError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RehostError::Upload(format!("status {status}: {body}")));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| RehostError::Upload(format!("invalid upload response: {e}")))?;

        debug!(source_url, cdn_url = %uploaded.cdn_url, "CDN accepted upload");
        Ok(uploaded.cdn_url)
    }

    async fn exists(&self, url: &str) -> Result<bool> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| RehostError::Verify(e.to_string()))?;

        trace!(url, status = %response.status(), "CDN existence check");
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_request_uses_camel_case() {
        let json = serde_json::to_value(UploadRequest {
            url: "https://origin.test/a.gif",
            media_type: "gif",
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"url": "https://origin.test/a.gif", "mediaType": "gif"})
        );
    }

    #[test]
    fn upload_response_reads_cdn_url() {
        let response: UploadResponse =
            serde_json::from_str(r#"{"cdnUrl": "https://cdn.test/a.gif", "size": 12}"#).unwrap();
        assert_eq!(response.cdn_url, "https://cdn.test/a.gif");
    }

    #[test]
    fn upload_url_is_joined_once() {
        let config = GatewayConfig::builder()
            .upload_base_url("https://media.test/api/".to_string())
            .build();
        let gateway = HttpRehostGateway::new(config).unwrap();
        assert_eq!(gateway.upload_url, "https://media.test/api/upload");
    }
}
