//! HTTP client for the STS terminology service

use crate::api::endpoints;
use crate::error::Result;
use crate::models::RawTermRecord;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

/// Default timeout for STS requests in seconds.
/// Can be overridden via DATAHUB_STS_TIMEOUT_SECS environment variable.
/// Whole-model responses are large, so this is generous.
pub const DEFAULT_STS_TIMEOUT_SECS: u64 = 300;

/// Client for the STS "all properties" endpoints
#[derive(Debug, Clone)]
pub struct StsClient {
    client: Client,
    base_url: String,
}

impl StsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("datahub-puller/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Create a client whose timeout comes from DATAHUB_STS_TIMEOUT_SECS
    pub fn with_env_timeout(base_url: impl Into<String>) -> Result<Self> {
        let timeout_secs = std::env::var("DATAHUB_STS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_STS_TIMEOUT_SECS);

        Self::new(base_url, Duration::from_secs(timeout_secs))
    }

    /// Properties URLs for the given models on this client's base URL
    pub fn model_urls(&self, models: &[String]) -> Vec<String> {
        endpoints::model_properties_urls(&self.base_url, models)
    }

    /// Fetch the raw property records served at one URL
    pub async fn fetch(&self, url: &str) -> Result<Vec<RawTermRecord>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let records: Vec<RawTermRecord> = response.json().await?;
        debug!("Fetched {} records from {}", records.len(), url);
        Ok(records)
    }

    /// Fetch every URL in turn
    ///
    /// Yields one entry per URL. A failed request is logged and becomes
    /// `None`, so one broken model does not hide the others.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<Option<Vec<RawTermRecord>>> {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            info!("Retrieving properties from {}", url);
            match self.fetch(url).await {
                Ok(records) => results.push(Some(records)),
                Err(e) => {
                    error!(url = %url, error = %e, "Failed to retrieve properties from STS");
                    results.push(None);
                }
            }
        }
        results
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_creation() {
        let client = StsClient::new("http://localhost:8000", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.model_urls(&["CDS".to_string()]),
            vec!["http://localhost:8000/CDS"]
        );
    }

    #[test]
    #[serial]
    fn test_env_timeout_ignores_garbage() {
        std::env::set_var("DATAHUB_STS_TIMEOUT_SECS", "not-a-number");
        let client = StsClient::with_env_timeout("http://sts");
        std::env::remove_var("DATAHUB_STS_TIMEOUT_SECS");
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_one_slot_per_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/terms/CDS"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"property": "p", "model": "CDS", "version": "1.0", "permissibleValues": []}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/terms/BROKEN"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/terms/GARBLED"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client =
            StsClient::new(format!("{}/terms", server.uri()), Duration::from_secs(5)).unwrap();
        let urls = client.model_urls(&[
            "CDS".to_string(),
            "BROKEN".to_string(),
            "GARBLED".to_string(),
        ]);

        let results = client.fetch_all(&urls).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().map(Vec::len), Some(1));
        assert!(results[1].is_none());
        assert!(results[2].is_none());
    }
}
