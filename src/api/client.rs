use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{AnalysisResponse, PricesResponse, ServicesResponse, Strategy, TankResponse};

/// Client for the site mock API.
///
/// Every operation issues exactly one request. Any failure, whether a
/// connection error, timeout, non-2xx status, or unparsable body, collapses
/// to `None`. Callers never see a distinguishable error; failures land in
/// the error log.
#[derive(Clone)]
pub struct SiteClient {
    client: Client,
    base_url: String,
}

impl SiteClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .unwrap(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_prices(&self, site_id: &str) -> Option<PricesResponse> {
        swallow(
            self.get_json(&format!("/api/site/{}/prices", site_id)).await,
            "prices",
        )
    }

    pub async fn fetch_analysis(&self, site_id: &str) -> Option<AnalysisResponse> {
        swallow(
            self.get_json(&format!("/api/site/{}/analysis", site_id)).await,
            "analysis",
        )
    }

    pub async fn fetch_tank(&self, site_id: &str) -> Option<TankResponse> {
        swallow(
            self.get_json(&format!("/api/site/{}/tank", site_id)).await,
            "tank",
        )
    }

    pub async fn fetch_services(&self, site_id: &str) -> Option<ServicesResponse> {
        swallow(
            self.get_json(&format!("/api/site/{}/services", site_id)).await,
            "services",
        )
    }

    pub async fn set_strategy(&self, site_id: &str, strategy: Strategy) -> Option<Value> {
        let body = serde_json::json!({ "strategy": strategy });
        swallow(
            self.post_json(&format!("/api/site/{}/strategy", site_id), Some(body))
                .await,
            "strategy",
        )
    }

    pub async fn sync_site(&self, site_id: &str) -> Option<Value> {
        swallow(
            self.post_json(&format!("/api/site/{}/sync", site_id), None).await,
            "sync",
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to reach site API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Site API error {}: {}", status, body);
        }

        let text = resp.text().await.context("Failed to read response body")?;
        match serde_json::from_str(&text) {
            Ok(v) => Ok(v),
            Err(e) => {
                anyhow::bail!(
                    "Failed to parse {}: {} | response: {}",
                    path,
                    e,
                    body_excerpt(&text)
                );
            }
        }
    }

    async fn post_json(&self, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);

        let mut req = self
            .client
            .post(&url)
            .header("Accept", "application/json");
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await.context("Failed to reach site API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Site API error {}: {}", status, body);
        }

        resp.json().await.context("Failed to parse acknowledgement")
    }
}

/// First ~300 bytes of a body for the error log, cut back to a char
/// boundary so a multibyte character at the limit cannot panic the slice.
fn body_excerpt(text: &str) -> &str {
    let mut end = text.len().min(300);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn swallow<T>(res: Result<T>, what: &str) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(e) => {
            crate::app::log_error(&format!("{}: {:#}", what, e));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_api_collapses_to_none() {
        // Port 9 (discard) refuses immediately on loopback.
        let client = SiteClient::new("http://127.0.0.1:9");
        assert!(client.fetch_prices("holiday-3851").await.is_none());
        assert!(client.sync_site("holiday-3851").await.is_none());
    }

    #[test]
    fn excerpt_backs_off_to_a_char_boundary() {
        let body = "a".repeat(299) + "\u{e9}\u{e9}";
        // Byte 300 falls inside the first two-byte char; the cut lands before it.
        assert_eq!(body_excerpt(&body), "a".repeat(299));

        assert_eq!(body_excerpt("short"), "short");
        assert_eq!(body_excerpt(""), "");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = SiteClient::new("http://localhost:8787/");
        assert_eq!(client.base_url(), "http://localhost:8787");
    }
}
