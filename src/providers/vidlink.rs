use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::entities::catalog_item;
use crate::models::RawCandidate;

pub const NAME: &str = "vidlink";

const VIDLINK_API: &str = "https://vidlink.pro/api";

const PRIORITY: i32 = 2;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
struct VidlinkResponse {
    data: Vec<VidlinkEntry>,
}

/// Vidlink reports episode numbers as strings and qualities as free-form
/// labels ("hd", "fullhd", ...); both go through untouched.
#[derive(Debug, Deserialize)]
struct VidlinkEntry {
    episode: serde_json::Value,
    file: String,
    label: Option<String>,
    name: Option<String>,
}

/// Secondary stream provider, looked up by title.
#[derive(Clone)]
pub struct VidlinkProvider {
    client: Client,
    base_url: String,
}

impl Default for VidlinkProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl VidlinkProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_shared_client(Client::new())
    }

    #[must_use]
    pub fn with_shared_client(client: Client) -> Self {
        Self {
            client,
            base_url: VIDLINK_API.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl super::Provider for VidlinkProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn max_retries(&self) -> u32 {
        MAX_RETRIES
    }

    async fn fetch(&self, item: &catalog_item::Model) -> Result<Vec<RawCandidate>> {
        let url = format!(
            "{}/lookup?title={}",
            self.base_url,
            urlencoding::encode(&item.title)
        );
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Vidlink API error: {} - {}", status, body));
        }

        let response: VidlinkResponse = response.json().await?;

        let candidates = response
            .data
            .into_iter()
            .map(|entry| RawCandidate {
                provider: Some(NAME.to_string()),
                episode: Some(entry.episode),
                source_url: None,
                url: Some(entry.file),
                quality: entry.label,
                title: entry.name,
                priority: None,
                active: None,
            })
            .collect();

        Ok(candidates)
    }
}
