use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::entities::catalog_item;
use crate::models::RawCandidate;

pub const NAME: &str = "vidsrc";

const VIDSRC_API: &str = "https://vidsrc.xyz/api";

const PRIORITY: i32 = 1;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
struct VidsrcResponse {
    result: Vec<VidsrcEpisode>,
}

#[derive(Debug, Deserialize)]
struct VidsrcEpisode {
    episode: serde_json::Value,
    title: Option<String>,
    #[serde(default)]
    streams: Vec<VidsrcStream>,
}

#[derive(Debug, Deserialize)]
struct VidsrcStream {
    url: String,
    quality: Option<String>,
}

/// Primary stream provider, addressed by TMDB id.
#[derive(Clone)]
pub struct VidsrcProvider {
    client: Client,
    base_url: String,
}

impl Default for VidsrcProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl VidsrcProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_shared_client(Client::new())
    }

    #[must_use]
    pub fn with_shared_client(client: Client) -> Self {
        Self {
            client,
            base_url: VIDSRC_API.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl super::Provider for VidsrcProvider {
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
        let tmdb_id = item
            .tmdb_id
            .ok_or_else(|| anyhow::anyhow!("Catalog item {} has no TMDB id", item.id))?;

        let url = format!("{}/tv/{}/episodes", self.base_url, tmdb_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Vidsrc API error: {} - {}", status, body));
        }

        let response: VidsrcResponse = response.json().await?;

        let mut candidates = Vec::new();
        for episode in response.result {
            for stream in episode.streams {
                candidates.push(RawCandidate {
                    provider: Some(NAME.to_string()),
                    episode: Some(episode.episode.clone()),
                    source_url: Some(stream.url),
                    url: None,
                    quality: stream.quality,
                    title: episode.title.clone(),
                    priority: None,
                    active: None,
                });
            }
        }

        Ok(candidates)
    }
}
