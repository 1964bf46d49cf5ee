use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::entities::catalog_item;
use crate::models::RawCandidate;

pub const NAME: &str = "tvmaze";

const TVMAZE_API: &str = "https://api.tvmaze.com";

const PRIORITY: i32 = 5;
const MAX_RETRIES: u32 = 2;

#[derive(Debug, Deserialize)]
struct TvmazeEpisode {
    number: Option<i32>,
    name: Option<String>,
}

/// Metadata-only provider: it knows which episodes exist but serves no
/// streams. Its candidates are inactive placeholders with empty URLs, which
/// keeps episode rows visible even before a stream provider has seen them.
#[derive(Clone)]
pub struct TvmazeProvider {
    client: Client,
    base_url: String,
}

impl Default for TvmazeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TvmazeProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_shared_client(Client::new())
    }

    #[must_use]
    pub fn with_shared_client(client: Client) -> Self {
        Self {
            client,
            base_url: TVMAZE_API.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl super::Provider for TvmazeProvider {
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
        let tvmaze_id = item
            .tvmaze_id
            .ok_or_else(|| anyhow::anyhow!("Catalog item {} has no TVMaze id", item.id))?;

        let url = format!("{}/shows/{}/episodes", self.base_url, tvmaze_id);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("TVMaze API error: {} - {}", status, body));
        }

        let episodes: Vec<TvmazeEpisode> = response.json().await?;

        let candidates = episodes
            .into_iter()
            .filter_map(|ep| {
                let number = ep.number?;
                Some(RawCandidate {
                    provider: Some(NAME.to_string()),
                    episode: Some(serde_json::Value::from(number)),
                    source_url: None,
                    url: None,
                    quality: None,
                    title: ep.name,
                    priority: None,
                    active: Some(false),
                })
            })
            .collect();

        Ok(candidates)
    }
}
