use anyhow::Result;
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;

use crate::entities::catalog_item;
use crate::models::RawCandidate;

pub const NAME: &str = "filemoon";

const FILEMOON_BASE: &str = "https://filemoon.sx";

const PRIORITY: i32 = 3;
const MAX_RETRIES: u32 = 2;

/// Consolidates regexes for the embed listing markup to avoid per-call overhead.
struct EpisodeListRegex {
    block: Regex,
    episode: Regex,
    src: Regex,
    res: Regex,
    label: Regex,
}

impl EpisodeListRegex {
    fn get() -> Option<&'static Self> {
        static INSTANCE: OnceLock<Option<EpisodeListRegex>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                Some(Self {
                    block: Regex::new(r#"(?s)<li class="ep-item"(.*?)</li>"#).ok()?,
                    episode: Regex::new(r#"data-episode="([^"]*)""#).ok()?,
                    src: Regex::new(r#"data-src="([^"]*)""#).ok()?,
                    res: Regex::new(r#"data-res="([^"]*)""#).ok()?,
                    label: Regex::new(r"<span[^>]*>([^<]*)</span>").ok()?,
                })
            })
            .as_ref()
    }
}

fn extract_attr(block: &str, re: &Regex) -> String {
    re.captures(block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn parse_block(block: &str) -> Option<RawCandidate> {
    let re = EpisodeListRegex::get()?;

    let episode = extract_attr(block, &re.episode);
    if episode.is_empty() {
        return None;
    }

    let src = extract_attr(block, &re.src);
    let res = extract_attr(block, &re.res);
    let label = html_escape::decode_html_entities(&extract_attr(block, &re.label)).to_string();

    Some(RawCandidate {
        provider: Some(NAME.to_string()),
        episode: Some(serde_json::Value::String(episode)),
        // Filemoon emits protocol-relative embed URLs; the normalizer
        // prefixes the scheme.
        source_url: Some(src),
        url: None,
        quality: if res.is_empty() { None } else { Some(res) },
        title: if label.is_empty() { None } else { Some(label) },
        priority: None,
        active: None,
    })
}

fn parse_episode_list(html: &str) -> Vec<RawCandidate> {
    let Some(re) = EpisodeListRegex::get() else {
        return Vec::new();
    };
    re.block
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .filter_map(|m| parse_block(m.as_str()))
        .collect()
}

/// Embed host scraped from its public episode listing markup.
#[derive(Clone)]
pub struct FilemoonProvider {
    client: Client,
    base_url: String,
}

impl Default for FilemoonProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FilemoonProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::with_shared_client(Client::new())
    }

    #[must_use]
    pub fn with_shared_client(client: Client) -> Self {
        Self {
            client,
            base_url: FILEMOON_BASE.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl super::Provider for FilemoonProvider {
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

        let url = format!("{}/e/list/{}", self.base_url, tmdb_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow::anyhow!("Filemoon listing error: {}", status));
        }

        let html = response.text().await?;
        Ok(parse_episode_list(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <ul class="episodes">
          <li class="ep-item" data-episode="1" data-src="//filemoon.sx/e/abc123" data-res="720">
            <span class="ep-title">The Beginning &amp; The End</span>
          </li>
          <li class="ep-item" data-episode="2" data-src="//filemoon.sx/e/def456" data-res="1080">
            <span class="ep-title">Second Episode</span>
          </li>
          <li class="ep-item" data-src="//filemoon.sx/e/orphan">
            <span class="ep-title">No episode attribute</span>
          </li>
        </ul>
    "#;

    #[test]
    fn test_parse_episode_list() {
        let candidates = parse_episode_list(SAMPLE);
        assert_eq!(candidates.len(), 2);

        assert_eq!(
            candidates[0].episode,
            Some(serde_json::Value::String("1".to_string()))
        );
        assert_eq!(
            candidates[0].source_url.as_deref(),
            Some("//filemoon.sx/e/abc123")
        );
        assert_eq!(candidates[0].quality.as_deref(), Some("720"));
        assert_eq!(
            candidates[0].title.as_deref(),
            Some("The Beginning & The End")
        );
    }

    #[test]
    fn test_parse_empty_markup() {
        assert!(parse_episode_list("<html></html>").is_empty());
    }
}
