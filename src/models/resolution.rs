use serde::{Deserialize, Serialize};

use crate::constants;
use crate::quality::Quality;

/// One resolution request as consumed from the routing layer.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub catalog_item_id: i32,
    pub episode: i32,
    pub quality: Option<Quality>,
    /// Subset of known provider names; `None` means all registered providers.
    pub providers: Option<Vec<String>>,
    pub limit: usize,
    pub verify: bool,
    pub bypass_cache: bool,
}

impl ResolutionRequest {
    #[must_use]
    pub fn new(catalog_item_id: i32, episode: i32) -> Self {
        Self {
            catalog_item_id,
            episode,
            quality: None,
            providers: None,
            limit: constants::resolver::DEFAULT_RESULT_LIMIT,
            verify: true,
            bypass_cache: false,
        }
    }

    /// Deterministic cache key over the fields that shape the response.
    ///
    /// The provider subset is deliberately excluded: the cached answer is the
    /// reconciled state of the episode, which any provider subset refreshes.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "resolve:{}:{}:{}:{}:{}",
            self.catalog_item_id,
            self.episode,
            self.quality.map_or("any", Quality::as_str),
            self.limit,
            self.verify,
        )
    }
}

/// Transient availability verdict attached to each returned source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Available,
    Unavailable,
}

/// Client-facing view of one persisted source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedSource {
    pub id: i32,
    pub episode: i32,
    pub source_url: String,
    pub quality: Quality,
    pub title: String,
    pub provider: String,
    pub priority: i32,
    pub status: SourceStatus,
    pub last_checked: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One provider failure surfaced alongside whatever candidates succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterFailure {
    pub provider: String,
    pub message: String,
    pub timestamp: String,
}

/// The fully resolved, status-annotated answer for one request.
///
/// This is what the result cache stores; `cached` is rewritten on the way
/// out of the cache, never persisted as `true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub episode: i32,
    pub sources: Vec<ResolvedSource>,
    pub errors: Vec<AdapterFailure>,
    pub cached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_deterministic() {
        let a = ResolutionRequest::new(7, 3);
        let b = ResolutionRequest::new(7, 3);
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_varies_by_filters() {
        let base = ResolutionRequest::new(7, 3);

        let mut filtered = ResolutionRequest::new(7, 3);
        filtered.quality = Some(Quality::Q1080p);
        assert_ne!(base.cache_key(), filtered.cache_key());

        let mut limited = ResolutionRequest::new(7, 3);
        limited.limit = 5;
        assert_ne!(base.cache_key(), limited.cache_key());

        let mut unverified = ResolutionRequest::new(7, 3);
        unverified.verify = false;
        assert_ne!(base.cache_key(), unverified.cache_key());
    }

    #[test]
    fn test_cache_key_ignores_provider_subset() {
        let all = ResolutionRequest::new(7, 3);
        let mut subset = ResolutionRequest::new(7, 3);
        subset.providers = Some(vec!["vidsrc".to_string()]);
        assert_eq!(all.cache_key(), subset.cache_key());
    }
}
