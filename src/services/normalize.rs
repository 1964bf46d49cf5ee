use tracing::debug;

use crate::constants;
use crate::models::{NormalizedSource, RawCandidate};
use crate::providers;
use crate::quality::Quality;

/// Converts the untrusted candidate bags into canonical sources, dropping
/// anything malformed. This is the only place provider output is trusted
/// into the schema.
#[must_use]
pub fn normalize_all(raw: &[RawCandidate]) -> Vec<NormalizedSource> {
    raw.iter().filter_map(normalize).collect()
}

#[must_use]
pub fn normalize(raw: &RawCandidate) -> Option<NormalizedSource> {
    let provider = raw.provider.as_deref().map(str::trim).unwrap_or_default();
    if provider.is_empty() {
        debug!("Rejecting candidate without provider");
        return None;
    }

    let Some(episode) = raw.episode.as_ref().and_then(parse_episode) else {
        debug!("Rejecting {} candidate with invalid episode number", provider);
        return None;
    };

    let explicitly_inactive = raw.active == Some(false);
    let Some(source_url) = coerce_url(raw.any_url(), explicitly_inactive) else {
        debug!(
            "Rejecting {} candidate for episode {} with unusable URL",
            provider, episode
        );
        return None;
    };

    let quality = raw
        .quality
        .as_deref()
        .map_or_else(Quality::default, Quality::coerce);

    let title = raw
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map_or_else(|| format!("Episode {episode}"), str::to_string);

    let priority = raw
        .priority
        .filter(|p| *p > 0)
        .or_else(|| providers::default_priority(provider))
        .unwrap_or(constants::providers::FALLBACK_PRIORITY);

    Some(NormalizedSource {
        provider: provider.to_string(),
        episode,
        source_url,
        quality,
        title,
        priority,
        active: !explicitly_inactive,
    })
}

/// Episode numbers arrive as JSON numbers or strings; anything that is not a
/// whole number `>= 1` is rejected.
fn parse_episode(value: &serde_json::Value) -> Option<i32> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    (1..=i64::from(i32::MAX)).contains(&n).then_some(n as i32)
}

/// Scheme-validates the URL, prefixing `https:` onto protocol-relative ones.
/// An empty URL is only acceptable for explicitly-inactive placeholders.
fn coerce_url(raw_url: Option<&str>, explicitly_inactive: bool) -> Option<String> {
    let trimmed = raw_url.unwrap_or_default().trim();

    if trimmed.is_empty() {
        return explicitly_inactive.then(String::new);
    }

    let absolute = if trimmed.starts_with("//") {
        format!("https:{trimmed}")
    } else {
        trimmed.to_string()
    };

    match url::Url::parse(&absolute) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(absolute),
        _ => None,
    }
}
