use std::cmp::Ordering;

use crate::models::NormalizedSource;
use crate::quality::Quality;

/// Ranking comparator: priority ascending, then quality descending.
#[must_use]
pub fn compare(a_priority: i32, a_quality: Quality, b_priority: i32, b_quality: Quality) -> Ordering {
    a_priority.cmp(&b_priority).then(b_quality.cmp(&a_quality))
}

/// Orders candidates for persistence and response. The sort is stable, so
/// candidates equal on both keys keep their discovery order.
pub fn rank(sources: &mut [NormalizedSource]) {
    sources.sort_by(|a, b| compare(a.priority, a.quality, b.priority, b.quality));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(provider: &str, priority: i32, quality: Quality) -> NormalizedSource {
        NormalizedSource {
            provider: provider.to_string(),
            episode: 1,
            source_url: format!("https://{provider}.example/1"),
            quality,
            title: "Episode 1".to_string(),
            priority,
            active: true,
        }
    }

    #[test]
    fn test_priority_dominates_quality() {
        let mut sources = vec![
            src("b", 2, Quality::Q2160p),
            src("a", 1, Quality::Q360p),
        ];
        rank(&mut sources);
        assert_eq!(sources[0].provider, "a");
    }

    #[test]
    fn test_quality_breaks_priority_ties() {
        // A 720p and B 1080p at equal priority -> B first.
        let mut sources = vec![
            src("a", 1, Quality::Q720p),
            src("b", 1, Quality::Q1080p),
        ];
        rank(&mut sources);
        assert_eq!(sources[0].provider, "b");
        assert_eq!(sources[1].provider, "a");
    }

    #[test]
    fn test_equal_keys_keep_discovery_order() {
        let mut sources = vec![
            src("first", 1, Quality::Q720p),
            src("second", 1, Quality::Q720p),
            src("third", 1, Quality::Q720p),
        ];
        rank(&mut sources);
        let order: Vec<_> = sources.iter().map(|s| s.provider.as_str()).collect();
        assert_eq!(order, ["first", "second", "third"]);
    }

    #[test]
    fn test_sorting_sorted_input_is_noop() {
        let mut sources = vec![
            src("a", 1, Quality::Q2160p),
            src("b", 1, Quality::Q720p),
            src("c", 3, Quality::Q1080p),
        ];
        rank(&mut sources);
        let once: Vec<_> = sources.iter().map(|s| s.provider.clone()).collect();
        rank(&mut sources);
        let twice: Vec<_> = sources.iter().map(|s| s.provider.clone()).collect();
        assert_eq!(once, twice);
    }
}
