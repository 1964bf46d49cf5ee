use serde::{Deserialize, Serialize};

/// Canonical quality ladder for playable sources.
///
/// Variant order is the ranking order: later variants are higher quality,
/// so the derived `Ord` gives the tie-break ordinal directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Quality {
    #[serde(rename = "360p")]
    Q360p,
    #[default]
    #[serde(rename = "480p")]
    Q480p,
    #[serde(rename = "720p")]
    Q720p,
    #[serde(rename = "1080p")]
    Q1080p,
    #[serde(rename = "1440p")]
    Q1440p,
    #[serde(rename = "2160p")]
    Q2160p,
}

impl Quality {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Q360p => "360p",
            Self::Q480p => "480p",
            Self::Q720p => "720p",
            Self::Q1080p => "1080p",
            Self::Q1440p => "1440p",
            Self::Q2160p => "2160p",
        }
    }

    /// Strict parse of a canonical label ("720p", "1080p", ...).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "360p" | "360" => Some(Self::Q360p),
            "480p" | "480" => Some(Self::Q480p),
            "720p" | "720" => Some(Self::Q720p),
            "1080p" | "1080" => Some(Self::Q1080p),
            "1440p" | "1440" => Some(Self::Q1440p),
            "2160p" | "2160" => Some(Self::Q2160p),
            _ => None,
        }
    }

    /// Maps free-form provider labels onto the ladder.
    ///
    /// Unrecognized values coerce to 480p rather than persisting verbatim.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        if let Some(q) = Self::parse(raw) {
            return q;
        }

        match raw.trim().to_lowercase().as_str() {
            "low" => Self::Q360p,
            "sd" => Self::Q480p,
            "medium" | "hd" | "hdrip" => Self::Q720p,
            "high" | "fullhd" | "fhd" => Self::Q1080p,
            "2k" | "qhd" => Self::Q1440p,
            "4k" | "uhd" | "ultrahd" => Self::Q2160p,
            _ => Self::default(),
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_ordering() {
        assert!(Quality::Q2160p > Quality::Q1440p);
        assert!(Quality::Q1080p > Quality::Q720p);
        assert!(Quality::Q360p < Quality::Q480p);
    }

    #[test]
    fn test_parse_canonical() {
        assert_eq!(Quality::parse("1080p"), Some(Quality::Q1080p));
        assert_eq!(Quality::parse(" 720P "), Some(Quality::Q720p));
        assert_eq!(Quality::parse("2160"), Some(Quality::Q2160p));
        assert_eq!(Quality::parse("potato"), None);
    }

    #[test]
    fn test_coerce_synonyms() {
        assert_eq!(Quality::coerce("low"), Quality::Q360p);
        assert_eq!(Quality::coerce("HD"), Quality::Q720p);
        assert_eq!(Quality::coerce("FullHD"), Quality::Q1080p);
        assert_eq!(Quality::coerce("fhd"), Quality::Q1080p);
        assert_eq!(Quality::coerce("4K"), Quality::Q2160p);
        assert_eq!(Quality::coerce("qhd"), Quality::Q1440p);
    }

    #[test]
    fn test_coerce_unknown_defaults() {
        assert_eq!(Quality::coerce(""), Quality::Q480p);
        assert_eq!(Quality::coerce("cam-rip"), Quality::Q480p);
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&Quality::Q1080p).unwrap();
        assert_eq!(json, "\"1080p\"");
        let back: Quality = serde_json::from_str("\"360p\"").unwrap();
        assert_eq!(back, Quality::Q360p);
    }
}
