use serde::Deserialize;

/// Untrusted, loosely-typed candidate as reported by one provider.
///
/// Every field is optional and stringly on purpose: upstreams disagree about
/// field names, number-vs-string episode encoding, and quality labels. The
/// normalizer is the only place this shape is converted into the canonical
/// [`crate::models::NormalizedSource`]; nothing downstream touches it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCandidate {
    pub provider: Option<String>,

    /// Number or string; both are seen in the wild.
    pub episode: Option<serde_json::Value>,

    pub source_url: Option<String>,

    /// Alternate field name some upstreams use for the same thing.
    pub url: Option<String>,

    pub quality: Option<String>,

    pub title: Option<String>,

    pub priority: Option<i32>,

    /// Metadata-only providers mark placeholders inactive explicitly.
    pub active: Option<bool>,
}

impl RawCandidate {
    /// The URL field, whichever alias the upstream used.
    #[must_use]
    pub fn any_url(&self) -> Option<&str> {
        self.source_url.as_deref().or(self.url.as_deref())
    }
}
