use crate::quality::Quality;

/// Canonical, validated source shape produced by the normalizer.
///
/// This is the trusted schema: episode and provider are guaranteed present,
/// the quality sits on the ladder, the title is non-empty, and the priority
/// is resolved. It is not yet persisted; the reconciliation layer decides
/// insert-vs-merge against the `sources` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSource {
    pub provider: String,
    pub episode: i32,
    pub source_url: String,
    pub quality: Quality,
    pub title: String,
    pub priority: i32,
    pub active: bool,
}

impl NormalizedSource {
    /// True for metadata-only placeholders that carry no playable URL.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.source_url.is_empty()
    }
}
