use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::constants;

/// Lightweight liveness checker for source URLs.
///
/// A probe is a HEAD request with a bounded timeout: no body transfer, no
/// retries. Network-level failures read as "unavailable", never as errors.
#[derive(Clone)]
pub struct AvailabilityProber {
    client: Client,
    timeout: Duration,
}

impl AvailabilityProber {
    #[must_use]
    pub const fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    #[must_use]
    pub fn with_shared_client(client: Client) -> Self {
        Self::new(client, constants::probe::TIMEOUT)
    }

    /// Empty URLs are unavailable by definition; no network call is made.
    /// Any status in `[200, 400)` counts as available. 5xx responses are
    /// transient upstream trouble but still read as unavailable here; the
    /// caller may re-probe later.
    pub async fn probe(&self, url: &str) -> bool {
        if url.trim().is_empty() {
            return false;
        }

        match self
            .client
            .head(url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                (200..400).contains(&status)
            }
            Err(err) => {
                debug!("Probe failed for {}: {}", url, err);
                false
            }
        }
    }

    /// Fans out one probe per target with independent timeouts and joins on
    /// all of them.
    pub async fn probe_all(&self, targets: &[(i32, String)]) -> HashMap<i32, bool> {
        let tasks = targets
            .iter()
            .map(|(id, url)| async move { (*id, self.probe(url).await) });

        futures::future::join_all(tasks).await.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prober() -> AvailabilityProber {
        AvailabilityProber::new(Client::new(), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_empty_url_is_unavailable_without_network() {
        assert!(!prober().probe("").await);
        assert!(!prober().probe("   ").await);
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_unavailable() {
        // .invalid is reserved and never resolves (RFC 2606).
        assert!(!prober().probe("https://host.invalid/stream").await);
    }

    #[tokio::test]
    async fn test_probe_all_empty_set() {
        let verdicts = prober().probe_all(&[]).await;
        assert!(verdicts.is_empty());
    }
}
