//! End-to-end tests for the resolution engine against an in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;

use vidarr::config::ResolverConfig;
use vidarr::db::Store;
use vidarr::entities::{catalog_item, source};
use vidarr::models::{RawCandidate, ResolutionRequest, SourceStatus};
use vidarr::providers::{Provider, ProviderRegistry};
use vidarr::quality::Quality;
use vidarr::services::{AvailabilityProber, ResolverService};

/// Provider that always returns the same scripted candidates and counts how
/// often it was asked.
struct StaticProvider {
    name: &'static str,
    priority: i32,
    candidates: Vec<RawCandidate>,
    calls: Arc<AtomicU32>,
}

impl StaticProvider {
    fn new(name: &'static str, priority: i32, candidates: Vec<RawCandidate>) -> Self {
        Self {
            name,
            priority,
            candidates,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl Provider for StaticProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn max_retries(&self) -> u32 {
        1
    }

    async fn fetch(&self, _item: &catalog_item::Model) -> Result<Vec<RawCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.clone())
    }
}

/// Provider that fails every attempt.
struct FailingProvider {
    name: &'static str,
}

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> i32 {
        9
    }

    fn max_retries(&self) -> u32 {
        1
    }

    async fn fetch(&self, _item: &catalog_item::Model) -> Result<Vec<RawCandidate>> {
        anyhow::bail!("upstream exploded")
    }
}

fn candidate(episode: i32, url: &str, quality: &str, priority: Option<i32>) -> RawCandidate {
    RawCandidate {
        episode: Some(json!(episode)),
        source_url: Some(url.to_string()),
        quality: Some(quality.to_string()),
        priority,
        ..RawCandidate::default()
    }
}

fn with_provider(name: &str, mut raw: RawCandidate) -> RawCandidate {
    raw.provider = Some(name.to_string());
    raw
}

async fn setup(
    providers: Vec<Arc<dyn Provider>>,
) -> (Store, catalog_item::Model, ResolverService) {
    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("in-memory store");

    let item = store
        .add_catalog_item("Test Show", Some(2024), Some(100), Some(200), Some(12))
        .await
        .expect("seed catalog item");

    let registry = Arc::new(ProviderRegistry::from_providers(providers));
    let prober = AvailabilityProber::new(reqwest::Client::new(), Duration::from_secs(1));
    let resolver = ResolverService::new(
        store.clone(),
        registry,
        prober,
        &ResolverConfig::default(),
    );

    (store, item, resolver)
}

fn request(item_id: i32, episode: i32) -> ResolutionRequest {
    let mut request = ResolutionRequest::new(item_id, episode);
    request.verify = false;
    request
}

#[tokio::test]
async fn test_partial_failure_keeps_survivors_ranked() {
    // A 720p prio 1, B 1080p prio 1, C throws -> [B, A] plus one error.
    let alpha = StaticProvider::new(
        "alpha",
        1,
        vec![with_provider(
            "alpha",
            candidate(1, "https://alpha.example/1", "720p", Some(1)),
        )],
    );
    let beta = StaticProvider::new(
        "beta",
        1,
        vec![with_provider(
            "beta",
            candidate(1, "https://beta.example/1", "1080p", Some(1)),
        )],
    );

    let (_store, item, resolver) = setup(vec![
        Arc::new(alpha),
        Arc::new(beta),
        Arc::new(FailingProvider { name: "gamma" }),
    ])
    .await;

    let outcome = resolver.resolve(request(item.id, 1)).await.unwrap();

    assert_eq!(outcome.sources.len(), 2);
    assert_eq!(outcome.sources[0].provider, "beta");
    assert_eq!(outcome.sources[0].quality, Quality::Q1080p);
    assert_eq!(outcome.sources[1].provider, "alpha");

    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].provider, "gamma");
    assert!(outcome.errors[0].message.contains("upstream exploded"));
}

#[tokio::test]
async fn test_reconciliation_is_idempotent() {
    let provider = StaticProvider::new(
        "alpha",
        1,
        vec![
            with_provider("alpha", candidate(1, "https://alpha.example/1", "720p", None)),
            with_provider(
                "alpha",
                candidate(1, "https://alpha.example/1-hd", "1080p", None),
            ),
        ],
    );

    let (store, item, resolver) = setup(vec![Arc::new(provider)]).await;

    let mut first = request(item.id, 1);
    first.bypass_cache = true;
    resolver.resolve(first.clone()).await.unwrap();

    let rows_after_first = store.sources_for_episode(item.id, 1, false).await.unwrap();
    let ids_first: Vec<i32> = rows_after_first.iter().map(|r| r.id).collect();

    resolver.resolve(first).await.unwrap();

    let rows_after_second = store.sources_for_episode(item.id, 1, false).await.unwrap();
    let ids_second: Vec<i32> = rows_after_second.iter().map(|r| r.id).collect();

    assert_eq!(rows_after_second.len(), 2);
    assert_eq!(ids_first, ids_second);
}

#[tokio::test]
async fn test_duplicate_identity_candidates_collapse() {
    // Same (provider, episode, quality) twice in one batch -> one row.
    let provider = StaticProvider::new(
        "alpha",
        1,
        vec![
            with_provider("alpha", candidate(1, "https://alpha.example/a", "720p", None)),
            with_provider("alpha", candidate(1, "https://alpha.example/b", "720p", None)),
        ],
    );

    let (store, item, resolver) = setup(vec![Arc::new(provider)]).await;
    resolver.resolve(request(item.id, 1)).await.unwrap();

    let rows = store.sources_for_episode(item.id, 1, false).await.unwrap();
    assert_eq!(rows.len(), 1);
    // Last write wins on the mutable fields.
    assert_eq!(rows[0].source_url, "https://alpha.example/b");
}

#[tokio::test]
async fn test_stale_source_is_deactivated() {
    let fresh = StaticProvider::new(
        "fresh",
        2,
        vec![with_provider(
            "fresh",
            candidate(1, "https://fresh.example/1", "720p", None),
        )],
    );

    let (store, item, resolver) = setup(vec![Arc::new(fresh)]).await;

    // A source from a provider that has since gone quiet, last seen well
    // outside the staleness window.
    let dead = vidarr::models::NormalizedSource {
        provider: "ghost".to_string(),
        episode: 1,
        source_url: "https://ghost.example/1".to_string(),
        quality: Quality::Q1080p,
        title: "Episode 1".to_string(),
        priority: 1,
        active: true,
    };
    store.upsert_source(item.id, &dead).await.unwrap();

    let ancient = (chrono::Utc::now() - chrono::Duration::days(30)).to_rfc3339();
    source::Entity::update_many()
        .col_expr(
            source::Column::LastChecked,
            sea_orm::sea_query::Expr::value(Some(ancient.clone())),
        )
        .col_expr(
            source::Column::CreatedAt,
            sea_orm::sea_query::Expr::value(ancient),
        )
        .filter(source::Column::Provider.eq("ghost"))
        .exec(&store.conn)
        .await
        .unwrap();

    let outcome = resolver.resolve(request(item.id, 1)).await.unwrap();

    // The ghost row flipped inactive and the fresh one is the only survivor.
    assert_eq!(outcome.sources.len(), 1);
    assert_eq!(outcome.sources[0].provider, "fresh");

    let all_rows = store.sources_for_episode(item.id, 1, false).await.unwrap();
    let ghost = all_rows.iter().find(|r| r.provider == "ghost").unwrap();
    assert!(!ghost.is_active);
}

#[tokio::test]
async fn test_cache_short_circuits_orchestrator() {
    let provider = StaticProvider::new(
        "alpha",
        1,
        vec![with_provider(
            "alpha",
            candidate(1, "https://alpha.example/1", "720p", None),
        )],
    );
    let calls = provider.calls.clone();

    let (_store, item, resolver) = setup(vec![Arc::new(provider)]).await;

    let first = resolver.resolve(request(item.id, 1)).await.unwrap();
    assert!(!first.cached);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let second = resolver.resolve(request(item.id, 1)).await.unwrap();
    assert!(second.cached);
    assert_eq!(second.sources.len(), first.sources.len());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let mut bypass = request(item.id, 1);
    bypass.bypass_cache = true;
    let third = resolver.resolve(bypass).await.unwrap();
    assert!(!third.cached);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unknown_provider_names_are_skipped() {
    let provider = StaticProvider::new(
        "alpha",
        1,
        vec![with_provider(
            "alpha",
            candidate(1, "https://alpha.example/1", "720p", None),
        )],
    );

    let (_store, item, resolver) = setup(vec![Arc::new(provider)]).await;

    let mut req = request(item.id, 1);
    req.providers = Some(vec!["alpha".to_string(), "bogus".to_string()]);
    let outcome = resolver.resolve(req).await.unwrap();

    // The unknown name is skipped, not reported as an adapter failure.
    assert_eq!(outcome.sources.len(), 1);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn test_all_providers_failing_degrades_gracefully() {
    let (_store, item, resolver) = setup(vec![
        Arc::new(FailingProvider { name: "gamma" }),
        Arc::new(FailingProvider { name: "delta" }),
    ])
    .await;

    let outcome = resolver.resolve(request(item.id, 1)).await.unwrap();

    assert!(outcome.sources.is_empty());
    assert_eq!(outcome.errors.len(), 2);
}

#[tokio::test]
async fn test_quality_filter_and_limit() {
    let provider = StaticProvider::new(
        "alpha",
        1,
        vec![
            with_provider("alpha", candidate(1, "https://alpha.example/sd", "480p", None)),
            with_provider("alpha", candidate(1, "https://alpha.example/hd", "720p", None)),
            with_provider(
                "alpha",
                candidate(1, "https://alpha.example/fhd", "1080p", None),
            ),
        ],
    );

    let (_store, item, resolver) = setup(vec![Arc::new(provider)]).await;

    let mut filtered = request(item.id, 1);
    filtered.quality = Some(Quality::Q1080p);
    let outcome = resolver.resolve(filtered).await.unwrap();
    assert_eq!(outcome.sources.len(), 1);
    assert_eq!(outcome.sources[0].quality, Quality::Q1080p);

    let mut limited = request(item.id, 1);
    limited.limit = 2;
    limited.bypass_cache = true;
    let outcome = resolver.resolve(limited).await.unwrap();
    assert_eq!(outcome.sources.len(), 2);
    // Best quality first at equal priority.
    assert_eq!(outcome.sources[0].quality, Quality::Q1080p);
}

#[tokio::test]
async fn test_inactive_placeholders_are_persisted_but_not_served() {
    let metadata = StaticProvider::new(
        "meta",
        5,
        vec![with_provider(
            "meta",
            RawCandidate {
                episode: Some(json!(1)),
                title: Some("Pilot".to_string()),
                active: Some(false),
                ..RawCandidate::default()
            },
        )],
    );

    let (store, item, resolver) = setup(vec![Arc::new(metadata)]).await;

    let outcome = resolver.resolve(request(item.id, 1)).await.unwrap();
    assert!(outcome.sources.is_empty());
    assert!(outcome.errors.is_empty());

    let rows = store.sources_for_episode(item.id, 1, false).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_active);
    assert!(rows[0].source_url.is_empty());
    assert_eq!(rows[0].title, "Pilot");
}

#[tokio::test]
async fn test_unknown_item_fails_with_not_found() {
    let (_store, _item, resolver) = setup(vec![]).await;

    let err = resolver.resolve(request(999, 1)).await.unwrap_err();
    assert!(matches!(
        err,
        vidarr::services::ResolveError::ItemNotFound(999)
    ));
}

#[tokio::test]
async fn test_invalid_episode_fails_validation() {
    let (_store, item, resolver) = setup(vec![]).await;

    let err = resolver.resolve(request(item.id, 0)).await.unwrap_err();
    assert!(matches!(
        err,
        vidarr::services::ResolveError::Validation(_)
    ));
}

#[tokio::test]
async fn test_all_probes_failing_returns_marked_set() {
    // host.invalid never resolves (RFC 2606), so every probe reads
    // unavailable; the response must keep the full marked set anyway.
    let provider = StaticProvider::new(
        "alpha",
        1,
        vec![
            with_provider(
                "alpha",
                candidate(1, "https://host.invalid/a", "720p", None),
            ),
            with_provider(
                "alpha",
                candidate(1, "https://host.invalid/b", "1080p", None),
            ),
        ],
    );

    let (store, item, resolver) = setup(vec![Arc::new(provider)]).await;

    let mut req = request(item.id, 1);
    req.verify = true;
    let outcome = resolver.resolve(req).await.unwrap();

    assert_eq!(outcome.sources.len(), 2);
    assert!(
        outcome
            .sources
            .iter()
            .all(|s| s.status == SourceStatus::Unavailable)
    );

    // The probe verdicts were recorded on the rows.
    let rows = store.sources_for_episode(item.id, 1, false).await.unwrap();
    assert!(rows.iter().all(|r| !r.is_active && r.last_checked.is_some()));
}
