pub mod fetch;
pub mod normalize;
pub mod probe;
pub mod rank;
pub mod resolver;
pub mod retry;
pub mod sweeper;

pub use fetch::{FetchOrchestrator, FetchOutcome};
pub use probe::AvailabilityProber;
pub use resolver::{ResolveError, ResolverService};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use sweeper::Sweeper;
