pub mod candidate;
pub mod resolution;
pub mod source;

pub use candidate::RawCandidate;
pub use resolution::{
    AdapterFailure, ResolutionOutcome, ResolutionRequest, ResolvedSource, SourceStatus,
};
pub use source::NormalizedSource;
