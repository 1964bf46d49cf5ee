pub mod resolver {

    /// Active sources unseen for this many days are deactivated.
    pub const STALENESS_WINDOW_DAYS: i64 = 7;

    /// Inactive sources untouched for this many days are purged by the sweeper.
    pub const PURGE_AFTER_DAYS: i64 = 90;

    pub const DEFAULT_RESULT_LIMIT: usize = 20;

    pub const MAX_RESULT_LIMIT: usize = 100;
}

pub mod cache {

    pub const RESOLUTION_TTL_MINUTES: i64 = 5;
}

pub mod retry {
    use std::time::Duration;

    pub const BASE_DELAY: Duration = Duration::from_secs(1);

    pub const BACKOFF_FACTOR: u32 = 2;
}

pub mod probe {
    use std::time::Duration;

    pub const TIMEOUT: Duration = Duration::from_secs(10);
}

pub mod providers {

    /// Fallback priority when neither the candidate nor the registry supplies one.
    pub const FALLBACK_PRIORITY: i32 = 5;
}

pub mod intervals {
    use std::time::Duration;

    pub const CACHE_SWEEP: Duration = Duration::from_secs(60);

    pub const STALENESS_SWEEP: Duration = Duration::from_secs(3600);
}
