use iron::middleware::Handler;

use entry_point::{self, EntryPoint};
use options::CacheControlOptions;

/// A handler type that declares its own cache-control directives.
///
/// ```ignore
/// struct Dashboard;
///
/// impl CacheControlled for Dashboard {
///     fn cache_control() -> CacheControlOptions {
///         CacheControlOptions::new().private(true).max_age(3600)
///     }
/// }
///
/// Iron::new(Dashboard.into_entry_point()).http("127.0.0.1:8000")
/// ```
pub trait CacheControlled: Handler + Sized {
    /// Directives for every response of this handler type. Nothing is set
    /// unless overridden.
    fn cache_control() -> CacheControlOptions {
        CacheControlOptions::default()
    }

    fn into_entry_point(self) -> EntryPoint<Self> {
        entry_point::build_entry_point(&Self::cache_control(), move || self)
    }
}
