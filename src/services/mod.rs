//! Engine services

pub mod builder;
pub mod codesets;
pub mod hierarchy;
pub mod policy;
pub mod resolver;
pub mod rollup;

pub use builder::{BuilderService, ATTRIBUTE_JOIN};
pub use codesets::CodeSetService;
pub use hierarchy::{HierarchyRow, HierarchyService};
pub use policy::DomainPolicy;
pub use resolver::{ResolverService, SearchResult};
pub use rollup::RollupTables;

use crate::Result;
use std::future::Future;

/// Run a store call on the primary path; on an upstream failure, log and run
/// the equivalent fallback invocation exactly once.
///
/// Primary and fallback execute the same pure computation against the store,
/// so business logic is never duplicated across the two paths. Caller errors
/// (InvalidArgument, NotFound) surface verbatim and are never retried.
pub(crate) async fn with_fallback<T, Fut>(op: &'static str, attempt: impl Fn() -> Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match attempt().await {
        Ok(value) => Ok(value),
        Err(err) if err.is_upstream() => {
            tracing::warn!(op, error = %err, "primary store path failed, retrying via fallback path");
            attempt().await
        }
        Err(err) => Err(err),
    }
}
