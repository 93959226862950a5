//! Query resolution boundary
//!
//! Turns free text from a `play`/`queue` command into a [`Collection`].
//! Resolution may be slow, so it always runs outside the engine lock and is
//! bounded by [`resolve_with_timeout`].

mod catalog;

pub use catalog::{Catalog, CatalogResolver};

use std::time::Duration;

use async_trait::async_trait;
use jukebox_common::Collection;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Resolves chat queries into collections
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Look up `query`
    ///
    /// # Returns
    /// * `Ok(Some(_))` - a collection with no user assigned yet
    /// * `Ok(None)` - nothing matched
    /// * `Err(_)` - the lookup itself failed
    async fn resolve(&self, query: &str) -> Result<Option<Collection>>;
}

/// Resolve `query`, failing with [`Error::ResolutionTimeout`] when the
/// resolver takes longer than `limit`
///
/// A timed-out lookup is abandoned; the process stays usable.
pub async fn resolve_with_timeout(resolver: &dyn Resolver, query: &str, limit: Duration) -> Result<Collection> {
    match tokio::time::timeout(limit, resolver.resolve(query)).await {
        Ok(Ok(Some(collection))) => {
            debug!(
                "Resolved '{}' to {} ({} tracks)",
                query,
                collection.description(),
                collection.tracks().len()
            );
            Ok(collection)
        }
        Ok(Ok(None)) => Err(Error::NotFound(query.to_string())),
        Ok(Err(e)) => Err(e),
        Err(_) => {
            warn!("Resolving '{}' exceeded {:?}", query, limit);
            Err(Error::ResolutionTimeout(limit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jukebox_common::Track;

    struct SlowResolver(Duration);

    #[async_trait]
    impl Resolver for SlowResolver {
        async fn resolve(&self, query: &str) -> Result<Option<Collection>> {
            tokio::time::sleep(self.0).await;
            Ok(Some(Collection::new(query, vec![Track::new("t:1", query, "Someone")])))
        }
    }

    struct EmptyResolver;

    #[async_trait]
    impl Resolver for EmptyResolver {
        async fn resolve(&self, _query: &str) -> Result<Option<Collection>> {
            Ok(None)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_resolver_times_out() {
        let resolver = SlowResolver(Duration::from_secs(30));
        let err = resolve_with_timeout(&resolver, "anything", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ResolutionTimeout(d) if d == Duration::from_secs(5)));
        assert!(!err.is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolver_within_limit() {
        let resolver = SlowResolver(Duration::from_secs(1));
        let collection = resolve_with_timeout(&resolver, "teardrop", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(collection.description(), "teardrop");
    }

    #[tokio::test]
    async fn test_no_match_is_not_found() {
        let err = resolve_with_timeout(&EmptyResolver, "zzz", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(q) if q == "zzz"));
    }
}
