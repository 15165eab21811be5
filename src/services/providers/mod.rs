/// Movie catalog provider abstraction
///
/// The resolver only depends on this seam, so catalog backends can be swapped
/// (or mocked in tests) without touching the recommendation logic.
use crate::{
    error::AppResult,
    models::{MovieId, MovieRecord},
};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

pub mod tmdb;

/// Trait for movie catalog backends
///
/// Both operations degrade rather than abort: a missing credential yields
/// empty results, and per-identifier failures drop only that identifier.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Free-text search, truncated to `limit` entries in the provider's
    /// own relevance order.
    async fn search_by_genre(&self, keyword: &str, limit: usize) -> AppResult<Vec<MovieRecord>>;

    /// Sequential per-identifier lookups. An identifier that fails is logged
    /// and omitted; the remaining identifiers are still fetched.
    async fn fetch_by_ids(&self, ids: &[MovieId]) -> AppResult<Vec<MovieRecord>>;
}
