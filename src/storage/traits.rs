use std::sync::Arc;

use crate::error::Result;
use crate::feed::Post;
use crate::storage::cache::CacheStats;

/// Time-limited map from continuation token to the rest of a result set.
///
/// Implementations must never hand out an expired entry and must tolerate
/// concurrent callers. A `put` is complete by the time it returns.
pub trait CursorStore: Send + Sync {
    /// Store `remaining` under `token` with the store's default TTL.
    fn put(&self, token: String, remaining: Vec<Post>) -> Result<()>;

    /// Look up the remainder stored under `token`.
    fn get(&self, token: &str) -> Option<Arc<Vec<Post>>>;

    /// Drop `token`, returning whether it was present.
    fn remove(&self, token: &str) -> bool;

    /// Remove every expired entry and return how many were dropped.
    fn cleanup_expired(&self) -> usize;

    fn stats(&self) -> CacheStats;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
