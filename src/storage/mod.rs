pub mod cache;
pub mod token;
pub mod traits;

pub use cache::{
    spawn_cleanup_task, CacheConfig, CacheEntry, CacheStats, ExpirationPolicy, MemoryCursorStore
};
pub use token::TokenGenerator;
pub use traits::CursorStore;
