pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod pagination;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use feed::{Post, PostSource};
pub use pagination::{PageMode, PageRequest, PageResponse, Paginator};
