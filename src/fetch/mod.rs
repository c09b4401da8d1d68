//! Network stage: one GET per item, classified into a [`FetchOutcome`]
//!
//! Fetchers never panic or bubble transport errors; every failure is a
//! [`FetchError`] whose [`ErrorKind`](crate::record::ErrorKind) decides
//! whether the coordinator retries.

mod error;
mod http;

pub use error::FetchError;
pub use http::{HttpConfig, HttpFetcher, HttpSetupError};

use async_trait::async_trait;
use bytes::Bytes;

/// Raw body on 2xx, classified failure otherwise
pub type FetchOutcome = Result<Bytes, FetchError>;

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}
