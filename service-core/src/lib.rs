//! service-core: Shared infrastructure for the ride platform services.
pub mod config;
pub mod error;
pub mod observability;
pub mod retry;

pub use async_trait;
pub use serde;
pub use tokio;
pub use tracing;
