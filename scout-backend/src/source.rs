//! The seam the search flow reads products through.

use async_trait::async_trait;

use crate::errors::Result;
use crate::model::{Product, Session};

/// Something that can list products and search sessions.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Every product, ordered by ID.
    async fn products(&self) -> Result<Vec<Product>>;

    async fn sessions(&self) -> Result<Vec<Session>>;
}
