//! ItemEnricher trait: fetches the heavy text fields of a ranked issue.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::work::{EnrichedItem, WorkItem};

#[async_trait]
pub trait ItemEnricher: Send + Sync {
    /// Fetch body, comments, and cross-references for `item`.
    async fn enrich(&self, item: &WorkItem) -> Result<EnrichedItem, SourceError>;
}
