//! TokenCounter trait: exact token counting by an external service.
//!
//! Implementations: Anthropic `count_tokens`. The cost estimator treats any
//! error from a counter as a signal to fall back to its local approximation.

use async_trait::async_trait;

use crate::error::ProviderError;

#[async_trait]
pub trait TokenCounter: Send + Sync {
    /// A human-readable name for this counter (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Count the tokens `text` would consume for `model`.
    async fn count_tokens(&self, model: &str, text: &str) -> Result<usize, ProviderError>;
}
