//! External collaborators for dailybrief.
//!
//! - [`AnthropicTokenCounter`]: exact token counts via the Messages
//!   `count_tokens` endpoint
//! - [`JsonFileSource`]: a work source backed by a JSON file

pub mod anthropic;
pub mod json_file;

pub use anthropic::AnthropicTokenCounter;
pub use json_file::JsonFileSource;

use dailybrief_config::AppConfig;
use std::sync::Arc;

/// Build the exact counter described by `config`, if one is usable.
///
/// Returns `None` when counting is disabled or no API key is available;
/// callers then price content with the local approximation only.
pub fn counter_from_config(config: &AppConfig) -> Option<Arc<dyn dailybrief_core::TokenCounter>> {
    if !config.counter_available() {
        tracing::debug!("Exact token counter unavailable, using approximation only");
        return None;
    }
    let api_key = config.api_key.clone()?;

    let mut counter = AnthropicTokenCounter::new(api_key)
        .with_timeout(std::time::Duration::from_secs(config.counter.timeout_secs));
    if let Some(url) = &config.counter.api_url {
        counter = counter.with_base_url(url.clone());
    }
    Some(Arc::new(counter))
}
