//! `dailybrief degrade`: Fit enriched issues under a hard token cap.

use dailybrief_config::AppConfig;
use dailybrief_context::DegradationPipeline;
use dailybrief_context::sections::enriched_section;
use dailybrief_core::EnrichedItem;
use std::path::{Path, PathBuf};

pub async fn load_items(path: &Path) -> Result<Vec<EnrichedItem>, Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let items = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {e}", path.display()))?;
    Ok(items)
}

pub async fn run(
    items: PathBuf,
    capacity: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    let items = load_items(&items).await?;

    let mut settings = config.degradation.clone();
    if let Some(capacity) = capacity {
        settings.capacity = capacity;
    }
    let outcome = DegradationPipeline::from_config(&settings).run(items);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if let Some(section) = enriched_section(&outcome.items) {
        println!("{section}");
    }
    eprintln!();
    eprintln!(
        "✂️  {} item(s), {}/{} tokens",
        outcome.items.len(),
        outcome.total_cost,
        outcome.capacity
    );
    if outcome.truncated {
        eprintln!(
            "   phases: {:?}, comments dropped: {}, bodies truncated: {}, items dropped: {}",
            outcome.phases,
            outcome.comments_dropped,
            outcome.bodies_truncated,
            outcome.dropped.len()
        );
    }
    if !outcome.fits() {
        eprintln!("   ⚠️  protected items exceed the capacity");
    }

    Ok(())
}
