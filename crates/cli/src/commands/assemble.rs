//! `dailybrief assemble`: Budgeted work-context assembly.

use dailybrief_config::AppConfig;
use dailybrief_context::{ContentAssembler, CostEstimator, collect_sources, populate};
use dailybrief_core::{SourceKind, WorkSource};
use dailybrief_providers::{JsonFileSource, counter_from_config};
use std::path::PathBuf;
use std::sync::Arc;

/// Input files, one per source kind.
#[derive(Debug, Default)]
pub struct Inputs {
    pub issues: Option<PathBuf>,
    pub pulls: Option<PathBuf>,
    pub projects: Option<PathBuf>,
}

impl Inputs {
    fn sources(self) -> Vec<Arc<dyn WorkSource>> {
        [
            (SourceKind::Issues, self.issues),
            (SourceKind::PullRequests, self.pulls),
            (SourceKind::Projects, self.projects),
        ]
        .into_iter()
        .filter_map(|(kind, path)| {
            path.map(|p| Arc::new(JsonFileSource::new(kind, p)) as Arc<dyn WorkSource>)
        })
        .collect()
    }
}

pub async fn run(
    inputs: Inputs,
    capacity: Option<usize>,
    approximate: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    let sources = inputs.sources();
    if sources.is_empty() {
        return Err("No sources given (use --issues, --pulls or --projects)".into());
    }

    let counter = if approximate {
        None
    } else {
        counter_from_config(&config)
    };
    let estimator = CostEstimator::from_optional(counter, config.model.clone());
    let capacity = capacity.unwrap_or(config.assembly.capacity);
    let mut assembler = ContentAssembler::new(capacity, estimator);
    tracing::debug!(
        run_id = %assembler.run_id(),
        sources = sources.len(),
        capacity,
        exact = assembler.estimator().has_counter(),
        "Assembling work context"
    );

    let data = collect_sources(&sources).await;
    let (document, report) = populate(&mut assembler, &data, &config.assembly.priorities).await;
    let stats = assembler.stats();

    if json {
        let out = serde_json::json!({
            "run_id": assembler.run_id(),
            "document": document,
            "report": report,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{document}");
    eprintln!();
    eprintln!(
        "📦 {} section(s), {}/{} tokens used",
        stats.section_count, stats.used, stats.capacity
    );
    for name in &report.evicted {
        eprintln!("   ⚠️  evicted: {name}");
    }
    for (name, reason) in &report.rejected {
        eprintln!("   ⚠️  rejected: {name} ({reason})");
    }
    if stats.estimator.fell_back() {
        eprintln!(
            "   ⚠️  {} estimate(s) fell back to the approximation",
            stats.estimator.fallback
        );
    }

    Ok(())
}
