//! `dailybrief config`: Configuration management commands.

use dailybrief_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if config.api_key.is_none() {
                warnings.push(
                    "No API key set (set DAILYBRIEF_API_KEY or ANTHROPIC_API_KEY); costs will be approximate",
                );
            }

            if !config.counter.enabled {
                warnings.push("Exact token counter disabled; costs will be approximate");
            }

            if config.cache.ttl_secs == 0 {
                warnings.push("cache.ttl_secs = 0 disables enrichment caching");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            let p = &config.assembly.priorities;
            let d = &config.degradation;
            println!();
            println!("   Model:        {}", config.model);
            println!("   Assembly:     {} tokens", config.assembly.capacity);
            println!(
                "   Priorities:   issues={} pull_requests={} projects={}",
                p.issues, p.pull_requests, p.projects
            );
            println!(
                "   Degradation:  {} tokens, notes {} / body {} per item, top {} protected",
                d.capacity, d.notes_budget, d.body_budget, d.protected_prefix
            );
            println!("   Cache TTL:    {}s", config.cache.ttl_secs);
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if config.api_key.is_some() {
        config.api_key = Some("[REDACTED]".into());
    }
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}
