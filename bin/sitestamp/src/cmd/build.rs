//! Build command - generates category pages, index pages, and the sitemap

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use sitestamp_core::Config;
use sitestamp_generator::Builder;

use super::check::quick_validate;

/// Run the build command.
///
/// Evaluates every article, regenerates what changed, and persists the
/// timestamp ledger once the whole site built successfully.
pub fn run(
    config_path: &Path,
    keep_timestamps: bool,
    domain: Option<&str>,
    new_ledger: bool,
) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, keep_timestamps, ?domain, new_ledger, "Starting build");

    let mut config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;

    let warnings = quick_validate(&config);
    if !warnings.is_empty() {
        println!();
        println!("  Warnings:");
        for warn in &warnings {
            println!("  ⚠ {warn}");
        }
        println!();
    }

    if keep_timestamps {
        tracing::info!("Keeping recorded timestamps for changed pages");
        config.ledger.keep_timestamps = true;
    }

    if let Some(d) = domain {
        tracing::info!(domain = d, "Overriding site domain from CLI");
        config.site.domain = d.to_string();
    }

    tracing::debug!(?config, "Loaded configuration");

    let root = config.site.root.clone();
    let stats = Builder::new(config)
        .with_new_ledger(new_ledger)
        .build()
        .wrap_err("Build failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Subsites:   {}", stats.subsites);
    println!("  Articles:   {}", stats.articles);
    println!("  Categories: {}", stats.categories);
    println!("  Written:    {}", stats.written);
    println!("  Unchanged:  {}", stats.unchanged);
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Site root:  {}", root.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}
