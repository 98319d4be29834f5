//! Check command - validate configuration and content without writing

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use sitestamp_core::Config;
use sitestamp_generator::Builder;

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates the configuration, directory layouts, articles, and the
/// category graph. Nothing is rendered and the ledger is not written.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and content");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            Some(c)
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
            None
        }
    };

    if let Some(config) = config {
        println!("\nChecking configuration values...");
        result.warnings.extend(quick_validate(&config));
        println!("  ✓ Configuration values checked");

        println!("\nChecking site content...");
        match Builder::new(config).with_new_ledger(true).check() {
            Ok(stats) => println!(
                "  ✓ {} articles and {} categories in {} subsite(s) valid",
                stats.articles, stats.categories, stats.subsites
            ),
            Err(e) => {
                result.add_error(e.to_string());
                println!("  ✗ {e}");
            }
        }
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Quick validation for the build and check commands.
///
/// Returns non-fatal findings about the configuration.
pub fn quick_validate(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    for subsite in config.subsites() {
        if subsite.name.is_none() {
            warnings.push(format!(
                "Subsite {} has no name - <title> checks are skipped",
                subsite.path.display()
            ));
        }
    }

    if config.site.domain.is_empty() {
        if config.sitemap.enabled {
            warnings.push("site.domain is empty - sitemap URLs will be relative".to_string());
        }
    } else if !config.site.domain.starts_with("http") {
        warnings.push("site.domain should start with http:// or https://".to_string());
    } else if !config.site.domain.ends_with('/') {
        warnings.push("site.domain should end with a slash".to_string());
    }

    if !config.ledger_path().exists() {
        warnings.push(format!(
            "Ledger file {} does not exist - run build with --new-ledger to start one",
            config.ledger_path().display()
        ));
    }

    warnings
}
