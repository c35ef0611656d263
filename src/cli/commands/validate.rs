//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Kinetic configuration file.

use crate::config::load_config;
use crate::pseudonymization::PseudonymizationEngine;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        // patterns and gazetteers only fail when they are compiled
        let engine = match PseudonymizationEngine::new(config.pseudonymization.clone()) {
            Ok(engine) => engine,
            Err(e) => {
                println!("❌ Pseudonymization settings are invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let pseudo = &config.pseudonymization;
        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Categories: {}",
            engine
                .categories()
                .iter()
                .map(|c| c.label())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Anchor Policy: {}", pseudo.anchor_policy);
        if let Some(date) = &pseudo.anchor_date {
            println!("  Anchor Date: {date}");
        }
        println!(
            "  Pattern Library: {}",
            pseudo
                .pattern_library
                .as_ref()
                .map_or("built-in".to_string(), |p| p.display().to_string())
        );
        println!(
            "  Gazetteer: {}",
            pseudo
                .gazetteer_path
                .as_ref()
                .map_or("built-in".to_string(), |p| format!("built-in + {}", p.display()))
        );
        println!("  Name Min Tokens: {}", pseudo.names.min_tokens);
        println!("  OCR Repair: {}", pseudo.repair_ocr_separators);
        println!(
            "  Audit Trail: {}",
            if pseudo.audit.enabled {
                pseudo.audit.log_path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        println!("  Output Directory: {}", config.batch.output_dir.display());
        println!("  Timeout: {} ms", config.batch.timeout_ms);
        println!();
        Ok(0)
    }
}
