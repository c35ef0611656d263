//! Configuration management for Kinetic.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Kinetic uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `KINETIC_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use kinetic::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("kinetic.toml")?;
//! println!("Anchor policy: {}", config.pseudonymization.anchor_policy);
//! println!("Output directory: {}", config.batch.output_dir.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`PseudonymizationConfig`] - Categories, gazetteer, anchor policy, audit trail
//! - [`BatchConfig`] - Per-document time budget and output directory
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [pseudonymization]
//! anchor_policy = "incident"
//! gazetteer_path = "./data/regio.toml"
//!
//! [pseudonymization.names]
//! min_tokens = 2
//! extra_stop_words = ["Revalidatie"]
//!
//! [pseudonymization.audit]
//! enabled = true
//! log_path = "${KINETIC_AUDIT_DIR}/pseudonymization.log"
//!
//! [batch]
//! timeout_ms = 30000
//! output_dir = "./pseudonymized"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use crate::pseudonymization::config::{AuditConfig, NameConfig, PseudonymizationConfig};
pub use loader::{load_config, parse_config};
pub use schema::{ApplicationConfig, BatchConfig, KineticConfig, LoggingConfig};
