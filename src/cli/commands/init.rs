//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "kinetic.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Kinetic configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Validate configuration: kinetic validate-config");
                println!("  3. Pseudonymize: kinetic pseudonymize brief.txt verslag.txt");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Kinetic Configuration File
# Local pseudonymization of Dutch medical records

[application]
log_level = "info"

[pseudonymization]
categories = ["NAAM", "ZIEKENHUIS", "PLAATS", "POSTCODE", "DATUM", "BSN", "TELEFOON", "EMAIL", "IBAN"]
anchor_policy = "earliest"
parallel_recognizers = true
repair_ocr_separators = false

[pseudonymization.names]
min_tokens = 2
extra_stop_words = []

[pseudonymization.audit]
enabled = false
log_path = "./audit/pseudonymization.log"
json_format = true

[batch]
timeout_ms = 30000
output_dir = "./pseudonymized"

[logging]
local_enabled = true
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Kinetic Configuration File
# Local pseudonymization of Dutch medical records
#
# Every setting has a default; remove what you do not need to change.
# Values may reference environment variables as ${VAR_NAME}, and every key
# can be overridden with KINETIC_<SECTION>_<KEY>.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Pseudonymization Settings
# ============================================================================
[pseudonymization]
# Categories to detect
categories = ["NAAM", "ZIEKENHUIS", "PLAATS", "POSTCODE", "DATUM", "BSN", "TELEFOON", "EMAIL", "IBAN"]

# Custom pattern library (replaces the built-in patterns)
# pattern_library = "./patterns/custom.toml"

# Extra hospitals and places, added to the built-in lists
# File format: hospitals = ["..."] and places = ["..."]
# gazetteer_path = "./data/regio.toml"

# Timeline anchor: "earliest" date in the document, or the "incident" date
# (a date preceded by ongeval, trauma, incident, schade or val)
anchor_policy = "earliest"

# Fixed anchor date for every document (DD-MM-YYYY or YYYY-MM-DD)
# anchor_date = "01-01-2024"

# Two-digit years below the pivot are 20xx, the others 19xx
two_digit_year_pivot = 50

# Run recognizers on parallel threads
parallel_recognizers = true

# Restore hyphens that OCR read as "n" (05n03n2025)
repair_ocr_separators = false

# Detect and report without writing output files
dry_run = false

[pseudonymization.names]
# Capitalized tokens needed for a name outside a titled context
min_tokens = 2

# Words that are never part of a name
extra_stop_words = ["Revalidatie", "Spreekuur"]

[pseudonymization.audit]
# Append one JSON line per document (hashes, never the original text)
enabled = false
log_path = "./audit/pseudonymization.log"
json_format = true

# ============================================================================
# Batch Settings
# ============================================================================
[batch]
# Time budget per document in milliseconds (0 = no budget)
timeout_ms = 30000

# Directory for <name>.pseudo.txt output files
output_dir = "./pseudonymized"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = true

# Log directory
local_path = "./logs"

# Log rotation (daily, hourly or never)
local_rotation = "daily"
"#
        .to_string()
    }
}
