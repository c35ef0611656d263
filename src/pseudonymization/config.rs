//! Pseudonymization configuration

use crate::domain::{KineticError, Result};
use crate::pseudonymization::models::Category;
use crate::pseudonymization::recognizer::date::DEFAULT_YEAR_PIVOT;
use crate::pseudonymization::recognizer::name::DEFAULT_MIN_TOKENS;
use crate::pseudonymization::timeline::AnchorPolicy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pseudonymization engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PseudonymizationConfig {
    /// Categories to detect (default: all)
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,

    /// Custom pattern library, replaces the built-in one
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,

    /// Extra gazetteer, added to the built-in hospital and place lists
    #[serde(default)]
    pub gazetteer_path: Option<PathBuf>,

    /// How the timeline anchor is chosen
    #[serde(default)]
    pub anchor_policy: AnchorPolicy,

    /// Fixed anchor date (DD-MM-YYYY or YYYY-MM-DD) for every document
    #[serde(default)]
    pub anchor_date: Option<String>,

    /// Two-digit years below this value are 20xx, the rest 19xx
    #[serde(default = "default_year_pivot")]
    pub two_digit_year_pivot: u32,

    /// Run recognizers on parallel threads
    #[serde(default = "default_true")]
    pub parallel_recognizers: bool,

    /// Restore hyphens misread as `n` by OCR before detection
    #[serde(default)]
    pub repair_ocr_separators: bool,

    /// Detect and report, but do not write pseudonymized files
    #[serde(default)]
    pub dry_run: bool,

    /// Name recognizer settings
    #[serde(default)]
    pub names: NameConfig,

    /// Audit trail configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for PseudonymizationConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            pattern_library: None,
            gazetteer_path: None,
            anchor_policy: AnchorPolicy::Earliest,
            anchor_date: None,
            two_digit_year_pivot: default_year_pivot(),
            parallel_recognizers: true,
            repair_ocr_separators: false,
            dry_run: false,
            names: NameConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl PseudonymizationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(KineticError::Configuration(
                "pseudonymization.categories must not be empty".to_string(),
            ));
        }

        for (label, path) in [
            ("pattern library", &self.pattern_library),
            ("gazetteer", &self.gazetteer_path),
        ] {
            if let Some(path) = path {
                if !path.exists() {
                    return Err(KineticError::Configuration(format!(
                        "{label} file not found: {}",
                        path.display()
                    )));
                }
                if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                    return Err(KineticError::Configuration(format!(
                        "{label} must be a TOML file: {}",
                        path.display()
                    )));
                }
            }
        }

        if self.two_digit_year_pivot > 99 {
            return Err(KineticError::Configuration(format!(
                "pseudonymization.two_digit_year_pivot must be <= 99, got {}",
                self.two_digit_year_pivot
            )));
        }

        self.anchor_date()?;
        self.names.validate()?;
        self.audit.validate()?;

        Ok(())
    }

    /// Parsed fixed anchor date, if configured
    pub fn anchor_date(&self) -> Result<Option<NaiveDate>> {
        self.anchor_date
            .as_deref()
            .map(parse_anchor_date)
            .transpose()
    }

    /// Whether `category` is enabled
    pub fn is_enabled(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_CATEGORIES") {
            self.categories = val
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<Category>().map_err(KineticError::Configuration))
                .collect::<Result<Vec<_>>>()?;
        }

        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_ANCHOR_POLICY") {
            self.anchor_policy = val.parse().map_err(KineticError::Configuration)?;
        }

        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_ANCHOR_DATE") {
            self.anchor_date = Some(val);
        }

        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_PATTERN_LIBRARY") {
            self.pattern_library = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_GAZETTEER_PATH") {
            self.gazetteer_path = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_PARALLEL_RECOGNIZERS") {
            self.parallel_recognizers =
                parse_env_bool("KINETIC_PSEUDONYMIZATION_PARALLEL_RECOGNIZERS", &val)?;
        }

        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_REPAIR_OCR_SEPARATORS") {
            self.repair_ocr_separators =
                parse_env_bool("KINETIC_PSEUDONYMIZATION_REPAIR_OCR_SEPARATORS", &val)?;
        }

        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_DRY_RUN") {
            self.dry_run = parse_env_bool("KINETIC_PSEUDONYMIZATION_DRY_RUN", &val)?;
        }

        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_NAME_MIN_TOKENS") {
            self.names.min_tokens = val.parse().map_err(|_| {
                KineticError::Configuration(format!(
                    "Invalid KINETIC_PSEUDONYMIZATION_NAME_MIN_TOKENS value: {val}"
                ))
            })?;
        }

        self.audit.apply_env_overrides()?;

        Ok(())
    }
}

/// Name recognizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameConfig {
    /// Minimum number of name tokens outside a titled context
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,

    /// Additional words that never belong to a name
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
}

impl Default for NameConfig {
    fn default() -> Self {
        Self {
            min_tokens: default_min_tokens(),
            extra_stop_words: Vec::new(),
        }
    }
}

impl NameConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.min_tokens) {
            return Err(KineticError::Configuration(format!(
                "pseudonymization.names.min_tokens must be between 1 and 5, got {}",
                self.min_tokens
            )));
        }
        Ok(())
    }
}

/// Audit trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable the audit trail
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON lines instead of plain text
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err(KineticError::Configuration(
                "pseudonymization.audit.log_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_AUDIT_ENABLED") {
            self.enabled = parse_env_bool("KINETIC_PSEUDONYMIZATION_AUDIT_ENABLED", &val)?;
        }

        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("KINETIC_PSEUDONYMIZATION_AUDIT_JSON_FORMAT") {
            self.json_format =
                parse_env_bool("KINETIC_PSEUDONYMIZATION_AUDIT_JSON_FORMAT", &val)?;
        }

        Ok(())
    }
}

/// Parse an anchor date written as `DD-MM-YYYY`, `DD/MM/YYYY` or `YYYY-MM-DD`
///
/// ```
/// use kinetic::pseudonymization::config::parse_anchor_date;
/// use chrono::NaiveDate;
///
/// let date = parse_anchor_date("18-11-2025").unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2025, 11, 18).unwrap());
/// ```
pub fn parse_anchor_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    ["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .ok_or_else(|| {
            KineticError::Configuration(format!(
                "Invalid anchor date '{value}', expected DD-MM-YYYY or YYYY-MM-DD"
            ))
        })
}

fn parse_env_bool(name: &str, value: &str) -> Result<bool> {
    value
        .trim()
        .parse()
        .map_err(|_| KineticError::Configuration(format!("Invalid {name} value: {value}")))
}

fn default_categories() -> Vec<Category> {
    Category::ALL.to_vec()
}

fn default_year_pivot() -> u32 {
    DEFAULT_YEAR_PIVOT
}

fn default_min_tokens() -> usize {
    DEFAULT_MIN_TOKENS
}

fn default_true() -> bool {
    true
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/pseudonymization.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PseudonymizationConfig::default();
        assert_eq!(config.categories.len(), 9);
        assert_eq!(config.anchor_policy, AnchorPolicy::Earliest);
        assert_eq!(config.two_digit_year_pivot, 50);
        assert!(config.parallel_recognizers);
        assert!(!config.repair_ocr_separators);
        assert!(!config.audit.enabled);
        assert!(config.audit.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_from_toml() {
        let config: PseudonymizationConfig = toml::from_str(
            r#"
            categories = ["NAAM", "BSN", "DATUM"]
            anchor_policy = "incident"
            anchor_date = "01-02-2024"

            [names]
            min_tokens = 3
            extra_stop_words = ["Kinetic"]
            "#,
        )
        .unwrap();

        assert_eq!(config.categories.len(), 3);
        assert!(config.is_enabled(Category::Bsn));
        assert!(!config.is_enabled(Category::Email));
        assert_eq!(config.anchor_policy, AnchorPolicy::Incident);
        assert_eq!(
            config.anchor_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );
        assert_eq!(config.names.min_tokens, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = PseudonymizationConfig {
            categories: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.categories = default_categories();
        config.anchor_date = Some("31-02-2024".to_string());
        assert!(config.validate().is_err());

        config.anchor_date = None;
        config.names.min_tokens = 0;
        assert!(config.validate().is_err());

        config.names.min_tokens = 2;
        config.two_digit_year_pivot = 100;
        assert!(config.validate().is_err());

        config.two_digit_year_pivot = 50;
        config.pattern_library = Some(PathBuf::from("/nonexistent/patterns.toml"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_anchor_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 18).unwrap();
        assert_eq!(parse_anchor_date("18-11-2025").unwrap(), expected);
        assert_eq!(parse_anchor_date("18/11/2025").unwrap(), expected);
        assert_eq!(parse_anchor_date("2025-11-18").unwrap(), expected);
        assert!(parse_anchor_date("november").is_err());
    }
}
