//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::KineticConfig;
use crate::domain::errors::KineticError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into KineticConfig
/// 4. Applies environment variable overrides (KINETIC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use kinetic::config::loader::load_config;
///
/// let config = load_config("kinetic.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<KineticConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(KineticError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        KineticError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text, with the same substitution,
/// override and validation steps as [`load_config`]
pub fn parse_config(contents: &str) -> Result<KineticConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: KineticConfig = toml::from_str(&contents)
        .map_err(|e| KineticError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        KineticError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| KineticError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(KineticError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using KINETIC_* prefix
///
/// Environment variables follow the pattern: KINETIC_<SECTION>_<KEY>
/// For example: KINETIC_APPLICATION_LOG_LEVEL, KINETIC_BATCH_TIMEOUT_MS
fn apply_env_overrides(config: &mut KineticConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("KINETIC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Pseudonymization overrides
    config.pseudonymization.apply_env_overrides()?;

    // Batch overrides
    if let Ok(val) = std::env::var("KINETIC_BATCH_TIMEOUT_MS") {
        config.batch.timeout_ms = val.parse().map_err(|_| {
            KineticError::Configuration(format!("Invalid KINETIC_BATCH_TIMEOUT_MS value: {val}"))
        })?;
    }
    if let Ok(val) = std::env::var("KINETIC_BATCH_OUTPUT_DIR") {
        config.batch.output_dir = val.into();
    }

    // Logging overrides
    if let Ok(val) = std::env::var("KINETIC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("KINETIC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("KINETIC_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

/// Serializes tests that read or write `KINETIC_*` variables
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("KINETIC_TEST_VAR", "test_value");
        let input = "log_path = \"${KINETIC_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "log_path = \"test_value\"\n");
        std::env::remove_var("KINETIC_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var("KINETIC_MISSING_VAR");
        let result = substitute_env_vars("log_path = \"${KINETIC_MISSING_VAR}\"");
        assert!(result.unwrap_err().to_string().contains("KINETIC_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var("KINETIC_MISSING_VAR");
        let result = substitute_env_vars("# path = \"${KINETIC_MISSING_VAR}\"").unwrap();
        assert!(result.contains("${KINETIC_MISSING_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(KineticError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let toml_content = r#"
[application]
log_level = "warn"

[pseudonymization]
categories = ["NAAM", "DATUM"]
anchor_date = "2024-01-15"

[batch]
timeout_ms = 5000
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "warn");
        assert_eq!(config.pseudonymization.categories.len(), 2);
        assert_eq!(config.batch.timeout_ms, 5000);
    }

    #[test]
    fn test_env_overrides_applied() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("KINETIC_BATCH_TIMEOUT_MS", "1234");
        std::env::set_var("KINETIC_PSEUDONYMIZATION_ANCHOR_POLICY", "incident");

        let config = parse_config("").unwrap();

        std::env::remove_var("KINETIC_BATCH_TIMEOUT_MS");
        std::env::remove_var("KINETIC_PSEUDONYMIZATION_ANCHOR_POLICY");

        assert_eq!(config.batch.timeout_ms, 1234);
        assert_eq!(
            config.pseudonymization.anchor_policy,
            crate::pseudonymization::AnchorPolicy::Incident
        );
    }

    #[test]
    fn test_invalid_env_override_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("KINETIC_BATCH_TIMEOUT_MS", "soon");
        let result = parse_config("");
        std::env::remove_var("KINETIC_BATCH_TIMEOUT_MS");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_error_reported() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let result = parse_config("[application]\nlog_level = \"loud\"\n");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Configuration validation failed"));
    }
}
