//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted file logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! Log events carry document ids, categories, counts and lengths. They never
//! carry the text of a detected span.
//!
//! # Example
//!
//! ```no_run
//! use kinetic::logging::init_logging;
//! use kinetic::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a document
///
/// # Example
///
/// ```no_run
/// use kinetic::log_document_start;
/// use kinetic::domain::{DocumentId, SessionId};
///
/// let document_id = DocumentId::new("brief-001.txt").unwrap();
/// let session_id = SessionId::new();
/// log_document_start!(&document_id, &session_id);
/// ```
#[macro_export]
macro_rules! log_document_start {
    ($document_id:expr, $session_id:expr) => {
        tracing::debug!(
            document_id = %$document_id,
            session_id = %$session_id,
            "Pseudonymizing document"
        );
    };
}

/// Log the completion of a document
///
/// # Example
///
/// ```no_run
/// use kinetic::log_document_complete;
/// use std::time::Duration;
///
/// log_document_complete!("brief-001.txt", 12, Duration::from_millis(8));
/// ```
#[macro_export]
macro_rules! log_document_complete {
    ($document_id:expr, $substitutions:expr, $duration:expr) => {
        tracing::info!(
            document_id = %$document_id,
            substitutions = $substitutions,
            duration_ms = $duration.as_millis() as u64,
            "Document pseudonymized"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use kinetic::log_error_with_context;
/// use kinetic::domain::KineticError;
///
/// let error = KineticError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log batch progress
///
/// # Example
///
/// ```no_run
/// use kinetic::log_batch_progress;
///
/// log_batch_progress!(3, 10);
/// ```
#[macro_export]
macro_rules! log_batch_progress {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Processing batch"
        );
    };
}
