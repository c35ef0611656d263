//! Error context extension trait
//!
//! Adds `.context()` / `.with_context()` to any `Result` whose error converts
//! into [`KineticError`]. Unlike `anyhow::Context`, the variant of the
//! underlying error is kept, so a wrapped registry failure still reports
//! itself as session fatal.
//!
//! # Examples
//!
//! ```rust
//! use kinetic::domain::Result;
//! use kinetic::domain::context::ResultExt;
//!
//! fn read_gazetteer(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_context(|| format!("Failed to read gazetteer: {}", path))
//! }
//! ```

use crate::domain::errors::KineticError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error (evaluated eagerly)
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error using a closure (evaluated only on error)
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<KineticError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| wrap(e.into(), &context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let context = f();
            wrap(e.into(), &context)
        })
    }
}

fn wrap(err: KineticError, context: &dyn std::fmt::Display) -> KineticError {
    match err {
        KineticError::DateResolution(msg) => {
            KineticError::DateResolution(format!("{context}: {msg}"))
        }
        KineticError::RegistryConsistency(msg) => {
            KineticError::RegistryConsistency(format!("{context}: {msg}"))
        }
        KineticError::Timeout(msg) => KineticError::Timeout(format!("{context}: {msg}")),
        other => KineticError::Other(format!("{context}: {other}")),
    }
}
