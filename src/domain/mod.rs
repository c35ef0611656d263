//! Domain types for Kinetic.
//!
//! The domain layer provides:
//! - **Identifiers** ([`DocumentId`], [`SessionId`])
//! - **Error types** ([`KineticError`], [`DocumentErrorDetail`])
//! - **Result type alias** ([`Result`])
//! - **Context extension** ([`context::ResultExt`])
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, KineticError>`]:
//!
//! ```rust
//! use kinetic::domain::{KineticError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = kinetic::config::load_config("kinetic.toml")?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod errors;
pub mod ids;
pub mod result;

pub use errors::{DocumentErrorDetail, KineticError};
pub use ids::{DocumentId, SessionId};
pub use result::Result;
