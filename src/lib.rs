// Kinetic - Local pseudonymization of Dutch medical records
// Copyright (c) 2025 Kinetic Contributors
// Licensed under the MIT License

//! # Kinetic - Pseudonymization of Dutch medical records
//!
//! Kinetic replaces personal data in Dutch clinical free text with labelled
//! placeholders, locally and without network access.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Recognizing** names, hospitals, places, postcodes, dates, BSNs, phone
//!   numbers, e-mail addresses and IBANs
//! - **Resolving** overlapping candidates into one non-overlapping span set
//! - **Labelling** names, hospitals and places consistently within a session
//!   (`[NAAM_1]`, `[ZIEKENHUIS_2]`)
//! - **Shifting** dates onto a relative timeline (`[T+0]`, `[T+14]`)
//! - **Auditing** every substitution with category, placeholder and length
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`pseudonymization`] - Recognizers, resolver, registry, timeline, rewriter and engine
//! - [`domain`] - Identifiers and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kinetic::pseudonymization::new_session;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = new_session()?;
//!
//!     let first = session.process("Dhr. Jan de Vries, opgenomen op 15-01-2024.")?;
//!     let second = session.process("Controle Jan de Vries op 29-01-2024.")?;
//!
//!     // Both documents use [NAAM_1] for Jan de Vries
//!     println!("{}", first.pseudonymized_text);
//!     println!("{}", second.pseudonymized_text);
//!     Ok(())
//! }
//! ```
//!
//! ## Sessions
//!
//! Labels are only consistent within one [`pseudonymization::Session`].
//! Separate sessions never share a registry, so the same name can receive
//! different labels in different sessions.
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`] with a [`domain::KineticError`].
//! A document without a resolvable timeline anchor fails on its own; a registry
//! inconsistency aborts the whole session.
//!
//! ## Logging
//!
//! Kinetic logs with the `tracing` crate. Log events carry document ids,
//! categories and counts, never the detected text.

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod pseudonymization;
