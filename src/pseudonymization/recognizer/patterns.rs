//! Pattern library for the structurally specific categories
//!
//! Entries are loaded from TOML (see `patterns/nl_patterns.toml`), compiled
//! with `fancy_regex` so they may use look-around, and turned into one
//! [`PatternRecognizer`] per entry.
//!
//! The backtrack budget of a `fancy_regex` search covers every start
//! position in the document, so it is raised well above the library default.
//! A search that still exhausts it fails the document.

use super::{Recognition, Recognizer};
use crate::domain::{KineticError, Result};
use crate::pseudonymization::models::{Category, Span};
use crate::pseudonymization::validators::Validator;
use fancy_regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Backtrack budget per search, enough for multi-megabyte documents with the
/// built-in patterns
pub const BACKTRACK_LIMIT: usize = 200_000_000;

/// Pattern definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDefinition {
    /// Regex patterns for this entry
    pub patterns: Vec<String>,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Category label
    pub category: String,
    /// Optional checksum or shape validator
    #[serde(default)]
    pub validator: Option<Validator>,
}

/// Pattern library container
#[derive(Debug, Deserialize)]
struct PatternFile {
    patterns: BTreeMap<String, PatternDefinition>,
}

/// Recognizer backed by one or more compiled patterns
#[derive(Debug)]
pub struct PatternRecognizer {
    name: String,
    category: Category,
    confidence: f32,
    validator: Option<Validator>,
    regexes: Vec<Regex>,
}

impl PatternRecognizer {
    /// Compile a recognizer from a pattern definition
    pub fn compile(name: &str, def: &PatternDefinition) -> Result<Self> {
        Self::compile_with_limit(name, def, BACKTRACK_LIMIT)
    }

    fn compile_with_limit(name: &str, def: &PatternDefinition, limit: usize) -> Result<Self> {
        let category: Category = def.category.parse().map_err(|e| {
            KineticError::Pattern(format!("Invalid category in pattern '{name}': {e}"))
        })?;

        if category == Category::Datum || category == Category::Naam {
            return Err(KineticError::Pattern(format!(
                "Pattern '{name}': category {category} has a dedicated recognizer"
            )));
        }
        if def.patterns.is_empty() {
            return Err(KineticError::Pattern(format!(
                "Pattern '{name}' has no regex patterns"
            )));
        }
        if !(0.0..=1.0).contains(&def.confidence) {
            return Err(KineticError::Pattern(format!(
                "Pattern '{name}': confidence must be between 0.0 and 1.0"
            )));
        }

        let regexes = def
            .patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .backtrack_limit(limit)
                    .build()
                    .map_err(|e| {
                        KineticError::Pattern(format!(
                            "Invalid regex in pattern '{name}': {p}: {e}"
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            category,
            confidence: def.confidence,
            validator: def.validator,
            regexes,
        })
    }

    pub fn validator(&self) -> Option<Validator> {
        self.validator
    }
}

impl Recognizer for PatternRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    fn recognize(&self, text: &str) -> Result<Recognition> {
        let mut recognition = Recognition::default();
        // several patterns of one entry may hit the same range
        let mut seen: BTreeSet<(usize, usize)> = BTreeSet::new();

        for regex in &self.regexes {
            for found in regex.find_iter(text) {
                let m = found.map_err(|e| {
                    tracing::error!(recognizer = %self.name, error = %e, "Pattern matching aborted");
                    KineticError::Pattern(format!(
                        "pattern '{}' could not scan the document: {e}",
                        self.name
                    ))
                })?;

                if !seen.insert((m.start(), m.end())) {
                    continue;
                }

                if let Some(validator) = self.validator {
                    if !validator.check(m.as_str()) {
                        recognition.rejected += 1;
                        continue;
                    }
                }

                if let Some(span) =
                    Span::new(text, m.start(), m.end(), self.category, self.confidence)
                {
                    recognition.spans.push(span);
                }
            }
        }

        recognition.spans.sort_by_key(|s| (s.start(), s.end()));
        Ok(recognition)
    }
}

/// Compiled pattern library
pub struct PatternLibrary {
    recognizers: Vec<PatternRecognizer>,
}

impl PatternLibrary {
    /// Load a pattern library from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            KineticError::Pattern(format!(
                "Failed to read pattern library {}: {e}",
                path.display()
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Load a pattern library from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: PatternFile = toml::from_str(content).map_err(|e| {
            KineticError::Pattern(format!("Failed to parse pattern library TOML: {e}"))
        })?;

        let recognizers = file
            .patterns
            .iter()
            .map(|(name, def)| PatternRecognizer::compile(name, def))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(entries = recognizers.len(), "Pattern library compiled");

        Ok(Self { recognizers })
    }

    /// Built-in Dutch pattern library
    pub fn default_patterns() -> Result<Self> {
        let default_toml = include_str!("../../../patterns/nl_patterns.toml");
        Self::from_toml(default_toml)
    }

    /// Compiled recognizers, sorted by entry name
    pub fn recognizers(&self) -> &[PatternRecognizer] {
        &self.recognizers
    }

    /// Recognizers for one category
    pub fn recognizers_for(&self, category: Category) -> impl Iterator<Item = &PatternRecognizer> {
        self.recognizers
            .iter()
            .filter(move |r| r.category == category)
    }

    /// Drop entries whose category is not enabled
    pub fn retain_categories(&mut self, enabled: &[Category]) {
        self.recognizers.retain(|r| enabled.contains(&r.category));
    }

    /// Hand the recognizers over, boxed for a [`super::RecognizerSet`]
    pub fn into_recognizers(self) -> Vec<Box<dyn Recognizer>> {
        self.recognizers
            .into_iter()
            .map(|r| Box::new(r) as Box<dyn Recognizer>)
            .collect()
    }
}
