//! Gazetteer-backed recognizers for hospitals and places
//!
//! The lookup lists are injected through the [`Gazetteer`] trait so new
//! institutions and municipalities can be added without touching recognizer
//! code.

use super::{Recognition, Recognizer};
use crate::domain::{KineticError, Result};
use crate::pseudonymization::models::{Category, Span};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Source of known proper names for the gazetteer categories
pub trait Gazetteer: Send + Sync {
    /// Where the lists came from, for logs
    fn source(&self) -> &str;

    /// Entries for `category`. Categories the gazetteer does not cover return
    /// an empty slice.
    fn entries(&self, category: Category) -> &[String];
}

#[derive(Debug, Deserialize)]
struct GazetteerFile {
    #[serde(default)]
    hospitals: Vec<String>,
    #[serde(default)]
    places: Vec<String>,
}

/// Gazetteer loaded from TOML (`hospitals = [...]`, `places = [...]`)
#[derive(Debug, Clone)]
pub struct TomlGazetteer {
    source: String,
    hospitals: Vec<String>,
    places: Vec<String>,
}

impl TomlGazetteer {
    /// Built-in Dutch hospital and municipality lists
    pub fn embedded() -> Result<Self> {
        let content = include_str!("../../../data/gazetteer.toml");
        Self::from_toml("embedded", content)
    }

    /// Load a gazetteer from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            KineticError::Gazetteer(format!("Failed to read gazetteer {}: {e}", path.display()))
        })?;
        Self::from_toml(&path.display().to_string(), &content)
    }

    /// Parse gazetteer TOML content
    pub fn from_toml(source: &str, content: &str) -> Result<Self> {
        let file: GazetteerFile = toml::from_str(content).map_err(|e| {
            KineticError::Gazetteer(format!("Failed to parse gazetteer {source}: {e}"))
        })?;

        Ok(Self {
            source: source.to_string(),
            hospitals: clean_entries(source, "hospitals", file.hospitals)?,
            places: clean_entries(source, "places", file.places)?,
        })
    }

    /// Add the entries of `other` to this gazetteer
    pub fn merged(mut self, other: TomlGazetteer) -> Self {
        self.source = format!("{}+{}", self.source, other.source);
        self.hospitals = dedup(self.hospitals.into_iter().chain(other.hospitals));
        self.places = dedup(self.places.into_iter().chain(other.places));
        self
    }
}

impl Gazetteer for TomlGazetteer {
    fn source(&self) -> &str {
        &self.source
    }

    fn entries(&self, category: Category) -> &[String] {
        match category {
            Category::Ziekenhuis => &self.hospitals,
            Category::Plaats => &self.places,
            _ => &[],
        }
    }
}

fn clean_entries(source: &str, list: &str, entries: Vec<String>) -> Result<Vec<String>> {
    let mut cleaned = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.split_whitespace().collect::<Vec<_>>().join(" ");
        if entry.is_empty() {
            return Err(KineticError::Gazetteer(format!(
                "{source}: empty entry in '{list}'"
            )));
        }
        cleaned.push(entry);
    }
    Ok(dedup(cleaned.into_iter()))
}

fn dedup(entries: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    entries.filter(|e| seen.insert(e.clone())).collect()
}

/// Exact whole-word matcher over one gazetteer list
///
/// Entries are matched with one alternation, longest entry first. A match is
/// accepted only when the characters around it are not letters or digits;
/// when the longest candidate at an offset fails that check, the shorter
/// entries are tried at the same offset.
pub struct GazetteerRecognizer {
    name: String,
    category: Category,
    confidence: f32,
    alternation: Option<Regex>,
    /// One start-anchored regex per entry, in alternation order
    entries: Vec<Regex>,
}

impl GazetteerRecognizer {
    /// Build a recognizer for `category` from the gazetteer's list
    pub fn new(gazetteer: &dyn Gazetteer, category: Category, confidence: f32) -> Result<Self> {
        let mut entries: Vec<&String> = gazetteer.entries(category).iter().collect();
        // longest first, so "Amsterdam UMC" wins over a shorter entry at the same offset
        entries.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });

        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                KineticError::Gazetteer(format!(
                    "Failed to compile {category} gazetteer from {}: {e}",
                    gazetteer.source()
                ))
            })
        };

        let patterns: Vec<String> = entries
            .iter()
            .map(|entry| {
                entry
                    .split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect();

        let alternation = if patterns.is_empty() {
            None
        } else {
            Some(compile(&format!("(?:{})", patterns.join("|")))?)
        };
        let entry_regexes = patterns
            .iter()
            .map(|p| compile(&format!(r"\A(?:{p})")))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            category = %category,
            entries = entries.len(),
            source = gazetteer.source(),
            "Gazetteer recognizer built"
        );

        Ok(Self {
            name: format!("gazetteer_{}", category.label().to_lowercase()),
            category,
            confidence,
            alternation,
            entries: entry_regexes,
        })
    }

    /// Longest entry at `start` that ends on a word boundary
    fn bounded_match_at(&self, text: &str, start: usize) -> Option<usize> {
        let rest = &text[start..];
        self.entries
            .iter()
            .filter_map(|entry| entry.find(rest))
            .map(|m| start + m.end())
            .find(|&end| !is_word_char_at(text, end))
    }
}

/// Whether the character starting at byte `index` is a letter or digit
fn is_word_char_at(text: &str, index: usize) -> bool {
    text[index..].chars().next().is_some_and(char::is_alphanumeric)
}

/// Whether the character ending at byte `index` is a letter or digit
fn is_word_char_before(text: &str, index: usize) -> bool {
    text[..index]
        .chars()
        .next_back()
        .is_some_and(char::is_alphanumeric)
}

/// Byte offset of the character after the one at `index`
fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len(), |c| index + c.len_utf8())
}

impl Recognizer for GazetteerRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    fn recognize(&self, text: &str) -> Result<Recognition> {
        let mut recognition = Recognition::default();
        let Some(alternation) = &self.alternation else {
            return Ok(recognition);
        };

        let mut pos = 0;
        while pos < text.len() {
            let Some(m) = alternation.find_at(text, pos) else {
                break;
            };
            let start = m.start();

            let end = if is_word_char_before(text, start) {
                None
            } else if !is_word_char_at(text, m.end()) {
                Some(m.end())
            } else {
                self.bounded_match_at(text, start)
            };

            match end {
                Some(end) => {
                    if let Some(span) = Span::new(text, start, end, self.category, self.confidence)
                    {
                        recognition.spans.push(span);
                    }
                    pos = end;
                }
                None => pos = next_char_boundary(text, start),
            }
        }

        Ok(recognition)
    }
}
