//! Date recognizer
//!
//! Surface forms:
//! - `DD-MM-YYYY`, `DD/MM/YYYY`, `DD.MM.YYYY`
//! - `DD-MM-YY`, `DD/MM/YY` (two-digit years pivot around a configurable year)
//! - ISO `YYYY-MM-DD`
//! - `D maand YYYY` with full or abbreviated Dutch month names
//!
//! Every emitted span carries its normalized calendar date. Matches that are
//! not a real calendar date (`31-02-2024`) are counted as rejected.

use super::{Recognition, Recognizer};
use crate::domain::{KineticError, Result};
use crate::pseudonymization::models::{Category, Span};
use chrono::NaiveDate;
use regex::{Captures, Regex};

/// Default two-digit year pivot: `49` is 2049, `50` is 1950
pub const DEFAULT_YEAR_PIVOT: u32 = 50;

const NUMERIC_CONFIDENCE: f32 = 0.9;
const WRITTEN_CONFIDENCE: f32 = 0.95;

// Full names precede their abbreviations so the alternation prefers them.
const MONTHS: [(&str, u32); 22] = [
    ("januari", 1),
    ("februari", 2),
    ("maart", 3),
    ("april", 4),
    ("mei", 5),
    ("juni", 6),
    ("juli", 7),
    ("augustus", 8),
    ("september", 9),
    ("oktober", 10),
    ("november", 11),
    ("december", 12),
    ("jan", 1),
    ("febr", 2),
    ("feb", 2),
    ("mrt", 3),
    ("apr", 4),
    ("aug", 8),
    ("sept", 9),
    ("sep", 9),
    ("okt", 10),
    ("nov", 11),
];

// Bare "dec", "jun" and "jul" occur as clinical shorthand; these need a
// trailing dot.
const DOTTED_ONLY: [(&str, u32); 3] = [("dec", 12), ("jun", 6), ("jul", 7)];

/// Recognizer for calendar dates
pub struct DateRecognizer {
    numeric: Regex,
    iso: Regex,
    written: Regex,
    year_pivot: u32,
}

impl DateRecognizer {
    /// Create a date recognizer with the given two-digit year pivot
    pub fn new(year_pivot: u32) -> Result<Self> {
        if year_pivot > 99 {
            return Err(KineticError::Configuration(format!(
                "two-digit year pivot must be between 0 and 99, got {year_pivot}"
            )));
        }

        let months = MONTHS
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join("|");
        let dotted = DOTTED_ONLY
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join("|");

        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| KineticError::Pattern(format!("Invalid date pattern: {e}")))
        };

        Ok(Self {
            numeric: compile(r"\b(\d{1,2})([-/.])(\d{1,2})([-/.])(\d{4}|\d{2})\b")?,
            iso: compile(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b")?,
            written: compile(&format!(
                r"(?i)\b(\d{{1,2}})\s+(?:(?P<month>{months})\.?|(?P<dotted>{dotted})\.)\s+(\d{{4}})\b"
            ))?,
            year_pivot,
        })
    }

    fn expand_year(&self, year: u32, digits: usize) -> i32 {
        let year = if digits == 2 {
            if year < self.year_pivot {
                2000 + year
            } else {
                1900 + year
            }
        } else {
            year
        };
        year as i32
    }

    fn numeric_date(&self, caps: &Captures<'_>) -> Option<Option<NaiveDate>> {
        let first_sep = caps.get(2)?.as_str();
        let second_sep = caps.get(4)?.as_str();
        let year_text = caps.get(5)?.as_str();

        // no mixed separators ("12-05/2024"), no short dotted forms ("1.2.34")
        if first_sep != second_sep || (first_sep == "." && year_text.len() != 4) {
            return None;
        }

        let day: u32 = caps.get(1)?.as_str().parse().ok()?;
        let month: u32 = caps.get(3)?.as_str().parse().ok()?;
        let year: u32 = year_text.parse().ok()?;
        let year = self.expand_year(year, year_text.len());

        Some(NaiveDate::from_ymd_opt(year, month, day))
    }

    fn iso_date(caps: &Captures<'_>) -> Option<Option<NaiveDate>> {
        let year: i32 = caps.get(1)?.as_str().parse().ok()?;
        let month: u32 = caps.get(2)?.as_str().parse().ok()?;
        let day: u32 = caps.get(3)?.as_str().parse().ok()?;
        Some(NaiveDate::from_ymd_opt(year, month, day))
    }

    fn written_date(caps: &Captures<'_>) -> Option<Option<NaiveDate>> {
        let day: u32 = caps.get(1)?.as_str().parse().ok()?;
        let month_name = caps
            .name("month")
            .or_else(|| caps.name("dotted"))?
            .as_str()
            .to_lowercase();
        let month = month_number(&month_name)?;
        let year: i32 = caps.get(4)?.as_str().parse().ok()?;
        Some(NaiveDate::from_ymd_opt(year, month, day))
    }

    fn collect<F>(&self, regex: &Regex, text: &str, confidence: f32, parse: F, out: &mut Recognition)
    where
        F: Fn(&Captures<'_>) -> Option<Option<NaiveDate>>,
    {
        for caps in regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            match parse(&caps) {
                // not a date shape after all
                None => {}
                Some(None) => out.rejected += 1,
                Some(Some(date)) => {
                    if let Some(span) =
                        Span::date(text, whole.start(), whole.end(), date, confidence)
                    {
                        out.spans.push(span);
                    }
                }
            }
        }
    }
}

impl Recognizer for DateRecognizer {
    fn name(&self) -> &str {
        "date"
    }

    fn category(&self) -> Category {
        Category::Datum
    }

    fn recognize(&self, text: &str) -> Result<Recognition> {
        let mut recognition = Recognition::default();

        self.collect(
            &self.numeric,
            text,
            NUMERIC_CONFIDENCE,
            |caps| self.numeric_date(caps),
            &mut recognition,
        );
        self.collect(
            &self.iso,
            text,
            NUMERIC_CONFIDENCE,
            Self::iso_date,
            &mut recognition,
        );
        self.collect(
            &self.written,
            text,
            WRITTEN_CONFIDENCE,
            Self::written_date,
            &mut recognition,
        );

        recognition.spans.sort_by_key(|s| (s.start(), s.end()));
        recognition
            .spans
            .dedup_by_key(|s| (s.start(), s.end()));
        Ok(recognition)
    }
}

fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .chain(DOTTED_ONLY.iter())
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, number)| *number)
}
