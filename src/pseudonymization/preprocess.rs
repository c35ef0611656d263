//! Text repair before detection
//!
//! OCR engines regularly read a hyphen between digits as `n`
//! (`05n03n2025`). When enabled, this pass restores the hyphen in date- and
//! phone-shaped digit groups so the recognizers see the intended text.

use crate::domain::{KineticError, Result};
use regex::Regex;
use std::borrow::Cow;

/// Repairs OCR misreads of separators
pub struct OcrRepair {
    date: Regex,
    phone: Regex,
}

impl OcrRepair {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| KineticError::Pattern(format!("Invalid OCR repair pattern: {e}")))
        };

        Ok(Self {
            date: compile(r"\b(\d{1,2})n(\d{1,2})n(\d{4}|\d{2})\b")?,
            phone: compile(r"\b(0\d{1,3})n(\d{6,8})\b")?,
        })
    }

    /// Repair `text`, returning the repaired text and the number of repairs
    pub fn repair<'a>(&self, text: &'a str) -> (Cow<'a, str>, usize) {
        let dates = self.date.find_iter(text).count();
        let repaired = self.date.replace_all(text, "$1-$2-$3");

        let phones = self.phone.find_iter(&repaired).count();
        if phones == 0 {
            return (repaired, dates);
        }
        let repaired = self.phone.replace_all(&repaired, "$1-$2").into_owned();

        (Cow::Owned(repaired), dates + phones)
    }
}
