//! Categories and candidate spans

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of identifying categories recognized in Dutch medical text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Personal names
    Naam,
    /// Hospitals and clinics
    Ziekenhuis,
    /// Municipalities and cities
    Plaats,
    /// Dutch postal codes (1234 AB)
    Postcode,
    /// Calendar dates
    Datum,
    /// Burgerservicenummer
    Bsn,
    /// Phone numbers
    Telefoon,
    /// Email addresses
    Email,
    /// Bank account numbers
    Iban,
}

/// How a category is turned into a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderPolicy {
    /// `[CATEGORY_N]`, one number per distinct entity
    Indexed,
    /// `[CATEGORY]`, every value is equally sensitive
    Fixed,
    /// `[T+N]`, relative to the document's anchor date
    Timeline,
}

impl Category {
    /// All categories, in declaration order
    pub const ALL: [Category; 9] = [
        Self::Naam,
        Self::Ziekenhuis,
        Self::Plaats,
        Self::Postcode,
        Self::Datum,
        Self::Bsn,
        Self::Telefoon,
        Self::Email,
        Self::Iban,
    ];

    /// Label used inside placeholders
    pub fn label(&self) -> &'static str {
        match self {
            Self::Naam => "NAAM",
            Self::Ziekenhuis => "ZIEKENHUIS",
            Self::Plaats => "PLAATS",
            Self::Postcode => "POSTCODE",
            Self::Datum => "DATUM",
            Self::Bsn => "BSN",
            Self::Telefoon => "TELEFOON",
            Self::Email => "EMAIL",
            Self::Iban => "IBAN",
        }
    }

    /// Conflict priority, lower wins.
    ///
    /// Structurally specific categories come first so loose name and place
    /// heuristics cannot shadow them.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Bsn => 0,
            Self::Iban => 1,
            Self::Email => 2,
            Self::Telefoon => 3,
            Self::Postcode => 4,
            Self::Datum => 5,
            Self::Ziekenhuis => 6,
            Self::Plaats => 7,
            Self::Naam => 8,
        }
    }

    /// Placeholder policy for this category
    pub fn placeholder_policy(&self) -> PlaceholderPolicy {
        match self {
            Self::Naam | Self::Ziekenhuis | Self::Plaats | Self::Postcode => {
                PlaceholderPolicy::Indexed
            }
            Self::Bsn | Self::Telefoon | Self::Email | Self::Iban => PlaceholderPolicy::Fixed,
            Self::Datum => PlaceholderPolicy::Timeline,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NAAM" | "NAME" => Ok(Self::Naam),
            "ZIEKENHUIS" | "HOSPITAL" => Ok(Self::Ziekenhuis),
            "PLAATS" | "PLACE" => Ok(Self::Plaats),
            "POSTCODE" => Ok(Self::Postcode),
            "DATUM" | "DATE" => Ok(Self::Datum),
            "BSN" => Ok(Self::Bsn),
            "TELEFOON" | "PHONE" => Ok(Self::Telefoon),
            "EMAIL" => Ok(Self::Email),
            "IBAN" => Ok(Self::Iban),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}

/// Candidate span produced by a recognizer
///
/// Offsets are byte offsets into the source text and always fall on char
/// boundaries. A span is immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    start: usize,
    end: usize,
    category: Category,
    raw_text: String,
    confidence: f32,
    /// Normalized calendar date, only for `Datum` spans
    date: Option<NaiveDate>,
}

impl Span {
    /// Create a span over `text[start..end]`.
    ///
    /// Returns `None` when the range is empty, out of bounds or not on char
    /// boundaries.
    pub fn new(
        text: &str,
        start: usize,
        end: usize,
        category: Category,
        confidence: f32,
    ) -> Option<Self> {
        if start >= end || end > text.len() {
            return None;
        }
        let raw_text = text.get(start..end)?.to_string();
        Some(Self {
            start,
            end,
            category,
            raw_text,
            confidence: confidence.clamp(0.0, 1.0),
            date: None,
        })
    }

    /// Create a date span carrying its normalized calendar date
    pub fn date(
        text: &str,
        start: usize,
        end: usize,
        date: NaiveDate,
        confidence: f32,
    ) -> Option<Self> {
        let mut span = Self::new(text, start, end, Category::Datum, confidence)?;
        span.date = Some(date);
        Some(span)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Normalized date of a `Datum` span
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Length in characters, as reported in audit records
    pub fn char_len(&self) -> usize {
        self.raw_text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the two spans share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely inside this span (and is not identical to it)
    pub fn strictly_contains(&self, other: &Span) -> bool {
        self.start <= other.start
            && other.end <= self.end
            && (self.start, self.end) != (other.start, other.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let mut categories = Category::ALL.to_vec();
        categories.sort_by_key(|c| c.priority());
        assert_eq!(
            categories,
            vec![
                Category::Bsn,
                Category::Iban,
                Category::Email,
                Category::Telefoon,
                Category::Postcode,
                Category::Datum,
                Category::Ziekenhuis,
                Category::Plaats,
                Category::Naam,
            ]
        );
    }

    #[test]
    fn test_placeholder_policy() {
        assert_eq!(Category::Naam.placeholder_policy(), PlaceholderPolicy::Indexed);
        assert_eq!(Category::Postcode.placeholder_policy(), PlaceholderPolicy::Indexed);
        assert_eq!(Category::Bsn.placeholder_policy(), PlaceholderPolicy::Fixed);
        assert_eq!(Category::Iban.placeholder_policy(), PlaceholderPolicy::Fixed);
        assert_eq!(Category::Datum.placeholder_policy(), PlaceholderPolicy::Timeline);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("naam".parse::<Category>().unwrap(), Category::Naam);
        assert_eq!("HOSPITAL".parse::<Category>().unwrap(), Category::Ziekenhuis);
        assert!("adres".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_label() {
        let json = serde_json::to_string(&Category::Ziekenhuis).unwrap();
        assert_eq!(json, "\"ZIEKENHUIS\"");
    }

    #[test]
    fn test_span_bounds() {
        let text = "Jan de Vries";
        assert!(Span::new(text, 0, 3, Category::Naam, 1.0).is_some());
        assert!(Span::new(text, 3, 3, Category::Naam, 1.0).is_none());
        assert!(Span::new(text, 0, 99, Category::Naam, 1.0).is_none());
    }

    #[test]
    fn test_span_rejects_non_char_boundary() {
        let text = "Zoë";
        // 'ë' is two bytes starting at offset 2
        assert!(Span::new(text, 0, 3, Category::Naam, 1.0).is_none());
        assert!(Span::new(text, 0, 4, Category::Naam, 1.0).is_some());
    }

    #[test]
    fn test_span_containment() {
        let text = "Amsterdam UMC";
        let hospital = Span::new(text, 0, 13, Category::Ziekenhuis, 1.0).unwrap();
        let place = Span::new(text, 0, 9, Category::Plaats, 1.0).unwrap();
        assert!(hospital.strictly_contains(&place));
        assert!(!place.strictly_contains(&hospital));
        assert!(!hospital.strictly_contains(&hospital));
        assert!(hospital.overlaps(&place));
    }

    #[test]
    fn test_confidence_clamped() {
        let span = Span::new("abc", 0, 3, Category::Email, 1.7).unwrap();
        assert_eq!(span.confidence(), 1.0);
    }
}
