//! Relative timeline for dates
//!
//! Each document gets one anchor date. Every date span is rendered as its
//! signed day offset from that anchor: `[T+0]`, `[T+366]`, `[T-14]`.

use crate::domain::{KineticError, Result};
use crate::pseudonymization::models::{Category, Span};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Words that mark the incident date in the text preceding it
pub const INCIDENT_KEYWORDS: [&str; 5] = ["ongeval", "trauma", "incident", "schade", "val"];

/// How far back (in characters) an incident keyword may appear
pub const INCIDENT_WINDOW_CHARS: usize = 40;

/// How the anchor date of a document is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPolicy {
    /// The earliest date in the document
    #[default]
    Earliest,
    /// The date introduced by an incident keyword, else the earliest date
    Incident,
}

impl fmt::Display for AnchorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Earliest => f.write_str("earliest"),
            Self::Incident => f.write_str("incident"),
        }
    }
}

impl FromStr for AnchorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "earliest" => Ok(Self::Earliest),
            "incident" => Ok(Self::Incident),
            other => Err(format!(
                "Unknown anchor policy '{other}', expected 'earliest' or 'incident'"
            )),
        }
    }
}

/// Where an anchor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSource {
    /// Supplied by the caller
    Explicit,
    /// A date preceded by an incident keyword
    Incident,
    /// The earliest date in the document
    Earliest,
}

/// Zero point of a document's timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    date: NaiveDate,
    source: AnchorSource,
}

impl Anchor {
    pub fn new(date: NaiveDate, source: AnchorSource) -> Self {
        Self { date, source }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn source(&self) -> AnchorSource {
        self.source
    }

    /// Signed number of days from the anchor to `date`
    pub fn offset_days(&self, date: NaiveDate) -> i64 {
        (date - self.date).num_days()
    }

    /// Placeholder for `date`
    pub fn placeholder(&self, date: NaiveDate) -> String {
        let offset = self.offset_days(date);
        if offset < 0 {
            format!("[T-{}]", offset.unsigned_abs())
        } else {
            format!("[T+{offset}]")
        }
    }
}

/// Anchor choice for one document, with an operator warning when the policy
/// had to fall back
#[derive(Debug, Clone, Default)]
pub struct AnchorDecision {
    pub anchor: Option<Anchor>,
    pub warning: Option<String>,
}

/// Chooses anchors and renders date spans
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineTransformer {
    policy: AnchorPolicy,
}

impl TimelineTransformer {
    pub fn new(policy: AnchorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AnchorPolicy {
        self.policy
    }

    /// Choose the anchor for a document.
    ///
    /// An explicit date always wins. Otherwise the policy is applied to the
    /// document's date spans; without any date span there is no anchor.
    pub fn choose_anchor(
        &self,
        text: &str,
        spans: &[Span],
        explicit: Option<NaiveDate>,
    ) -> AnchorDecision {
        if let Some(date) = explicit {
            return AnchorDecision {
                anchor: Some(Anchor::new(date, AnchorSource::Explicit)),
                warning: None,
            };
        }

        let dated: Vec<(&Span, NaiveDate)> = spans
            .iter()
            .filter(|s| s.category() == Category::Datum)
            .filter_map(|s| s.calendar_date().map(|d| (s, d)))
            .collect();

        let Some(earliest) = dated.iter().map(|(_, d)| *d).min() else {
            return AnchorDecision::default();
        };
        let earliest = Anchor::new(earliest, AnchorSource::Earliest);

        match self.policy {
            AnchorPolicy::Earliest => AnchorDecision {
                anchor: Some(earliest),
                warning: None,
            },
            AnchorPolicy::Incident => {
                let incident = dated
                    .iter()
                    .find(|(span, _)| has_incident_context(text, span.start()))
                    .map(|(_, date)| Anchor::new(*date, AnchorSource::Incident));

                match incident {
                    Some(anchor) => AnchorDecision {
                        anchor: Some(anchor),
                        warning: None,
                    },
                    None => AnchorDecision {
                        anchor: Some(earliest),
                        warning: Some(
                            "No incident date found, timeline anchored on the earliest date"
                                .to_string(),
                        ),
                    },
                }
            }
        }
    }

    /// Render a date span relative to `anchor`.
    ///
    /// Fails with `DateResolution` when the document has no anchor or the
    /// span carries no calendar date.
    pub fn render(anchor: Option<&Anchor>, span: &Span) -> Result<String> {
        let anchor = anchor.ok_or_else(|| {
            KineticError::DateResolution(
                "relative date requested for a document without an anchor date".to_string(),
            )
        })?;
        let date = span.calendar_date().ok_or_else(|| {
            KineticError::DateResolution(format!(
                "span at offset {} has no calendar date",
                span.start()
            ))
        })?;
        Ok(anchor.placeholder(date))
    }
}

/// Whether an incident keyword appears in the same sentence, within
/// [`INCIDENT_WINDOW_CHARS`] characters before `start`
fn has_incident_context(text: &str, start: usize) -> bool {
    let context = preceding_context(text, start).to_lowercase();
    context
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| {
            INCIDENT_KEYWORDS
                .iter()
                .any(|kw| word == *kw || (kw.len() > 3 && word.starts_with(kw)))
        })
}

fn preceding_context(text: &str, start: usize) -> &str {
    let before = &text[..start];
    let window_start = before
        .char_indices()
        .rev()
        .nth(INCIDENT_WINDOW_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let window = &before[window_start..];

    // cut at the last line break or sentence end (".", "!" or "?" followed by
    // whitespace and a capital)
    let chars: Vec<(usize, char)> = window.char_indices().collect();
    let mut cut = 0;
    for (idx, &(pos, c)) in chars.iter().enumerate() {
        if c == '\n' {
            cut = pos + c.len_utf8();
        } else if matches!(c, '.' | '!' | '?') {
            let mut rest = chars[idx + 1..].iter().map(|(_, c)| *c);
            let mut saw_space = false;
            let next = loop {
                match rest.next() {
                    Some(c) if c.is_whitespace() => saw_space = true,
                    other => break other,
                }
            };
            if saw_space && next.is_some_and(char::is_uppercase) {
                cut = pos + c.len_utf8();
            }
        }
    }

    &window[cut..]
}
