//! Span substitution

use crate::domain::Result;
use crate::pseudonymization::models::{AuditEntry, Category, Span};
use std::collections::BTreeMap;

/// Rewritten text plus its audit trail
#[derive(Debug, Clone, Default)]
pub struct Rewrite {
    pub text: String,
    /// One entry per substitution, in document order
    pub audit_record: Vec<AuditEntry>,
    pub substitutions: BTreeMap<Category, usize>,
}

/// Replace every span of a non-overlapping, ordered span list.
///
/// `placeholder` is asked for each span in document order; the first error
/// aborts the rewrite.
pub fn rewrite<F>(text: &str, spans: &[Span], mut placeholder: F) -> Result<Rewrite>
where
    F: FnMut(&Span) -> Result<String>,
{
    let mut output = String::with_capacity(text.len());
    let mut audit_record = Vec::with_capacity(spans.len());
    let mut substitutions = BTreeMap::new();
    let mut cursor = 0;

    for span in spans {
        debug_assert!(span.start() >= cursor, "spans must be ordered and disjoint");
        let replacement = placeholder(span)?;

        output.push_str(&text[cursor..span.start()]);
        output.push_str(&replacement);
        cursor = span.end();

        audit_record.push(AuditEntry {
            category: span.category(),
            placeholder: replacement,
            span_length: span.char_len(),
        });
        *substitutions.entry(span.category()).or_insert(0) += 1;
    }
    output.push_str(&text[cursor..]);

    Ok(Rewrite {
        text: output,
        audit_record,
        substitutions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::KineticError;

    #[test]
    fn test_rewrite_keeps_unmatched_text() {
        let text = "Bel 06-12345678 of mail a@b.nl.";
        let spans = vec![
            Span::new(text, 4, 15, Category::Telefoon, 0.9).unwrap(),
            Span::new(text, 24, 30, Category::Email, 0.9).unwrap(),
        ];
        let result = rewrite(text, &spans, |s| Ok(format!("[{}]", s.category()))).unwrap();

        assert_eq!(result.text, "Bel [TELEFOON] of mail [EMAIL].");
        assert_eq!(result.audit_record.len(), 2);
        assert_eq!(result.audit_record[0].span_length, 11);
        assert_eq!(result.audit_record[1].placeholder, "[EMAIL]");
        assert_eq!(result.substitutions.get(&Category::Telefoon), Some(&1));
    }

    #[test]
    fn test_span_length_counts_characters() {
        let text = "Zoë Öztürk";
        let spans = vec![Span::new(text, 0, text.len(), Category::Naam, 0.9).unwrap()];
        let result = rewrite(text, &spans, |_| Ok("[NAAM_1]".to_string())).unwrap();
        assert_eq!(result.audit_record[0].span_length, 10);
    }

    #[test]
    fn test_no_spans_returns_input() {
        let result = rewrite("niets te doen", &[], |_| unreachable!()).unwrap();
        assert_eq!(result.text, "niets te doen");
        assert!(result.audit_record.is_empty());
    }

    #[test]
    fn test_placeholder_error_aborts() {
        let text = "15-01-2024";
        let spans = vec![Span::new(text, 0, 10, Category::Datum, 0.9).unwrap()];
        let result = rewrite(text, &spans, |_| {
            Err(KineticError::DateResolution("no anchor".to_string()))
        });
        assert!(matches!(result, Err(KineticError::DateResolution(_))));
    }
}
