//! Pattern recognizers
//!
//! Every recognizer scans the whole document for one category and returns
//! candidate spans. Recognizers hold no mutable state, so the set can run
//! them concurrently over the same text and merge the results afterwards.
//!
//! A recognizer that cannot finish its scan returns an error instead of a
//! partial result, and the document fails.

pub mod date;
pub mod gazetteer;
pub mod name;
pub mod patterns;

use crate::domain::{KineticError, Result};
use crate::pseudonymization::models::{Category, Span};

/// Output of one recognizer pass
#[derive(Debug, Clone, Default)]
pub struct Recognition {
    /// Accepted candidates
    pub spans: Vec<Span>,
    /// Lexical matches dropped by a validator
    pub rejected: usize,
}

impl Recognition {
    /// Fold another recognizer's output into this one
    pub fn merge(&mut self, other: Recognition) {
        self.spans.extend(other.spans);
        self.rejected += other.rejected;
    }
}

/// Trait for category recognizers
pub trait Recognizer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Category of every span this recognizer emits
    fn category(&self) -> Category;

    /// Scan all of `text` and return candidate spans
    fn recognize(&self, text: &str) -> Result<Recognition>;
}

/// Ordered collection of recognizers
pub struct RecognizerSet {
    recognizers: Vec<Box<dyn Recognizer>>,
}

impl RecognizerSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self {
            recognizers: Vec::new(),
        }
    }

    /// Append a recognizer
    pub fn push(&mut self, recognizer: Box<dyn Recognizer>) {
        self.recognizers.push(recognizer);
    }

    /// Builder-style append
    pub fn with(mut self, recognizer: Box<dyn Recognizer>) -> Self {
        self.push(recognizer);
        self
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }

    /// Categories covered by this set
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> =
            self.recognizers.iter().map(|r| r.category()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Run every recognizer over `text` and merge their candidates.
    ///
    /// With `parallel`, each recognizer runs on its own scoped thread. The
    /// merged result is in recognizer order either way. The first failing
    /// recognizer, including one that panicked, fails the whole pass.
    pub fn recognize_all(&self, text: &str, parallel: bool) -> Result<Recognition> {
        let mut merged = Recognition::default();

        if parallel && self.recognizers.len() > 1 {
            let results: Vec<Result<Recognition>> = std::thread::scope(|scope| {
                let handles: Vec<_> = self
                    .recognizers
                    .iter()
                    .map(|recognizer| scope.spawn(move || recognizer.recognize(text)))
                    .collect();

                handles
                    .into_iter()
                    .zip(&self.recognizers)
                    .map(|(handle, recognizer)| {
                        handle.join().unwrap_or_else(|_| {
                            tracing::error!(recognizer = recognizer.name(), "Recognizer panicked");
                            Err(KineticError::Pattern(format!(
                                "recognizer {} panicked",
                                recognizer.name()
                            )))
                        })
                    })
                    .collect()
            });

            for result in results {
                merged.merge(result?);
            }
        } else {
            for recognizer in &self.recognizers {
                merged.merge(recognizer.recognize(text)?);
            }
        }

        tracing::trace!(
            candidates = merged.spans.len(),
            rejected = merged.rejected,
            "Recognition pass complete"
        );

        Ok(merged)
    }
}

impl Default for RecognizerSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRecognizer {
        category: Category,
        needle: &'static str,
    }

    impl Recognizer for FixedRecognizer {
        fn name(&self) -> &str {
            "fixed"
        }

        fn category(&self) -> Category {
            self.category
        }

        fn recognize(&self, text: &str) -> Result<Recognition> {
            let spans = text
                .match_indices(self.needle)
                .filter_map(|(start, m)| {
                    Span::new(text, start, start + m.len(), self.category, 1.0)
                })
                .collect();
            Ok(Recognition { spans, rejected: 1 })
        }
    }

    struct PanickingRecognizer;

    impl Recognizer for PanickingRecognizer {
        fn name(&self) -> &str {
            "panicking"
        }

        fn category(&self) -> Category {
            Category::Bsn
        }

        fn recognize(&self, _text: &str) -> Result<Recognition> {
            panic!("recognizer bug");
        }
    }

    struct FailingRecognizer;

    impl Recognizer for FailingRecognizer {
        fn name(&self) -> &str {
            "failing"
        }

        fn category(&self) -> Category {
            Category::Iban
        }

        fn recognize(&self, _text: &str) -> Result<Recognition> {
            Err(KineticError::Pattern("scan aborted".to_string()))
        }
    }

    fn test_set() -> RecognizerSet {
        RecognizerSet::new()
            .with(Box::new(FixedRecognizer {
                category: Category::Plaats,
                needle: "Utrecht",
            }))
            .with(Box::new(FixedRecognizer {
                category: Category::Email,
                needle: "a@b.nl",
            }))
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let set = test_set();
        let text = "Utrecht, mail a@b.nl of Utrecht";

        let sequential = set.recognize_all(text, false).unwrap();
        let parallel = set.recognize_all(text, true).unwrap();

        assert_eq!(sequential.spans, parallel.spans);
        assert_eq!(sequential.spans.len(), 3);
        assert_eq!(sequential.rejected, 2);
        assert_eq!(parallel.rejected, 2);
    }

    #[test]
    fn test_categories_sorted_and_deduplicated() {
        let set = test_set().with(Box::new(FixedRecognizer {
            category: Category::Plaats,
            needle: "Ede",
        }));
        assert_eq!(set.categories(), vec![Category::Plaats, Category::Email]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_panicking_recognizer_fails_the_pass() {
        let set = test_set().with(Box::new(PanickingRecognizer));
        let err = set.recognize_all("Utrecht", true).unwrap_err();
        assert!(matches!(err, KineticError::Pattern(_)));
        assert!(err.to_string().contains("panicking"));
    }

    #[test]
    fn test_failing_recognizer_fails_the_pass() {
        let set = test_set().with(Box::new(FailingRecognizer));
        assert!(set.recognize_all("Utrecht", false).is_err());
        assert!(set.recognize_all("Utrecht", true).is_err());
    }
}
