//! Session-scoped label registry
//!
//! Maps `(category, normalized text)` to a per-category sequence number so
//! the same entity gets the same placeholder in every document of a session.
//! Numbers start at 1 and are handed out in order of first sighting.

use crate::domain::{KineticError, Result};
use crate::pseudonymization::models::{Category, PlaceholderPolicy, RegistryEntry, RegistrySnapshot};
use std::collections::{BTreeMap, HashMap};

/// Registry lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelKey {
    pub category: Category,
    pub normalized_text: String,
}

impl LabelKey {
    pub fn new(category: Category, raw_text: &str) -> Self {
        Self {
            category,
            normalized_text: normalize(raw_text),
        }
    }
}

/// Case-fold and collapse whitespace
///
/// ```
/// use kinetic::pseudonymization::registry::normalize;
///
/// assert_eq!(normalize("Jan  van der\nBerg"), "jan van der berg");
/// ```
pub fn normalize(raw_text: &str) -> String {
    raw_text
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Placeholder text for a category and sequence number
pub fn indexed_placeholder(category: Category, number: u32) -> String {
    format!("[{}_{}]", category.label(), number)
}

/// Placeholder text for categories without per-entity numbering
pub fn fixed_placeholder(category: Category) -> String {
    format!("[{}]", category.label())
}

/// Label registry, owned by one session
#[derive(Debug, Default, Clone)]
pub struct LabelRegistry {
    forward: HashMap<LabelKey, u32>,
    reverse: HashMap<(Category, u32), LabelKey>,
    counters: BTreeMap<Category, u32>,
}

impl LabelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder for `raw_text`, registering it on first sight.
    ///
    /// Fixed-policy categories always get `[CATEGORY]` and are not stored.
    /// Dates are rendered by the timeline and cannot be assigned here.
    pub fn assign(&mut self, category: Category, raw_text: &str) -> Result<String> {
        match category.placeholder_policy() {
            PlaceholderPolicy::Fixed => Ok(fixed_placeholder(category)),
            PlaceholderPolicy::Timeline => Err(KineticError::Validation(format!(
                "{category} spans are rendered by the timeline, not the label registry"
            ))),
            PlaceholderPolicy::Indexed => {
                let key = LabelKey::new(category, raw_text);
                let number = self.number_for(key)?;
                Ok(indexed_placeholder(category, number))
            }
        }
    }

    fn number_for(&mut self, key: LabelKey) -> Result<u32> {
        if let Some(&number) = self.forward.get(&key) {
            return match self.reverse.get(&(key.category, number)) {
                Some(owner) if *owner == key => Ok(number),
                _ => Err(KineticError::RegistryConsistency(format!(
                    "{} number {} is not owned by the key that resolved to it",
                    key.category, number
                ))),
            };
        }

        let counter = self.counters.entry(key.category).or_insert(0);
        let number = *counter + 1;
        if self.reverse.contains_key(&(key.category, number)) {
            return Err(KineticError::RegistryConsistency(format!(
                "{} number {} is already assigned",
                key.category, number
            )));
        }
        *counter = number;

        tracing::trace!(category = %key.category, number, "New label registered");

        self.reverse.insert((key.category, number), key.clone());
        self.forward.insert(key, number);
        Ok(number)
    }

    /// Placeholder previously assigned to `raw_text`, without registering it
    pub fn lookup(&self, category: Category, raw_text: &str) -> Option<String> {
        match category.placeholder_policy() {
            PlaceholderPolicy::Fixed => Some(fixed_placeholder(category)),
            PlaceholderPolicy::Timeline => None,
            PlaceholderPolicy::Indexed => self
                .forward
                .get(&LabelKey::new(category, raw_text))
                .map(|&n| indexed_placeholder(category, n)),
        }
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Number of entities registered for one category
    pub fn count(&self, category: Category) -> u32 {
        self.counters.get(&category).copied().unwrap_or(0)
    }

    /// Check that forward and reverse maps are exact inverses and that every
    /// category is numbered 1..=N without gaps
    pub fn verify(&self) -> Result<()> {
        if self.forward.len() != self.reverse.len() {
            return Err(KineticError::RegistryConsistency(format!(
                "{} keys but {} numbers",
                self.forward.len(),
                self.reverse.len()
            )));
        }

        for (key, &number) in &self.forward {
            if self.reverse.get(&(key.category, number)) != Some(key) {
                return Err(KineticError::RegistryConsistency(format!(
                    "{} number {} resolves to a different key",
                    key.category, number
                )));
            }
        }

        for (&category, &count) in &self.counters {
            for number in 1..=count {
                if !self.reverse.contains_key(&(category, number)) {
                    return Err(KineticError::RegistryConsistency(format!(
                        "{category} number {number} is missing"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Point-in-time copy, sorted by category then number
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut numbered: Vec<(&(Category, u32), &LabelKey)> = self.reverse.iter().collect();
        numbered.sort_by_key(|(slot, _)| **slot);

        RegistrySnapshot {
            entries: numbered
                .into_iter()
                .map(|(&(category, number), key)| RegistryEntry {
                    category,
                    placeholder: indexed_placeholder(category, number),
                    normalized_text: key.normalized_text.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_entity_same_label() {
        let mut registry = LabelRegistry::new();
        let first = registry.assign(Category::Naam, "Jan Jansen").unwrap();
        let second = registry.assign(Category::Naam, "jan  JANSEN").unwrap();
        assert_eq!(first, "[NAAM_1]");
        assert_eq!(second, "[NAAM_1]");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_numbers_per_category() {
        let mut registry = LabelRegistry::new();
        assert_eq!(registry.assign(Category::Naam, "A B").unwrap(), "[NAAM_1]");
        assert_eq!(registry.assign(Category::Naam, "C D").unwrap(), "[NAAM_2]");
        assert_eq!(registry.assign(Category::Plaats, "Ede").unwrap(), "[PLAATS_1]");
        assert_eq!(
            registry.assign(Category::Ziekenhuis, "OLVG").unwrap(),
            "[ZIEKENHUIS_1]"
        );
        assert_eq!(registry.assign(Category::Naam, "A B").unwrap(), "[NAAM_1]");
        assert_eq!(registry.count(Category::Naam), 2);
        assert_eq!(registry.count(Category::Postcode), 0);
    }

    #[test]
    fn test_fixed_categories_not_stored() {
        let mut registry = LabelRegistry::new();
        assert_eq!(registry.assign(Category::Bsn, "123456782").unwrap(), "[BSN]");
        assert_eq!(registry.assign(Category::Iban, "NL91ABNA0417164300").unwrap(), "[IBAN]");
        assert_eq!(registry.assign(Category::Telefoon, "06-12345678").unwrap(), "[TELEFOON]");
        assert_eq!(registry.assign(Category::Email, "a@b.nl").unwrap(), "[EMAIL]");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dates_rejected() {
        let mut registry = LabelRegistry::new();
        let err = registry.assign(Category::Datum, "15-01-2024").unwrap_err();
        assert!(matches!(err, KineticError::Validation(_)));
    }

    #[test]
    fn test_lookup_does_not_register() {
        let mut registry = LabelRegistry::new();
        assert_eq!(registry.lookup(Category::Naam, "Jan Jansen"), None);
        registry.assign(Category::Naam, "Jan Jansen").unwrap();
        assert_eq!(
            registry.lookup(Category::Naam, "JAN JANSEN"),
            Some("[NAAM_1]".to_string())
        );
        assert_eq!(registry.lookup(Category::Bsn, "x"), Some("[BSN]".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_snapshot_sorted() {
        let mut registry = LabelRegistry::new();
        registry.assign(Category::Plaats, "Utrecht").unwrap();
        registry.assign(Category::Naam, "Piet Puk").unwrap();
        registry.assign(Category::Naam, "Jan Jansen").unwrap();

        let snapshot = registry.snapshot();
        let placeholders: Vec<&str> = snapshot
            .entries
            .iter()
            .map(|e| e.placeholder.as_str())
            .collect();
        assert_eq!(placeholders, vec!["[NAAM_1]", "[NAAM_2]", "[PLAATS_1]"]);
        assert_eq!(
            snapshot.placeholder_for(Category::Naam, "jan jansen"),
            Some("[NAAM_2]")
        );
    }

    #[test]
    fn test_verify_healthy_registry() {
        let mut registry = LabelRegistry::new();
        for name in ["A B", "C D", "E F"] {
            registry.assign(Category::Naam, name).unwrap();
        }
        registry.verify().unwrap();
    }

    #[test]
    fn test_corrupted_registry_detected() {
        let mut registry = LabelRegistry::new();
        registry.assign(Category::Naam, "A B").unwrap();
        // a second key claiming number 1
        registry
            .forward
            .insert(LabelKey::new(Category::Naam, "X Y"), 1);

        assert!(matches!(
            registry.verify(),
            Err(KineticError::RegistryConsistency(_))
        ));
        let err = registry.assign(Category::Naam, "X Y").unwrap_err();
        assert!(err.is_session_fatal());
    }

    #[test]
    fn test_counter_collision_detected() {
        let mut registry = LabelRegistry::new();
        registry
            .reverse
            .insert((Category::Plaats, 1), LabelKey::new(Category::Plaats, "ede"));
        let err = registry.assign(Category::Plaats, "Utrecht").unwrap_err();
        assert!(matches!(err, KineticError::RegistryConsistency(_)));
    }
}
