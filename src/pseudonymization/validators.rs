//! Checksum and shape validators
//!
//! Validators are plain predicates attached to a recognizer's output stage.
//! They fail closed: anything that cannot be parsed is "not a match", never an
//! error.

use serde::Deserialize;

/// Letter pairs PostNL never issues
const BLOCKED_POSTCODE_SUFFIXES: [&str; 3] = ["SA", "SD", "SS"];

/// Named validator, referenced from the pattern library by `validator = "..."`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    Bsn,
    GroupedBsn,
    Iban,
    Postcode,
    Phone,
}

impl Validator {
    /// Run the predicate against a matched candidate
    pub fn check(&self, text: &str) -> bool {
        match self {
            Self::Bsn => validate_bsn(text),
            Self::GroupedBsn => validate_grouped_bsn(text),
            Self::Iban => validate_iban(text),
            Self::Postcode => validate_postcode(text),
            Self::Phone => validate_phone(text),
        }
    }
}

/// Validate a BSN with the 11-proef.
///
/// Expects exactly nine ASCII digits. Weights are 9 down to 2 for the first
/// eight digits and -1 for the last; the weighted sum must be divisible by 11.
/// The all-zero number is rejected.
///
/// ```
/// use kinetic::pseudonymization::validators::validate_bsn;
///
/// assert!(validate_bsn("123456782"));
/// assert!(!validate_bsn("123456789"));
/// ```
pub fn validate_bsn(digits: &str) -> bool {
    if digits.len() != 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.bytes().all(|b| b == b'0') {
        return false;
    }

    let sum: i64 = digits
        .bytes()
        .map(|b| i64::from(b - b'0'))
        .zip([9, 8, 7, 6, 5, 4, 3, 2, -1])
        .map(|(digit, weight)| digit * weight)
        .sum();

    sum.rem_euclid(11) == 0
}

/// Validate a BSN written with group separators (`1234.56.782`, `123-456-782`)
pub fn validate_grouped_bsn(text: &str) -> bool {
    let digits = strip_separators(text, &['.', ' ', '-']);
    validate_bsn(&digits)
}

/// Validate an IBAN with the ISO 13616 mod-97 check.
///
/// Spaces are ignored and letters are case-folded. Dutch IBANs must be 18
/// characters long.
pub fn validate_iban(text: &str) -> bool {
    let iban: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if !(15..=34).contains(&iban.len()) || !iban.is_ascii() {
        return false;
    }

    let bytes = iban.as_bytes();
    if !bytes[0].is_ascii_uppercase()
        || !bytes[1].is_ascii_uppercase()
        || !bytes[2].is_ascii_digit()
        || !bytes[3].is_ascii_digit()
    {
        return false;
    }
    if !bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
        return false;
    }
    if &iban[..2] == "NL" && iban.len() != 18 {
        return false;
    }

    let rearranged = iban[4..].chars().chain(iban[..4].chars());
    let mut remainder: u32 = 0;
    for c in rearranged {
        let value = match c.to_digit(36) {
            Some(v) => v,
            None => return false,
        };
        // letters expand to two digits (A=10 .. Z=35)
        remainder = if value >= 10 {
            (remainder * 100 + value) % 97
        } else {
            (remainder * 10 + value) % 97
        };
    }

    remainder == 1
}

/// Validate a Dutch postcode: four digits without a leading zero, an optional
/// space, two uppercase letters not in the blocked list.
pub fn validate_postcode(text: &str) -> bool {
    let compact: String = text.chars().filter(|c| *c != ' ').collect();
    if compact.len() != 6 || text.len() > 7 || !compact.is_ascii() {
        return false;
    }

    let (digits, letters) = compact.split_at(4);
    if !digits.bytes().all(|b| b.is_ascii_digit()) || digits.starts_with('0') {
        return false;
    }
    if !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return false;
    }

    !BLOCKED_POSTCODE_SUFFIXES.contains(&letters)
}

/// Validate the shape of a Dutch phone number.
///
/// `+31` and `0031` prefixes are rewritten to the national `0`; the national
/// number must then have exactly ten digits and a non-zero area digit.
pub fn validate_phone(text: &str) -> bool {
    let compact = strip_separators(text, &[' ', '-', '.', '(', ')']);

    let international = compact
        .strip_prefix("+31")
        .or_else(|| compact.strip_prefix("0031"));

    let national = if let Some(rest) = international {
        // "+31 (0)20 ..." keeps the trunk zero after the country code
        format!("0{}", rest.strip_prefix('0').unwrap_or(rest))
    } else {
        compact
    };

    national.len() == 10
        && national.bytes().all(|b| b.is_ascii_digit())
        && national.starts_with('0')
        && national.as_bytes()[1] != b'0'
}

fn strip_separators(text: &str, separators: &[char]) -> String {
    text.chars().filter(|c| !separators.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("123456782", true ; "reference valid bsn")]
    #[test_case("111222333", true ; "repeating groups valid")]
    #[test_case("123456789", false ; "reference invalid bsn")]
    #[test_case("000000000", false ; "all zeros rejected")]
    #[test_case("12345678", false ; "too short")]
    #[test_case("1234567820", false ; "too long")]
    #[test_case("12345678a", false ; "non digit")]
    #[test_case("", false ; "empty")]
    fn test_validate_bsn(input: &str, expected: bool) {
        assert_eq!(validate_bsn(input), expected);
    }

    #[test]
    fn test_validate_bsn_matches_weighted_sum_for_all_last_digits() {
        // Exactly one check digit makes a given 8-digit prefix valid (or none
        // when the remainder would be 10).
        let prefix = "12345678";
        let valid: Vec<u8> = (0..=9u8)
            .filter(|d| validate_bsn(&format!("{prefix}{d}")))
            .collect();
        assert_eq!(valid, vec![2]);
    }

    #[test_case("1234.56.782", true ; "dotted")]
    #[test_case("123.456.782", true ; "three groups")]
    #[test_case("123-456-782", true ; "hyphenated")]
    #[test_case("1234 56 782", true ; "spaced")]
    #[test_case("1234.56.789", false ; "dotted invalid")]
    fn test_validate_grouped_bsn(input: &str, expected: bool) {
        assert_eq!(validate_grouped_bsn(input), expected);
    }

    #[test_case("NL91ABNA0417164300", true ; "dutch reference")]
    #[test_case("NL91 ABNA 0417 1643 00", true ; "grouped")]
    #[test_case("nl91abna0417164300", true ; "lowercase")]
    #[test_case("GB82WEST12345698765432", true ; "british reference")]
    #[test_case("NL92ABNA0417164300", false ; "wrong check digits")]
    #[test_case("NL91ABNA041716430", false ; "dutch too short")]
    #[test_case("NL91ABNA04171643#0", false ; "invalid character")]
    #[test_case("1291ABNA0417164300", false ; "no country code")]
    #[test_case("", false ; "empty")]
    fn test_validate_iban(input: &str, expected: bool) {
        assert_eq!(validate_iban(input), expected);
    }

    #[test_case("1071 DR", true ; "with space")]
    #[test_case("1071DR", true ; "without space")]
    #[test_case("0123 AB", false ; "leading zero")]
    #[test_case("1071 dr", false ; "lowercase letters")]
    #[test_case("1071 SS", false ; "blocked ss")]
    #[test_case("1071 SA", false ; "blocked sa")]
    #[test_case("1071 SD", false ; "blocked sd")]
    #[test_case("107 DR", false ; "three digits")]
    #[test_case("1071  DR", false ; "double space")]
    fn test_validate_postcode(input: &str, expected: bool) {
        assert_eq!(validate_postcode(input), expected);
    }

    #[test_case("06-12345678", true ; "mobile hyphen")]
    #[test_case("06 1234 5678", true ; "mobile grouped")]
    #[test_case("+31 6 1234 5678", true ; "international mobile")]
    #[test_case("+31 (0)20 1234567", true ; "international with trunk")]
    #[test_case("0031 20 1234567", true ; "double zero prefix")]
    #[test_case("020-1234567", true ; "landline")]
    #[test_case("0612345", false ; "too short")]
    #[test_case("00-12345678", false ; "zero area digit")]
    fn test_validate_phone(input: &str, expected: bool) {
        assert_eq!(validate_phone(input), expected);
    }

    #[test]
    fn test_named_validator_dispatch() {
        assert!(Validator::Bsn.check("123456782"));
        assert!(!Validator::Bsn.check("1234.56.782"));
        assert!(Validator::GroupedBsn.check("1234.56.782"));
        assert!(Validator::Iban.check("NL91ABNA0417164300"));
        assert!(Validator::Postcode.check("1071 DR"));
        assert!(Validator::Phone.check("06-12345678"));
    }

    #[test]
    fn test_validator_deserializes_from_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            validator: Validator,
        }
        let parsed: Wrapper = toml::from_str("validator = \"grouped_bsn\"").unwrap();
        assert_eq!(parsed.validator, Validator::GroupedBsn);
    }
}
