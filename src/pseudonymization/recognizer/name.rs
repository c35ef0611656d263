//! Personal name recognizer
//!
//! Names are found as runs of capitalized tokens on one line:
//!
//! - words (`Jan`, `Vries-van Dijk`, `Jan-Willem`)
//! - initials (`S.`, `J.P.`)
//! - particles (`van`, `de`, `der`, `ter`, ... and their capitalized forms)
//!
//! Runs are cut at stop words (letter headings, clinical vocabulary,
//! capitalized function words, titles). A run needs `min_tokens` words or
//! initials, except directly after a title or honorific (`Dr.`, `Mevr.`,
//! `mevrouw`, `de heer`), where a single surname is enough. The title itself
//! is never part of the span.
//!
//! A particle group followed by a full name (`Bezoek van Karel Appel`) is
//! treated as a preposition and no span crosses it.
//!
//! Every admissible sub-run is emitted. The resolver keeps the longest one
//! that does not swallow a more specific span, so `Jan Bakker Amsterdam`
//! still yields `Jan Bakker` next to the place.

use super::{Recognition, Recognizer};
use crate::domain::{KineticError, Result};
use crate::pseudonymization::models::{Category, Span};
use regex::Regex;
use std::collections::HashSet;

/// Default minimum number of name tokens outside a titled context
pub const DEFAULT_MIN_TOKENS: usize = 2;

const MAX_RUN_TOKENS: usize = 8;

const BASE_CONFIDENCE: f32 = 0.6;
const PARTICLE_CONFIDENCE: f32 = 0.7;
const TITLED_CONFIDENCE: f32 = 0.85;

const TOKEN_PATTERN: &str = r"(?x)
    (?P<initial>\b\p{Lu}\.)
  | (?P<particle>\b(?:[vV]an|[dD]e|[dD]er|[dD]en|[hH]et|[tT]er|[tT]en|von|le|la|du|da|di|dos|del)\b)
  | (?P<word>\b(?:IJ|\p{Lu})\p{Ll}+(?:\p{Lu}\p{Ll}+)?
        (?:-(?:(?:van|de|den|der|ter|ten)(?:[\ \t]+(?:de|den|der))?[\ \t]+)?\p{Lu}\p{Ll}+)*\b)
";

/// Titles and honorifics, lowercase without the trailing dot
const TITLES: &[&str] = &[
    "dr", "drs", "dhr", "mevr", "mvr", "mw", "mr", "mej", "prof", "ir", "ing", "mevrouw",
    "meneer", "heer", "dokter",
];

/// Capitalized words that are never part of a name, lowercase
const STOP_WORDS: &[&str] = &[
    // letter headings and record fields
    "adres", "afdeling", "anamnese", "beleid", "betreft", "bevindingen", "bijlage", "brief",
    "categorie", "conclusie", "consult", "datum", "diagnose", "document", "dossier",
    "dossierhouder", "email", "geboortedatum", "indicatie", "intake", "locatie", "naam",
    "noodcontact", "objectief", "onderzoek", "opmerking", "opmerkingen", "pagina", "plan",
    "polikliniek", "postcode", "praktijk", "rapport", "samenvatting", "status", "subjectief",
    "telefoon", "telefoonnummer", "verslag", "verwijzing", "verwijsbrief", "ontslagbrief",
    "woonplaats", "werkgever", "verzekeraar", "partner",
    // clinical vocabulary
    "patiënt", "patient", "patiënte", "cliënt", "client", "huisarts", "specialist", "arts",
    "verpleegkundige", "fysiotherapeut", "ziekenhuis", "kliniek", "orthopedie", "neurologie",
    "chirurgie", "radiologie", "behandeling", "medicatie", "voorgeschiedenis", "klachten",
    "advies", "controle", "opname", "ontslag", "spoedeisende", "hulp", "letsel", "ongeval",
    "trauma", "incident", "schade", "fractuur", "pijn", "rechts", "links", "lichamelijk",
    // letter phrasing
    "geachte", "collega", "hoogachtend", "groet", "groeten", "vriendelijke", "beste",
    // compass points
    "noord", "oost", "zuid", "west",
    // capitalized function words
    "in", "op", "bij", "na", "voor", "tijdens", "sinds", "vanaf", "tot", "met", "zonder",
    "over", "onder", "naar", "door", "uit", "aan", "om", "een", "deze", "dit", "die", "dat",
    "zijn", "haar", "hij", "zij", "wij", "ik", "er", "hier", "daar", "ook", "niet", "geen",
    "wel", "nog", "en", "of", "maar", "want", "dus", "toen", "nu", "dan", "als", "wat", "wie",
    "waar", "hoe", "gisteren", "vandaag", "morgen", "daarna", "vervolgens", "echter", "verder",
    "tevens", "graag", "ja", "nee",
    // weekdays and months
    "maandag", "dinsdag", "woensdag", "donderdag", "vrijdag", "zaterdag", "zondag", "januari",
    "februari", "maart", "april", "mei", "juni", "juli", "augustus", "september", "oktober",
    "november", "december",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Initial,
    Particle,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    start: usize,
    end: usize,
    kind: TokenKind,
}

impl Token {
    fn is_name_token(&self) -> bool {
        self.kind != TokenKind::Particle
    }
}

/// Heuristic recognizer for personal names
pub struct NameRecognizer {
    tokens: Regex,
    stop_words: HashSet<String>,
    min_tokens: usize,
}

impl NameRecognizer {
    /// Create a name recognizer.
    ///
    /// `extra_stop_words` are added to the built-in list and compared
    /// case-insensitively.
    pub fn new(min_tokens: usize, extra_stop_words: &[String]) -> Result<Self> {
        if min_tokens == 0 {
            return Err(KineticError::Configuration(
                "name recognizer min_tokens must be at least 1".to_string(),
            ));
        }

        let tokens = Regex::new(TOKEN_PATTERN)
            .map_err(|e| KineticError::Pattern(format!("Invalid name token pattern: {e}")))?;

        let stop_words = STOP_WORDS
            .iter()
            .chain(TITLES.iter())
            .map(|w| w.to_string())
            .chain(extra_stop_words.iter().map(|w| w.trim().to_lowercase()))
            .filter(|w| !w.is_empty())
            .collect();

        Ok(Self {
            tokens,
            stop_words,
            min_tokens,
        })
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.tokens
            .captures_iter(text)
            .filter_map(|caps| {
                let (m, kind) = if let Some(m) = caps.name("initial") {
                    (m, TokenKind::Initial)
                } else if let Some(m) = caps.name("particle") {
                    (m, TokenKind::Particle)
                } else {
                    (caps.name("word")?, TokenKind::Word)
                };
                Some(Token {
                    start: m.start(),
                    end: m.end(),
                    kind,
                })
            })
            .collect()
    }

    fn is_stop_word(&self, text: &str, token: &Token) -> bool {
        token.kind == TokenKind::Word
            && self
                .stop_words
                .contains(&text[token.start..token.end].to_lowercase())
    }

    /// Split the token stream into runs of adjacent tokens, cutting at stop
    /// words and at anything other than spaces or tabs between tokens
    fn runs(&self, text: &str, tokens: &[Token]) -> Vec<Vec<Token>> {
        let mut runs = Vec::new();
        let mut current: Vec<Token> = Vec::new();

        for token in tokens {
            if self.is_stop_word(text, token) {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
                continue;
            }

            let joined = current
                .last()
                .is_some_and(|prev| joins(text, prev, token));
            if !joined && !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
            current.push(*token);
        }

        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }

    fn emit_run(&self, text: &str, run: &[Token], out: &mut Recognition) {
        let titled = preceded_by_title(text, run[0].start);
        let barriers = particle_barriers(run);

        for i in 0..run.len() {
            // only a run directly after a title keeps a leading particle
            let titled_here = titled && i == 0;
            if run[i].kind == TokenKind::Particle && !titled_here {
                continue;
            }
            let required = if titled_here { 1 } else { self.min_tokens };

            for j in (i + 1)..=run.len().min(i + MAX_RUN_TOKENS) {
                if barriers.iter().any(|&b| i < b && b < j) {
                    break;
                }
                let candidate = &run[i..j];
                if candidate[candidate.len() - 1].kind == TokenKind::Particle {
                    continue;
                }
                let names = candidate.iter().filter(|t| t.is_name_token()).count();
                let has_word = candidate.iter().any(|t| t.kind == TokenKind::Word);
                if names < required || !has_word {
                    continue;
                }

                let confidence = if titled_here {
                    TITLED_CONFIDENCE
                } else if candidate.iter().any(|t| t.kind == TokenKind::Particle) {
                    PARTICLE_CONFIDENCE
                } else {
                    BASE_CONFIDENCE
                };

                if let Some(span) = Span::new(
                    text,
                    candidate[0].start,
                    candidate[candidate.len() - 1].end,
                    Category::Naam,
                    confidence,
                ) {
                    out.spans.push(span);
                }
            }
        }
    }
}

impl Recognizer for NameRecognizer {
    fn name(&self) -> &str {
        "name"
    }

    fn category(&self) -> Category {
        Category::Naam
    }

    fn recognize(&self, text: &str) -> Result<Recognition> {
        let mut recognition = Recognition::default();
        let tokens = self.tokenize(text);

        for run in self.runs(text, &tokens) {
            self.emit_run(text, &run, &mut recognition);
        }

        Ok(recognition)
    }
}

/// Positions of particle groups that no name spans across.
///
/// A surname particle is followed by exactly one surname (`Jan van der
/// Berg`). A group followed by two or more name tokens reads as a
/// preposition before a full name (`Bezoek van Karel Appel`), so the word in
/// front of it is not joined to that name.
fn particle_barriers(run: &[Token]) -> Vec<usize> {
    let mut barriers = Vec::new();
    for k in 1..run.len() {
        if run[k].kind != TokenKind::Particle || run[k - 1].kind == TokenKind::Particle {
            continue;
        }
        let names_after = run[k..]
            .iter()
            .skip_while(|t| t.kind == TokenKind::Particle)
            .take_while(|t| t.is_name_token())
            .count();
        if names_after >= 2 {
            barriers.push(k);
        }
    }
    barriers
}

/// Whether `next` continues the run ending in `prev`
fn joins(text: &str, prev: &Token, next: &Token) -> bool {
    let gap = &text[prev.end..next.start];
    if gap.is_empty() {
        // "S.de Vries", "J.P. Balkenende"
        return prev.kind == TokenKind::Initial;
    }
    gap.chars().all(|c| c == ' ' || c == '\t')
}

/// Whether the text before `pos` ends in a title or honorific on the same line
fn preceded_by_title(text: &str, pos: usize) -> bool {
    let before = text[..pos].trim_end_matches([' ', '\t']);
    let before = before.strip_suffix('.').unwrap_or(before);

    let word_start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphabetic())
        .last()
        .map(|(i, _)| i);

    match word_start {
        Some(start) => TITLES.contains(&before[start..].to_lowercase().as_str()),
        None => false,
    }
}
