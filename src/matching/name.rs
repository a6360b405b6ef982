// src/matching/name.rs - Decedent name canonicalization and token signatures

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const MIN_TOKEN_LENGTH: usize = 2;

/// Honorific titles stripped by the canonical signature. Gazette notices and
/// registry spreadsheets disagree on whether these are part of the name.
pub const TITLES: [&str; 14] = [
    "dr", "mr", "mrs", "ms", "miss", "rev", "fr", "prof", "hon", "eng", "col", "bishop", "pastor",
    "elder",
];

/// Estate boilerplate removed before tokenizing. Longer phrases first so a
/// shorter phrase never leaves a fragment of a longer one behind.
const BOILERPLATE_PHRASES: [&str; 4] = ["in the estate of", "the estate of", "estate of", "the late"];

/// Filler tokens that survive phrase stripping on their own.
const FILLER_TOKENS: [&str; 3] = ["the", "late", "deceased"];

static TRAILING_PLACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+of\s+[a-z][a-z ]*$").unwrap());

/// Canonicalizes a free-text name: lower-case, diacritics stripped via NFD
/// decomposition, everything that is not a letter or whitespace removed,
/// whitespace collapsed. Idempotent; empty input yields an empty string.
pub fn normalize_name(name: &str) -> String {
    let decomposed: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let letters_only: String = decomposed
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect();
    letters_only.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Order-insensitive matching key: normalized tokens, single-character
/// fragments dropped, sorted and re-joined. Handles "Surname Given" vs
/// "Given Surname" but is not misspelling-tolerant; spelling variance is the
/// fuzzy scorer's job.
pub fn token_signature(name: &str) -> String {
    let normalized = normalize_name(name);
    let mut tokens: Vec<&str> = normalized
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LENGTH)
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token signature with honorifics, estate boilerplate and a trailing
/// "of <place>" qualifier stripped first, so "Dr. John Kamau of Nairobi" and
/// "KAMAU JOHN" produce the same key.
pub fn canonical_signature(name: &str) -> String {
    let mut working = normalize_name(name);
    for phrase in &BOILERPLATE_PHRASES {
        working = working.replace(phrase, " ");
    }
    working = TRAILING_PLACE_RE.replace(&working, "").into_owned();

    let mut tokens: Vec<&str> = working
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LENGTH)
        .filter(|t| !TITLES.contains(t))
        .filter(|t| !FILLER_TOKENS.contains(t))
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token set used by the Jaccard component of the fuzzy score.
pub fn name_tokens(name: &str) -> HashSet<String> {
    normalize_name(name)
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LENGTH)
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_case_and_diacritic_insensitive() {
        assert_eq!(normalize_name("José  O'Brien"), normalize_name("JOSE OBRIEN"));
        assert_eq!(normalize_name("José  O'Brien"), "jose obrien");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_name("  Müller,   J.  Kamau-Otieno ");
        assert_eq!(normalize_name(&once), once);
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("  \t  "), "");
        assert_eq!(normalize_name("123 456"), "");
    }

    #[test]
    fn test_token_signature_is_order_insensitive() {
        assert_eq!(token_signature("John Otieno"), token_signature("Otieno John"));
        assert_eq!(token_signature("John Otieno"), "john otieno");
    }

    #[test]
    fn test_token_signature_drops_single_char_fragments() {
        assert_eq!(token_signature("John K Otieno"), "john otieno");
    }

    #[test]
    fn test_canonical_signature_strips_titles_and_boilerplate() {
        assert_eq!(
            canonical_signature("The Estate of the late Dr. John Kamau"),
            "john kamau"
        );
        assert_eq!(canonical_signature("Mrs Jane Wanjiku of Kiambu"), "jane wanjiku");
        assert_eq!(
            canonical_signature("KAMAU JOHN"),
            canonical_signature("Dr. John Kamau of Nairobi")
        );
    }

    #[test]
    fn test_canonical_signature_keeps_plain_names_intact() {
        assert_eq!(canonical_signature("Mary Atieno Odhiambo"), "atieno mary odhiambo");
    }
}
