// src/extraction/registry.rs - Decedent-name column resolution for registry rows

/// Known labels for the decedent-name column, tried in priority order after
/// label normalization. Spreadsheet authors are inconsistent; this list plus
/// the "deceased" substring fallback below replaces guessing across header
/// variants.
pub const NAME_COLUMN_SYNONYMS: [&str; 7] = [
    "name of the deceased",
    "name of deceased",
    "deceased name",
    "deceased s name",
    "full name",
    "deceased",
    "name",
];

/// Normalizes a column label: lower-case, curly apostrophes unified, every
/// non-alphanumeric character replaced by a space, whitespace collapsed.
fn normalize_label(label: &str) -> String {
    let unified = label.to_lowercase().replace(['\u{2018}', '\u{2019}'], "'");
    let spaced: String = unified
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves the most likely decedent-name value from a row of arbitrary
/// author-chosen column labels. Returns an empty string when nothing
/// matches; such rows are excluded from matching, which is expected rather
/// than an error.
pub fn resolve_name(columns: &[(String, String)]) -> String {
    let normalized: Vec<(String, &str)> = columns
        .iter()
        .map(|(label, value)| (normalize_label(label), value.trim()))
        .collect();

    for synonym in &NAME_COLUMN_SYNONYMS {
        if let Some((_, value)) = normalized
            .iter()
            .find(|(label, value)| label == synonym && !value.is_empty())
        {
            return value.to_string();
        }
    }

    for (label, value) in &normalized {
        if label.contains("deceased") && !value.is_empty() {
            return value.to_string();
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(l, v)| (l.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_synonym_priority_order() {
        let columns = row(&[
            ("Name", "Wrong Person"),
            ("Name of the Deceased", "John Kamau"),
        ]);
        assert_eq!(resolve_name(&columns), "John Kamau");
    }

    #[test]
    fn test_label_normalization_handles_punctuation_and_case() {
        let columns = row(&[("NAME-OF_DECEASED", "Mary Atieno")]);
        assert_eq!(resolve_name(&columns), "Mary Atieno");
    }

    #[test]
    fn test_curly_apostrophe_label() {
        let columns = row(&[("Deceased\u{2019}s Name", "Peter Mwangi")]);
        assert_eq!(resolve_name(&columns), "Peter Mwangi");
    }

    #[test]
    fn test_substring_fallback() {
        let columns = row(&[
            ("Court Station", "Nairobi"),
            ("Particulars of Deceased Person", "Jane Wanjiku"),
        ]);
        assert_eq!(resolve_name(&columns), "Jane Wanjiku");
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let columns = row(&[
            ("Deceased Name", "   "),
            ("Full Name", "Samuel Kiptoo"),
        ]);
        assert_eq!(resolve_name(&columns), "Samuel Kiptoo");
    }

    #[test]
    fn test_miss_returns_empty_string() {
        let columns = row(&[("Court", "Nakuru"), ("Cause No", "55 OF 2019")]);
        assert_eq!(resolve_name(&columns), "");
    }
}
