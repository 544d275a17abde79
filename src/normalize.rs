// src/normalize.rs
//! Canonical text form used for every comparison in the crate.
//!
//! `normalize` drops diacritics (NFKD + ASCII filter), lowercases, turns
//! anything outside `[a-z0-9]`/whitespace into a space, and removes a small
//! set of Portuguese connectives. The result is deterministic and idempotent.

use once_cell::sync::OnceCell;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Prepositions/conjunctions that carry no meaning for item comparison.
pub const STOPWORDS: &[&str] = &["de", "da", "do", "dos", "das", "para", "com", "e"];

fn non_alnum() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9\s]").expect("static regex"))
}

/// Normalize free text into space-separated canonical tokens.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let ascii: String = text
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_ascii_lowercase();
    let cleaned = non_alnum().replace_all(&ascii, " ");

    cleaned
        .split_whitespace()
        .filter(|t| !STOPWORDS.contains(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `normalize` for optional fields; `None` behaves like empty text.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_punctuation_and_case() {
        assert_eq!(normalize("Cimento, CP II 50KG"), "cimento cp ii 50kg");
        assert_eq!(normalize("Pregão Eletrônico"), "pregao eletronico");
        assert_eq!(normalize("Concluída!"), "concluida");
    }

    #[test]
    fn drops_stopwords_and_collapses_spaces() {
        assert_eq!(
            normalize("Saco de cimento   para obra com areia e brita"),
            "saco cimento obra areia brita"
        );
        assert_eq!(normalize("de da do dos das"), "");
    }

    #[test]
    fn empty_and_missing_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t "), "");
        assert_eq!(normalize_opt(None), "");
    }

    #[test]
    fn is_idempotent() {
        for s in [
            "Cimento Portland CP-II/50 kg",
            "AÇÚCAR refinado (1kg) — pacote",
            "Água mineral c/ gás 500ml",
            "ÉÈÊË ñ ç ß ø",
            "",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input: {s:?}");
        }
    }

    #[test]
    fn non_decomposable_letters_are_dropped() {
        // ø and ß have no ASCII base under NFKD
        assert_eq!(normalize("søda"), "sda");
    }
}
