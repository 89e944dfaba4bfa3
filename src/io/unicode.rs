//! Unicode utilities for text processing.
//!
//! Provides the normalization, tokenization and boundary-aware truncation
//! helpers shared by the classifier, the knowledge store, the history
//! window and the compositor. All budgets in Ekko are measured in Unicode
//! scalar values (`char`s), never in bytes.

use unicode_segmentation::UnicodeSegmentation;

/// Counts the characters in a string.
///
/// # Examples
///
/// ```
/// use ekko::io::unicode::char_len;
///
/// assert_eq!(char_len("Feijao"), 6);
/// assert_eq!(char_len("Feijão"), 6);
/// ```
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Finds the byte position of the nth character.
///
/// # Arguments
///
/// * `s` - The string to search.
/// * `n` - The character index (0-based).
///
/// # Returns
///
/// The byte position of the start of the nth character, or `s.len()` if out of bounds.
#[must_use]
pub fn char_byte_position(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(pos, _)| pos)
}

/// Folds a lowercase character to its unaccented form.
///
/// Covers the diacritics used in Portuguese (and the few Spanish ones
/// farmers near the border tend to type).
const fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Combining diacritical marks, left behind by decomposed (NFD) input.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036F}';

/// Lowercases a string and strips Portuguese diacritics.
///
/// Both precomposed (`é`) and decomposed (`e` + U+0301) accents fold away.
///
/// # Examples
///
/// ```
/// use ekko::io::unicode::normalize;
///
/// assert_eq!(normalize("Adubação de COBERTURA"), "adubacao de cobertura");
/// ```
#[must_use]
pub fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !COMBINING_MARKS.contains(c))
        .map(fold_diacritic)
        .collect()
}

/// Reduces a normalized word to a crude singular form.
///
/// Handles the regular Portuguese plurals that matter for matching
/// (`-oes` to `-ao`, trailing `-s`). Short words are left alone so that
/// terms such as `gas` or `ph` survive.
#[must_use]
pub fn singularize(word: &str) -> String {
    if char_len(word) <= 3 {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("oes") {
        return format!("{stem}ao");
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Splits text into normalized, singularized word tokens.
///
/// Uses Unicode word segmentation, so punctuation never sticks to a
/// token (`"cafe?"` yields `cafe`).
///
/// # Examples
///
/// ```
/// use ekko::io::unicode::tokenize;
///
/// assert_eq!(tokenize("Qual o pH ideal para Café?"), vec!["qual", "o", "ph", "ideal", "para", "cafe"]);
/// ```
#[must_use]
pub fn tokenize(s: &str) -> Vec<String> {
    normalize(s).unicode_words().map(singularize).collect()
}

/// Counts words using Unicode word segmentation.
#[must_use]
pub fn word_count(s: &str) -> usize {
    s.unicode_words().count()
}

/// Cuts text to at most `max_chars` characters without splitting a word.
///
/// Prefers the last line boundary that fits; falls back to the last
/// whitespace. If the first word alone is longer than the budget the
/// result is empty. Trailing whitespace is trimmed.
///
/// # Returns
///
/// The kept prefix and whether anything was removed.
#[must_use]
pub fn truncate_at_line(text: &str, max_chars: usize) -> (&str, bool) {
    if char_len(text) <= max_chars {
        return (text, false);
    }

    let cut = char_byte_position(text, max_chars);
    let window = &text[..cut];

    // A cut that lands exactly before whitespace is already a word boundary
    let at_word_boundary = text[cut..].starts_with(char::is_whitespace);

    let end = if let Some(newline) = window.rfind('\n') {
        newline
    } else if at_word_boundary {
        cut
    } else {
        window.rfind(char::is_whitespace).unwrap_or(0)
    };

    (text[..end].trim_end(), true)
}

/// Cuts text to fit `max_chars` and appends `marker` when anything was removed.
///
/// The marker sits on its own line and counts toward the budget, so the
/// result never exceeds `max_chars` unless the marker alone is longer.
#[must_use]
pub fn truncate_with_marker(text: &str, max_chars: usize, marker: &str) -> (String, bool) {
    if char_len(text) <= max_chars {
        return (text.to_string(), false);
    }

    let room = max_chars.saturating_sub(char_len(marker) + 1);
    let (kept, _) = truncate_at_line(text, room);
    if kept.is_empty() {
        (marker.to_string(), true)
    } else {
        (format!("{kept}\n{marker}"), true)
    }
}

/// Returns the last `max_chars` characters of a string.
#[must_use]
pub fn tail_chars(s: &str, max_chars: usize) -> &str {
    let len = char_len(s);
    if len <= max_chars {
        return s;
    }
    &s[char_byte_position(s, len - max_chars)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_counts_scalars() {
        assert_eq!(char_len(""), 0);
        assert_eq!(char_len("soja"), 4);
        assert_eq!(char_len("irrigação"), 9);
    }

    #[test]
    fn test_char_byte_position() {
        let s = "pé de café";
        assert_eq!(char_byte_position(s, 0), 0);
        assert_eq!(char_byte_position(s, 2), 3); // after 'é' (2 bytes)
        assert_eq!(char_byte_position(s, 100), s.len());
    }

    #[test]
    fn test_normalize_folds_case_and_accents() {
        assert_eq!(normalize("FEIJÃO"), "feijao");
        assert_eq!(normalize("Calcário Dolomítico"), "calcario dolomitico");
        assert_eq!(normalize("Nutrição"), "nutricao");
        assert_eq!(normalize("cafe\u{301}"), "cafe");
        assert_eq!(normalize("FEIJA\u{303}O"), "feijao");
        assert_eq!(normalize("adubac\u{327}a\u{303}o"), "adubacao");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("fertilizantes"), "fertilizante");
        assert_eq!(singularize("doencas"), "doenca");
        assert_eq!(singularize("irrigacoes"), "irrigacao");
        assert_eq!(singularize("ph"), "ph");
        assert_eq!(singularize("gas"), "gas");
        assert_eq!(singularize("adubo"), "adubo");
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        let tokens = tokenize("Pragas na soja: lagartas e percevejos!");
        assert_eq!(
            tokens,
            vec!["praga", "na", "soja", "lagarta", "e", "percevejo"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ?! ").is_empty());
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("e a dosagem?"), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_truncate_at_line_prefers_newline() {
        let text = "linha um\nlinha dois\nlinha tres";
        let (kept, truncated) = truncate_at_line(text, 15);
        assert!(truncated);
        assert_eq!(kept, "linha um");
    }

    #[test]
    fn test_truncate_at_line_falls_back_to_whitespace() {
        let (kept, truncated) = truncate_at_line("calcario dolomitico incorporado", 22);
        assert!(truncated);
        assert_eq!(kept, "calcario dolomitico");
    }

    #[test]
    fn test_truncate_at_line_exact_word_boundary() {
        let (kept, truncated) = truncate_at_line("ureia mais potassio", 10);
        assert!(truncated);
        assert_eq!(kept, "ureia mais");
    }

    #[test]
    fn test_truncate_at_line_single_long_word() {
        let (kept, truncated) = truncate_at_line("superfosfato", 5);
        assert!(truncated);
        assert_eq!(kept, "");
    }

    #[test]
    fn test_truncate_at_line_no_change() {
        assert_eq!(truncate_at_line("curto", 50), ("curto", false));
    }

    #[test]
    fn test_truncate_with_marker_fits_budget() {
        let text = "primeira linha longa\nsegunda linha longa\nterceira";
        let (out, truncated) = truncate_with_marker(text, 30, "[...]");
        assert!(truncated);
        assert!(out.ends_with("[...]"));
        assert!(char_len(&out) <= 30);
        assert!(out.starts_with("primeira linha longa"));
    }

    #[test]
    fn test_truncate_with_marker_only_marker() {
        let (out, truncated) = truncate_with_marker("palavrasemespaco", 8, "[...]");
        assert!(truncated);
        assert_eq!(out, "[...]");
    }

    #[test]
    fn test_tail_chars() {
        assert_eq!(tail_chars("abcdef", 3), "def");
        assert_eq!(tail_chars("abc", 10), "abc");
        assert_eq!(tail_chars("irrigação", 3), "ção");
    }
}
