//! Read-only knowledge store with deterministic keyword lookup.

use crate::error::{Error, KnowledgeError, Result};
use crate::io::read_json;
use crate::io::unicode::{tokenize, truncate_with_marker};
use crate::knowledge::TRUNCATION_MARKER;
use crate::knowledge::builtin::{BUILTIN_VERSION, builtin_sections};
use crate::knowledge::section::{KnowledgeExcerpt, KnowledgeSection};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::debug;

/// The loaded, validated knowledge base.
///
/// Sections are fixed after construction: lookups borrow the store
/// immutably, so one store can serve any number of threads.
///
/// # Examples
///
/// ```
/// use ekko::knowledge::KnowledgeStore;
///
/// let store = KnowledgeStore::builtin(1200).unwrap();
/// let hits = store.lookup("Qual o pH ideal para cafe?", 3);
/// assert_eq!(hits[0].section_id, "analise-de-solo");
/// ```
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    sections: Vec<KnowledgeSection>,
    excerpt_chars: usize,
    version: String,
}

impl KnowledgeStore {
    /// Loads the bundled agronomy knowledge base.
    ///
    /// # Arguments
    ///
    /// * `excerpt_chars` - Per-section excerpt budget in characters.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled content fails validation.
    pub fn builtin(excerpt_chars: usize) -> Result<Self> {
        Self::from_sections(builtin_sections()?, excerpt_chars)
            .map(|store| store.with_version(BUILTIN_VERSION))
    }

    /// Builds a store from explicit sections.
    ///
    /// Keywords are normalized, then the set is validated: it must be
    /// non-empty, ids must be unique, and every section needs a body and
    /// at least one keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or `excerpt_chars` is zero.
    pub fn from_sections(sections: Vec<KnowledgeSection>, excerpt_chars: usize) -> Result<Self> {
        if excerpt_chars == 0 {
            return Err(Error::config("knowledge excerpt budget must be > 0"));
        }

        let sections: Vec<KnowledgeSection> = sections
            .into_iter()
            .map(KnowledgeSection::normalized)
            .collect();
        validate(&sections)?;

        debug!(sections = sections.len(), "knowledge base loaded");

        Ok(Self {
            sections,
            excerpt_chars,
            version: "custom".to_string(),
        })
    }

    /// Loads sections from a JSON file (an array of sections).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn from_json_file<P: AsRef<Path>>(path: P, excerpt_chars: usize) -> Result<Self> {
        let sections: Vec<KnowledgeSection> = read_json(path.as_ref())?;
        Self::from_sections(sections, excerpt_chars)
            .map(|store| store.with_version(path.as_ref().to_string_lossy()))
    }

    fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Returns the sections in declaration order.
    #[must_use]
    pub fn sections(&self) -> &[KnowledgeSection] {
        &self.sections
    }

    /// Returns a section by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&KnowledgeSection> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Returns the number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns true if the store has no sections (never true once validated).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Returns the per-section excerpt budget.
    #[must_use]
    pub const fn excerpt_chars(&self) -> usize {
        self.excerpt_chars
    }

    /// Returns the content version label.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Finds the sections most relevant to a message.
    ///
    /// Each section is scored by how many distinct message tokens appear in
    /// its keyword set. Sections scoring zero are never returned; ties keep
    /// declaration order.
    ///
    /// # Arguments
    ///
    /// * `message` - Raw user message.
    /// * `top_k` - Maximum number of excerpts.
    ///
    /// # Returns
    ///
    /// Excerpts ordered by score, highest first.
    #[must_use]
    pub fn lookup(&self, message: &str, top_k: usize) -> Vec<KnowledgeExcerpt> {
        let tokens: BTreeSet<String> = tokenize(message).into_iter().collect();

        let mut scored: Vec<(usize, &KnowledgeSection)> = self
            .sections
            .iter()
            .map(|section| (section.score(&tokens), section))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable sort keeps declaration order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(top_k)
            .map(|(score, section)| self.excerpt(section, score))
            .collect()
    }

    fn excerpt(&self, section: &KnowledgeSection, score: usize) -> KnowledgeExcerpt {
        let (text, truncated) =
            truncate_with_marker(&section.body, self.excerpt_chars, TRUNCATION_MARKER);
        KnowledgeExcerpt {
            section_id: section.id.clone(),
            title: section.title.clone(),
            score,
            text,
            truncated,
        }
    }
}

fn validate(sections: &[KnowledgeSection]) -> Result<()> {
    if sections.is_empty() {
        return Err(KnowledgeError::Empty.into());
    }

    let mut seen = HashSet::new();
    for section in sections {
        if !seen.insert(section.id.as_str()) {
            return Err(KnowledgeError::DuplicateSection {
                id: section.id.clone(),
            }
            .into());
        }
        if section.body.trim().is_empty() {
            return Err(KnowledgeError::EmptyBody {
                id: section.id.clone(),
            }
            .into());
        }
        if section.keywords.is_empty() {
            return Err(KnowledgeError::NoKeywords {
                id: section.id.clone(),
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::unicode::char_len;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn small_store(excerpt_chars: usize) -> KnowledgeStore {
        KnowledgeStore::from_sections(
            vec![
                KnowledgeSection::new("a", "A", ["soja", "ph"], "Soja gosta de pH 6.0-6.5"),
                KnowledgeSection::new("b", "B", ["soja", "praga"], "Percevejo na soja"),
                KnowledgeSection::new("c", "C", ["milho"], "Milho: pH 5.5-7.0"),
            ],
            excerpt_chars,
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_spec_example() {
        let store = KnowledgeStore::builtin(1200).unwrap();
        let hits = store.lookup("Qual o pH ideal para cafe?", 3);
        assert_eq!(hits[0].section_id, "analise-de-solo");
        assert_eq!(hits[0].score, 2);
    }

    #[test]
    fn test_lookup_orders_by_score() {
        let store = small_store(500);
        let hits = store.lookup("praga na soja", 3);
        let ids: Vec<_> = hits.iter().map(|h| h.section_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(hits[0].score, 2);
        assert_eq!(hits[1].score, 1);
    }

    #[test]
    fn test_lookup_ties_keep_declaration_order() {
        let store = small_store(500);
        let hits = store.lookup("soja", 3);
        let ids: Vec<_> = hits.iter().map(|h| h.section_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_lookup_respects_top_k() {
        let store = small_store(500);
        assert_eq!(store.lookup("soja milho ph praga", 2).len(), 2);
        assert!(store.lookup("soja", 0).is_empty());
    }

    #[test]
    fn test_lookup_no_match_is_empty() {
        let store = small_store(500);
        assert!(store.lookup("resultado do jogo de futebol", 3).is_empty());
        assert!(store.lookup("", 3).is_empty());
    }

    #[test]
    fn test_lookup_repeated_token_counts_once() {
        let store = small_store(500);
        let hits = store.lookup("soja soja soja", 3);
        assert_eq!(hits[0].score, 1);
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let store = KnowledgeStore::builtin(400).unwrap();
        let first = store.lookup("adubacao de potassio e irrigacao do milho", 5);
        let second = store.lookup("adubacao de potassio e irrigacao do milho", 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_excerpt_truncation() {
        let store = KnowledgeStore::builtin(200).unwrap();
        let hits = store.lookup("ph do solo", 1);
        let hit = &hits[0];
        assert!(hit.truncated);
        assert!(hit.text.ends_with(TRUNCATION_MARKER));
        assert!(char_len(&hit.text) <= 200);
    }

    #[test]
    fn test_excerpt_not_truncated_when_short() {
        let store = small_store(500);
        let hits = store.lookup("milho", 1);
        assert!(!hits[0].truncated);
        assert_eq!(hits[0].text, "Milho: pH 5.5-7.0");
    }

    #[test]
    fn test_validation_rejects_bad_sets() {
        assert!(matches!(
            KnowledgeStore::from_sections(vec![], 100),
            Err(Error::Knowledge(KnowledgeError::Empty))
        ));

        let dup = vec![
            KnowledgeSection::new("x", "X", ["a"], "body"),
            KnowledgeSection::new("x", "X2", ["b"], "body"),
        ];
        assert!(matches!(
            KnowledgeStore::from_sections(dup, 100),
            Err(Error::Knowledge(KnowledgeError::DuplicateSection { .. }))
        ));

        let empty_body = vec![KnowledgeSection::new("x", "X", ["a"], "  ")];
        assert!(matches!(
            KnowledgeStore::from_sections(empty_body, 100),
            Err(Error::Knowledge(KnowledgeError::EmptyBody { .. }))
        ));

        let no_keywords = vec![KnowledgeSection::new("x", "X", Vec::<String>::new(), "b")];
        assert!(matches!(
            KnowledgeStore::from_sections(no_keywords, 100),
            Err(Error::Knowledge(KnowledgeError::NoKeywords { .. }))
        ));

        let ok = vec![KnowledgeSection::new("x", "X", ["a"], "b")];
        assert!(matches!(
            KnowledgeStore::from_sections(ok, 0),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "hortas", "title": "Hortas", "keywords": ["Alface", "Tomates"], "body": "Alface: irrigar diariamente"}}]"#
        )
        .unwrap();

        let store = KnowledgeStore::from_json_file(file.path(), 300).unwrap();
        assert_eq!(store.len(), 1);
        let hits = store.lookup("tomate com folha amarela", 3);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].section_id, "hortas");
    }

    #[test]
    fn test_builtin_metadata() {
        let store = KnowledgeStore::builtin(1200).unwrap();
        assert_eq!(store.len(), 7);
        assert!(!store.is_empty());
        assert_eq!(store.version(), BUILTIN_VERSION);
        assert!(store.get("irrigacao").is_some());
        assert!(store.get("inexistente").is_none());
    }
}
