//! Knowledge section and excerpt types.

use crate::io::unicode::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An immutable, labeled section of the agronomy knowledge base.
///
/// Keywords are kept in normalized form (lowercase, no diacritics,
/// singular) so they compare directly against message tokens.
///
/// # Examples
///
/// ```
/// use ekko::knowledge::KnowledgeSection;
///
/// let section = KnowledgeSection::new(
///     "irrigacao",
///     "Irrigacao",
///     ["Gotejamento", "Pivôs"],
///     "Gotejamento: economia de 30-50% de agua",
/// );
/// assert!(section.keywords.contains("gotejamento"));
/// assert!(section.keywords.contains("pivo"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSection {
    /// Stable identifier (slug).
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Normalized lookup keywords.
    pub keywords: BTreeSet<String>,
    /// Section text.
    pub body: String,
}

impl KnowledgeSection {
    /// Creates a section, normalizing its keywords.
    ///
    /// Multi-word keywords contribute each of their words.
    #[must_use]
    pub fn new<I, S>(
        id: impl Into<String>,
        title: impl Into<String>,
        keywords: I,
        body: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: id.into(),
            title: title.into(),
            keywords: normalize_keywords(keywords),
            body: body.into(),
        }
    }

    /// Returns a copy whose keywords are in normalized form.
    ///
    /// Used for sections deserialized from user-supplied files.
    #[must_use]
    pub fn normalized(self) -> Self {
        let keywords = normalize_keywords(&self.keywords);
        Self { keywords, ..self }
    }

    /// Counts how many of the given tokens are keywords of this section.
    #[must_use]
    pub fn score(&self, tokens: &BTreeSet<String>) -> usize {
        tokens
            .iter()
            .filter(|token| self.keywords.contains(*token))
            .count()
    }
}

fn normalize_keywords<I, S>(keywords: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .flat_map(|keyword| tokenize(keyword.as_ref()))
        .collect()
}

/// A lookup result: a (possibly truncated) section body with its score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeExcerpt {
    /// Identifier of the source section.
    pub section_id: String,
    /// Title of the source section.
    pub title: String,
    /// Number of message tokens that matched the section keywords.
    pub score: usize,
    /// Excerpt text, ending with a marker when truncated.
    pub text: String,
    /// Whether the body was cut to fit the excerpt budget.
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_normalized() {
        let section = KnowledgeSection::new("s", "S", ["Adubação Foliar", "NPK"], "corpo");
        let keywords: Vec<_> = section.keywords.iter().map(String::as_str).collect();
        assert_eq!(keywords, vec!["adubacao", "foliar", "npk"]);
    }

    #[test]
    fn test_normalized_reprocesses_raw_keywords() {
        let raw = KnowledgeSection {
            id: "pragas".to_string(),
            title: "Pragas".to_string(),
            keywords: ["Lagartas".to_string()].into_iter().collect(),
            body: "Spodoptera".to_string(),
        };
        let section = raw.normalized();
        assert!(section.keywords.contains("lagarta"));
    }

    #[test]
    fn test_score_counts_distinct_matches() {
        let section = KnowledgeSection::new("solo", "Solo", ["ph", "cafe", "calcario"], "x");
        let tokens: BTreeSet<String> = ["qual", "ph", "cafe"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(section.score(&tokens), 2);
    }
}
