//! Topic-domain gate for user messages.
//!
//! [`TopicClassifier`] decides whether a message belongs to the permitted
//! agriculture domain. The allow-list is a trigger, not a filter: one
//! matching term is enough, even when the rest of the message is about
//! something else. Short follow-ups ("e a dosagem?") are accepted when a
//! recent user turn was itself in-domain.

pub mod vocabulary;

use crate::history::HistoryWindow;
use crate::io::unicode::{tokenize, word_count};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use vocabulary::VOCABULARY;

/// Default word limit for a message to count as a follow-up.
pub const DEFAULT_FOLLOW_UP_MAX_WORDS: usize = 8;

/// Default number of recent user turns consulted for follow-ups.
pub const DEFAULT_FOLLOW_UP_LOOKBACK: usize = 4;

/// Outcome of classifying one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the message may be answered.
    pub in_domain: bool,
    /// Allow-list terms found in the message (normalized).
    pub matched_terms: BTreeSet<String>,
    /// Topics the matched terms belong to.
    pub topics: BTreeSet<&'static str>,
    /// Accepted only as a continuation of an in-domain conversation.
    pub follow_up: bool,
}

/// Rules for accepting messages without allow-list terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUpPolicy {
    /// A follow-up has at most this many words.
    pub max_words: usize,
    /// How many recent user turns may establish the domain.
    pub lookback_turns: usize,
}

impl Default for FollowUpPolicy {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_FOLLOW_UP_MAX_WORDS,
            lookback_turns: DEFAULT_FOLLOW_UP_LOOKBACK,
        }
    }
}

/// Allow-list classifier for the agriculture domain.
///
/// # Examples
///
/// ```
/// use ekko::classifier::TopicClassifier;
///
/// let classifier = TopicClassifier::new();
/// assert!(classifier.classify("Qual o pH ideal para cafe?").in_domain);
/// assert!(!classifier.classify("Qual o resultado do jogo de futebol?").in_domain);
/// ```
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    terms: HashMap<String, &'static str>,
    follow_up: FollowUpPolicy,
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicClassifier {
    /// Creates a classifier with the built-in vocabulary and default follow-up policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(FollowUpPolicy::default())
    }

    /// Creates a classifier with a custom follow-up policy.
    #[must_use]
    pub fn with_policy(follow_up: FollowUpPolicy) -> Self {
        let terms = VOCABULARY
            .iter()
            .flat_map(|(topic, words)| {
                words
                    .iter()
                    .flat_map(|word| tokenize(word))
                    .map(move |term| (term, *topic))
            })
            .collect();
        Self { terms, follow_up }
    }

    /// Returns the follow-up policy in effect.
    #[must_use]
    pub const fn policy(&self) -> FollowUpPolicy {
        self.follow_up
    }

    /// Classifies a standalone message.
    ///
    /// Empty or whitespace-only messages are out of domain.
    #[must_use]
    pub fn classify(&self, message: &str) -> Verdict {
        let (matched_terms, topics) = self.match_terms(message);
        Verdict {
            in_domain: !matched_terms.is_empty(),
            matched_terms,
            topics,
            follow_up: false,
        }
    }

    /// Classifies a message in the context of its conversation.
    ///
    /// Behaves like [`classify`](Self::classify), except that a short
    /// message without allow-list terms is accepted when one of the last
    /// `lookback_turns` user turns matched the allow-list.
    #[must_use]
    pub fn classify_in_conversation(&self, message: &str, history: &HistoryWindow) -> Verdict {
        let verdict = self.classify(message);
        if verdict.in_domain || message.trim().is_empty() {
            return verdict;
        }

        let words = word_count(message);
        if words == 0 || words > self.follow_up.max_words {
            return verdict;
        }

        let continues_topic = history
            .latest_user_turns(self.follow_up.lookback_turns)
            .any(|turn| !self.match_terms(&turn.text).0.is_empty());

        Verdict {
            in_domain: continues_topic,
            follow_up: continues_topic,
            ..verdict
        }
    }

    fn match_terms(&self, message: &str) -> (BTreeSet<String>, BTreeSet<&'static str>) {
        let mut matched = BTreeSet::new();
        let mut topics = BTreeSet::new();
        for token in tokenize(message) {
            if let Some(topic) = self.terms.get(&token) {
                topics.insert(*topic);
                matched.insert(token);
            }
        }
        (matched, topics)
    }
}
