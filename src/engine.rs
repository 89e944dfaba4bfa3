//! Per-request context assembly pipeline.
//!
//! [`ContextEngine`] wires the classifier, knowledge store, history window,
//! compositor and assembler together:
//!
//! 1. classify the message in its conversation; out-of-domain messages get
//!    the fixed redirect and nothing else runs
//! 2. reserve room for the mandatory prompt parts
//! 3. look up knowledge excerpts
//! 4. snapshot the history
//! 5. compose the five slots under the remaining budget
//! 6. assemble the prompt
//!
//! The engine holds no per-request state and is shared freely across
//! threads.

use crate::classifier::{TopicClassifier, Verdict};
use crate::compose::{ComposeInput, ContextCompositor, placeholder_footprint};
use crate::config::AssemblyConfig;
use crate::core::FarmerRecord;
use crate::error::{Error, Result};
use crate::history::HistoryWindow;
use crate::knowledge::KnowledgeStore;
use crate::prompt::{AssembledPrompt, PromptAssembler, RedirectResponse};
use serde::Serialize;
use tracing::{debug, info};

/// Inputs for one request, as gathered by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyRequest {
    /// The farmer's message.
    pub message: String,
    /// Linked farmer record, if any.
    pub farmer: Option<FarmerRecord>,
    /// Web search text, if any.
    pub web: Option<String>,
    /// Weather text, if any.
    pub weather: Option<String>,
}

impl AssemblyRequest {
    /// Creates a request with no external context.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Attaches a farmer record.
    #[must_use]
    pub fn with_farmer(mut self, farmer: FarmerRecord) -> Self {
        self.farmer = Some(farmer);
        self
    }

    /// Attaches web search text.
    #[must_use]
    pub fn with_web(mut self, web: impl Into<String>) -> Self {
        self.web = Some(web.into());
        self
    }

    /// Attaches weather text.
    #[must_use]
    pub fn with_weather(mut self, weather: impl Into<String>) -> Self {
        self.weather = Some(weather.into());
        self
    }
}

/// Result of preparing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Assembly {
    /// In-domain: the prompt to send to the model.
    Prompt {
        /// Classifier outcome.
        verdict: Verdict,
        /// Assembled prompt.
        prompt: AssembledPrompt,
    },
    /// Out-of-domain: reply directly, no model call.
    Redirect {
        /// Classifier outcome.
        verdict: Verdict,
        /// Fixed reply.
        response: RedirectResponse,
    },
}

impl Assembly {
    /// Returns the classifier verdict.
    #[must_use]
    pub const fn verdict(&self) -> &Verdict {
        match self {
            Self::Prompt { verdict, .. } | Self::Redirect { verdict, .. } => verdict,
        }
    }

    /// Returns true for the out-of-domain path.
    #[must_use]
    pub const fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// Returns the prompt or redirect text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Prompt { prompt, .. } => prompt.text(),
            Self::Redirect { response, .. } => &response.text,
        }
    }
}

/// The context assembly engine.
///
/// # Examples
///
/// ```
/// use ekko::config::AssemblyConfig;
/// use ekko::engine::{AssemblyRequest, ContextEngine};
/// use ekko::history::HistoryWindow;
///
/// let engine = ContextEngine::with_builtin_knowledge(AssemblyConfig::default()).unwrap();
/// let request = AssemblyRequest::new("Qual o pH ideal para cafe?");
/// let assembly = engine.prepare(&request, &HistoryWindow::new()).unwrap();
/// assert!(!assembly.is_redirect());
/// assert!(assembly.text().contains("ANALISE DE SOLO"));
/// ```
#[derive(Debug, Clone)]
pub struct ContextEngine {
    config: AssemblyConfig,
    classifier: TopicClassifier,
    knowledge: KnowledgeStore,
    compositor: ContextCompositor,
    assembler: PromptAssembler,
}

impl ContextEngine {
    /// Creates an engine over an already loaded knowledge store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(config: AssemblyConfig, knowledge: KnowledgeStore) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: TopicClassifier::with_policy(config.follow_up_policy()),
            compositor: ContextCompositor::new(),
            assembler: PromptAssembler::new(config.prompt_max_chars),
            knowledge,
            config,
        })
    }

    /// Creates an engine over the bundled knowledge base.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_builtin_knowledge(config: AssemblyConfig) -> Result<Self> {
        let knowledge = KnowledgeStore::builtin(config.knowledge_excerpt_chars)?;
        Self::new(config, knowledge)
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Returns the classifier.
    #[must_use]
    pub const fn classifier(&self) -> &TopicClassifier {
        &self.classifier
    }

    /// Returns the knowledge store.
    #[must_use]
    pub const fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    /// Prepares a request for the model.
    ///
    /// `history` holds the turns recorded before this message; an empty
    /// history makes this the first turn.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BudgetExceeded`] if the mandatory prompt parts plus
    /// the slot placeholders cannot fit under the prompt ceiling.
    pub fn prepare(&self, request: &AssemblyRequest, history: &HistoryWindow) -> Result<Assembly> {
        let is_first_turn = history.is_empty();
        let verdict = self
            .classifier
            .classify_in_conversation(&request.message, history);

        info!(
            in_domain = verdict.in_domain,
            follow_up = verdict.follow_up,
            matched = verdict.matched_terms.len(),
            "message classified"
        );

        if !verdict.in_domain {
            let response = self.assembler.redirect(is_first_turn);
            return Ok(Assembly::Redirect { verdict, response });
        }

        let ceiling = self.assembler.ceiling();
        let mandatory = self
            .assembler
            .mandatory_chars(&request.message, is_first_turn);
        let floor = mandatory + placeholder_footprint();
        if floor > ceiling {
            return Err(Error::BudgetExceeded {
                required: floor,
                ceiling,
            });
        }

        let knowledge = self
            .knowledge
            .lookup(&request.message, self.config.knowledge_top_k);
        debug!(
            hits = knowledge.len(),
            sections = ?knowledge.iter().map(|k| k.section_id.as_str()).collect::<Vec<_>>(),
            "knowledge lookup"
        );

        let snapshot = history.snapshot(self.config.history_max_turns, self.config.history_max_chars);
        debug!(
            turns = snapshot.len(),
            recorded = history.len(),
            "history snapshot"
        );

        let budget = self.config.context_max_chars.min(ceiling - mandatory);
        let input = ComposeInput {
            farmer: request.farmer.as_ref(),
            web: request.web.as_deref(),
            weather: request.weather.as_deref(),
            knowledge,
            history: snapshot,
        };
        let context = self.compositor.compose(input, budget)?;
        let prompt = self
            .assembler
            .assemble(&context, &request.message, is_first_turn)?;

        info!(
            chars = prompt.char_len(),
            trimmed = prompt.report().trimmed(),
            is_first_turn,
            "prompt ready"
        );

        Ok(Assembly::Prompt { verdict, prompt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::SlotName;
    use crate::core::{ConversationTurn, Role, SoilReadings};
    use crate::prompt::{GREETING, REDIRECT_MESSAGE};

    fn engine() -> ContextEngine {
        ContextEngine::with_builtin_knowledge(AssemblyConfig::default()).unwrap()
    }

    fn prompt_of(assembly: Assembly) -> AssembledPrompt {
        match assembly {
            Assembly::Prompt { prompt, .. } => prompt,
            Assembly::Redirect { .. } => panic!("expected a prompt"),
        }
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ContextEngine>();
    }

    #[test]
    fn test_classifier_uses_configured_follow_up_policy() {
        let config = AssemblyConfig {
            follow_up_max_words: 3,
            follow_up_lookback_turns: 1,
            ..AssemblyConfig::default()
        };
        let engine = ContextEngine::with_builtin_knowledge(config.clone()).unwrap();
        assert_eq!(engine.classifier().policy(), config.follow_up_policy());

        let mut history = HistoryWindow::new();
        history.append(ConversationTurn::user("Quando plantar soja?"));
        let request = AssemblyRequest::new("E depois disso, quanto tempo?");
        assert!(engine.prepare(&request, &history).unwrap().is_redirect());
    }

    #[test]
    fn test_in_domain_prompt() {
        let request = AssemblyRequest::new("Qual o pH ideal para cafe?");
        let prompt = prompt_of(engine().prepare(&request, &HistoryWindow::new()).unwrap());
        assert!(prompt.text().contains("### ANALISE DE SOLO"));
        assert_eq!(prompt.text().matches(GREETING).count(), 1);
        assert!(prompt.char_len() <= crate::config::DEFAULT_PROMPT_MAX_CHARS);
    }

    #[test]
    fn test_out_of_domain_redirect() {
        let request = AssemblyRequest::new("Qual o resultado do jogo de futebol?");
        let mut history = HistoryWindow::new();
        history.append(ConversationTurn::user("oi"));
        let assembly = engine().prepare(&request, &history).unwrap();
        assert!(assembly.is_redirect());
        assert_eq!(assembly.text(), REDIRECT_MESSAGE);
        assert!(!assembly.verdict().in_domain);
    }

    #[test]
    fn test_no_greeting_after_first_turn() {
        let mut history = HistoryWindow::new();
        history.append(ConversationTurn::user("Quando plantar soja?"));
        history.append(ConversationTurn::assistant("Entre outubro e dezembro."));
        let request = AssemblyRequest::new("E o milho safrinha?");
        let prompt = prompt_of(engine().prepare(&request, &history).unwrap());
        assert!(!prompt.text().contains(GREETING));
        assert!(prompt.text().contains("Usuario: Quando plantar soja?"));
    }

    #[test]
    fn test_follow_up_gets_prompt() {
        let mut history = HistoryWindow::new();
        history.append(ConversationTurn::user("Quanto de ureia no milho?"));
        let assembly = engine()
            .prepare(&AssemblyRequest::new("e a dosagem?"), &history)
            .unwrap();
        assert!(!assembly.is_redirect());
        assert!(assembly.verdict().follow_up);
    }

    #[test]
    fn test_farmer_values_reach_prompt() {
        let farmer = FarmerRecord::named("Fazenda Boa Vista")
            .with_crop("Soja")
            .with_soil(SoilReadings {
                ph: Some(5.2),
                ..SoilReadings::default()
            });
        let request = AssemblyRequest::new("Como esta o pH da minha soja?")
            .with_farmer(farmer)
            .with_weather("Chuva forte prevista");
        let prompt = prompt_of(engine().prepare(&request, &HistoryWindow::new()).unwrap());
        assert!(prompt.text().contains("Fazenda Boa Vista"));
        assert!(prompt.text().contains("pH do solo: 5.2"));
        assert!(prompt.text().contains("Chuva forte prevista"));
        assert!(prompt.text().contains(SlotName::Web.placeholder()));
    }

    #[test]
    fn test_tight_ceiling_trims_history_first() {
        let config = AssemblyConfig {
            prompt_max_chars: 4500,
            context_max_chars: 3000,
            ..AssemblyConfig::default()
        };
        let engine = ContextEngine::with_builtin_knowledge(config).unwrap();
        let mut history = HistoryWindow::new();
        for i in 0..10 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            history.append(ConversationTurn::at(role, format!("soja {}", "x".repeat(300)), i));
        }
        let request = AssemblyRequest::new("adubacao de potassio na soja").with_web("Cotacao firme");
        let prompt = prompt_of(engine.prepare(&request, &history).unwrap());

        assert!(prompt.char_len() <= 4500);
        let report = prompt.report();
        assert!(report.slot(SlotName::History).unwrap().dropped > 0);
        assert!(!report.slot(SlotName::Web).unwrap().truncated);
        assert!(prompt.text().contains("Cotacao firme"));
    }

    #[test]
    fn test_message_too_large_for_ceiling() {
        let config = AssemblyConfig {
            prompt_max_chars: 3000,
            context_max_chars: 2000,
            ..AssemblyConfig::default()
        };
        let engine = ContextEngine::with_builtin_knowledge(config).unwrap();
        let request = AssemblyRequest::new(format!("soja {}", "a ".repeat(2000)));
        assert!(matches!(
            engine.prepare(&request, &HistoryWindow::new()),
            Err(Error::BudgetExceeded { ceiling: 3000, .. })
        ));
    }

    #[test]
    fn test_concurrent_prepare() {
        let engine = engine();
        let history = HistoryWindow::new();
        let results: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        engine
                            .prepare(&AssemblyRequest::new("irrigacao do cafe"), &history)
                            .unwrap()
                            .text()
                            .to_string()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AssemblyConfig {
            history_max_chars: 0,
            ..AssemblyConfig::default()
        };
        assert!(ContextEngine::with_builtin_knowledge(config).is_err());
    }
}
