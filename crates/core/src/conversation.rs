//! Conversation types: turns, user input, phases and session context

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::language::Language;

/// Role in a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// User/client message
    User,
    /// Assistant/agent message
    Assistant,
    /// System message (instructions)
    System,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            TurnRole::System => "system",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Role of the speaker
    pub role: TurnRole,
    /// Content of the turn
    pub content: String,
    /// When the turn occurred
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new turn
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    /// Get word count
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Channel the input arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Typed chat message
    #[default]
    Text,
    /// Transcribed voice turn (already text by the time it reaches the core)
    Voice,
}

/// One user turn as handed to the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInput {
    /// Raw message text
    pub content: String,
    /// Text or transcribed voice
    #[serde(default)]
    pub kind: InputKind,
    /// Language declared upstream, if any. Detection happens outside the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl UserInput {
    /// Create a text input
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: InputKind::Text,
            language: None,
        }
    }

    /// Create a transcribed voice input
    pub fn voice(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: InputKind::Voice,
            language: None,
        }
    }

    /// Set the declared language
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}

/// Conversation phase, derived purely from how many user turns have occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Opening turns, needs are still unknown
    Discovery,
    /// Needs are surfacing, services are being narrowed down
    Exploration,
    /// A direction is established, detail gathering
    Engagement,
}

impl ConversationPhase {
    /// Derive the phase from the number of user turns so far
    pub fn from_turn_count(turns: usize) -> Self {
        match turns {
            0..=2 => ConversationPhase::Discovery,
            3..=5 => ConversationPhase::Exploration,
            _ => ConversationPhase::Engagement,
        }
    }
}

impl std::fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationPhase::Discovery => write!(f, "discovery"),
            ConversationPhase::Exploration => write!(f, "exploration"),
            ConversationPhase::Engagement => write!(f, "engagement"),
        }
    }
}

/// Per-session accumulator handed to the pipeline on every turn
///
/// Created at the first turn of a session. The orchestrator appends history
/// and merges answers after each turn; lifecycle (expiry, deletion) belongs
/// to the persistence collaborator, not this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Session identifier
    pub session_id: String,
    /// Ordered prior turns, role-tagged
    #[serde(default)]
    pub history: Vec<Turn>,
    /// Answers recorded so far, keyed by question id
    #[serde(default)]
    pub answers: HashMap<String, serde_json::Value>,
    /// Free-form session metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl SessionContext {
    /// Create a context for an existing session id
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            history: Vec::new(),
            answers: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// Create a context with a freshly generated session id
    pub fn with_generated_id() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// Append a turn to the history
    pub fn push_turn(&mut self, turn: Turn) {
        self.history.push(turn);
    }

    /// Record an answer for a question id
    pub fn record_answer(&mut self, question_id: impl Into<String>, value: serde_json::Value) {
        self.answers.insert(question_id.into(), value);
    }

    /// Number of user turns so far
    pub fn user_turn_count(&self) -> usize {
        self.history
            .iter()
            .filter(|t| t.role == TurnRole::User)
            .count()
    }

    /// Current conversation phase
    pub fn phase(&self) -> ConversationPhase {
        ConversationPhase::from_turn_count(self.user_turn_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_creation() {
        let turn = Turn::user("أحتاج شعار لمتجري");
        assert_eq!(turn.role, TurnRole::User);
        assert!(turn.word_count() > 0);
    }

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(
            ConversationPhase::from_turn_count(0),
            ConversationPhase::Discovery
        );
        assert_eq!(
            ConversationPhase::from_turn_count(2),
            ConversationPhase::Discovery
        );
        assert_eq!(
            ConversationPhase::from_turn_count(3),
            ConversationPhase::Exploration
        );
        assert_eq!(
            ConversationPhase::from_turn_count(5),
            ConversationPhase::Exploration
        );
        assert_eq!(
            ConversationPhase::from_turn_count(6),
            ConversationPhase::Engagement
        );
    }

    #[test]
    fn test_session_context() {
        let mut ctx = SessionContext::new("s-1");
        ctx.push_turn(Turn::user("hello"));
        ctx.push_turn(Turn::assistant("hi"));
        ctx.push_turn(Turn::user("I need a logo"));

        assert_eq!(ctx.user_turn_count(), 2);
        assert_eq!(ctx.phase(), ConversationPhase::Discovery);

        ctx.record_answer("q_budget", serde_json::json!(500));
        assert_eq!(ctx.answers.get("q_budget"), Some(&serde_json::json!(500)));
    }

    #[test]
    fn test_generated_id_unique() {
        let a = SessionContext::with_generated_id();
        let b = SessionContext::with_generated_id();
        assert_ne!(a.session_id, b.session_id);
    }
}
