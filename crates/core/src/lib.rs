//! Core types for the Nujmooz conversation engine
//!
//! This crate provides the foundational types used across the workspace:
//! - Language definitions and bilingual text (Arabic/English)
//! - Conversation turns, user input and per-session context
//! - Signal types (emotional and buying-intent) and the bounded
//!   per-session emotion history
//! - Error types

pub mod conversation;
pub mod error;
pub mod language;
pub mod signals;

pub use conversation::{
    ConversationPhase, InputKind, SessionContext, Turn, TurnRole, UserInput,
};
pub use error::{CoreError, Result};
pub use language::{Language, Localized};
pub use signals::{
    BuyingSignal, BuyingSignalKind, EmotionHistory, EmotionPattern, EmotionSignal, EmotionalTrend,
    Intensity, EMOTION_HISTORY_CAPACITY,
};
