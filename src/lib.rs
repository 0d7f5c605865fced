//! Luma Guide - keyword guidance for the Luma wellness chat
//!
//! Everything here is plain substring matching over small, ordered, static
//! tables:
//! - guidance: suggests one app section per user message, with a per-topic cooldown
//! - mood: mood indicators and offline supportive replies
//! - exercises: mood-driven exercise plans
//! - safety: crisis phrase detection
//!
//! Time is always supplied by the caller (`Instant`), never read implicitly.

pub mod catalog;
pub mod error;
pub mod exercises;
pub mod guidance;
pub mod mood;
pub mod safety;

pub use catalog::{GuidanceCatalog, TopicRule};
pub use error::GuideError;
pub use exercises::{personalize, Difficulty, Exercise, ExercisePlan};
pub use guidance::{GuidanceMatcher, Suggestion, SuppressionSet, DEFAULT_COOLDOWN};
pub use mood::{detect_moods, supportive_reply, Mood};
pub use safety::{detect_crisis, CRISIS_RESPONSE};
