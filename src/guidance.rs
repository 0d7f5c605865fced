//! Keyword guidance matcher
//!
//! Given one user message, surfaces at most one topic from the catalog: the
//! first topic (in catalog order) that is not cooling down and has a keyword
//! occurring as a plain substring of the lowercased message. A surfaced
//! topic is withheld for `cooldown` afterwards; other topics are unaffected.
//!
//! Matching is substring containment, not word matching: "bodyweight"
//! contains "body", "stressed" contains "stress".
//!
//! `now` is supplied by the caller and is expected to be monotonic. If a
//! caller goes backwards in time, entries whose expiry still lies ahead of
//! the supplied `now` simply stay suppressed.

use crate::catalog::{GuidanceCatalog, TopicRule};
use crate::error::GuideError;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// How long a surfaced topic is withheld
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

// ============================================================================
// Suppression Set
// ============================================================================

/// Topics currently cooling down, keyed by topic id, valued by expiry.
///
/// Expiry is lazy: an entry with `expiry <= now` counts as absent and is
/// dropped on the next `prune`. An entry without an expiry never lapses.
#[derive(Debug, Default)]
pub struct SuppressionSet {
    until: HashMap<String, Option<Instant>>,
}

impl SuppressionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_suppressed(&self, topic_id: &str, now: Instant) -> bool {
        match self.until.get(topic_id) {
            Some(Some(expiry)) => now < *expiry,
            Some(None) => true,
            None => false,
        }
    }

    pub fn suppress(&mut self, topic_id: &str, until: Instant) {
        self.until.insert(topic_id.to_string(), Some(until));
    }

    /// Suppress for the rest of the session
    pub fn suppress_forever(&mut self, topic_id: &str) {
        self.until.insert(topic_id.to_string(), None);
    }

    /// Drop every entry that has expired by `now`
    pub fn prune(&mut self, now: Instant) {
        self.until
            .retain(|_, expiry| expiry.map_or(true, |expiry| now < expiry));
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.until.len()
    }

    pub fn is_empty(&self) -> bool {
        self.until.is_empty()
    }
}

// ============================================================================
// Display payload
// ============================================================================

/// What the chat layer renders for a surfaced topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub topic: String,
    pub message: String,
    pub icon: String,
    pub link: String,
    /// Button text, e.g. "→ Go to Exercises"
    pub label: String,
}

impl From<&TopicRule> for Suggestion {
    fn from(rule: &TopicRule) -> Self {
        Self {
            topic: rule.id.clone(),
            message: rule.message.clone(),
            icon: rule.icon.clone(),
            link: rule.link.clone(),
            label: link_label(&rule.link),
        }
    }
}

/// "exercises.html" -> "→ Go to Exercises"
fn link_label(link: &str) -> String {
    let stem = link.split('.').next().unwrap_or_default();
    let mut chars = stem.chars();
    let page = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("→ Go to {}", page)
}

// ============================================================================
// Matcher
// ============================================================================

pub struct GuidanceMatcher {
    catalog: GuidanceCatalog,
    suppressed: SuppressionSet,
    cooldown: Duration,
}

impl GuidanceMatcher {
    pub fn new(catalog: GuidanceCatalog) -> Self {
        Self {
            catalog,
            suppressed: SuppressionSet::new(),
            cooldown: DEFAULT_COOLDOWN,
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn catalog(&self) -> &GuidanceCatalog {
        &self.catalog
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn suppressed(&self) -> &SuppressionSet {
        &self.suppressed
    }

    /// Pick the topic for `text`, if any, and start its cooldown.
    ///
    /// Topics are tried in catalog order and the first hit wins; later
    /// topics are not examined. A topic that is cooling down is skipped
    /// without blocking the ones after it.
    pub fn evaluate(&mut self, text: &str, now: Instant) -> Option<&TopicRule> {
        self.suppressed.prune(now);

        let lowered = text.to_lowercase();
        let topic = self
            .catalog
            .topics()
            .iter()
            .filter(|topic| !self.suppressed.is_suppressed(&topic.id, now))
            .find(|topic| topic.keywords.iter().any(|k| lowered.contains(k.as_str())))?;

        debug!("Topic {} surfaced, cooling down for {:?}", topic.id, self.cooldown);
        match now.checked_add(self.cooldown) {
            Some(until) => self.suppressed.suppress(&topic.id, until),
            // Past the clock's range: nothing the caller can pass will reach it.
            None => self.suppressed.suppress_forever(&topic.id),
        }
        Some(topic)
    }

    /// `evaluate`, converted to the display payload
    pub fn suggest(&mut self, text: &str, now: Instant) -> Option<Suggestion> {
        self.evaluate(text, now).map(Suggestion::from)
    }

    /// Show a topic on demand. Ignores and leaves untouched the cooldowns.
    pub fn trigger(&self, topic_id: &str) -> Result<Suggestion, GuideError> {
        self.catalog
            .get(topic_id)
            .map(Suggestion::from)
            .ok_or_else(|| GuideError::UnknownTopic(topic_id.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
