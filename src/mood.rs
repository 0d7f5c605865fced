//! Mood indicators for recent user messages, and the offline reply table
//! used when no language model answers.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Anxiety,
    Depression,
    Anger,
    Tired,
}

impl Mood {
    /// Declaration order, which is also the order moods are reported in
    pub const ALL: [Mood; 4] = [Mood::Anxiety, Mood::Depression, Mood::Anger, Mood::Tired];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Anxiety => "anxiety",
            Mood::Depression => "depression",
            Mood::Anger => "anger",
            Mood::Tired => "tired",
        }
    }

    pub fn indicators(&self) -> &'static [&'static str] {
        match self {
            Mood::Anxiety => &["anxious", "worried", "nervous", "stressed", "overwhelmed"],
            Mood::Depression => &["sad", "depressed", "down", "blue", "hopeless"],
            Mood::Anger => &["angry", "mad", "frustrated", "irritated", "annoyed"],
            Mood::Tired => &["tired", "exhausted", "drained", "burned out", "fatigued"],
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moods hinted at anywhere in `messages`, each reported once, in `Mood::ALL` order
pub fn detect_moods<S: AsRef<str>>(messages: &[S]) -> Vec<Mood> {
    let lowered: Vec<String> = messages.iter().map(|m| m.as_ref().to_lowercase()).collect();

    Mood::ALL
        .into_iter()
        .filter(|mood| {
            lowered
                .iter()
                .any(|msg| mood.indicators().iter().any(|k| msg.contains(k)))
        })
        .collect()
}

const REPLIES: &[(&[&str], &str)] = &[
    (
        &["sad", "depressed", "down", "blue", "low"],
        "I hear you, and that's completely valid. I'm right here with you.",
    ),
    (
        &["anxious", "worried", "nervous", "stressed", "panic"],
        "That anxiety is real, but you're stronger than you think. Breathe and take it one moment at a time.",
    ),
    (
        &["angry", "mad", "frustrated", "irritated"],
        "Your anger is valid and it's telling you something important. I'm listening.",
    ),
    (
        &["tired", "exhausted", "drained", "burned out"],
        "You deserve rest. That's not selfish, it's self-care. Be kind to yourself.",
    ),
    (
        &["lonely", "alone", "isolated"],
        "You reached out to me, and that took courage. You're not alone right now.",
    ),
    (
        &["confused", "lost", "stuck", "uncertain"],
        "It's okay to not have all the answers right now. We'll figure this out together.",
    ),
];

const DEFAULT_REPLY: &str = "I'm here and I'm listening. What's on your mind?";

/// Canned reply for `text`; the first matching group wins
pub fn supportive_reply(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    REPLIES
        .iter()
        .find(|(words, _)| words.iter().any(|w| lowered.contains(w)))
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_REPLY)
}
