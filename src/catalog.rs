//! Guidance catalog: the ordered topic table the matcher walks.
//!
//! Order matters. When a message hits keywords of several topics, the one
//! declared first wins, so the table is an explicit `Vec` rather than a map.

use crate::error::GuideError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// Constants
// ============================================================================

/// Default catalog file name
const CATALOG_FILE: &str = "guidance.json";

/// Config directory name under the home directory
const CONFIG_DIR: &str = ".luma";

/// Version tag of the built-in table
const BUILTIN_VERSION: &str = "builtin-1";

// ============================================================================
// Types
// ============================================================================

/// One suggestable app section and the words that surface it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRule {
    /// Unique key, e.g. "exercises"
    pub id: String,

    /// Lowercase substrings; any one of them selects the topic
    pub keywords: Vec<String>,

    /// Text shown to the user
    pub message: String,

    /// Glyph shown next to the message
    #[serde(default)]
    pub icon: String,

    /// Page the suggestion points at, e.g. "exercises.html"
    pub link: String,
}

/// The full, validated topic table
#[derive(Debug, Clone)]
pub struct GuidanceCatalog {
    version: String,
    topics: Vec<TopicRule>,
}

/// On-disk shape, validated into a `GuidanceCatalog`
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    version: String,
    topics: Vec<TopicRule>,
}

impl GuidanceCatalog {
    /// Validate and normalize a topic list. Keywords are lowercased here so
    /// that matching only has to lowercase the message.
    pub fn new(version: impl Into<String>, topics: Vec<TopicRule>) -> Result<Self, GuideError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(topics.len());

        for mut topic in topics {
            if !seen.insert(topic.id.clone()) {
                return Err(GuideError::DuplicateTopic(topic.id));
            }
            if topic.keywords.is_empty() {
                return Err(GuideError::EmptyTopic(topic.id));
            }
            // An empty keyword is a substring of every message.
            if topic.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(GuideError::EmptyKeyword(topic.id));
            }
            topic.keywords = topic.keywords.iter().map(|k| k.to_lowercase()).collect();
            normalized.push(topic);
        }

        Ok(Self {
            version: version.into(),
            topics: normalized,
        })
    }

    /// Parse a catalog from JSON text
    pub fn from_json(json: &str) -> Result<Self, GuideError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| GuideError::CatalogParse(e.to_string()))?;
        Self::new(file.version, file.topics)
    }

    /// Load and validate a catalog file
    pub fn load(path: &Path) -> Result<Self, GuideError> {
        if !path.exists() {
            return Err(GuideError::CatalogNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| GuideError::CatalogRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let catalog = Self::from_json(&content)?;
        debug!(
            "Loaded catalog {:?} with {} topics from {:?}",
            catalog.version,
            catalog.topics.len(),
            path
        );
        Ok(catalog)
    }

    /// The five sections of the Luma app, highest priority first
    pub fn builtin() -> Self {
        let topics = BUILTIN_TOPICS
            .iter()
            .map(|(id, keywords, message, icon, link)| TopicRule {
                id: (*id).to_string(),
                keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
                message: (*message).to_string(),
                icon: (*icon).to_string(),
                link: (*link).to_string(),
            })
            .collect();

        Self {
            version: BUILTIN_VERSION.to_string(),
            topics,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Topics in priority order
    pub fn topics(&self) -> &[TopicRule] {
        &self.topics
    }

    pub fn get(&self, id: &str) -> Option<&TopicRule> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// `~/.luma/guidance.json`
pub fn default_catalog_path() -> Result<PathBuf, GuideError> {
    let home = dirs::home_dir().ok_or(GuideError::NoHomeDir)?;
    Ok(home.join(CONFIG_DIR).join(CATALOG_FILE))
}

// ============================================================================
// Built-in table
// ============================================================================

type TopicRow = (
    &'static str,
    &'static [&'static str],
    &'static str,
    &'static str,
    &'static str,
);

const BUILTIN_TOPICS: &[TopicRow] = &[
    (
        "exercises",
        &[
            "exercise", "workout", "breathing", "meditation", "stretching", "yoga", "relax",
            "calm", "movement", "physical", "body",
        ],
        "💡 Pro Tip: Check out the Exercises section for guided breathing exercises, meditation, and wellness routines tailored to your needs.",
        "🧘",
        "exercises.html",
    ),
    (
        "analytics",
        &[
            "progress", "track", "improve", "better", "mood", "pattern", "trending", "history",
            "chart", "statistics", "data", "analytics",
        ],
        "💡 Pro Tip: Visit the Analytics Dashboard to track your mood patterns, progress, and wellness metrics over time.",
        "📊",
        "analytics.html",
    ),
    (
        "health",
        &[
            "sleep", "energy", "tired", "fatigue", "health", "wellness", "vital", "metric",
            "symptom", "feeling", "physical",
        ],
        "💡 Pro Tip: Use the Health Tracker to log your daily wellness metrics and monitor your overall well-being.",
        "📈",
        "health.html",
    ),
    (
        "tools",
        &[
            "crisis", "emergency", "urgent", "help", "support", "resources", "contact",
            "professional", "therapy", "counselor", "therapist",
        ],
        "💡 Pro Tip: Check the Tools section for emergency resources, hotlines, and professional support contacts.",
        "🛠️",
        "tools.html",
    ),
    (
        "survey",
        &[
            "survey", "questionnaire", "assessment", "test", "evaluate", "understand",
            "diagnose", "mental health check",
        ],
        "💡 Pro Tip: Take the Mental Health Survey to get personalized insights and recommendations.",
        "📋",
        "survey.html",
    ),
];

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, keywords: &[&str]) -> TopicRule {
        TopicRule {
            id: id.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            message: format!("try {}", id),
            icon: "*".to_string(),
            link: format!("{}.html", id),
        }
    }

    #[test]
    fn test_builtin_order() {
        let catalog = GuidanceCatalog::builtin();
        let ids: Vec<&str> = catalog.topics().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["exercises", "analytics", "health", "tools", "survey"]);
        assert_eq!(catalog.get("tools").unwrap().link, "tools.html");
    }

    #[test]
    fn test_builtin_passes_validation() {
        let builtin = GuidanceCatalog::builtin();
        let rebuilt = GuidanceCatalog::new("copy", builtin.topics().to_vec()).unwrap();
        assert_eq!(rebuilt.topics(), builtin.topics());
    }

    #[test]
    fn test_duplicate_topic_rejected() {
        let result = GuidanceCatalog::new("t", vec![rule("a", &["x"]), rule("a", &["y"])]);
        assert!(matches!(result, Err(GuideError::DuplicateTopic(id)) if id == "a"));
    }

    #[test]
    fn test_empty_keywords_rejected() {
        let result = GuidanceCatalog::new("t", vec![rule("a", &[])]);
        assert!(matches!(result, Err(GuideError::EmptyTopic(_))));

        let result = GuidanceCatalog::new("t", vec![rule("b", &["ok", "  "])]);
        assert!(matches!(result, Err(GuideError::EmptyKeyword(id)) if id == "b"));
    }

    #[test]
    fn test_keywords_lowercased() {
        let catalog = GuidanceCatalog::new("t", vec![rule("a", &["Yoga", "DEEP Breath"])]).unwrap();
        assert_eq!(catalog.topics()[0].keywords, vec!["yoga", "deep breath"]);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "version": "2",
            "topics": [
                {"id": "sleep", "keywords": ["insomnia"], "message": "Log your sleep", "link": "health.html"},
                {"id": "crisis", "keywords": ["emergency"], "message": "Get help", "icon": "!", "link": "tools.html"}
            ]
        }"#;
        let catalog = GuidanceCatalog::from_json(json).unwrap();
        assert_eq!(catalog.version(), "2");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.topics()[0].icon, "");
        assert_eq!(catalog.topics()[1].id, "crisis");
    }

    #[test]
    fn test_from_json_malformed() {
        let result = GuidanceCatalog::from_json(r#"{"topics": [{"id": "a"}]}"#);
        assert!(matches!(result, Err(GuideError::CatalogParse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("luma-guide-does-not-exist.json");
        let result = GuidanceCatalog::load(&path);
        assert!(matches!(result, Err(GuideError::CatalogNotFound(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("luma-guide-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{"topics": [{"id": "a", "keywords": ["Calm"], "message": "m", "link": "a.html"}]}"#,
        )
        .unwrap();
        let catalog = GuidanceCatalog::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(catalog.topics()[0].keywords, vec!["calm"]);
    }
}
