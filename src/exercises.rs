//! Personalized exercise plans
//!
//! Everyone gets the base routines. Each detected mood adds two routines
//! aimed at it. A low recent mood rating (1 or 2 out of 5) keeps only the
//! beginner-level mood routines.

use crate::error::GuideError;
use crate::mood::Mood;
use serde::Serialize;
use tracing::debug;

/// Ratings at or below this only get beginner mood routines
const LOW_MOOD_THRESHOLD: u8 = 2;

const PLAN_REASON: &str = "Based on your recent messages and health data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exercise {
    pub name: &'static str,
    pub steps: &'static [&'static str],
    pub category: &'static str,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExercisePlan {
    pub exercises: Vec<Exercise>,
    pub detected_moods: Vec<Mood>,
    pub recent_mood: Option<u8>,
    pub reason: &'static str,
}

const BASE: &[Exercise] = &[
    Exercise {
        name: "Box Breathing (4x4x4x4)",
        steps: &["Inhale 4s", "Hold 4s", "Exhale 4s", "Hold 4s", "Repeat 4 rounds"],
        category: "breathing",
        difficulty: Difficulty::Beginner,
        reason: None,
    },
    Exercise {
        name: "5-4-3-2-1 Grounding",
        steps: &["5 things you see", "4 feel", "3 hear", "2 smell", "1 taste"],
        category: "grounding",
        difficulty: Difficulty::Beginner,
        reason: None,
    },
    Exercise {
        name: "Mindful Breathing",
        steps: &[
            "Focus on breath",
            "Notice sensations",
            "Return to breath when distracted",
            "5-15 minutes",
        ],
        category: "mindfulness",
        difficulty: Difficulty::Beginner,
        reason: None,
    },
];

fn for_mood(mood: Mood) -> &'static [Exercise] {
    match mood {
        Mood::Anxiety => &[
            Exercise {
                name: "4-7-8 Breathing",
                steps: &["Inhale 4s", "Hold 7s", "Exhale 8s", "Repeat 4 cycles"],
                category: "anxiety_relief",
                difficulty: Difficulty::Beginner,
                reason: Some("Great for anxiety - the longer exhale activates your parasympathetic nervous system"),
            },
            Exercise {
                name: "Progressive Muscle Relaxation",
                steps: &[
                    "Tense each muscle group",
                    "Hold 5 seconds",
                    "Release slowly",
                    "Notice the difference",
                ],
                category: "anxiety_relief",
                difficulty: Difficulty::Intermediate,
                reason: Some("Helps release physical tension from anxiety"),
            },
        ],
        Mood::Depression => &[
            Exercise {
                name: "Energy Breathing",
                steps: &[
                    "Quick inhales through nose",
                    "Gentle exhales",
                    "Focus on energizing",
                    "2-3 minutes",
                ],
                category: "energy_boost",
                difficulty: Difficulty::Beginner,
                reason: Some("Gentle energy boost for low mood"),
            },
            Exercise {
                name: "Gratitude Breathing",
                steps: &[
                    "Inhale thinking of something good",
                    "Exhale releasing negativity",
                    "Repeat 10 times",
                ],
                category: "mood_lift",
                difficulty: Difficulty::Beginner,
                reason: Some("Combines breathing with positive thinking"),
            },
        ],
        Mood::Anger => &[
            Exercise {
                name: "Cooling Breath",
                steps: &[
                    "Inhale through nose",
                    "Exhale through mouth like cooling soup",
                    "Focus on cooling sensation",
                    "5 minutes",
                ],
                category: "anger_management",
                difficulty: Difficulty::Beginner,
                reason: Some("Physically cooling breath helps with anger"),
            },
            Exercise {
                name: "Count to 10 Breathing",
                steps: &[
                    "Inhale for 5 counts",
                    "Hold for 2 counts",
                    "Exhale for 10 counts",
                    "Repeat 5 times",
                ],
                category: "anger_management",
                difficulty: Difficulty::Beginner,
                reason: Some("Slows down the nervous system during anger"),
            },
        ],
        Mood::Tired => &[
            Exercise {
                name: "Energizing Breath",
                steps: &[
                    "Quick, sharp inhales",
                    "Gentle exhales",
                    "Focus on energizing",
                    "1-2 minutes",
                ],
                category: "energy",
                difficulty: Difficulty::Beginner,
                reason: Some("Quick energy boost when feeling tired"),
            },
            Exercise {
                name: "Alternate Nostril Breathing",
                steps: &[
                    "Close right nostril",
                    "Inhale left",
                    "Close left",
                    "Exhale right",
                    "Repeat",
                ],
                category: "energy",
                difficulty: Difficulty::Intermediate,
                reason: Some("Balances energy and helps with fatigue"),
            },
        ],
    }
}

/// Build a plan from detected moods and the latest 1-5 mood rating
pub fn personalize(moods: &[Mood], recent_mood: Option<u8>) -> Result<ExercisePlan, GuideError> {
    if let Some(rating) = recent_mood {
        if !(1..=5).contains(&rating) {
            return Err(GuideError::MoodOutOfRange(rating));
        }
    }

    let low_mood = recent_mood.is_some_and(|r| r <= LOW_MOOD_THRESHOLD);

    let tailored = moods
        .iter()
        .flat_map(|&mood| for_mood(mood).iter())
        .filter(|ex| !low_mood || ex.difficulty == Difficulty::Beginner)
        .cloned();

    let exercises: Vec<Exercise> = BASE.iter().cloned().chain(tailored).collect();

    debug!(
        "Personalized {} exercises for moods {:?} (recent mood {:?})",
        exercises.len(),
        moods,
        recent_mood
    );

    Ok(ExercisePlan {
        exercises,
        detected_moods: moods.to_vec(),
        recent_mood,
        reason: PLAN_REASON,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(plan: &ExercisePlan) -> Vec<&str> {
        plan.exercises.iter().map(|e| e.name).collect()
    }

    #[test]
    fn test_base_only() {
        let plan = personalize(&[], None).unwrap();
        assert_eq!(
            names(&plan),
            vec!["Box Breathing (4x4x4x4)", "5-4-3-2-1 Grounding", "Mindful Breathing"]
        );
        assert!(plan.detected_moods.is_empty());
    }

    #[test]
    fn test_mood_routines_follow_mood_order() {
        let plan = personalize(&[Mood::Anger, Mood::Tired], Some(4)).unwrap();
        assert_eq!(plan.exercises.len(), 7);
        assert_eq!(plan.exercises[3].name, "Cooling Breath");
        assert_eq!(plan.exercises[6].name, "Alternate Nostril Breathing");
    }

    #[test]
    fn test_low_mood_keeps_beginner_only() {
        let plan = personalize(&[Mood::Anxiety, Mood::Tired], Some(2)).unwrap();
        let names = names(&plan);
        assert!(names.contains(&"4-7-8 Breathing"));
        assert!(names.contains(&"Energizing Breath"));
        assert!(!names.contains(&"Progressive Muscle Relaxation"));
        assert!(!names.contains(&"Alternate Nostril Breathing"));
        assert_eq!(plan.exercises.len(), 5);
    }

    #[test]
    fn test_rating_out_of_range() {
        assert!(matches!(
            personalize(&[], Some(0)),
            Err(GuideError::MoodOutOfRange(0))
        ));
        assert!(matches!(
            personalize(&[], Some(6)),
            Err(GuideError::MoodOutOfRange(6))
        ));
    }

    #[test]
    fn test_plan_json_shape() {
        let plan = personalize(&[Mood::Depression], Some(3)).unwrap();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["detected_moods"][0], "depression");
        assert_eq!(json["recent_mood"], 3);
        assert_eq!(json["exercises"][0]["difficulty"], "beginner");
        assert!(json["exercises"][0].get("reason").is_none());
        assert_eq!(json["exercises"][3]["reason"], "Gentle energy boost for low mood");
    }
}
