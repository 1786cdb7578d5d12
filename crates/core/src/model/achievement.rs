use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{AchievementId, CourseId, ModuleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Condition that unlocks an achievement.
///
/// `value` is a threshold; course/module scoped criteria fall back to
/// "any course" / "any module" when no id is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementCriteria {
    LessonsCompleted {
        value: u32,
    },
    ExercisesSolved {
        value: u32,
    },
    Streak {
        value: u32,
    },
    Points {
        value: u32,
    },
    #[serde(rename_all = "camelCase")]
    CourseCompleted {
        value: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        course_id: Option<CourseId>,
    },
    #[serde(rename_all = "camelCase")]
    PerfectModule {
        value: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        module_id: Option<ModuleId>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    pub criteria: AchievementCriteria,
    pub points: u32,
    pub rarity: Rarity,
}

impl Achievement {
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    /// Copy of this definition stamped as unlocked at `at`.
    #[must_use]
    pub fn unlocked(&self, at: DateTime<Utc>) -> Self {
        Self {
            unlocked_at: Some(at),
            ..self.clone()
        }
    }
}

fn definition(
    id: &str,
    title: &str,
    description: &str,
    icon: &str,
    criteria: AchievementCriteria,
    points: u32,
    rarity: Rarity,
) -> Achievement {
    Achievement {
        id: AchievementId::new(id),
        title: title.to_owned(),
        description: description.to_owned(),
        icon: icon.to_owned(),
        unlocked_at: None,
        criteria,
        points,
        rarity,
    }
}

/// Achievement definitions shipped with the app.
#[must_use]
pub fn builtin_achievements() -> Vec<Achievement> {
    vec![
        definition(
            "first-lesson",
            "First Steps",
            "Complete your first lesson",
            "Footprints",
            AchievementCriteria::LessonsCompleted { value: 1 },
            10,
            Rarity::Common,
        ),
        definition(
            "ten-lessons",
            "Bookworm",
            "Complete ten lessons",
            "BookOpen",
            AchievementCriteria::LessonsCompleted { value: 10 },
            25,
            Rarity::Rare,
        ),
        definition(
            "first-exercise",
            "Problem Solver",
            "Solve your first exercise",
            "Puzzle",
            AchievementCriteria::ExercisesSolved { value: 1 },
            10,
            Rarity::Common,
        ),
        definition(
            "week-streak",
            "On Fire",
            "Keep a seven day learning streak",
            "Flame",
            AchievementCriteria::Streak { value: 7 },
            50,
            Rarity::Epic,
        ),
        definition(
            "hundred-points",
            "Point Collector",
            "Earn 100 points from exercises",
            "Star",
            AchievementCriteria::Points { value: 100 },
            20,
            Rarity::Rare,
        ),
        definition(
            "perfect-module",
            "Flawless",
            "Complete every lesson of a module",
            "CheckCircle",
            AchievementCriteria::PerfectModule {
                value: 1,
                module_id: None,
            },
            15,
            Rarity::Common,
        ),
        definition(
            "first-course",
            "Graduate",
            "Complete a full course",
            "GraduationCap",
            AchievementCriteria::CourseCompleted {
                value: 1,
                course_id: None,
            },
            100,
            Rarity::Legendary,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_are_unique() {
        let defs = builtin_achievements();
        let mut ids: Vec<_> = defs.iter().map(|a| a.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), defs.len());
        assert!(defs.iter().all(|a| !a.is_unlocked()));
    }

    #[test]
    fn criteria_use_snake_case_tags() {
        let criteria = AchievementCriteria::PerfectModule {
            value: 1,
            module_id: Some(ModuleId::new("ai-intro")),
        };
        let value = serde_json::to_value(&criteria).unwrap();
        assert_eq!(value["type"], "perfect_module");
        assert_eq!(value["moduleId"], "ai-intro");
    }
}
