use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::achievement::Achievement;
use crate::model::ids::{CourseId, ExerciseId, LessonId, ModuleId};

/// Owner id used for the single local learner.
pub const LOCAL_USER_ID: &str = "local";

//
// ─── ATTEMPTS ──────────────────────────────────────────────────────────────────
//

/// One submission against a lesson's exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseAttempt {
    pub exercise_id: ExerciseId,
    pub attempted_at: DateTime<Utc>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Minutes.
    pub time_spent: u32,
}

impl ExerciseAttempt {
    #[must_use]
    pub fn new(exercise_id: ExerciseId, attempted_at: DateTime<Utc>, time_spent: u32) -> Self {
        Self {
            exercise_id,
            attempted_at,
            completed: false,
            score: None,
            solution: None,
            feedback: None,
            time_spent,
        }
    }

    #[must_use]
    pub fn completed_with_score(mut self, score: u32) -> Self {
        self.completed = true;
        self.score = Some(score);
        self
    }

    /// Points this attempt contributes to the learner's total.
    #[must_use]
    pub fn earned_points(&self) -> u32 {
        if self.completed { self.score.unwrap_or(0) } else { 0 }
    }
}

//
// ─── PROGRESS RECORDS ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub lesson_id: LessonId,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Minutes, accumulated from exercise attempts.
    pub time_spent: u32,
    #[serde(default)]
    pub exercise_attempts: Vec<ExerciseAttempt>,
}

impl LessonProgress {
    #[must_use]
    pub fn new(lesson_id: LessonId, started_at: DateTime<Utc>) -> Self {
        Self {
            lesson_id,
            started_at,
            completed_at: None,
            time_spent: 0,
            exercise_attempts: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub module_id: ModuleId,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lessons: Vec<LessonProgress>,
    pub completion_percentage: f64,
}

impl ModuleProgress {
    #[must_use]
    pub fn new(module_id: ModuleId, started_at: DateTime<Utc>) -> Self {
        Self {
            module_id,
            started_at,
            completed_at: None,
            lessons: Vec::new(),
            completion_percentage: 0.0,
        }
    }

    #[must_use]
    pub fn lesson(&self, lesson_id: &str) -> Option<&LessonProgress> {
        self.lessons.iter().find(|l| l.lesson_id == lesson_id)
    }

    pub fn lesson_mut(&mut self, lesson_id: &str) -> Option<&mut LessonProgress> {
        self.lessons.iter_mut().find(|l| l.lesson_id == lesson_id)
    }

    #[must_use]
    pub fn is_lesson_completed(&self, lesson_id: &str) -> bool {
        self.lesson(lesson_id).is_some_and(LessonProgress::is_completed)
    }

    #[must_use]
    pub fn completed_lessons(&self) -> usize {
        self.lessons.iter().filter(|l| l.is_completed()).count()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course_id: CourseId,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modules: Vec<ModuleProgress>,
    pub completion_percentage: f64,
    /// Minutes; never decreases.
    pub total_time_spent: u32,
}

impl CourseProgress {
    #[must_use]
    pub fn new(course_id: CourseId, started_at: DateTime<Utc>) -> Self {
        Self {
            course_id,
            started_at,
            completed_at: None,
            modules: Vec::new(),
            completion_percentage: 0.0,
            total_time_spent: 0,
        }
    }

    #[must_use]
    pub fn module(&self, module_id: &str) -> Option<&ModuleProgress> {
        self.modules.iter().find(|m| m.module_id == module_id)
    }

    pub fn module_mut(&mut self, module_id: &str) -> Option<&mut ModuleProgress> {
        self.modules.iter_mut().find(|m| m.module_id == module_id)
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// The learner's whole progress tree.
///
/// `total_points` and `streak` are derived and recomputed on every save;
/// they are persisted only so readers don't have to recompute them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    #[serde(default)]
    pub courses: Vec<CourseProgress>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    pub total_points: u32,
    pub streak: u32,
    pub last_activity_date: DateTime<Utc>,
}

impl UserProgress {
    /// Fresh aggregate for the local learner.
    #[must_use]
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            user_id: LOCAL_USER_ID.to_owned(),
            courses: Vec::new(),
            achievements: Vec::new(),
            total_points: 0,
            streak: 0,
            last_activity_date: now,
        }
    }

    #[must_use]
    pub fn course(&self, course_id: &str) -> Option<&CourseProgress> {
        self.courses.iter().find(|c| c.course_id == course_id)
    }

    pub fn course_mut(&mut self, course_id: &str) -> Option<&mut CourseProgress> {
        self.courses.iter_mut().find(|c| c.course_id == course_id)
    }

    #[must_use]
    pub fn module(&self, course_id: &str, module_id: &str) -> Option<&ModuleProgress> {
        self.course(course_id)?.module(module_id)
    }

    #[must_use]
    pub fn lesson(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
    ) -> Option<&LessonProgress> {
        self.module(course_id, module_id)?.lesson(lesson_id)
    }

    pub fn lessons(&self) -> impl Iterator<Item = &LessonProgress> {
        self.courses
            .iter()
            .flat_map(|c| c.modules.iter())
            .flat_map(|m| m.lessons.iter())
    }

    pub fn attempts(&self) -> impl Iterator<Item = &ExerciseAttempt> {
        self.lessons().flat_map(|l| l.exercise_attempts.iter())
    }

    #[must_use]
    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a.id == id)
    }
}
