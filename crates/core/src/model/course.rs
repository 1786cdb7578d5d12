use serde::{Deserialize, Serialize};

use crate::model::exercise::Exercise;
use crate::model::ids::{CourseId, LessonId, ModuleId};

//
// ─── ENUMS ─────────────────────────────────────────────────────────────────────
//

/// Difficulty tier of a course, also used as a learner preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

/// Presentation style of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    Reading,
    Video,
    Interactive,
    Exercise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Documentation,
    Article,
    Video,
    Github,
    Paper,
}

/// External reading attached to a lesson or project exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

//
// ─── CATALOG ENTITIES ──────────────────────────────────────────────────────────
//

/// A single unit of content inside a module.
///
/// `module_id` is a non-owning back-reference; resolve it through the
/// `Catalog` rather than holding on to the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: LessonId,
    pub module_id: ModuleId,
    pub title: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: LessonKind,
    /// Markdown body.
    #[serde(default)]
    pub content: String,
    /// 1-based position within the owning module.
    pub order: u32,
    pub estimated_minutes: u32,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<Exercise>,
}

/// An ordered group of lessons inside a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    pub course_id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// 1-based position within the owning course.
    pub order: u32,
    pub estimated_minutes: u32,
    pub lessons: Vec<Lesson>,
}

impl Module {
    #[must_use]
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id == lesson_id)
    }

    #[must_use]
    pub fn lesson_position(&self, lesson_id: &str) -> Option<usize> {
        self.lessons.iter().position(|lesson| lesson.id == lesson_id)
    }

    #[must_use]
    pub fn first_lesson(&self) -> Option<&Lesson> {
        self.lessons.first()
    }

    #[must_use]
    pub fn last_lesson(&self) -> Option<&Lesson> {
        self.lessons.last()
    }
}

/// Top-level catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub slug: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    pub modules: Vec<Module>,
    pub estimated_hours: u32,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub prerequisites: Vec<CourseId>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Course {
    #[must_use]
    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.id == module_id)
    }

    #[must_use]
    pub fn module_position(&self, module_id: &str) -> Option<usize> {
        self.modules.iter().position(|module| module.id == module_id)
    }

    /// Total lessons declared across all modules.
    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|module| module.lessons.len()).sum()
    }

    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|module| module.lessons.iter())
    }

    /// Case-insensitive substring match over title, description and tags.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches_query(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }
}
