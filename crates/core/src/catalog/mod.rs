//! Static, read-only course content.
//!
//! Lookups are linear scans over a small forest; every miss is `None`.

mod navigator;
mod validate;

use crate::model::{Course, Exercise, Lesson, Module};

pub use validate::{CatalogError, validate_courses};

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// A validated Course → Module → Lesson forest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    courses: Vec<Course>,
}

/// Resolved position of a lesson inside the catalog.
#[derive(Debug, Clone, Copy)]
pub struct LessonLocation<'a> {
    pub course: &'a Course,
    pub module: &'a Module,
    pub lesson: &'a Lesson,
}

impl Catalog {
    /// Build a catalog from already-parsed courses.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if ids, slugs, back-references, ordering or
    /// prerequisites are inconsistent.
    pub fn from_courses(courses: Vec<Course>) -> Result<Self, CatalogError> {
        validate_courses(&courses)?;
        Ok(Self { courses })
    }

    /// Parse and validate a JSON array of courses.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON, or a validation error.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let courses: Vec<Course> = serde_json::from_str(json)?;
        Self::from_courses(courses)
    }

    /// The catalog shipped with the app.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` only if the bundled data is broken.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    #[must_use]
    pub fn all_courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn course_by_id(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|course| course.id == course_id)
    }

    #[must_use]
    pub fn course_by_slug(&self, slug: &str) -> Option<&Course> {
        self.courses.iter().find(|course| course.slug == slug)
    }

    /// Searches every course.
    #[must_use]
    pub fn module_by_id(&self, module_id: &str) -> Option<&Module> {
        self.courses
            .iter()
            .find_map(|course| course.module(module_id))
    }

    #[must_use]
    pub fn lesson_by_id(&self, lesson_id: &str) -> Option<&Lesson> {
        self.locate_lesson(lesson_id).map(|loc| loc.lesson)
    }

    #[must_use]
    pub fn lesson_by_slug(&self, course_slug: &str, lesson_slug: &str) -> Option<&Lesson> {
        self.course_by_slug(course_slug)?
            .lessons()
            .find(|lesson| lesson.slug == lesson_slug)
    }

    #[must_use]
    pub fn exercise_by_id(&self, exercise_id: &str) -> Option<&Exercise> {
        self.courses
            .iter()
            .flat_map(Course::lessons)
            .filter_map(|lesson| lesson.exercise.as_ref())
            .find(|exercise| exercise.id == exercise_id)
    }

    /// Resolve the owning course and module of a lesson.
    #[must_use]
    pub fn locate_lesson(&self, lesson_id: &str) -> Option<LessonLocation<'_>> {
        self.courses.iter().find_map(|course| {
            course.modules.iter().find_map(|module| {
                module.lesson(lesson_id).map(|lesson| LessonLocation {
                    course,
                    module,
                    lesson,
                })
            })
        })
    }

    #[must_use]
    pub fn course_for_lesson(&self, lesson_id: &str) -> Option<&Course> {
        self.locate_lesson(lesson_id).map(|loc| loc.course)
    }

    #[must_use]
    pub fn module_for_lesson(&self, lesson_id: &str) -> Option<&Module> {
        self.locate_lesson(lesson_id).map(|loc| loc.module)
    }

    /// Prerequisites of a course, silently skipping ids that don't resolve.
    #[must_use]
    pub fn prerequisite_courses(&self, course_id: &str) -> Vec<&Course> {
        let Some(course) = self.course_by_id(course_id) else {
            return Vec::new();
        };
        course
            .prerequisites
            .iter()
            .filter_map(|id| self.course_by_id(id.as_str()))
            .collect()
    }

    /// Case-insensitive substring search over title, description and tags.
    #[must_use]
    pub fn search_courses(&self, query: &str) -> Vec<&Course> {
        let needle = query.to_lowercase();
        self.courses
            .iter()
            .filter(|course| course.matches_query(&needle))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::{Course, CourseId, Difficulty, Lesson, LessonId, LessonKind, Module, ModuleId};

    pub fn lesson(module_id: &str, id: &str, order: u32) -> Lesson {
        Lesson {
            id: LessonId::new(id),
            module_id: ModuleId::new(module_id),
            title: format!("Lesson {id}"),
            slug: id.to_owned(),
            kind: LessonKind::Reading,
            content: String::new(),
            order,
            estimated_minutes: 10,
            objectives: Vec::new(),
            resources: Vec::new(),
            exercise: None,
        }
    }

    pub fn module(course_id: &str, id: &str, order: u32, lessons: Vec<Lesson>) -> Module {
        Module {
            id: ModuleId::new(id),
            course_id: CourseId::new(course_id),
            title: format!("Module {id}"),
            description: String::new(),
            order,
            estimated_minutes: 30,
            lessons,
        }
    }

    pub fn course(id: &str, modules: Vec<Module>) -> Course {
        Course {
            id: CourseId::new(id),
            title: format!("Course {id}"),
            description: String::new(),
            slug: id.to_owned(),
            icon: String::new(),
            color: String::new(),
            modules,
            estimated_hours: 1,
            difficulty: Difficulty::Beginner,
            prerequisites: Vec::new(),
            tags: Vec::new(),
        }
    }
}
