use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::model::{
    CourseId, CourseProgress, ExerciseAttempt, LessonId, LessonProgress, ModuleId,
    ModuleProgress, UserProgress,
};

/// What a `complete_lesson` call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// The lesson had no `completed_at` before this call.
    pub lesson_completed: bool,
    /// The module was promoted to completed by this call.
    pub module_completed: bool,
    /// The course was promoted to completed by this call.
    pub course_completed: bool,
}

/// Applies start/complete transitions to a progress tree in memory.
///
/// Every transition recomputes the affected percentages from the catalog.
/// Catalog misses during a recompute leave the stored value untouched.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTracker<'a> {
    catalog: &'a Catalog,
    now: DateTime<Utc>,
}

impl<'a> ProgressTracker<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, now: DateTime<Utc>) -> Self {
        Self { catalog, now }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Returns `true` if a new course record was inserted.
    pub fn start_course(&self, progress: &mut UserProgress, course_id: &CourseId) -> bool {
        if progress.course(course_id.as_str()).is_some() {
            return false;
        }
        progress
            .courses
            .push(CourseProgress::new(course_id.clone(), self.now));
        true
    }

    /// Starts the course first if needed. Returns `true` if anything was inserted.
    pub fn start_module(
        &self,
        progress: &mut UserProgress,
        course_id: &CourseId,
        module_id: &ModuleId,
    ) -> bool {
        let course_started = self.start_course(progress, course_id);
        let Some(course) = progress.course_mut(course_id.as_str()) else {
            return course_started;
        };
        if course.module(module_id.as_str()).is_some() {
            return course_started;
        }
        course
            .modules
            .push(ModuleProgress::new(module_id.clone(), self.now));
        recompute_course(self.catalog, course);
        true
    }

    /// Starts module and course first if needed. Returns `true` if anything
    /// was inserted.
    pub fn start_lesson(
        &self,
        progress: &mut UserProgress,
        course_id: &CourseId,
        module_id: &ModuleId,
        lesson_id: &LessonId,
    ) -> bool {
        let ancestors_started = self.start_module(progress, course_id, module_id);
        let Some(course) = progress.course_mut(course_id.as_str()) else {
            return ancestors_started;
        };
        let Some(module) = course.module_mut(module_id.as_str()) else {
            return ancestors_started;
        };
        if module.lesson(lesson_id.as_str()).is_some() {
            return ancestors_started;
        }
        module
            .lessons
            .push(LessonProgress::new(lesson_id.clone(), self.now));
        recompute_module(self.catalog, module);
        recompute_course(self.catalog, course);
        true
    }

    /// Marks a module done regardless of its lessons.
    ///
    /// This is the explicit override path: `completion_percentage` is forced
    /// to 100 even when lessons are still open.
    pub fn complete_module(
        &self,
        progress: &mut UserProgress,
        course_id: &CourseId,
        module_id: &ModuleId,
    ) -> bool {
        self.start_module(progress, course_id, module_id);
        let Some(course) = progress.course_mut(course_id.as_str()) else {
            return false;
        };
        let Some(module) = course.module_mut(module_id.as_str()) else {
            return false;
        };
        let newly = module.completed_at.is_none();
        if newly {
            module.completed_at = Some(self.now);
        }
        module.completion_percentage = 100.0;
        recompute_course(self.catalog, course);
        newly
    }

    /// Marks a course done regardless of its modules. Override path, like
    /// `complete_module`.
    pub fn complete_course(&self, progress: &mut UserProgress, course_id: &CourseId) -> bool {
        self.start_course(progress, course_id);
        let Some(course) = progress.course_mut(course_id.as_str()) else {
            return false;
        };
        let newly = course.completed_at.is_none();
        if newly {
            course.completed_at = Some(self.now);
        }
        course.completion_percentage = 100.0;
        newly
    }

    /// Completes a lesson and promotes its module and course when every
    /// catalog-declared child is complete.
    ///
    /// Re-completing keeps the original `completed_at`.
    pub fn complete_lesson(
        &self,
        progress: &mut UserProgress,
        course_id: &CourseId,
        module_id: &ModuleId,
        lesson_id: &LessonId,
    ) -> CompletionOutcome {
        self.start_lesson(progress, course_id, module_id, lesson_id);
        let mut outcome = CompletionOutcome::default();

        let Some(course) = progress.course_mut(course_id.as_str()) else {
            return outcome;
        };
        let Some(module) = course.module_mut(module_id.as_str()) else {
            return outcome;
        };
        if let Some(lesson) = module.lesson_mut(lesson_id.as_str()) {
            if lesson.completed_at.is_none() {
                lesson.completed_at = Some(self.now);
                outcome.lesson_completed = true;
            }
        }
        recompute_module(self.catalog, module);
        recompute_course(self.catalog, course);

        if self.module_fully_completed(progress, course_id, module_id) {
            outcome.module_completed = self.complete_module(progress, course_id, module_id);
        }
        if self.course_fully_completed(progress, course_id) {
            outcome.course_completed = self.complete_course(progress, course_id);
        }
        outcome
    }

    /// Appends an attempt to the lesson's record wherever it lives.
    ///
    /// Returns `false` (and changes nothing) if the lesson was never started.
    pub fn record_exercise_attempt(
        &self,
        progress: &mut UserProgress,
        lesson_id: &LessonId,
        attempt: ExerciseAttempt,
    ) -> bool {
        for course in &mut progress.courses {
            let Some(lesson) = course
                .modules
                .iter_mut()
                .find_map(|module| module.lesson_mut(lesson_id.as_str()))
            else {
                continue;
            };
            lesson.time_spent = lesson.time_spent.saturating_add(attempt.time_spent);
            course.total_time_spent = course.total_time_spent.saturating_add(attempt.time_spent);
            lesson.exercise_attempts.push(attempt);
            return true;
        }
        false
    }

    fn module_fully_completed(
        &self,
        progress: &UserProgress,
        course_id: &CourseId,
        module_id: &ModuleId,
    ) -> bool {
        let Some(module) = self
            .catalog
            .course_by_id(course_id.as_str())
            .and_then(|course| course.module(module_id.as_str()))
        else {
            return false;
        };
        let Some(record) = progress.module(course_id.as_str(), module_id.as_str()) else {
            return false;
        };
        module
            .lessons
            .iter()
            .all(|lesson| record.is_lesson_completed(lesson.id.as_str()))
    }

    fn course_fully_completed(&self, progress: &UserProgress, course_id: &CourseId) -> bool {
        let Some(course) = self.catalog.course_by_id(course_id.as_str()) else {
            return false;
        };
        let Some(record) = progress.course(course_id.as_str()) else {
            return false;
        };
        // A module without lessons has nothing left to complete.
        course.modules.iter().all(|module| {
            module.lessons.is_empty()
                || record
                    .module(module.id.as_str())
                    .is_some_and(ModuleProgress::is_completed)
        })
    }
}

/// Completed lessons over catalog-declared lessons for one module.
pub fn recompute_module(catalog: &Catalog, record: &mut ModuleProgress) {
    let Some(module) = catalog.module_by_id(record.module_id.as_str()) else {
        return;
    };
    let completed = module
        .lessons
        .iter()
        .filter(|lesson| record.is_lesson_completed(lesson.id.as_str()))
        .count();
    record.completion_percentage = percent(completed, module.lessons.len());
}

/// Completed lessons over catalog-declared lessons across the whole course.
pub fn recompute_course(catalog: &Catalog, record: &mut CourseProgress) {
    let Some(course) = catalog.course_by_id(record.course_id.as_str()) else {
        return;
    };
    let mut total = 0;
    let mut completed = 0;
    for module in &course.modules {
        total += module.lessons.len();
        if let Some(module_record) = record.module(module.id.as_str()) {
            completed += module_record.completed_lessons();
        }
    }
    record.completion_percentage = percent(completed, total);
}

/// `part / whole * 100`, or 0 when there is nothing to complete.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
