use std::sync::Arc;

use academy_core::Catalog;
use academy_core::model::{
    Achievement, CourseId, CourseProgress, ExerciseAttempt, LessonId, LessonProgress, ModuleId,
    ModuleProgress, UserProgress,
};
use academy_core::progress::{self, CompletionOutcome, ProgressTracker};
use storage::json::{read_json, write_json};
use storage::keys::{PROGRESS_KEY, ProgressRecord};
use storage::repository::KeyValueStore;

use crate::Clock;
use crate::error::ProgressServiceError;

/// Read-modify-write engine over the learner's progress aggregate.
///
/// Every mutation loads the stored aggregate, applies one transition,
/// refreshes streak/points/last activity and writes it back. Calls are
/// expected to be awaited one at a time.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    catalog: Arc<Catalog>,
    store: Arc<dyn KeyValueStore>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            catalog,
            store,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Stored aggregate, or a fresh empty one if nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store cannot be read.
    pub async fn get_user_progress(&self) -> Result<UserProgress, ProgressServiceError> {
        let record: Option<ProgressRecord> = read_json(self.store.as_ref(), PROGRESS_KEY).await?;
        Ok(record.map_or_else(
            || UserProgress::empty(self.clock.now()),
            |record| record.user_progress,
        ))
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store cannot be read.
    pub async fn get_course_progress(
        &self,
        course_id: &str,
    ) -> Result<Option<CourseProgress>, ProgressServiceError> {
        let progress = self.get_user_progress().await?;
        Ok(progress.course(course_id).cloned())
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store cannot be read.
    pub async fn get_module_progress(
        &self,
        course_id: &str,
        module_id: &str,
    ) -> Result<Option<ModuleProgress>, ProgressServiceError> {
        let progress = self.get_user_progress().await?;
        Ok(progress.module(course_id, module_id).cloned())
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store cannot be read.
    pub async fn get_lesson_progress(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_id: &str,
    ) -> Result<Option<LessonProgress>, ProgressServiceError> {
        let progress = self.get_user_progress().await?;
        Ok(progress.lesson(course_id, module_id, lesson_id).cloned())
    }

    /// Start a course. Already started courses are left untouched and
    /// nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store fails.
    pub async fn start_course(&self, course_id: &CourseId) -> Result<(), ProgressServiceError> {
        let mut progress = self.get_user_progress().await?;
        if self.tracker().start_course(&mut progress, course_id) {
            tracing::debug!(%course_id, "started course");
            self.save(progress).await?;
        }
        Ok(())
    }

    /// Start a module, starting its course first if needed.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store fails.
    pub async fn start_module(
        &self,
        course_id: &CourseId,
        module_id: &ModuleId,
    ) -> Result<(), ProgressServiceError> {
        let mut progress = self.get_user_progress().await?;
        if self.tracker().start_module(&mut progress, course_id, module_id) {
            tracing::debug!(%course_id, %module_id, "started module");
            self.save(progress).await?;
        }
        Ok(())
    }

    /// Start a lesson, creating any missing module and course records.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store fails.
    pub async fn start_lesson(
        &self,
        course_id: &CourseId,
        module_id: &ModuleId,
        lesson_id: &LessonId,
    ) -> Result<(), ProgressServiceError> {
        let mut progress = self.get_user_progress().await?;
        if self
            .tracker()
            .start_lesson(&mut progress, course_id, module_id, lesson_id)
        {
            tracing::debug!(%course_id, %module_id, %lesson_id, "started lesson");
            self.save(progress).await?;
        }
        Ok(())
    }

    /// Complete a lesson and let completion propagate to its module and
    /// course when every catalog-declared sibling is done.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store fails.
    pub async fn complete_lesson(
        &self,
        course_id: &CourseId,
        module_id: &ModuleId,
        lesson_id: &LessonId,
    ) -> Result<CompletionOutcome, ProgressServiceError> {
        let mut progress = self.get_user_progress().await?;
        let outcome = self
            .tracker()
            .complete_lesson(&mut progress, course_id, module_id, lesson_id);
        tracing::debug!(%course_id, %module_id, %lesson_id, ?outcome, "completed lesson");
        if outcome.module_completed {
            tracing::info!(%course_id, %module_id, "module completed");
        }
        if outcome.course_completed {
            tracing::info!(%course_id, "course completed");
        }
        self.save(progress).await?;
        Ok(outcome)
    }

    /// Force a module to completed, whatever its lessons say.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store fails.
    pub async fn complete_module(
        &self,
        course_id: &CourseId,
        module_id: &ModuleId,
    ) -> Result<(), ProgressServiceError> {
        let mut progress = self.get_user_progress().await?;
        if self
            .tracker()
            .complete_module(&mut progress, course_id, module_id)
        {
            tracing::info!(%course_id, %module_id, "module marked complete");
        }
        self.save(progress).await
    }

    /// Force a course to completed, whatever its modules say.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store fails.
    pub async fn complete_course(&self, course_id: &CourseId) -> Result<(), ProgressServiceError> {
        let mut progress = self.get_user_progress().await?;
        if self.tracker().complete_course(&mut progress, course_id) {
            tracing::info!(%course_id, "course marked complete");
        }
        self.save(progress).await
    }

    /// Append an exercise attempt to a started lesson.
    ///
    /// Returns `false` and writes nothing when the lesson has no progress
    /// record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store fails.
    pub async fn record_exercise_attempt(
        &self,
        lesson_id: &LessonId,
        attempt: ExerciseAttempt,
    ) -> Result<bool, ProgressServiceError> {
        let mut progress = self.get_user_progress().await?;
        let exercise_id = attempt.exercise_id.clone();
        if !self
            .tracker()
            .record_exercise_attempt(&mut progress, lesson_id, attempt)
        {
            tracing::debug!(%lesson_id, %exercise_id, "dropping attempt for unstarted lesson");
            return Ok(false);
        }
        self.save(progress).await?;
        Ok(true)
    }

    /// Streak as it would be if activity were recorded now.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store cannot be read.
    pub async fn calculate_streak(&self) -> Result<u32, ProgressServiceError> {
        let progress = self.get_user_progress().await?;
        Ok(progress::calculate_streak(
            progress.streak,
            progress.last_activity_date,
            self.clock.now(),
        ))
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store cannot be read.
    pub async fn total_points(&self) -> Result<u32, ProgressServiceError> {
        let progress = self.get_user_progress().await?;
        Ok(progress::total_points(&progress))
    }

    /// Unlock every definition whose criteria are now met.
    ///
    /// Returns only the newly unlocked achievements; writes nothing when
    /// there are none.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store fails.
    pub async fn check_achievements(
        &self,
        definitions: &[Achievement],
    ) -> Result<Vec<Achievement>, ProgressServiceError> {
        let mut progress = self.get_user_progress().await?;
        let unlocked = progress::newly_unlocked(&progress, definitions, self.clock.now());
        if unlocked.is_empty() {
            return Ok(unlocked);
        }
        for achievement in &unlocked {
            tracing::info!(achievement = %achievement.id, "achievement unlocked");
        }
        progress.achievements.extend(unlocked.iter().cloned());
        self.save(progress).await?;
        Ok(unlocked)
    }

    /// Replace the stored aggregate with an empty one.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store fails.
    pub async fn reset_progress(&self) -> Result<UserProgress, ProgressServiceError> {
        let fresh = UserProgress::empty(self.clock.now());
        write_json(
            self.store.as_ref(),
            PROGRESS_KEY,
            &ProgressRecord {
                user_progress: fresh.clone(),
            },
        )
        .await?;
        tracing::info!("progress reset");
        Ok(fresh)
    }

    fn tracker(&self) -> ProgressTracker<'_> {
        ProgressTracker::new(&self.catalog, self.clock.now())
    }

    async fn save(&self, mut progress: UserProgress) -> Result<(), ProgressServiceError> {
        progress::finalize_for_save(&mut progress, self.clock.now());
        write_json(
            self.store.as_ref(),
            PROGRESS_KEY,
            &ProgressRecord {
                user_progress: progress,
            },
        )
        .await?;
        Ok(())
    }
}
