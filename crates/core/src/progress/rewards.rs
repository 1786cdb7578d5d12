use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::model::{Achievement, AchievementCriteria, UserProgress};
use crate::time::elapsed_days_ceil;

/// Streak after activity at `now`, given the previous streak and the last
/// recorded activity.
///
/// Same instant keeps the streak, up to one day adds one, anything longer
/// resets it to zero.
#[must_use]
pub fn calculate_streak(previous: u32, last_activity: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    match elapsed_days_ceil(last_activity, now) {
        0 => previous,
        1 => previous.saturating_add(1),
        _ => 0,
    }
}

/// Score of every completed attempt in the tree.
#[must_use]
pub fn exercise_points(progress: &UserProgress) -> u32 {
    progress
        .attempts()
        .map(|attempt| attempt.earned_points())
        .fold(0, u32::saturating_add)
}

/// Exercise points plus the points of unlocked achievements.
#[must_use]
pub fn total_points(progress: &UserProgress) -> u32 {
    let achievements = progress
        .achievements
        .iter()
        .filter(|achievement| achievement.is_unlocked())
        .map(|achievement| achievement.points)
        .fold(0, u32::saturating_add);
    exercise_points(progress).saturating_add(achievements)
}

/// Distinct exercises with at least one completed attempt.
#[must_use]
pub fn solved_exercises(progress: &UserProgress) -> usize {
    progress
        .attempts()
        .filter(|attempt| attempt.completed)
        .map(|attempt| attempt.exercise_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Recompute the derived fields right before a write.
///
/// The streak is measured against the stored `last_activity_date`, so it
/// must run before that field is moved to `now`.
pub fn finalize_for_save(progress: &mut UserProgress, now: DateTime<Utc>) {
    progress.streak = calculate_streak(progress.streak, progress.last_activity_date, now);
    progress.last_activity_date = now;
    progress.total_points = total_points(progress);
}

/// Definitions whose criteria are met and that are not unlocked yet,
/// stamped with `now`.
#[must_use]
pub fn newly_unlocked(
    progress: &UserProgress,
    definitions: &[Achievement],
    now: DateTime<Utc>,
) -> Vec<Achievement> {
    definitions
        .iter()
        .filter(|def| !progress.has_achievement(def.id.as_str()))
        .filter(|def| criteria_met(progress, &def.criteria))
        .map(|def| def.unlocked(now))
        .collect()
}

fn criteria_met(progress: &UserProgress, criteria: &AchievementCriteria) -> bool {
    match criteria {
        AchievementCriteria::LessonsCompleted { value } => {
            at_least(progress.lessons().filter(|l| l.is_completed()).count(), *value)
        }
        AchievementCriteria::ExercisesSolved { value } => {
            at_least(solved_exercises(progress), *value)
        }
        AchievementCriteria::Streak { value } => progress.streak >= *value,
        // Achievement points are excluded so unlocking cannot feed itself.
        AchievementCriteria::Points { value } => exercise_points(progress) >= *value,
        AchievementCriteria::CourseCompleted { value, course_id } => match course_id {
            Some(id) => progress.course(id.as_str()).is_some_and(|c| c.is_completed()),
            None => at_least(
                progress.courses.iter().filter(|c| c.is_completed()).count(),
                *value,
            ),
        },
        AchievementCriteria::PerfectModule { value, module_id } => {
            let perfect = progress
                .courses
                .iter()
                .flat_map(|course| course.modules.iter())
                .filter(|module| module_id.as_ref().is_none_or(|id| module.module_id == *id))
                .filter(|module| {
                    module.is_completed()
                        && !module.lessons.is_empty()
                        && module.lessons.iter().all(|lesson| lesson.is_completed())
                })
                .count();
            at_least(perfect, *value)
        }
    }
}

fn at_least(count: usize, value: u32) -> bool {
    u32::try_from(count).unwrap_or(u32::MAX) >= value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::{
        CourseId, ExerciseAttempt, ExerciseId, LessonId, ModuleId, builtin_achievements,
    };
    use crate::progress::ProgressTracker;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn streak_holds_on_same_instant() {
        let now = fixed_now();
        assert_eq!(calculate_streak(4, now, now), 4);
    }

    #[test]
    fn streak_increments_for_yesterday() {
        let now = fixed_now();
        assert_eq!(calculate_streak(4, now - Duration::days(1), now), 5);
        // Any gap under a day rounds up to one.
        assert_eq!(calculate_streak(4, now - Duration::hours(2), now), 5);
    }

    #[test]
    fn streak_resets_after_two_days() {
        let now = fixed_now();
        assert_eq!(calculate_streak(4, now - Duration::days(2), now), 0);
        assert_eq!(calculate_streak(4, now - Duration::hours(25), now), 0);
    }

    #[test]
    fn finalize_reads_last_activity_before_overwriting() {
        let mut progress = UserProgress::empty(fixed_now() - Duration::days(1));
        progress.streak = 2;

        finalize_for_save(&mut progress, fixed_now());
        assert_eq!(progress.streak, 3);
        assert_eq!(progress.last_activity_date, fixed_now());

        finalize_for_save(&mut progress, fixed_now());
        assert_eq!(progress.streak, 3);
    }

    fn progress_with_attempts() -> UserProgress {
        let catalog = Catalog::builtin().unwrap();
        let tracker = ProgressTracker::new(&catalog, fixed_now());
        let mut progress = UserProgress::empty(fixed_now());
        let (c, m, l) = (
            CourseId::new("ai-fundamentals"),
            ModuleId::new("ai-intro"),
            LessonId::new("llm-basics"),
        );
        tracker.complete_lesson(&mut progress, &c, &m, &l);

        let quiz = ExerciseId::new("llm-basics-quiz");
        for attempt in [
            ExerciseAttempt::new(quiz.clone(), fixed_now(), 3),
            ExerciseAttempt::new(quiz.clone(), fixed_now(), 4).completed_with_score(8),
            ExerciseAttempt::new(quiz, fixed_now(), 2).completed_with_score(10),
        ] {
            tracker.record_exercise_attempt(&mut progress, &l, attempt);
        }
        progress
    }

    #[test]
    fn points_sum_completed_scores_and_unlocked_achievements() {
        let mut progress = progress_with_attempts();
        assert_eq!(exercise_points(&progress), 18);
        assert_eq!(total_points(&progress), 18);

        let defs = builtin_achievements();
        let mut first = defs[0].unlocked(fixed_now());
        progress.achievements.push(first.clone());
        assert_eq!(total_points(&progress), 28);

        // Locked entries never count.
        first.unlocked_at = None;
        progress.achievements = vec![first];
        assert_eq!(total_points(&progress), 18);
    }

    #[test]
    fn solved_exercises_counts_distinct_ids() {
        let progress = progress_with_attempts();
        assert_eq!(solved_exercises(&progress), 1);
    }

    #[test]
    fn newly_unlocked_skips_owned_and_unmet() {
        let mut progress = progress_with_attempts();
        let defs = builtin_achievements();

        let unlocked = newly_unlocked(&progress, &defs, fixed_now());
        let ids: Vec<_> = unlocked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["first-lesson", "first-exercise"]);
        assert!(unlocked.iter().all(|a| a.unlocked_at == Some(fixed_now())));

        progress.achievements.extend(unlocked);
        assert!(newly_unlocked(&progress, &defs, fixed_now()).is_empty());
    }

    #[test]
    fn perfect_module_requires_every_record_complete() {
        let catalog = Catalog::builtin().unwrap();
        let tracker = ProgressTracker::new(&catalog, fixed_now());
        let mut progress = UserProgress::empty(fixed_now());
        let course = CourseId::new("ai-fundamentals");
        let module = ModuleId::new("transformer-architecture");

        // Forced completion with no lessons is not perfect.
        tracker.complete_module(&mut progress, &course, &module);
        let defs = builtin_achievements();
        let perfect: Vec<_> = defs.iter().filter(|d| d.id == "perfect-module").cloned().collect();
        assert!(newly_unlocked(&progress, &perfect, fixed_now()).is_empty());

        tracker.complete_lesson(&mut progress, &course, &module, &LessonId::new("attention-mechanism"));
        assert_eq!(newly_unlocked(&progress, &perfect, fixed_now()).len(), 1);
    }
}
