//! Pure progress transitions over `UserProgress`.
//!
//! Nothing here touches storage; services load, apply, finalize and save.

mod rewards;
mod tracker;

pub use rewards::{
    calculate_streak, exercise_points, finalize_for_save, newly_unlocked, solved_exercises,
    total_points,
};
pub use tracker::{CompletionOutcome, ProgressTracker, percent, recompute_course, recompute_module};
