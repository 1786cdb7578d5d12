pub mod achievement;
mod course;
pub mod exercise;
mod ids;
pub mod playground;
mod progress;
mod settings;

pub use achievement::{Achievement, AchievementCriteria, Rarity, builtin_achievements};
pub use course::{Course, Difficulty, Lesson, LessonKind, Module, Resource, ResourceKind};
pub use exercise::{Exercise, ExerciseContent, ExerciseDifficulty};
pub use ids::{AchievementId, CourseId, ExerciseId, LessonId, ModuleId, SessionId};
pub use playground::{
    AiModel, HISTORY_LIMIT, ModelParameters, PlaygroundSession, TokenUsage, UsageStatistics,
};
pub use progress::{
    CourseProgress, ExerciseAttempt, LOCAL_USER_ID, LessonProgress, ModuleProgress, UserProgress,
};
pub use settings::{
    ApiKeys, ApiProvider, FontSize, LearningSettings, NotificationSettings, SettingsError,
    SettingsPatch, Theme, UserSettings, normalize_optional,
};
