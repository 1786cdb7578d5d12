//! Key namespaces and the persisted shapes stored under them.
//!
//! One key per engine; nothing else writes to it.

use academy_core::model::{UserProgress, UserSettings};
use serde::{Deserialize, Serialize};

pub const PROGRESS_KEY: &str = "progress-store";
pub const SETTINGS_KEY: &str = "settings-store";
/// Holds a JSON array of `PlaygroundSession`, newest first.
pub const PLAYGROUND_HISTORY_KEY: &str = "ai_learn_playground";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub user_progress: UserProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub settings: UserSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::time::fixed_now;

    #[test]
    fn progress_record_wraps_under_user_progress() {
        let record = ProgressRecord {
            user_progress: UserProgress::empty(fixed_now()),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userProgress"]["userId"], "local");
    }

    #[test]
    fn settings_record_wraps_under_settings() {
        let record = SettingsRecord {
            settings: UserSettings::default(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value["settings"].is_object());
    }
}
