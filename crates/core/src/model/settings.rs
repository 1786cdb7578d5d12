use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::course::Difficulty;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("invalid base URL")]
    InvalidBaseUrl,

    #[error("daily goal must be > 0 minutes")]
    InvalidDailyGoal,
}

//
// ─── ENUMS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    /// Cycles light → dark → system → light.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    Anthropic,
    Openai,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
}

impl ApiKeys {
    #[must_use]
    pub fn get(&self, provider: ApiProvider) -> Option<&str> {
        match provider {
            ApiProvider::Anthropic => self.anthropic.as_deref(),
            ApiProvider::Openai => self.openai.as_deref(),
        }
    }

    pub fn set(&mut self, provider: ApiProvider, key: Option<String>) {
        match provider {
            ApiProvider::Anthropic => self.anthropic = key,
            ApiProvider::Openai => self.openai = key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub achievements: bool,
    pub daily_reminder: bool,
    pub weekly_progress: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            achievements: true,
            daily_reminder: false,
            weekly_progress: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningSettings {
    /// Minutes per day.
    pub daily_goal: u32,
    pub preferred_difficulty: Difficulty,
    pub auto_play_videos: bool,
    pub show_hints: bool,
}

impl Default for LearningSettings {
    fn default() -> Self {
        Self {
            daily_goal: 30,
            preferred_difficulty: Difficulty::Intermediate,
            auto_play_videos: false,
            show_hints: true,
        }
    }
}

/// Learner preferences persisted in the settings store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub theme: Theme,
    pub code_theme: String,
    pub font_size: FontSize,
    #[serde(default)]
    pub api_keys: ApiKeys,
    /// Overrides the playground endpoint when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub learning: LearningSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            code_theme: "vs-dark".to_owned(),
            font_size: FontSize::Medium,
            api_keys: ApiKeys::default(),
            api_base_url: None,
            notifications: NotificationSettings::default(),
            learning: LearningSettings::default(),
        }
    }
}

impl UserSettings {
    #[must_use]
    pub fn api_key(&self, provider: ApiProvider) -> Option<&str> {
        self.api_keys.get(provider)
    }
}

/// Partial update; `None` leaves the current value untouched.
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub code_theme: Option<String>,
    pub font_size: Option<FontSize>,
    pub api_base_url: Option<String>,
    pub notifications: Option<NotificationSettings>,
    pub learning: Option<LearningSettings>,
}

impl SettingsPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the patch over `current`, validating the result.
    ///
    /// An empty `api_base_url` clears the override.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the base URL is present but invalid, or the
    /// daily goal is zero.
    pub fn apply(self, current: &UserSettings) -> Result<UserSettings, SettingsError> {
        let mut next = current.clone();
        if let Some(theme) = self.theme {
            next.theme = theme;
        }
        if let Some(code_theme) = normalize_optional(self.code_theme) {
            next.code_theme = code_theme;
        }
        if let Some(font_size) = self.font_size {
            next.font_size = font_size;
        }
        if let Some(raw) = self.api_base_url {
            next.api_base_url = normalize_optional(Some(raw));
        }
        if let Some(notifications) = self.notifications {
            next.notifications = notifications;
        }
        if let Some(learning) = self.learning {
            next.learning = learning;
        }

        if let Some(url) = next.api_base_url.as_ref() {
            if Url::parse(url).is_err() {
                return Err(SettingsError::InvalidBaseUrl);
            }
        }
        if next.learning.daily_goal == 0 {
            return Err(SettingsError::InvalidDailyGoal);
        }

        Ok(next)
    }
}

/// Trims and drops blank strings.
#[must_use]
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_launch() {
        let settings = UserSettings::default();
        assert_eq!(settings.theme, Theme::System);
        assert_eq!(settings.code_theme, "vs-dark");
        assert_eq!(settings.font_size, FontSize::Medium);
        assert!(settings.api_key(ApiProvider::Anthropic).is_none());
        assert!(settings.notifications.achievements);
        assert!(!settings.notifications.daily_reminder);
        assert_eq!(settings.learning.daily_goal, 30);
        assert_eq!(settings.learning.preferred_difficulty, Difficulty::Intermediate);
        assert!(settings.learning.show_hints);
    }

    #[test]
    fn theme_cycles_through_all_variants() {
        assert_eq!(Theme::Light.next(), Theme::Dark);
        assert_eq!(Theme::Dark.next(), Theme::System);
        assert_eq!(Theme::System.next(), Theme::Light);
    }

    #[test]
    fn patch_rejects_invalid_base_url() {
        let patch = SettingsPatch {
            api_base_url: Some("not a url".into()),
            ..SettingsPatch::new()
        };
        let err = patch.apply(&UserSettings::default()).unwrap_err();
        assert_eq!(err, SettingsError::InvalidBaseUrl);
    }

    #[test]
    fn patch_blank_base_url_clears_override() {
        let current = UserSettings {
            api_base_url: Some("https://proxy.example.com".into()),
            ..UserSettings::default()
        };
        let patch = SettingsPatch {
            api_base_url: Some("   ".into()),
            ..SettingsPatch::new()
        };
        let next = patch.apply(&current).unwrap();
        assert_eq!(next.api_base_url, None);
    }

    #[test]
    fn patch_keeps_untouched_fields() {
        let mut current = UserSettings::default();
        current.api_keys.set(ApiProvider::Anthropic, Some("sk-test".into()));
        let patch = SettingsPatch {
            theme: Some(Theme::Dark),
            ..SettingsPatch::new()
        };
        let next = patch.apply(&current).unwrap();
        assert_eq!(next.theme, Theme::Dark);
        assert_eq!(next.api_key(ApiProvider::Anthropic), Some("sk-test"));
        assert_eq!(next.code_theme, "vs-dark");
    }

    #[test]
    fn patch_rejects_zero_daily_goal() {
        let patch = SettingsPatch {
            learning: Some(LearningSettings {
                daily_goal: 0,
                ..LearningSettings::default()
            }),
            ..SettingsPatch::new()
        };
        assert_eq!(
            patch.apply(&UserSettings::default()).unwrap_err(),
            SettingsError::InvalidDailyGoal
        );
    }
}
