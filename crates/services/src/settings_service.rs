use std::sync::Arc;

use academy_core::model::{ApiProvider, SettingsPatch, Theme, UserSettings, normalize_optional};
use storage::json::{read_json, write_json};
use storage::keys::{SETTINGS_KEY, SettingsRecord};
use storage::repository::KeyValueStore;

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load persisted settings (or defaults if missing or unreadable).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<UserSettings, SettingsServiceError> {
        let record: Option<SettingsRecord> = read_json(self.store.as_ref(), SETTINGS_KEY).await?;
        Ok(record.map(|record| record.settings).unwrap_or_default())
    }

    /// Validate a partial update against the stored settings and persist it.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if validation fails or persistence fails.
    pub async fn update(&self, patch: SettingsPatch) -> Result<UserSettings, SettingsServiceError> {
        let current = self.load().await?;
        let next = patch.apply(&current)?;
        self.save(&next).await?;
        Ok(next)
    }

    /// Store (or clear, when blank) the key for one provider.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn set_api_key(
        &self,
        provider: ApiProvider,
        key: Option<String>,
    ) -> Result<UserSettings, SettingsServiceError> {
        let mut settings = self.load().await?;
        settings.api_keys.set(provider, normalize_optional(key));
        self.save(&settings).await?;
        tracing::debug!(?provider, "api key updated");
        Ok(settings)
    }

    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn clear_api_keys(&self) -> Result<UserSettings, SettingsServiceError> {
        let mut settings = self.load().await?;
        settings.api_keys = Default::default();
        self.save(&settings).await?;
        Ok(settings)
    }

    /// Cycle light → dark → system and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn toggle_theme(&self) -> Result<Theme, SettingsServiceError> {
        let mut settings = self.load().await?;
        settings.theme = settings.theme.next();
        self.save(&settings).await?;
        Ok(settings.theme)
    }

    async fn save(&self, settings: &UserSettings) -> Result<(), SettingsServiceError> {
        let record = SettingsRecord {
            settings: settings.clone(),
        };
        write_json(self.store.as_ref(), SETTINGS_KEY, &record).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::model::SettingsError;
    use storage::repository::InMemoryStore;

    fn service() -> SettingsService {
        SettingsService::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn load_defaults_when_missing() {
        let settings = service().load().await.unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[tokio::test]
    async fn update_persists_valid_patch() {
        let service = service();
        let patch = SettingsPatch {
            code_theme: Some("  github  ".into()),
            api_base_url: Some("https://proxy.example.com".into()),
            ..SettingsPatch::new()
        };
        service.update(patch).await.unwrap();

        let loaded = service.load().await.unwrap();
        assert_eq!(loaded.code_theme, "github");
        assert_eq!(loaded.api_base_url.as_deref(), Some("https://proxy.example.com"));
    }

    #[tokio::test]
    async fn update_rejects_bad_url_and_keeps_old_value() {
        let service = service();
        let err = service
            .update(SettingsPatch {
                api_base_url: Some("not a url".into()),
                ..SettingsPatch::new()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsServiceError::Settings(SettingsError::InvalidBaseUrl)
        ));
        assert!(service.load().await.unwrap().api_base_url.is_none());
    }

    #[tokio::test]
    async fn api_keys_set_and_clear() {
        let service = service();
        service
            .set_api_key(ApiProvider::Anthropic, Some(" sk-ant-123 ".into()))
            .await
            .unwrap();
        let loaded = service.load().await.unwrap();
        assert_eq!(loaded.api_key(ApiProvider::Anthropic), Some("sk-ant-123"));
        assert_eq!(loaded.api_key(ApiProvider::Openai), None);

        service.clear_api_keys().await.unwrap();
        assert_eq!(
            service.load().await.unwrap().api_key(ApiProvider::Anthropic),
            None
        );
    }

    #[tokio::test]
    async fn toggle_theme_cycles() {
        let service = service();
        assert_eq!(service.toggle_theme().await.unwrap(), Theme::Light);
        assert_eq!(service.toggle_theme().await.unwrap(), Theme::Dark);
        assert_eq!(service.toggle_theme().await.unwrap(), Theme::System);
    }
}
