use std::sync::Arc;

use academy_core::Catalog;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::playground::{AnthropicClient, MessagesClient, PlaygroundConfig, PlaygroundService};
use crate::progress_service::ProgressService;
use crate::settings_service::SettingsService;

/// Assembles app-facing services over one store and one catalog.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<Catalog>,
    progress: Arc<ProgressService>,
    settings: Arc<SettingsService>,
    playground: Arc<PlaygroundService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the Anthropic client.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: Catalog,
        config: PlaygroundConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let client: Arc<dyn MessagesClient> =
            Arc::new(AnthropicClient::new(config.api_version.clone()));
        Ok(Self::from_storage(&storage, clock, catalog, config, client))
    }

    /// Wire services over an existing store.
    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        catalog: Catalog,
        config: PlaygroundConfig,
        client: Arc<dyn MessagesClient>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let settings = SettingsService::new(Arc::clone(&storage.kv));
        let progress = Arc::new(ProgressService::new(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.kv),
        ));
        let playground = Arc::new(PlaygroundService::new(
            clock,
            config,
            settings.clone(),
            Arc::clone(&storage.kv),
            client,
        ));

        Self {
            catalog,
            progress,
            settings: Arc::new(settings),
            playground,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn playground(&self) -> Arc<PlaygroundService> {
        Arc::clone(&self.playground)
    }
}
