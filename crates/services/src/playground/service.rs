use std::sync::Arc;

use academy_core::model::playground::{self, merge_history, push_session};
use academy_core::model::{
    AiModel, ApiProvider, ModelParameters, PlaygroundSession, SessionId, TokenUsage,
    UsageStatistics,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use storage::json::{read_json, write_json};
use storage::keys::PLAYGROUND_HISTORY_KEY;
use storage::repository::KeyValueStore;

use crate::Clock;
use crate::error::PlaygroundError;
use crate::playground::client::{CompletionRequest, MessagesClient, PlaygroundConfig};
use crate::settings_service::SettingsService;

const SESSION_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Sends prompts to the model API and keeps a bounded local history.
#[derive(Clone)]
pub struct PlaygroundService {
    clock: Clock,
    config: PlaygroundConfig,
    settings: SettingsService,
    store: Arc<dyn KeyValueStore>,
    client: Arc<dyn MessagesClient>,
}

impl PlaygroundService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: PlaygroundConfig,
        settings: SettingsService,
        store: Arc<dyn KeyValueStore>,
        client: Arc<dyn MessagesClient>,
    ) -> Self {
        Self {
            clock,
            config,
            settings,
            store,
            client,
        }
    }

    /// Run one prompt and record it in history.
    ///
    /// API failures do not fail the call: the returned session carries the
    /// message in `error` and is saved like any other.
    ///
    /// # Errors
    ///
    /// Returns `PlaygroundError::MissingApiKey` when no Anthropic key is
    /// configured, or a storage/settings error.
    pub async fn create_session(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        parameters: ModelParameters,
    ) -> Result<PlaygroundSession, PlaygroundError> {
        let settings = self.settings.load().await?;
        let api_key = settings
            .api_key(ApiProvider::Anthropic)
            .ok_or(PlaygroundError::MissingApiKey("anthropic"))?
            .to_owned();

        let now = self.clock.now();
        let mut session = PlaygroundSession {
            id: generate_session_id(now),
            prompt: prompt.to_owned(),
            system_prompt: system_prompt.map(str::to_owned),
            model: AiModel {
                provider: ApiProvider::Anthropic,
                name: self.config.model.clone(),
                max_tokens: self.config.model_max_tokens,
            },
            parameters,
            response: None,
            error: None,
            timestamp: now,
            tokens_used: None,
        };

        let request = CompletionRequest {
            base_url: settings
                .api_base_url
                .clone()
                .unwrap_or_else(|| self.config.base_url.clone()),
            model: session.model.name.clone(),
            system: session.system_prompt.clone(),
            prompt: session.prompt.clone(),
            parameters: session.parameters.clone(),
        };

        match self.client.complete(&api_key, &request).await {
            Ok(response) => {
                session.tokens_used = Some(TokenUsage::priced(
                    response.input_tokens,
                    response.output_tokens,
                ));
                session.response = Some(response.text);
                tracing::info!(session = %session.id, "playground session completed");
            }
            Err(err) => {
                tracing::warn!(session = %session.id, error = %err, "playground call failed");
                session.error = Some(err.to_string());
            }
        }

        let mut history = self.history().await?;
        push_session(&mut history, session.clone());
        self.save_history(&history).await?;
        Ok(session)
    }

    /// Stored sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `PlaygroundError::Storage` if the store cannot be read.
    pub async fn history(&self) -> Result<Vec<PlaygroundSession>, PlaygroundError> {
        let history: Option<Vec<PlaygroundSession>> =
            read_json(self.store.as_ref(), PLAYGROUND_HISTORY_KEY).await?;
        Ok(history.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `PlaygroundError::Storage` if the store fails.
    pub async fn clear_history(&self) -> Result<(), PlaygroundError> {
        self.store.remove(PLAYGROUND_HISTORY_KEY).await?;
        Ok(())
    }

    /// History as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `PlaygroundError` if the store fails or encoding fails.
    pub async fn export_sessions(&self) -> Result<String, PlaygroundError> {
        let history = self.history().await?;
        serde_json::to_string_pretty(&history).map_err(PlaygroundError::Export)
    }

    /// Merge an exported history into the local one.
    ///
    /// Imported sessions go first and win on duplicate ids; the result is
    /// capped like any history. Returns the merged history.
    ///
    /// # Errors
    ///
    /// Returns `PlaygroundError::InvalidImport` for malformed input, leaving
    /// the stored history untouched.
    pub async fn import_sessions(&self, json: &str) -> Result<Vec<PlaygroundSession>, PlaygroundError> {
        let imported: Vec<PlaygroundSession> =
            serde_json::from_str(json).map_err(PlaygroundError::InvalidImport)?;
        let count = imported.len();
        let merged = merge_history(imported, self.history().await?);
        self.save_history(&merged).await?;
        tracing::info!(imported = count, total = merged.len(), "imported playground sessions");
        Ok(merged)
    }

    /// # Errors
    ///
    /// Returns `PlaygroundError::Storage` if the store cannot be read.
    pub async fn usage_statistics(&self) -> Result<UsageStatistics, PlaygroundError> {
        let history = self.history().await?;
        Ok(playground::usage_statistics(&history))
    }

    #[must_use]
    pub fn estimate_cost(&self, usage: &TokenUsage) -> f64 {
        playground::estimate_cost(usage)
    }

    /// Whether `api_key` is accepted by the API, checked with one tiny call.
    /// Nothing is recorded.
    pub async fn validate_api_key(&self, api_key: &str) -> bool {
        if api_key.trim().is_empty() {
            return false;
        }
        let request = CompletionRequest {
            base_url: self.config.base_url.clone(),
            model: self.config.model.clone(),
            system: None,
            prompt: "Hi".to_owned(),
            parameters: ModelParameters {
                max_tokens: 10,
                ..ModelParameters::default()
            },
        };
        match self.client.complete(api_key.trim(), &request).await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(error = %err, "api key rejected");
                false
            }
        }
    }

    async fn save_history(&self, history: &[PlaygroundSession]) -> Result<(), PlaygroundError> {
        write_json(self.store.as_ref(), PLAYGROUND_HISTORY_KEY, history).await?;
        Ok(())
    }
}

/// `session_<unix millis>_<9 base36 chars>`.
fn generate_session_id(now: DateTime<Utc>) -> SessionId {
    let mut rng = rand::rng();
    let suffix: String = (0..SESSION_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    SessionId::new(format!("session_{}_{suffix}", now.timestamp_millis()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::time::fixed_now;

    #[test]
    fn session_ids_follow_format() {
        let id = generate_session_id(fixed_now());
        let parts: Vec<_> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), SESSION_SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn session_ids_differ() {
        assert_ne!(generate_session_id(fixed_now()), generate_session_id(fixed_now()));
    }
}
