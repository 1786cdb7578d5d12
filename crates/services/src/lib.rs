#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod playground;
pub mod progress_service;
pub mod settings_service;

pub use academy_core::Clock;

pub use app_services::AppServices;
pub use error::{
    AppServicesError, MessagesError, PlaygroundError, ProgressServiceError, SettingsServiceError,
};
pub use playground::{
    AnthropicClient, CompletionRequest, CompletionResponse, MessagesClient, PlaygroundConfig,
    PlaygroundService,
};
pub use progress_service::ProgressService;
pub use settings_service::SettingsService;
