//! Model playground: one-shot prompts against a messages API with a
//! bounded, importable local history.

mod client;
mod service;

pub use client::{
    AnthropicClient, CompletionRequest, CompletionResponse, MessagesClient, PlaygroundConfig,
};
pub use service::PlaygroundService;
