//! CLI command implementations.

mod chat;
mod config;
mod run;
mod serve;

pub use chat::run_chat;
pub use config::run_config;
pub use run::run_once;
pub use serve::run_serve;

use crate::completion::OpenAIBackend;
use crate::config::Settings;
use crate::error::{Result, StafettError};
use std::sync::Arc;
use std::time::Duration;

/// Resolve the API key from the configured environment variable.
pub(crate) fn api_key(settings: &Settings) -> Result<String> {
    std::env::var(&settings.completion.api_key_env).map_err(|_| {
        StafettError::Config(format!(
            "API key not found; export {} or change completion.api_key_env",
            settings.completion.api_key_env
        ))
    })
}

/// Build the completion backend from settings.
pub(crate) fn build_backend(settings: &Settings) -> Result<Arc<OpenAIBackend>> {
    let key = api_key(settings)?;
    let backend = OpenAIBackend::with_timeout(
        &settings.completion.base_url,
        &key,
        Duration::from_secs(settings.completion.request_timeout_secs),
    )?;
    Ok(Arc::new(backend))
}
