//! Configuration module for Stafett.

mod settings;

pub use settings::{
    AudioSettings, CompletionSettings, GeneralSettings, RunnerSettings, ServerSettings, Settings,
};
