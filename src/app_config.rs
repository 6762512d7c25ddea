use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Inference backend connection settings
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Translation policy settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// General behavior settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Inference backend connection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OllamaConfig {
    /// Full URL of the generate endpoint
    #[serde(default = "default_url")]
    pub url: String,

    /// Model name (e.g., "gemma3:latest")
    #[serde(default = "default_model", alias = "model_name")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus-sampling probability mass
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Repeat penalty
    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs", alias = "timeout")]
    pub timeout_secs: u64,

    /// Retry attempts per request (the first attempt counts as attempt 1)
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            repeat_penalty: default_repeat_penalty(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
        }
    }
}

/// Translation policy configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Token budget per translation unit
    #[serde(default = "default_target_tokens_per_slice")]
    pub target_tokens_per_slice: usize,

    /// Target language, free-form (e.g., "simplified Chinese", "French")
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// System prompt template; `{target_language}` is replaced at request time
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Sentinel line inserted between paragraphs joined into one request;
    /// must not collide with model output content
    #[serde(default = "default_para_separator", alias = "para_sep")]
    pub para_separator: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_tokens_per_slice: default_target_tokens_per_slice(),
            target_language: default_target_language(),
            system_prompt: default_system_prompt(),
            para_separator: default_para_separator(),
        }
    }
}

impl TranslationConfig {
    /// The system prompt with the target-language placeholder resolved
    pub fn resolved_system_prompt(&self) -> String {
        self.system_prompt
            .replace("{target_language}", &self.target_language)
    }
}

/// General behavior configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GeneralConfig {
    /// Skip the backend connectivity probe before translating
    #[serde(default)]
    pub skip_connection_test: bool,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_url() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_model() -> String {
    "gemma3:latest".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_top_p() -> f32 {
    0.9
}

fn default_repeat_penalty() -> f32 {
    1.2
}

fn default_timeout_secs() -> u64 {
    240
}

fn default_retries() -> u32 {
    3
}

fn default_target_tokens_per_slice() -> usize {
    1024
}

fn default_target_language() -> String {
    "simplified Chinese".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate the following text into natural, fluent {target_language} if it's not already in {target_language}. DO NOT translate or remove any formating tags, including HTML/markdown/latex tags such as <table>, <figure>, <equation>, <reference>, etc. DO NOT translate people names, acronyms, equations, hyperlinks, or references. Return ONLY the {target_language} translation, do not include any thinking/reasoning, explanation or note.".to_string()
}

fn default_para_separator() -> String {
    "<段落分隔符>".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ollama: OllamaConfig::default(),
            translation: TranslationConfig::default(),
            general: GeneralConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults.
    ///
    /// A missing or unreadable file and a parse failure are warnings, not
    /// errors: the hardcoded defaults are used instead. Missing sections or
    /// fields inside the file fall back per-field.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file not found at {:?}, using default settings", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Config>(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse config file {:?}: {}", path, e);
                    warn!("Using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {:?}: {}", path, e);
                warn!("Using default settings");
                Self::default()
            }
        }
    }

    /// Serialize this configuration to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.ollama.url.is_empty() {
            anyhow::bail!("Backend URL must not be empty");
        }
        if self.ollama.model.is_empty() {
            anyhow::bail!("Model name must not be empty");
        }
        if self.translation.target_tokens_per_slice == 0 {
            anyhow::bail!("target_tokens_per_slice must be greater than zero");
        }
        if self.translation.para_separator.trim().is_empty() {
            anyhow::bail!("para_separator must not be blank");
        }
        if self.ollama.retries == 0 {
            anyhow::bail!("retries must be at least 1");
        }
        Ok(())
    }
}
