use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub assistant: AssistantConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for the document store's Data API endpoint.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub data_source: String,
    pub database: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub chat_temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub dataset_path: String,
}

/// Tunables for the message-handling pipeline.
///
/// `max_result_rows` caps the rows returned to the HTTP caller from a
/// data query; `summary_snippet_chars` caps the textual rendering of
/// query results fed into the summary prompt; `enforce_validation`
/// gates pipeline execution on the operator allow-list.
#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub max_result_rows: usize,
    pub summary_snippet_chars: usize,
    pub enforce_validation: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    OpenAi,
    Ollama,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub store_base_url: Option<String>,
    pub store_api_key: Option<String>,
    pub store_database: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub dataset_path: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                base_url: "http://localhost:27080/api/v1".to_string(),
                api_key: None,
                data_source: "procurechat".to_string(),
                database: "procurement".to_string(),
                timeout_secs: 30,
            },
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                api_key: None,
                base_url: Some("http://localhost:11434/v1".to_string()),
                model: "llama3.1".to_string(),
                chat_temperature: 0.7,
                timeout_secs: 60,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                dataset_path: "dataset/purchase.csv".to_string(),
            },
            assistant: AssistantConfig {
                max_result_rows: 50,
                summary_snippet_chars: 1500,
                enforce_validation: true,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("procurechat.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(base_url) = store.base_url {
                self.store.base_url = base_url;
            }
            if let Some(store_api_key_value) = store.api_key {
                self.store.api_key = Some(secret_value(store_api_key_value));
            }
            if let Some(data_source) = store.data_source {
                self.store.data_source = data_source;
            }
            if let Some(database) = store.database {
                self.store.database = database;
            }
            if let Some(timeout_secs) = store.timeout_secs {
                self.store.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(chat_temperature) = llm.chat_temperature {
                self.llm.chat_temperature = chat_temperature;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(dataset_path) = server.dataset_path {
                self.server.dataset_path = dataset_path;
            }
        }

        if let Some(assistant) = patch.assistant {
            if let Some(max_result_rows) = assistant.max_result_rows {
                self.assistant.max_result_rows = max_result_rows;
            }
            if let Some(summary_snippet_chars) = assistant.summary_snippet_chars {
                self.assistant.summary_snippet_chars = summary_snippet_chars;
            }
            if let Some(enforce_validation) = assistant.enforce_validation {
                self.assistant.enforce_validation = enforce_validation;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PROCURECHAT_STORE_BASE_URL") {
            self.store.base_url = value;
        }
        if let Some(value) = read_env("PROCURECHAT_STORE_API_KEY") {
            self.store.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("PROCURECHAT_STORE_DATA_SOURCE") {
            self.store.data_source = value;
        }
        if let Some(value) = read_env("PROCURECHAT_STORE_DATABASE") {
            self.store.database = value;
        }
        if let Some(value) = read_env("PROCURECHAT_STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = parse_u64("PROCURECHAT_STORE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PROCURECHAT_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("PROCURECHAT_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("PROCURECHAT_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("PROCURECHAT_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("PROCURECHAT_LLM_CHAT_TEMPERATURE") {
            self.llm.chat_temperature = parse_f32("PROCURECHAT_LLM_CHAT_TEMPERATURE", &value)?;
        }
        if let Some(value) = read_env("PROCURECHAT_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("PROCURECHAT_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PROCURECHAT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("PROCURECHAT_SERVER_PORT") {
            self.server.port = parse_u16("PROCURECHAT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("PROCURECHAT_SERVER_DATASET_PATH") {
            self.server.dataset_path = value;
        }

        if let Some(value) = read_env("PROCURECHAT_ASSISTANT_MAX_RESULT_ROWS") {
            self.assistant.max_result_rows =
                parse_u64("PROCURECHAT_ASSISTANT_MAX_RESULT_ROWS", &value)? as usize;
        }
        if let Some(value) = read_env("PROCURECHAT_ASSISTANT_SUMMARY_SNIPPET_CHARS") {
            self.assistant.summary_snippet_chars =
                parse_u64("PROCURECHAT_ASSISTANT_SUMMARY_SNIPPET_CHARS", &value)? as usize;
        }
        if let Some(value) = read_env("PROCURECHAT_ASSISTANT_ENFORCE_VALIDATION") {
            self.assistant.enforce_validation =
                parse_bool("PROCURECHAT_ASSISTANT_ENFORCE_VALIDATION", &value)?;
        }

        let log_level =
            read_env("PROCURECHAT_LOGGING_LEVEL").or_else(|| read_env("PROCURECHAT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PROCURECHAT_LOGGING_FORMAT").or_else(|| read_env("PROCURECHAT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(store_base_url) = overrides.store_base_url {
            self.store.base_url = store_base_url;
        }
        if let Some(store_api_key) = overrides.store_api_key {
            self.store.api_key = Some(secret_value(store_api_key));
        }
        if let Some(store_database) = overrides.store_database {
            self.store.database = store_database;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(dataset_path) = overrides.dataset_path {
            self.server.dataset_path = dataset_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        validate_llm(&self.llm)?;
        validate_server(&self.server)?;
        validate_assistant(&self.assistant)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("procurechat.toml"), PathBuf::from("config/procurechat.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    let base_url = store.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::Validation(
            "store.base_url must be an http(s) URL pointing at the Data API".to_string(),
        ));
    }
    if store.data_source.trim().is_empty() {
        return Err(ConfigError::Validation("store.data_source must not be empty".to_string()));
    }
    if store.database.trim().is_empty() {
        return Err(ConfigError::Validation("store.database must not be empty".to_string()));
    }
    if store.timeout_secs == 0 || store.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "store.timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }
    if !(0.0..=2.0).contains(&llm.chat_temperature) {
        return Err(ConfigError::Validation(
            "llm.chat_temperature must be in range 0.0..=2.0".to_string(),
        ));
    }

    match llm.provider {
        LlmProvider::OpenAi => {
            let has_key = llm
                .api_key
                .as_ref()
                .map(|key| !key.expose_secret().trim().is_empty())
                .unwrap_or(false);
            if !has_key {
                return Err(ConfigError::Validation(
                    "llm.api_key is required when llm.provider is `openai`".to_string(),
                ));
            }
        }
        LlmProvider::Ollama => {
            let has_base = llm
                .base_url
                .as_ref()
                .map(|url| !url.trim().is_empty())
                .unwrap_or(false);
            if !has_base {
                return Err(ConfigError::Validation(
                    "llm.base_url is required when llm.provider is `ollama`".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be non-zero".to_string()));
    }
    Ok(())
}

fn validate_assistant(assistant: &AssistantConfig) -> Result<(), ConfigError> {
    if assistant.max_result_rows == 0 || assistant.max_result_rows > 1000 {
        return Err(ConfigError::Validation(
            "assistant.max_result_rows must be in range 1..=1000".to_string(),
        ));
    }
    if assistant.summary_snippet_chars < 100 || assistant.summary_snippet_chars > 20_000 {
        return Err(ConfigError::Validation(
            "assistant.summary_snippet_chars must be in range 100..=20000".to_string(),
        ));
    }
    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value
        .parse::<f32>()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    llm: Option<LlmPatch>,
    server: Option<ServerPatch>,
    assistant: Option<AssistantPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    base_url: Option<String>,
    api_key: Option<String>,
    data_source: Option<String>,
    database: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    chat_temperature: Option<f32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    dataset_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssistantPatch {
    max_result_rows: Option<usize>,
    summary_snippet_chars: Option<usize>,
    enforce_validation: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
