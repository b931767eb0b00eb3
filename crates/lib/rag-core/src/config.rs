use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const SETTINGS_FILE: &str = "settings.yaml";
pub const ENV_FILE: &str = ".env";
pub const DEFAULT_CHAT_MODEL_ID: &str = "default_chat_model";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_REQUEST_TIMEOUT_SECS: f64 = 180.0;
const DEFAULT_OUTPUT_DIR: &str = "output";

/// Project settings read from `settings.yaml` in the project root.
///
/// Only the sections a global search needs are modelled; every other key a
/// GraphRAG project carries is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub models: HashMap<String, LlmSettings>,
    pub global_search: GlobalSearchSettings,
    pub output: OutputSettings,
}

impl Settings {
    /// The chat model named by `global_search.chat_model_id`.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownModel`] when no such model is configured.
    pub fn chat_model(&self) -> Result<&LlmSettings, ConfigError> {
        let id = &self.global_search.chat_model_id;
        self.models
            .get(id)
            .ok_or_else(|| ConfigError::UnknownModel(id.clone()))
    }
}

/// One entry under `models`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: String,
    pub api_base: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Seconds; GraphRAG writes this as a float.
    pub request_timeout: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_tokens: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Budgets for the map and reduce stages of a global search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GlobalSearchSettings {
    /// Key into [`Settings::models`].
    pub chat_model_id: String,
    /// Token budget for a single batch of community reports sent to the map stage.
    pub max_context_tokens: usize,
    /// Token budget for the analyst points sent to the reduce stage.
    pub data_max_tokens: usize,
    /// Word limit requested from each map response.
    pub map_max_length: usize,
    /// Word limit requested from the final answer.
    pub reduce_max_length: usize,
    /// Upper bound on map calls in flight.
    pub concurrency: usize,
}

impl Default for GlobalSearchSettings {
    fn default() -> Self {
        Self {
            chat_model_id: DEFAULT_CHAT_MODEL_ID.to_string(),
            max_context_tokens: 12_000,
            data_max_tokens: 12_000,
            map_max_length: 1_000,
            reduce_max_length: 2_000,
            concurrency: 8,
        }
    }
}

/// Location of the index outputs relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    pub base_dir: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            base_dir: DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_yaml::Error },
    EnvFile { path: PathBuf, source: dotenvy::Error },
    MissingVariable(String),
    UnknownModel(String),
    MissingSetting(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "settings file not found: {}", path.display()),
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "invalid settings in {}: {source}", path.display())
            }
            Self::EnvFile { path, source } => {
                write!(f, "invalid env file {}: {source}", path.display())
            }
            Self::MissingVariable(name) => {
                write!(f, "settings reference undefined variable: {name}")
            }
            Self::UnknownModel(id) => write!(f, "no model configured under models.{id}"),
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::EnvFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Loads `settings.yaml` from `root`, expanding `${VAR}` references from the
/// process environment and then `root/.env`.
///
/// # Errors
/// Returns an error if the settings file is missing or malformed, if it
/// references an undefined variable, or if the chat model used by global
/// search is missing or has no API key.
pub fn load_settings(root: &Path) -> Result<Settings, ConfigError> {
    let path = root.join(SETTINGS_FILE);
    let raw = std::fs::read_to_string(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path.clone())
        } else {
            ConfigError::Io {
                path: path.clone(),
                source,
            }
        }
    })?;

    let dotenv = read_env_file(&root.join(ENV_FILE))?;
    let expanded = substitute_env(&raw, |name| {
        std::env::var(name)
            .ok()
            .or_else(|| dotenv.get(name).cloned())
    })?;

    let settings: Settings =
        serde_yaml::from_str(&expanded).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
    let model = settings.chat_model()?;
    if model.api_key.trim().is_empty() {
        return Err(ConfigError::MissingSetting(format!(
            "models.{}.api_key",
            settings.global_search.chat_model_id
        )));
    }
    debug!(path = %path.display(), model = %model.model, "loaded settings");
    Ok(settings)
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let env_err = |source: dotenvy::Error| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };
    let iter = dotenvy::from_path_iter(path).map_err(env_err)?;
    iter.map(|item| item.map_err(env_err)).collect()
}

/// Replaces every `${NAME}` in `text` with `lookup(NAME)`.
///
/// # Errors
/// Returns [`ConfigError::MissingVariable`] for the first name `lookup` cannot
/// resolve.
pub fn substitute_env<F>(text: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            output.push_str(&rest[start..]);
            return Ok(output);
        };
        let name = after[..end].trim();
        let value = lookup(name).ok_or_else(|| ConfigError::MissingVariable(name.to_string()))?;
        output.push_str(&value);
        rest = &after[end + 1..];
    }
    output.push_str(rest);
    Ok(output)
}
