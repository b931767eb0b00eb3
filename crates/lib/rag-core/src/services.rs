use std::error::Error;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use rag_store::{Artifacts, StoreError, load_artifacts};
use tracing::info;

use crate::config::{ConfigError, Settings, load_settings};
use crate::llm::{ChatClient, LlmError};
use crate::search::{GlobalSearchOptions, SearchError, SearchResult, global_search};

/// Answers free-text questions.
pub trait QueryEngine: Send + Sync + 'static {
    fn answer(&self, query: &str) -> impl Future<Output = Result<String, ServiceError>> + Send;
}

#[derive(Debug)]
pub enum ServiceError {
    Config(ConfigError),
    Store(StoreError),
    Llm(LlmError),
    Search(SearchError),
    Join(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Llm(err) => write!(f, "{err}"),
            Self::Search(err) => write!(f, "{err}"),
            Self::Join(message) => write!(f, "artifact loading task failed: {message}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Llm(err) => Some(err),
            Self::Search(err) => Some(err),
            Self::Join(_) => None,
        }
    }
}

impl From<ConfigError> for ServiceError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<LlmError> for ServiceError {
    fn from(err: LlmError) -> Self {
        Self::Llm(err)
    }
}

impl From<SearchError> for ServiceError {
    fn from(err: SearchError) -> Self {
        Self::Search(err)
    }
}

/// Global search over a GraphRAG project directory.
///
/// Settings and artifacts are read again on every query, so concurrent calls
/// share no state and always see the latest index output.
#[derive(Debug, Clone)]
pub struct RagService {
    project_dir: PathBuf,
    options: GlobalSearchOptions,
}

impl RagService {
    #[must_use]
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            options: GlobalSearchOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: GlobalSearchOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    #[must_use]
    pub const fn options(&self) -> &GlobalSearchOptions {
        &self.options
    }

    /// Loads settings and artifacts from the project directory.
    ///
    /// # Errors
    /// Returns an error if the settings or any artifact table cannot be read.
    pub async fn load(&self) -> Result<(Settings, Artifacts), ServiceError> {
        let root = self.project_dir.clone();
        tokio::task::spawn_blocking(move || -> Result<(Settings, Artifacts), ServiceError> {
            let settings = load_settings(&root)?;
            let artifacts = load_artifacts(&root, &settings.output.base_dir)?;
            Ok((settings, artifacts))
        })
        .await
        .map_err(|err| ServiceError::Join(err.to_string()))?
    }

    /// Runs a global search and returns the answer with its context.
    ///
    /// # Errors
    /// Returns an error if loading fails or the search routine fails.
    pub async fn search(&self, query: &str) -> Result<SearchResult, ServiceError> {
        let (settings, artifacts) = self.load().await?;
        let model = ChatClient::from_settings(settings.chat_model()?)?;
        let result = global_search(
            &model,
            &settings.global_search,
            &artifacts,
            &self.options,
            query,
        )
        .await?;
        info!(
            reports = result.context.reports.len(),
            llm_calls = result.llm_calls,
            "global search finished"
        );
        Ok(result)
    }
}

impl QueryEngine for RagService {
    async fn answer(&self, query: &str) -> Result<String, ServiceError> {
        Ok(self.search(query).await?.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SETTINGS_FILE;

    #[tokio::test]
    async fn missing_settings_surface_as_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = RagService::new(dir.path());

        let err = service.answer("q").await.expect_err("no settings");

        assert!(matches!(err, ServiceError::Config(ConfigError::NotFound(_))));
    }

    #[tokio::test]
    async fn answers_run_on_spawned_tasks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let service = RagService::new(dir.path());

        let handle = tokio::spawn(async move { service.answer("q").await });
        let err = handle
            .await
            .expect("task completes")
            .expect_err("no settings");

        let cause = err.source().and_then(|source| source.downcast_ref::<ConfigError>());
        assert!(matches!(cause, Some(ConfigError::NotFound(_))));
    }

    #[tokio::test]
    async fn missing_artifacts_surface_as_store_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "models:\n  default_chat_model:\n    api_key: sk-test\n",
        )
        .expect("write settings");
        let service = RagService::new(dir.path());

        let err = service.answer("q").await.expect_err("no artifacts");

        match err {
            ServiceError::Store(store) => assert!(store.is_not_found()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn defaults_match_fixed_query_parameters() {
        let service = RagService::new("/tmp/project");
        assert_eq!(service.options().community_level, 2);
        assert!(!service.options().dynamic_community_selection);
        assert_eq!(service.options().response_type, "Multiple Paragraphs");
    }
}
