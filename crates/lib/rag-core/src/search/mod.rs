//! Map/reduce global search over community reports.
//!
//! Reports are selected for a fixed community level, weighted by how many
//! source text units back each community, packed into context batches and
//! summarized in two stages: every batch is mapped to scored key points, then
//! the best points are reduced into a single answer.

pub mod context;
pub mod map;
pub mod prompts;
pub mod reduce;

use std::error::Error;
use std::fmt;

use futures::stream::{self, StreamExt, TryStreamExt};
use rag_store::{Artifacts, CommunityReport};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GlobalSearchSettings;
use crate::llm::{ChatModel, LlmError};

pub use context::{ContextBatch, RankedReport};
pub use map::{KeyPoint, MapResponse};

pub const DEFAULT_COMMUNITY_LEVEL: i64 = 2;
pub const DEFAULT_RESPONSE_TYPE: &str = "Multiple Paragraphs";

/// Per-query knobs for [`global_search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSearchOptions {
    pub community_level: i64,
    pub dynamic_community_selection: bool,
    pub response_type: String,
}

impl Default for GlobalSearchOptions {
    fn default() -> Self {
        Self {
            community_level: DEFAULT_COMMUNITY_LEVEL,
            dynamic_community_selection: false,
            response_type: DEFAULT_RESPONSE_TYPE.to_string(),
        }
    }
}

impl GlobalSearchOptions {
    #[must_use]
    pub const fn with_community_level(mut self, community_level: i64) -> Self {
        self.community_level = community_level;
        self
    }

    #[must_use]
    pub fn with_response_type(mut self, response_type: impl Into<String>) -> Self {
        self.response_type = response_type.into();
        self
    }
}

/// Supporting data behind a search answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchContext {
    pub reports: Vec<CommunityReport>,
    pub map_responses: Vec<MapResponse>,
}

/// Answer text plus the context it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub response: String,
    pub context: SearchContext,
    pub llm_calls: usize,
}

#[derive(Debug)]
pub enum SearchError {
    Llm(LlmError),
    Unsupported(&'static str),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Llm(err) => write!(f, "{err}"),
            Self::Unsupported(feature) => write!(f, "unsupported search option: {feature}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Llm(err) => Some(err),
            Self::Unsupported(_) => None,
        }
    }
}

impl From<LlmError> for SearchError {
    fn from(err: LlmError) -> Self {
        Self::Llm(err)
    }
}

/// Answers `query` from the community reports in `artifacts`.
///
/// # Errors
/// Returns an error if dynamic community selection is requested or a chat
/// call fails. Map responses that are not valid JSON are treated as empty.
pub async fn global_search<M: ChatModel>(
    model: &M,
    settings: &GlobalSearchSettings,
    artifacts: &Artifacts,
    options: &GlobalSearchOptions,
    query: &str,
) -> Result<SearchResult, SearchError> {
    if options.dynamic_community_selection {
        return Err(SearchError::Unsupported("dynamic community selection"));
    }

    let selected = context::select_reports(
        &artifacts.community_reports,
        &artifacts.communities,
        options.community_level,
    );
    let occurrences = context::community_occurrences(
        &artifacts.entities,
        &artifacts.communities,
        options.community_level,
    );
    let ranked = context::rank_reports(selected, &occurrences);
    let batches = context::build_batches(&ranked, settings.max_context_tokens);
    info!(
        reports = ranked.len(),
        batches = batches.len(),
        level = options.community_level,
        "running global search"
    );

    let map_calls: Vec<_> = batches
        .iter()
        .map(|batch| map::map_batch(model, batch, query, settings.map_max_length))
        .collect();
    let map_responses: Vec<MapResponse> = stream::iter(map_calls)
        .buffered(settings.concurrency.max(1))
        .try_collect()
        .await?;
    let mut llm_calls = map_responses.len();

    let reports = ranked.into_iter().map(|entry| entry.report).collect();
    let response = match reduce::build_report_data(&map_responses, settings.data_max_tokens) {
        Some(report_data) => {
            llm_calls += 1;
            reduce::reduce(
                model,
                &report_data,
                query,
                &options.response_type,
                settings.reduce_max_length,
            )
            .await?
        }
        None => {
            debug!("no scored points from map stage");
            prompts::NO_DATA_ANSWER.to_string()
        }
    };

    Ok(SearchResult {
        response,
        context: SearchContext {
            reports,
            map_responses,
        },
        llm_calls,
    })
}
