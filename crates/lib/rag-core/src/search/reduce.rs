use std::fmt::Write as _;

use crate::llm::{ChatModel, ChatRequest, LlmError};
use crate::search::context::estimate_tokens;
use crate::search::map::MapResponse;
use crate::search::prompts::{REDUCE_SYSTEM_PROMPT, render};

/// Formats scored points as ranked analyst reports within `max_tokens`.
///
/// Returns `None` when no map response produced a point with a positive score.
#[must_use]
pub fn build_report_data(responses: &[MapResponse], max_tokens: usize) -> Option<String> {
    let mut scored: Vec<(usize, &str, f64)> = responses
        .iter()
        .enumerate()
        .flat_map(|(index, response)| {
            response
                .points
                .iter()
                .map(move |point| (index, point.description.as_str(), point.score))
        })
        .filter(|(_, _, score)| *score > 0.0)
        .collect();
    if scored.is_empty() {
        return None;
    }
    scored.sort_by(|a, b| b.2.total_cmp(&a.2));

    let mut data = String::new();
    let mut tokens = 0;
    for (index, description, score) in scored {
        let mut section = String::new();
        let _ = write!(
            section,
            "----Analyst {}----\nImportance Score: {score}\n{description}\n\n",
            index + 1
        );
        let section_tokens = estimate_tokens(&section);
        if !data.is_empty() && tokens + section_tokens > max_tokens {
            break;
        }
        data.push_str(&section);
        tokens += section_tokens;
    }
    Some(data)
}

pub(crate) async fn reduce<M: ChatModel>(
    model: &M,
    report_data: &str,
    query: &str,
    response_type: &str,
    max_length: usize,
) -> Result<String, LlmError> {
    let max_length = max_length.to_string();
    let system = render(
        REDUCE_SYSTEM_PROMPT,
        &[
            ("max_length", &max_length),
            ("response_type", response_type),
            ("report_data", report_data),
        ],
    );
    let answer = model.complete(ChatRequest::new(system, query)).await?;
    Ok(answer.trim().to_string())
}
