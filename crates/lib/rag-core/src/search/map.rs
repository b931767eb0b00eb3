use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::llm::{ChatModel, ChatRequest, LlmError, ResponseFormat};
use crate::search::context::ContextBatch;
use crate::search::prompts::{MAP_SYSTEM_PROMPT, render};

/// One scored point returned by a map call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyPoint {
    pub description: String,
    pub score: f64,
}

/// Map-stage output for a single context batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapResponse {
    pub report_ids: Vec<String>,
    pub points: Vec<KeyPoint>,
    pub raw: String,
}

pub(crate) async fn map_batch<M: ChatModel>(
    model: &M,
    batch: &ContextBatch,
    query: &str,
    max_length: usize,
) -> Result<MapResponse, LlmError> {
    let max_length = max_length.to_string();
    let system = render(
        MAP_SYSTEM_PROMPT,
        &[("max_length", &max_length), ("context_data", &batch.text)],
    );
    let request = ChatRequest::new(system, query).with_response_format(ResponseFormat::JsonObject);
    let raw = model.complete(request).await?;
    let points = parse_points(&raw);
    if points.is_empty() {
        warn!(reports = batch.report_ids.len(), "map response contained no usable points");
    }
    Ok(MapResponse {
        report_ids: batch.report_ids.clone(),
        points,
        raw,
    })
}

/// Extracts `{"points": [{"description", "score"}]}` from a model response.
///
/// Tolerates prose or code fences around the JSON object. Entries without a
/// description or a numeric score are dropped.
#[must_use]
pub fn parse_points(text: &str) -> Vec<KeyPoint> {
    let Some(value) = parse_json_object(text) else {
        return Vec::new();
    };
    value
        .get("points")
        .and_then(Value::as_array)
        .map(|points| points.iter().filter_map(parse_point).collect())
        .unwrap_or_default()
}

fn parse_json_object(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        return Some(value);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn parse_point(point: &Value) -> Option<KeyPoint> {
    let description = point.get("description")?.as_str()?.trim();
    if description.is_empty() {
        return None;
    }
    let score = match point.get("score")? {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse().ok()?,
        _ => return None,
    };
    Some(KeyPoint {
        description: description.to_string(),
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let points = parse_points(
            r#"{"points": [{"description": "Trees split on features [Data: Reports (1)]", "score": 80}]}"#,
        );
        assert_eq!(points.len(), 1);
        assert!((points[0].score - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_fenced_json_and_string_scores() {
        let text = "Here you go:\n```json\n{\"points\": [{\"description\": \"a\", \"score\": \"40\"}, {\"description\": \"\", \"score\": 10}]}\n```";
        let points = parse_points(text);
        assert_eq!(
            points,
            vec![KeyPoint {
                description: "a".to_string(),
                score: 40.0
            }]
        );
    }

    #[test]
    fn garbage_yields_no_points() {
        assert!(parse_points("I don't know").is_empty());
        assert!(parse_points("{\"answer\": 1}").is_empty());
        assert!(parse_points("} nope {").is_empty());
    }
}
