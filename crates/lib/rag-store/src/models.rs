use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Entity extracted by the indexing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub human_readable_id: Option<i64>,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text_unit_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub frequency: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub degree: Option<i64>,
}

/// Graph community produced by hierarchical clustering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Community {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub human_readable_id: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub community: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub level: i64,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub parent: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub entity_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text_unit_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub size: Option<i64>,
}

/// Summarized report for a single community.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommunityReport {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub human_readable_id: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub community: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub level: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub full_content: String,
    #[serde(default)]
    pub rank: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub size: Option<i64>,
}

impl CommunityReport {
    /// Short id used when citing the report in search context.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.human_readable_id
            .map_or_else(|| self.community.to_string(), |id| id.to_string())
    }
}

/// The three index outputs a global search reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifacts {
    pub entities: Vec<Entity>,
    pub communities: Vec<Community>,
    pub community_reports: Vec<CommunityReport>,
}

/// Integer columns written through pandas turn into floats once they hold a
/// null, so integral floats are accepted. Fractional values are not.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite() && float.fract() == 0.0)
                .map(|float| float as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_i64(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected integer, found {value}")))
}

fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    value_as_i64(&value)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("expected integer, found {value}")))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
