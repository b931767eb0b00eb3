//! Community report selection, weighting and batching.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use rag_store::{Community, CommunityReport, Entity};

const CONTEXT_HEADER: &str = "-----Reports-----\nid|title|occurrence weight|content|rank\n";

/// A report paired with its normalized occurrence weight.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedReport {
    pub report: CommunityReport,
    pub weight: f64,
}

/// One map-stage context window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBatch {
    pub text: String,
    pub report_ids: Vec<String>,
    pub tokens: usize,
}

/// Rough token count used for budgeting (about four characters per token).
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Keeps the reports of the deepest community each entity belongs to, at or
/// below `community_level`.
#[must_use]
pub fn select_reports(
    reports: &[CommunityReport],
    communities: &[Community],
    community_level: i64,
) -> Vec<CommunityReport> {
    let mut deepest: HashMap<&str, i64> = HashMap::new();
    for community in communities.iter().filter(|c| c.level <= community_level) {
        for entity_id in &community.entity_ids {
            deepest
                .entry(entity_id.as_str())
                .and_modify(|current| *current = (*current).max(community.community))
                .or_insert(community.community);
        }
    }
    let selected: HashSet<i64> = deepest.into_values().collect();

    reports
        .iter()
        .filter(|report| report.level <= community_level && selected.contains(&report.community))
        .cloned()
        .collect()
}

/// Counts the distinct text units behind each community's entities.
#[must_use]
pub fn community_occurrences(
    entities: &[Entity],
    communities: &[Community],
    community_level: i64,
) -> HashMap<i64, usize> {
    let text_units: HashMap<&str, &[String]> = entities
        .iter()
        .map(|entity| (entity.id.as_str(), entity.text_unit_ids.as_slice()))
        .collect();

    let mut units_by_community: HashMap<i64, HashSet<&str>> = HashMap::new();
    for community in communities.iter().filter(|c| c.level <= community_level) {
        let units = units_by_community.entry(community.community).or_default();
        for entity_id in &community.entity_ids {
            if let Some(ids) = text_units.get(entity_id.as_str()) {
                units.extend(ids.iter().map(String::as_str));
            }
        }
    }

    units_by_community
        .into_iter()
        .map(|(community, units)| (community, units.len()))
        .collect()
}

/// Attaches normalized occurrence weights and orders reports by weight, then rank.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rank_reports(
    reports: Vec<CommunityReport>,
    occurrences: &HashMap<i64, usize>,
) -> Vec<RankedReport> {
    let max = reports
        .iter()
        .filter_map(|report| occurrences.get(&report.community))
        .copied()
        .max()
        .unwrap_or(0);

    let mut ranked: Vec<RankedReport> = reports
        .into_iter()
        .map(|report| {
            let count = occurrences.get(&report.community).copied().unwrap_or(0);
            let weight = if max == 0 {
                0.0
            } else {
                count as f64 / max as f64
            };
            RankedReport { report, weight }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.weight.total_cmp(&a.weight).then_with(|| {
            b.report
                .rank
                .unwrap_or(0.0)
                .total_cmp(&a.report.rank.unwrap_or(0.0))
        })
    });
    ranked
}

fn report_row(ranked: &RankedReport) -> String {
    let report = &ranked.report;
    let mut row = String::new();
    let _ = writeln!(
        row,
        "{}|{}|{:.4}|{}|{}",
        report.short_id(),
        report.title,
        ranked.weight,
        report.full_content,
        report.rank.unwrap_or(0.0)
    );
    row
}

/// Splits ranked reports into batches that fit `max_tokens` each.
///
/// A single report larger than the budget still gets a batch of its own.
#[must_use]
pub fn build_batches(ranked: &[RankedReport], max_tokens: usize) -> Vec<ContextBatch> {
    let header_tokens = estimate_tokens(CONTEXT_HEADER);
    let mut batches = Vec::new();
    let mut current = new_batch(header_tokens);

    for entry in ranked {
        let row = report_row(entry);
        let row_tokens = estimate_tokens(&row);
        if !current.report_ids.is_empty() && current.tokens + row_tokens > max_tokens {
            batches.push(std::mem::replace(&mut current, new_batch(header_tokens)));
        }
        current.text.push_str(&row);
        current.tokens += row_tokens;
        current.report_ids.push(entry.report.short_id());
    }

    if !current.report_ids.is_empty() {
        batches.push(current);
    }
    batches
}

fn new_batch(header_tokens: usize) -> ContextBatch {
    ContextBatch {
        text: CONTEXT_HEADER.to_string(),
        report_ids: Vec::new(),
        tokens: header_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn community(community: i64, level: i64, entity_ids: &[&str]) -> Community {
        Community {
            id: format!("c-{community}"),
            human_readable_id: Some(community),
            community,
            level,
            parent: None,
            title: format!("Community {community}"),
            entity_ids: entity_ids.iter().map(ToString::to_string).collect(),
            text_unit_ids: Vec::new(),
            size: None,
        }
    }

    fn report(community: i64, level: i64, rank: f64, content: &str) -> CommunityReport {
        CommunityReport {
            id: format!("r-{community}"),
            human_readable_id: Some(community),
            community,
            level,
            title: format!("Report {community}"),
            summary: None,
            full_content: content.to_string(),
            rank: Some(rank),
            rating_explanation: None,
            size: None,
        }
    }

    fn entity(id: &str, units: &[&str]) -> Entity {
        Entity {
            id: id.to_string(),
            human_readable_id: None,
            title: id.to_uppercase(),
            entity_type: None,
            description: None,
            text_unit_ids: units.iter().map(ToString::to_string).collect(),
            frequency: None,
            degree: None,
        }
    }

    #[test]
    fn selects_deepest_community_per_entity_within_level() {
        let communities = vec![
            community(0, 0, &["a", "b", "c"]),
            community(1, 1, &["a", "b"]),
            community(2, 2, &["a"]),
            community(3, 3, &["b"]),
        ];
        let reports = vec![
            report(0, 0, 1.0, "root"),
            report(1, 1, 1.0, "mid"),
            report(2, 2, 1.0, "leaf"),
            report(3, 3, 1.0, "too deep"),
        ];

        let selected = select_reports(&reports, &communities, 2);
        let ids: Vec<i64> = selected.iter().map(|r| r.community).collect();

        // a -> 2, b -> 1 (3 is above the level), c -> 0
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn weights_normalize_to_heaviest_community() {
        let entities = vec![entity("a", &["t1", "t2"]), entity("b", &["t2", "t3"])];
        let communities = vec![community(0, 0, &["a", "b"]), community(1, 1, &["a"])];
        let occurrences = community_occurrences(&entities, &communities, 1);
        assert_eq!(occurrences.get(&0), Some(&3));
        assert_eq!(occurrences.get(&1), Some(&2));

        let ranked = rank_reports(
            vec![report(1, 1, 9.0, "small"), report(0, 0, 1.0, "big")],
            &occurrences,
        );

        assert_eq!(ranked[0].report.community, 0);
        assert!((ranked[0].weight - 1.0).abs() < f64::EPSILON);
        assert!((ranked[1].weight - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn equal_weights_fall_back_to_rank() {
        let ranked = rank_reports(
            vec![report(0, 0, 2.0, "low"), report(1, 0, 8.0, "high")],
            &HashMap::new(),
        );
        assert_eq!(ranked[0].report.community, 1);
    }

    #[test]
    fn batches_respect_token_budget() {
        let ranked: Vec<RankedReport> = (0..6)
            .map(|i| RankedReport {
                report: report(i, 0, 1.0, &"x".repeat(200)),
                weight: 1.0,
            })
            .collect();

        let batches = build_batches(&ranked, 150);

        assert!(batches.len() > 1);
        assert_eq!(
            batches.iter().map(|b| b.report_ids.len()).sum::<usize>(),
            ranked.len()
        );
        for batch in &batches {
            assert!(batch.text.starts_with(CONTEXT_HEADER));
            assert!(batch.tokens <= 150 || batch.report_ids.len() == 1);
        }
    }

    #[test]
    fn oversized_report_gets_its_own_batch() {
        let ranked = vec![RankedReport {
            report: report(0, 0, 1.0, &"y".repeat(4_000)),
            weight: 1.0,
        }];
        let batches = build_batches(&ranked, 100);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].report_ids, vec!["0".to_string()]);
    }

    #[test]
    fn no_reports_means_no_batches() {
        assert!(build_batches(&[], 1_000).is_empty());
    }
}
