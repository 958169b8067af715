//! Aggregation engine
//!
//! Pure, side-effect-free computation over a bulk read of final
//! responses. Scoring rewards both frequency and placement: an item at
//! rank r contributes K + 1 - r points, so rank 1 earns K points and
//! rank K earns 1. Items never present in any primary ranking are
//! omitted entirely.

use rankpoll_common::db::models::{FinalResponse, TeamSize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordering of the item summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryOrder {
    /// Descending score, then descending selection count, then item id
    #[default]
    Score,
    /// Ascending average rank, then descending selection count, then item id
    AverageRank,
}

/// Aggregated statistics for one catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    pub label: String,
    /// How many responses include this item in their primary ranking
    pub selection_count: u64,
    /// Sum of this item's primary rank across those responses
    pub total_rank_sum: u64,
    /// Derived: total_rank_sum / selection_count
    pub average_rank: f64,
    pub score: u64,
}

/// Count of responses per team size over the filtered set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSizeHistogram {
    #[serde(rename = "1-2")]
    pub one_to_two: u64,
    #[serde(rename = "3-20")]
    pub three_to_twenty: u64,
    #[serde(rename = "20+")]
    pub twenty_plus: u64,
}

impl TeamSizeHistogram {
    fn bump(&mut self, team_size: TeamSize) {
        match team_size {
            TeamSize::OneToTwo => self.one_to_two += 1,
            TeamSize::ThreeToTwenty => self.three_to_twenty += 1,
            TeamSize::TwentyPlus => self.twenty_plus += 1,
        }
    }
}

/// The full summary handed to the results surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySummary {
    /// Responses in the store, before any filter
    pub total_count: u64,
    /// Responses after the team-size filter
    pub filtered_count: u64,
    pub team_size_histogram: TeamSizeHistogram,
    pub items: Vec<ItemSummary>,
}

/// Aggregate final responses into ordered item summaries.
///
/// The team-size filter is a pure pre-step: filtering then aggregating
/// equals aggregating and restricting afterwards. An empty input yields
/// zeroed counts and no items.
pub fn summarize(
    max_selections: usize,
    responses: &[FinalResponse],
    filter: Option<TeamSize>,
    order: SummaryOrder,
) -> SurveySummary {
    let total_count = responses.len() as u64;

    let filtered: Vec<&FinalResponse> = responses
        .iter()
        .filter(|r| filter.map_or(true, |ts| r.team_size == ts))
        .collect();

    let mut histogram = TeamSizeHistogram::default();
    for response in &filtered {
        histogram.bump(response.team_size);
    }

    struct Accum {
        label: String,
        selection_count: u64,
        total_rank_sum: u64,
        score: u64,
    }

    let points = max_selections as u64 + 1;
    let mut stats: HashMap<String, Accum> = HashMap::new();
    for response in &filtered {
        for ranked in &response.rankings {
            let entry = stats.entry(ranked.id.clone()).or_insert_with(|| Accum {
                label: ranked.label.clone(),
                selection_count: 0,
                total_rank_sum: 0,
                score: 0,
            });
            entry.selection_count += 1;
            entry.total_rank_sum += ranked.rank as u64;
            entry.score += points.saturating_sub(ranked.rank as u64);
        }
    }

    let mut items: Vec<ItemSummary> = stats
        .into_iter()
        .map(|(id, accum)| ItemSummary {
            id,
            label: accum.label,
            selection_count: accum.selection_count,
            total_rank_sum: accum.total_rank_sum,
            average_rank: accum.total_rank_sum as f64 / accum.selection_count as f64,
            score: accum.score,
        })
        .collect();

    sort_items(&mut items, order);

    SurveySummary {
        total_count,
        filtered_count: filtered.len() as u64,
        team_size_histogram: histogram,
        items,
    }
}

/// Re-sort an existing summary without re-scanning responses
pub fn sort_items(items: &mut [ItemSummary], order: SummaryOrder) {
    match order {
        SummaryOrder::Score => items.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.selection_count.cmp(&a.selection_count))
                .then_with(|| a.id.cmp(&b.id))
        }),
        SummaryOrder::AverageRank => items.sort_by(|a, b| {
            a.average_rank
                .total_cmp(&b.average_rank)
                .then(b.selection_count.cmp(&a.selection_count))
                .then_with(|| a.id.cmp(&b.id))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rankpoll_common::db::models::RankedItem;
    use uuid::Uuid;

    fn response(email: &str, team_size: TeamSize, primary: &[(&str, u32)]) -> FinalResponse {
        FinalResponse {
            id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            team_size,
            rankings: primary
                .iter()
                .map(|(id, rank)| RankedItem {
                    id: id.to_string(),
                    label: id.to_uppercase(),
                    rank: *rank,
                })
                .collect(),
            remaining_rankings: vec![],
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn score_round_trip() {
        // K=5: item A at rank 1 in R1 and rank 5 in R2
        let responses = vec![
            response(
                "r1@x.com",
                TeamSize::OneToTwo,
                &[("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)],
            ),
            response(
                "r2@x.com",
                TeamSize::OneToTwo,
                &[("f", 1), ("g", 2), ("h", 3), ("i", 4), ("a", 5)],
            ),
        ];

        let summary = summarize(5, &responses, None, SummaryOrder::Score);
        let a = summary.items.iter().find(|i| i.id == "a").unwrap();
        assert_eq!(a.score, 6); // (5+1-1) + (5+1-5)
        assert_eq!(a.selection_count, 2);
        assert_eq!(a.total_rank_sum, 6);
        assert!((a.average_rank - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn end_to_end_example_with_small_catalog() {
        // Catalog {X,Y,Z}, K=2; one respondent ranks X:1 Y:2, remaining Z:3
        let responses = vec![response("r@x.com", TeamSize::ThreeToTwenty, &[("x", 1), ("y", 2)])];

        let summary = summarize(2, &responses, None, SummaryOrder::Score);
        assert_eq!(summary.total_count, 1);
        assert_eq!(summary.filtered_count, 1);

        let ids: Vec<&str> = summary.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["x", "y"]); // ordered by score; z never selected

        assert_eq!(summary.items[0].score, 2);
        assert_eq!(summary.items[0].selection_count, 1);
        assert_eq!(summary.items[1].score, 1);
    }

    #[test]
    fn never_selected_items_are_omitted() {
        let responses = vec![response("r@x.com", TeamSize::OneToTwo, &[("a", 1), ("b", 2)])];
        let summary = summarize(2, &responses, None, SummaryOrder::Score);
        assert!(summary.items.iter().all(|i| i.id != "z"));
        assert_eq!(summary.items.len(), 2);
    }

    #[test]
    fn filter_and_aggregate_commute() {
        let responses = vec![
            response("r1@x.com", TeamSize::OneToTwo, &[("a", 1), ("b", 2)]),
            response("r2@x.com", TeamSize::TwentyPlus, &[("b", 1), ("c", 2)]),
            response("r3@x.com", TeamSize::OneToTwo, &[("a", 1), ("c", 2)]),
        ];

        let filtered_first = summarize(2, &responses, Some(TeamSize::OneToTwo), SummaryOrder::Score);

        let restricted: Vec<FinalResponse> = responses
            .iter()
            .filter(|r| r.team_size == TeamSize::OneToTwo)
            .cloned()
            .collect();
        let aggregated_after = summarize(2, &restricted, None, SummaryOrder::Score);

        assert_eq!(filtered_first.filtered_count, aggregated_after.filtered_count);
        assert_eq!(filtered_first.items.len(), aggregated_after.items.len());
        for (a, b) in filtered_first.items.iter().zip(&aggregated_after.items) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.score, b.score);
            assert_eq!(a.selection_count, b.selection_count);
            assert_eq!(a.total_rank_sum, b.total_rank_sum);
        }

        // The unfiltered total is still visible alongside the filtered count
        assert_eq!(filtered_first.total_count, 3);
        assert_eq!(filtered_first.filtered_count, 2);
    }

    #[test]
    fn histogram_covers_all_team_sizes() {
        let responses = vec![
            response("r1@x.com", TeamSize::OneToTwo, &[("a", 1)]),
            response("r2@x.com", TeamSize::OneToTwo, &[("a", 1)]),
            response("r3@x.com", TeamSize::TwentyPlus, &[("a", 1)]),
        ];

        let summary = summarize(1, &responses, None, SummaryOrder::Score);
        assert_eq!(summary.team_size_histogram.one_to_two, 2);
        assert_eq!(summary.team_size_histogram.three_to_twenty, 0);
        assert_eq!(summary.team_size_histogram.twenty_plus, 1);
    }

    #[test]
    fn ties_break_by_selection_count_then_id() {
        // a, b, d tie on score; b is selected more often, so it sorts
        // first, and the a/d tie falls through to ascending id.
        let responses = vec![
            response("r1@x.com", TeamSize::OneToTwo, &[("a", 1), ("c", 2)]),
            response("r2@x.com", TeamSize::OneToTwo, &[("b", 2), ("d", 1)]),
            response("r3@x.com", TeamSize::OneToTwo, &[("b", 2), ("c", 1)]),
        ];
        // Scores (K=2): a=2, b=1+1=2, c=1+2=3, d=2
        let summary = summarize(2, &responses, None, SummaryOrder::Score);
        let ids: Vec<&str> = summary.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a", "d"]);
    }

    #[test]
    fn average_rank_order_is_a_pure_resort() {
        let responses = vec![
            response("r1@x.com", TeamSize::OneToTwo, &[("a", 1), ("b", 2), ("c", 3)]),
            response("r2@x.com", TeamSize::OneToTwo, &[("b", 1), ("c", 2), ("a", 3)]),
        ];

        let by_score = summarize(3, &responses, None, SummaryOrder::Score);
        let by_avg = summarize(3, &responses, None, SummaryOrder::AverageRank);

        // Same summary set, different order
        let mut score_sorted = by_score.items.clone();
        sort_items(&mut score_sorted, SummaryOrder::AverageRank);
        let resorted: Vec<&str> = score_sorted.iter().map(|i| i.id.as_str()).collect();
        let direct: Vec<&str> = by_avg.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(resorted, direct);

        // b: avg 1.5 beats a: avg 2.0 and c: avg 2.5
        assert_eq!(direct[0], "b");
    }

    #[test]
    fn empty_input_yields_zeroed_summary() {
        let summary = summarize(5, &[], None, SummaryOrder::Score);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.filtered_count, 0);
        assert!(summary.items.is_empty());
        assert_eq!(summary.team_size_histogram, TeamSizeHistogram::default());
    }
}
