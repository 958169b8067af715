//! Synthetic response generation for previewing the results page

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use rankpoll_common::db::models::{FinalResponse, RankedItem, TeamSize};
use uuid::Uuid;

use crate::catalog::SurveyConfig;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda",
    "David", "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica",
    "Thomas", "Sarah", "Christopher", "Karen", "Daniel", "Lisa", "Matthew", "Nancy",
    "Anthony", "Betty", "Mark", "Margaret", "Steven", "Sandra", "Paul", "Ashley",
    "Andrew", "Dorothy", "Joshua", "Kimberly", "Kenneth", "Emily", "Kevin", "Donna",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
    "Rodriguez", "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson",
    "Thomas", "Taylor", "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson",
    "White", "Harris", "Sanchez", "Clark", "Ramirez", "Lewis", "Robinson",
];

/// Generate `count` synthetic final responses over the configured catalog.
///
/// Emails carry a random suffix alongside the batch index so repeated seed
/// runs never collide on the email uniqueness constraint, while remaining
/// recognizably synthetic (@example.com).
pub fn generate(config: &SurveyConfig, count: usize) -> Vec<FinalResponse> {
    let mut rng = rand::thread_rng();
    let k = config.max_selections();

    (0..count)
        .map(|index| {
            let first_name = *FIRST_NAMES.choose(&mut rng).unwrap_or(&"Alex");
            let last_name = *LAST_NAMES.choose(&mut rng).unwrap_or(&"Doe");
            let email = format!(
                "{}.{}.{}.{:04x}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                index,
                rng.gen::<u16>()
            );
            let team_size = *TeamSize::ALL.choose(&mut rng).unwrap_or(&TeamSize::OneToTwo);

            let mut shuffled: Vec<_> = config.items().to_vec();
            shuffled.shuffle(&mut rng);

            let rankings = shuffled[..k]
                .iter()
                .enumerate()
                .map(|(i, item)| RankedItem {
                    id: item.id.clone(),
                    label: item.label.clone(),
                    rank: i as u32 + 1,
                })
                .collect();
            let remaining_rankings = shuffled[k..]
                .iter()
                .enumerate()
                .map(|(i, item)| RankedItem {
                    id: item.id.clone(),
                    label: item.label.clone(),
                    rank: (k + i) as u32 + 1,
                })
                .collect();

            FinalResponse {
                id: Uuid::new_v4(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email,
                team_size,
                rankings,
                remaining_rankings,
                submitted_at: Utc::now(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generates_valid_rankings() {
        let config = SurveyConfig::compiled_default();
        let responses = generate(&config, 10);
        assert_eq!(responses.len(), 10);

        let k = config.max_selections();
        let n = config.items().len();
        for response in &responses {
            let primary_ranks: HashSet<u32> =
                response.rankings.iter().map(|r| r.rank).collect();
            assert_eq!(primary_ranks, (1..=k as u32).collect());

            let remaining_ranks: HashSet<u32> =
                response.remaining_rankings.iter().map(|r| r.rank).collect();
            assert_eq!(remaining_ranks, (k as u32 + 1..=n as u32).collect());

            // Primary and remaining are disjoint and cover the catalog
            let all_ids: HashSet<&str> = response
                .rankings
                .iter()
                .chain(&response.remaining_rankings)
                .map(|r| r.id.as_str())
                .collect();
            assert_eq!(all_ids.len(), n);

            assert!(response.email.ends_with("@example.com"));
            assert_eq!(response.email, response.email.to_lowercase());
        }
    }

    #[test]
    fn emails_are_unique_within_a_batch() {
        let config = SurveyConfig::compiled_default();
        let responses = generate(&config, 25);
        let emails: HashSet<&str> = responses.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails.len(), responses.len());
    }
}
