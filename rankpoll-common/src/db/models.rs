//! Shared record models for survey responses and drafts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Respondent team size, a fixed three-value enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSize {
    #[serde(rename = "1-2")]
    OneToTwo,
    #[serde(rename = "3-20")]
    ThreeToTwenty,
    #[serde(rename = "20+")]
    TwentyPlus,
}

impl TeamSize {
    pub const ALL: [TeamSize; 3] = [
        TeamSize::OneToTwo,
        TeamSize::ThreeToTwenty,
        TeamSize::TwentyPlus,
    ];

    /// Wire/storage representation ("1-2", "3-20", "20+")
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSize::OneToTwo => "1-2",
            TeamSize::ThreeToTwenty => "3-20",
            TeamSize::TwentyPlus => "20+",
        }
    }

    pub fn parse(s: &str) -> Option<TeamSize> {
        match s {
            "1-2" => Some(TeamSize::OneToTwo),
            "3-20" => Some(TeamSize::ThreeToTwenty),
            "20+" => Some(TeamSize::TwentyPlus),
            _ => None,
        }
    }
}

/// One entry of a ranked list; `rank` is the 1-based position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: String,
    pub label: String,
    pub rank: u32,
}

/// Survey session step
///
/// `selecting → ranking → contact → done`, with `already_submitted` as the
/// duplicate-identity terminal and `failed` re-enterable from `contact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyStep {
    Selecting,
    Ranking,
    Contact,
    Done,
    AlreadySubmitted,
    Failed,
}

impl SurveyStep {
    /// Storage representation, matching the serde snake_case names
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyStep::Selecting => "selecting",
            SurveyStep::Ranking => "ranking",
            SurveyStep::Contact => "contact",
            SurveyStep::Done => "done",
            SurveyStep::AlreadySubmitted => "already_submitted",
            SurveyStep::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<SurveyStep> {
        match s {
            "selecting" => Some(SurveyStep::Selecting),
            "ranking" => Some(SurveyStep::Ranking),
            "contact" => Some(SurveyStep::Contact),
            "done" => Some(SurveyStep::Done),
            "already_submitted" => Some(SurveyStep::AlreadySubmitted),
            "failed" => Some(SurveyStep::Failed),
            _ => None,
        }
    }

    /// A session in a terminal step accepts no further operations
    pub fn is_terminal(&self) -> bool {
        matches!(self, SurveyStep::Done | SurveyStep::AlreadySubmitted)
    }
}

/// Immutable completed submission, one per distinct (lower-cased) email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Stored lower-case; unique across all responses
    pub email: String,
    pub team_size: TeamSize,
    /// The respondent's top-K items, ranks 1..K
    pub rankings: Vec<RankedItem>,
    /// Ordering of the non-selected items, ranks K+1..N (may be empty)
    pub remaining_rankings: Vec<RankedItem>,
    pub submitted_at: DateTime<Utc>,
}

/// Resumable snapshot of an in-progress session, one row per session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub session_id: Uuid,
    pub step: SurveyStep,
    pub selections: Option<Vec<String>>,
    pub rankings: Option<Vec<RankedItem>>,
    pub remaining_rankings: Option<Vec<RankedItem>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub team_size: Option<TeamSize>,
    pub updated_at: DateTime<Utc>,
}
