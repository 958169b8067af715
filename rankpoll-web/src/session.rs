//! Survey session state machine
//!
//! One `SurveySession` per in-flight respondent, driven only by its owning
//! client (single-writer, no internal locking). Steps:
//! `selecting → ranking → contact → done`, with `already_submitted` as the
//! duplicate-identity terminal and `failed` retryable via another submit.

use chrono::{DateTime, Utc};
use rankpoll_common::db::models::{DraftRecord, RankedItem, SurveyStep, TeamSize};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::SurveyConfig;

/// Session-level operation errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Malformed or incomplete input; the respondent corrects and retries
    #[error("{0}")]
    Validation(String),

    /// Reorder index outside the list; a caller contract violation
    #[error("{0}")]
    OutOfRange(String),
}

/// Which ranked list a reorder targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankList {
    Primary,
    Remaining,
}

/// Contact fields as entered; validated only at submit time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactFields {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub team_size: Option<TeamSize>,
}

/// Validated payload handed to the submission gate
#[derive(Debug, Clone)]
pub struct SubmitPayload {
    pub first_name: String,
    pub last_name: String,
    /// Trimmed and lower-cased
    pub email: String,
    pub team_size: TeamSize,
    pub rankings: Vec<RankedItem>,
    pub remaining_rankings: Vec<RankedItem>,
}

/// One respondent's in-flight survey session
#[derive(Debug, Clone)]
pub struct SurveySession {
    session_id: Uuid,
    step: SurveyStep,
    config: Arc<SurveyConfig>,
    selection: Vec<String>,
    primary: Vec<RankedItem>,
    remaining: Vec<RankedItem>,
    contact: ContactFields,
    updated_at: DateTime<Utc>,
}

impl SurveySession {
    pub fn new(session_id: Uuid, config: Arc<SurveyConfig>) -> Self {
        Self {
            session_id,
            step: SurveyStep::Selecting,
            config,
            selection: Vec::new(),
            primary: Vec::new(),
            remaining: Vec::new(),
            contact: ContactFields::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn step(&self) -> SurveyStep {
        self.step
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selection
    }

    pub fn primary_ranking(&self) -> &[RankedItem] {
        &self.primary
    }

    pub fn remaining_ranking(&self) -> &[RankedItem] {
        &self.remaining
    }

    /// Toggle an item in or out of the selection.
    ///
    /// Removing always succeeds; adding is a silent no-op once K items are
    /// selected. The UI disables the control at the cap, but the machine
    /// refuses to exceed K regardless of the caller.
    pub fn toggle(&mut self, item_id: &str) -> Result<(), SessionError> {
        self.require_step(SurveyStep::Selecting, "toggle")?;

        if !self.config.contains(item_id) {
            return Err(SessionError::Validation(format!(
                "unknown catalog item '{}'",
                item_id
            )));
        }

        if let Some(pos) = self.selection.iter().position(|id| id == item_id) {
            self.selection.remove(pos);
        } else if self.selection.len() < self.config.max_selections() {
            self.selection.push(item_id.to_string());
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    /// Enter the ranking step.
    ///
    /// Requires exactly K selections. Both rankings are initialized in
    /// catalog order: the selected items at ranks 1..K, the complement at
    /// ranks K+1..N.
    pub fn begin_ranking(&mut self) -> Result<(), SessionError> {
        self.require_step(SurveyStep::Selecting, "begin ranking")?;

        let k = self.config.max_selections();
        if self.selection.len() != k {
            return Err(SessionError::Validation(format!(
                "exactly {} selections required, have {}",
                k,
                self.selection.len()
            )));
        }

        self.primary.clear();
        self.remaining.clear();
        for item in self.config.items() {
            if self.selection.iter().any(|id| id == &item.id) {
                self.primary.push(RankedItem {
                    id: item.id.clone(),
                    label: item.label.clone(),
                    rank: self.primary.len() as u32 + 1,
                });
            } else {
                self.remaining.push(RankedItem {
                    id: item.id.clone(),
                    label: item.label.clone(),
                    rank: (k + self.remaining.len()) as u32 + 1,
                });
            }
        }

        self.step = SurveyStep::Ranking;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Move one element of a ranked list from `from` to `to`.
    ///
    /// A single-element move, not a swap: the element is removed and
    /// reinserted, shifting the intervening elements by one position.
    /// Ranks are recomputed from the resulting positions.
    pub fn reorder(
        &mut self,
        list: RankList,
        from: usize,
        to: usize,
    ) -> Result<(), SessionError> {
        self.require_step(SurveyStep::Ranking, "reorder")?;

        let offset = match list {
            RankList::Primary => 0,
            RankList::Remaining => self.config.max_selections() as u32,
        };
        let items = match list {
            RankList::Primary => &mut self.primary,
            RankList::Remaining => &mut self.remaining,
        };

        if from >= items.len() || to >= items.len() {
            return Err(SessionError::OutOfRange(format!(
                "reorder indices ({}, {}) outside list of length {}",
                from,
                to,
                items.len()
            )));
        }

        let item = items.remove(from);
        items.insert(to, item);
        for (pos, item) in items.iter_mut().enumerate() {
            item.rank = offset + pos as u32 + 1;
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    /// Enter the contact step; unconditional once ranking is active
    pub fn begin_contact(&mut self) -> Result<(), SessionError> {
        self.require_step(SurveyStep::Ranking, "begin contact")?;
        self.step = SurveyStep::Contact;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Store contact fields; validation happens at submit time
    pub fn set_contact(&mut self, fields: ContactFields) -> Result<(), SessionError> {
        if self.step != SurveyStep::Contact && self.step != SurveyStep::Failed {
            return Err(SessionError::Validation(format!(
                "contact fields can only be set during the contact step (currently {})",
                self.step.as_str()
            )));
        }
        self.contact = fields;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Validate the contact fields and assemble the submission payload.
    ///
    /// The session stays in its current step; the caller hands the payload
    /// to the submission gate and reports the verdict back via
    /// `mark_done` / `mark_already_submitted` / `mark_failed`.
    pub fn submit_payload(&self) -> Result<SubmitPayload, SessionError> {
        if self.step != SurveyStep::Contact && self.step != SurveyStep::Failed {
            return Err(SessionError::Validation(format!(
                "submit is only available from the contact step (currently {})",
                self.step.as_str()
            )));
        }

        let first_name = trimmed_required(self.contact.first_name.as_deref(), "first name")?;
        let last_name = trimmed_required(self.contact.last_name.as_deref(), "last name")?;
        let email = trimmed_required(self.contact.email.as_deref(), "email")?;
        if !email_shape_ok(&email) {
            return Err(SessionError::Validation(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
        let team_size = self
            .contact
            .team_size
            .ok_or_else(|| SessionError::Validation("team size is required".to_string()))?;

        Ok(SubmitPayload {
            first_name,
            last_name,
            email: email.to_lowercase(),
            team_size,
            rankings: self.primary.clone(),
            remaining_rankings: self.remaining.clone(),
        })
    }

    /// The submission gate accepted the payload
    pub fn mark_done(&mut self) {
        self.step = SurveyStep::Done;
        self.updated_at = Utc::now();
    }

    /// The submission gate found an existing response for this identity
    pub fn mark_already_submitted(&mut self) {
        self.step = SurveyStep::AlreadySubmitted;
        self.updated_at = Utc::now();
    }

    /// Storage failure; the session may retry submit
    pub fn mark_failed(&mut self) {
        self.step = SurveyStep::Failed;
        self.updated_at = Utc::now();
    }

    /// Snapshot of this session for draft persistence.
    ///
    /// Empty collections become NULL columns, matching a snapshot that has
    /// not reached the step that populates them.
    pub fn draft_record(&self) -> DraftRecord {
        DraftRecord {
            session_id: self.session_id,
            step: self.step,
            selections: (!self.selection.is_empty()).then(|| self.selection.clone()),
            rankings: (!self.primary.is_empty()).then(|| self.primary.clone()),
            remaining_rankings: (!self.remaining.is_empty()).then(|| self.remaining.clone()),
            first_name: self.contact.first_name.clone(),
            last_name: self.contact.last_name.clone(),
            email: self.contact.email.clone(),
            team_size: self.contact.team_size,
            updated_at: self.updated_at,
        }
    }

    fn require_step(&self, expected: SurveyStep, operation: &str) -> Result<(), SessionError> {
        if self.step != expected {
            return Err(SessionError::Validation(format!(
                "{} is only available during the {} step (currently {})",
                operation,
                expected.as_str(),
                self.step.as_str()
            )));
        }
        Ok(())
    }
}

fn trimmed_required(value: Option<&str>, field: &str) -> Result<String, SessionError> {
    let trimmed = value.unwrap_or("").trim();
    if trimmed.is_empty() {
        return Err(SessionError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Syntactic email check: `local@domain.tld` with no whitespace, exactly
/// one '@', and a dot inside the domain with non-empty parts either side.
fn email_shape_ok(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogItem;

    fn config(n: usize, k: usize) -> Arc<SurveyConfig> {
        let items = (0..n)
            .map(|i| CatalogItem {
                id: format!("item-{}", i),
                label: format!("Item {}", i),
                description: None,
            })
            .collect();
        Arc::new(SurveyConfig::new(items, k).unwrap())
    }

    fn session(n: usize, k: usize) -> SurveySession {
        SurveySession::new(Uuid::new_v4(), config(n, k))
    }

    fn select_first(session: &mut SurveySession, count: usize) {
        for i in 0..count {
            session.toggle(&format!("item-{}", i)).unwrap();
        }
    }

    fn full_contact() -> ContactFields {
        ContactFields {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("Ada@Example.COM".to_string()),
            team_size: Some(TeamSize::ThreeToTwenty),
        }
    }

    #[test]
    fn toggle_never_exceeds_k() {
        let mut s = session(8, 3);
        for i in 0..8 {
            s.toggle(&format!("item-{}", i)).unwrap();
            assert!(s.selected_ids().len() <= 3);
        }
        // First three stuck, later toggles were no-ops
        assert_eq!(s.selected_ids(), ["item-0", "item-1", "item-2"]);
    }

    #[test]
    fn toggle_removes_selected_item() {
        let mut s = session(8, 3);
        select_first(&mut s, 3);
        s.toggle("item-1").unwrap();
        assert_eq!(s.selected_ids(), ["item-0", "item-2"]);
        // Room again for a new pick
        s.toggle("item-5").unwrap();
        assert_eq!(s.selected_ids().len(), 3);
    }

    #[test]
    fn toggle_rejects_unknown_item() {
        let mut s = session(4, 2);
        let err = s.toggle("nope").unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
    }

    #[test]
    fn begin_ranking_requires_exactly_k() {
        let mut s = session(8, 3);
        select_first(&mut s, 2);
        let err = s.begin_ranking().unwrap_err();
        assert!(matches!(err, SessionError::Validation(ref msg) if msg.contains("3")));
        assert_eq!(s.step(), SurveyStep::Selecting);

        s.toggle("item-7").unwrap();
        s.begin_ranking().unwrap();
        assert_eq!(s.step(), SurveyStep::Ranking);
    }

    #[test]
    fn begin_ranking_initializes_both_lists_in_catalog_order() {
        let mut s = session(6, 2);
        // Select out of catalog order; initialization follows the catalog
        s.toggle("item-4").unwrap();
        s.toggle("item-1").unwrap();
        s.begin_ranking().unwrap();

        let primary: Vec<(&str, u32)> = s
            .primary_ranking()
            .iter()
            .map(|r| (r.id.as_str(), r.rank))
            .collect();
        assert_eq!(primary, [("item-1", 1), ("item-4", 2)]);

        let remaining: Vec<(&str, u32)> = s
            .remaining_ranking()
            .iter()
            .map(|r| (r.id.as_str(), r.rank))
            .collect();
        assert_eq!(
            remaining,
            [("item-0", 3), ("item-2", 4), ("item-3", 5), ("item-5", 6)]
        );
    }

    #[test]
    fn reorder_is_a_move_not_a_swap() {
        let mut s = session(6, 3);
        select_first(&mut s, 3);
        s.begin_ranking().unwrap();

        // [0, 1, 2] -> move index 0 to index 2 -> [1, 2, 0]
        s.reorder(RankList::Primary, 0, 2).unwrap();
        let ids: Vec<&str> = s.primary_ranking().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["item-1", "item-2", "item-0"]);
        let ranks: Vec<u32> = s.primary_ranking().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, [1, 2, 3]);
    }

    #[test]
    fn reorder_preserves_rank_permutations() {
        let mut s = session(7, 3);
        select_first(&mut s, 3);
        s.begin_ranking().unwrap();

        let moves = [
            (RankList::Primary, 2, 0),
            (RankList::Primary, 1, 2),
            (RankList::Remaining, 3, 0),
            (RankList::Remaining, 1, 3),
            (RankList::Primary, 0, 1),
        ];
        for (list, from, to) in moves {
            s.reorder(list, from, to).unwrap();

            let mut primary_ranks: Vec<u32> =
                s.primary_ranking().iter().map(|r| r.rank).collect();
            primary_ranks.sort_unstable();
            assert_eq!(primary_ranks, [1, 2, 3]);

            let mut remaining_ranks: Vec<u32> =
                s.remaining_ranking().iter().map(|r| r.rank).collect();
            remaining_ranks.sort_unstable();
            assert_eq!(remaining_ranks, [4, 5, 6, 7]);
        }
    }

    #[test]
    fn reorder_rejects_out_of_bounds_indices() {
        let mut s = session(5, 2);
        select_first(&mut s, 2);
        s.begin_ranking().unwrap();

        let err = s.reorder(RankList::Primary, 0, 2).unwrap_err();
        assert!(matches!(err, SessionError::OutOfRange(_)));
        let err = s.reorder(RankList::Remaining, 3, 0).unwrap_err();
        assert!(matches!(err, SessionError::OutOfRange(_)));
    }

    #[test]
    fn reorder_only_during_ranking() {
        let mut s = session(5, 2);
        let err = s.reorder(RankList::Primary, 0, 1).unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
    }

    #[test]
    fn submit_payload_validates_contact_fields() {
        let mut s = session(5, 2);
        select_first(&mut s, 2);
        s.begin_ranking().unwrap();
        s.begin_contact().unwrap();

        // Nothing set yet
        assert!(matches!(s.submit_payload(), Err(SessionError::Validation(_))));

        // Whitespace-only name
        let mut fields = full_contact();
        fields.first_name = Some("   ".to_string());
        s.set_contact(fields).unwrap();
        assert!(matches!(s.submit_payload(), Err(SessionError::Validation(_))));

        // Missing team size
        let mut fields = full_contact();
        fields.team_size = None;
        s.set_contact(fields).unwrap();
        assert!(matches!(s.submit_payload(), Err(SessionError::Validation(_))));

        // All valid
        s.set_contact(full_contact()).unwrap();
        let payload = s.submit_payload().unwrap();
        assert_eq!(payload.first_name, "Ada");
        assert_eq!(payload.email, "ada@example.com");
        assert_eq!(payload.team_size, TeamSize::ThreeToTwenty);
        assert_eq!(payload.rankings.len(), 2);
        assert_eq!(payload.remaining_rankings.len(), 3);
        // Validation failure or success, the session stays in contact
        assert_eq!(s.step(), SurveyStep::Contact);
    }

    #[test]
    fn email_shapes() {
        assert!(email_shape_ok("a@x.com"));
        assert!(email_shape_ok("first.last@sub.domain.org"));
        assert!(!email_shape_ok("a@x"));
        assert!(!email_shape_ok("@x.com"));
        assert!(!email_shape_ok("a@.com"));
        assert!(!email_shape_ok("a@x."));
        assert!(!email_shape_ok("a b@x.com"));
        assert!(!email_shape_ok("a@@x.com"));
        assert!(!email_shape_ok("ax.com"));
    }

    #[test]
    fn failed_submit_is_retryable() {
        let mut s = session(5, 2);
        select_first(&mut s, 2);
        s.begin_ranking().unwrap();
        s.begin_contact().unwrap();
        s.set_contact(full_contact()).unwrap();

        s.mark_failed();
        assert_eq!(s.step(), SurveyStep::Failed);
        // Still able to correct fields and produce a payload
        s.set_contact(full_contact()).unwrap();
        assert!(s.submit_payload().is_ok());

        s.mark_done();
        assert!(s.step().is_terminal());
    }

    #[test]
    fn draft_record_reflects_progress() {
        let mut s = session(5, 2);
        let draft = s.draft_record();
        assert_eq!(draft.step, SurveyStep::Selecting);
        assert!(draft.selections.is_none());
        assert!(draft.rankings.is_none());

        select_first(&mut s, 2);
        s.begin_ranking().unwrap();
        let draft = s.draft_record();
        assert_eq!(draft.step, SurveyStep::Ranking);
        assert_eq!(draft.selections.as_ref().unwrap().len(), 2);
        assert_eq!(draft.rankings.as_ref().unwrap().len(), 2);
        assert_eq!(draft.remaining_rankings.as_ref().unwrap().len(), 3);

        s.begin_contact().unwrap();
        s.set_contact(full_contact()).unwrap();
        let draft = s.draft_record();
        assert_eq!(draft.step, SurveyStep::Contact);
        assert_eq!(draft.email.as_deref(), Some("Ada@Example.COM"));
        assert_eq!(draft.team_size, Some(TeamSize::ThreeToTwenty));
    }
}
