//! Survey catalog and configuration
//!
//! The catalog is process-wide static configuration: fixed at startup,
//! injected into the session state machine and the aggregation engine.
//! A `[survey]` section in the TOML config file replaces the compiled-in
//! catalog wholesale.

use once_cell::sync::Lazy;
use rankpoll_common::config::SurveySection;
use rankpoll_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// One selectable priority option with a stable identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Immutable survey configuration: the ordered catalog plus K
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    items: Vec<CatalogItem>,
    max_selections: usize,
}

/// Default number of items a respondent must select
pub const DEFAULT_MAX_SELECTIONS: usize = 5;

impl SurveyConfig {
    /// Build a validated configuration.
    ///
    /// Rejects empty catalogs, duplicate item ids, and a K outside
    /// `1..=catalog length`.
    pub fn new(items: Vec<CatalogItem>, max_selections: usize) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::Config("survey catalog must not be empty".to_string()));
        }
        if max_selections < 1 || max_selections > items.len() {
            return Err(Error::Config(format!(
                "max_selections must be between 1 and {} (the catalog size), got {}",
                items.len(),
                max_selections
            )));
        }
        for (i, item) in items.iter().enumerate() {
            if item.id.trim().is_empty() {
                return Err(Error::Config(format!("catalog item {} has an empty id", i)));
            }
            if items[..i].iter().any(|other| other.id == item.id) {
                return Err(Error::Config(format!("duplicate catalog item id '{}'", item.id)));
            }
        }

        Ok(Self { items, max_selections })
    }

    /// The compiled-in catalog with the default K
    pub fn compiled_default() -> Self {
        Self {
            items: DEFAULT_CATALOG.clone(),
            max_selections: DEFAULT_MAX_SELECTIONS,
        }
    }

    /// Apply the optional `[survey]` TOML section on top of the defaults
    pub fn from_toml_section(section: Option<&SurveySection>) -> Result<Self> {
        let Some(section) = section else {
            return Ok(Self::compiled_default());
        };

        let items = match &section.items {
            Some(toml_items) => toml_items
                .iter()
                .map(|item| CatalogItem {
                    id: item.id.clone(),
                    label: item.label.clone(),
                    description: item.description.clone(),
                })
                .collect(),
            None => DEFAULT_CATALOG.clone(),
        };
        let max_selections = section.max_selections.unwrap_or(DEFAULT_MAX_SELECTIONS);

        Self::new(items, max_selections)
    }

    /// The ordered catalog (catalog order is the canonical item order)
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// K: how many items a respondent must select
    pub fn max_selections(&self) -> usize {
        self.max_selections
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|item| item.id == item_id)
    }
}

/// The 21 priority options of the compiled-in survey
static DEFAULT_CATALOG: Lazy<Vec<CatalogItem>> = Lazy::new(|| {
    let raw: [(&str, &str, &str); 21] = [
        (
            "lead-gen",
            "Lead Generation & Quality",
            "Agents waste time chasing unqualified leads from vendors that prioritize volume over quality, and the AI tools that do exist are built for American markets only, leaving international agents with nothing usable.",
        ),
        (
            "prospect-outreach",
            "Prospect Outreach & Contact",
            "Getting a prospect on the phone is a grind of unanswered calls, siloed communication channels, no intelligent call routing, and outreach that doesn't adapt to regional culture or tone.",
        ),
        (
            "follow-up-nurture",
            "Follow-Up, Nurture & Appointment Setting",
            "After first contact, most agents give up within 3-4 attempts because there's no automated system to persistently follow up across channels, book appointments, or trigger workflows based on prospect behavior.",
        ),
        (
            "client-onboarding",
            "Client Onboarding",
            "Pre-sale fact-finding, quoting, information gathering, and post-sale intake paperwork, form collection, and compliance-gated scheduling like Medicare's 48-hour Scope of Appointment rule bury salespeople in admin instead of letting them sell.",
        ),
        (
            "book-retention",
            "Book of Business & Client Retention",
            "Agents neglect existing clients because there's no automated system for annual reviews, pre-renewal outreach, quarterly touchpoints, or referral asks, and when automation does exist it feels robotic at scale.",
        ),
        (
            "claims-engagement",
            "Claims Engagement",
            "Most agents go silent during claims and miss the single best relationship-building moment in insurance: no consistent touchpoints during or after claims, and no structured follow-up to convert loyalty into referrals.",
        ),
        (
            "agent-recruiting",
            "Agent Recruiting & Hiring",
            "The number one complaint in 23 years of the industry: agencies can't find good people, have no scalable recruiting funnel, and bias toward experienced hires while overlooking coachable talent.",
        ),
        (
            "licensing-exam",
            "Agent Licensing & Exam Prep",
            "Promising recruits wash out because they can't pass the licensing exam, and no AI-powered study tool exists to adapt to individual gaps and drill candidates to a passing score.",
        ),
        (
            "agent-onboarding",
            "Agent Onboarding & Contracting",
            "Getting a new agent contracted and credentialed with carriers is a full-time job that smaller agencies can't staff for, creating a bottleneck between hiring and producing.",
        ),
        (
            "agent-ramp-up",
            "New Agent Ramp-Up & Field Readiness",
            "After licensing, new agents are dropped into the field with no structured daily plan, no weekly milestones, and no 90-day roadmap, so they flounder, lose confidence, and quit.",
        ),
        (
            "sales-training",
            "Sales Training & Skill Development",
            "The training that actually makes agents successful (role plays, ride-alongs, presentation coaching) doesn't scale beyond one-on-one, and agency owners' plans break down when less-trained team members try to execute them.",
        ),
        (
            "accountability",
            "Agent Accountability & Performance Management",
            "Managers have no visibility into whether agents are making calls, booking appointments, or hitting daily behaviors, so they can't coach effectively or intervene early.",
        ),
        (
            "agent-retention",
            "Agent Retention & Culture",
            "Agents get poached by competitors because retention depends on culture, leadership, and feeling successful, all of which erode as agencies grow, go remote, or spread across regions.",
        ),
        (
            "underwriting",
            "Underwriting & Carrier Relations",
            "Underwriters are slow to respond, newer agents don't know how to push back on bad decisions, underwriters themselves sometimes don't know their own terms, and proprietary guidelines can't be loaded into AI tools without liability risk.",
        ),
        (
            "compliance",
            "Compliance & Regulatory",
            "Agents fail to document conversations, miss required disclosures, don't capture recording consent, and face serious legal exposure, all while navigating rules that vary by state, country, and carrier with no automated tracking.",
        ),
        (
            "doc-generation",
            "Document Generation & Automation",
            "Creating client-facing documents, transcribing meetings, and generating compliant reports eats 14+ hours per week, and what does get produced is inconsistent in branding, tone, and structure across the agency.",
        ),
        (
            "marketing",
            "Marketing & Branding",
            "Agents are invisible in their markets with no differentiation, no content pipeline, no video strategy, and deep skepticism toward automation tools that overpromise, while the ones that do automate risk sounding generic and losing authenticity.",
        ),
        (
            "self-service",
            "Customer-Facing Self-Service",
            "Prospects and clients can't get insurance answers outside business hours, don't understand products well enough to buy, and agents are paying third parties for basic chatbot features that an in-house AI should own.",
        ),
        (
            "knowledge-base",
            "Agency Knowledge Base & Internal Efficiency",
            "There's no shared, multi-user knowledge base for agency teams, so managers and senior agents burn hours answering the same internal questions over and over instead of focusing on growth.",
        ),
        (
            "data-bi",
            "Data & Business Intelligence",
            "Most agents and owners don't track close ratios, dial-to-appointment rates, marketing ROI, or margins; they're flying blind and staying average because no simple dashboard ties activity to outcomes.",
        ),
        (
            "biz-ops-finance",
            "Business Operations & Finance",
            "Receipt tracking, commissions reconciliation, and bank account management are manual and error-prone, requiring dedicated headcount that smaller agencies can't afford and larger ones are still struggling to staff.",
        ),
    ];

    raw.iter()
        .map(|(id, label, description)| CatalogItem {
            id: id.to_string(),
            label: label.to_string(),
            description: Some(description.to_string()),
        })
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;
    use rankpoll_common::config::SurveyItemToml;

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            label: id.to_uppercase(),
            description: None,
        }
    }

    #[test]
    fn compiled_default_is_valid() {
        let config = SurveyConfig::compiled_default();
        assert_eq!(config.items().len(), 21);
        assert_eq!(config.max_selections(), 5);
        // Unique ids
        SurveyConfig::new(config.items().to_vec(), config.max_selections()).unwrap();
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(SurveyConfig::new(vec![], 1).is_err());
    }

    #[test]
    fn rejects_k_larger_than_catalog() {
        let items = vec![item("a"), item("b")];
        assert!(SurveyConfig::new(items.clone(), 3).is_err());
        assert!(SurveyConfig::new(items.clone(), 0).is_err());
        assert!(SurveyConfig::new(items, 2).is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let items = vec![item("a"), item("a")];
        assert!(SurveyConfig::new(items, 1).is_err());
    }

    #[test]
    fn toml_section_overrides_catalog_and_k() {
        let section = SurveySection {
            max_selections: Some(2),
            items: Some(vec![
                SurveyItemToml {
                    id: "x".to_string(),
                    label: "X".to_string(),
                    description: None,
                },
                SurveyItemToml {
                    id: "y".to_string(),
                    label: "Y".to_string(),
                    description: Some("why".to_string()),
                },
                SurveyItemToml {
                    id: "z".to_string(),
                    label: "Z".to_string(),
                    description: None,
                },
            ]),
        };

        let config = SurveyConfig::from_toml_section(Some(&section)).unwrap();
        assert_eq!(config.max_selections(), 2);
        assert_eq!(config.items().len(), 3);
        assert!(config.contains("y"));
        assert!(!config.contains("lead-gen"));
    }

    #[test]
    fn no_toml_section_means_defaults() {
        let config = SurveyConfig::from_toml_section(None).unwrap();
        assert_eq!(config.items().len(), 21);
        assert!(config.contains("lead-gen"));
    }
}
