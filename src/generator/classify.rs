//! Query classification.
//!
//! A prioritized rule list: scripted scenario overrides are checked first
//! (every keyword must appear), then the generic keyword kinds (first match
//! wins), then the `General` fallback. Matching is case-insensitive
//! substring search.

use serde::{Deserialize, Serialize};

use crate::models::Service;

/// Hand-authored demo flows with fixed tool sequences
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// search -> fetch -> update-page on the Venn PRD
    NotionPrdUpdate,
    /// salesforce-search -> salesforce-update on at-risk deals
    SalesforceAtRisk,
}

/// Generic query kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum QueryKind {
    CrmAnalysis,
    EmailAnalysis,
    DocumentSearch,
    General,
}

/// Assistant message content for queries no other rule matched
pub const GENERAL_MESSAGE: &str = "I'm analyzing your enterprise data sources to provide the \
     most relevant information. How can I help you today?";

impl QueryKind {
    /// Short kebab-case label, used in logs
    pub fn label(self) -> &'static str {
        match self {
            QueryKind::CrmAnalysis => "salesforce-opportunity",
            QueryKind::EmailAnalysis => "gmail-analysis",
            QueryKind::DocumentSearch => "document-search",
            QueryKind::General => "general",
        }
    }
}

/// Which rule matched
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "rule", content = "id", rename_all = "kebab-case")]
pub enum Rule {
    Scenario(Scenario),
    Generic(QueryKind),
}

impl Rule {
    pub fn label(self) -> &'static str {
        match self {
            Rule::Scenario(Scenario::NotionPrdUpdate) => "notion-prd-update",
            Rule::Scenario(Scenario::SalesforceAtRisk) => "salesforce-at-risk",
            Rule::Generic(kind) => kind.label(),
        }
    }

    /// Content of the assistant message that carries the thought process:
    /// the rule label, or [`GENERAL_MESSAGE`] for general queries.
    pub fn message_content(self) -> &'static str {
        match self {
            Rule::Generic(QueryKind::General) => GENERAL_MESSAGE,
            rule => rule.label(),
        }
    }
}

/// Result of classifying a query against the selected services
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub rule: Rule,
    /// Services the plan will use, in the order they were supplied
    pub services: Vec<String>,
}

impl Classification {
    pub fn scenario(&self) -> Option<Scenario> {
        match self.rule {
            Rule::Scenario(scenario) => Some(scenario),
            Rule::Generic(_) => None,
        }
    }

    pub fn kind(&self) -> Option<QueryKind> {
        match self.rule {
            Rule::Generic(kind) => Some(kind),
            Rule::Scenario(_) => None,
        }
    }
}

struct ScenarioRule {
    scenario: Scenario,
    all_of: &'static [&'static str],
    service: Service,
}

const SCENARIO_RULES: &[ScenarioRule] = &[
    ScenarioRule {
        scenario: Scenario::NotionPrdUpdate,
        all_of: &["update", "prd", "notion"],
        service: Service::Notion,
    },
    ScenarioRule {
        scenario: Scenario::SalesforceAtRisk,
        all_of: &["salesforce", "risk", "update"],
        service: Service::Salesforce,
    },
];

struct KindRule {
    kind: QueryKind,
    any_of: &'static [&'static str],
    allowed: &'static [Service],
}

const KIND_RULES: &[KindRule] = &[
    KindRule {
        kind: QueryKind::CrmAnalysis,
        any_of: &["opportunity", "deal", "sales", "green and sons", "salesforce"],
        allowed: &[Service::Salesforce, Service::Gmail],
    },
    KindRule {
        kind: QueryKind::EmailAnalysis,
        any_of: &["email", "mail", "message", "gmail", "inbox"],
        allowed: &[Service::Gmail],
    },
    KindRule {
        kind: QueryKind::DocumentSearch,
        any_of: &["document", "file", "gdrive", "drive", "notion", "notes"],
        allowed: &[Service::Gdrive, Service::Notion],
    },
];

/// Services used by the `General` fallback
const GENERAL_SERVICE_LIMIT: usize = 2;

/// Classify `query` against the user's selected `services`.
pub fn classify(query: &str, services: &[String]) -> Classification {
    let query = query.to_lowercase();

    if let Some(rule) = SCENARIO_RULES
        .iter()
        .find(|rule| rule.all_of.iter().all(|kw| query.contains(kw)))
    {
        return Classification {
            rule: Rule::Scenario(rule.scenario),
            services: vec![rule.service.id().to_string()],
        };
    }

    if let Some(rule) = KIND_RULES
        .iter()
        .find(|rule| rule.any_of.iter().any(|kw| query.contains(kw)))
    {
        let services = services
            .iter()
            .filter(|id| rule.allowed.iter().any(|allowed| allowed.id() == id.as_str()))
            .cloned()
            .collect();
        return Classification {
            rule: Rule::Generic(rule.kind),
            services,
        };
    }

    Classification {
        rule: Rule::Generic(QueryKind::General),
        services: services.iter().take(GENERAL_SERVICE_LIMIT).cloned().collect(),
    }
}

/// Whether `query` (any case) contains at least one keyword
pub(crate) fn contains_any(query: &str, keywords: &[&str]) -> bool {
    let query = query.to_lowercase();
    keywords.iter().any(|kw| query.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_opportunity_restricts_to_crm_services() {
        let result = classify(
            "Show me the opportunity for Green and Sons",
            &ids(&["salesforce", "gdrive", "gmail"]),
        );
        assert_eq!(result.rule, Rule::Generic(QueryKind::CrmAnalysis));
        assert_eq!(result.services, ids(&["salesforce", "gmail"]));
    }

    #[test]
    fn test_crm_keeps_supplied_order() {
        let result = classify("any deal news?", &ids(&["gmail", "notion", "salesforce"]));
        assert_eq!(result.services, ids(&["gmail", "salesforce"]));
    }

    #[test]
    fn test_first_match_precedence() {
        // "deal" beats "email"
        let result = classify("email me about the deal", &ids(&["gmail"]));
        assert_eq!(result.kind(), Some(QueryKind::CrmAnalysis));
    }

    #[test]
    fn test_email_kind() {
        let result = classify("Check my inbox", &ids(&["salesforce", "gmail", "gdrive"]));
        assert_eq!(result.rule, Rule::Generic(QueryKind::EmailAnalysis));
        assert_eq!(result.services, ids(&["gmail"]));
    }

    #[test]
    fn test_document_kind() {
        let result = classify("find my NOTES", &ids(&["salesforce", "notion", "gdrive"]));
        assert_eq!(result.rule, Rule::Generic(QueryKind::DocumentSearch));
        assert_eq!(result.services, ids(&["notion", "gdrive"]));
    }

    #[test]
    fn test_general_fallback_uses_first_two() {
        let result = classify("hello there", &ids(&["gdrive", "gmail", "salesforce"]));
        assert_eq!(result.rule, Rule::Generic(QueryKind::General));
        assert_eq!(result.services, ids(&["gdrive", "gmail"]));

        let result = classify("hello there", &ids(&["notion"]));
        assert_eq!(result.services, ids(&["notion"]));
    }

    #[test]
    fn test_notion_scenario_override() {
        let result = classify("Can you update the Venn PRD in notion", &ids(&["gmail"]));
        assert_eq!(result.scenario(), Some(Scenario::NotionPrdUpdate));
        assert_eq!(result.services, ids(&["notion"]));
    }

    #[test]
    fn test_salesforce_scenario_beats_crm_kind() {
        let result = classify(
            "Check salesforce for at risk deals and update them, but I don't have access",
            &ids(&["salesforce", "gmail"]),
        );
        assert_eq!(result.scenario(), Some(Scenario::SalesforceAtRisk));
        assert_eq!(result.services, ids(&["salesforce"]));
    }

    #[test]
    fn test_partial_scenario_keywords_fall_through() {
        let result = classify("update the prd", &ids(&["notion", "gdrive"]));
        assert_eq!(result.rule, Rule::Generic(QueryKind::General));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let services = ids(&["salesforce", "gmail", "gdrive"]);
        let a = classify("Where is the proposal file?", &services);
        let b = classify("Where is the proposal file?", &services);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rule_labels() {
        assert_eq!(Rule::Generic(QueryKind::CrmAnalysis).label(), "salesforce-opportunity");
        assert_eq!(
            Rule::Scenario(Scenario::NotionPrdUpdate).label(),
            "notion-prd-update"
        );
        assert_eq!(Rule::Generic(QueryKind::General).label(), "general");
    }

    #[test]
    fn test_message_content() {
        assert_eq!(
            Rule::Generic(QueryKind::General).message_content(),
            GENERAL_MESSAGE
        );
        assert_eq!(
            Rule::Generic(QueryKind::EmailAnalysis).message_content(),
            "gmail-analysis"
        );
        assert_eq!(
            Rule::Scenario(Scenario::SalesforceAtRisk).message_content(),
            "salesforce-at-risk"
        );
    }
}
