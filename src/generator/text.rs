//! Canned narrative: reasoning sentences, progress updates, final reasoning
//! steps and final responses.

use chrono::Utc;

use super::classify::{contains_any, Classification, QueryKind, Rule, Scenario};
use super::tools::ACCESS_ROLE;
use crate::config::ErrorInjectionConfig;
use crate::models::{FinalReasoning, ProgressUpdate, ReasoningStep, ToolInvocation, ToolStatus};

const REASONING_RULES: &[(&[&str], &str)] = &[
    (
        &["opportunity", "deal"],
        "You want to analyze sales opportunities and deal progression. I'll search across \
         your CRM, emails, and documents to provide comprehensive deal insights.",
    ),
    (
        &["email", "communication"],
        "You're looking for communication history and email insights. I'll analyze your \
         email data and related documents to provide context.",
    ),
    (
        &["document", "file"],
        "You need information from your documents and files. I'll search across your \
         knowledge base and file storage to find relevant content.",
    ),
    (
        &["customer", "client", "account"],
        "You want customer or account information. I'll gather data from your CRM, \
         communications, and documents to provide a complete customer view.",
    ),
];

const DEFAULT_REASONING: &str = "I'll analyze your query and search across your enterprise \
     data sources to find the most relevant information.";

const GREEN_AND_SONS_RESPONSE: &str = "Based on my analysis of your Salesforce data and \
     related communications, I found comprehensive information about the Green and Sons \
     opportunity. The deal is progressing well in the Proposal/Price Quote stage with a value \
     of $124,432 and a close date of June 14, 2025. Recent Gong insights show positive \
     engagement from the CFO, though they're requesting a 5% discount for a multi-year \
     commitment. I recommend scheduling the proposal review call by May 24 to maintain \
     momentum.";

const NOTION_PRD_RESPONSE: &str = "I've updated the Venn PRD 2.0 document in Notion. \
     \"Moda Labs is helping!\" now appears in the Version V2 section, next to the existing \
     mention of Moda Labs, so the collaboration is visible to everyone reading the PRD.";

const AT_RISK_UPDATED_RESPONSE: &str = "I found 3 opportunities at deal risk in Salesforce: \
     \"Green and Sons - Enterprise Deal\" ($124,432), \"Acme Corp Expansion\" ($89,500), and \
     \"TechFlow Solutions\" ($156,200). I've moved all of their close dates to next month to \
     give the account teams more time to close.";

const GENERIC_RESPONSE: &str = "Based on my analysis across your selected enterprise data \
     sources, I've compiled the relevant information and insights to help you with your \
     query. The data shows consistent patterns and actionable next steps.";

const PARTIAL_FAILURE_NOTE: &str = "Some of the data sources could not be reached, so these \
     results may be incomplete. Sources that failed are marked on their cards.";

const ALL_FAILED_RESPONSE: &str = "None of the selected data sources could be reached, so I \
     couldn't gather any results for this query. The failed sources are marked on their cards; \
     try again once they are available.";

const AT_RISK_FOUND: &str = "I found 3 opportunities at deal risk: \"Green and Sons - \
     Enterprise Deal\" ($124,432), \"Acme Corp Expansion\" ($89,500), and \"TechFlow \
     Solutions\" ($156,200).";

/// The sentence shown once the thought process enters `reasoning`.
pub fn compose_reasoning(
    classification: &Classification,
    query: &str,
    errors: &ErrorInjectionConfig,
) -> String {
    match classification.scenario() {
        Some(Scenario::NotionPrdUpdate) => "I'll help you update the Venn PRD in Notion. Let \
             me first search for the document to locate it."
            .to_string(),
        Some(Scenario::SalesforceAtRisk) => {
            let action = if errors.mentions_access(query) {
                "attempt to update"
            } else {
                "update"
            };
            format!(
                "I'll help you find at-risk opportunities in Salesforce and {action} their \
                 close dates. Let me first search for opportunities that are currently at \
                 deal risk."
            )
        }
        None => REASONING_RULES
            .iter()
            .find(|(keywords, _)| contains_any(query, keywords))
            .map(|(_, sentence)| *sentence)
            .unwrap_or(DEFAULT_REASONING)
            .to_string(),
    }
}

/// Interstitial messages keyed to tool positions. Generic plans have none.
pub fn progress_updates(
    classification: &Classification,
    query: &str,
    errors: &ErrorInjectionConfig,
) -> Option<Vec<ProgressUpdate>> {
    let messages: Vec<(usize, String)> = match classification.scenario()? {
        Scenario::NotionPrdUpdate => vec![
            (
                0,
                "I found several Venn PRD documents. The most recent one appears to be \
                 \"Venn PRD 2.0\". Let me fetch it to see the current content and then update \
                 it with \"Moda Labs is helping!\""
                    .to_string(),
            ),
            (
                1,
                "Now I'll update the Venn PRD 2.0 document by adding \"Moda Labs is helping!\" \
                 in an appropriate location. I'll add it to the Version V2 section where Moda \
                 Labs is already mentioned."
                    .to_string(),
            ),
        ],
        Scenario::SalesforceAtRisk => {
            let next = if errors.mentions_access(query) {
                "Now I'll attempt to update their close dates to next month."
            } else {
                "Now I'll update all their close dates to next month to give more time for \
                 deal closure."
            };
            vec![(0, format!("{AT_RISK_FOUND} {next}"))]
        }
    };

    let now = Utc::now();
    Some(
        messages
            .into_iter()
            .enumerate()
            .map(|(n, (tool_index, message))| ProgressUpdate {
                id: format!("progress-{n}"),
                message,
                tool_index,
                timestamp: now,
            })
            .collect(),
    )
}

/// The synthesis card shown after every tool has resolved.
pub fn final_reasoning(classification: &Classification) -> FinalReasoning {
    let steps: &[(&str, &str)] = match classification.rule {
        Rule::Scenario(Scenario::NotionPrdUpdate) => &[
            (
                "Located the document",
                "Picked Venn PRD 2.0 as the most recent of the matching PRDs.",
            ),
            (
                "Chose the section",
                "Version V2 already mentions Moda Labs, so the note belongs there.",
            ),
            (
                "Applied the update",
                "Added \"Moda Labs is helping!\" without touching the rest of the page.",
            ),
        ],
        Rule::Scenario(Scenario::SalesforceAtRisk) => &[
            (
                "Identified at-risk deals",
                "Filtered active opportunities with a high risk level.",
            ),
            (
                "Planned the change",
                "Moving close dates to next month gives each deal more runway.",
            ),
            (
                "Checked the outcome",
                "Compared the update results against the records found.",
            ),
        ],
        Rule::Generic(QueryKind::CrmAnalysis) => &[
            (
                "Matched the opportunity",
                "Joined the Salesforce record with related email threads.",
            ),
            (
                "Reviewed deal health",
                "Looked at stage, amount, close date and recent call notes.",
            ),
            (
                "Recommended next step",
                "Picked the action most likely to keep the deal moving.",
            ),
        ],
        Rule::Generic(_) => &[
            (
                "Collected results",
                "Gathered the matches returned by each selected source.",
            ),
            (
                "Cross-referenced sources",
                "Looked for overlap and conflicts between the sources.",
            ),
            (
                "Summarized findings",
                "Condensed the results into a short answer.",
            ),
        ],
    };

    let steps = steps
        .iter()
        .zip(1u32..)
        .map(|((title, description), order)| ReasoningStep {
            id: format!("step-{order}"),
            title: title.to_string(),
            description: description.to_string(),
            order,
        })
        .collect();

    FinalReasoning::new("Final reasoning", steps)
}

/// The answer revealed when the thought process completes.
///
/// `tools` are the invocations as they resolved. Generic answers carry a
/// partial-failure note when at least one of them ended in `error`, and are
/// replaced outright when all of them did.
pub fn compose_final_response(
    classification: &Classification,
    query: &str,
    errors: &ErrorInjectionConfig,
    tools: &[ToolInvocation],
) -> String {
    let base = match classification.rule {
        Rule::Scenario(Scenario::NotionPrdUpdate) => return NOTION_PRD_RESPONSE.to_string(),
        Rule::Scenario(Scenario::SalesforceAtRisk) => {
            return if errors.mentions_access(query) {
                format!(
                    "{AT_RISK_FOUND} However, I wasn't able to update their close dates: the \
                     update was denied for role \"{ACCESS_ROLE}\", which can read \
                     opportunities but not modify them. Ask your Salesforce administrator \
                     for update access on opportunity records and I can retry the change."
                )
            } else {
                AT_RISK_UPDATED_RESPONSE.to_string()
            };
        }
        Rule::Generic(QueryKind::CrmAnalysis) => GREEN_AND_SONS_RESPONSE,
        Rule::Generic(_) => GENERIC_RESPONSE,
    };

    let failed = tools
        .iter()
        .filter(|tool| tool.status == ToolStatus::Error)
        .count();
    match failed {
        0 => base.to_string(),
        n if n == tools.len() => ALL_FAILED_RESPONSE.to_string(),
        _ => format!("{base} {PARTIAL_FAILURE_NOTE}"),
    }
}
