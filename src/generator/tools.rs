//! Tool invocation planning.
//!
//! Generic plans draw description, parameters and result count from a fixed
//! per-service pool using the caller's RNG, and may inject simulated
//! failures. Scenario plans are fixed scripts.

use rand::Rng;

use super::classify::{Classification, Scenario};
use crate::config::ErrorInjectionConfig;
use crate::models::{Service, ToolError, ToolErrorKind, ToolInvocation};

/// Role named in access-denied failures
pub const ACCESS_ROLE: &str = "sales-access-role";

struct MockPool {
    descriptions: &'static [&'static str],
    parameters: &'static [&'static str],
    result_counts: &'static [u32],
}

fn pool(service: Service) -> &'static MockPool {
    match service {
        Service::Salesforce => &SALESFORCE_POOL,
        Service::Notion => &NOTION_POOL,
        Service::Gdrive => &GDRIVE_POOL,
        Service::Gmail => &GMAIL_POOL,
    }
}

static SALESFORCE_POOL: MockPool = MockPool {
    descriptions: &[
        "Searched for Green and Sons on Salesforce",
        "Searched for account information in CRM",
        "Searched for deal pipeline in Salesforce",
    ],
    parameters: &[
        "company: Acme Corp, stage: all",
        "account: Green and Sons, status: active",
        "opportunity: $100K+, close date: Q2 2025",
    ],
    result_counts: &[2, 3, 5, 1, 4],
};

static NOTION_POOL: MockPool = MockPool {
    descriptions: &[
        "Searched for documents in Notion workspace",
        "Searched for meeting notes and project docs",
        "Searched for knowledge base entries",
    ],
    parameters: &[
        "title: Acme Corp, type: all documents",
        "tags: meeting-notes, project-updates",
        "date: last 30 days, team: sales",
    ],
    result_counts: &[3, 7, 4, 2, 6],
};

static GDRIVE_POOL: MockPool = MockPool {
    descriptions: &[
        "Searched files in Google Drive",
        "Searched for shared documents and presentations",
        "Searched for file activity and permissions",
    ],
    parameters: &[
        "name: proposal, type: documents",
        "owner: sales team, modified: last week",
        "folder: client-docs, shared: yes",
    ],
    result_counts: &[3, 4, 2, 5, 1],
};

static GMAIL_POOL: MockPool = MockPool {
    descriptions: &[
        "Searched messages",
        "Searched for recent email threads",
        "Searched for contact history",
    ],
    parameters: &[
        "from: acme.com, subject: proposal",
        "to: sales@company.com, date: last month",
        "thread: client-communication",
    ],
    result_counts: &[5, 3, 8, 4, 7],
};

fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

/// Plan the tool invocations for a classified query.
///
/// All invocations start `pending` and expanded, with ids `tool-{index}`.
pub fn plan_tool_invocations<R: Rng>(
    classification: &Classification,
    query: &str,
    errors: &ErrorInjectionConfig,
    rng: &mut R,
) -> Vec<ToolInvocation> {
    match classification.scenario() {
        Some(Scenario::NotionPrdUpdate) => notion_prd_update_sequence(),
        Some(Scenario::SalesforceAtRisk) => {
            salesforce_at_risk_sequence(errors.mentions_access(query))
        }
        None => generic_sequence(&classification.services, query, errors, rng),
    }
}

fn notion_prd_update_sequence() -> Vec<ToolInvocation> {
    vec![
        ToolInvocation::new(
            0,
            "search",
            "Searched for Venn PRD in Notion workspace",
            r#"query: "Venn PRD", query_type: "internal""#,
            3,
        ),
        ToolInvocation::new(
            1,
            "fetch",
            "Fetched Venn PRD 2.0 document content",
            r#"document_id: "abc123", include_content: true"#,
            1,
        ),
        ToolInvocation::new(
            2,
            "update-page",
            "Updated Venn PRD 2.0 with collaboration details",
            r#"page_id: "abc123", section: "Version V2", content: "Moda Labs is helping!""#,
            1,
        ),
    ]
}

fn salesforce_at_risk_sequence(access_denied: bool) -> Vec<ToolInvocation> {
    let search = ToolInvocation::new(
        0,
        "salesforce-search",
        "Searched for at-risk opportunities in Salesforce",
        "stage: all, risk_level: high, status: active",
        3,
    );
    let mut update = ToolInvocation::new(
        1,
        "salesforce-update",
        "Updated opportunity close dates to next month",
        "opportunities: 3 records, close_date: next_month",
        3,
    );
    if access_denied {
        update = update.with_error(ToolError {
            kind: ToolErrorKind::Access,
            message: format!(
                "Access denied: Unable to update opportunities with role \"{ACCESS_ROLE}\". \
                 You need elevated permissions to modify opportunity close dates. \
                 Contact your Salesforce administrator to request update access for \
                 opportunity records."
            ),
            code: None,
            role: Some(ACCESS_ROLE.to_string()),
        });
    }
    vec![search, update]
}

fn generic_sequence<R: Rng>(
    services: &[String],
    query: &str,
    errors: &ErrorInjectionConfig,
    rng: &mut R,
) -> Vec<ToolInvocation> {
    let error_kind = errors.kind_for(query);
    let probability = if errors.probability.is_finite() {
        errors.probability.clamp(0.0, 1.0)
    } else {
        0.0
    };

    services
        .iter()
        .filter_map(|id| Service::from_id(id))
        .enumerate()
        .map(|(index, service)| {
            let pool = pool(service);
            let tool = ToolInvocation::new(
                index,
                service.id(),
                *pick(rng, pool.descriptions),
                *pick(rng, pool.parameters),
                *pick(rng, pool.result_counts),
            );
            match error_kind {
                Some(kind) if rng.random_bool(probability) => {
                    tool.with_error(simulated_error(kind, service, rng))
                }
                _ => tool,
            }
        })
        .collect()
}

fn simulated_error<R: Rng>(
    kind: ToolErrorKind,
    service: Service,
    rng: &mut R,
) -> ToolError {
    let name = service.id();
    match kind {
        ToolErrorKind::Platform => ToolError {
            kind,
            message: format!(
                "Platform access constraint: Venn AI is not authorized to access {name}. \
                 This service is restricted by enterprise security policies and cannot be \
                 accessed by automated systems."
            ),
            code: None,
            role: None,
        },
        ToolErrorKind::Access => ToolError {
            kind,
            message: format!(
                "Access denied: Unable to access {name} with role \"{ACCESS_ROLE}\". \
                 Contact your system administrator to address access concerns."
            ),
            code: None,
            role: Some(ACCESS_ROLE.to_string()),
        },
        ToolErrorKind::Runtime => {
            let code = rng.random_range(1000..=9999);
            ToolError {
                kind,
                message: format!(
                    "Failed to complete search in {name}. Error code: {code}. The agent \
                     attempted to perform the task but was unable to connect to the service."
                ),
                code: Some(format!("ERR_{code}")),
                role: None,
            }
        }
    }
}
