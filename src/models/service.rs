//! Enterprise services a user can point the assistant at.

use serde::{Deserialize, Serialize};

/// A known enterprise data source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Salesforce,
    Notion,
    Gdrive,
    Gmail,
}

impl Service {
    /// All services, in selector order.
    pub const ALL: [Service; 4] = [
        Service::Salesforce,
        Service::Notion,
        Service::Gdrive,
        Service::Gmail,
    ];

    /// Parse a wire identifier ("salesforce", "gdrive", ...).
    pub fn from_id(id: &str) -> Option<Service> {
        match id {
            "salesforce" => Some(Service::Salesforce),
            "notion" => Some(Service::Notion),
            "gdrive" => Some(Service::Gdrive),
            "gmail" => Some(Service::Gmail),
            _ => None,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Service::Salesforce => "salesforce",
            Service::Notion => "notion",
            Service::Gdrive => "gdrive",
            Service::Gmail => "gmail",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Service::Salesforce => "Salesforce",
            Service::Notion => "Notion",
            Service::Gdrive => "Google Drive",
            Service::Gmail => "Gmail",
        }
    }
}

/// Services selected when a session starts.
pub fn default_selection() -> Vec<String> {
    [Service::Salesforce, Service::Gdrive, Service::Gmail]
        .iter()
        .map(|s| s.id().to_string())
        .collect()
}
