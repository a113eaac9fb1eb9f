use serde::{Deserialize, Serialize};

use super::service::Service;

/// Lifecycle status of a simulated tool invocation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    /// Planned but not started
    #[default]
    Pending,
    /// Tool is "running"
    Loading,
    /// Tool finished with results
    Completed,
    /// Tool settled on its simulated failure
    Error,
}

impl ToolStatus {
    /// Completed or error; neither ever changes again.
    pub fn is_resolved(self) -> bool {
        matches!(self, ToolStatus::Completed | ToolStatus::Error)
    }
}

/// Flavour of a simulated tool failure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ToolErrorKind {
    /// Generic connection failure with an error code
    Runtime,
    /// Permission denial naming a role
    Access,
    /// Enterprise policy forbids automated access
    Platform,
}

/// Simulated failure attached to a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolError {
    #[serde(rename = "type")]
    pub kind: ToolErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A simulated call to one enterprise data source.
///
/// The error record is part of the plan: an invocation that carries one is
/// created with `result_count == 0` and settles at [`ToolStatus::Error`]
/// instead of [`ToolStatus::Completed`].
///
/// So `error` being present does not imply `status == Error` while the
/// invocation is still pending or loading. "`error` is set if and only if the
/// status is `Error`" only holds once [`ToolStatus::is_resolved`] is true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    /// Stable id within a thought process (`tool-{index}`)
    pub id: String,
    /// Service id or scripted tool name (e.g. "gmail", "update-page")
    pub tool_name: String,
    /// Human-readable summary of what was searched or changed
    pub description: String,
    /// Free-text parameters shown on the card
    pub parameters: String,
    /// Number of results; always 0 for failing invocations
    pub result_count: u32,
    pub status: ToolStatus,
    /// Whether the card is expanded
    pub is_expanded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolInvocation {
    /// Create a pending, expanded invocation at position `index`.
    pub fn new(
        index: usize,
        tool_name: impl Into<String>,
        description: impl Into<String>,
        parameters: impl Into<String>,
        result_count: u32,
    ) -> Self {
        Self {
            id: format!("tool-{index}"),
            tool_name: tool_name.into(),
            description: description.into(),
            parameters: parameters.into(),
            result_count,
            status: ToolStatus::Pending,
            is_expanded: true,
            error: None,
        }
    }

    /// Attach a simulated failure. Zeroes the result count.
    pub fn with_error(mut self, error: ToolError) -> Self {
        self.result_count = 0;
        self.error = Some(error);
        self
    }

    /// Whether this invocation is planned to fail
    pub fn will_fail(&self) -> bool {
        self.error.is_some()
    }

    /// Card title: the service display name, or the raw tool name for
    /// scripted tools.
    pub fn title(&self) -> &str {
        Service::from_id(&self.tool_name)
            .map(Service::display_name)
            .unwrap_or(self.tool_name.as_str())
    }

    /// "3 results" / "1 result" once completed, empty otherwise.
    pub fn result_text(&self) -> String {
        if self.status != ToolStatus::Completed {
            return String::new();
        }
        let plural = if self.result_count == 1 { "" } else { "s" };
        format!("{} result{}", self.result_count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_invocation_is_pending_and_expanded() {
        let tool = ToolInvocation::new(2, "gmail", "Searched messages", "thread: x", 5);
        assert_eq!(tool.id, "tool-2");
        assert_eq!(tool.status, ToolStatus::Pending);
        assert!(tool.is_expanded);
        assert!(!tool.will_fail());
    }

    #[test]
    fn test_with_error_zeroes_result_count() {
        let tool = ToolInvocation::new(0, "gdrive", "d", "p", 4).with_error(ToolError {
            kind: ToolErrorKind::Runtime,
            message: "boom".to_string(),
            code: Some("ERR_1234".to_string()),
            role: None,
        });
        assert_eq!(tool.result_count, 0);
        assert!(tool.will_fail());
    }

    #[test]
    fn test_planned_error_present_before_resolution() {
        let mut tool = ToolInvocation::new(0, "gmail", "d", "p", 2).with_error(ToolError {
            kind: ToolErrorKind::Platform,
            message: "blocked".to_string(),
            code: None,
            role: None,
        });
        for status in [ToolStatus::Pending, ToolStatus::Loading] {
            tool.status = status;
            assert!(tool.error.is_some());
            assert!(!tool.status.is_resolved());
        }
        tool.status = ToolStatus::Error;
        assert_eq!(tool.error.is_some(), tool.status == ToolStatus::Error);
    }

    #[test]
    fn test_title_uses_display_name() {
        let tool = ToolInvocation::new(0, "gdrive", "d", "p", 1);
        assert_eq!(tool.title(), "Google Drive");
        let scripted = ToolInvocation::new(0, "update-page", "d", "p", 1);
        assert_eq!(scripted.title(), "update-page");
    }

    #[test]
    fn test_result_text() {
        let mut tool = ToolInvocation::new(0, "notion", "d", "p", 1);
        assert_eq!(tool.result_text(), "");
        tool.status = ToolStatus::Completed;
        assert_eq!(tool.result_text(), "1 result");
        tool.result_count = 7;
        assert_eq!(tool.result_text(), "7 results");
    }

    #[test]
    fn test_serialization_shape() {
        let tool = ToolInvocation::new(1, "salesforce-update", "d", "p", 3).with_error(ToolError {
            kind: ToolErrorKind::Access,
            message: "denied".to_string(),
            code: None,
            role: Some("sales-access-role".to_string()),
        });
        let json = serde_json::to_string(&tool).expect("Failed to serialize");
        assert!(json.contains("\"toolName\":\"salesforce-update\""));
        assert!(json.contains("\"resultCount\":0"));
        assert!(json.contains("\"isExpanded\":true"));
        assert!(json.contains("\"status\":\"pending\""));
        assert!(json.contains("\"type\":\"access\""));
        assert!(!json.contains("\"code\""));
    }
}
