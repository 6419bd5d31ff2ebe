use crate::errors::BridgeResult;
use serde::{Deserialize, Serialize};

/// Result envelope returned to the UI, both over HTTP and from bridge calls.
///
/// Serializes as `{"success":true,"data":...}` or
/// `{"success":false,"error":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    pub fn ok(data: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl From<BridgeResult<String>> for BridgeResponse {
    fn from(result: BridgeResult<String>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoMode {
    #[default]
    Text,
    Binary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IoOptions {
    pub mode: IoMode,
}

/// Body of `POST /bridge/fs/read` and `POST /bridge/fs/write`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoRequest {
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub options: IoOptions,
}

/// Partial update of the tray; empty fields leave the tray untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrayContent {
    pub icon: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemKind {
    #[default]
    Item,
    Radio,
    Separator,
    #[serde(other)]
    Unknown,
}

/// Menu description sent by the UI on every `UpdateTrayMenus` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuItem {
    pub id: String,
    pub text: String,
    pub tooltip: String,
    #[serde(rename = "type")]
    pub kind: MenuItemKind,
    pub checked: bool,
    pub hidden: bool,
    pub children: Vec<MenuItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BridgeError;

    #[test]
    fn error_envelope_has_no_data_field() {
        let json = serde_json::to_string(&BridgeResponse::error("boom")).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"boom"}"#);
    }

    #[test]
    fn ok_envelope_has_no_error_field() {
        let json = serde_json::to_string(&BridgeResponse::ok("Success")).unwrap();
        assert_eq!(json, r#"{"success":true,"data":"Success"}"#);
    }

    #[test]
    fn result_converts_to_envelope() {
        let failed: BridgeResult<String> = Err(BridgeError::InvalidInput("nope".into()));
        let response = BridgeResponse::from(failed);
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Invalid input: nope"));
    }

    #[test]
    fn io_request_defaults_content_and_options() {
        let request: IoRequest = serde_json::from_str(r#"{"path":"data/a.txt"}"#).unwrap();
        assert_eq!(request.content, "");
        assert_eq!(request.options.mode, IoMode::Text);

        let request: IoRequest =
            serde_json::from_str(r#"{"path":"a","options":{"mode":"Binary"}}"#).unwrap();
        assert_eq!(request.options.mode, IoMode::Binary);
    }

    #[test]
    fn menu_item_type_defaults_to_item_and_tolerates_unknown() {
        let items: Vec<MenuItem> = serde_json::from_str(
            r#"[{"id":"a"},{"id":"b","type":"separator"},{"id":"c","type":"checkbox"}]"#,
        )
        .unwrap();
        assert_eq!(items[0].kind, MenuItemKind::Item);
        assert_eq!(items[1].kind, MenuItemKind::Separator);
        assert_eq!(items[2].kind, MenuItemKind::Unknown);
    }
}
