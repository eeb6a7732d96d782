//! Scan policies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub template_uuid: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyList {
    #[serde(default)]
    pub policies: Option<Vec<Policy>>,
}

impl PolicyList {
    pub fn into_policies(self) -> Vec<Policy> {
        self.policies.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PolicySettings {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `POST policies` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyCreateRequest {
    /// Template uuid.
    pub uuid: String,
    pub settings: PolicySettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PolicyCreated {
    pub policy_id: u64,
    #[serde(default)]
    pub policy_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PolicyCopy {
    pub id: u64,
    pub name: String,
}

/// `GET policies/{policy_id}` response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PolicyDetails {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

impl PolicyDetails {
    pub fn name(&self) -> Option<&str> {
        self.settings.get("name").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_name_from_settings() {
        let details: PolicyDetails = serde_json::from_str(
            r#"{"uuid": "tpl", "settings": {"name": "web apps", "discovery_mode": "Port scan"}, "plugins": {}}"#,
        )
        .unwrap();
        assert_eq!(details.name(), Some("web apps"));
        assert_eq!(details.settings["discovery_mode"], "Port scan");
    }

    #[test]
    fn test_null_policy_list() {
        let list: PolicyList = serde_json::from_str(r#"{"policies": null}"#).unwrap();
        assert!(list.into_policies().is_empty());
    }
}
