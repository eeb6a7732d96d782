//! Policy workflows.

use log::info;

use crate::api::TemplateKind;
use crate::client::TenableIoClient;
use crate::error::{Error, Result};
use crate::models::{PolicyCreateRequest, PolicyDetails, PolicySettings, Template};

pub struct PolicyHelper {
    client: TenableIoClient,
}

impl PolicyHelper {
    pub(crate) fn new(client: TenableIoClient) -> Self {
        Self { client }
    }

    /// Policies, optionally filtered by exact name.
    pub fn policies(&self, name: Option<&str>) -> Result<Vec<PolicyRef>> {
        Ok(self
            .client
            .policies_api()
            .list()?
            .into_policies()
            .into_iter()
            .filter(|policy| name.is_none_or(|name| policy.name == name))
            .map(|policy| PolicyRef::new(self.client.clone(), policy.id))
            .collect())
    }

    pub fn id(&self, id: u64) -> PolicyRef {
        PolicyRef::new(self.client.clone(), id)
    }

    /// Create a policy from the named policy template.
    pub fn create(&self, name: &str, template: &str) -> Result<PolicyRef> {
        let template = self.template(template)?;
        let request = PolicyCreateRequest {
            uuid: template.uuid,
            settings: PolicySettings {
                name: name.to_string(),
                description: None,
            },
        };
        let created = self.client.policies_api().create(&request)?;
        info!("Created policy {} ({})", created.policy_id, name);
        Ok(PolicyRef::new(self.client.clone(), created.policy_id))
    }

    /// Policy template by name or title.
    pub fn template(&self, name: &str) -> Result<Template> {
        self.client
            .editor_api()
            .templates(TemplateKind::Policy)?
            .find(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("policy template '{}'", name)))
    }
}

/// Handle on one scan policy.
#[derive(Debug, Clone)]
pub struct PolicyRef {
    client: TenableIoClient,
    id: u64,
}

impl PolicyRef {
    pub fn new(client: TenableIoClient, id: u64) -> Self {
        Self { client, id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn details(&self) -> Result<PolicyDetails> {
        self.client.policies_api().details(self.id)
    }

    pub fn name(&self) -> Result<String> {
        self.details()?
            .name()
            .map(str::to_string)
            .ok_or_else(|| Error::NotFound(format!("name of policy {}", self.id)))
    }

    pub fn copy(&self) -> Result<PolicyRef> {
        let copy = self.client.policies_api().copy(self.id)?;
        Ok(PolicyRef::new(self.client.clone(), copy.id))
    }

    pub fn delete(&self) -> Result<()> {
        self.client.policies_api().delete(self.id)
    }
}
