//! Scan and policy templates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cloud_only: Option<bool>,
    #[serde(default)]
    pub subscription_only: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateList {
    #[serde(default)]
    pub templates: Vec<Template>,
}

impl TemplateList {
    /// Template whose `name` or `title` matches.
    pub fn find(&self, name: &str) -> Option<&Template> {
        self.templates
            .iter()
            .find(|t| t.name == name || t.title.as_deref() == Some(name))
    }
}
