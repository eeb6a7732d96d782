//! Editor API: templates for new scans and policies.

use std::fmt;

use crate::client::TenableIoClient;
use crate::error::Result;
use crate::http::ApiRequest;
use crate::models::TemplateList;

/// Which family of templates to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Scan,
    Policy,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Scan => f.write_str("scan"),
            TemplateKind::Policy => f.write_str("policy"),
        }
    }
}

/// Editor API client.
pub struct EditorApi {
    client: TenableIoClient,
}

impl EditorApi {
    pub(crate) fn new(client: TenableIoClient) -> Self {
        Self { client }
    }

    pub fn templates(&self, kind: TemplateKind) -> Result<TemplateList> {
        self.client
            .http()
            .json(&ApiRequest::get("editor/{type}/templates").path("type", kind))
    }
}
