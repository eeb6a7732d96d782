//! Policies API.

use crate::client::TenableIoClient;
use crate::error::Result;
use crate::http::ApiRequest;
use crate::models::{PolicyCopy, PolicyCreateRequest, PolicyCreated, PolicyDetails, PolicyList};

/// Policies API client.
pub struct PoliciesApi {
    client: TenableIoClient,
}

impl PoliciesApi {
    pub(crate) fn new(client: TenableIoClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<PolicyList> {
        self.client.http().json(&ApiRequest::get("policies"))
    }

    pub fn details(&self, policy_id: u64) -> Result<PolicyDetails> {
        self.client
            .http()
            .json(&ApiRequest::get("policies/{policy_id}").path("policy_id", policy_id))
    }

    pub fn create(&self, request: &PolicyCreateRequest) -> Result<PolicyCreated> {
        self.client
            .http()
            .json(&ApiRequest::post("policies").json(request)?)
    }

    pub fn copy(&self, policy_id: u64) -> Result<PolicyCopy> {
        self.client
            .http()
            .json(&ApiRequest::post("policies/{policy_id}/copy").path("policy_id", policy_id))
    }

    pub fn delete(&self, policy_id: u64) -> Result<()> {
        self.client
            .http()
            .send_empty(&ApiRequest::delete("policies/{policy_id}").path("policy_id", policy_id))
    }
}
