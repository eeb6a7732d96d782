//! Folders API.

use serde_json::json;

use crate::client::TenableIoClient;
use crate::error::Result;
use crate::http::ApiRequest;
use crate::models::{FolderCreated, FolderList};

/// Folders API client.
pub struct FoldersApi {
    client: TenableIoClient,
}

impl FoldersApi {
    pub(crate) fn new(client: TenableIoClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<FolderList> {
        self.client.http().json(&ApiRequest::get("folders"))
    }

    pub fn create(&self, name: &str) -> Result<FolderCreated> {
        let request = ApiRequest::post("folders").json(&json!({ "name": name }))?;
        self.client.http().json(&request)
    }

    /// Rename a folder.
    pub fn edit(&self, folder_id: u64, name: &str) -> Result<()> {
        let request = ApiRequest::put("folders/{folder_id}")
            .path("folder_id", folder_id)
            .json(&json!({ "name": name }))?;
        self.client.http().send_empty(&request)
    }

    pub fn delete(&self, folder_id: u64) -> Result<()> {
        self.client
            .http()
            .send_empty(&ApiRequest::delete("folders/{folder_id}").path("folder_id", folder_id))
    }
}
