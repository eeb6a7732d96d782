//! Workbenches API.

use std::path::Path;

use crate::client::TenableIoClient;
use crate::error::Result;
use crate::http::ApiRequest;
use crate::models::{FileExportStatus, FileId, FileRef, WorkbenchExportOptions};

/// Workbenches API client.
pub struct WorkbenchesApi {
    client: TenableIoClient,
}

impl WorkbenchesApi {
    pub(crate) fn new(client: TenableIoClient) -> Self {
        Self { client }
    }

    /// Ask the server to render a workbench report.
    pub fn export_request(&self, options: &WorkbenchExportOptions) -> Result<FileRef> {
        let request = ApiRequest::get("workbenches/export").query(options)?;
        self.client.http().json(&request)
    }

    pub fn export_status(&self, file_id: &FileId) -> Result<FileExportStatus> {
        let request =
            ApiRequest::get("workbenches/export/{file_id}/status").path("file_id", file_id);
        self.client.http().json(&request)
    }

    /// Download a rendered report to `path`. Returns the bytes written.
    pub fn export_download(&self, file_id: &FileId, path: &Path) -> Result<u64> {
        let request =
            ApiRequest::get("workbenches/export/{file_id}/download").path("file_id", file_id);
        self.client.http().download_to(&request, path)
    }
}
