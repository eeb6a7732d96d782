//! Bulk export API for vulnerabilities and assets.
//!
//! Both kinds share the same three endpoints under a different prefix:
//! request a job, poll its status, fetch chunks by id.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::TenableIoClient;
use crate::error::Result;
use crate::http::ApiRequest;
use crate::models::{
    AssetRecord, AssetsExportRequest, ExportStatus, ExportUuid, VulnerabilityRecord,
    VulnsExportRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Vulns,
    Assets,
}

impl ExportKind {
    fn prefix(self) -> &'static str {
        match self {
            ExportKind::Vulns => "vulns",
            ExportKind::Assets => "assets",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Exports API client.
pub struct ExportsApi {
    client: TenableIoClient,
}

impl ExportsApi {
    pub(crate) fn new(client: TenableIoClient) -> Self {
        Self { client }
    }

    pub fn vulns_request(&self, request: &VulnsExportRequest) -> Result<ExportUuid> {
        self.request(ExportKind::Vulns, request)
    }

    pub fn vulns_chunk(&self, export_uuid: &str, chunk_id: u32) -> Result<Vec<VulnerabilityRecord>> {
        self.chunk(ExportKind::Vulns, export_uuid, chunk_id)
    }

    pub fn assets_request(&self, request: &AssetsExportRequest) -> Result<ExportUuid> {
        self.request(ExportKind::Assets, request)
    }

    pub fn assets_chunk(&self, export_uuid: &str, chunk_id: u32) -> Result<Vec<AssetRecord>> {
        self.chunk(ExportKind::Assets, export_uuid, chunk_id)
    }

    /// Start an export job.
    pub fn request<B: Serialize + ?Sized>(&self, kind: ExportKind, body: &B) -> Result<ExportUuid> {
        let request = ApiRequest::post(format!("{}/export", kind)).json(body)?;
        self.client.http().json(&request)
    }

    pub fn status(&self, kind: ExportKind, export_uuid: &str) -> Result<ExportStatus> {
        let request = ApiRequest::get(format!("{}/export/{{export_uuid}}/status", kind))
            .path("export_uuid", export_uuid);
        self.client.http().json(&request)
    }

    /// One chunk of records, decoded.
    pub fn chunk<T: DeserializeOwned>(
        &self,
        kind: ExportKind,
        export_uuid: &str,
        chunk_id: u32,
    ) -> Result<Vec<T>> {
        self.client
            .http()
            .json(&chunk_request(kind, export_uuid, chunk_id))
    }

    /// One chunk written verbatim to `path`. Returns the bytes written.
    pub fn chunk_download(
        &self,
        kind: ExportKind,
        export_uuid: &str,
        chunk_id: u32,
        path: &Path,
    ) -> Result<u64> {
        self.client
            .http()
            .download_to(&chunk_request(kind, export_uuid, chunk_id), path)
    }
}

fn chunk_request(kind: ExportKind, export_uuid: &str, chunk_id: u32) -> ApiRequest {
    ApiRequest::get(format!("{}/export/{{export_uuid}}/chunks/{{chunk_id}}", kind))
        .path("export_uuid", export_uuid)
        .path("chunk_id", chunk_id)
}
