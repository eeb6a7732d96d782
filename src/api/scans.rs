//! Scans API.

use std::path::Path;

use serde_json::{Map, Value, json};

use crate::client::TenableIoClient;
use crate::error::Result;
use crate::http::ApiRequest;
use crate::models::{
    FileExportStatus, FileId, FileRef, Scan, ScanCreateRequest, ScanCreated, ScanDetails,
    ScanExportRequest, ScanLaunchRequest, ScanLaunched, ScanList,
};

/// Scans API client.
pub struct ScansApi {
    client: TenableIoClient,
}

impl ScansApi {
    pub(crate) fn new(client: TenableIoClient) -> Self {
        Self { client }
    }

    /// List scans, optionally restricted to one folder.
    pub fn list(&self, folder_id: Option<u64>) -> Result<ScanList> {
        let mut request = ApiRequest::get("scans");
        if let Some(folder_id) = folder_id {
            request = request.query_pair("folder_id", folder_id);
        }
        self.client.http().json(&request)
    }

    /// Scan details, for the latest run or for `history_id`.
    pub fn details(&self, scan_id: u64, history_id: Option<u64>) -> Result<ScanDetails> {
        let mut request = ApiRequest::get("scans/{scan_id}").path("scan_id", scan_id);
        if let Some(history_id) = history_id {
            request = request.query_pair("history_id", history_id);
        }
        self.client.http().json(&request)
    }

    pub fn create(&self, request: &ScanCreateRequest) -> Result<ScanCreated> {
        self.client
            .http()
            .json(&ApiRequest::post("scans").json(request)?)
    }

    /// Replace the given settings of a scan.
    pub fn configure(&self, scan_id: u64, settings: &Map<String, Value>) -> Result<()> {
        let request = ApiRequest::put("scans/{scan_id}")
            .path("scan_id", scan_id)
            .json(&json!({ "settings": settings }))?;
        self.client.http().send_empty(&request)
    }

    pub fn launch(&self, scan_id: u64, request: &ScanLaunchRequest) -> Result<ScanLaunched> {
        let request = ApiRequest::post("scans/{scan_id}/launch")
            .path("scan_id", scan_id)
            .json(request)?;
        self.client.http().json(&request)
    }

    pub fn pause(&self, scan_id: u64) -> Result<()> {
        self.action(scan_id, "pause")
    }

    pub fn resume(&self, scan_id: u64) -> Result<()> {
        self.action(scan_id, "resume")
    }

    pub fn stop(&self, scan_id: u64) -> Result<()> {
        self.action(scan_id, "stop")
    }

    pub fn delete(&self, scan_id: u64) -> Result<()> {
        self.client
            .http()
            .send_empty(&ApiRequest::delete("scans/{scan_id}").path("scan_id", scan_id))
    }

    /// Duplicate a scan; returns the copy.
    pub fn copy(&self, scan_id: u64) -> Result<Scan> {
        self.client
            .http()
            .json(&ApiRequest::post("scans/{scan_id}/copy").path("scan_id", scan_id))
    }

    /// Move a scan into another folder.
    pub fn set_folder(&self, scan_id: u64, folder_id: u64) -> Result<()> {
        let request = ApiRequest::put("scans/{scan_id}/folder")
            .path("scan_id", scan_id)
            .json(&json!({ "folder_id": folder_id }))?;
        self.client.http().send_empty(&request)
    }

    /// Ask the server to render a report for one run of the scan.
    pub fn export_request(
        &self,
        scan_id: u64,
        history_id: Option<u64>,
        export: &ScanExportRequest,
    ) -> Result<FileRef> {
        let mut request = ApiRequest::post("scans/{scan_id}/export").path("scan_id", scan_id);
        if let Some(history_id) = history_id {
            request = request.query_pair("history_id", history_id);
        }
        self.client.http().json(&request.json(export)?)
    }

    pub fn export_status(&self, scan_id: u64, file_id: &FileId) -> Result<FileExportStatus> {
        let request = ApiRequest::get("scans/{scan_id}/export/{file_id}/status")
            .path("scan_id", scan_id)
            .path("file_id", file_id);
        self.client.http().json(&request)
    }

    /// Download a rendered report to `path`. Returns the bytes written.
    pub fn export_download(&self, scan_id: u64, file_id: &FileId, path: &Path) -> Result<u64> {
        let request = ApiRequest::get("scans/{scan_id}/export/{file_id}/download")
            .path("scan_id", scan_id)
            .path("file_id", file_id);
        self.client.http().download_to(&request, path)
    }

    fn action(&self, scan_id: u64, action: &str) -> Result<()> {
        let request = ApiRequest::post(format!("scans/{{scan_id}}/{}", action))
            .path("scan_id", scan_id);
        self.client.http().send_empty(&request)
    }
}
