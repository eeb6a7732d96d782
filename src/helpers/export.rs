//! Bulk vulnerability and asset exports.
//!
//! An export is a server-side job: request it, poll its status until it is
//! `FINISHED`, then fetch the chunks it reports in the order reported. A
//! chunk that fails to download fails the whole export.

use std::path::PathBuf;

use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use crate::api::ExportKind;
use crate::client::TenableIoClient;
use crate::error::{Error, Result};
use crate::models::{
    AssetRecord, AssetsExportRequest, ExportJobStatus, VulnerabilityRecord, VulnsExportRequest,
};
use crate::poll::{PollOutcome, PollPolicy};

/// Token replaced by the chunk id in destination paths.
pub const CHUNK_PLACEHOLDER: &str = "{chunk_id}";

/// Destination of one chunk. A template without [`CHUNK_PLACEHOLDER`] gets
/// `_{chunk_id}` appended so chunks never share a file.
pub fn chunk_path(template: &str, chunk_id: u32) -> PathBuf {
    let id = chunk_id.to_string();
    if template.contains(CHUNK_PLACEHOLDER) {
        PathBuf::from(template.replace(CHUNK_PLACEHOLDER, &id))
    } else {
        PathBuf::from(format!("{}_{}", template, id))
    }
}

pub struct ExportsHelper {
    client: TenableIoClient,
}

impl ExportsHelper {
    pub(crate) fn new(client: TenableIoClient) -> Self {
        Self { client }
    }

    /// Export vulnerabilities and collect every record in memory.
    pub fn download_vulns(&self, request: &VulnsExportRequest) -> Result<Vec<VulnerabilityRecord>> {
        let export_uuid = self.client.exports_api().vulns_request(request)?.export_uuid;
        self.collect(ExportKind::Vulns, &export_uuid)
    }

    /// Export vulnerabilities, writing each chunk to a path derived from
    /// `path_template`. Returns the chunk ids written.
    pub fn download_vulns_to(
        &self,
        request: &VulnsExportRequest,
        path_template: &str,
    ) -> Result<Vec<u32>> {
        let export_uuid = self.client.exports_api().vulns_request(request)?.export_uuid;
        self.write_chunks(ExportKind::Vulns, &export_uuid, path_template)
    }

    pub fn download_assets(&self, request: &AssetsExportRequest) -> Result<Vec<AssetRecord>> {
        let export_uuid = self.client.exports_api().assets_request(request)?.export_uuid;
        self.collect(ExportKind::Assets, &export_uuid)
    }

    pub fn download_assets_to(
        &self,
        request: &AssetsExportRequest,
        path_template: &str,
    ) -> Result<Vec<u32>> {
        let export_uuid = self.client.exports_api().assets_request(request)?.export_uuid;
        self.write_chunks(ExportKind::Assets, &export_uuid, path_template)
    }

    /// Polls the job until it ends. Returns the available chunk ids.
    pub fn wait_for_chunks(&self, kind: ExportKind, export_uuid: &str) -> Result<Vec<u32>> {
        let api = self.client.exports_api();
        let poller = self.client.poller();
        let policy = PollPolicy::unbounded(poller.interval());

        let status = match poller.poll(
            &policy,
            || api.status(kind, export_uuid),
            |status| status.status.is_terminal(),
        )? {
            PollOutcome::Ready(status) => status,
            PollOutcome::TimedOut { last, .. } => last,
        };

        if status.status == ExportJobStatus::Error {
            return Err(Error::ExportFailed {
                export_uuid: export_uuid.to_string(),
                status: status.status.to_string(),
            });
        }
        if !status.chunks_failed.is_empty() {
            warn!(
                "{} export {} reports failed chunks {:?}",
                kind, export_uuid, status.chunks_failed
            );
        }
        debug!(
            "{} export {} finished with chunks {:?}",
            kind, export_uuid, status.chunks_available
        );
        Ok(status.chunks_available)
    }

    fn collect<T: DeserializeOwned>(&self, kind: ExportKind, export_uuid: &str) -> Result<Vec<T>> {
        let api = self.client.exports_api();
        let mut records = Vec::new();
        for chunk_id in self.wait_for_chunks(kind, export_uuid)? {
            let chunk: Vec<T> = api.chunk(kind, export_uuid, chunk_id)?;
            debug!("Chunk {} of {} export: {} records", chunk_id, kind, chunk.len());
            records.extend(chunk);
        }
        info!("Exported {} {} records", records.len(), kind);
        Ok(records)
    }

    fn write_chunks(&self, kind: ExportKind, export_uuid: &str, template: &str) -> Result<Vec<u32>> {
        let api = self.client.exports_api();
        let chunks = self.wait_for_chunks(kind, export_uuid)?;
        for &chunk_id in &chunks {
            let path = chunk_path(template, chunk_id);
            api.chunk_download(kind, export_uuid, chunk_id, &path)?;
            info!("Wrote {} chunk {} to {}", kind, chunk_id, path.display());
        }
        Ok(chunks)
    }
}
