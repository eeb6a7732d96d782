//! Workbench report downloads.

use std::path::Path;

use log::info;

use crate::client::TenableIoClient;
use crate::error::Result;
use crate::models::WorkbenchExportOptions;

pub struct WorkbenchHelper {
    client: TenableIoClient,
}

impl WorkbenchHelper {
    pub(crate) fn new(client: TenableIoClient) -> Self {
        Self { client }
    }

    /// Render a workbench report, wait until it is ready and write it to
    /// `path`. Returns the bytes written.
    pub fn download(&self, path: &Path, options: &WorkbenchExportOptions) -> Result<u64> {
        let api = self.client.workbenches_api();
        let file = api.export_request(options)?.file;

        self.client
            .poller()
            .wait_until(|| Ok(api.export_status(&file)?.is_ready()))?;

        let bytes = api.export_download(&file, path)?;
        info!(
            "Downloaded {} workbench report to {}",
            options.format,
            path.display()
        );
        Ok(bytes)
    }
}
