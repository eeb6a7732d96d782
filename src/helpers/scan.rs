//! Scan lifecycle.
//!
//! [`ScanRef`] is a handle on one remote scan: an id plus a client. It
//! never caches status. Every transition sends one request and, when asked
//! to wait, polls freshly fetched status until the scan leaves the
//! transitional state.
//!
//! ```text
//! stopped ──launch──▶ pending/initializing ──▶ running ◀──pause/resume──▶ paused
//!                                                 │
//!                                                stop
//!                                                 ▼
//!                                    stopping ──▶ canceled
//! ```

use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};

use super::folder::FolderRef;
use crate::api::TemplateKind;
use crate::client::TenableIoClient;
use crate::error::{Error, Result};
use crate::models::{
    ExportFormat, ScanCreateRequest, ScanDetails, ScanExportRequest, ScanHistory, ScanInfo,
    ScanLaunchRequest, ScanSettings, ScanStatus, Template,
};
use crate::poll::{PollOutcome, PollPolicy};

/// Scan-level workflows.
pub struct ScanHelper {
    client: TenableIoClient,
}

impl ScanHelper {
    pub(crate) fn new(client: TenableIoClient) -> Self {
        Self { client }
    }

    /// Scans, optionally filtered by exact name and by folder.
    pub fn scans(&self, name: Option<&str>, folder_id: Option<u64>) -> Result<Vec<ScanRef>> {
        let scans = self.client.scans_api().list(folder_id)?.into_scans();
        Ok(scans
            .into_iter()
            .filter(|scan| name.is_none_or(|name| scan.name == name))
            .map(|scan| {
                ScanRef::new(self.client.clone(), scan.id).with_schedule_uuid(scan.schedule_uuid)
            })
            .collect())
    }

    /// Handle on an existing scan. Makes no request.
    pub fn id(&self, id: u64) -> ScanRef {
        ScanRef::new(self.client.clone(), id)
    }

    /// Create a scan of `targets` from the named scan template.
    pub fn create(&self, name: &str, targets: &str, template: &str) -> Result<ScanRef> {
        let template = self.template(template)?;
        let request = ScanCreateRequest {
            uuid: template.uuid,
            settings: ScanSettings {
                name: name.to_string(),
                text_targets: targets.to_string(),
                ..ScanSettings::default()
            },
        };
        let created = self.client.scans_api().create(&request)?;
        info!("Created scan {} ({})", created.scan.id, name);
        Ok(ScanRef::new(self.client.clone(), created.scan.id)
            .with_schedule_uuid(created.scan.schedule_uuid))
    }

    /// Scan template by name or title.
    pub fn template(&self, name: &str) -> Result<Template> {
        self.client
            .editor_api()
            .templates(TemplateKind::Scan)?
            .find(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("scan template '{}'", name)))
    }

    /// Stop every scan that is not stopped, then wait for all of them.
    /// Returns the scans that had to be stopped.
    pub fn stop_all(&self, folder_id: Option<u64>) -> Result<Vec<ScanRef>> {
        let mut stopping = Vec::new();
        for scan in self.scans(None, folder_id)? {
            if !scan.stopped(None)? {
                scan.stop(false)?;
                stopping.push(scan);
            }
        }
        for scan in &stopping {
            scan.wait_until_stopped(None)?;
        }
        Ok(stopping)
    }
}

/// Handle on one remote scan.
#[derive(Debug, Clone)]
pub struct ScanRef {
    client: TenableIoClient,
    id: u64,
    schedule_uuid: Option<String>,
}

impl ScanRef {
    pub fn new(client: TenableIoClient, id: u64) -> Self {
        Self {
            client,
            id,
            schedule_uuid: None,
        }
    }

    pub fn with_schedule_uuid(mut self, schedule_uuid: Option<String>) -> Self {
        self.schedule_uuid = schedule_uuid;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn schedule_uuid(&self) -> Option<&str> {
        self.schedule_uuid.as_deref()
    }

    pub fn details(&self, history_id: Option<u64>) -> Result<ScanDetails> {
        self.client.scans_api().details(self.id, history_id)
    }

    /// Current status, fetched from the service.
    pub fn status(&self, history_id: Option<u64>) -> Result<ScanStatus> {
        Ok(self
            .details(history_id)?
            .info
            .status
            .unwrap_or(ScanStatus::Unknown))
    }

    pub fn stopped(&self, history_id: Option<u64>) -> Result<bool> {
        Ok(self.status(history_id)?.is_stopped())
    }

    pub fn name(&self) -> Result<String> {
        self.details(None)?
            .info
            .name
            .ok_or_else(|| Error::NotFound(format!("name of scan {}", self.id)))
    }

    pub fn histories(&self) -> Result<Vec<ScanHistory>> {
        Ok(self.details(None)?.history.unwrap_or_default())
    }

    /// Most recent run, if the scan ever ran.
    pub fn last_history(&self) -> Result<Option<ScanHistory>> {
        Ok(self
            .histories()?
            .into_iter()
            .max_by_key(|h| (h.creation_date, h.history_id)))
    }

    /// Launch the scan. With `wait`, returns once it left the pending states.
    /// Returns the uuid of the new run.
    pub fn launch(&self, wait: bool, alt_targets: Option<Vec<String>>) -> Result<String> {
        let launched = self
            .client
            .scans_api()
            .launch(self.id, &ScanLaunchRequest { alt_targets })?;
        info!("Launched scan {} (run {})", self.id, launched.scan_uuid);

        if wait {
            self.wait_while(|status| status.is_pending())?;
        }
        Ok(launched.scan_uuid)
    }

    pub fn pause(&self, wait: bool) -> Result<()> {
        self.client.scans_api().pause(self.id)?;
        if wait {
            self.wait_while(|status| status == ScanStatus::Pausing)?;
        }
        Ok(())
    }

    pub fn resume(&self, wait: bool) -> Result<()> {
        self.client.scans_api().resume(self.id)?;
        if wait {
            self.wait_while(|status| status == ScanStatus::Resuming)?;
        }
        Ok(())
    }

    pub fn stop(&self, wait: bool) -> Result<()> {
        self.client.scans_api().stop(self.id)?;
        if wait {
            self.wait_until_stopped(None)?;
        }
        Ok(())
    }

    /// Block until the scan (or the given run) is in a stopped state.
    /// Returns at once when it already is.
    pub fn wait_until_stopped(&self, history_id: Option<u64>) -> Result<()> {
        self.client
            .poller()
            .wait_until(|| self.stopped(history_id))
    }

    /// Wait up to `seconds` for the scan to stop on its own, then stop it.
    /// Returns the final status.
    pub fn wait_or_cancel_after(&self, seconds: u64) -> Result<ScanStatus> {
        let poller = self.client.poller();
        let policy = PollPolicy::bounded(poller.interval(), Duration::from_secs(seconds));

        match poller.poll(&policy, || self.status(None), |status| status.is_stopped())? {
            PollOutcome::Ready(status) => Ok(status),
            PollOutcome::TimedOut { last, waited } => {
                // the scan may have ended since the last poll; stopping it then gets a 409
                let current = self.status(None)?;
                if current.is_stopped() {
                    return Ok(current);
                }
                warn!(
                    "Scan {} still {} after {:?}, stopping it",
                    self.id, last, waited
                );
                self.stop(true)?;
                self.status(None)
            }
        }
    }

    /// Export a report of the scan (or of one run) and write it to `path`.
    /// Waits for the scan to stop first. Returns the bytes written.
    pub fn download(
        &self,
        path: &Path,
        history_id: Option<u64>,
        format: ExportFormat,
    ) -> Result<u64> {
        self.wait_until_stopped(history_id)?;

        let api = self.client.scans_api();
        let file = api
            .export_request(self.id, history_id, &ScanExportRequest::new(format))?
            .file;
        debug!("Scan {} export file {} requested", self.id, file);

        self.client
            .poller()
            .wait_until(|| Ok(api.export_status(self.id, &file)?.is_ready()))?;

        let bytes = api.export_download(self.id, &file, path)?;
        info!(
            "Downloaded {} report of scan {} to {}",
            format,
            self.id,
            path.display()
        );
        Ok(bytes)
    }

    /// Delete the scan. With `force_stop`, a scan that is still active is
    /// stopped first since the service refuses to delete it otherwise.
    pub fn delete(&self, force_stop: bool) -> Result<()> {
        if force_stop && !self.stopped(None)? {
            debug!("Stopping scan {} before deleting it", self.id);
            self.stop(true)?;
        }
        self.client.scans_api().delete(self.id)
    }

    /// Duplicate the scan.
    pub fn copy(&self) -> Result<ScanRef> {
        let scan = self.client.scans_api().copy(self.id)?;
        Ok(ScanRef::new(self.client.clone(), scan.id).with_schedule_uuid(scan.schedule_uuid))
    }

    pub fn move_to(&self, folder: &FolderRef) -> Result<()> {
        self.client.scans_api().set_folder(self.id, folder.id())
    }

    /// Folder holding the scan.
    pub fn folder(&self) -> Result<FolderRef> {
        let folder_id = self
            .details(None)?
            .info
            .folder_id
            .ok_or_else(|| Error::NotFound(format!("folder of scan {}", self.id)))?;
        Ok(FolderRef::new(self.client.clone(), folder_id))
    }

    /// Push the writable fields of `info` as the scan's settings.
    pub fn configure(&self, info: &ScanInfo) -> Result<()> {
        self.client.scans_api().configure(self.id, &info.as_payload())
    }

    fn wait_while<C>(&self, transitional: C) -> Result<()>
    where
        C: Fn(ScanStatus) -> bool,
    {
        self.client
            .poller()
            .wait_until(|| Ok(!transitional(self.status(None)?)))
    }
}
