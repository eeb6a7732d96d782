//! Typed request and response bodies.
//!
//! Only the fields the SDK acts on are typed. Record types exported in bulk
//! keep everything else in an `extra` side map; other types ignore unknown
//! fields.

mod editor;
mod export;
mod file;
mod folder;
mod policy;
mod scan;
mod workbench;

pub use editor::{Template, TemplateList};
pub use export::{
    AssetRecord, AssetsExportFilters, AssetsExportRequest, ExportJobStatus, ExportStatus,
    ExportUuid, VulnAsset, VulnPlugin, VulnerabilityRecord, VulnsExportFilters,
    VulnsExportRequest,
};
pub use file::{FileExportStatus, FileId, FileRef};
pub use folder::{Folder, FolderCreated, FolderList};
pub use policy::{
    Policy, PolicyCopy, PolicyCreateRequest, PolicyCreated, PolicyDetails, PolicyList,
    PolicySettings,
};
pub use scan::{
    ExportFormat, PENDING_STATUSES, STOPPED_STATUSES, Scan, ScanCreateRequest, ScanCreated,
    ScanDetails, ScanExportRequest, ScanHistory, ScanInfo, ScanLaunchRequest, ScanLaunched,
    ScanList, ScanSettings, ScanStatus,
};
pub use workbench::{WorkbenchExportOptions, WorkbenchFilter};
