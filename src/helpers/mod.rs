//! Multi-call workflows built on the API wrappers and the poller.

mod export;
mod folder;
mod policy;
mod scan;
mod workbench;

pub use export::{CHUNK_PLACEHOLDER, ExportsHelper, chunk_path};
pub use folder::{FolderHelper, FolderRef};
pub use policy::{PolicyHelper, PolicyRef};
pub use scan::{ScanHelper, ScanRef};
pub use workbench::WorkbenchHelper;
