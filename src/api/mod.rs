//! Thin wrappers over the REST resources.
//!
//! One struct per resource, each a cheap handle on the shared
//! [`TenableIoClient`](crate::TenableIoClient). Methods map one-to-one to
//! endpoints and go through the retrying executor.

mod editor;
mod exports;
mod folders;
mod policies;
mod scans;
mod workbenches;

pub use editor::{EditorApi, TemplateKind};
pub use exports::{ExportKind, ExportsApi};
pub use folders::FoldersApi;
pub use policies::PoliciesApi;
pub use scans::ScansApi;
pub use workbenches::WorkbenchesApi;
