//! File handles returned by export requests.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a server-side generated file. The service sends it either
/// as a number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FileId(pub String);

impl<'de> Deserialize<'de> for FileId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => FileId(n.to_string()),
            Raw::Text(s) => FileId(s),
        })
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `{"file": ...}` answer to an export request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileRef {
    pub file: FileId,
}

/// Readiness of a scan or workbench export.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileExportStatus {
    pub status: String,
}

impl FileExportStatus {
    pub fn is_ready(&self) -> bool {
        self.status.eq_ignore_ascii_case("ready")
    }
}
