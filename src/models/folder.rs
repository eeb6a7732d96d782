//! Scan folders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: u64,
    pub name: String,
    /// `main`, `trash` or `custom`.
    #[serde(rename = "type", default)]
    pub folder_type: Option<String>,
    #[serde(default)]
    pub default_tag: Option<u8>,
    #[serde(default)]
    pub custom: Option<u8>,
    #[serde(default)]
    pub unread_count: Option<u64>,
}

impl Folder {
    pub fn is_trash(&self) -> bool {
        self.folder_type.as_deref() == Some("trash")
    }

    pub fn is_main(&self) -> bool {
        self.folder_type.as_deref() == Some("main")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderList {
    #[serde(default)]
    pub folders: Vec<Folder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FolderCreated {
    pub id: u64,
}
