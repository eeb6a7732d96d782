//! Folder workflows.

use log::info;

use super::scan::{ScanHelper, ScanRef};
use crate::client::TenableIoClient;
use crate::error::{Error, Result};
use crate::models::Folder;

pub struct FolderHelper {
    client: TenableIoClient,
}

impl FolderHelper {
    pub(crate) fn new(client: TenableIoClient) -> Self {
        Self { client }
    }

    pub fn folders(&self) -> Result<Vec<FolderRef>> {
        Ok(self
            .client
            .folders_api()
            .list()?
            .folders
            .into_iter()
            .map(|folder| FolderRef::new(self.client.clone(), folder.id))
            .collect())
    }

    /// Handle on an existing folder. Makes no request.
    pub fn folder(&self, id: u64) -> FolderRef {
        FolderRef::new(self.client.clone(), id)
    }

    pub fn create(&self, name: &str) -> Result<FolderRef> {
        let created = self.client.folders_api().create(name)?;
        info!("Created folder {} ({})", created.id, name);
        Ok(FolderRef::new(self.client.clone(), created.id))
    }

    pub fn trash_folder(&self) -> Result<Option<FolderRef>> {
        self.find(Folder::is_trash)
    }

    pub fn main_folder(&self) -> Result<Option<FolderRef>> {
        self.find(Folder::is_main)
    }

    fn find(&self, predicate: impl Fn(&Folder) -> bool) -> Result<Option<FolderRef>> {
        Ok(self
            .client
            .folders_api()
            .list()?
            .folders
            .into_iter()
            .find(|folder| predicate(folder))
            .map(|folder| FolderRef::new(self.client.clone(), folder.id)))
    }
}

/// Handle on one scan folder.
#[derive(Debug, Clone)]
pub struct FolderRef {
    client: TenableIoClient,
    id: u64,
}

impl FolderRef {
    pub fn new(client: TenableIoClient, id: u64) -> Self {
        Self { client, id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The folder as listed by the service. There is no single-folder
    /// endpoint, so this scans the folder list.
    pub fn details(&self) -> Result<Folder> {
        self.client
            .folders_api()
            .list()?
            .folders
            .into_iter()
            .find(|folder| folder.id == self.id)
            .ok_or_else(|| Error::NotFound(format!("folder {}", self.id)))
    }

    pub fn name(&self) -> Result<String> {
        Ok(self.details()?.name)
    }

    pub fn scans(&self) -> Result<Vec<ScanRef>> {
        ScanHelper::new(self.client.clone()).scans(None, Some(self.id))
    }

    /// Move `scan` into this folder.
    pub fn add(&self, scan: &ScanRef) -> Result<()> {
        scan.move_to(self)
    }

    pub fn rename(&self, name: &str) -> Result<()> {
        self.client.folders_api().edit(self.id, name)
    }

    /// Stop every active scan in the folder and wait for them.
    pub fn stop_scans(&self) -> Result<Vec<ScanRef>> {
        ScanHelper::new(self.client.clone()).stop_all(Some(self.id))
    }

    pub fn delete(&self) -> Result<()> {
        self.client.folders_api().delete(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedTransport, scripted_client};

    const FOLDERS: &str = r#"{"folders": [
        {"id": 1, "name": "Trash", "type": "trash"},
        {"id": 2, "name": "My Scans", "type": "main", "default_tag": 1},
        {"id": 7, "name": "nightly", "type": "custom"}
    ]}"#;

    #[test]
    fn test_special_folders() {
        let (client, _, _) = scripted_client(
            ScriptedTransport::new()
                .respond(200, FOLDERS)
                .respond(200, FOLDERS),
        );
        let helper = client.folder_helper();

        assert_eq!(helper.trash_folder().unwrap().map(|f| f.id()), Some(1));
        assert_eq!(helper.main_folder().unwrap().map(|f| f.id()), Some(2));
    }

    #[test]
    fn test_details_of_missing_folder() {
        let (client, _, _) = scripted_client(ScriptedTransport::new().respond(200, FOLDERS));

        let err = client.folder_helper().folder(99).details().unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_rename_delete() {
        let (client, transport, _) = scripted_client(
            ScriptedTransport::new()
                .respond(200, r#"{"id": 12}"#)
                .respond(200, "")
                .respond(200, "")
                .respond(200, FOLDERS),
        );

        let folder = client.folder_helper().create("audit").unwrap();
        folder.rename("audit-2024").unwrap();
        folder.delete().unwrap();
        let all = client.folder_helper().folders().unwrap();

        assert_eq!(folder.id(), 12);
        assert_eq!(all.len(), 3);
        assert_eq!(
            transport.calls(),
            vec!["POST /folders", "PUT /folders/12", "DELETE /folders/12", "GET /folders"]
        );
        assert_eq!(
            transport.requests()[1].body,
            Some(serde_json::json!({"name": "audit-2024"}))
        );
    }

    #[test]
    fn test_scans_in_folder_and_add() {
        let (client, transport, _) = scripted_client(
            ScriptedTransport::new()
                .respond(200, r#"{"scans": [{"id": 4, "name": "a", "folder_id": 7}]}"#)
                .respond(200, ""),
        );
        let folder = client.folder_helper().folder(7);

        let scans = folder.scans().unwrap();
        folder.add(&client.scan_helper().id(5)).unwrap();

        assert_eq!(scans[0].id(), 4);
        let requests = transport.requests();
        assert_eq!(requests[0].url.query(), Some("folder_id=7"));
        assert_eq!(requests[1].url.path(), "/scans/5/folder");
    }
}
