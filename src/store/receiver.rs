use crate::error::TransferError;
use crate::store::{
    validate_object_path, ArchiveStore, ArchiveUploader, FileRequest, FileResponse, Project,
};
use log::info;
use std::collections::HashMap;
use std::sync::Arc;

/// The receiving end of uploads: validates each request and writes it to the store configured
/// for its project.
///
/// A request needs a filename below the store root, non-empty content and a known project, and
/// its declared MD5 must match the content. Nothing is written otherwise.
#[derive(Default, Clone)]
pub struct StoreReceiver {
    stores: HashMap<Project, Arc<dyn ArchiveStore>>,
}

impl StoreReceiver {
    pub fn new() -> StoreReceiver {
        StoreReceiver::default()
    }

    pub fn with_store(mut self, project: Project, store: Arc<dyn ArchiveStore>) -> StoreReceiver {
        self.stores.insert(project, store);
        self
    }

    fn validate(&self, request: &FileRequest) -> Result<Arc<dyn ArchiveStore>, TransferError> {
        if request.content.is_empty()
            || request.filename.is_empty()
            || request.project == Project::Unknown
        {
            return Err(TransferError::InvalidRequest(
                "base requirements for FileRequest unmet".to_string(),
            ));
        }
        validate_object_path(&request.filename)?;

        let calculated = format!("{:x}", md5::compute(&request.content));
        if calculated != request.md5sum {
            return Err(TransferError::ChecksumMismatch {
                requested: request.md5sum.clone(),
                calculated,
            });
        }

        self.stores.get(&request.project).cloned().ok_or_else(|| {
            TransferError::InvalidRequest(format!("{} is not supported", request.project))
        })
    }
}

impl ArchiveUploader for StoreReceiver {
    fn upload(&self, request: FileRequest) -> Result<FileResponse, TransferError> {
        let store = self.validate(&request)?;
        store.write(&request.filename, &request.content)?;
        info!(
            "stored {} for {} ({} bytes)",
            request.filename,
            request.project,
            request.content.len()
        );
        Ok(FileResponse::success())
    }
}
