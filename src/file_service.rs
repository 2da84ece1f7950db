use anyhow::Result;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

use crate::errors::BatchError;
use crate::models::BatchDocumentMetadata;

/// Access to the staging area where the submission path parks uploaded file
/// content until the pipeline consumes it.
#[derive(Clone)]
pub struct FileService {
    staging_path: String,
}

impl FileService {
    pub fn new(staging_path: String) -> Self {
        Self { staging_path }
    }

    /// Write uploaded bytes into the staging area under a fresh name.
    /// Used by the submission path; the pipeline only ever reads and deletes.
    pub async fn stage_file(&self, filename: &str, data: &[u8]) -> Result<String> {
        let file_id = Uuid::new_v4();
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let staged_filename = if extension.is_empty() {
            file_id.to_string()
        } else {
            format!("{}.{}", file_id, extension)
        };

        let file_path = Path::new(&self.staging_path).join(&staged_filename);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&file_path, data).await?;

        Ok(file_path.to_string_lossy().to_string())
    }

    /// Read a staged document fully into memory as text.
    ///
    /// A missing path or absent file is a configuration error for that
    /// document, not an analyzer error; it fails fast before any analysis
    /// record is created.
    pub async fn read_staged_text(&self, staging: &BatchDocumentMetadata) -> Result<String> {
        let file_path = staging
            .file_path
            .as_deref()
            .ok_or(BatchError::MissingFilePath)?;

        if !fs::try_exists(file_path).await.unwrap_or(false) {
            return Err(BatchError::StagedFileMissing(file_path.to_string()).into());
        }

        let content = fs::read_to_string(file_path).await?;
        Ok(content)
    }

    /// Delete a staged file if the pipeline owns it. Safe to call any number
    /// of times: a file that is already gone counts as cleaned up.
    pub async fn cleanup_staged_file(&self, staging: &BatchDocumentMetadata) -> Result<()> {
        if !staging.temp_file {
            return Ok(());
        }

        let Some(file_path) = staging.file_path.as_deref() else {
            return Ok(());
        };

        match fs::remove_file(file_path).await {
            Ok(()) => {
                tracing::info!("Cleaned up staged file: {}", file_path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
