use std::path::Path;
use tempfile::TempDir;

use crate::errors::BatchError;
use crate::file_service::FileService;
use crate::models::BatchDocumentMetadata;

fn create_test_file_service() -> (FileService, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let staging_path = temp_dir.path().to_string_lossy().to_string();
    let service = FileService::new(staging_path);
    (service, temp_dir)
}

fn staged_metadata(file_path: &str, temp_file: bool) -> BatchDocumentMetadata {
    BatchDocumentMetadata {
        file_path: Some(file_path.to_string()),
        temp_file,
    }
}

#[tokio::test]
async fn test_stage_file_preserves_extension() {
    let (service, _temp_dir) = create_test_file_service();

    let path = service.stage_file("contract.pdf", b"PDF content").await.unwrap();
    assert!(path.ends_with(".pdf"));
    assert_eq!(std::fs::read(&path).unwrap(), b"PDF content");
}

#[tokio::test]
async fn test_read_staged_text() {
    let (service, _temp_dir) = create_test_file_service();

    let path = service.stage_file("terms.txt", b"Hello, World!").await.unwrap();
    let content = service.read_staged_text(&staged_metadata(&path, true)).await.unwrap();
    assert_eq!(content, "Hello, World!");
}

#[tokio::test]
async fn test_read_staged_text_without_path() {
    let (service, _temp_dir) = create_test_file_service();

    let err = service
        .read_staged_text(&BatchDocumentMetadata::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BatchError>(),
        Some(BatchError::MissingFilePath)
    ));
}

#[tokio::test]
async fn test_read_staged_text_missing_file() {
    let (service, _temp_dir) = create_test_file_service();

    let err = service
        .read_staged_text(&staged_metadata("/nonexistent/staged/file.txt", true))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BatchError>(),
        Some(BatchError::StagedFileMissing(_))
    ));
}

#[tokio::test]
async fn test_cleanup_deletes_temp_file() {
    let (service, _temp_dir) = create_test_file_service();

    let path = service.stage_file("evidence.txt", b"data").await.unwrap();
    assert!(Path::new(&path).exists());

    service
        .cleanup_staged_file(&staged_metadata(&path, true))
        .await
        .unwrap();
    assert!(!Path::new(&path).exists());
}

#[tokio::test]
async fn test_cleanup_is_idempotent() {
    let (service, _temp_dir) = create_test_file_service();

    let path = service.stage_file("filing.txt", b"data").await.unwrap();
    let staging = staged_metadata(&path, true);

    service.cleanup_staged_file(&staging).await.unwrap();
    // Second call finds the file already gone and still succeeds.
    service.cleanup_staged_file(&staging).await.unwrap();
    assert!(!Path::new(&path).exists());
}

#[tokio::test]
async fn test_cleanup_leaves_non_temp_files() {
    let (service, _temp_dir) = create_test_file_service();

    let path = service.stage_file("retained.txt", b"keep me").await.unwrap();

    service
        .cleanup_staged_file(&staged_metadata(&path, false))
        .await
        .unwrap();
    assert!(Path::new(&path).exists());
}

#[tokio::test]
async fn test_cleanup_without_path_is_noop() {
    let (service, _temp_dir) = create_test_file_service();

    let staging = BatchDocumentMetadata {
        file_path: None,
        temp_file: true,
    };
    service.cleanup_staged_file(&staging).await.unwrap();
}
