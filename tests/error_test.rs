//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use leaf_id::error::LeafIdError;
use leaf_id::identify::ImagePayload;
use leaf_id::scanner;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_path(Path::new("/nonexistent/path/12345"));
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, LeafIdError::FolderNotFound(_)));
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    // テキストファイルのみ作成
    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = scanner::scan_path(dir.path());
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// 存在しない画像の読み込み
#[test]
fn test_load_missing_image() {
    let err = ImagePayload::load(Path::new("/nonexistent/leaf.jpg")).unwrap_err();
    assert!(matches!(err, LeafIdError::FileNotFound(_)));
}

/// LeafIdErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        LeafIdError::Config("テスト設定エラー".to_string()),
        LeafIdError::FileNotFound("leaf.jpg".to_string()),
        LeafIdError::FolderNotFound("/path/to/folder".to_string()),
        LeafIdError::ImageLoad("壊れた画像".to_string()),
        LeafIdError::NoImagesFound("フォルダ".to_string()),
        LeafIdError::ApiCall("HTTP 500: Internal Server Error".to_string()),
        LeafIdError::EmptyResponse,
        LeafIdError::StorageFull,
        LeafIdError::Prompt("中断".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let err = LeafIdError::MissingApiKey;
    let display = format!("{}", err);

    assert!(display.contains("APIキー"));
    assert!(display.contains("leaf-id config"));
}

/// 保存失敗のメッセージ
#[test]
fn test_storage_full_message() {
    let err = LeafIdError::StorageFull;
    assert_eq!(err.to_string(), "Failed to save specimen. Storage might be full.");
    assert!(err.is_storage_failure());
    assert!(!LeafIdError::EmptyResponse.is_storage_failure());
}

/// 共通ライブラリのエラーはそのまま表示
#[test]
fn test_common_error_is_transparent() {
    let inner = leaf_id_common::Error::InvalidTransition {
        from: "idle",
        action: "save",
    };
    let expected = inner.to_string();
    let err: LeafIdError = inner.into();
    assert_eq!(err.to_string(), expected);
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: LeafIdError = io_err.into();

    assert!(matches!(err, LeafIdError::Io(_)));
    assert!(err.is_storage_failure());
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: LeafIdError = json_err.into();

    assert!(matches!(err, LeafIdError::JsonParse(_)));
}
