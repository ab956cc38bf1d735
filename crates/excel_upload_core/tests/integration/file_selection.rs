use crate::common::fake_api::FakeApi;
use crate::common::test_helpers::{drain, orchestrator, ready_to_upload, xls, xlsx};
use excel_upload_core::{Notification, RowError, SelectedFile, UploadError, UploadResult};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn non_spreadsheet_is_rejected_and_result_kept() {
    let api = FakeApi::new().upload(Ok(UploadResult {
        success: false,
        batch_no: "B1".into(),
        errors: vec![RowError {
            row_number: 2,
            error_message: "Bad".into(),
            ..Default::default()
        }],
        ..Default::default()
    }));
    let (orch, mut rx) = orchestrator(api);
    ready_to_upload(&orch, "B1");
    orch.upload_file().await.expect("upload");
    drain(&mut rx);

    let err = orch
        .on_file_selected(SelectedFile::new("notes.txt", "text/plain", b"hello".to_vec()))
        .unwrap_err();

    assert!(matches!(err, UploadError::Validation(_)));
    assert!(!orch.has_selected_file());
    assert!(orch.upload_result().is_some());
    assert_eq!(
        drain(&mut rx),
        vec![Notification::error("Please select a valid Excel file (.xlsx or .xls)")]
    );
}

#[tokio::test]
async fn valid_selection_clears_previous_result() {
    let (orch, _rx) = orchestrator(FakeApi::new());
    ready_to_upload(&orch, "B1");
    orch.upload_file().await.expect("upload");
    assert!(orch.upload_result().is_some());

    orch.on_file_selected(xlsx("next.xlsx")).expect("accepted");

    assert_eq!(orch.upload_result(), None);
    assert_eq!(orch.selected_file_name().as_deref(), Some("next.xlsx"));
}

#[test]
fn legacy_xls_is_accepted() {
    let (orch, mut rx) = orchestrator(FakeApi::new());

    orch.on_file_selected(xls("old.xls")).expect("accepted");

    assert_eq!(orch.selected_file_name().as_deref(), Some("old.xls"));
    assert_eq!(
        orch.selected_file().map(|f| f.media_type),
        Some(excel_upload_core::file::XLS_MEDIA_TYPE.to_string())
    );
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn oversized_file_is_rejected() {
    let (orch, mut rx) = orchestrator(FakeApi::new());
    let big = SelectedFile::new(
        "big.xlsx",
        excel_upload_core::file::XLSX_MEDIA_TYPE,
        vec![0u8; 1024 * 1024 + 1],
    );

    assert!(orch.on_file_selected(big).is_err());

    assert!(!orch.has_selected_file());
    assert_eq!(
        drain(&mut rx),
        vec![Notification::error("File size exceeds maximum allowed size (1MB)")]
    );
}

#[test]
fn rejection_replaces_an_earlier_good_selection() {
    let (orch, _rx) = orchestrator(FakeApi::new());
    orch.on_file_selected(xlsx("good.xlsx")).expect("accepted");

    let _ = orch.on_file_selected(SelectedFile::new("bad.pdf", "application/pdf", vec![1]));

    assert!(!orch.has_selected_file());
    assert!(orch.api().calls().is_empty());
}
