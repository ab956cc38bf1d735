//! Startup: reference data, default selection, working-day lookup.

use crate::common::fake_api::{Call, FakeApi};
use crate::common::test_helpers::{branch, drain, orchestrator, source};
use chrono::NaiveDate;
use excel_upload_core::{BatchSummaryEntry, FormDefaults, Notification, UploadForm};
use pretty_assertions::assert_eq;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn selects_first_branch_and_source_then_uses_working_day() {
    let api = FakeApi::new()
        .branches(Ok(vec![branch("001", "Main"), branch("002", "Harbour")]))
        .source_codes(Ok(vec![source("MAN"), source("AUTO")]))
        .working_day(Ok(day(2026, 10, 14)));
    let (orch, mut rx) = orchestrator(api);

    orch.initialize().await;

    let form = orch.form();
    assert_eq!(form.branch_code(), "001");
    assert_eq!(form.source_code(), "MAN");
    assert_eq!(form.entry_date(), Some(day(2026, 10, 14)));
    assert_eq!(orch.api().count(|c| *c == Call::WorkingDay("001".into())), 1);
    assert_eq!(orch.branches().len(), 2);
    assert_eq!(orch.source_codes().len(), 2);
    assert_eq!(orch.api().batch_reloads(), 1);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn branch_failure_notifies_and_keeps_todays_date() {
    let api = FakeApi::new()
        .branches(Err((500, String::new())))
        .source_codes(Ok(vec![source("MAN")]))
        .working_day(Ok(day(2026, 10, 14)));
    let (orch, mut rx) = orchestrator(api);
    let today = UploadForm::new(FormDefaults::today()).entry_date();

    orch.initialize().await;

    let form = orch.form();
    assert_eq!(form.branch_code(), "");
    assert_eq!(form.source_code(), "MAN");
    assert_eq!(form.entry_date(), today);
    assert_eq!(orch.api().count(|c| matches!(c, Call::WorkingDay(_))), 0);
    assert_eq!(drain(&mut rx), vec![Notification::error("Failed to load branches")]);
}

#[tokio::test]
async fn source_failure_does_not_block_branches() {
    let api = FakeApi::new()
        .branches(Ok(vec![branch("001", "Main")]))
        .source_codes(Err((500, String::new())));
    let (orch, mut rx) = orchestrator(api);

    orch.load_reference_data().await;

    assert_eq!(orch.branches(), vec![branch("001", "Main")]);
    assert!(orch.source_codes().is_empty());
    assert_eq!(drain(&mut rx), vec![Notification::error("Failed to load source codes")]);
}

#[tokio::test]
async fn working_day_failure_keeps_current_date() {
    let api = FakeApi::new()
        .branches(Ok(vec![branch("001", "Main")]))
        .working_day(Err((404, String::new())));
    let (orch, mut rx) = orchestrator(api);
    let before = orch.form().entry_date();

    orch.initialize().await;

    assert_eq!(orch.form().branch_code(), "001");
    assert_eq!(orch.form().entry_date(), before);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn selecting_a_branch_moves_the_entry_date() {
    let api = FakeApi::new().working_day(Ok(day(2026, 10, 12)));
    let (orch, _rx) = orchestrator(api);

    orch.select_branch("002").await;

    assert_eq!(orch.form().branch_code(), "002");
    assert_eq!(orch.form().entry_date(), Some(day(2026, 10, 12)));
    assert_eq!(orch.api().calls(), vec![Call::WorkingDay("002".into())]);
}

#[tokio::test]
async fn batch_list_failure_is_silent_and_keeps_previous_list() {
    let first = vec![BatchSummaryEntry { batch_no: "B1".into(), record_count: 3 }];
    let api = FakeApi::new().batches(vec![Ok(first.clone()), Err((500, String::new()))]);
    let (orch, mut rx) = orchestrator(api);

    assert!(!orch.is_batch_list_current());
    assert!(orch.load_batch_summary().await);
    assert!(orch.is_batch_list_current());
    assert!(!orch.load_batch_summary().await);

    assert_eq!(orch.batches(), first);
    assert!(!orch.is_batch_list_current());
    assert!(drain(&mut rx).is_empty());
}
