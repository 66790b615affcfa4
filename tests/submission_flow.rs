mod common;

use common::{fast_config, record, FakePage, SUCCESS_42};
use payment_entry_submit::{AttemptResult, Record, RecordCtx, RecordStatus, SubmissionFlow};
use std::time::Duration;
use tokio::time::Instant;

fn ctx(record: &Record) -> RecordCtx {
    RecordCtx::new(1, 1, record.line_number)
}

#[tokio::test]
async fn confirms_on_first_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let page = FakePage::new(&config).with_default_message(Some(SUCCESS_42));
    let flow = SubmissionFlow::new(&config).unwrap();
    let rec = record(1, "101", "9001", "150,00");

    let outcome = flow.run(&page, &rec, &ctx(&rec)).await;

    assert_eq!(outcome.status, RecordStatus::Success);
    assert_eq!(outcome.attempts_used, 1);
    assert_eq!(outcome.payment_reference.as_deref(), Some("42"));
    assert!(outcome.last_error.is_none());
    assert_eq!(page.opens(), 1);
    assert_eq!(page.commits(), 1);
}

#[tokio::test]
async fn fills_fields_in_fixed_order_and_commits_lookups_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let page = FakePage::new(&config).with_default_message(Some(SUCCESS_42));
    let flow = SubmissionFlow::new(&config).unwrap();
    let cells: Vec<String> = ["101", "9001", "11/2024", "150,00", "05/12/2024", "obs"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let rec = Record::from_cells(1, &cells);

    flow.run(&page, &rec, &ctx(&rec)).await;

    assert_eq!(
        page.events(),
        vec![
            "open",
            "attached #cod_tipo_rubrica",
            "fill #cod_tipo_rubrica=101",
            "press #cod_tipo_rubrica:Tab",
            "fill #cod_prestador=9001",
            "press #cod_prestador:Tab",
            "fill #mes_ano_ref=11/2024",
            "fill #val_bruto=150,00",
            "fill #dt_pgto_prevista=05/12/2024",
            "fill #txt_obs_lm=obs",
            "commit",
        ]
    );
}

#[tokio::test]
async fn empty_optional_fields_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let page = FakePage::new(&config).with_default_message(Some(SUCCESS_42));
    let flow = SubmissionFlow::new(&config).unwrap();
    let rec = record(1, "101", "9001", "10");

    flow.run(&page, &rec, &ctx(&rec)).await;

    let fills: Vec<String> = page
        .events()
        .into_iter()
        .filter(|e| e.starts_with("fill"))
        .collect();
    assert_eq!(fills.len(), 3);
    assert!(!fills.iter().any(|f| f.contains("#mes_ano_ref")));
}

#[tokio::test]
async fn fill_errors_are_retried_until_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let page = FakePage::new(&config)
        .with_default_message(Some(SUCCESS_42))
        .failing_fill("202", 2);
    let flow = SubmissionFlow::new(&config).unwrap();
    let rec = record(2, "202", "9002", "10");

    let outcome = flow.run(&page, &rec, &ctx(&rec)).await;

    assert_eq!(outcome.status, RecordStatus::Success);
    assert_eq!(outcome.attempts_used, 3);
    assert_eq!(page.opens(), 3);
    assert_eq!(page.commits(), 1);
}

#[tokio::test]
async fn rejected_message_counts_against_budget() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let page = FakePage::new(&config)
        .with_messages(vec![Some("Falha no processamento"), Some(SUCCESS_42)]);
    let flow = SubmissionFlow::new(&config).unwrap();
    let rec = record(1, "101", "9001", "10");

    let outcome = flow.run(&page, &rec, &ctx(&rec)).await;

    assert_eq!(outcome.status, RecordStatus::Success);
    assert_eq!(outcome.attempts_used, 2);
    assert_eq!(page.commits(), 2);
}

#[tokio::test]
async fn timeouts_exhaust_all_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let page = FakePage::new(&config).with_default_message(None);
    let flow = SubmissionFlow::new(&config).unwrap();
    let rec = record(1, "101", "9001", "10");

    let outcome = flow.run(&page, &rec, &ctx(&rec)).await;

    assert_eq!(outcome.status, RecordStatus::Failure);
    assert_eq!(outcome.attempts_used, flow.max_attempts());
    assert_eq!(outcome.attempts_used, 3);
    assert!(outcome.payment_reference.is_none());
    assert!(outcome.last_error.is_some());
    assert_eq!(outcome.last_classification, Some(AttemptResult::TimedOut));
    assert_eq!(page.commits(), 3);
}

#[tokio::test]
async fn retry_limit_is_configurable() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    config.max_attempts = 5;
    let page = FakePage::new(&config).with_default_message(Some("Falha no processamento"));
    let flow = SubmissionFlow::new(&config).unwrap();
    let rec = record(1, "101", "9001", "10");

    let outcome = flow.run(&page, &rec, &ctx(&rec)).await;

    assert_eq!(outcome.status, RecordStatus::Failure);
    assert_eq!(outcome.attempts_used, 5);
    assert!(matches!(
        outcome.last_classification,
        Some(AttemptResult::Rejected { ref message, .. }) if message == "Falha no processamento"
    ));
}

#[tokio::test]
async fn last_error_names_failing_field() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let page = FakePage::new(&config)
        .with_default_message(Some(SUCCESS_42))
        .failing_fill("9001", 10);
    let flow = SubmissionFlow::new(&config).unwrap();
    let rec = record(1, "101", "9001", "10");

    let outcome = flow.run(&page, &rec, &ctx(&rec)).await;

    assert_eq!(outcome.status, RecordStatus::Failure);
    let last_error = outcome.last_error.unwrap();
    assert!(last_error.contains("provider_code"), "{}", last_error);
    assert!(outcome.last_classification.is_none());
}

#[tokio::test]
async fn form_readiness_is_awaited_before_each_fill_pass() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let page = FakePage::new(&config)
        .with_default_message(Some(SUCCESS_42))
        .failing_fill("202", 1);
    let flow = SubmissionFlow::new(&config).unwrap();
    let rec = record(1, "202", "9002", "10");

    flow.run(&page, &rec, &ctx(&rec)).await;

    let events = page.events();
    let opens: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.as_str() == "open")
        .map(|(i, _)| i)
        .collect();
    assert_eq!(opens.len(), 2);
    for open in opens {
        assert_eq!(events[open + 1], "attached #cod_tipo_rubrica");
        assert!(events[open + 2].starts_with("fill"), "{}", events[open + 2]);
    }
}

#[tokio::test(start_paused = true)]
async fn settle_waits_follow_form_and_lookup_fields() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = fast_config(dir.path());
    config.form_clear_settle_ms = 3_000;
    config.field_load_settle_ms = 4_000;
    let page = FakePage::new(&config).with_default_message(Some(SUCCESS_42));
    let flow = SubmissionFlow::new(&config).unwrap();
    let cells: Vec<String> = ["101", "9001", "11/2024", "150,00", "05/12/2024", "obs"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let rec = Record::from_cells(1, &cells);

    let started = Instant::now();
    let outcome = flow.run(&page, &rec, &ctx(&rec)).await;
    let elapsed = started.elapsed();

    assert_eq!(outcome.status, RecordStatus::Success);
    // 一次表单等待 + 两个查找字段各一次联动等待，其余字段不等待
    assert!(elapsed >= Duration::from_millis(11_000), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(15_000), "{:?}", elapsed);
}
