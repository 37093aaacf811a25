//! End-to-end runs of the year orchestrator against a scripted EDGAR.

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use subsidia::edgar::{EdgarError, TransportResponse};
use subsidia::{PipelineError, RunOptions, YearOrchestrator, YearStatus};

const EX21_HTML: &str = "<html><body><p>EXHIBIT 21</p><table>\
    <tr><td>Name of Subsidiary</td><td>Jurisdiction of Incorporation</td></tr>\
    <tr><td>Eastman Chemical Ltd.</td><td>England and Wales</td></tr>\
    <tr><td>Tennessee Eastman Company</td><td>Tennessee</td></tr>\
    </table></body></html>";

const EX21_SGML: &str = "<DOCUMENT>\n<TYPE>EX-21\n<TEXT>\n\
SUBSIDIARIES OF THE REGISTRANT\n\n\
Eastman Chemical Company Investments, Inc.  Delaware\n\
Eastman Gelatine Corporation                Massachusetts\n\
Eastman Chemical B.V.                       The Netherlands\n\
</TEXT>\n</DOCUMENT>\n";

/// EMN 2018-2024: every status appears once the scripted failures are registered.
fn emn_edgar() -> Arc<FakeEdgar> {
    let edgar = FakeEdgar::new();
    register_filer(
        &edgar,
        &[
            Filing { accession: "0000915389-24-000009", filed: "2024-02-27", report: "2023-12-31", exhibit: "emn-ex21.htm" },
            Filing { accession: "0000915389-23-000004", filed: "2023-02-22", report: "2022-12-31", exhibit: "ex21.pdf" },
            Filing { accession: "0000915389-22-000003", filed: "2022-02-24", report: "2021-12-31", exhibit: "ex21.htm" },
            // No report date, so 2020 (without a filing) cannot borrow this one
            Filing { accession: "0000915389-21-000005", filed: "2021-02-25", report: "", exhibit: "ex21.htm" },
            Filing { accession: "0000915389-19-000007", filed: "2019-02-26", report: "2018-12-31", exhibit: "ex21.txt" },
            Filing { accession: "0000915389-18-000008", filed: "2018-02-27", report: "2017-12-31", exhibit: "dex21.txt" },
        ],
    );
    edgar.ok(exhibit_url("0000915389-24-000009", "emn-ex21.htm"), "text/html", EX21_HTML);
    edgar.ok(
        exhibit_url("0000915389-23-000004", "ex21.pdf"),
        "application/pdf",
        b"%PDF-1.4\x00\x00\x01".to_vec(),
    );
    edgar.route(
        exhibit_url("0000915389-22-000003", "ex21.htm"),
        TransportResponse::new(503, "Service Unavailable"),
    );
    // 2021's exhibit is deliberately unrouted: a 404
    edgar.ok(
        exhibit_url("0000915389-19-000007", "ex21.txt"),
        "text/plain",
        "Tennessee Eastman Company, Tennessee\n\n",
    );
    edgar.ok(exhibit_url("0000915389-18-000008", "dex21.txt"), "text/plain", EX21_SGML);
    edgar
}

#[tokio::test(start_paused = true)]
async fn test_emn_2018_to_2024() {
    let edgar = emn_edgar();
    let ctx = context(edgar.clone());

    let report = YearOrchestrator::new(&ctx).run("EMN", 2018..=2024).await.unwrap();

    assert_eq!(report.identity.stable_id, CIK);
    assert_eq!(report.years().collect::<Vec<_>>(), (2018..=2024).collect::<Vec<_>>());

    let statuses: Vec<_> = report.year_reports.values().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            YearStatus::Ok,          // 2018 SGML text
            YearStatus::Ok,          // 2019 single line
            YearStatus::NoFiling,    // 2020 no 10-K
            YearStatus::NoFiling,    // 2021 exhibit 404
            YearStatus::FetchFailed, // 2022 persistent 503
            YearStatus::ParseFailed, // 2023 binary exhibit
            YearStatus::Ok,          // 2024 HTML table
        ]
    );

    let y2019 = report.year(2019).unwrap();
    assert_eq!(y2019.records.len(), 1);
    assert_eq!(y2019.records[0].name(), "Tennessee Eastman Company");
    assert_eq!(y2019.records[0].jurisdiction(), Some("Tennessee"));

    let y2020 = report.year(2020).unwrap();
    assert!(y2020.records.is_empty());
    assert_eq!(y2020.note.as_deref(), Some("10-K filing not found for 2020"));

    assert_eq!(report.year(2018).unwrap().records.len(), 3);
    assert_eq!(report.year(2024).unwrap().records[1].name(), "Tennessee Eastman Company");
    assert_eq!(
        report.year(2024).unwrap().filing.as_ref().unwrap().filing_id,
        "0000915389-24-000009"
    );

    // Failed years carry no records and a reason
    for year in [2020, 2021, 2022, 2023] {
        let r = report.year(year).unwrap();
        assert!(r.records.is_empty(), "{year}");
        assert!(r.note.is_some(), "{year}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_missing_exhibit_is_not_retried() {
    let edgar = emn_edgar();
    let ctx = context(edgar.clone());

    YearOrchestrator::new(&ctx).run("EMN", 2021..=2021).await.unwrap();

    assert_eq!(edgar.call_count(&exhibit_url("0000915389-21-000005", "ex21.htm")), 1);
    assert_eq!(ctx.stats().retries, 0);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_throttling_uses_retry_budget() {
    let edgar = emn_edgar();
    let ctx = context(edgar.clone());

    let report = YearOrchestrator::new(&ctx).run("EMN", 2022..=2022).await.unwrap();

    assert_eq!(edgar.call_count(&exhibit_url("0000915389-22-000003", "ex21.htm")), 5);
    assert_eq!(ctx.stats().retries, 4);
    let note = report.year(2022).unwrap().note.clone().unwrap();
    assert!(note.contains("Rate limit"), "{note}");
}

#[tokio::test(start_paused = true)]
async fn test_connection_failure_does_not_stop_later_years() {
    let edgar = emn_edgar();
    edgar.unreachable(
        exhibit_url("0000915389-19-000007", "ex21.txt"),
        "connection reset by peer",
    );
    let ctx = context(edgar.clone());

    let report = YearOrchestrator::new(&ctx).run("EMN", 2018..=2020).await.unwrap();

    assert_eq!(report.year(2018).unwrap().status, YearStatus::Ok);
    let y2019 = report.year(2019).unwrap();
    assert_eq!(y2019.status, YearStatus::FetchFailed);
    assert!(y2019.records.is_empty());
    assert!(
        y2019.note.as_deref().unwrap().contains("connection reset by peer"),
        "{:?}",
        y2019.note
    );
    assert_eq!(
        y2019.filing.as_ref().map(|f| f.filing_id.as_str()),
        Some("0000915389-19-000007")
    );
    assert_eq!(report.year(2020).unwrap().status, YearStatus::NoFiling);

    // Three connection attempts, two retries
    assert_eq!(edgar.call_count(&exhibit_url("0000915389-19-000007", "ex21.txt")), 3);
    assert_eq!(ctx.stats().retries, 2);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_symbol_is_fatal_after_one_request() {
    let edgar = emn_edgar();
    let ctx = context(edgar.clone());

    let result = YearOrchestrator::new(&ctx).run("ZZZZZ_NOT_REAL", 2018..=2024).await;

    assert!(matches!(
        result,
        Err(PipelineError::Edgar(EdgarError::UnknownSymbol(_)))
    ));
    assert_eq!(edgar.calls(), vec![tickers_url()]);
}

#[tokio::test]
async fn test_inverted_range_makes_no_requests() {
    let edgar = emn_edgar();
    let ctx = context(edgar.clone());

    #[allow(clippy::reversed_empty_ranges)]
    let result = YearOrchestrator::new(&ctx).run("EMN", 2024..=2018).await;

    assert!(matches!(
        result,
        Err(PipelineError::InvalidYearRange { start: 2024, end: 2018 })
    ));
    assert!(edgar.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_deadline_skips_remaining_years() {
    let edgar = emn_edgar();
    let ctx = context(edgar.clone());

    let report = YearOrchestrator::new(&ctx)
        .with_options(RunOptions::default().deadline(Duration::ZERO))
        .run("EMN", 2018..=2024)
        .await
        .unwrap();

    assert_eq!(report.year_reports.len(), 7);
    assert!(report.year_reports.values().all(|r| {
        r.status == YearStatus::FetchFailed && r.note.as_deref() == Some("deadline exceeded")
    }));
    // Only identity resolution went out
    assert_eq!(edgar.calls(), vec![tickers_url()]);
}

#[tokio::test(start_paused = true)]
async fn test_observer_sees_years_in_order() {
    let edgar = emn_edgar();
    let ctx = context(edgar);
    let mut seen = Vec::new();

    YearOrchestrator::new(&ctx)
        .run_with_observer("EMN", 2018..=2024, |r| seen.push((r.year, r.status)))
        .await
        .unwrap();

    assert_eq!(seen.len(), 7);
    assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
    assert_eq!(seen[2], (2020, YearStatus::NoFiling));
}
