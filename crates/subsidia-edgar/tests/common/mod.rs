//! In-memory EDGAR stand-in for integration tests.

#![allow(dead_code, unreachable_pub)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use subsidia_edgar::{
    EdgarUrls, FetcherConfig, RetryPolicy, RunContext, Transport, TransportError,
    TransportResponse,
};

pub const WWW: &str = "https://www.test";
pub const DATA: &str = "https://data.test";

/// Serves canned responses keyed by URL; unknown URLs get a 404.
#[derive(Debug, Default)]
pub struct RoutedTransport {
    routes: Mutex<HashMap<String, VecDeque<TransportResponse>>>,
    calls: Mutex<Vec<String>>,
}

impl RoutedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Always answer `url` with `response`.
    pub fn route(&self, url: impl Into<String>, response: TransportResponse) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.into(), VecDeque::from([response]));
    }

    /// Answer `url` with each response in turn; the last one repeats.
    pub fn route_sequence(&self, url: impl Into<String>, responses: Vec<TransportResponse>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.into(), responses.into());
    }

    pub fn json(&self, url: impl Into<String>, body: &str) {
        self.route(
            url,
            TransportResponse::new(200, body).with_content_type("application/json"),
        );
    }

    pub fn html(&self, url: impl Into<String>, body: &str) {
        self.route(
            url,
            TransportResponse::new(200, body).with_content_type("text/html"),
        );
    }

    pub fn text(&self, url: impl Into<String>, body: &str) {
        self.route(
            url,
            TransportResponse::new(200, body).with_content_type("text/plain"),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

#[async_trait]
impl Transport for RoutedTransport {
    async fn get(
        &self,
        url: &str,
        _user_agent: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());
        let mut routes = self.routes.lock().unwrap();
        Ok(match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap(),
            None => TransportResponse::new(404, "Not Found"),
        })
    }
}

pub fn urls() -> EdgarUrls {
    EdgarUrls {
        www: WWW.to_string(),
        data: DATA.to_string(),
    }
}

pub fn context(transport: Arc<RoutedTransport>) -> RunContext {
    let config = FetcherConfig::with_user_agent("Test Suite test@example.com")
        .min_interval(Duration::from_millis(1))
        .retry(RetryPolicy {
            base_delay: Duration::from_millis(10),
            jitter_seed: Some(1),
            ..RetryPolicy::default()
        });
    RunContext::with_transport(config, transport, urls()).unwrap()
}

pub const TICKERS: &str = r#"{
    "0": {"cik_str": 915389, "ticker": "EMN", "title": "EASTMAN CHEMICAL CO"},
    "1": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}
}"#;

pub fn tickers_url() -> String {
    format!("{WWW}/files/company_tickers.json")
}

pub fn submissions_url(cik: &str) -> String {
    format!("{DATA}/submissions/CIK{cik}.json")
}

pub fn folder(cik: u64, accession: &str) -> String {
    format!(
        "{WWW}/Archives/edgar/data/{cik}/{}",
        accession.replace('-', "")
    )
}

pub fn index_page_url(cik: u64, accession: &str) -> String {
    format!("{}/{accession}-index.htm", folder(cik, accession))
}

/// Build a submissions payload from (accession, form, filing date, report date) rows.
pub fn submissions_json(cik: &str, rows: &[(&str, &str, &str, &str)], files: &str) -> String {
    let col = |i: usize| {
        rows.iter()
            .map(|r| {
                let value = match i {
                    0 => r.0,
                    1 => r.1,
                    2 => r.2,
                    3 => r.3,
                    _ => "main.htm",
                };
                format!("\"{value}\"")
            })
            .collect::<Vec<_>>()
            .join(",")
    };
    format!(
        r#"{{"cik": "{cik}", "name": "EASTMAN CHEMICAL CO", "filings": {{
            "recent": {{
                "accessionNumber": [{}],
                "form": [{}],
                "filingDate": [{}],
                "reportDate": [{}],
                "primaryDocument": [{}]
            }},
            "files": [{files}]
        }}}}"#,
        col(0),
        col(1),
        col(2),
        col(3),
        col(4),
    )
}

/// Filing index page with one row per (document, type, description).
pub fn index_page(cik: u64, accession: &str, docs: &[(&str, &str, &str)]) -> String {
    let rows: String = docs
        .iter()
        .enumerate()
        .map(|(i, (doc, ty, desc))| {
            format!(
                "<tr><td>{}</td><td>{desc}</td><td><a href=\"/Archives/edgar/data/{cik}/{}/{doc}\">{doc}</a></td><td>{ty}</td><td>100</td></tr>",
                i + 1,
                accession.replace('-', "")
            )
        })
        .collect();
    format!(
        "<html><body><table class=\"tableFile\"><tr><th>Seq</th><th>Description</th><th>Document</th><th>Type</th><th>Size</th></tr>{rows}</table></body></html>"
    )
}
