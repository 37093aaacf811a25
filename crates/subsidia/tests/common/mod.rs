//! Scripted EDGAR for end-to-end runs.

#![allow(dead_code, unreachable_pub)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use subsidia::edgar::{
    EdgarUrls, FetcherConfig, RetryPolicy, RunContext, Transport, TransportError,
    TransportResponse,
};

pub const WWW: &str = "https://www.test";
pub const DATA: &str = "https://data.test";
pub const CIK: &str = "0000915389";

/// Fixed responses keyed by URL; anything else is a 404.
#[derive(Debug, Default)]
pub struct FakeEdgar {
    routes: Mutex<HashMap<String, TransportResponse>>,
    unreachable: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeEdgar {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn route(&self, url: impl Into<String>, response: TransportResponse) {
        self.routes.lock().unwrap().insert(url.into(), response);
    }

    pub fn ok(&self, url: impl Into<String>, content_type: &str, body: impl Into<Vec<u8>>) {
        self.route(
            url,
            TransportResponse::new(200, body).with_content_type(content_type),
        );
    }

    /// Every request to `url` fails at the connection level.
    pub fn unreachable(&self, url: impl Into<String>, reason: &str) {
        self.unreachable
            .lock()
            .unwrap()
            .insert(url.into(), reason.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

#[async_trait]
impl Transport for FakeEdgar {
    async fn get(
        &self,
        url: &str,
        _user_agent: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(reason) = self.unreachable.lock().unwrap().get(url) {
            return Err(TransportError(reason.clone()));
        }
        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| TransportResponse::new(404, "Not Found")))
    }
}

pub fn context(edgar: Arc<FakeEdgar>) -> RunContext {
    let config = FetcherConfig::with_user_agent("Test Suite test@example.com")
        .min_interval(Duration::from_millis(110))
        .retry(RetryPolicy {
            jitter_seed: Some(7),
            ..RetryPolicy::default()
        });
    let urls = EdgarUrls {
        www: WWW.to_string(),
        data: DATA.to_string(),
    };
    RunContext::with_transport(config, edgar, urls).unwrap()
}

pub fn tickers_url() -> String {
    format!("{WWW}/files/company_tickers.json")
}

pub fn submissions_url() -> String {
    format!("{DATA}/submissions/CIK{CIK}.json")
}

pub fn folder(accession: &str) -> String {
    format!("{WWW}/Archives/edgar/data/915389/{}", accession.replace('-', ""))
}

pub fn exhibit_url(accession: &str, document: &str) -> String {
    format!("{}/{document}", folder(accession))
}

/// One annual filing of the scripted filer.
pub struct Filing {
    pub accession: &'static str,
    pub filed: &'static str,
    pub report: &'static str,
    pub exhibit: &'static str,
}

/// Register the ticker directory, the submission index and one index page per filing.
pub fn register_filer(edgar: &FakeEdgar, filings: &[Filing]) {
    edgar.ok(
        tickers_url(),
        "application/json",
        r#"{"0": {"cik_str": 915389, "ticker": "EMN", "title": "EASTMAN CHEMICAL CO"}}"#,
    );

    let quoted = |f: fn(&Filing) -> &'static str| {
        filings
            .iter()
            .map(|filing| format!("\"{}\"", f(filing)))
            .collect::<Vec<_>>()
            .join(",")
    };
    let submissions = format!(
        r#"{{"cik": "{CIK}", "name": "EASTMAN CHEMICAL CO", "filings": {{"recent": {{
            "accessionNumber": [{}],
            "form": [{}],
            "filingDate": [{}],
            "reportDate": [{}],
            "primaryDocument": [{}]
        }}, "files": []}}}}"#,
        quoted(|f| f.accession),
        quoted(|_| "10-K"),
        quoted(|f| f.filed),
        quoted(|f| f.report),
        quoted(|_| "main.htm"),
    );
    edgar.ok(submissions_url(), "application/json", submissions);

    for filing in filings {
        let index = format!(
            "<html><body><table class=\"tableFile\">\
             <tr><th>Seq</th><th>Description</th><th>Document</th><th>Type</th><th>Size</th></tr>\
             <tr><td>1</td><td>10-K</td><td><a href=\"{main}\">main.htm</a></td><td>10-K</td><td>1</td></tr>\
             <tr><td>2</td><td>SUBSIDIARIES</td><td><a href=\"{ex}\">{doc}</a></td><td>EX-21</td><td>1</td></tr>\
             </table></body></html>",
            main = exhibit_url(filing.accession, "main.htm").replace(WWW, ""),
            ex = exhibit_url(filing.accession, filing.exhibit).replace(WWW, ""),
            doc = filing.exhibit,
        );
        edgar.ok(
            format!("{}/{}-index.htm", folder(filing.accession), filing.accession),
            "text/html",
            index,
        );
    }
}
