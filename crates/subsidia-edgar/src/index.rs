//! Per-year filing and exhibit resolution.
//!
//! For a filer and a calendar year, [`FilingIndexClient::find_filing_for_year`] picks the annual
//! report filed that year and locates its subsidiaries exhibit. A missing filing or a filing
//! without the exhibit is a normal outcome ([`FilingLookup::NotFound`]), not an error.

use crate::context::RunContext;
use crate::error::Result;
use crate::manifest::{ExhibitMatch, FilingManifest};
use crate::submissions::{CompanySubmissions, FilingColumns, FilingInfo, SubmissionIndex};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Location of one year's subsidiaries exhibit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingReference {
    /// Requested calendar year
    pub year: i32,
    /// Accession number of the filing carrying the exhibit
    pub filing_id: String,
    /// URL of the exhibit document
    pub document_url: String,
    /// Form type of the filing (e.g. "10-K", "10-K/A")
    pub form: String,
    /// Date the filing was made
    pub filing_date: NaiveDate,
    /// Exhibit designation from the manifest, when present (e.g. "EX-21.1")
    pub exhibit_type: Option<String>,
}

/// Outcome of a per-year lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilingLookup {
    /// Exhibit located
    Found(FilingReference),
    /// No annual filing, or no subsidiaries exhibit in it
    NotFound(String),
}

/// Resolves filings and exhibits through the run's fetcher and caches.
#[derive(Debug, Clone, Copy)]
pub struct FilingIndexClient<'a> {
    ctx: &'a RunContext,
}

impl<'a> FilingIndexClient<'a> {
    /// Create a client over a run context.
    pub const fn new(ctx: &'a RunContext) -> Self {
        Self { ctx }
    }

    /// Find the subsidiaries exhibit for `year`.
    ///
    /// The most recently filed primary annual report is used; amendments only when no primary
    /// exists. An amendment filed after the primary that carries its own subsidiaries exhibit
    /// supersedes the primary's.
    ///
    /// # Errors
    /// Propagates fetch failures of the submission index and of the selected filing's manifest.
    pub async fn find_filing_for_year(&self, stable_id: &str, year: i32) -> Result<FilingLookup> {
        let candidates = {
            let mut cache = self.ctx.submissions().lock().await;
            if !cache.contains_key(stable_id) {
                let index = self.load_submissions(stable_id).await?;
                cache.insert(stable_id.to_string(), index);
            }
            let Some(index) = cache.get_mut(stable_id) else {
                return Ok(FilingLookup::NotFound(format!("no submissions for {stable_id}")));
            };
            self.load_pages_for_year(index, year).await?;
            index.annual_filings_for_year(year)
        };

        if candidates.is_empty() {
            tracing::info!(cik = stable_id, year, "no annual report filed");
            return Ok(FilingLookup::NotFound(format!(
                "10-K filing not found for {year}"
            )));
        }

        match &candidates.primary {
            Some(primary) => {
                for amendment in candidates
                    .amendments
                    .iter()
                    .filter(|a| a.filing_date >= primary.filing_date)
                {
                    match self.exhibit_in(stable_id, amendment).await {
                        Ok(Some(found)) => {
                            tracing::info!(
                                year,
                                accession = %amendment.accession_number,
                                "amendment supersedes subsidiaries exhibit"
                            );
                            return Ok(FilingLookup::Found(reference(year, amendment, found)));
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!(
                                year,
                                accession = %amendment.accession_number,
                                error = %e,
                                "skipping unreadable amendment"
                            );
                        }
                    }
                }

                Ok(match self.exhibit_in(stable_id, primary).await? {
                    Some(found) => FilingLookup::Found(reference(year, primary, found)),
                    None => FilingLookup::NotFound(format!(
                        "Exhibit 21 not found in {} {}",
                        primary.form, primary.accession_number
                    )),
                })
            }
            None => {
                for amendment in &candidates.amendments {
                    if let Some(found) = self.exhibit_in(stable_id, amendment).await? {
                        return Ok(FilingLookup::Found(reference(year, amendment, found)));
                    }
                }
                Ok(FilingLookup::NotFound(format!(
                    "Exhibit 21 not found in amended filings for {year}"
                )))
            }
        }
    }

    /// Fetch a filing's manifest: the index page, or the directory listing if that is missing.
    pub async fn manifest(&self, stable_id: &str, accession: &str) -> Result<FilingManifest> {
        let urls = self.ctx.urls();
        let folder = urls.filing_folder(stable_id, accession);

        match self
            .ctx
            .fetcher()
            .get(&urls.filing_index_page(stable_id, accession))
            .await
        {
            Ok(doc) => {
                let html = String::from_utf8_lossy(&doc.body);
                let manifest = FilingManifest::from_index_html(&html, &urls.www, &folder);
                if !manifest.is_empty() {
                    return Ok(manifest);
                }
                tracing::debug!(accession, "index page lists no documents");
            }
            Err(e) if e.is_absent() => {
                tracing::debug!(accession, "index page missing, using directory listing");
            }
            Err(e) => return Err(e),
        }

        let doc = self
            .ctx
            .fetcher()
            .get(&urls.filing_directory(stable_id, accession))
            .await?;
        FilingManifest::from_directory_json(&doc.body, &folder)
    }

    /// All annual filings known for the filer (loading the submission index if needed).
    pub async fn annual_filings(&self, stable_id: &str) -> Result<Vec<FilingInfo>> {
        let mut cache = self.ctx.submissions().lock().await;
        if !cache.contains_key(stable_id) {
            let index = self.load_submissions(stable_id).await?;
            cache.insert(stable_id.to_string(), index);
        }
        Ok(cache
            .get(stable_id)
            .map(|index| {
                index
                    .filings()
                    .iter()
                    .filter(|f| f.is_annual() || f.is_annual_amendment())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn exhibit_in(&self, stable_id: &str, filing: &FilingInfo) -> Result<Option<ExhibitMatch>> {
        let manifest = self.manifest(stable_id, &filing.accession_number).await?;
        let found = manifest.find_subsidiaries_exhibit();
        match &found {
            Some(m) => tracing::debug!(
                accession = %filing.accession_number,
                document = %m.entry.document,
                rank = ?m.rank,
                "subsidiaries exhibit located"
            ),
            None => tracing::info!(
                accession = %filing.accession_number,
                documents = manifest.len(),
                "no subsidiaries exhibit in filing"
            ),
        }
        Ok(found)
    }

    async fn load_submissions(&self, stable_id: &str) -> Result<SubmissionIndex> {
        let url = self.ctx.urls().submissions(stable_id);
        tracing::info!(%url, "loading submission index");
        let submissions: CompanySubmissions = self.ctx.fetcher().get_json(&url).await?;
        Ok(SubmissionIndex::new(submissions))
    }

    async fn load_pages_for_year(&self, index: &mut SubmissionIndex, year: i32) -> Result<()> {
        // A fiscal year can be reported in the following calendar year.
        for page in index.pages_covering(year, year + 1) {
            let url = self.ctx.urls().submissions_page(&page.name);
            tracing::info!(%url, year, "loading older submissions page");
            let columns: FilingColumns = self.ctx.fetcher().get_json(&url).await?;
            index.merge(&columns);
            index.mark_loaded(&page.name);
        }
        Ok(())
    }
}

fn reference(year: i32, filing: &FilingInfo, found: ExhibitMatch) -> FilingReference {
    let exhibit_type = Some(found.entry.doc_type).filter(|t| !t.is_empty());
    FilingReference {
        year,
        filing_id: filing.accession_number.clone(),
        document_url: found.entry.url,
        form: filing.form.clone(),
        filing_date: filing.filing_date,
        exhibit_type,
    }
}
