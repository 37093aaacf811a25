//! Normalized subsidiary records.

use serde::Serialize;

/// One subsidiary listed in an exhibit.
///
/// The name is never blank: construction trims it and rejects empty input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsidiaryRecord {
    name: String,
    jurisdiction: Option<String>,
    ownership_percent: Option<f64>,
}

impl SubsidiaryRecord {
    /// Create a record, or `None` when the name is blank after trimming.
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let name = collapse_whitespace(name.as_ref());
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            jurisdiction: None,
            ownership_percent: None,
        })
    }

    /// Attach a jurisdiction; blank values are ignored.
    pub fn with_jurisdiction(mut self, jurisdiction: Option<impl AsRef<str>>) -> Self {
        self.jurisdiction = jurisdiction
            .map(|j| collapse_whitespace(j.as_ref()))
            .filter(|j| !j.is_empty());
        self
    }

    /// Attach an ownership percentage.
    pub const fn with_ownership(mut self, percent: Option<f64>) -> Self {
        self.ownership_percent = percent;
        self
    }

    /// Subsidiary name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Jurisdiction of incorporation or organization
    pub fn jurisdiction(&self) -> Option<&str> {
        self.jurisdiction.as_deref()
    }

    /// Ownership share in percent (0-100)
    pub const fn ownership_percent(&self) -> Option<f64> {
        self.ownership_percent
    }
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
