#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/subsidia/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod decode;
mod html;
mod text;

pub mod error;
pub mod jurisdiction;
pub mod parser;
pub mod record;
pub mod strategy;

pub use error::{ExhibitError, Result};
pub use parser::ExhibitParser;
pub use record::SubsidiaryRecord;
pub use strategy::{HeadedTable, HeaderlessTable, Table, TableLayout, TableStrategy};
