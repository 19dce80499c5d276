//! markgrade-report — exports for graded results.
//!
//! `csv` writes the spreadsheet of results handed back to graders;
//! `html` renders a self-contained summary page from a
//! [`GradingReport`](markgrade_core::report::GradingReport).

pub mod csv;
pub mod html;

pub use crate::csv::{export_store, read_results_csv, results_file_name, write_results_csv};
pub use crate::html::{generate_html, write_html_report};
