//! Layout engine for paginated project analytics reports.
//!
//! [`report::ReportGenerator`] turns a [`model::ProjectStatistics`] snapshot
//! and the project roster into a PDF.  The layout itself runs against the
//! [`canvas::Canvas`] trait, so it can be exercised on a
//! [`canvas::RecordingCanvas`] without producing a document.

pub mod canvas;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod logo;
pub mod model;
pub mod pdf;
pub mod report;
pub mod samples;
pub mod style;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use error::ReportError;
pub use report::{report_file_name, RenderedReport, ReportGenerator};
