//! Error type shared by the drawing surfaces and the report generator.

use std::path::PathBuf;

#[cfg(feature = "bookmarks")]
use crate::bookmarks::BookmarkError;

/// Errors that can occur while laying out, rendering or saving a report.
#[derive(Debug)]
pub enum ReportError {
    /// Embedded fonts were located but could not be loaded.
    FontLoad(genpdf::error::Error),
    /// The PDF backend rejected an operation.
    Pdf(printpdf::Error),
    /// A drawing primitive had non-finite coordinates or a negative extent.
    InvalidPrimitive {
        /// Kind of primitive, e.g. `"rect"`.
        primitive: &'static str,
        /// Description of the offending values.
        detail: String,
    },
    /// A page index beyond the end of the document was selected.
    PageOutOfRange {
        /// The requested zero-based page index.
        index: usize,
        /// Number of pages in the document.
        count: usize,
    },
    /// Writing the finished report failed.
    Io {
        /// Target path of the write.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Section outlines could not be attached to the PDF.
    #[cfg(feature = "bookmarks")]
    Bookmarks(BookmarkError),
}

impl ReportError {
    pub(crate) fn invalid(primitive: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidPrimitive {
            primitive,
            detail: detail.into(),
        }
    }
}

impl From<genpdf::error::Error> for ReportError {
    fn from(err: genpdf::error::Error) -> Self {
        Self::FontLoad(err)
    }
}

impl From<printpdf::Error> for ReportError {
    fn from(err: printpdf::Error) -> Self {
        Self::Pdf(err)
    }
}

#[cfg(feature = "bookmarks")]
impl From<BookmarkError> for ReportError {
    fn from(err: BookmarkError) -> Self {
        Self::Bookmarks(err)
    }
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FontLoad(err) => write!(f, "Failed to load report fonts: {err}"),
            Self::Pdf(err) => write!(f, "PDF backend error: {err}"),
            Self::InvalidPrimitive { primitive, detail } => {
                write!(f, "Invalid {primitive} primitive: {detail}")
            }
            Self::PageOutOfRange { index, count } => write!(
                f,
                "Page index {} is out of range for a document with {} page(s)",
                index, count
            ),
            Self::Io { path, .. } => write!(f, "Failed to write report to {}", path.display()),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => write!(f, "Failed to attach section outlines: {err}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) => Some(err),
            Self::Pdf(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => Some(err),
            Self::InvalidPrimitive { .. } | Self::PageOutOfRange { .. } => None,
        }
    }
}
