//! Report generation entry points.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;

use crate::canvas::Canvas;
use crate::error::ReportError;
use crate::layout::{self, LayoutSummary, ReportInput, SectionMark};
use crate::logo::{self, LogoSource};
use crate::model::{ProjectMember, ProjectStatistics};
use crate::pdf::PdfCanvas;
use crate::style::ReportStyle;

const FILE_NAME_SUFFIX: &str = "_Analytics_Report.pdf";

/// Builds project analytics reports.
///
/// ```no_run
/// use project_report::model::ProjectStatistics;
/// use project_report::report::ReportGenerator;
///
/// let stats = ProjectStatistics::new("Q3 Launch");
/// let report = ReportGenerator::new().render(&stats, &[], None)?;
/// report.save("reports")?;
/// # Ok::<(), project_report::error::ReportError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ReportGenerator {
    style: ReportStyle,
    logo: Option<LogoSource>,
    generated_at: Option<DateTime<Local>>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator {
    /// A generator with the default style and the bundled logo.
    pub fn new() -> Self {
        Self {
            style: ReportStyle::default(),
            logo: Some(LogoSource::Bundled),
            generated_at: None,
        }
    }

    pub fn with_style(mut self, style: ReportStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the header logo; `None` renders the header without one.
    pub fn with_logo(mut self, logo: impl Into<Option<LogoSource>>) -> Self {
        self.logo = logo.into();
        self
    }

    /// Pins the generation timestamp instead of reading the clock per render.
    pub fn with_timestamp(mut self, generated_at: DateTime<Local>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn style(&self) -> &ReportStyle {
        &self.style
    }

    /// Lays the report out on an arbitrary canvas.
    pub fn layout<C: Canvas>(
        &self,
        canvas: &mut C,
        statistics: &ProjectStatistics,
        members: &[ProjectMember],
        owner_id: Option<&str>,
    ) -> Result<LayoutSummary, ReportError> {
        let logo = self
            .logo
            .as_ref()
            .and_then(|source| logo::load_logo(source, self.style.logo_width_px));
        let input = ReportInput::new(
            statistics,
            self.generated_at.unwrap_or_else(Local::now),
        )
        .with_members(members)
        .with_owner_id(owner_id)
        .with_logo(logo.as_ref());
        layout::layout_report(canvas, &self.style, &input)
    }

    /// Renders the report to PDF bytes.
    pub fn render(
        &self,
        statistics: &ProjectStatistics,
        members: &[ProjectMember],
        owner_id: Option<&str>,
    ) -> Result<RenderedReport, ReportError> {
        let mut canvas = PdfCanvas::new(&statistics.project_name, self.style.page_size)?;
        let summary = self.layout(&mut canvas, statistics, members, owner_id)?;
        let bytes = canvas.finish()?;

        let report = RenderedReport {
            bytes,
            page_count: summary.page_count,
            file_name: report_file_name(&statistics.project_name),
            sections: summary.sections,
        };
        info!(
            "Rendered '{}' ({} page(s), {} bytes)",
            report.file_name,
            report.page_count,
            report.bytes.len()
        );
        Ok(report)
    }

    /// Renders the report and adds an outline entry per section.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(
        &self,
        statistics: &ProjectStatistics,
        members: &[ProjectMember],
        owner_id: Option<&str>,
    ) -> Result<RenderedReport, ReportError> {
        let mut report = self.render(statistics, members, owner_id)?;
        report.bytes = crate::bookmarks::apply_section_outline(&report.bytes, &report.sections)?;
        Ok(report)
    }
}

/// A finished report.
#[derive(Clone, Debug)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Suggested file name derived from the project name.
    pub file_name: String,
    pub sections: Vec<SectionMark>,
}

impl RenderedReport {
    /// Writes the report into `directory`, creating it if needed.
    pub fn save(&self, directory: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory).map_err(|source| ReportError::Io {
            path: directory.to_path_buf(),
            source,
        })?;

        let path = directory.join(&self.file_name);
        fs::write(&path, &self.bytes).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        info!("Saved report to {}", path.display());
        Ok(path)
    }
}

/// `"Q3 Launch"` becomes `Q3_Launch_Analytics_Report.pdf`.
pub fn report_file_name(project_name: &str) -> String {
    let mut name = String::with_capacity(project_name.len() + FILE_NAME_SUFFIX.len());
    let mut in_whitespace = false;
    for ch in project_name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                name.push('_');
            }
            in_whitespace = true;
        } else {
            name.push(ch);
            in_whitespace = false;
        }
    }
    name.push_str(FILE_NAME_SUFFIX);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_collapses_whitespace_runs() {
        assert_eq!(report_file_name("Q3 Launch"), "Q3_Launch_Analytics_Report.pdf");
        assert_eq!(
            report_file_name("Big \t  Move"),
            "Big_Move_Analytics_Report.pdf"
        );
        assert_eq!(report_file_name(" Edge "), "_Edge__Analytics_Report.pdf");
        assert_eq!(report_file_name(""), "_Analytics_Report.pdf");
    }

    #[test]
    fn logo_can_be_disabled() {
        let generator = ReportGenerator::new().with_logo(None);
        assert!(generator.logo.is_none());
        let generator = generator.with_logo(LogoSource::Bundled);
        assert_eq!(generator.logo, Some(LogoSource::Bundled));
    }
}
