//! Page layout of the project analytics report.
//!
//! The report is an ordered list of section functions.  Each one receives the
//! vertical [`Cursor`] left by its predecessor, draws onto the canvas and
//! returns the cursor for the next section, so the whole document is a single
//! `try_fold` over [`SECTION_COUNT`] steps.  Once every section has been drawn,
//! the footer caption is stamped on every page, including pages that were
//! only added because content overflowed.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use log::debug;

use crate::canvas::{Align, Canvas, Point, Rect, TextStyle};
use crate::error::ReportError;
use crate::logo::Logo;
use crate::model::{ProjectMember, ProjectStatistics};
use crate::style::{ReportStyle, Rgb};

/// Placeholder shown when no owner can be resolved.
pub const NO_OWNER: &str = "\u{2014}";

/// Subtitle drawn under the project name.
pub const REPORT_SUBTITLE: &str = "Project Analytics Report";

/// Categories beyond this count are not rendered.
pub const MAX_CATEGORIES: usize = 10;

const MAX_LABEL_CHARS: usize = 20;
const TRUNCATED_LABEL_CHARS: usize = 18;
const ELLIPSIS: &str = "...";
const OWNER_ROLES: &[&str] = &["owner", "project manager", "manager"];

pub const OVERVIEW_HEADING: &str = "Project Overview";
pub const SNAPSHOT_HEADING: &str = "Task Status";
pub const STATUS_HEADING: &str = "Tasks by Status";
pub const PRIORITY_HEADING: &str = "Tasks by Priority";
pub const CATEGORY_HEADING: &str = "Tasks by Category";

/// Number of section steps in a report.
pub const SECTION_COUNT: usize = 6;

/// Everything a single render reads.
#[derive(Clone, Copy, Debug)]
pub struct ReportInput<'a> {
    pub statistics: &'a ProjectStatistics,
    pub members: &'a [ProjectMember],
    pub owner_id: Option<&'a str>,
    pub generated_at: DateTime<Local>,
    pub logo: Option<&'a Logo>,
}

impl<'a> ReportInput<'a> {
    pub fn new(statistics: &'a ProjectStatistics, generated_at: DateTime<Local>) -> Self {
        Self {
            statistics,
            members: &[],
            owner_id: None,
            generated_at,
            logo: None,
        }
    }

    pub fn with_members(mut self, members: &'a [ProjectMember]) -> Self {
        self.members = members;
        self
    }

    pub fn with_owner_id(mut self, owner_id: Option<&'a str>) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn with_logo(mut self, logo: Option<&'a Logo>) -> Self {
        self.logo = logo;
        self
    }
}

/// Vertical position, in millimetres from the top edge of the current page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    pub y: f64,
}

impl Cursor {
    pub const fn at(y: f64) -> Self {
        Self { y }
    }

    fn advance(self, by: f64) -> Self {
        Self { y: self.y + by }
    }
}

/// The page on which a titled section begins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionMark {
    pub title: String,
    /// One-based page number.
    pub page: usize,
}

/// Result of laying out a report.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSummary {
    pub page_count: usize,
    pub sections: Vec<SectionMark>,
    /// Cursor position after the last section, on the last page.
    pub end: Cursor,
}

impl LayoutSummary {
    pub fn has_section(&self, title: &str) -> bool {
        self.sections.iter().any(|mark| mark.title == title)
    }
}

/// Drawing context shared by the section steps.
struct Painter<'c, C: Canvas> {
    canvas: &'c mut C,
    style: &'c ReportStyle,
    sections: Vec<SectionMark>,
}

type Section<C> = fn(&mut Painter<'_, C>, &ReportInput<'_>, Cursor) -> Result<Cursor, ReportError>;

impl<'c, C: Canvas> Painter<'c, C> {
    fn new(canvas: &'c mut C, style: &'c ReportStyle) -> Self {
        Self {
            canvas,
            style,
            sections: Vec::new(),
        }
    }

    fn text_style(&self, size: u8, color: Rgb) -> TextStyle {
        TextStyle::new(size, color)
    }

    /// Moves to a fresh page when `height` does not fit below the cursor.
    fn reserve(&mut self, cursor: Cursor, height: f64) -> Result<Cursor, ReportError> {
        if cursor.y + height <= self.style.content_bottom() {
            return Ok(cursor);
        }
        self.canvas.add_page()?;
        debug!(
            "Content overflowed; continuing on page {}",
            self.canvas.page_count()
        );
        Ok(Cursor::at(self.style.margin))
    }

    /// Draws a section heading and records where the section starts.
    ///
    /// The heading is kept together with at least `first_row` of content.
    fn heading(
        &mut self,
        cursor: Cursor,
        title: &str,
        first_row: f64,
    ) -> Result<Cursor, ReportError> {
        let spacing = self.style.spacing.heading;
        let cursor = self.reserve(cursor, spacing + first_row)?;
        self.sections.push(SectionMark {
            title: title.to_string(),
            page: self.canvas.current_page() + 1,
        });

        let margin = self.style.margin;
        let style = self
            .text_style(self.style.font_sizes.heading, self.style.palette.text)
            .bold();
        self.canvas
            .draw_text(title, Point::new(margin, cursor.y + 6.0), style)?;
        self.canvas.stroke_line(
            Point::new(margin, cursor.y + 8.0),
            Point::new(margin + self.style.content_width(), cursor.y + 8.0),
            self.style.palette.divider,
            0.3,
        )?;
        Ok(cursor.advance(spacing))
    }

    /// Lays `cells` out two per row; a trailing half row still advances once.
    fn two_column_grid(
        &mut self,
        cursor: Cursor,
        cells: &[(String, String)],
        row_height: f64,
        draw_cell: fn(&mut Self, f64, f64, f64, &(String, String)) -> Result<(), ReportError>,
    ) -> Result<Cursor, ReportError> {
        let column_width = self.style.content_width() / 2.0;
        let mut cursor = cursor;
        for (index, cell) in cells.iter().enumerate() {
            let column = index % 2;
            if column == 0 {
                cursor = self.reserve(cursor, row_height)?;
            }
            let x = self.style.margin + column as f64 * column_width;
            draw_cell(self, x, cursor.y, column_width, cell)?;
            if column == 1 {
                cursor = cursor.advance(row_height);
            }
        }
        if cells.len() % 2 == 1 {
            cursor = cursor.advance(row_height);
        }
        Ok(cursor)
    }

    fn stat_cell(
        &mut self,
        x: f64,
        y: f64,
        _width: f64,
        (label, value): &(String, String),
    ) -> Result<(), ReportError> {
        let sizes = self.style.font_sizes;
        let palette = &self.style.palette;
        let label_style = self.text_style(sizes.caption, palette.muted_text);
        let value_style = self.text_style(sizes.stat_value, palette.text).bold();
        self.canvas
            .draw_text(label, Point::new(x, y + 5.0), label_style)?;
        self.canvas
            .draw_text(value, Point::new(x, y + 12.0), value_style)
    }

    fn count_cell(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        (label, value): &(String, String),
    ) -> Result<(), ReportError> {
        let sizes = self.style.font_sizes;
        let palette = &self.style.palette;
        let label_style = self.text_style(sizes.body, palette.text);
        let value_style = self
            .text_style(sizes.body, palette.brand)
            .bold()
            .aligned(Align::Right);
        self.canvas
            .draw_text(label, Point::new(x, y + 5.0), label_style)?;
        self.canvas
            .draw_text(value, Point::new(x + width - 8.0, y + 5.0), value_style)
    }
}

/// Renders the whole report onto `canvas`.
///
/// The canvas is expected to be fresh: drawing starts on its current page.
pub fn layout_report<C: Canvas>(
    canvas: &mut C,
    style: &ReportStyle,
    input: &ReportInput<'_>,
) -> Result<LayoutSummary, ReportError> {
    let sections: [Section<C>; SECTION_COUNT] = [
        header,
        overview,
        status_snapshot,
        status_breakdown,
        priority_breakdown,
        category_breakdown,
    ];

    let mut painter = Painter::new(canvas, style);
    let end = sections
        .iter()
        .try_fold(Cursor::at(0.0), |cursor, section| {
            section(&mut painter, input, cursor)
        })?;
    stamp_footers(&mut painter)?;

    let summary = LayoutSummary {
        page_count: painter.canvas.page_count(),
        sections: painter.sections,
        end,
    };
    debug!(
        "Laid out report for '{}' on {} page(s)",
        input.statistics.project_name, summary.page_count
    );
    Ok(summary)
}

fn header<C: Canvas>(
    painter: &mut Painter<'_, C>,
    input: &ReportInput<'_>,
    cursor: Cursor,
) -> Result<Cursor, ReportError> {
    let style = painter.style;
    let palette = &style.palette;
    let sizes = style.font_sizes;
    let page = painter.canvas.page_size();
    let band = Rect::new(0.0, cursor.y, page.width, style.header_height);
    painter.canvas.fill_rect(band, palette.brand)?;

    let mut text_x = style.margin;
    if let Some(logo) = input.logo {
        let (width, height) = logo_extent(logo, style.logo_width_mm, style.header_height - 8.0);
        let top = cursor.y + (style.header_height - height) / 2.0;
        let flattened = Logo::from_image(logo.flattened(palette.brand));
        painter
            .canvas
            .draw_image(&flattened, Rect::new(style.margin, top, width, height))?;
        text_x += width + 6.0;
    }

    let title = painter.text_style(sizes.title, palette.on_brand).bold();
    let subtitle = painter.text_style(sizes.subtitle, palette.on_brand);
    let caption = painter.text_style(sizes.caption, palette.on_brand);
    let body = painter.text_style(sizes.body, palette.on_brand);

    let stats = input.statistics;
    painter.canvas.draw_text(
        &stats.project_name,
        Point::new(text_x, cursor.y + 14.0),
        title,
    )?;
    painter.canvas.draw_text(
        REPORT_SUBTITLE,
        Point::new(text_x, cursor.y + 21.0),
        subtitle,
    )?;
    painter.canvas.draw_text(
        &format!(
            "Generated: {}",
            format_timestamp(&input.generated_at, &style.timestamp_format)
        ),
        Point::new(text_x, cursor.y + 28.0),
        caption,
    )?;
    painter.canvas.draw_text(
        &format!(
            "Owner: {}  |  Members: {}",
            owner_label(input.members, input.owner_id),
            stats.member_count
        ),
        Point::new(text_x, cursor.y + 35.0),
        body,
    )?;

    Ok(cursor.advance(style.header_height + style.spacing.section_gap))
}

/// Logo size at `width`, shrunk to `max_height` without changing its aspect ratio.
fn logo_extent(logo: &Logo, width: f64, max_height: f64) -> (f64, f64) {
    let height = logo.height_for_width(width);
    if height <= max_height {
        (width, height)
    } else {
        (max_height * logo.aspect_ratio(), max_height)
    }
}

fn overview<C: Canvas>(
    painter: &mut Painter<'_, C>,
    input: &ReportInput<'_>,
    cursor: Cursor,
) -> Result<Cursor, ReportError> {
    let stats = input.statistics;
    let row = painter.style.spacing.stat_row;
    let cells = [
        ("Team Members".to_string(), stats.member_count.to_string()),
        ("Main Tasks".to_string(), stats.main_task_count.to_string()),
        ("Total Tasks".to_string(), stats.sub_task_count.to_string()),
        ("Completion Rate".to_string(), percentage(stats.completion_rate)),
    ];

    let cursor = painter.heading(cursor, OVERVIEW_HEADING, row)?;
    let cursor = painter.two_column_grid(cursor, &cells, row, Painter::stat_cell)?;
    Ok(cursor.advance(painter.style.spacing.section_gap))
}

fn status_snapshot<C: Canvas>(
    painter: &mut Painter<'_, C>,
    input: &ReportInput<'_>,
    cursor: Cursor,
) -> Result<Cursor, ReportError> {
    let stats = input.statistics;
    let style = painter.style;
    let palette = &style.palette;
    let row = style.spacing.snapshot_row;
    let rows = [
        ("Completed", stats.completed_sub_tasks, palette.completed),
        ("Remaining", stats.remaining_sub_tasks(), palette.remaining),
        ("Overdue", stats.overdue_sub_tasks, palette.overdue),
    ];

    let label_style = painter.text_style(style.font_sizes.body, palette.text);
    let value_style = label_style.bold().aligned(Align::Right);
    let right = style.margin + style.content_width();

    let mut cursor = painter.heading(cursor, SNAPSHOT_HEADING, row)?;
    for (label, value, color) in rows {
        cursor = painter.reserve(cursor, row)?;
        let baseline = cursor.y + row / 2.0 + 1.5;
        painter
            .canvas
            .fill_circle(Point::new(style.margin + 2.0, cursor.y + row / 2.0), 1.8, color)?;
        painter
            .canvas
            .draw_text(label, Point::new(style.margin + 7.0, baseline), label_style)?;
        painter
            .canvas
            .draw_text(&value.to_string(), Point::new(right, baseline), value_style)?;
        cursor = cursor.advance(row);
    }
    Ok(cursor.advance(style.spacing.section_gap))
}

fn status_breakdown<C: Canvas>(
    painter: &mut Painter<'_, C>,
    input: &ReportInput<'_>,
    cursor: Cursor,
) -> Result<Cursor, ReportError> {
    let tally = &input.statistics.tasks_by_status;
    if tally.is_empty() {
        return Ok(cursor);
    }

    let style = painter.style;
    let palette = &style.palette;
    let spacing = style.spacing;
    let total = tally.total();

    let label_width = 55.0;
    let count_right = style.margin + label_width + 15.0;
    let track_x = count_right + 5.0;
    let track_width = style.margin + style.content_width() - track_x;
    let label_style = painter.text_style(style.font_sizes.body, palette.text);
    let count_style = label_style.bold().aligned(Align::Right);

    let mut cursor = painter.heading(cursor, STATUS_HEADING, spacing.bar_row)?;
    for (label, count) in tally.entries() {
        cursor = painter.reserve(cursor, spacing.bar_row)?;
        let baseline = cursor.y + spacing.bar_row / 2.0 + 1.5;
        let bar_top = cursor.y + (spacing.bar_row - spacing.bar_height) / 2.0;

        painter
            .canvas
            .draw_text(label, Point::new(style.margin, baseline), label_style)?;
        painter
            .canvas
            .draw_text(&count.to_string(), Point::new(count_right, baseline), count_style)?;
        painter.canvas.fill_rect(
            Rect::new(track_x, bar_top, track_width, spacing.bar_height),
            palette.bar_track,
        )?;
        painter.canvas.fill_rect(
            Rect::new(
                track_x,
                bar_top,
                track_width * fill_ratio(*count, total),
                spacing.bar_height,
            ),
            palette.brand,
        )?;
        cursor = cursor.advance(spacing.bar_row);
    }
    Ok(cursor.advance(spacing.section_gap))
}

fn priority_breakdown<C: Canvas>(
    painter: &mut Painter<'_, C>,
    input: &ReportInput<'_>,
    cursor: Cursor,
) -> Result<Cursor, ReportError> {
    let Some(tally) = input
        .statistics
        .tasks_by_priority
        .as_ref()
        .filter(|tally| !tally.is_empty())
    else {
        return Ok(cursor);
    };

    let row = painter.style.spacing.grid_row;
    let cells: Vec<_> = tally
        .entries()
        .iter()
        .map(|(label, count)| (capitalize(label), count.to_string()))
        .collect();

    let cursor = painter.heading(cursor, PRIORITY_HEADING, row)?;
    let cursor = painter.two_column_grid(cursor, &cells, row, Painter::count_cell)?;
    Ok(cursor.advance(painter.style.spacing.section_gap))
}

fn category_breakdown<C: Canvas>(
    painter: &mut Painter<'_, C>,
    input: &ReportInput<'_>,
    cursor: Cursor,
) -> Result<Cursor, ReportError> {
    let categories = &input.statistics.tasks_by_category;
    if categories.is_empty() {
        return Ok(cursor);
    }

    let row = painter.style.spacing.grid_row;
    let cells: Vec<_> = categories
        .iter()
        .take(MAX_CATEGORIES)
        .map(|category| {
            (
                truncate_label(&category.category_name),
                category.total_tasks.to_string(),
            )
        })
        .collect();

    let cursor = painter.heading(cursor, CATEGORY_HEADING, row)?;
    let cursor = painter.two_column_grid(cursor, &cells, row, Painter::count_cell)?;
    Ok(cursor.advance(painter.style.spacing.section_gap))
}

fn stamp_footers<C: Canvas>(painter: &mut Painter<'_, C>) -> Result<(), ReportError> {
    let style = painter.style;
    let caption = painter
        .text_style(style.font_sizes.caption, style.palette.muted_text)
        .aligned(Align::Center);
    let page = painter.canvas.page_size();
    let at = Point::new(page.width / 2.0, page.height - style.footer_offset);

    let pages = painter.canvas.page_count();
    for page in 0..pages {
        painter.canvas.set_page(page)?;
        painter
            .canvas
            .draw_text(&style.footer_caption, at, caption)?;
    }
    Ok(())
}

/// First member with an owner-like role, else the member matching `owner_id`.
pub fn resolve_owner<'a>(
    members: &'a [ProjectMember],
    owner_id: Option<&str>,
) -> Option<&'a ProjectMember> {
    members
        .iter()
        .find(|member| {
            member.role.as_deref().is_some_and(|role| {
                let role = role.trim();
                OWNER_ROLES
                    .iter()
                    .any(|candidate| role.eq_ignore_ascii_case(candidate))
            })
        })
        .or_else(|| {
            let owner_id = owner_id?;
            members.iter().find(|member| member.id == owner_id)
        })
}

/// Display name of the resolved owner, or [`NO_OWNER`].
pub fn owner_label(members: &[ProjectMember], owner_id: Option<&str>) -> String {
    resolve_owner(members, owner_id)
        .map(ProjectMember::display_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| NO_OWNER.to_string())
}

/// `0.756` becomes `"76%"`.
pub fn percentage(rate: f64) -> String {
    format!("{}%", (rate * 100.0).round() as i64)
}

/// Share of `total` taken by `count`, within `[0, 1]`; zero when `total` is zero.
pub fn fill_ratio(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64).min(1.0)
    }
}

/// Shortens labels longer than 20 characters to 18 characters plus `...`.
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > MAX_LABEL_CHARS {
        let mut short: String = label.chars().take(TRUNCATED_LABEL_CHARS).collect();
        short.push_str(ELLIPSIS);
        short
    } else {
        label.to_string()
    }
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Formats with a `chrono` pattern, falling back to RFC 2822 on a bad pattern.
pub fn format_timestamp(timestamp: &DateTime<Local>, format: &str) -> String {
    let mut formatted = String::new();
    if write!(formatted, "{}", timestamp.format(format)).is_err() {
        return timestamp.to_rfc2822();
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn member(id: &str, first: &str, last: &str, role: Option<&str>) -> ProjectMember {
        ProjectMember::new(id, first, last).with_role(role.map(str::to_string))
    }

    #[test]
    fn role_match_precedes_owner_id() {
        let members = [
            member("1", "Olive", "Owner", None),
            member("2", "Max", "Manager", Some("Manager")),
        ];
        let owner = resolve_owner(&members, Some("1")).expect("owner resolved");
        assert_eq!(owner.id, "2");
    }

    #[test]
    fn owner_roles_are_case_insensitive() {
        let members = [
            member("1", "Dev", "One", Some("developer")),
            member("2", "Pat", "Lead", Some("  PROJECT MANAGER ")),
        ];
        assert_eq!(resolve_owner(&members, None).map(|m| m.id.as_str()), Some("2"));
    }

    #[test]
    fn falls_back_to_owner_id_then_placeholder() {
        let members = [
            member("1", "Ann", "A", Some("developer")),
            member("7", "Bo", "B", None),
        ];
        assert_eq!(owner_label(&members, Some("7")), "Bo B");
        assert_eq!(owner_label(&members, Some("9")), NO_OWNER);
        assert_eq!(owner_label(&[], None), NO_OWNER);
    }

    #[test]
    fn formats_percentages_and_ratios() {
        assert_eq!(percentage(0.0), "0%");
        assert_eq!(percentage(0.756), "76%");
        assert_eq!(percentage(1.0), "100%");
        assert_eq!(fill_ratio(7, 10), 0.7);
        assert_eq!(fill_ratio(3, 10), 0.3);
        assert_eq!(fill_ratio(5, 0), 0.0);
        assert_eq!(fill_ratio(9, 4), 1.0);
    }

    #[test]
    fn truncates_long_labels() {
        let name = "A".repeat(25);
        let short = truncate_label(&name);
        assert_eq!(short, format!("{}...", "A".repeat(18)));
        assert_eq!(short.chars().count(), 21);
        assert_eq!(truncate_label(&"B".repeat(20)), "B".repeat(20));
        assert_eq!(truncate_label("Ünïcödé ćätęgörý nämé x"), "Ünïcödé ćätęgörý n...");
    }

    #[test]
    fn capitalizes_first_letter_only() {
        assert_eq!(capitalize("high"), "High");
        assert_eq!(capitalize("hIGH"), "HIGH");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn timestamp_uses_pattern_or_falls_back() {
        let when = Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(
            format_timestamp(&when, "%-m/%-d/%Y, %-I:%M:%S %p"),
            "3/5/2024, 2:07:09 PM"
        );
        assert_eq!(format_timestamp(&when, "%Q"), when.to_rfc2822());
    }
}
