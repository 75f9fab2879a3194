//! Drawing surface abstraction used by the layout engine.
//!
//! Coordinates are millimetres measured from the top-left corner of the page;
//! text is anchored at its baseline.  [`RecordingCanvas`] keeps every drawing
//! command in memory and backs the layout tests, while
//! [`crate::pdf::PdfCanvas`] turns the same calls into a PDF document.

use crate::error::ReportError;
use crate::logo::Logo;
use crate::style::{PageSize, Rgb};

/// Points per millimetre.
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// A position on the page.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Horizontal anchoring of a text run relative to its position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Appearance of a text run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in points.
    pub size: u8,
    pub weight: FontWeight,
    pub color: Rgb,
    pub align: Align,
}

impl TextStyle {
    pub fn new(size: u8, color: Rgb) -> Self {
        Self {
            size,
            weight: FontWeight::Regular,
            color,
            align: Align::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// The document canvas the report is drawn on.
///
/// Implementations own every page they allocate.  Drawing always targets the
/// current page; [`Canvas::add_page`] appends a page and makes it current.
pub trait Canvas {
    fn page_size(&self) -> PageSize;

    fn page_count(&self) -> usize;

    /// Zero-based index of the page drawing calls go to.
    fn current_page(&self) -> usize;

    fn add_page(&mut self) -> Result<(), ReportError>;

    /// Makes an existing page current.
    fn set_page(&mut self, index: usize) -> Result<(), ReportError>;

    /// Advance width of `text` in millimetres.
    fn text_width(&self, text: &str, weight: FontWeight, size: u8) -> f64;

    fn draw_text(&mut self, text: &str, at: Point, style: TextStyle) -> Result<(), ReportError>;

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), ReportError>;

    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        color: Rgb,
        width: f64,
    ) -> Result<(), ReportError>;

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgb) -> Result<(), ReportError>;

    fn draw_image(&mut self, logo: &Logo, rect: Rect) -> Result<(), ReportError>;
}

/// Left edge of a text run once alignment is applied.
pub fn aligned_x(x: f64, width: f64, align: Align) -> f64 {
    match align {
        Align::Left => x,
        Align::Center => x - width / 2.0,
        Align::Right => x - width,
    }
}

pub(crate) fn check_point(primitive: &'static str, point: Point) -> Result<(), ReportError> {
    if point.x.is_finite() && point.y.is_finite() {
        Ok(())
    } else {
        Err(ReportError::invalid(
            primitive,
            format!("non-finite position ({}, {})", point.x, point.y),
        ))
    }
}

pub(crate) fn check_extent(primitive: &'static str, value: f64) -> Result<(), ReportError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ReportError::invalid(
            primitive,
            format!("extent {} must be finite and non-negative", value),
        ))
    }
}

pub(crate) fn check_rect(primitive: &'static str, rect: Rect) -> Result<(), ReportError> {
    check_point(primitive, Point::new(rect.x, rect.y))?;
    check_extent(primitive, rect.width)?;
    check_extent(primitive, rect.height)
}

/// Average advance of a glyph relative to the font size, per weight.
///
/// Used wherever real font metrics are unavailable.
pub(crate) fn approximate_text_width(text: &str, weight: FontWeight, size: u8) -> f64 {
    let factor = match weight {
        FontWeight::Regular => 0.5,
        FontWeight::Bold => 0.55,
    };
    text.chars().count() as f64 * f64::from(size) * factor / PT_PER_MM
}

/// A single recorded drawing operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Text {
        text: String,
        at: Point,
        style: TextStyle,
    },
    Rect {
        rect: Rect,
        color: Rgb,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb,
        width: f64,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Rgb,
    },
    Image {
        rect: Rect,
        pixel_width: u32,
        pixel_height: u32,
    },
}

impl DrawCommand {
    /// The text of a text command.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// One page of a [`RecordingCanvas`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordedPage {
    pub commands: Vec<DrawCommand>,
}

impl RecordedPage {
    /// Text runs on the page in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(DrawCommand::text)
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text == needle)
    }
}

/// In-memory canvas that records every drawing command per page.
#[derive(Clone, Debug)]
pub struct RecordingCanvas {
    size: PageSize,
    pages: Vec<RecordedPage>,
    current: usize,
}

impl RecordingCanvas {
    /// Creates a canvas with a single empty page.
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: vec![RecordedPage::default()],
            current: 0,
        }
    }

    pub fn pages(&self) -> &[RecordedPage] {
        &self.pages
    }

    /// Every text run across all pages in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.pages.iter().flat_map(RecordedPage::texts).collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages.iter().any(|page| page.contains_text(needle))
    }

    fn record(&mut self, command: DrawCommand) {
        self.pages[self.current].commands.push(command);
    }
}

impl Canvas for RecordingCanvas {
    fn page_size(&self) -> PageSize {
        self.size
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn add_page(&mut self) -> Result<(), ReportError> {
        self.pages.push(RecordedPage::default());
        self.current = self.pages.len() - 1;
        Ok(())
    }

    fn set_page(&mut self, index: usize) -> Result<(), ReportError> {
        if index >= self.pages.len() {
            return Err(ReportError::PageOutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    fn text_width(&self, text: &str, weight: FontWeight, size: u8) -> f64 {
        approximate_text_width(text, weight, size)
    }

    fn draw_text(&mut self, text: &str, at: Point, style: TextStyle) -> Result<(), ReportError> {
        check_point("text", at)?;
        self.record(DrawCommand::Text {
            text: text.to_string(),
            at,
            style,
        });
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), ReportError> {
        check_rect("rect", rect)?;
        self.record(DrawCommand::Rect { rect, color });
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        color: Rgb,
        width: f64,
    ) -> Result<(), ReportError> {
        check_point("line", from)?;
        check_point("line", to)?;
        check_extent("line", width)?;
        self.record(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
        Ok(())
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgb) -> Result<(), ReportError> {
        check_point("circle", center)?;
        check_extent("circle", radius)?;
        self.record(DrawCommand::Circle {
            center,
            radius,
            color,
        });
        Ok(())
    }

    fn draw_image(&mut self, logo: &Logo, rect: Rect) -> Result<(), ReportError> {
        check_rect("image", rect)?;
        let (pixel_width, pixel_height) = logo.pixel_size();
        self.record(DrawCommand::Image {
            rect,
            pixel_width,
            pixel_height,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_finite_primitives() {
        let mut canvas = RecordingCanvas::new(PageSize::A4);
        let err = canvas
            .fill_rect(Rect::new(0.0, f64::NAN, 10.0, 10.0), Rgb::BLACK)
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::InvalidPrimitive {
                primitive: "rect",
                ..
            }
        ));
        assert!(canvas
            .fill_rect(Rect::new(0.0, 0.0, -1.0, 10.0), Rgb::BLACK)
            .is_err());
        assert!(canvas.pages()[0].commands.is_empty());
    }

    #[test]
    fn pages_are_selectable() {
        let mut canvas = RecordingCanvas::new(PageSize::A4);
        canvas.add_page().unwrap();
        assert_eq!(canvas.page_count(), 2);
        assert_eq!(canvas.current_page(), 1);

        canvas.set_page(0).unwrap();
        canvas
            .draw_text("first", Point::new(1.0, 1.0), TextStyle::new(10, Rgb::BLACK))
            .unwrap();
        assert!(canvas.pages()[0].contains_text("first"));
        assert!(matches!(
            canvas.set_page(2),
            Err(ReportError::PageOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn alignment_offsets_text_origin() {
        assert_eq!(aligned_x(100.0, 20.0, Align::Left), 100.0);
        assert_eq!(aligned_x(100.0, 20.0, Align::Center), 90.0);
        assert_eq!(aligned_x(100.0, 20.0, Align::Right), 80.0);
    }
}
