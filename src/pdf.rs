//! [`Canvas`] implementation writing a PDF document through `printpdf`.

use std::io::BufWriter;

use image::DynamicImage;
use log::{debug, warn};
use printpdf::indices::{PdfLayerIndex, PdfPageIndex};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};

use crate::canvas::{
    aligned_x, approximate_text_width, check_extent, check_point, check_rect, Canvas, FontWeight,
    Point, Rect, TextStyle, PT_PER_MM,
};
use crate::error::ReportError;
use crate::fonts::{self, FontMetrics};
use crate::logo::Logo;
use crate::style::{PageSize, Rgb};

const LAYER_NAME: &str = "Report";
const IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

enum FontSet {
    Embedded {
        regular: IndirectFontRef,
        bold: IndirectFontRef,
        metrics: FontMetrics,
    },
    Builtin {
        regular: IndirectFontRef,
        bold: IndirectFontRef,
    },
}

impl FontSet {
    fn font(&self, weight: FontWeight) -> &IndirectFontRef {
        let (regular, bold) = match self {
            Self::Embedded { regular, bold, .. } | Self::Builtin { regular, bold } => {
                (regular, bold)
            }
        };
        match weight {
            FontWeight::Regular => regular,
            FontWeight::Bold => bold,
        }
    }
}

/// A PDF document being drawn page by page.
pub struct PdfCanvas {
    document: PdfDocumentReference,
    size: PageSize,
    pages: Vec<(PdfPageIndex, PdfLayerIndex)>,
    current: usize,
    fonts: FontSet,
}

impl PdfCanvas {
    /// Creates a single-page document, embedding Roboto when it can be located.
    pub fn new(title: &str, size: PageSize) -> Result<Self, ReportError> {
        let (document, page, layer) =
            PdfDocument::new(title, Mm(size.width), Mm(size.height), LAYER_NAME);

        let fonts = match fonts::load_embedded_fonts() {
            Ok(embedded) => {
                let metrics = FontMetrics::new(&embedded)?;
                let regular = document.add_external_font(embedded.regular.as_slice())?;
                let bold = document.add_external_font(embedded.bold.as_slice())?;
                debug!(
                    "Embedding {} fonts from {}",
                    fonts::DEFAULT_FONT_FAMILY_NAME,
                    embedded.directory.display()
                );
                FontSet::Embedded {
                    regular,
                    bold,
                    metrics,
                }
            }
            Err(err) if fonts::fonts_missing(&err) => {
                warn!("Embedded fonts unavailable ({}); using built-in Helvetica.", err);
                builtin_fonts(&document)?
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self::from_parts(document, size, page, layer, fonts))
    }

    /// Creates a single-page document that only uses the built-in Helvetica pair.
    pub fn with_builtin_fonts(title: &str, size: PageSize) -> Result<Self, ReportError> {
        let (document, page, layer) =
            PdfDocument::new(title, Mm(size.width), Mm(size.height), LAYER_NAME);
        let fonts = builtin_fonts(&document)?;
        Ok(Self::from_parts(document, size, page, layer, fonts))
    }

    fn from_parts(
        document: PdfDocumentReference,
        size: PageSize,
        page: PdfPageIndex,
        layer: PdfLayerIndex,
        fonts: FontSet,
    ) -> Self {
        Self {
            document,
            size,
            pages: vec![(page, layer)],
            current: 0,
            fonts,
        }
    }

    /// Whether text is set in the embedded family rather than Helvetica.
    pub fn uses_embedded_fonts(&self) -> bool {
        matches!(self.fonts, FontSet::Embedded { .. })
    }

    /// Serializes the document.
    pub fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut writer = BufWriter::new(Vec::new());
        self.document.save(&mut writer)?;
        writer
            .into_inner()
            .map_err(|err| ReportError::Pdf(printpdf::Error::Io(err.into_error())))
    }

    fn layer(&self) -> PdfLayerReference {
        let (page, layer) = self.pages[self.current];
        self.document.get_page(page).get_layer(layer)
    }

    /// Converts a top-left based y coordinate to PDF's bottom-left origin.
    fn flip(&self, y: f64) -> f64 {
        self.size.height - y
    }

    fn pdf_point(&self, point: Point) -> printpdf::Point {
        printpdf::Point::new(Mm(point.x), Mm(self.flip(point.y)))
    }
}

fn builtin_fonts(document: &PdfDocumentReference) -> Result<FontSet, ReportError> {
    Ok(FontSet::Builtin {
        regular: document.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: document.add_builtin_font(BuiltinFont::HelveticaBold)?,
    })
}

fn pdf_color(color: Rgb) -> Color {
    let (r, g, b) = color.to_unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

fn filled(points: Vec<(printpdf::Point, bool)>) -> Line {
    Line {
        points,
        is_closed: true,
        has_fill: true,
        has_stroke: false,
        is_clipping_path: false,
    }
}

impl Canvas for PdfCanvas {
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
        let indices =
            self.document
                .add_page(Mm(self.size.width), Mm(self.size.height), LAYER_NAME);
        self.pages.push(indices);
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
        match &self.fonts {
            FontSet::Embedded { metrics, .. } => metrics.text_width(text, weight, size),
            FontSet::Builtin { .. } => approximate_text_width(text, weight, size),
        }
    }

    fn draw_text(&mut self, text: &str, at: Point, style: TextStyle) -> Result<(), ReportError> {
        check_point("text", at)?;
        if text.is_empty() {
            return Ok(());
        }
        let width = self.text_width(text, style.weight, style.size);
        let x = aligned_x(at.x, width, style.align);
        let layer = self.layer();
        layer.set_fill_color(pdf_color(style.color));
        layer.use_text(
            text,
            f64::from(style.size),
            Mm(x),
            Mm(self.flip(at.y)),
            self.fonts.font(style.weight),
        );
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> Result<(), ReportError> {
        check_rect("rect", rect)?;
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Ok(());
        }
        let corners = [
            Point::new(rect.x, rect.y + rect.height),
            Point::new(rect.x + rect.width, rect.y + rect.height),
            Point::new(rect.x + rect.width, rect.y),
            Point::new(rect.x, rect.y),
        ];
        let points = corners
            .iter()
            .map(|corner| (self.pdf_point(*corner), false))
            .collect();
        let layer = self.layer();
        layer.set_fill_color(pdf_color(color));
        layer.add_shape(filled(points));
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
        let layer = self.layer();
        layer.set_outline_color(pdf_color(color));
        layer.set_outline_thickness(width * PT_PER_MM);
        layer.add_shape(Line {
            points: vec![(self.pdf_point(from), false), (self.pdf_point(to), false)],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        });
        Ok(())
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgb) -> Result<(), ReportError> {
        check_point("circle", center)?;
        check_extent("circle", radius)?;
        let points = printpdf::utils::calculate_points_for_circle(
            Mm(radius),
            Mm(center.x),
            Mm(self.flip(center.y)),
        );
        let layer = self.layer();
        layer.set_fill_color(pdf_color(color));
        layer.add_shape(filled(points));
        Ok(())
    }

    fn draw_image(&mut self, logo: &Logo, rect: Rect) -> Result<(), ReportError> {
        check_rect("image", rect)?;
        let image = match logo.image() {
            DynamicImage::ImageRgb8(_) => logo.image().clone(),
            _ => logo.flattened(Rgb::WHITE),
        };
        let (px_width, px_height) = logo.pixel_size();
        if px_width == 0 || px_height == 0 {
            return Ok(());
        }
        let natural_width = MM_PER_INCH * f64::from(px_width) / IMAGE_DPI;
        let natural_height = MM_PER_INCH * f64::from(px_height) / IMAGE_DPI;

        printpdf::Image::from_dynamic_image(&image).add_to_layer(
            self.layer(),
            Some(Mm(rect.x)),
            Some(Mm(self.flip(rect.y + rect.height))),
            None,
            Some(rect.width / natural_width),
            Some(rect.height / natural_height),
            Some(IMAGE_DPI),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_canvas_writes_pdf_bytes() {
        let mut canvas =
            PdfCanvas::with_builtin_fonts("Test", PageSize::A4).expect("canvas is created");
        assert!(!canvas.uses_embedded_fonts());
        canvas
            .fill_rect(Rect::new(10.0, 10.0, 50.0, 20.0), Rgb::new(31, 78, 140))
            .unwrap();
        canvas
            .fill_circle(Point::new(30.0, 50.0), 2.0, Rgb::new(40, 167, 69))
            .unwrap();
        canvas
            .draw_text("Hello", Point::new(20.0, 80.0), TextStyle::new(12, Rgb::BLACK))
            .unwrap();
        canvas.add_page().unwrap();
        assert_eq!(canvas.page_count(), 2);

        let bytes = canvas.finish().expect("document serializes");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn set_page_is_bounds_checked() {
        let mut canvas = PdfCanvas::with_builtin_fonts("Test", PageSize::A4).unwrap();
        assert!(canvas.set_page(0).is_ok());
        assert!(matches!(
            canvas.set_page(1),
            Err(ReportError::PageOutOfRange { index: 1, count: 1 })
        ));
    }
}
