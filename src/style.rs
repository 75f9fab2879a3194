//! Rendering options for the analytics report.
//!
//! Every colour, size and spacing unit the layout engine uses lives in
//! [`ReportStyle`].  The value is handed to the generator once and never looked
//! up from ambient state.

use std::fmt;

/// An sRGB colour with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Channels as fractions in `[0, 1]`.
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Width and height in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 210.0,
        height: 297.0,
    };

    pub const LETTER: PageSize = PageSize {
        width: 215.9,
        height: 279.4,
    };
}

/// Palette used by the report.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    /// Header band fill and bar overlay.
    pub brand: Rgb,
    /// Text drawn on top of the header band.
    pub on_brand: Rgb,
    pub text: Rgb,
    pub muted_text: Rgb,
    pub bar_track: Rgb,
    pub divider: Rgb,
    pub completed: Rgb,
    pub remaining: Rgb,
    pub overdue: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            brand: Rgb::new(0x1f, 0x4e, 0x8c),
            on_brand: Rgb::WHITE,
            text: Rgb::new(0x21, 0x25, 0x29),
            muted_text: Rgb::new(0x6c, 0x75, 0x7d),
            bar_track: Rgb::new(0xe9, 0xec, 0xef),
            divider: Rgb::new(0xde, 0xe2, 0xe6),
            completed: Rgb::new(0x28, 0xa7, 0x45),
            remaining: Rgb::new(0xfd, 0x7e, 0x14),
            overdue: Rgb::new(0xdc, 0x35, 0x45),
        }
    }
}

/// Font sizes in points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontSizes {
    pub title: u8,
    pub subtitle: u8,
    pub heading: u8,
    pub stat_value: u8,
    pub body: u8,
    pub caption: u8,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 20,
            subtitle: 12,
            heading: 14,
            stat_value: 16,
            body: 10,
            caption: 8,
        }
    }
}

/// Vertical rhythm of the report, all in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spacing {
    /// Space consumed by a section heading including the gap below it.
    pub heading: f64,
    /// Gap inserted after each section.
    pub section_gap: f64,
    /// Row height of the overview stat grid, independent of content.
    pub stat_row: f64,
    /// Row height of the three-row status snapshot.
    pub snapshot_row: f64,
    /// Row height of the status bar chart.
    pub bar_row: f64,
    /// Height of a single bar.
    pub bar_height: f64,
    /// Row height of the priority and category grids.
    pub grid_row: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            heading: 10.0,
            section_gap: 8.0,
            stat_row: 18.0,
            snapshot_row: 8.0,
            bar_row: 9.0,
            bar_height: 4.0,
            grid_row: 8.0,
        }
    }
}

/// Complete set of rendering options.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportStyle {
    pub page_size: PageSize,
    /// Uniform page margin in millimetres.
    pub margin: f64,
    /// Height of the band drawn across the top of the first page.
    pub header_height: f64,
    pub palette: Palette,
    pub font_sizes: FontSizes,
    pub spacing: Spacing,
    /// Pixel width the logo is rasterized at.  Height follows the aspect ratio.
    pub logo_width_px: u32,
    /// Width of the logo on the page in millimetres.
    pub logo_width_mm: f64,
    /// Caption stamped at the bottom of every page.
    pub footer_caption: String,
    /// Baseline distance of the footer caption from the bottom edge.
    pub footer_offset: f64,
    /// `chrono` format string for the generation timestamp.
    pub timestamp_format: String,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin: 20.0,
            header_height: 42.0,
            palette: Palette::default(),
            font_sizes: FontSizes::default(),
            spacing: Spacing::default(),
            logo_width_px: 200,
            logo_width_mm: 18.0,
            footer_caption: "Generated by Project Management System".to_string(),
            footer_offset: 10.0,
            timestamp_format: "%-m/%-d/%Y, %-I:%M:%S %p".to_string(),
        }
    }
}

impl ReportStyle {
    /// Width available between the left and right margins.
    pub fn content_width(&self) -> f64 {
        self.page_size.width - 2.0 * self.margin
    }

    /// Lowest baseline content may use before a new page is needed.
    ///
    /// Keeps clear of the footer caption.
    pub fn content_bottom(&self) -> f64 {
        self.page_size.height - self.margin.max(self.footer_offset + 6.0)
    }

    /// Sets the page size and returns the updated style.
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the palette and returns the updated style.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Sets the footer caption and returns the updated style.
    pub fn with_footer_caption(mut self, caption: impl Into<String>) -> Self {
        self.footer_caption = caption.into();
        self
    }

    /// Sets the timestamp format and returns the updated style.
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colours() {
        assert_eq!(Rgb::from_hex("#1f4e8c"), Some(Rgb::new(0x1f, 0x4e, 0x8c)));
        assert_eq!(Rgb::from_hex("FFFFFF"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("#12FG34"), None);
        assert_eq!(Rgb::from_hex("#123"), None);
        assert_eq!(Rgb::new(1, 2, 255).to_string(), "#0102ff");
    }

    #[test]
    fn content_area_respects_margins() {
        let style = ReportStyle::default();
        assert_eq!(style.content_width(), 170.0);
        assert_eq!(style.content_bottom(), 277.0);
    }
}
