//! Brand logo rasterization.
//!
//! The report header carries a small bitmap rendered from a vector logo.
//! Rasterizing may fail for malformed SVG input; [`load_logo`] turns any such
//! failure into `None` so the header simply renders without a logo.

use std::fmt;

use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb as ImageRgb};
use log::{debug, warn};
use resvg::{tiny_skia, usvg};

use crate::style::Rgb;

/// Default brand mark drawn in the report header.
pub const BRAND_LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64">
  <rect x="2" y="2" width="60" height="60" rx="12" fill="#ffffff"/>
  <rect x="12" y="14" width="10" height="36" rx="3" fill="#1f4e8c"/>
  <rect x="27" y="24" width="10" height="26" rx="3" fill="#28a745"/>
  <rect x="42" y="32" width="10" height="18" rx="3" fill="#fd7e14"/>
</svg>"##;

/// Where the header logo comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LogoSource {
    /// The built-in [`BRAND_LOGO_SVG`].
    #[default]
    Bundled,
    /// Caller supplied SVG markup.
    Svg(String),
}

impl LogoSource {
    pub fn svg(&self) -> &str {
        match self {
            Self::Bundled => BRAND_LOGO_SVG,
            Self::Svg(markup) => markup,
        }
    }
}

/// Failures while turning SVG markup into a bitmap.
#[derive(Debug)]
pub enum LogoError {
    /// The markup is not a usable SVG document.
    Parse(usvg::Error),
    /// The SVG or the requested width has no area.
    EmptySize,
    /// The pixmap for the requested size could not be allocated.
    Allocation { width: u32, height: u32 },
    /// Encoding the rendered pixmap failed.
    Encode(String),
    /// The encoded bitmap could not be decoded again.
    Decode(image::ImageError),
}

impl fmt::Display for LogoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "Failed to parse logo SVG: {err}"),
            Self::EmptySize => write!(f, "Logo has zero width or height"),
            Self::Allocation { width, height } => {
                write!(f, "Failed to allocate a {width}x{height} logo pixmap")
            }
            Self::Encode(reason) => write!(f, "Failed to encode logo bitmap: {reason}"),
            Self::Decode(err) => write!(f, "Failed to decode logo bitmap: {err}"),
        }
    }
}

impl std::error::Error for LogoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::EmptySize | Self::Allocation { .. } | Self::Encode(_) => None,
        }
    }
}

/// A rasterized logo ready to be placed on a canvas.
#[derive(Clone, Debug)]
pub struct Logo {
    image: DynamicImage,
}

impl Logo {
    pub fn from_image(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Width divided by height of the bitmap.
    pub fn aspect_ratio(&self) -> f64 {
        let (width, height) = self.pixel_size();
        if height == 0 {
            1.0
        } else {
            f64::from(width) / f64::from(height)
        }
    }

    /// Height matching `width` at the bitmap's aspect ratio.
    pub fn height_for_width(&self, width: f64) -> f64 {
        width / self.aspect_ratio()
    }

    /// Composites the bitmap onto an opaque background colour.
    pub fn flattened(&self, background: Rgb) -> DynamicImage {
        let rgba = self.image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let blend = |fg: u8, bg: u8, alpha: u8| -> u8 {
            let alpha = u16::from(alpha);
            ((u16::from(fg) * alpha + u16::from(bg) * (255 - alpha) + 127) / 255) as u8
        };
        let buffer = ImageBuffer::from_fn(width, height, |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            ImageRgb([
                blend(r, background.r, a),
                blend(g, background.g, a),
                blend(b, background.b, a),
            ])
        });
        DynamicImage::ImageRgb8(buffer)
    }
}

/// Renders `svg` at `target_width` pixels, keeping the source aspect ratio.
pub fn rasterize(svg: &str, target_width: u32) -> Result<Logo, LogoError> {
    let tree = usvg::Tree::from_str(svg, &usvg::Options::default()).map_err(LogoError::Parse)?;

    let size = tree.size();
    if target_width == 0 || size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(LogoError::EmptySize);
    }

    let scale = target_width as f32 / size.width();
    let target_height = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(target_width, target_height).ok_or(
        LogoError::Allocation {
            width: target_width,
            height: target_height,
        },
    )?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let png = pixmap
        .encode_png()
        .map_err(|err| LogoError::Encode(err.to_string()))?;
    let image = image::load_from_memory(&png).map_err(LogoError::Decode)?;
    debug!(
        "Rasterized logo at {}x{} pixels",
        target_width, target_height
    );
    Ok(Logo::from_image(image))
}

/// Rasterizes the logo, logging and discarding any failure.
pub fn load_logo(source: &LogoSource, target_width: u32) -> Option<Logo> {
    match rasterize(source.svg(), target_width) {
        Ok(logo) => Some(logo),
        Err(err) => {
            warn!("Rendering report without logo: {}", err);
            None
        }
    }
}
