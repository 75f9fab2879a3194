//! Font loading and text metrics for the PDF surface.
//!
//! Roboto Regular and Bold are embedded when they can be found.  Their exact
//! advance widths come from `genpdf`'s font cache.  When the files are missing
//! the PDF surface falls back to the built-in Helvetica pair.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{Font, FontCache, FontData, FontFamily};

use crate::canvas::FontWeight;

/// Name of the embedded font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable overriding the font search path.
pub const FONTS_DIR_ENV: &str = "PROJECT_REPORT_FONTS_DIR";

const REGULAR_FONT_FILE: &str = "Roboto-Regular.ttf";
const BOLD_FONT_FILE: &str = "Roboto-Bold.ttf";
const FONT_FILES: &[&str] = &[REGULAR_FONT_FILE, BOLD_FONT_FILE];

/// Raw font programs for the embedded family.
pub struct EmbeddedFonts {
    pub directory: PathBuf,
    pub regular: Vec<u8>,
    pub bold: Vec<u8>,
}

/// Directory holding the fonts shipped with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(path) = env::var(FONTS_DIR_ENV) {
        if !path.trim().is_empty() {
            candidates.push(PathBuf::from(path));
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.iter().any(|existing| existing == &candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates
        .iter()
        .any(|existing| existing == &manifest_candidate)
    {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn missing_font_files(path: &Path) -> Vec<PathBuf> {
    FONT_FILES
        .iter()
        .map(|name| path.join(name))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        let exists = candidate.is_dir();
        let missing = missing_font_files(&candidate);

        if exists && missing.is_empty() {
            return Ok(candidate);
        }

        let reason = if !exists {
            format!("directory missing at {}", candidate.display())
        } else {
            let missing_list = missing
                .iter()
                .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
                .collect::<Vec<_>>()
                .join(", ");
            format!("missing files [{}]", missing_list)
        };

        attempts.push(format!("{} ({})", candidate.display(), reason));
    }

    let summary = if attempts.is_empty() {
        "no search paths were available".to_owned()
    } else {
        attempts.join(", ")
    };

    Err(Error::new(
        format!(
            "Unable to locate report font directory. Checked: {}. Set {} to a directory containing {}.",
            summary,
            FONTS_DIR_ENV,
            FONT_FILES.join(" and ")
        ),
        io::Error::new(io::ErrorKind::NotFound, "report fonts directory not found"),
    ))
}

fn read_font(directory: &Path, file: &str) -> Result<Vec<u8>, Error> {
    let path = directory.join(file);
    fs::read(&path).map_err(|err| {
        Error::new(
            format!("Failed to read font file {}: {}", path.display(), err),
            err,
        )
    })
}

/// Locates and reads the embedded font family.
pub fn load_embedded_fonts() -> Result<EmbeddedFonts, Error> {
    let directory = resolve_font_directory()?;
    let regular = read_font(&directory, REGULAR_FONT_FILE)?;
    let bold = read_font(&directory, BOLD_FONT_FILE)?;
    Ok(EmbeddedFonts {
        directory,
        regular,
        bold,
    })
}

/// Whether `err` means the fonts are absent rather than broken.
pub fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Indicates whether the embedded font family can be located on disk.
pub fn default_fonts_available() -> bool {
    resolve_font_directory().is_ok()
}

fn mm_to_f64(value: genpdf::Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Advance widths of the embedded family.
pub struct FontMetrics {
    cache: FontCache,
    family: FontFamily<Font>,
}

impl FontMetrics {
    /// Parses the font programs into a `genpdf` font cache.
    pub fn new(fonts: &EmbeddedFonts) -> Result<Self, Error> {
        let regular = FontData::new(fonts.regular.clone(), None).map_err(|err| {
            Error::new(
                format!(
                    "Failed to parse {} regular font from {}: {}",
                    DEFAULT_FONT_FAMILY_NAME,
                    fonts.directory.display(),
                    err
                ),
                io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
            )
        })?;
        let bold = FontData::new(fonts.bold.clone(), None).map_err(|err| {
            Error::new(
                format!(
                    "Failed to parse {} bold font from {}: {}",
                    DEFAULT_FONT_FAMILY_NAME,
                    fonts.directory.display(),
                    err
                ),
                io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
            )
        })?;

        let cache = FontCache::new(FontFamily {
            italic: regular.clone(),
            bold_italic: bold.clone(),
            regular,
            bold,
        });
        let family = cache.default_font_family();
        Ok(Self { cache, family })
    }

    /// Advance width of `text` in millimetres.
    pub fn text_width(&self, text: &str, weight: FontWeight, size: u8) -> f64 {
        let font = match weight {
            FontWeight::Regular => self.family.regular,
            FontWeight::Bold => self.family.bold,
        };
        mm_to_f64(font.str_width(&self.cache, text, size))
    }
}
