//! QR codes pointing at the complaint form.

use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

use crate::error::Result;

/// Smallest rendered edge, in pixels.
pub const MIN_SIZE: u32 = 128;
/// Largest rendered edge, in pixels.
pub const MAX_SIZE: u32 = 512;
/// Edge used when none is requested.
pub const DEFAULT_SIZE: u32 = 256;
/// Filename offered when downloading the SVG.
pub const DOWNLOAD_FILENAME: &str = "heritage-complaint-form-qr-code.svg";

/// What to encode and how large to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRequest {
    /// URL encoded in the code.
    pub url: String,
    /// Minimum edge length in pixels, within `MIN_SIZE..=MAX_SIZE`.
    pub size: u32,
}

impl QrRequest {
    /// Build a request from optional user input.
    ///
    /// A blank URL falls back to `default_url`. A missing or unparseable size
    /// falls back to [`DEFAULT_SIZE`]; anything else is clamped into range.
    #[must_use]
    pub fn new(url: Option<&str>, size: Option<&str>, default_url: &str) -> Self {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(default_url)
            .to_string();
        let size = size
            .and_then(|s| s.trim().parse::<u32>().ok())
            .map_or(DEFAULT_SIZE, |s| s.clamp(MIN_SIZE, MAX_SIZE));
        Self { url, size }
    }

    /// Render as a standalone SVG document.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is too long to encode.
    pub fn to_svg(&self) -> Result<String> {
        let code = QrCode::with_error_correction_level(self.url.as_bytes(), EcLevel::H)?;
        Ok(code
            .render::<svg::Color<'_>>()
            .min_dimensions(self.size, self.size)
            .quiet_zone(true)
            .build())
    }

    /// Render as an `<svg>` element suitable for embedding in HTML.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is too long to encode.
    pub fn to_inline_svg(&self) -> Result<String> {
        let document = self.to_svg()?;
        Ok(match document.find("<svg") {
            Some(start) => document[start..].to_string(),
            None => document,
        })
    }
}
