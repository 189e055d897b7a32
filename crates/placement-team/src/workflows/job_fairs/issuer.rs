//! QR image issuance.
//!
//! Symbol encoding is delegated to the `qrcode` crate; this module only lays
//! the modules out on a pixel grid and encodes the result as PNG.

use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};

/// Produces a scannable image for a text payload.
pub trait QrIssuer: Send + Sync {
    fn generate(&self, payload: &str) -> Result<Vec<u8>, IssuerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IssuerError {
    #[error("payload cannot be encoded as a QR symbol: {0}")]
    Encode(String),
    #[error("failed to encode PNG: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid render options: {0}")]
    InvalidOptions(&'static str),
}

/// Redundancy level of the encoded symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCorrection {
    #[default]
    Low,
    Medium,
    Quartile,
    High,
}

impl ErrorCorrection {
    fn level(self) -> EcLevel {
        match self {
            ErrorCorrection::Low => EcLevel::L,
            ErrorCorrection::Medium => EcLevel::M,
            ErrorCorrection::Quartile => EcLevel::Q,
            ErrorCorrection::High => EcLevel::H,
        }
    }
}

/// Fixed rendering policy for issued images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrRenderOptions {
    pub error_correction: ErrorCorrection,
    /// Pixels per module along each axis.
    pub box_size: u32,
    /// Quiet zone width, in modules.
    pub border: u32,
    pub fill_color: [u8; 3],
    pub background_color: [u8; 3],
}

impl Default for QrRenderOptions {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::Low,
            box_size: 10,
            border: 4,
            fill_color: [0, 0, 0],
            background_color: [255, 255, 255],
        }
    }
}

/// Renders QR symbols to PNG bytes. Output is deterministic for a payload.
#[derive(Debug, Clone, Default)]
pub struct PngQrIssuer {
    options: QrRenderOptions,
}

impl PngQrIssuer {
    pub fn new(options: QrRenderOptions) -> Self {
        Self { options }
    }

    fn render(&self, code: &QrCode) -> Result<RgbImage, IssuerError> {
        let QrRenderOptions {
            box_size,
            border,
            fill_color,
            background_color,
            ..
        } = self.options;

        if box_size == 0 {
            return Err(IssuerError::InvalidOptions("box size must be at least one pixel"));
        }

        let modules = u32::try_from(code.width())
            .map_err(|_| IssuerError::InvalidOptions("symbol too wide"))?;
        let side = border
            .checked_mul(2)
            .and_then(|quiet| quiet.checked_add(modules))
            .and_then(|total| total.checked_mul(box_size))
            .ok_or(IssuerError::InvalidOptions("image dimensions overflow"))?;

        let colors = code.to_colors();
        let fill = Rgb(fill_color);
        let background = Rgb(background_color);

        Ok(ImageBuffer::from_fn(side, side, |x, y| {
            let column = x / box_size;
            let row = y / box_size;
            if column < border || row < border {
                return background;
            }
            let (column, row) = (column - border, row - border);
            if column >= modules || row >= modules {
                return background;
            }
            match colors[(row * modules + column) as usize] {
                Color::Dark => fill,
                Color::Light => background,
            }
        }))
    }
}

impl QrIssuer for PngQrIssuer {
    fn generate(&self, payload: &str) -> Result<Vec<u8>, IssuerError> {
        let code = QrCode::with_error_correction_level(
            payload.as_bytes(),
            self.options.error_correction.level(),
        )
        .map_err(|err| IssuerError::Encode(err.to_string()))?;
        let image = self.render(&code)?;

        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }
}
