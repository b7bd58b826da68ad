use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use log::info;
use std::collections::HashMap;
use tiny_skia::Pixmap;

use crate::config::ExportFormat;
use crate::error::ExportError;
use crate::renderer;
use crate::state::Ticket;

pub const MIN_QUALITY: f32 = 0.5;
pub const MAX_QUALITY: f32 = 1.0;

/// Clamp a requested quality into `[MIN_QUALITY, MAX_QUALITY]`; NaN falls back to `default`.
pub fn clamp_quality(quality: f32, default: f32) -> f32 {
    let quality = if quality.is_nan() { default } else { quality };
    quality.clamp(MIN_QUALITY, MAX_QUALITY)
}

/// An encoded snapshot of the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    /// `data:` URL suitable for a download link
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// A pending export: a frozen copy of the committed surface and its settings.
///
/// Encoding does not touch the editor, so it may run wherever the caller likes.
#[derive(Debug, Clone)]
pub struct ExportJob {
    ticket: Ticket,
    snapshot: Pixmap,
    quality: f32,
    format: ExportFormat,
}

impl ExportJob {
    pub(crate) fn new(ticket: Ticket, snapshot: Pixmap, quality: f32, format: ExportFormat) -> Self {
        Self {
            ticket,
            snapshot,
            quality,
            format,
        }
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn encode(&self) -> Result<ExportedImage, ExportError> {
        let (width, height) = (self.snapshot.width(), self.snapshot.height());
        let rgba = renderer::rgba_from_pixmap(&self.snapshot);
        let mut bytes = Vec::new();

        match self.format {
            ExportFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
                let quality = (self.quality * 100.0).round() as u8;
                JpegEncoder::new_with_quality(&mut bytes, quality).encode(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )?;
            }
            ExportFormat::Png => {
                PngEncoder::new(&mut bytes).write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)?;
            }
        }

        info!("📦 Exported {}x{} {} ({} bytes)", width, height, self.format.mime(), bytes.len());
        Ok(ExportedImage {
            bytes,
            mime: self.format.mime(),
            width,
            height,
        })
    }
}

/// Opaque handle returned by a [`BlobSink`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobRef(pub String);

/// Receives exported payloads; implemented by the surrounding application.
pub trait BlobSink {
    fn store(&mut self, image: &ExportedImage, quality: f32) -> Result<BlobRef, ExportError>;
}

/// Sink that turns every export into a `data:` URL
#[derive(Debug, Clone, Default)]
pub struct DataUrlSink;

impl BlobSink for DataUrlSink {
    fn store(&mut self, image: &ExportedImage, _quality: f32) -> Result<BlobRef, ExportError> {
        Ok(BlobRef(image.to_data_url()))
    }
}

/// Sink keeping exports in memory under `blob:<n>` references
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobSink {
    blobs: HashMap<BlobRef, ExportedImage>,
    next: u64,
}

impl MemoryBlobSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, blob: &BlobRef) -> Option<&ExportedImage> {
        self.blobs.get(blob)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobSink for MemoryBlobSink {
    fn store(&mut self, image: &ExportedImage, _quality: f32) -> Result<BlobRef, ExportError> {
        self.next += 1;
        let blob = BlobRef(format!("blob:{}", self.next));
        self.blobs.insert(blob.clone(), image.clone());
        Ok(blob)
    }
}
