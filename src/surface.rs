use image::RgbaImage;
use image::imageops::{self, FilterType};
use tiny_skia::Pixmap;

use crate::action::DrawAction;
use crate::geometry::PixelRect;
use crate::renderer::{self, Renderer};

/// The composited bitmap: a base image scaled to the surface plus the active actions.
///
/// The scaled base is cached so every redraw starts from the same pixels;
/// the composite is always rebuilt from it, never patched.
#[derive(Debug, Clone)]
pub struct Surface {
    base_layer: Pixmap,
    composited: Pixmap,
}

impl Surface {
    /// Scale `base` to `width` x `height` and start with an empty composite over it
    pub fn from_base(base: &RgbaImage, width: u32, height: u32) -> Option<Self> {
        let base_layer = if base.dimensions() == (width, height) {
            renderer::pixmap_from_rgba(base)?
        } else {
            let scaled = imageops::resize(base, width, height, FilterType::Triangle);
            renderer::pixmap_from_rgba(&scaled)?
        };
        Some(Self {
            composited: base_layer.clone(),
            base_layer,
        })
    }

    /// Rebuild the composite from the base layer and `actions`, in order
    pub fn redraw(&mut self, renderer: &Renderer, actions: &[DrawAction]) {
        self.composited = self.base_layer.clone();
        for action in actions {
            renderer.render_action(&mut self.composited, action);
        }
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.composited
    }

    pub fn width(&self) -> u32 {
        self.composited.width()
    }

    pub fn height(&self) -> u32 {
        self.composited.height()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Copy a region of the composite out as a new image
    pub fn extract(&self, region: PixelRect) -> RgbaImage {
        let full = renderer::rgba_from_pixmap(&self.composited);
        imageops::crop_imm(&full, region.x, region.y, region.width, region.height).to_image()
    }

    pub fn to_rgba(&self) -> RgbaImage {
        renderer::rgba_from_pixmap(&self.composited)
    }
}
