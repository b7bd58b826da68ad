use egui::Color32;
use image::RgbaImage;
use tiny_skia::{ColorU8, IntSize, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use crate::action::{ActionKind, DrawAction};
use crate::config::EditorConfig;
use crate::geometry::PixelRect;
use crate::tools::{GestureSession, ToolMode};

/// Outline color of crop and mosaic selections while dragging
const SELECTION_COLOR: Color32 = Color32::from_rgb(255, 255, 255);
const SELECTION_DASH: [f32; 2] = [6.0, 4.0];

/// Brush settings and the rasterization of draw actions onto a pixmap
#[derive(Debug, Clone)]
pub struct Renderer {
    brush_color: Color32,
    brush_thickness: f32,
    mosaic_block_size: u32,
}

impl Renderer {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            brush_color: config.default_color,
            brush_thickness: config.default_line_width,
            mosaic_block_size: config.mosaic_block_size.max(1),
        }
    }

    pub fn brush_color(&self) -> Color32 {
        self.brush_color
    }

    pub fn set_brush_color(&mut self, color: Color32) {
        self.brush_color = color;
    }

    pub fn brush_thickness(&self) -> f32 {
        self.brush_thickness
    }

    /// Non-finite or non-positive widths are ignored
    pub fn set_brush_thickness(&mut self, thickness: f32) {
        if thickness.is_finite() && thickness > 0.0 {
            self.brush_thickness = thickness;
        }
    }

    pub fn mosaic_block_size(&self) -> u32 {
        self.mosaic_block_size
    }

    /// Apply one committed action to `pixmap`
    pub fn render_action(&self, pixmap: &mut Pixmap, action: &DrawAction) {
        let Some((start, end)) = action.endpoints() else {
            return;
        };
        match action.kind() {
            ActionKind::Rectangle => {
                if let Some(path) = rectangle_path(start.x, start.y, end.x, end.y) {
                    stroke(pixmap, &path, action.color(), solid_stroke(action.effective_line_width()));
                }
            }
            ActionKind::Circle => {
                if let Some(path) = PathBuilder::from_circle(start.x, start.y, start.distance(end)) {
                    stroke(pixmap, &path, action.color(), solid_stroke(action.effective_line_width()));
                }
            }
            ActionKind::Pen => {
                if let Some(path) = polyline_path(action.points().iter().map(|p| (p.x, p.y))) {
                    stroke(pixmap, &path, action.color(), solid_stroke(action.effective_line_width()));
                }
            }
            ActionKind::Mosaic => {
                if let Some(region) = PixelRect::from_corners(start, end, (pixmap.width(), pixmap.height())) {
                    apply_mosaic(pixmap, region, self.mosaic_block_size);
                }
            }
        }
    }

    /// Overlay the in-progress shape of `gesture` on `pixmap`
    pub fn draw_preview(&self, pixmap: &mut Pixmap, gesture: &GestureSession) {
        let (start, current) = (gesture.start(), gesture.current());
        let path = match gesture.tool() {
            ToolMode::Crop | ToolMode::Mosaic | ToolMode::Rectangle => {
                rectangle_path(start.x, start.y, current.x, current.y)
            }
            ToolMode::Circle => PathBuilder::from_circle(start.x, start.y, start.distance(current)),
            ToolMode::Pen => gesture
                .path()
                .and_then(|path| polyline_path(path.points().iter().map(|p| (p.x, p.y)))),
            ToolMode::Eraser | ToolMode::None => None,
        };
        let Some(path) = path else {
            return;
        };

        if gesture.tool().is_selection() {
            let mut outline = solid_stroke(1.0);
            outline.dash = StrokeDash::new(SELECTION_DASH.to_vec(), 0.0);
            stroke(pixmap, &path, SELECTION_COLOR, outline);
        } else {
            stroke(pixmap, &path, self.brush_color, solid_stroke(self.brush_thickness));
        }
    }
}

/// Replace every `block`-sized cell of `region` with the mean color of its pixels.
///
/// Cells are laid out from the region's top-left corner; cells cut by the
/// region's edge only average the pixels inside it.
pub fn apply_mosaic(pixmap: &mut Pixmap, region: PixelRect, block: u32) {
    let block = block.max(1);
    let stride = pixmap.width() as usize * 4;
    let right = region.right().min(pixmap.width());
    let bottom = region.bottom().min(pixmap.height());
    let data = pixmap.data_mut();

    let mut cell_y = region.y;
    while cell_y < bottom {
        let cell_bottom = (cell_y + block).min(bottom);
        let mut cell_x = region.x;
        while cell_x < right {
            let cell_right = (cell_x + block).min(right);

            let mut sums = [0u64; 4];
            let mut count = 0u64;
            for y in cell_y..cell_bottom {
                let row = y as usize * stride;
                for x in cell_x..cell_right {
                    let i = row + x as usize * 4;
                    for (sum, value) in sums.iter_mut().zip(&data[i..i + 4]) {
                        *sum += u64::from(*value);
                    }
                    count += 1;
                }
            }

            if count > 0 {
                let mean = sums.map(|sum| ((sum + count / 2) / count) as u8);
                for y in cell_y..cell_bottom {
                    let row = y as usize * stride;
                    for x in cell_x..cell_right {
                        let i = row + x as usize * 4;
                        data[i..i + 4].copy_from_slice(&mean);
                    }
                }
            }
            cell_x = cell_right;
        }
        cell_y = cell_bottom;
    }
}

/// Convert straight-alpha RGBA into a premultiplied pixmap
pub fn pixmap_from_rgba(image: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let mut data = Vec::with_capacity(image.as_raw().len());
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let color = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    Pixmap::from_vec(data, size)
}

/// Convert a premultiplied pixmap back into straight-alpha RGBA
pub fn rgba_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .unwrap_or_else(|| RgbaImage::new(pixmap.width(), pixmap.height()))
}

/// Closed rectangle path through both corners. Negative extents are allowed.
fn rectangle_path(x0: f32, y0: f32, x1: f32, y1: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    pb.line_to(x1, y0);
    pb.line_to(x1, y1);
    pb.line_to(x0, y1);
    pb.close();
    pb.finish()
}

fn polyline_path(mut points: impl Iterator<Item = (f32, f32)>) -> Option<Path> {
    let (x, y) = points.next()?;
    let mut pb = PathBuilder::new();
    pb.move_to(x, y);
    for (x, y) in points {
        pb.line_to(x, y);
    }
    pb.finish()
}

fn solid_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

fn stroke(pixmap: &mut Pixmap, path: &Path, color: Color32, style: Stroke) {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    pixmap.stroke_path(path, &paint, &style, Transform::identity(), None);
}
