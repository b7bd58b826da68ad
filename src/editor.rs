//! The raster edit engine.
//!
//! [`RasterEditor`] owns one surface: a base image, a branch-discarding
//! [`ActionHistory`] and the active tool. Pointer gestures become actions,
//! and every history change re-renders the surface from the base image.
//!
//! ```text
//!   pointer_down          pointer_move (preview only)
//!  Idle ──────────► Gesturing ◄──────┐
//!   ▲                  │   └─────────┘
//!   └──────────────────┘ pointer_up: record / crop / discard
//! ```

use egui::Color32;
use futures::future::BoxFuture;
use image::{DynamicImage, RgbaImage};
use log::{debug, info, warn};
use tiny_skia::Pixmap;

use crate::config::EditorConfig;
use crate::error::{ExportError, SourceError};
use crate::export::{self, BlobRef, BlobSink, ExportJob, ExportedImage};
use crate::geometry::{self, PixelRect, Point};
use crate::history::ActionHistory;
use crate::renderer::Renderer;
use crate::source::{ImageRef, ImageSource};
use crate::state::{EditorState, Ticket, TicketCounter};
use crate::surface::Surface;
use crate::tools::{GestureOutcome, GestureSession, ToolMode};

/// A load that has been requested but not yet applied.
///
/// Drive `future` to completion, then hand the result to
/// [`RasterEditor::complete_load`] with `ticket`.
pub struct PendingLoad {
    pub ticket: Ticket,
    pub future: BoxFuture<'static, Result<DynamicImage, SourceError>>,
}

impl std::fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLoad")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct RasterEditor {
    config: EditorConfig,
    renderer: Renderer,
    state: EditorState,
    tickets: TicketCounter,
    tool: ToolMode,
    base: Option<RgbaImage>,
    surface: Option<Surface>,
    history: ActionHistory,
    gesture: Option<GestureSession>,
    preview: Option<Pixmap>,
}

impl Default for RasterEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl RasterEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            renderer: Renderer::new(&config),
            config,
            state: EditorState::Empty,
            tickets: TicketCounter::default(),
            tool: ToolMode::None,
            base: None,
            surface: None,
            history: ActionHistory::new(),
            gesture: None,
            preview: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    /// Switch tools; an unfinished gesture is dropped
    pub fn set_tool(&mut self, tool: ToolMode) {
        if tool != self.tool {
            self.cancel_gesture();
            debug!("Tool changed: {} -> {}", self.tool.name(), tool.name());
            self.tool = tool;
        }
    }

    pub fn color(&self) -> Color32 {
        self.renderer.brush_color()
    }

    pub fn set_color(&mut self, color: Color32) {
        self.renderer.set_brush_color(color);
    }

    pub fn line_width(&self) -> f32 {
        self.renderer.brush_thickness()
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.renderer.set_brush_thickness(width);
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.state.accepts_input() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.accepts_input() && self.history.can_redo()
    }

    pub fn is_gesturing(&self) -> bool {
        self.gesture.is_some()
    }

    /// The committed surface, without any gesture preview
    pub fn surface(&self) -> Option<&Pixmap> {
        self.surface.as_ref().map(Surface::pixmap)
    }

    /// What should be shown right now: the preview while gesturing, else the committed surface
    pub fn display(&self) -> Option<&Pixmap> {
        self.preview.as_ref().or_else(|| self.surface())
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.surface.as_ref().map(Surface::size)
    }

    /// The current base image, at its stored resolution
    pub fn base_image(&self) -> Option<&RgbaImage> {
        self.base.as_ref()
    }

    // ---- Loading ----

    /// Replace the base image, fitting the surface to the configured cap.
    ///
    /// Clears the history. Any in-flight load is superseded.
    pub fn load_image(&mut self, image: DynamicImage) {
        self.tickets.issue();
        self.install_base(image.to_rgba8(), true);
    }

    /// Start an asynchronous load; gestures are disabled until it completes
    pub fn request_load(&mut self, source: &dyn ImageSource, reference: &ImageRef) -> PendingLoad {
        self.cancel_gesture();
        let ticket = self.tickets.issue();
        self.state = EditorState::Loading { ticket };
        debug!("Loading {reference}");
        PendingLoad {
            ticket,
            future: source.fetch(reference),
        }
    }

    /// Apply the result of a load started with [`request_load`](Self::request_load).
    ///
    /// Returns `Ok(false)` when the ticket is stale: the result is dropped and
    /// nothing changes. A failed load restores the previous state.
    pub fn complete_load(&mut self, ticket: Ticket, result: Result<DynamicImage, SourceError>) -> Result<bool, SourceError> {
        if self.state != (EditorState::Loading { ticket }) {
            warn!("Discarding stale image load {ticket:?}");
            return Ok(false);
        }
        match result {
            Ok(image) => {
                self.install_base(image.to_rgba8(), true);
                Ok(true)
            }
            Err(error) => {
                warn!("Image load failed: {error}");
                self.state = self.settled_state();
                Err(error)
            }
        }
    }

    /// Tear down the surface. Pending loads and exports are discarded when they complete.
    pub fn close(&mut self) {
        self.tickets.issue();
        self.gesture = None;
        self.preview = None;
        self.base = None;
        self.surface = None;
        self.history.clear();
        self.state = EditorState::Empty;
        debug!("Editor closed");
    }

    fn install_base(&mut self, base: RgbaImage, fit: bool) {
        let (width, height) = if fit {
            geometry::fit_within(
                base.width(),
                base.height(),
                self.config.max_surface_width,
                self.config.max_surface_height,
            )
        } else {
            base.dimensions()
        };

        self.gesture = None;
        self.preview = None;
        self.history.clear();
        match Surface::from_base(&base, width, height) {
            Some(surface) => {
                info!("🖼️ Base image {}x{} on a {}x{} surface", base.width(), base.height(), width, height);
                self.surface = Some(surface);
                self.base = Some(base);
                self.state = EditorState::Ready;
            }
            None => {
                warn!("Could not allocate a {width}x{height} surface");
                self.surface = None;
                self.base = None;
                self.state = EditorState::Empty;
            }
        }
    }

    fn settled_state(&self) -> EditorState {
        if self.surface.is_some() {
            EditorState::Ready
        } else {
            EditorState::Empty
        }
    }

    // ---- Gestures ----

    pub fn pointer_down(&mut self, pos: Point) {
        if !self.state.accepts_input() || self.gesture.is_some() {
            return;
        }
        self.gesture = GestureSession::begin(self.tool, pos);
    }

    pub fn pointer_move(&mut self, pos: Point) {
        let (Some(gesture), Some(surface)) = (self.gesture.as_mut(), self.surface.as_ref()) else {
            return;
        };
        gesture.update(pos);

        let mut preview = surface.pixmap().clone();
        self.renderer.draw_preview(&mut preview, gesture);
        self.preview = Some(preview);
    }

    /// Finish the current gesture. Returns true if the surface changed.
    pub fn pointer_up(&mut self, pos: Point) -> bool {
        self.preview = None;
        let (Some(gesture), Some(bounds)) = (self.gesture.take(), self.size()) else {
            return false;
        };
        let tool = gesture.tool();

        match gesture.finish(pos, self.color(), self.line_width(), bounds) {
            GestureOutcome::Record(action) => {
                debug!("Recording {:?} action at step {}", action.kind(), self.history.step() + 1);
                self.history.record(action);
                self.redraw();
                true
            }
            GestureOutcome::Crop(region) => self.apply_crop(region),
            GestureOutcome::Discarded => {
                debug!("Dropped degenerate {} gesture", tool.name());
                false
            }
        }
    }

    /// Abandon the current gesture without recording anything
    pub fn cancel_gesture(&mut self) {
        self.gesture = None;
        self.preview = None;
    }

    fn apply_crop(&mut self, region: PixelRect) -> bool {
        let Some(surface) = &self.surface else {
            return false;
        };
        let cropped = surface.extract(region);
        info!("✂️ Cropped to {}x{} at ({}, {})", region.width, region.height, region.x, region.y);
        // Prior actions were defined in the old coordinate frame.
        self.install_base(cropped, false);
        true
    }

    // ---- History ----

    pub fn undo(&mut self) -> bool {
        if !self.state.accepts_input() || self.gesture.is_some() || !self.history.undo() {
            return false;
        }
        debug!("Undo to step {}", self.history.step());
        self.redraw();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.state.accepts_input() || self.gesture.is_some() || !self.history.redo() {
            return false;
        }
        debug!("Redo to step {}", self.history.step());
        self.redraw();
        true
    }

    fn redraw(&mut self) {
        if let Some(surface) = &mut self.surface {
            surface.redraw(&self.renderer, self.history.active_actions());
        }
    }

    // ---- Export ----

    /// Freeze the committed surface for encoding; input is disabled until
    /// [`complete_export`](Self::complete_export). `None` without an image or while busy.
    pub fn begin_export(&mut self, quality: f32) -> Option<ExportJob> {
        if !self.state.accepts_input() {
            return None;
        }
        let snapshot = self.surface()?.clone();
        self.cancel_gesture();
        let ticket = self.tickets.issue();
        self.state = EditorState::Exporting { ticket };
        let quality = export::clamp_quality(quality, self.config.export_quality);
        Some(ExportJob::new(ticket, snapshot, quality, self.config.export_format))
    }

    /// Re-enable input after an export. Returns false for a stale ticket.
    pub fn complete_export(&mut self, ticket: Ticket) -> bool {
        if self.state != (EditorState::Exporting { ticket }) {
            warn!("Discarding stale export {ticket:?}");
            return false;
        }
        self.state = self.settled_state();
        true
    }

    /// Encode the committed surface. `Ok(None)` when there is nothing to export.
    pub fn export(&mut self, quality: f32) -> Result<Option<ExportedImage>, ExportError> {
        let Some(job) = self.begin_export(quality) else {
            return Ok(None);
        };
        let result = job.encode();
        self.complete_export(job.ticket());
        result.map(Some)
    }

    /// Encode the committed surface and hand it to `sink`
    pub fn export_to(&mut self, sink: &mut dyn BlobSink, quality: f32) -> Result<Option<BlobRef>, ExportError> {
        let Some(job) = self.begin_export(quality) else {
            return Ok(None);
        };
        let result = job.encode().and_then(|image| sink.store(&image, job.quality()));
        self.complete_export(job.ticket());
        result.map(Some)
    }
}
