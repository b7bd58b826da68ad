use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::action::{DrawAction, GesturePath};
use crate::geometry::{PixelRect, Point};

/// Selects how pointer gestures on the surface are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    #[default]
    None,
    Crop,
    Mosaic,
    Rectangle,
    Circle,
    Pen,
    Eraser,
}

impl ToolMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Crop => "crop",
            Self::Mosaic => "mosaic",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Pen => "pen",
            Self::Eraser => "eraser",
        }
    }

    /// Whether a pointer-down under this tool starts a gesture
    pub fn accepts_gestures(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Selection tools preview a dashed region instead of a stroked shape
    pub fn is_selection(&self) -> bool {
        matches!(self, Self::Crop | Self::Mosaic)
    }
}

/// What a completed gesture asks the editor to do
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Append the action to the history
    Record(DrawAction),
    /// Replace the base image with this region of the surface
    Crop(PixelRect),
    /// Degenerate or non-drawing gesture; nothing changes
    Discarded,
}

/// Transient state of one pointer-down to pointer-up interaction.
///
/// Created on pointer-down and consumed on pointer-up, so no gesture state
/// outlives the gesture.
#[derive(Debug, Clone)]
pub struct GestureSession {
    tool: ToolMode,
    start: Point,
    current: Point,
    path: Option<GesturePath>,
}

impl GestureSession {
    /// Start a gesture, or `None` if the tool does not draw
    pub fn begin(tool: ToolMode, start: Point) -> Option<Self> {
        if !tool.accepts_gestures() {
            return None;
        }
        let path = (tool == ToolMode::Pen).then(|| GesturePath::starting_at(start));
        Some(Self {
            tool,
            start,
            current: start,
            path,
        })
    }

    pub fn update(&mut self, pos: Point) {
        self.current = pos;
        if let Some(path) = &mut self.path {
            path.add_point(pos);
        }
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn current(&self) -> Point {
        self.current
    }

    pub fn path(&self) -> Option<&GesturePath> {
        self.path.as_ref()
    }

    /// Finalize the gesture at `end`.
    ///
    /// `bounds` is the surface size; crop and mosaic regions are clipped to it.
    /// The release point is not added to a pen path.
    pub fn finish(self, end: Point, color: Color32, line_width: f32, bounds: (u32, u32)) -> GestureOutcome {
        let start = self.start;
        match self.tool {
            ToolMode::Crop => match PixelRect::from_corners(start, end, bounds) {
                Some(region) => GestureOutcome::Crop(region),
                None => GestureOutcome::Discarded,
            },
            ToolMode::Mosaic => {
                if PixelRect::from_corners(start, end, bounds).is_some() {
                    GestureOutcome::Record(DrawAction::mosaic(start, end, color))
                } else {
                    GestureOutcome::Discarded
                }
            }
            ToolMode::Rectangle => {
                if end.x == start.x || end.y == start.y {
                    GestureOutcome::Discarded
                } else {
                    GestureOutcome::Record(DrawAction::rectangle(start, end, color, Some(line_width)))
                }
            }
            ToolMode::Circle => {
                if start.distance(end) == 0.0 {
                    GestureOutcome::Discarded
                } else {
                    GestureOutcome::Record(DrawAction::circle(start, end, color, Some(line_width)))
                }
            }
            ToolMode::Pen => self
                .path
                .and_then(|path| path.into_action(color, line_width))
                .map_or(GestureOutcome::Discarded, GestureOutcome::Record),
            // The eraser has no action variant to record.
            ToolMode::Eraser | ToolMode::None => GestureOutcome::Discarded,
        }
    }
}
