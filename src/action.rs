use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Line width used when an action does not carry one
pub const DEFAULT_LINE_WIDTH: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Mosaic,
    Rectangle,
    Circle,
    Pen,
}

/// One committed drawing operation.
///
/// `Rectangle`, `Circle` and `Mosaic` carry exactly two points (start, end);
/// `Pen` carries two or more. The color of a mosaic is unused by the renderer
/// but kept so all actions share one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDrawAction")]
pub struct DrawAction {
    #[serde(rename = "type")]
    kind: ActionKind,
    points: Vec<Point>,
    color: Color32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line_width: Option<f32>,
}

impl DrawAction {
    pub fn mosaic(start: Point, end: Point, color: Color32) -> Self {
        Self {
            kind: ActionKind::Mosaic,
            points: vec![start, end],
            color,
            line_width: None,
        }
    }

    pub fn rectangle(start: Point, end: Point, color: Color32, line_width: Option<f32>) -> Self {
        Self {
            kind: ActionKind::Rectangle,
            points: vec![start, end],
            color,
            line_width,
        }
    }

    pub fn circle(center: Point, edge: Point, color: Color32, line_width: Option<f32>) -> Self {
        Self {
            kind: ActionKind::Circle,
            points: vec![center, edge],
            color,
            line_width,
        }
    }

    /// A pen stroke through `points`; `None` when there are fewer than two.
    pub fn pen(points: Vec<Point>, color: Color32, line_width: Option<f32>) -> Option<Self> {
        (points.len() > 1).then_some(Self {
            kind: ActionKind::Pen,
            points,
            color,
            line_width,
        })
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn line_width(&self) -> Option<f32> {
        self.line_width
    }

    pub fn effective_line_width(&self) -> f32 {
        self.line_width.unwrap_or(DEFAULT_LINE_WIDTH)
    }

    /// First and last point, the defining corners of two-point actions
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        Some((*self.points.first()?, *self.points.last()?))
    }
}

/// Unchecked wire form of a [`DrawAction`]
#[derive(Deserialize)]
struct RawDrawAction {
    #[serde(rename = "type")]
    kind: ActionKind,
    points: Vec<Point>,
    color: Color32,
    #[serde(default)]
    line_width: Option<f32>,
}

impl TryFrom<RawDrawAction> for DrawAction {
    type Error = String;

    fn try_from(raw: RawDrawAction) -> Result<Self, Self::Error> {
        let count = raw.points.len();
        let valid = match raw.kind {
            ActionKind::Pen => count >= 2,
            ActionKind::Mosaic | ActionKind::Rectangle | ActionKind::Circle => count == 2,
        };
        if !valid {
            return Err(format!("{:?} action cannot have {count} points", raw.kind));
        }
        match raw.line_width {
            Some(width) if !(width.is_finite() && width > 0.0) => {
                return Err(format!("line width {width} is not positive"));
            }
            _ => {}
        }
        Ok(Self {
            kind: raw.kind,
            points: raw.points,
            color: raw.color,
            line_width: raw.line_width,
        })
    }
}

/// Path collected while a pen gesture is in progress
#[derive(Debug, Clone, Default)]
pub struct GesturePath {
    points: Vec<Point>,
}

impl GesturePath {
    pub fn starting_at(point: Point) -> Self {
        Self {
            points: vec![point],
        }
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Convert into a pen action; single-point paths produce nothing
    pub fn into_action(self, color: Color32, line_width: f32) -> Option<DrawAction> {
        DrawAction::pen(self.points, color, Some(line_width))
    }
}
