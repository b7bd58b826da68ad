//! Side-by-side merging of two image blocks.
//!
//! Dropping one image block onto another gives both a width proportional to
//! their aspect ratio, so they render at the same height next to each other,
//! and moves the dragged block to directly after the target.

use log::{debug, info, warn};

use crate::config::EditorConfig;
use crate::document::{DocumentEdit, DocumentHost, EditStep};
use crate::error::MergeError;
use crate::geometry;
use crate::id::BlockId;
use crate::node::{BlockWidth, ImageAttrs};
use crate::source::{ImageRef, ImageSource};

pub const DEFAULT_GAP_PERCENT: u8 = 2;
/// Largest gap that still leaves each block at least 1%
pub const MAX_GAP_PERCENT: u8 = 98;

/// Widths for one merge, ready to commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePlan {
    pub target: BlockId,
    pub dragged: BlockId,
    pub target_width: u8,
    pub dragged_width: u8,
}

impl MergePlan {
    /// Both width updates and the move, as one edit.
    ///
    /// Only the widths are patched, so other attributes edited after planning survive.
    pub fn to_edit(&self) -> DocumentEdit {
        DocumentEdit::new()
            .with_step(EditStep::SetWidth {
                id: self.target,
                width: BlockWidth::percent(self.target_width),
            })
            .with_step(EditStep::SetWidth {
                id: self.dragged,
                width: BlockWidth::percent(self.dragged_width),
            })
            .with_step(EditStep::MoveAfter {
                node: self.dragged,
                anchor: self.target,
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    Merged(MergePlan),
    /// The request was dropped without touching the document (e.g. a self-merge)
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePlanner {
    gap_percent: u8,
}

impl Default for MergePlanner {
    fn default() -> Self {
        Self::new(DEFAULT_GAP_PERCENT)
    }
}

impl MergePlanner {
    pub fn new(gap_percent: u8) -> Self {
        Self {
            gap_percent: gap_percent.min(MAX_GAP_PERCENT),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.merge_gap_percent)
    }

    pub fn gap_percent(&self) -> u8 {
        self.gap_percent
    }

    /// Split the space left after the gap between target and dragged block.
    ///
    /// Unusable ratios (non-finite, zero or negative) count as square.
    /// Each side gets at least 1%, however extreme the ratios.
    pub fn split_widths(&self, target_ratio: f64, dragged_ratio: f64) -> (u8, u8) {
        let target_ratio = usable_ratio(target_ratio);
        let dragged_ratio = usable_ratio(dragged_ratio);
        let total = 100 - self.gap_percent;
        let share = (target_ratio / (target_ratio + dragged_ratio) * f64::from(total)).round() as u8;
        let target = share.clamp(1, total - 1);
        (target, total - target)
    }

    /// Plan a merge from known aspect ratios
    pub fn plan<D: DocumentHost + ?Sized>(
        &self,
        doc: &D,
        dragged: BlockId,
        target: BlockId,
        dragged_ratio: f64,
        target_ratio: f64,
    ) -> Result<MergeOutcome, MergeError> {
        if dragged == target {
            debug!("Ignoring merge of block {dragged} with itself");
            return Ok(MergeOutcome::Rejected);
        }
        image_attrs(doc, target)?;
        image_attrs(doc, dragged)?;

        let (target_width, dragged_width) = self.split_widths(target_ratio, dragged_ratio);
        Ok(MergeOutcome::Merged(MergePlan {
            target,
            dragged,
            target_width,
            dragged_width,
        }))
    }

    /// Apply a plan as one atomic edit
    pub fn commit<D: DocumentHost + ?Sized>(&self, doc: &mut D, plan: &MergePlan) -> Result<(), MergeError> {
        doc.apply_edit(&plan.to_edit())?;
        info!(
            "🧩 Merged block {} ({}%) after block {} ({}%)",
            plan.dragged, plan.dragged_width, plan.target, plan.target_width
        );
        Ok(())
    }

    /// Probe both images, then plan and commit the merge.
    ///
    /// Blocks are looked up again after probing, so edits made to the document
    /// while the probes were in flight are respected.
    pub async fn merge<D: DocumentHost + ?Sized>(
        &self,
        doc: &mut D,
        probe: &dyn ImageSource,
        dragged: BlockId,
        target: BlockId,
    ) -> Result<MergeOutcome, MergeError> {
        if dragged == target {
            debug!("Ignoring merge of block {dragged} with itself");
            return Ok(MergeOutcome::Rejected);
        }
        let target_src = image_attrs(&*doc, target)?.src;
        let dragged_src = image_attrs(&*doc, dragged)?.src;

        let (target_ratio, dragged_ratio) =
            futures::join!(probe_ratio(probe, &target_src), probe_ratio(probe, &dragged_src));

        let outcome = self.plan(&*doc, dragged, target, dragged_ratio, target_ratio)?;
        if let MergeOutcome::Merged(plan) = &outcome {
            self.commit(doc, plan)?;
        }
        Ok(outcome)
    }
}

fn usable_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 }
}

fn image_attrs<D: DocumentHost + ?Sized>(doc: &D, id: BlockId) -> Result<ImageAttrs, MergeError> {
    let location = doc.find_node(id).ok_or(MergeError::BlockNotFound(id))?;
    location.node.as_image().cloned().ok_or(MergeError::NotAnImage(id))
}

/// Natural aspect ratio of `src`, or 1.0 when it cannot be determined
async fn probe_ratio(probe: &dyn ImageSource, src: &str) -> f64 {
    match probe.dimensions(&ImageRef::url(src)).await {
        Ok((width, height)) => geometry::aspect_ratio(width, height).unwrap_or_else(|| {
            warn!("Image {src} has no area, assuming a square");
            1.0
        }),
        Err(error) => {
            warn!("Could not probe {src} ({error}), assuming a square");
            1.0
        }
    }
}
