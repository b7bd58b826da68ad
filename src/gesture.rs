use crate::id::BlockId;

/// A completed drop of one image block onto another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRequest {
    pub dragged: BlockId,
    pub target: BlockId,
}

/// One drag of an image block, from pick-up to drop.
///
/// The session is created when the drag starts, fed hover changes, and
/// consumed by [`finish`](Self::finish) or [`cancel`](Self::cancel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeGesture {
    dragged: BlockId,
    hovered: Option<BlockId>,
}

impl MergeGesture {
    pub fn begin(dragged: BlockId) -> Self {
        Self {
            dragged,
            hovered: None,
        }
    }

    pub fn dragged(&self) -> BlockId {
        self.dragged
    }

    /// The block currently under the pointer, if it is a valid drop target
    pub fn target(&self) -> Option<BlockId> {
        self.hovered.filter(|id| *id != self.dragged)
    }

    pub fn hover(&mut self, block: Option<BlockId>) {
        self.hovered = block;
    }

    /// Drop: a merge request if the pointer is over another block
    pub fn finish(self) -> Option<MergeRequest> {
        let target = self.target()?;
        Some(MergeRequest {
            dragged: self.dragged,
            target,
        })
    }

    pub fn cancel(self) {}
}
