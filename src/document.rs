use log::debug;
use parking_lot::Mutex;
use std::mem;
use std::sync::Arc;

use crate::error::EditRejected;
use crate::event::{DocumentEvent, EventBus, SubscriptionId};
use crate::id::BlockId;
use crate::node::{BlockWidth, Node, NodeKind};

/// A node together with its current position in the document
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLocation {
    pub position: usize,
    pub node: Node,
}

/// One structural change. Nodes are addressed by id and resolved when the edit is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum EditStep {
    /// Replace the attributes of `id`; the node kind must stay the same
    SetAttributes { id: BlockId, kind: NodeKind },
    /// Change only the width of `id`, keeping every other attribute as it is now
    SetWidth { id: BlockId, width: BlockWidth },
    /// Take `node` out of the document and reinsert it right after `anchor`
    MoveAfter { node: BlockId, anchor: BlockId },
}

impl EditStep {
    fn target(&self) -> BlockId {
        match self {
            Self::SetAttributes { id, .. } | Self::SetWidth { id, .. } => *id,
            Self::MoveAfter { node, .. } => *node,
        }
    }
}

/// An ordered list of steps applied as one transaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentEdit {
    steps: Vec<EditStep>,
}

impl DocumentEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: EditStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: EditStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[EditStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// The document capability consumed by the merge planner.
pub trait DocumentHost {
    fn find_node(&self, id: BlockId) -> Option<NodeLocation>;

    /// Apply every step or none of them
    fn apply_edit(&mut self, edit: &DocumentEdit) -> Result<(), EditRejected>;
}

/// An ordered sequence of blocks with atomic edits and change notification
#[derive(Debug, Default)]
pub struct BlockDocument {
    nodes: Vec<Node>,
    revision: u64,
    events: EventBus<DocumentEvent>,
}

impl BlockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Incremented by every committed change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn position_of(&self, id: BlockId) -> Option<usize> {
        position_of(&self.nodes, id)
    }

    pub fn get(&self, id: BlockId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn ids(&self) -> Vec<BlockId> {
        self.nodes.iter().map(Node::id).collect()
    }

    /// Append a node at the end
    pub fn push(&mut self, node: Node) -> BlockId {
        let position = self.nodes.len();
        self.insert(position, node)
    }

    /// Insert a node at `position`, clamped to the end
    pub fn insert(&mut self, position: usize, node: Node) -> BlockId {
        let id = node.id();
        let position = position.min(self.nodes.len());
        self.nodes.insert(position, node);
        self.revision += 1;
        self.events.emit(&DocumentEvent::Inserted { id, position });
        id
    }

    pub fn remove(&mut self, id: BlockId) -> Option<Node> {
        let position = self.position_of(id)?;
        let node = self.nodes.remove(position);
        self.revision += 1;
        self.events.emit(&DocumentEvent::Removed { id });
        Some(node)
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&DocumentEvent) + Send + 'static) -> SubscriptionId {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}

impl DocumentHost for BlockDocument {
    fn find_node(&self, id: BlockId) -> Option<NodeLocation> {
        let position = self.position_of(id)?;
        Some(NodeLocation {
            position,
            node: self.nodes[position].clone(),
        })
    }

    fn apply_edit(&mut self, edit: &DocumentEdit) -> Result<(), EditRejected> {
        // Work on a copy so a failing step leaves the document untouched.
        let mut staged = self.nodes.clone();
        for step in edit.steps() {
            apply_step(&mut staged, step)?;
        }

        self.nodes = staged;
        self.revision += 1;
        let mut touched: Vec<BlockId> = Vec::new();
        for id in edit.steps().iter().map(EditStep::target) {
            if !touched.contains(&id) {
                touched.push(id);
            }
        }
        debug!("Applied {} edit steps (revision {})", edit.steps().len(), self.revision);
        self.events.emit(&DocumentEvent::Edited {
            revision: self.revision,
            touched,
        });
        Ok(())
    }
}

fn position_of(nodes: &[Node], id: BlockId) -> Option<usize> {
    nodes.iter().position(|node| node.id() == id)
}

fn apply_step(nodes: &mut Vec<Node>, step: &EditStep) -> Result<(), EditRejected> {
    match step {
        EditStep::SetAttributes { id, kind } => {
            let position = position_of(nodes, *id).ok_or(EditRejected::MissingNode(*id))?;
            let current = nodes[position].kind_mut();
            if mem::discriminant(&*current) != mem::discriminant(kind) {
                return Err(EditRejected::KindMismatch(*id));
            }
            *current = kind.clone();
        }
        EditStep::SetWidth { id, width } => {
            let position = position_of(nodes, *id).ok_or(EditRejected::MissingNode(*id))?;
            match nodes[position].kind_mut() {
                NodeKind::Image(attrs) => attrs.width = *width,
                NodeKind::Video(attrs) => attrs.width = *width,
                _ => return Err(EditRejected::NoWidth(*id)),
            }
        }
        EditStep::MoveAfter { node, anchor } => {
            if node == anchor {
                return Err(EditRejected::SelfAnchor(*node));
            }
            let from = position_of(nodes, *node).ok_or(EditRejected::MissingNode(*node))?;
            let moved = nodes.remove(from);
            // The anchor may have shifted by the removal above.
            let to = position_of(nodes, *anchor).ok_or(EditRejected::MissingNode(*anchor))?;
            nodes.insert(to + 1, moved);
        }
    }
    Ok(())
}

/// The single shared, mutable document.
///
/// Every edit runs under one lock acquisition, so readers never observe a
/// partially applied edit.
#[derive(Debug, Clone, Default)]
pub struct SharedDocument {
    inner: Arc<Mutex<BlockDocument>>,
}

impl SharedDocument {
    pub fn new(document: BlockDocument) -> Self {
        Self {
            inner: Arc::new(Mutex::new(document)),
        }
    }

    /// Run `f` with shared access to the document
    pub fn read<R>(&self, f: impl FnOnce(&BlockDocument) -> R) -> R {
        let guard = self.inner.lock();
        f(&*guard)
    }

    /// Run `f` with exclusive access to the document
    pub fn write<R>(&self, f: impl FnOnce(&mut BlockDocument) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }
}

impl DocumentHost for SharedDocument {
    fn find_node(&self, id: BlockId) -> Option<NodeLocation> {
        self.inner.lock().find_node(id)
    }

    fn apply_edit(&mut self, edit: &DocumentEdit) -> Result<(), EditRejected> {
        self.inner.lock().apply_edit(edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ImageAttrs;

    fn sample() -> (BlockDocument, Vec<BlockId>) {
        let mut doc = BlockDocument::new();
        let ids = vec![
            doc.push(Node::paragraph("intro")),
            doc.push(Node::image(ImageAttrs::new("a.png"))),
            doc.push(Node::paragraph("middle")),
            doc.push(Node::image(ImageAttrs::new("b.png"))),
        ];
        (doc, ids)
    }

    #[test]
    fn test_move_after_forward_and_backward() {
        let (mut doc, ids) = sample();
        let edit = DocumentEdit::new().with_step(EditStep::MoveAfter { node: ids[1], anchor: ids[3] });
        doc.apply_edit(&edit).unwrap();
        assert_eq!(doc.ids(), vec![ids[0], ids[2], ids[3], ids[1]]);

        let edit = DocumentEdit::new().with_step(EditStep::MoveAfter { node: ids[1], anchor: ids[0] });
        doc.apply_edit(&edit).unwrap();
        assert_eq!(doc.ids(), vec![ids[0], ids[1], ids[2], ids[3]]);
    }

    #[test]
    fn test_failed_step_rolls_back_everything() {
        let (mut doc, ids) = sample();
        let before = doc.nodes().to_vec();
        let revision = doc.revision();

        let edit = DocumentEdit::new()
            .with_step(EditStep::SetAttributes {
                id: ids[1],
                kind: NodeKind::Image(ImageAttrs::new("a.png").with_width(BlockWidth::Percent(40))),
            })
            .with_step(EditStep::MoveAfter { node: ids[1], anchor: BlockId::new() });

        assert!(matches!(doc.apply_edit(&edit), Err(EditRejected::MissingNode(_))));
        assert_eq!(doc.nodes(), before.as_slice());
        assert_eq!(doc.revision(), revision);
    }

    #[test]
    fn test_kind_cannot_change() {
        let (mut doc, ids) = sample();
        let edit = DocumentEdit::new().with_step(EditStep::SetAttributes {
            id: ids[0],
            kind: NodeKind::Image(ImageAttrs::new("x.png")),
        });
        assert_eq!(doc.apply_edit(&edit), Err(EditRejected::KindMismatch(ids[0])));
    }

    #[test]
    fn test_set_width_keeps_other_attributes() {
        let (mut doc, ids) = sample();
        let mut captioned = ImageAttrs::new("a.png");
        captioned.alt = Some("caption".to_owned());
        let edit = DocumentEdit::new().with_step(EditStep::SetAttributes {
            id: ids[1],
            kind: NodeKind::Image(captioned),
        });
        doc.apply_edit(&edit).unwrap();

        let edit = DocumentEdit::new().with_step(EditStep::SetWidth { id: ids[1], width: BlockWidth::Percent(40) });
        doc.apply_edit(&edit).unwrap();

        let image = doc.get(ids[1]).and_then(Node::as_image).unwrap();
        assert_eq!(image.width, BlockWidth::Percent(40));
        assert_eq!(image.alt.as_deref(), Some("caption"));
    }

    #[test]
    fn test_set_width_needs_a_sized_block() {
        let (mut doc, ids) = sample();
        let edit = DocumentEdit::new().with_step(EditStep::SetWidth { id: ids[0], width: BlockWidth::Full });
        assert_eq!(doc.apply_edit(&edit), Err(EditRejected::NoWidth(ids[0])));
    }

    #[test]
    fn test_edit_notifies_subscribers() {
        let (mut doc, ids) = sample();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        doc.subscribe(move |event| sink.lock().push(event.clone()));

        let edit = DocumentEdit::new().with_step(EditStep::MoveAfter { node: ids[3], anchor: ids[0] });
        doc.apply_edit(&edit).unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(matches!(&seen[0], DocumentEvent::Edited { touched, .. } if touched == &vec![ids[3]]));
    }

    #[test]
    fn test_shared_document_edits_under_one_lock() {
        let (doc, ids) = sample();
        let mut shared = SharedDocument::new(doc);
        let reader = shared.clone();

        let edit = DocumentEdit::new().with_step(EditStep::MoveAfter { node: ids[0], anchor: ids[3] });
        shared.apply_edit(&edit).unwrap();

        assert_eq!(reader.read(|doc| doc.position_of(ids[0])), Some(3));
        assert_eq!(reader.find_node(ids[1]).map(|loc| loc.position), Some(0));
    }
}
