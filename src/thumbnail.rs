use std::collections::BTreeMap;

use crate::event::{EventBus, SubscriptionId};
use crate::id::BlockId;

/// Preview of an image block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailEvent {
    Registered(BlockId),
    Removed(BlockId),
    Cleared,
}

/// Thumbnail bookkeeping for the image blocks of one document.
///
/// Created by whoever owns the editing session and passed to the components
/// that need it; subscribers hear about every change as it happens.
#[derive(Debug, Default)]
pub struct ThumbnailRegistry {
    entries: BTreeMap<BlockId, Thumbnail>,
    events: EventBus<ThumbnailEvent>,
}

impl ThumbnailRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the thumbnail of `id`
    pub fn register(&mut self, id: BlockId, thumbnail: Thumbnail) {
        self.entries.insert(id, thumbnail);
        self.events.emit(&ThumbnailEvent::Registered(id));
    }

    pub fn remove(&mut self, id: BlockId) -> Option<Thumbnail> {
        let removed = self.entries.remove(&id)?;
        self.events.emit(&ThumbnailEvent::Removed(id));
        Some(removed)
    }

    pub fn get(&self, id: BlockId) -> Option<&Thumbnail> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockId, &Thumbnail)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.events.emit(&ThumbnailEvent::Cleared);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&ThumbnailEvent) + Send + 'static) -> SubscriptionId {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn thumb(src: &str) -> Thumbnail {
        Thumbnail {
            src: src.to_owned(),
            width: 64,
            height: 48,
        }
    }

    #[test]
    fn test_subscribers_are_notified_synchronously() {
        let mut registry = ThumbnailRegistry::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        registry.subscribe(move |event| sink.lock().push(event.clone()));

        let id = BlockId::new();
        registry.register(id, thumb("a.png"));
        assert_eq!(events.lock().as_slice(), &[ThumbnailEvent::Registered(id)]);

        assert_eq!(registry.remove(id), Some(thumb("a.png")));
        assert!(registry.remove(id).is_none());
        registry.clear();

        assert_eq!(
            events.lock().as_slice(),
            &[ThumbnailEvent::Registered(id), ThumbnailEvent::Removed(id)]
        );
    }

    #[test]
    fn test_clear_empties_registry() {
        let mut registry = ThumbnailRegistry::new();
        registry.register(BlockId::new(), thumb("a.png"));
        registry.register(BlockId::new(), thumb("b.png"));
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = ThumbnailRegistry::new();
        let second = ThumbnailRegistry::new();
        let id = BlockId::new();
        first.register(id, thumb("a.png"));
        assert!(first.get(id).is_some());
        assert!(second.get(id).is_none());
    }
}
