use crate::graph::{Node, NodeId};

/// Slot storage for document nodes
///
/// Ids are never reused. Removed nodes stay in their slot (detached) so
/// that undo can re-attach them until the slot is explicitly freed.
#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    slots: Vec<Option<Node>>,
}

impl Arena {
    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.slots.len());
        self.slots.push(Some(node));
        id
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Drop every detached node; returns how many slots were released
    pub(crate) fn free_detached(&mut self) -> usize {
        let mut freed = 0;
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|node| !node.attached) {
                *slot = None;
                freed += 1;
            }
        }
        freed
    }

    /// Attached nodes in allocation order
    pub(crate) fn attached(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .filter(|node| node.attached)
                .map(|node| (NodeId::from_index(index), node))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Payload;

    #[test]
    fn test_alloc_and_free_detached() {
        let mut arena = Arena::default();
        let kept = arena.alloc(Node::new("NAME", Payload::Scalar(String::new())));
        let dropped = arena.alloc(Node::new("NOTE", Payload::Scalar(String::new())));
        arena.get_mut(kept).unwrap().attached = true;

        assert_eq!(arena.free_detached(), 1);
        assert!(arena.get(kept).is_some());
        assert!(arena.get(dropped).is_none());
        assert_eq!(arena.attached().count(), 1);
    }
}
