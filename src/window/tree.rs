use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Geometry, MessageQueue, WindowFlags, WindowId};
use crate::constants::UNASSIGNED_CHILD_ID;
use crate::message::MessageKind;
use crate::surface::Surface;
use crate::toolkit::{Handler, Teardown};

pub(crate) struct Node {
    pub(crate) geometry: Geometry,
    pub(crate) parent: Option<WindowId>,
    pub(crate) first_child: Option<WindowId>,
    pub(crate) next_sibling: Option<WindowId>,
    pub(crate) child_id: i16,
    pub(crate) flags: WindowFlags,
    pub(crate) handlers: HashMap<MessageKind, Handler>,
    pub(crate) queue: Arc<MessageQueue>,
    pub(crate) surface: Arc<Mutex<Surface>>,
    pub(crate) teardown: Option<Teardown>,
    /// Dialog-local focus among the direct children.
    pub(crate) current_item: Option<WindowId>,
}

impl Node {
    pub(crate) fn new(geometry: Geometry, handlers: HashMap<MessageKind, Handler>) -> Self {
        Self {
            geometry,
            parent: None,
            first_child: None,
            next_sibling: None,
            child_id: UNASSIGNED_CHILD_ID,
            flags: WindowFlags::empty(),
            handlers,
            queue: Arc::new(MessageQueue::new()),
            surface: Arc::new(Mutex::new(Surface::new(geometry.width, geometry.height))),
            teardown: None,
            current_item: None,
        }
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of windows linked by parent / first-child / next-sibling handles.
#[derive(Default)]
pub(crate) struct WindowTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl WindowTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, id: WindowId) -> Option<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: WindowId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }

    pub(crate) fn contains(&self, id: WindowId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    /// Store `node` and append it to the end of its parent's child list.
    pub(crate) fn insert(&mut self, parent: Option<WindowId>, mut node: Node) -> WindowId {
        node.parent = parent;
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                WindowId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                WindowId::new(index, 0)
            }
        };
        if let Some(parent) = parent {
            match self.children(parent).last().copied() {
                Some(last) => {
                    if let Some(last) = self.get_mut(last) {
                        last.next_sibling = Some(id);
                    }
                }
                None => {
                    if let Some(parent) = self.get_mut(parent) {
                        parent.first_child = Some(id);
                    }
                }
            }
        }
        id
    }

    /// Detach `id` from its parent's child list, patching sibling links.
    pub(crate) fn unlink(&mut self, id: WindowId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, next) = (node.parent, node.next_sibling);
        let Some(parent) = parent else {
            return;
        };
        let prev = self
            .children(parent)
            .into_iter()
            .take_while(|&child| child != id)
            .last();
        let is_first = self.get(parent).and_then(|p| p.first_child) == Some(id);
        if is_first {
            if let Some(parent) = self.get_mut(parent) {
                parent.first_child = next;
                if parent.current_item == Some(id) {
                    parent.current_item = None;
                }
            }
        } else {
            if let Some(prev) = prev.and_then(|prev| self.get_mut(prev)) {
                prev.next_sibling = next;
            }
            if let Some(parent) = self.get_mut(parent)
                && parent.current_item == Some(id)
            {
                parent.current_item = None;
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
            node.next_sibling = None;
        }
    }

    /// Release the slot of an already unlinked, childless window.
    pub(crate) fn remove(&mut self, id: WindowId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index() as u32);
        Some(node)
    }

    pub(crate) fn children(&self, id: WindowId) -> Vec<WindowId> {
        let mut out = Vec::new();
        let mut cursor = self.get(id).and_then(|node| node.first_child);
        while let Some(child) = cursor {
            out.push(child);
            cursor = self.get(child).and_then(|node| node.next_sibling);
        }
        out
    }

    pub(crate) fn find_child_by_id(&self, parent: WindowId, child_id: i16) -> Option<WindowId> {
        self.children(parent)
            .into_iter()
            .find(|&child| self.get(child).is_some_and(|node| node.child_id == child_id))
    }

    /// Direct child of `id` whose subtree contains `focus`.
    pub(crate) fn find_focus_branch(
        &self,
        id: WindowId,
        focus: Option<WindowId>,
    ) -> Option<WindowId> {
        let mut cursor = focus?;
        loop {
            let parent = self.get(cursor)?.parent?;
            if parent == id {
                return Some(cursor);
            }
            cursor = parent;
        }
    }

    pub(crate) fn point_belongs(&self, id: WindowId, x: i32, y: i32) -> bool {
        self.get(id).is_some_and(|node| node.geometry.contains(x, y))
    }

    /// Deepest window under the absolute point, starting from `root`.
    ///
    /// At each level the focus branch wins when it contains the point;
    /// otherwise the last child in list order that contains it.
    pub(crate) fn window_at(
        &self,
        root: WindowId,
        focus: Option<WindowId>,
        x: i32,
        y: i32,
    ) -> Option<WindowId> {
        if !self.contains(root) {
            return None;
        }
        let mut current = root;
        loop {
            let focus_child = self.find_focus_branch(current, focus);
            let next = match focus_child {
                Some(child) if self.point_belongs(child, x, y) => Some(child),
                _ => self
                    .children(current)
                    .into_iter()
                    .filter(|&child| Some(child) != focus_child)
                    .filter(|&child| self.point_belongs(child, x, y))
                    .last(),
            };
            match next {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// Next child after `current` in list order, wrapping to the first.
    pub(crate) fn next_child(&self, parent: WindowId, current: Option<WindowId>) -> Option<WindowId> {
        let first = self.get(parent)?.first_child;
        match current.and_then(|c| self.get(c)) {
            Some(node) if node.parent == Some(parent) => node.next_sibling.or(first),
            _ => first,
        }
    }

    pub(crate) fn flags(&self, id: WindowId) -> WindowFlags {
        self.get(id).map(|node| node.flags).unwrap_or_default()
    }

    /// Whether `id` is an item whose parent is a dialog.
    pub(crate) fn is_dialog_item(&self, id: WindowId) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        node.flags.contains(WindowFlags::ITEM)
            && node
                .parent
                .is_some_and(|parent| self.flags(parent).contains(WindowFlags::DIALOG))
    }
}
