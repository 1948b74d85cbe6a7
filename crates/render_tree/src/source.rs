use crate::{ComponentId, RenderTree};
use std::collections::HashMap;

/// Supplies the current settled tree for a component identity.
pub trait TreeSource {
    /// Returns `None` for identities the source does not know.
    fn frames(&self, id: ComponentId) -> Option<&RenderTree>;
}

impl<T: TreeSource + ?Sized> TreeSource for &T {
    fn frames(&self, id: ComponentId) -> Option<&RenderTree> {
        (**self).frames(id)
    }
}

/// Per-host storage of the latest tree for each component.
///
/// Trees are replaced whole; there is no in-place patching.
#[derive(Debug, Default)]
pub struct FrameStore {
    trees: HashMap<ComponentId, RenderTree>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `tree` as the current output of `id`, returning the tree it replaced.
    pub fn replace(&mut self, id: ComponentId, tree: RenderTree) -> Option<RenderTree> {
        self.trees.insert(id, tree)
    }

    pub fn remove(&mut self, id: ComponentId) -> Option<RenderTree> {
        self.trees.remove(&id)
    }

    pub fn clear(&mut self) {
        self.trees.clear();
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.trees.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Known identities in ascending order.
    pub fn ids(&self) -> Vec<ComponentId> {
        let mut ids: Vec<ComponentId> = self.trees.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl TreeSource for FrameStore {
    fn frames(&self, id: ComponentId) -> Option<&RenderTree> {
        self.trees.get(&id)
    }
}

impl FromIterator<(ComponentId, RenderTree)> for FrameStore {
    fn from_iter<I: IntoIterator<Item = (ComponentId, RenderTree)>>(iter: I) -> Self {
        Self {
            trees: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderFrame;

    #[test]
    fn replace_swaps_whole_tree() {
        let mut store = FrameStore::new();
        let id = ComponentId(1);
        assert!(store.replace(id, RenderTree::new(vec![RenderFrame::text("a")])).is_none());
        let previous = store
            .replace(id, RenderTree::new(vec![RenderFrame::text("b")]))
            .expect("previous tree");
        assert_eq!(previous.frames(), &[RenderFrame::text("a")]);
        assert_eq!(
            store.frames(id).map(RenderTree::frames),
            Some(&[RenderFrame::text("b")][..])
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_identity_resolves_to_none() {
        let store = FrameStore::new();
        assert!(store.frames(ComponentId(9)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn ids_are_sorted() {
        let store: FrameStore = [3, 1, 2]
            .into_iter()
            .map(|n| (ComponentId(n), RenderTree::default()))
            .collect();
        assert_eq!(
            store.ids(),
            vec![ComponentId(1), ComponentId(2), ComponentId(3)]
        );
    }

    #[test]
    fn remove_and_clear_drop_trees() {
        let mut store = FrameStore::new();
        store.replace(ComponentId(1), RenderTree::default());
        store.replace(ComponentId(2), RenderTree::default());
        assert!(store.remove(ComponentId(1)).is_some());
        assert!(!store.contains(ComponentId(1)));
        store.clear();
        assert!(store.is_empty());
    }
}
