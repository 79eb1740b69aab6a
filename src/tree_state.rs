use std::collections::HashSet;

use crate::document::Element;
use crate::flatten::{flatten, Flattened};

/// Selection, open directories and scroll offset of a [`Tree`](crate::Tree).
///
/// Items are addressed by index path, see [`Flattened::identifier`].
/// The rendered container is passed in wherever the shown items matter.
///
/// # Example
///
/// ```
/// # use edfs_tree::{render, Element, TreeNode, TreeState};
/// let mut container = Element::container("tree");
/// render(&mut container, &[TreeNode::new("docs", vec![TreeNode::new_leaf("a.txt")])])?;
///
/// let mut state = TreeState::default();
/// state.select_first(&container);
/// state.toggle_selected();
/// assert_eq!(state.flatten(&container).len(), 2);
/// # Ok::<(), edfs_tree::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct TreeState {
    pub(super) offset: usize,
    pub(super) opened: HashSet<Vec<usize>>,
    pub(super) selected: Vec<usize>,
    pub(super) ensure_selected_in_view_on_next_render: bool,
}

impl TreeState {
    #[must_use]
    pub const fn get_offset(&self) -> usize {
        self.offset
    }

    /// Items of the `container` shown with the current open directories, in display order.
    #[must_use]
    pub fn flatten<'a>(&self, container: &'a Element) -> Vec<Flattened<'a>> {
        flatten(&self.opened, container)
    }

    /// Index path of the selected item, empty without selection.
    #[must_use]
    pub fn selected(&self) -> Vec<usize> {
        self.selected.clone()
    }

    /// Label of the selected item, `None` when it is hidden or nothing is selected.
    #[must_use]
    pub fn selected_label<'a>(&self, container: &'a Element) -> Option<&'a str> {
        self.flatten(container)
            .into_iter()
            .find(|flattened| flattened.identifier == self.selected)
            .map(|flattened| flattened.label())
    }

    /// Select the item at `identifier`, an empty path clears the selection.
    ///
    /// Returns `true` when the selection changed.
    pub fn select(&mut self, identifier: Vec<usize>) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        let changed = self.selected != identifier;
        self.selected = identifier;
        changed
    }

    /// Show the children of the directory at `identifier`.
    ///
    /// Returns `false` when it was open already or the path is empty.
    pub fn open(&mut self, identifier: Vec<usize>) -> bool {
        !identifier.is_empty() && self.opened.insert(identifier)
    }

    /// Open the selected directory when it is closed, close it otherwise.
    ///
    /// Returns `false` only without selection.
    pub fn toggle_selected(&mut self) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        if self.selected.is_empty() {
            false
        } else if self.opened.remove(&self.selected) {
            true
        } else {
            self.open(self.selected())
        }
    }

    /// Returns `true` when anything was open.
    pub fn close_all(&mut self) -> bool {
        let changed = !self.opened.is_empty();
        self.opened.clear();
        changed
    }

    /// Open every directory of the `container`, nested ones included.
    ///
    /// Returns `true` when anything was closed before.
    pub fn open_all(&mut self, container: &Element) -> bool {
        let mut changed = false;
        // Opening a level reveals the next one
        loop {
            let closed = self
                .flatten(container)
                .into_iter()
                .filter(|flattened| flattened.is_parent())
                .map(|flattened| flattened.identifier)
                .filter(|identifier| !self.opened.contains(identifier))
                .collect::<Vec<_>>();
            if closed.is_empty() {
                return changed;
            }
            changed = true;
            self.opened.extend(closed);
        }
    }

    /// Returns `true` when the selection changed.
    pub fn select_first(&mut self, container: &Element) -> bool {
        self.select_visible(container, |_| 0)
    }

    /// Select the last shown item.
    ///
    /// Returns `true` when the selection changed.
    pub fn select_last(&mut self, container: &Element) -> bool {
        self.select_visible(container, |_| usize::MAX)
    }

    /// Select a shown item by its position, computed from the position of the current selection.
    /// Positions past the end select the last item.
    fn select_visible<F>(&mut self, container: &Element, position: F) -> bool
    where
        F: FnOnce(Option<usize>) -> usize,
    {
        let visible = self.flatten(container);
        let current = visible
            .iter()
            .position(|flattened| flattened.identifier == self.selected);
        let index = position(current).min(visible.len().saturating_sub(1));
        let identifier = visible
            .into_iter()
            .nth(index)
            .map_or_else(Vec::new, |flattened| flattened.identifier);
        self.select(identifier)
    }

    /// Returns `false` when already at the top.
    pub fn scroll_up(&mut self, lines: usize) -> bool {
        let before = self.offset;
        self.offset = self.offset.saturating_sub(lines);
        before != self.offset
    }

    /// The offset is clamped to the items on the next render, so this always returns `true`.
    pub fn scroll_down(&mut self, lines: usize) -> bool {
        self.offset = self.offset.saturating_add(lines);
        true
    }

    /// Select the item shown above the selection, the last one without selection.
    pub fn key_up(&mut self, container: &Element) -> bool {
        self.select_visible(container, |current| {
            current.map_or(usize::MAX, |current| current.saturating_sub(1))
        })
    }

    /// Select the item shown below the selection, the first one without selection.
    pub fn key_down(&mut self, container: &Element) -> bool {
        self.select_visible(container, |current| {
            current.map_or(0, |current| current.saturating_add(1))
        })
    }

    /// Close the selected directory, or select the directory containing the selection.
    pub fn key_left(&mut self) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        self.opened.remove(&self.selected) || self.selected.pop().is_some()
    }

    /// Open the selected directory.
    pub fn key_right(&mut self) -> bool {
        self.ensure_selected_in_view_on_next_render = true;
        self.open(self.selected())
    }
}

#[cfg(test)]
use crate::flatten::example_container;

#[test]
fn key_down_walks_visible_items() {
    let container = example_container();
    let mut state = TreeState::default();
    assert!(state.key_down(&container));
    assert_eq!(state.selected(), [0]);
    assert!(state.key_down(&container));
    assert_eq!(state.selected_label(&container), Some("b"));

    state.key_right();
    state.key_down(&container);
    assert_eq!(state.selected(), [1, 0]);
    assert_eq!(state.selected_label(&container), Some("c"));
}

#[test]
fn key_up_without_selection_selects_last() {
    let container = example_container();
    let mut state = TreeState::default();
    state.key_up(&container);
    assert_eq!(state.selected_label(&container), Some("h"));
}

#[test]
fn key_left_closes_then_selects_parent() {
    let container = example_container();
    let mut state = TreeState::default();
    state.open(vec![1]);
    state.select(vec![1, 1]);
    state.open(vec![1, 1]);

    assert!(state.key_left());
    assert_eq!(state.flatten(&container).len(), 6);
    assert_eq!(state.selected(), [1, 1]);
    assert!(state.key_left());
    assert_eq!(state.selected(), [1]);
}

#[test]
fn toggle_selected_opens_and_closes() {
    let container = example_container();
    let mut state = TreeState::default();
    state.select(vec![1]);
    assert!(state.toggle_selected());
    assert_eq!(state.flatten(&container).len(), 6);
    assert!(state.toggle_selected());
    assert_eq!(state.flatten(&container).len(), 3);
}

#[test]
fn open_all_reaches_nested_parents() {
    let container = example_container();
    let mut state = TreeState::default();
    assert!(state.open_all(&container));
    assert_eq!(state.flatten(&container).len(), 8);
    assert!(!state.open_all(&container));
    assert!(state.close_all());
    assert_eq!(state.flatten(&container).len(), 3);
}

#[test]
fn empty_identifier_is_never_opened() {
    let mut state = TreeState::default();
    assert!(!state.open(Vec::new()));
    assert!(!state.toggle_selected());
}

#[test]
fn scroll_up_stops_at_top() {
    let mut state = TreeState::default();
    assert!(state.scroll_down(2));
    assert!(state.scroll_up(5));
    assert!(!state.scroll_up(1));
    assert_eq!(state.get_offset(), 0);
}

#[test]
fn select_first_and_last_follow_open_directories() {
    let container = example_container();
    let mut state = TreeState::default();
    assert!(state.select_last(&container));
    assert_eq!(state.selected(), [2]);

    state.open(vec![2]);
    state.select_first(&container);
    assert_eq!(state.selected_label(&container), Some("a"));

    let empty = Element::container("empty");
    assert!(state.select_first(&empty));
    assert!(state.selected().is_empty());
}
