use std::collections::HashSet;

use crate::document::Element;

/// A list item visible in the terminal view together with its position in the tree.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Flattened<'a> {
    /// Index path from the top level down to this item.
    pub identifier: Vec<usize>,
    pub item: &'a Element,
}

impl<'a> Flattened<'a> {
    /// Zero based depth. Depth 0 means top level with 0 indentation.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.identifier.len() - 1
    }

    #[must_use]
    pub fn label(&self) -> &'a str {
        self.item.label_text().unwrap_or_default()
    }

    #[must_use]
    pub fn is_parent(&self) -> bool {
        self.item.is_parent()
    }
}

/// All items of a rendered container which are visible with the given `opened` items.
///
/// Top level items of every list in the container are always visible.
/// Children show up when the identifier of their parent is contained in `opened`.
#[must_use]
pub fn flatten<'a>(opened: &HashSet<Vec<usize>>, container: &'a Element) -> Vec<Flattened<'a>> {
    let top_level = container.lists().flat_map(Element::children);
    let mut result = Vec::new();
    flatten_items(opened, top_level, &[], &mut result);
    result
}

fn flatten_items<'a>(
    opened: &HashSet<Vec<usize>>,
    items: impl Iterator<Item = &'a Element>,
    current: &[usize],
    result: &mut Vec<Flattened<'a>>,
) {
    for (index, item) in items.enumerate() {
        let mut identifier = current.to_vec();
        identifier.push(index);

        let nested = item
            .nested_list()
            .filter(|_| opened.contains(&identifier));

        result.push(Flattened {
            identifier: identifier.clone(),
            item,
        });

        if let Some(nested) = nested {
            flatten_items(opened, nested.children().iter(), &identifier, result);
        }
    }
}

#[cfg(test)]
pub(crate) fn example_container() -> Element {
    let mut container = Element::container("tree");
    crate::render(&mut container, &crate::TreeNode::example()).unwrap();
    container
}

#[test]
fn depth_works() {
    let container = example_container();
    let mut open = HashSet::new();
    open.insert(vec![1]);
    open.insert(vec![1, 1]);
    let depths = flatten(&open, &container)
        .into_iter()
        .map(|flattened| flattened.depth())
        .collect::<Vec<_>>();
    assert_eq!(depths, [0, 0, 1, 1, 2, 2, 1, 0]);
}

#[cfg(test)]
fn flatten_works(open: &HashSet<Vec<usize>>, expected: &[&str]) {
    let container = example_container();
    let actual = flatten(open, &container)
        .iter()
        .map(Flattened::label)
        .collect::<Vec<_>>();
    assert_eq!(actual, expected);
}

#[test]
fn flatten_nothing_open_is_top_level() {
    let open = HashSet::new();
    flatten_works(&open, &["a", "b", "h"]);
}

#[test]
fn flatten_wrong_open_is_only_top_level() {
    let mut open = HashSet::new();
    open.insert(vec![0]);
    open.insert(vec![1, 1]);
    flatten_works(&open, &["a", "b", "h"]);
}

#[test]
fn flatten_one_is_open() {
    let mut open = HashSet::new();
    open.insert(vec![1]);
    flatten_works(&open, &["a", "b", "c", "d", "g", "h"]);
}

#[test]
fn flatten_all_open() {
    let mut open = HashSet::new();
    open.insert(vec![1]);
    open.insert(vec![1, 1]);
    flatten_works(&open, &["a", "b", "c", "d", "e", "f", "g", "h"]);
}

#[test]
fn flatten_continues_over_multiple_lists() {
    let mut container = example_container();
    crate::render(&mut container, &[crate::TreeNode::new_leaf("z")]).unwrap();
    let identifiers = flatten(&HashSet::new(), &container)
        .into_iter()
        .map(|flattened| flattened.identifier)
        .collect::<Vec<_>>();
    assert_eq!(identifiers, [vec![0], vec![1], vec![2], vec![3]]);
}
