use std::slice::Iter;

use tracing::trace;

use crate::document::{Element, ElementKind, PARENT_CLASS};
use crate::error::{Error, ValidationError};
use crate::tree_node::TreeNode;

/// Nesting depth accepted by [`render`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Render `nodes` as a nested list appended to `container`.
///
/// Uses [`DEFAULT_MAX_DEPTH`], see [`Renderer`] for details.
///
/// # Errors
///
/// Errors when the nodes are nested deeper than [`DEFAULT_MAX_DEPTH`].
/// The container is unchanged in that case.
pub fn render(container: &mut Element, nodes: &[TreeNode]) -> Result<(), Error> {
    Renderer::new().render(container, nodes)
}

/// Converts [`TreeNode`]s into nested lists.
///
/// Every call appends exactly one list to the container, holding one item per node in input order.
/// An item shows the node name in a label.
/// Items of nodes with children carry the [`PARENT_CLASS`] and contain a nested list of their children.
///
/// Rendering is not idempotent: rendering twice into the same container appends a second list.
///
/// # Example
///
/// ```
/// # use edfs_tree::{Element, Renderer, TreeNode};
/// let nodes = vec![
///     TreeNode::new_leaf("a"),
///     TreeNode::new("b", vec![TreeNode::new_leaf("c")]),
/// ];
/// let mut container = Element::container("tree");
/// Renderer::new().max_depth(8).render(&mut container, &nodes)?;
/// assert_eq!(
///     container.to_html(),
///     r#"<div id="tree"><ul><li><span>a</span></li><li class="parent_li"><span>b</span><ul><li><span>c</span></li></ul></li></ul></div>"#
/// );
/// # Ok::<(), edfs_tree::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    max_depth: usize,
}

/// One level of the walk: the remaining nodes of a sequence and the list collecting their items.
struct Level<'n> {
    nodes: Iter<'n, TreeNode>,
    list: Element,
}

impl<'n> Level<'n> {
    fn new(nodes: &'n [TreeNode]) -> Self {
        Self {
            nodes: nodes.iter(),
            list: Element::new(ElementKind::List),
        }
    }
}

impl Renderer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Deepest accepted node depth. Top level nodes have depth 0.
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the list for `nodes` and append it to `container`.
    ///
    /// The whole list is built before the container is touched.
    ///
    /// # Errors
    ///
    /// Errors with [`ValidationError::TooDeep`] when a node is nested deeper than the configured maximum.
    pub fn render(&self, container: &mut Element, nodes: &[TreeNode]) -> Result<(), Error> {
        let list = self.build(nodes)?;
        container.append_child(list);
        Ok(())
    }

    /// Build the list for `nodes` without attaching it anywhere.
    ///
    /// # Errors
    ///
    /// See [`render`](Self::render).
    pub fn build(&self, nodes: &[TreeNode]) -> Result<Element, Error> {
        let mut current = Level::new(nodes);
        // Outer levels together with the item the current list gets nested into
        let mut ancestors: Vec<(Level<'_>, Element)> = Vec::new();
        loop {
            if let Some(node) = current.nodes.next() {
                let mut item = Element::list_item(node.name.as_str());
                if node.children.is_empty() {
                    current.list.append_child(item);
                    continue;
                }
                if ancestors.len() >= self.max_depth {
                    return Err(ValidationError::TooDeep {
                        max_depth: self.max_depth,
                    }
                    .into());
                }
                item.add_class(PARENT_CLASS);
                let outer = std::mem::replace(&mut current, Level::new(&node.children));
                ancestors.push((outer, item));
            } else if let Some((outer, mut item)) = ancestors.pop() {
                let done = std::mem::replace(&mut current, outer);
                item.append_child(done.list);
                current.list.append_child(item);
            } else {
                trace!(items = current.list.children().len(), "rendered tree");
                return Ok(current.list);
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
fn labels(list: &Element) -> Vec<&str> {
    list.children()
        .iter()
        .map(|item| item.label_text().unwrap())
        .collect()
}

#[cfg(test)]
fn chain(depth: usize) -> Vec<TreeNode> {
    let mut nodes = vec![TreeNode::new_leaf("leaf")];
    for index in 0..depth {
        nodes = vec![TreeNode::new(format!("level {index}"), nodes)];
    }
    nodes
}

#[test]
fn renders_one_list_with_items_in_order() {
    let mut container = Element::container("tree");
    render(&mut container, &TreeNode::example()).unwrap();

    assert_eq!(container.children().len(), 1);
    let list = container.child(0).unwrap();
    assert_eq!(list.kind(), ElementKind::List);
    assert_eq!(labels(list), ["a", "b", "h"]);
}

#[test]
fn leaf_has_no_nested_list_and_no_marker() {
    let mut container = Element::container("tree");
    render(&mut container, &[TreeNode::new_leaf("a")]).unwrap();

    let item = container.child(0).unwrap().child(0).unwrap();
    assert_eq!(item.kind(), ElementKind::ListItem);
    assert!(!item.is_parent());
    assert_eq!(item.nested_list(), None);
}

#[test]
fn parent_contains_rendered_children() {
    let nodes = TreeNode::example();
    let mut container = Element::container("tree");
    render(&mut container, &nodes).unwrap();

    let parent = container.child(0).unwrap().child(1).unwrap();
    assert!(parent.is_parent());
    assert_eq!(parent.label_text(), Some("b"));

    let mut expected = Element::container("expected");
    render(&mut expected, &nodes[1].children).unwrap();
    assert_eq!(parent.nested_list(), expected.child(0));
}

#[test]
fn two_node_example() {
    let nodes = vec![
        TreeNode::new_leaf("a"),
        TreeNode::new("b", vec![TreeNode::new_leaf("c")]),
    ];
    let mut container = Element::container("tree");
    render(&mut container, &nodes).unwrap();
    assert_eq!(container.outline(), "- a\n+ b\n  - c\n");
}

#[test]
fn empty_input_appends_empty_list() {
    let mut container = Element::container("tree");
    render(&mut container, &[]).unwrap();
    assert_eq!(container.to_html(), r#"<div id="tree"><ul></ul></div>"#);
}

#[test]
fn rendering_twice_appends_second_list() {
    let nodes = TreeNode::example();
    let mut container = Element::container("tree");
    render(&mut container, &nodes).unwrap();
    render(&mut container, &nodes).unwrap();
    assert_eq!(container.lists().count(), 2);
    assert_eq!(container.child(0), container.child(1));
}

#[test]
fn keeps_existing_content() {
    let mut container = Element::container("tree");
    container.append_child(Element::label("Files"));
    render(&mut container, &[TreeNode::new_leaf("a")]).unwrap();
    assert_eq!(container.children().len(), 2);
    assert_eq!(container.child(0).unwrap().text(), Some("Files"));
}

#[test]
fn duplicate_names_are_rendered() {
    let nodes = vec![TreeNode::new_leaf("same"), TreeNode::new_leaf("same")];
    let list = Renderer::new().build(&nodes).unwrap();
    assert_eq!(labels(&list), ["same", "same"]);
}

#[test]
fn depth_up_to_max_is_accepted() {
    let list = Renderer::new().max_depth(3).build(&chain(3)).unwrap();
    assert_eq!(
        list.to_html().matches("<ul>").count(),
        4,
        "top level and three nested lists"
    );
}

#[test]
fn too_deep_errors_and_keeps_container() {
    let mut container = Element::container("tree");
    let result = Renderer::new().max_depth(3).render(&mut container, &chain(4));
    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::TooDeep { max_depth: 3 }))
    ));
    assert!(container.children().is_empty());
}

#[test]
fn deep_trees_do_not_overflow_the_stack() {
    let depth = 10_000;
    let nodes = chain(depth);
    let list = Renderer::new().max_depth(depth).build(&nodes).unwrap();
    assert_eq!(list.children().len(), 1);
    // Dropping deeply nested values is recursive, leak them instead
    std::mem::forget(list);
    std::mem::forget(nodes);
}
