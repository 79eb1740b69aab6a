#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]

/*!
Render the file tree of an EDFS web service and upload files to it.

The file listing ([`FileListing`] of [`TreeNode`]s) is rendered by the [`Renderer`] into nested lists appended to a container [`Element`].
A rendered container can be written as HTML, as a plain text outline or shown in a terminal with the [`Tree`] widget.
The user interaction state of the widget (like the current selection) is stored in the [`TreeState`].

With the `client` feature the [`Client`] talks to the service: it fetches the listing, downloads single files and uploads files.
*/

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Scrollbar, ScrollbarState, StatefulWidget, Widget};
use unicode_width::UnicodeWidthStr;

#[cfg(feature = "client")]
mod client;
mod config;
mod document;
mod error;
mod flatten;
mod remote_path;
mod render;
mod tree_node;
mod tree_state;

#[cfg(feature = "client")]
pub use crate::client::{Client, Upload, UploadResponse};
pub use crate::config::Config;
pub use crate::document::{Element, ElementKind, PARENT_CLASS};
pub use crate::error::{Error, ValidationError};
pub use crate::flatten::{flatten, Flattened};
pub use crate::remote_path::RemotePath;
pub use crate::render::{render, Renderer, DEFAULT_MAX_DEPTH};
pub use crate::tree_node::{FileListing, TreeNode};
pub use crate::tree_state::TreeState;

/// A rendered file tree which can be drawn in a terminal.
///
/// Shows the items of every list inside the container element, parents with an open or closed symbol.
///
/// # Example
///
/// ```
/// # use edfs_tree::{render, Element, Tree, TreeNode, TreeState};
/// # use ratatui::backend::TestBackend;
/// # use ratatui::Terminal;
/// # use ratatui::widgets::Block;
/// # let mut terminal = Terminal::new(TestBackend::new(32, 32)).unwrap();
/// let mut container = Element::container("tree");
/// render(&mut container, &[TreeNode::new_leaf("notes.txt")]).unwrap();
/// let mut state = TreeState::default();
///
/// terminal.draw(|frame| {
///     let area = frame.size();
///
///     let tree_widget = Tree::new(&container)
///         .block(Block::bordered().title("Files"));
///
///     frame.render_stateful_widget(tree_widget, area, &mut state);
/// })?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Tree<'a> {
    container: &'a Element,

    block: Option<Block<'a>>,
    scrollbar: Option<Scrollbar<'a>>,
    /// Style used as a base style for the widget
    style: Style,

    /// Style used to render selected item
    highlight_style: Style,
    /// Symbol in front of the selected item (Shift all items to the right)
    highlight_symbol: &'a str,

    /// Symbol displayed in front of a closed parent (As in the children are currently not visible)
    node_closed_symbol: &'a str,
    /// Symbol displayed in front of an open parent. (As in the children are currently visible)
    node_open_symbol: &'a str,
    /// Symbol displayed in front of a leaf.
    node_no_children_symbol: &'a str,
}

impl<'a> Tree<'a> {
    #[must_use]
    pub const fn new(container: &'a Element) -> Self {
        Self {
            container,
            block: None,
            scrollbar: None,
            style: Style::new(),
            highlight_style: Style::new(),
            highlight_symbol: "",
            node_closed_symbol: "\u{25b6} ", // Arrow to right
            node_open_symbol: "\u{25bc} ",   // Arrow down
            node_no_children_symbol: "  ",
        }
    }

    #[allow(clippy::missing_const_for_fn)]
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Show the scrollbar when rendering this widget.
    ///
    /// Experimental: Can change on any release without any additional notice.
    #[must_use]
    pub const fn experimental_scrollbar(mut self, scrollbar: Option<Scrollbar<'a>>) -> Self {
        self.scrollbar = scrollbar;
        self
    }

    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub const fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    #[must_use]
    pub const fn highlight_symbol(mut self, highlight_symbol: &'a str) -> Self {
        self.highlight_symbol = highlight_symbol;
        self
    }

    #[must_use]
    pub const fn node_closed_symbol(mut self, symbol: &'a str) -> Self {
        self.node_closed_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn node_open_symbol(mut self, symbol: &'a str) -> Self {
        self.node_open_symbol = symbol;
        self
    }

    #[must_use]
    pub const fn node_no_children_symbol(mut self, symbol: &'a str) -> Self {
        self.node_no_children_symbol = symbol;
        self
    }
}

impl<'a> StatefulWidget for Tree<'a> {
    type State = TreeState;

    fn render(self, full_area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        buf.set_style(full_area, self.style);

        // Get the inner area inside a possible block, otherwise use the full area
        let area = self.block.map_or(full_area, |block| {
            let inner_area = block.inner(full_area);
            block.render(full_area, buf);
            inner_area
        });

        if area.width < 1 || area.height < 1 {
            return;
        }

        let visible = state.flatten(self.container);
        if visible.is_empty() {
            return;
        }
        // Every item is a single line label
        let available_height = area.height as usize;

        let ensure_index_in_view =
            if state.ensure_selected_in_view_on_next_render && !state.selected.is_empty() {
                visible
                    .iter()
                    .position(|flattened| flattened.identifier == state.selected)
            } else {
                None
            };

        // Ensure last line is still visible
        let mut start = state.offset.min(visible.len().saturating_sub(1));
        if let Some(ensure_index_in_view) = ensure_index_in_view {
            start = start.min(ensure_index_in_view);
            if ensure_index_in_view >= start + available_height {
                start = ensure_index_in_view + 1 - available_height;
            }
        }
        let end = visible.len().min(start + available_height);

        state.offset = start;
        state.ensure_selected_in_view_on_next_render = false;

        if let Some(scrollbar) = self.scrollbar {
            let mut scrollbar_state = ScrollbarState::new(visible.len().saturating_sub(end - start))
                .position(start)
                .viewport_content_length(end - start);
            let scrollbar_area = Rect {
                // Inner height to be exactly as the content
                y: area.y,
                height: area.height,
                // Outer width to stay on the right border
                x: full_area.x,
                width: full_area.width,
            };
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);
        }

        let blank_symbol = " ".repeat(self.highlight_symbol.width());
        let has_selection = !state.selected.is_empty();

        #[allow(clippy::cast_possible_truncation)]
        for (row, flattened) in visible.into_iter().skip(start).take(end - start).enumerate() {
            let x = area.x;
            let y = area.y + row as u16;
            let line_area = Rect {
                x,
                y,
                width: area.width,
                height: 1,
            };

            let is_selected = state.selected == flattened.identifier;
            let after_highlight_symbol_x = if has_selection {
                let symbol = if is_selected {
                    self.highlight_symbol
                } else {
                    &blank_symbol
                };
                let (x, _) = buf.set_stringn(x, y, symbol, area.width as usize, self.style);
                x
            } else {
                x
            };

            let after_depth_x = {
                let indent_width = flattened.depth() * 2;
                let (after_indent_x, _) = buf.set_stringn(
                    after_highlight_symbol_x,
                    y,
                    " ".repeat(indent_width),
                    indent_width,
                    self.style,
                );
                let symbol = if flattened.is_parent() {
                    if state.opened.contains(&flattened.identifier) {
                        self.node_open_symbol
                    } else {
                        self.node_closed_symbol
                    }
                } else {
                    self.node_no_children_symbol
                };
                let max_width = area.width.saturating_sub(after_indent_x - x);
                let (x, _) =
                    buf.set_stringn(after_indent_x, y, symbol, max_width as usize, self.style);
                x
            };

            let max_label_width = area.width.saturating_sub(after_depth_x - x);
            buf.set_stringn(
                after_depth_x,
                y,
                flattened.label(),
                max_label_width as usize,
                self.style,
            );
            if is_selected {
                buf.set_style(line_area, self.highlight_style);
            }
        }
    }
}

impl<'a> Widget for Tree<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut state = TreeState::default();
        StatefulWidget::render(self, area, buf, &mut state);
    }
}

#[cfg(test)]
fn draw(state: &mut TreeState, width: u16, height: u16) -> Buffer {
    let container = crate::flatten::example_container();
    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    StatefulWidget::render(
        Tree::new(&container).highlight_symbol(">> "),
        area,
        &mut buffer,
        state,
    );
    buffer
}

#[test]
fn draws_top_level_with_closed_parent() {
    let buffer = draw(&mut TreeState::default(), 8, 4);
    assert_eq!(
        buffer,
        Buffer::with_lines(vec![
            "  a     ",
            "\u{25b6} b     ",
            "  h     ",
            "        ",
        ])
    );
}

#[test]
fn draws_open_parent_and_selection() {
    let mut state = TreeState::default();
    state.open(vec![1]);
    state.select(vec![1, 0]);
    let buffer = draw(&mut state, 10, 6);
    assert_eq!(
        buffer,
        Buffer::with_lines(vec![
            "     a    ",
            "   \u{25bc} b    ",
            ">>     c  ",
            "     \u{25b6} d  ",
            "       g  ",
            "     h    ",
        ])
    );
}

#[test]
fn scrolls_selection_into_view() {
    let mut state = TreeState::default();
    state.open_all(&crate::flatten::example_container());
    state.select(vec![2]);
    draw(&mut state, 12, 3);
    assert_eq!(state.get_offset(), 5);
}
