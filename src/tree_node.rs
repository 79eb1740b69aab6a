use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::error::{Error, ValidationError};
use crate::render::DEFAULT_MAX_DEPTH;

/// One entry of the hierarchical file listing.
///
/// A node with children is a directory-like parent, one without is a leaf.
/// Names are neither required to be unique nor sorted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    #[must_use]
    pub fn new_leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn new(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    #[must_use]
    pub fn is_parent(&self) -> bool {
        !self.children.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn example() -> Vec<Self> {
        vec![
            Self::new_leaf("a"),
            Self::new(
                "b",
                vec![
                    Self::new_leaf("c"),
                    Self::new("d", vec![Self::new_leaf("e"), Self::new_leaf("f")]),
                    Self::new_leaf("g"),
                ],
            ),
            Self::new_leaf("h"),
        ]
    }
}

/// The document served by `GET /files`.
///
/// The service returns its namespace root as a node, only the `children` are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileListing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub children: Vec<TreeNode>,
}

impl FileListing {
    /// Decode a listing from its JSON text, accepting nodes up to [`DEFAULT_MAX_DEPTH`].
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] when the text is not JSON,
    /// [`Error::Validation`] when it is JSON but a node misses `name` or `children` or is nested too deep.
    pub fn from_json(json: impl AsRef<str>) -> Result<Self, Error> {
        Self::from_slice(json.as_ref().as_bytes())
    }

    /// Same as [`from_json`](Self::from_json) for raw response bytes.
    ///
    /// # Errors
    ///
    /// See [`from_json`](Self::from_json).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_slice_bounded(bytes, DEFAULT_MAX_DEPTH)
    }

    /// Decode a listing whose nodes are nested at most `max_depth` deep, top level nodes having depth 0.
    ///
    /// This is the same bound the [`Renderer`](crate::Renderer) applies.
    /// Deeper input is rejected before any node is built.
    ///
    /// # Errors
    ///
    /// See [`from_json`](Self::from_json).
    pub fn from_slice_bounded(bytes: &[u8], max_depth: usize) -> Result<Self, Error> {
        // Listing object and its array, then one object and one array per node level
        let max_nesting = max_depth.saturating_mul(2).saturating_add(4);
        if nesting_exceeds(bytes, max_nesting) {
            return Err(ValidationError::TooDeep { max_depth }.into());
        }

        let mut deserializer = serde_json::Deserializer::from_slice(bytes);
        deserializer.disable_recursion_limit();
        let listing = Self::deserialize(&mut deserializer).map_err(classify)?;
        deserializer.end().map_err(classify)?;
        Ok(listing)
    }
}

/// Whether objects and arrays in `bytes` are nested deeper than `max_nesting`.
///
/// Brackets inside strings are skipped, everything else is left to the parser.
fn nesting_exceeds(bytes: &[u8], max_nesting: usize) -> bool {
    let mut nesting = 0_usize;
    let mut in_string = false;
    let mut escaped = false;
    for &byte in bytes {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                nesting += 1;
                if nesting > max_nesting {
                    return true;
                }
            }
            b'}' | b']' => nesting = nesting.saturating_sub(1),
            _ => {}
        }
    }
    false
}

/// Syntax problems are decode errors, well formed JSON of the wrong shape is a validation error.
fn classify(error: serde_json::Error) -> Error {
    match error.classify() {
        Category::Data => Error::Validation(ValidationError::Shape(error.to_string())),
        Category::Io | Category::Syntax | Category::Eof => Error::Decode(error),
    }
}

#[test]
fn decodes_listing() {
    let listing = FileListing::from_json(
        r#"{"name": "/", "children": [
            {"name": "a", "children": []},
            {"name": "b", "children": [{"name": "c", "children": []}]}
        ]}"#,
    )
    .unwrap();
    assert_eq!(listing.name.as_deref(), Some("/"));
    assert_eq!(
        listing.children,
        [
            TreeNode::new_leaf("a"),
            TreeNode::new("b", vec![TreeNode::new_leaf("c")]),
        ]
    );
}

#[test]
fn root_name_is_optional() {
    let listing = FileListing::from_json(r#"{"children": []}"#).unwrap();
    assert_eq!(listing.name, None);
    assert!(listing.children.is_empty());
}

#[test]
fn missing_children_is_validation_error() {
    let result = FileListing::from_json(r#"{"children": [{"name": "a"}]}"#);
    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::Shape(message))) if message.contains("children")
    ));
}

#[test]
fn missing_name_is_validation_error() {
    let result = FileListing::from_slice(br#"{"children": [{"children": []}]}"#);
    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::Shape(message))) if message.contains("name")
    ));
}

#[test]
fn broken_json_is_decode_error() {
    let result = FileListing::from_json(r#"{"children": [{"name": "a", "#);
    assert!(matches!(result, Err(Error::Decode(_))));
}

#[test]
fn parent_depends_on_children() {
    let nodes = TreeNode::example();
    assert!(!nodes[0].is_parent());
    assert!(nodes[1].is_parent());
}

/// A listing with a single leaf at `depth`.
#[cfg(test)]
fn nested_listing(depth: usize) -> String {
    let mut json = r#"{"name": "/", "children": ["#.to_owned();
    for level in 0..depth {
        json += &format!(r#"{{"name": "level {level}", "children": ["#);
    }
    json += r#"{"name": "leaf", "children": []}"#;
    json += &"]}".repeat(depth + 1);
    json
}

#[test]
fn decodes_listing_at_default_max_depth() {
    let listing = FileListing::from_json(nested_listing(DEFAULT_MAX_DEPTH)).unwrap();

    let mut depth = 0;
    let mut node = &listing.children[0];
    while let Some(child) = node.children.first() {
        depth += 1;
        node = child;
    }
    assert_eq!(depth, DEFAULT_MAX_DEPTH);
    assert_eq!(node.name, "leaf");

    let mut container = crate::Element::container("tree");
    crate::render(&mut container, &listing.children).unwrap();
}

#[test]
fn deeper_listing_is_too_deep() {
    for depth in [DEFAULT_MAX_DEPTH + 1, 100, 10_000] {
        let result = FileListing::from_json(nested_listing(depth));
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::TooDeep {
                max_depth: DEFAULT_MAX_DEPTH
            }))
        ));
    }
}

#[test]
fn bounded_decoding_matches_renderer_depth() {
    let json = nested_listing(2);
    assert!(FileListing::from_slice_bounded(json.as_bytes(), 2).is_ok());
    assert!(matches!(
        FileListing::from_slice_bounded(json.as_bytes(), 1),
        Err(Error::Validation(ValidationError::TooDeep { max_depth: 1 }))
    ));

    let listing = FileListing::from_slice_bounded(json.as_bytes(), 2).unwrap();
    let mut container = crate::Element::container("tree");
    let renderer = crate::Renderer::new();
    assert!(renderer.max_depth(2).render(&mut container, &listing.children).is_ok());
    assert!(renderer.max_depth(1).render(&mut container, &listing.children).is_err());
}

#[test]
fn brackets_in_names_do_not_count_as_nesting() {
    let json = r#"{"children": [{"name": "[[[{{\"]]", "children": []}]}"#;
    let listing = FileListing::from_slice_bounded(json.as_bytes(), 0).unwrap();
    assert_eq!(listing.children[0].name, r#"[[[{{"]]"#);
}

#[test]
fn trailing_garbage_is_decode_error() {
    let result = FileListing::from_json(r#"{"children": []} ]"#);
    assert!(matches!(result, Err(Error::Decode(_))));
}

#[test]
fn listing_serializes_back_to_json() {
    let listing = FileListing {
        name: None,
        children: vec![TreeNode::new("b", vec![TreeNode::new_leaf("c \"quoted\"")])],
    };
    let json = serde_json::to_string(&listing).unwrap();
    assert_eq!(
        json,
        r#"{"children":[{"name":"b","children":[{"name":"c \"quoted\"","children":[]}]}]}"#
    );
    assert_eq!(FileListing::from_json(json).unwrap(), listing);
}
