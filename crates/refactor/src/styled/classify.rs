//! Tag lookup and classification

use std::ops::Range;

use treesitter::{Node, Tree};

/// Tag marker kinds that carry a `name` field
const TAG_MARKERS: &[&str] = &[
    "jsx_opening_element",
    "jsx_closing_element",
    "jsx_self_closing_element",
];

/// Punctuation tokens of a tag marker the caret may sit on
const BOUNDARY_TOKENS: &[&str] = &["<", "</", "/", ">", "/>"];

/// What a tag refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<>`, `<Fragment>`, `<React.Fragment>`
    Fragment,
    /// Built-in platform element such as `div`
    Intrinsic,
    /// A component value such as `MyComponent` or `motion.div`
    Custom,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Fragment => "fragment",
            TagKind::Intrinsic => "intrinsic",
            TagKind::Custom => "custom",
        }
    }
}

/// Classify a tag by its name
pub fn classify(name: &str) -> TagKind {
    if name.is_empty() || name == "Fragment" || name == "React.Fragment" {
        return TagKind::Fragment;
    }

    let lowercase = name.chars().next().is_some_and(char::is_lowercase);
    if lowercase && !name.contains('.') {
        TagKind::Intrinsic
    } else {
        TagKind::Custom
    }
}

/// A tag found in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsxTag {
    /// Range of the whole element
    pub element: Range<usize>,
    /// Tag name as written in the opening marker (empty for `<>`)
    pub name: String,
    pub kind: TagKind,
    /// Name ranges of the opening marker and, if any, the closing marker
    pub name_ranges: Vec<Range<usize>>,
}

impl JsxTag {
    /// Can this tag be extracted?
    pub fn is_extractable(&self) -> bool {
        self.kind != TagKind::Fragment
    }

    pub fn is_self_closing(&self) -> bool {
        self.name_ranges.len() == 1
    }
}

/// Tag whose boundary or name token is at `offset` or just before it
pub fn find_tag_at(tree: &Tree, source: &str, offset: usize) -> Option<JsxTag> {
    let root = tree.root_node();

    let marker = tag_marker_at(root, offset)
        .or_else(|| offset.checked_sub(1).and_then(|prev| tag_marker_at(root, prev)))?;

    let element = match marker.kind() {
        "jsx_self_closing_element" => marker,
        _ => marker.parent().filter(|p| p.kind() == "jsx_element")?,
    };

    let markers: Vec<Node<'_>> = if element.kind() == "jsx_element" {
        element
            .children()
            .into_iter()
            .filter(|child| matches!(child.kind(), "jsx_opening_element" | "jsx_closing_element"))
            .collect()
    } else {
        vec![element]
    };

    let name = markers
        .first()
        .and_then(|m| m.child_by_field_name("name"))
        .map(|n| n.text(source).to_string())
        .unwrap_or_default();

    let name_ranges = markers
        .iter()
        .filter_map(|m| m.child_by_field_name("name"))
        .map(|n| n.byte_range())
        .collect();

    let tag = JsxTag {
        element: element.byte_range(),
        kind: classify(&name),
        name,
        name_ranges,
    };
    tracing::trace!("Tag at {}: {:?}", offset, tag);
    Some(tag)
}

/// Tag marker owning the token at `offset`, if that token is a boundary
/// token of the marker or part of its name
fn tag_marker_at<'a>(root: Node<'a>, offset: usize) -> Option<Node<'a>> {
    let leaf = root.leaf_at(offset)?;
    let marker = leaf.ancestor_of_kind(TAG_MARKERS)?;

    if leaf.parent() == Some(marker) && BOUNDARY_TOKENS.contains(&leaf.kind()) {
        return Some(marker);
    }

    let name = marker.child_by_field_name("name")?;
    let inside = name.start_byte() <= leaf.start_byte() && leaf.end_byte() <= name.end_byte();
    inside.then_some(marker)
}
