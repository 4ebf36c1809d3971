//! Parser wrapper

use std::ops::Range;

use crate::{Language, TreeError};

/// Tree-sitter parser wrapper
pub struct Parser {
    inner: tree_sitter::Parser,
    language: Language,
}

impl Parser {
    /// Create a new parser for language
    pub fn new(language: Language) -> Result<Self, TreeError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.ts_language())
            .map_err(|e| TreeError::Language(e.to_string()))?;

        Ok(Self { inner, language })
    }

    /// Parse source code
    pub fn parse(&mut self, source: &str) -> Result<Tree, TreeError> {
        let inner = self
            .inner
            .parse(source, None)
            .ok_or(TreeError::ParseFailed(self.language))?;

        Ok(Tree { inner, language: self.language })
    }

    /// Get language
    pub fn language(&self) -> Language {
        self.language
    }
}

/// Syntax tree
#[derive(Debug)]
pub struct Tree {
    inner: tree_sitter::Tree,
    language: Language,
}

impl Tree {
    /// Get root node
    pub fn root_node(&self) -> Node<'_> {
        Node { inner: self.inner.root_node() }
    }

    /// Walk the tree
    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor { inner: self.inner.walk() }
    }

    /// Language the tree was parsed with
    pub fn language(&self) -> Language {
        self.language
    }
}

/// Syntax node
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Node<'a> {
    pub(crate) inner: tree_sitter::Node<'a>,
}

impl<'a> Node<'a> {
    /// Get node kind (type)
    pub fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    /// Is this a named node?
    pub fn is_named(&self) -> bool {
        self.inner.is_named()
    }

    /// Is this an error node?
    pub fn is_error(&self) -> bool {
        self.inner.is_error()
    }

    /// Is this a missing node?
    pub fn is_missing(&self) -> bool {
        self.inner.is_missing()
    }

    /// Does this node or any descendant contain an error?
    pub fn has_error(&self) -> bool {
        self.inner.has_error()
    }

    /// Get start byte offset
    pub fn start_byte(&self) -> usize {
        self.inner.start_byte()
    }

    /// Get end byte offset
    pub fn end_byte(&self) -> usize {
        self.inner.end_byte()
    }

    /// Byte range covered by the node
    pub fn byte_range(&self) -> Range<usize> {
        self.start_byte()..self.end_byte()
    }

    /// Get start position (row, column)
    pub fn start_position(&self) -> Position {
        let p = self.inner.start_position();
        Position { row: p.row, column: p.column }
    }

    /// Get end position (row, column)
    pub fn end_position(&self) -> Position {
        let p = self.inner.end_position();
        Position { row: p.row, column: p.column }
    }

    /// Get parent node
    pub fn parent(&self) -> Option<Node<'a>> {
        self.inner.parent().map(|n| Node { inner: n })
    }

    /// Get child count
    pub fn child_count(&self) -> usize {
        self.inner.child_count() as usize
    }

    /// Get child by index
    pub fn child(&self, index: usize) -> Option<Node<'a>> {
        self.inner.child(index as _).map(|n| Node { inner: n })
    }

    /// Get named child by index
    pub fn named_child(&self, index: usize) -> Option<Node<'a>> {
        self.inner.named_child(index as _).map(|n| Node { inner: n })
    }

    /// Get child by field name
    pub fn child_by_field_name(&self, field: &str) -> Option<Node<'a>> {
        self.inner.child_by_field_name(field).map(|n| Node { inner: n })
    }

    /// All children, anonymous tokens included
    pub fn children(&self) -> Vec<Node<'a>> {
        let mut cursor = self.inner.walk();
        self.inner
            .children(&mut cursor)
            .map(|inner| Node { inner })
            .collect()
    }

    /// Named children only
    pub fn named_children(&self) -> Vec<Node<'a>> {
        let mut cursor = self.inner.walk();
        self.inner
            .named_children(&mut cursor)
            .map(|inner| Node { inner })
            .collect()
    }

    /// Is this node a leaf token?
    pub fn is_leaf(&self) -> bool {
        self.child_count() == 0
    }

    /// Leaf token covering the character at `offset`.
    ///
    /// A node covers `offset` when `start <= offset < end`, so a caret sitting
    /// between two tokens resolves to the token on its right.
    pub fn leaf_at(&self, offset: usize) -> Option<Node<'a>> {
        if offset < self.start_byte() || offset >= self.end_byte() {
            return None;
        }

        let mut node = *self;
        loop {
            let next = node
                .children()
                .into_iter()
                .find(|child| child.start_byte() <= offset && offset < child.end_byte());

            match next {
                Some(child) => node = child,
                None => break,
            }
        }

        node.is_leaf().then_some(node)
    }

    /// Nearest strict ancestor whose kind is one of `kinds`
    pub fn ancestor_of_kind(&self, kinds: &[&str]) -> Option<Node<'a>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if kinds.contains(&node.kind()) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// First descendant (pre-order, self included) matching `predicate`
    pub fn find_descendant(&self, predicate: impl Fn(&Node<'a>) -> bool) -> Option<Node<'a>> {
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            if predicate(&node) {
                return Some(node);
            }
            // Reverse so the leftmost child is visited first
            stack.extend(node.children().into_iter().rev());
        }
        None
    }

    /// All descendants (pre-order, self included) of the given kind
    pub fn descendants_of_kind(&self, kind: &str) -> Vec<Node<'a>> {
        let mut found = Vec::new();
        let mut stack = vec![*self];
        while let Some(node) = stack.pop() {
            if node.kind() == kind {
                found.push(node);
            }
            stack.extend(node.children().into_iter().rev());
        }
        found
    }

    /// Get node text
    pub fn text<'b>(&self, source: &'b str) -> &'b str {
        &source[self.start_byte()..self.end_byte()]
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("start", &self.start_byte())
            .field("end", &self.end_byte())
            .finish()
    }
}

/// Tree cursor for traversal
pub struct TreeCursor<'a> {
    inner: tree_sitter::TreeCursor<'a>,
}

impl<'a> TreeCursor<'a> {
    /// Get current node
    pub fn node(&self) -> Node<'a> {
        Node { inner: self.inner.node() }
    }

    /// Go to first child
    pub fn goto_first_child(&mut self) -> bool {
        self.inner.goto_first_child()
    }

    /// Go to next sibling
    pub fn goto_next_sibling(&mut self) -> bool {
        self.inner.goto_next_sibling()
    }

    /// Go to parent
    pub fn goto_parent(&mut self) -> bool {
        self.inner.goto_parent()
    }
}

/// Position in source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}
