//! # Foxkit Treesitter
//!
//! Syntax tree parsing for JavaScript, JSX and TSX sources using tree-sitter.
//!
//! ## Features
//!
//! - Per-language parser cache
//! - Thin `Node` wrapper with parent/child/field navigation
//! - Caret-to-token lookup (`Node::leaf_at`)
//! - Syntax error collection
//!
//! ```no_run
//! use treesitter::{Language, TreeSitterService};
//!
//! let service = TreeSitterService::new();
//! let tree = service.parse(Language::JavaScript, "<div />;").unwrap();
//! assert!(treesitter::find_errors(&tree).is_empty());
//! ```

pub mod language;
pub mod parser;

use std::collections::HashMap;
use parking_lot::Mutex;

pub use language::Language;
pub use parser::{Node, Parser, Position, Tree, TreeCursor};

/// Tree-sitter errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
    #[error("Incompatible grammar: {0}")]
    Language(String),
    #[error("Failed to parse {0:?} source")]
    ParseFailed(Language),
}

/// Tree-sitter service
pub struct TreeSitterService {
    /// Cached parsers per language
    parsers: Mutex<HashMap<Language, Parser>>,
}

impl TreeSitterService {
    pub fn new() -> Self {
        Self {
            parsers: Mutex::new(HashMap::new()),
        }
    }

    /// Parse source code
    pub fn parse(&self, language: Language, source: &str) -> Result<Tree, TreeError> {
        let mut parsers = self.parsers.lock();

        let parser = match parsers.entry(language) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                tracing::debug!("Creating parser for {}", language.id());
                entry.insert(Parser::new(language)?)
            }
        };

        parser.parse(source)
    }

    /// Parse source code for a language ID (`"typescriptreact"`, `"jsx"`, ...)
    pub fn parse_id(&self, language_id: &str, source: &str) -> Result<Tree, TreeError> {
        let language = Language::from_id(language_id)
            .ok_or_else(|| TreeError::UnknownLanguage(language_id.to_string()))?;
        self.parse(language, source)
    }
}

impl Default for TreeSitterService {
    fn default() -> Self {
        Self::new()
    }
}

/// Syntax error
#[derive(Debug, Clone)]
pub struct SyntaxError {
    /// Error message
    pub message: String,
    /// Start byte offset
    pub start: usize,
    /// End byte offset
    pub end: usize,
    /// Line number
    pub line: usize,
    /// Column number
    pub column: usize,
}

/// Find all syntax errors in tree
pub fn find_errors(tree: &Tree) -> Vec<SyntaxError> {
    let mut errors = Vec::new();
    let mut cursor = tree.walk();

    loop {
        let node = cursor.node();

        if node.is_error() || node.is_missing() {
            let start_pos = node.start_position();

            let message = if node.is_missing() {
                format!("Missing {}", node.kind())
            } else {
                "Syntax error".to_string()
            };

            errors.push(SyntaxError {
                message,
                start: node.start_byte(),
                end: node.end_byte(),
                line: start_pos.row,
                column: start_pos.column,
            });
        }

        // Traverse tree
        if cursor.goto_first_child() {
            continue;
        }

        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return errors;
            }
        }
    }
}

/// Get node text
pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}
