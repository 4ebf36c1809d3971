//! Top-level scan: existing styling import, import placement, bindings

use std::collections::HashSet;

use treesitter::{Node, Tree};

/// An existing import of the styling library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledImport {
    /// Module specifier without quotes
    pub source: String,
    /// Locally bound identifier used as the call head
    pub local_name: String,
}

/// Where a synthesized import goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportPlacement {
    pub offset: usize,
    /// The statement right after the import is itself an import
    pub before_import: bool,
    /// Line ending of the file
    pub line_ending: &'static str,
}

impl ImportPlacement {
    /// Text between the inserted import and the statement after it
    pub fn separator(&self) -> String {
        if self.before_import {
            self.line_ending.to_string()
        } else {
            self.line_ending.repeat(2)
        }
    }
}

/// Line ending used by `source`: `\r\n` when its first line ends that way
pub fn line_ending(source: &str) -> &'static str {
    match source.find('\n') {
        Some(i) if source[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Named exports of styling libraries that are not the styled factory
const NON_FACTORY_EXPORTS: &[&str] = &[
    "css",
    "keyframes",
    "createGlobalStyle",
    "ThemeProvider",
    "ThemeContext",
    "ThemeConsumer",
    "useTheme",
    "withTheme",
    "ServerStyleSheet",
    "StyleSheetManager",
    "isStyledComponent",
];

/// Find a value import of `library`.
///
/// The default import wins, then a named `default` or `styled` specifier,
/// then the first named specifier that is not a helper such as `css`, then a
/// namespace import. Type-only and
/// side-effect imports bind nothing usable and are skipped.
pub fn find_styled_import(tree: &Tree, source: &str, library: &str) -> Option<StyledImport> {
    tree.root_node()
        .named_children()
        .into_iter()
        .filter(|node| node.kind() == "import_statement")
        .filter(|node| !is_type_only(node))
        .filter(|node| {
            node.child_by_field_name("source")
                .is_some_and(|s| unquote(s.text(source)) == library)
        })
        .find_map(|node| {
            let clause = node.children().into_iter().find(|c| c.kind() == "import_clause")?;
            let local_name = clause_binding(clause, source)?;
            Some(StyledImport {
                source: library.to_string(),
                local_name,
            })
        })
}

fn clause_binding(clause: Node<'_>, source: &str) -> Option<String> {
    let parts = clause.named_children();

    if let Some(default) = parts.iter().find(|n| n.kind() == "identifier") {
        return Some(default.text(source).to_string());
    }

    if let Some(named) = parts.iter().find(|n| n.kind() == "named_imports") {
        let specifiers: Vec<(String, String)> = named
            .named_children()
            .into_iter()
            .filter(|n| n.kind() == "import_specifier")
            .filter_map(|spec| {
                let imported = spec.child_by_field_name("name")?.text(source).to_string();
                let local = spec
                    .child_by_field_name("alias")
                    .map(|alias| alias.text(source).to_string())
                    .unwrap_or_else(|| imported.clone());
                Some((imported, local))
            })
            .collect();

        let preferred = specifiers
            .iter()
            .find(|(imported, _)| imported == "default")
            .or_else(|| specifiers.iter().find(|(imported, _)| imported == "styled"))
            .or_else(|| specifiers.iter().find(|(imported, _)| !NON_FACTORY_EXPORTS.contains(&imported.as_str())));
        if let Some((_, local)) = preferred {
            return Some(local.clone());
        }
    }

    parts
        .iter()
        .find(|n| n.kind() == "namespace_import")
        .and_then(|ns| ns.named_children().into_iter().find(|n| n.kind() == "identifier"))
        .map(|ident| ident.text(source).to_string())
}

/// `import type ... from` in TypeScript
fn is_type_only(import: &Node<'_>) -> bool {
    import.child(1).is_some_and(|token| token.kind() == "type")
}

fn unquote(literal: &str) -> &str {
    literal.trim_matches(|c| c == '"' || c == '\'')
}

/// Insertion point for a new import: before the first top-level statement,
/// after a hashbang line and any directive prologue
pub fn import_placement(tree: &Tree, source: &str) -> ImportPlacement {
    let line_ending = line_ending(source);
    let children = tree.root_node().children();
    let first = children
        .iter()
        .find(|node| !is_hashbang(node) && !is_directive(node, source));

    match first {
        Some(node) => ImportPlacement {
            offset: node.start_byte(),
            before_import: node.kind() == "import_statement",
            line_ending,
        },
        None => ImportPlacement {
            offset: children.last().map_or(0, |node| line_end(source, node.end_byte())),
            before_import: false,
            line_ending,
        },
    }
}

fn is_hashbang(node: &Node<'_>) -> bool {
    node.kind() == "hash_bang_line"
}

fn is_directive(node: &Node<'_>, source: &str) -> bool {
    if node.kind() != "expression_statement" {
        return false;
    }
    let Some(expr) = node.named_child(0) else {
        return false;
    };
    expr.kind() == "string" && {
        let text = node.text(source).trim_end_matches(';').trim_end();
        text.len() == expr.text(source).len()
    }
}

/// Offset just past the line containing `offset`
fn line_end(source: &str, offset: usize) -> usize {
    source[offset..]
        .find('\n')
        .map_or(source.len(), |i| offset + i + 1)
}

/// Separator before a declaration appended at the end of `source`
pub fn append_separator(source: &str) -> String {
    let eol = line_ending(source);
    if source.is_empty() || source.ends_with(&eol.repeat(2)) {
        String::new()
    } else if source.ends_with(eol) {
        eol.to_string()
    } else {
        eol.repeat(2)
    }
}

/// Names bound at the top level of the file
pub fn top_level_bindings(tree: &Tree, source: &str) -> HashSet<String> {
    let mut names = HashSet::new();

    for node in tree.root_node().named_children() {
        let node = match node.kind() {
            "export_statement" => match node.child_by_field_name("declaration") {
                Some(declaration) => declaration,
                None => continue,
            },
            _ => node,
        };

        match node.kind() {
            "lexical_declaration" | "variable_declaration" => {
                for declarator in node.named_children() {
                    if let Some(name) = declarator.child_by_field_name("name") {
                        if name.kind() == "identifier" {
                            names.insert(name.text(source).to_string());
                        }
                    }
                }
            }
            "function_declaration" | "generator_function_declaration" | "class_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    names.insert(name.text(source).to_string());
                }
            }
            "import_statement" => {
                for ident in node.descendants_of_kind("identifier") {
                    names.insert(ident.text(source).to_string());
                }
            }
            _ => {}
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use treesitter::{Language, TreeSitterService};

    fn parse(source: &str) -> Tree {
        TreeSitterService::new().parse(Language::Tsx, source).unwrap()
    }

    fn styled_import(source: &str) -> Option<String> {
        find_styled_import(&parse(source), source, "styled-components").map(|i| i.local_name)
    }

    #[test]
    fn test_default_import() {
        let source = "import styled from \"styled-components\";\n";
        assert_eq!(styled_import(source).as_deref(), Some("styled"));

        let source = "import s, { css } from 'styled-components';\n";
        assert_eq!(styled_import(source).as_deref(), Some("s"));
    }

    #[test]
    fn test_named_imports() {
        let source = "import { x as y } from \"styled-components\";\n";
        assert_eq!(styled_import(source).as_deref(), Some("y"));

        let source = "import { css, default as sc } from \"styled-components\";\n";
        assert_eq!(styled_import(source).as_deref(), Some("sc"));

        let source = "import { css, styled } from \"styled-components\";\n";
        assert_eq!(styled_import(source).as_deref(), Some("styled"));

        let source = "import { css, keyframes, x as y } from \"styled-components\";\n";
        assert_eq!(styled_import(source).as_deref(), Some("y"));
    }

    #[test]
    fn test_namespace_import() {
        let source = "import * as sc from \"styled-components\";\n";
        assert_eq!(styled_import(source).as_deref(), Some("sc"));
    }

    #[test]
    fn test_unusable_imports_are_ignored() {
        assert_eq!(styled_import("import \"styled-components\";\n"), None);
        assert_eq!(styled_import("import { css } from \"styled-components\";\n"), None);
        assert_eq!(
            styled_import("import { createGlobalStyle, ThemeProvider } from \"styled-components\";\n"),
            None
        );
        assert_eq!(styled_import("import styled from \"@emotion/styled\";\n"), None);
        assert_eq!(
            styled_import("import type { DefaultTheme } from \"styled-components\";\n"),
            None
        );
    }

    #[test]
    fn test_placement_before_first_statement() {
        let source = "const a = <div />;\n";
        let placement = import_placement(&parse(source), source);
        assert_eq!(placement.offset, 0);
        assert_eq!(placement.separator(), "\n\n");
    }

    #[test]
    fn test_placement_before_existing_import() {
        let source = "import React from \"react\";\nconst a = <div />;\n";
        let placement = import_placement(&parse(source), source);
        assert_eq!(placement.offset, 0);
        assert_eq!(placement.separator(), "\n");
    }

    #[test]
    fn test_placement_skips_directives() {
        let source = "\"use client\";\n\nexport const A = () => <div />;\n";
        let placement = import_placement(&parse(source), source);
        assert_eq!(placement.offset, source.find("export").unwrap());

        // A string statement that is more than a bare literal is not a directive
        let source = "\"a\" + b;\nconst c = <i />;\n";
        let placement = import_placement(&parse(source), source);
        assert_eq!(placement.offset, 0);
    }

    #[test]
    fn test_append_separator() {
        assert_eq!(append_separator("a;\n"), "\n");
        assert_eq!(append_separator("a;"), "\n\n");
        assert_eq!(append_separator("a;\n\n"), "");
        assert_eq!(append_separator("a;\r\nb;\r\n"), "\r\n");
        assert_eq!(append_separator("a;\r\nb;"), "\r\n\r\n");
        assert_eq!(append_separator("a;\r\n\r\n"), "");
    }

    #[test]
    fn test_line_ending() {
        assert_eq!(line_ending("a;\r\nb;\r\n"), "\r\n");
        assert_eq!(line_ending("a;\nb;\r\n"), "\n");
        assert_eq!(line_ending("a;"), "\n");

        let source = "import React from \"react\";\r\n";
        assert_eq!(import_placement(&parse(source), source).separator(), "\r\n");
    }

    #[test]
    fn test_top_level_bindings() {
        let source = "\
import React, { useState as useS } from \"react\";
const StyledDiv = 1, other = 2;
export function App() { const inner = 3; return <div />; }
class Widget {}
";
        let names = top_level_bindings(&parse(source), source);
        for expected in ["React", "useS", "StyledDiv", "other", "App", "Widget"] {
            assert!(names.contains(expected), "missing {}", expected);
        }
        assert!(!names.contains("inner"));
    }
}
