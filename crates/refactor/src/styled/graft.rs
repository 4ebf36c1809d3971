//! Tree grafting
//!
//! The synthesized text is parsed in a scratch tree of the target file's
//! language. Every node the splice needs is located there first; the real
//! buffer is only touched once all of them were found.

use std::ops::Range;

use buffer::{Buffer, BufferError, Edit};
use treesitter::{Language, Node, TreeSitterService};

use super::classify::JsxTag;
use super::import::{self, ImportPlacement};
use super::synthesize::SynthesizedDeclaration;
use crate::ExtractError;

/// Nodes taken from the scratch tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchGraft {
    /// Import statement text, when one was synthesized
    pub import: Option<String>,
    /// Declaration statement text
    pub declaration: String,
    /// Identifier range inside `declaration`
    pub name_in_declaration: Range<usize>,
    /// Placeholder line range inside `declaration` (empty for an empty body)
    pub placeholder_in_declaration: Range<usize>,
    /// Tag-name token replacing the original tag name
    pub name_token: String,
}

impl ScratchGraft {
    /// Parse the scratch program and locate every graft anchor
    pub fn parse(
        trees: &TreeSitterService,
        language: Language,
        synthesized: &SynthesizedDeclaration,
    ) -> Result<Self, ExtractError> {
        let scratch = synthesized.scratch.as_str();
        let tree = trees.parse(language, scratch)?;
        let errors = treesitter::find_errors(&tree);
        if !errors.is_empty() {
            tracing::debug!("Scratch program does not parse: {:?}", errors);
            return Err(ExtractError::MissingAnchor("well-formed declaration"));
        }

        let statements = tree.root_node().named_children();

        let import = if synthesized.has_import() {
            let node = statements
                .iter()
                .find(|n| n.kind() == "import_statement")
                .ok_or(ExtractError::MissingAnchor("import statement"))?;
            Some(node.text(scratch).to_string())
        } else {
            None
        };

        let (declaration, declarator) = statements
            .iter()
            .filter(|n| n.kind() == "lexical_declaration")
            .find_map(|decl| {
                let declarator = decl.named_children().into_iter().find(|d| {
                    d.kind() == "variable_declarator"
                        && d.child_by_field_name("name")
                            .is_some_and(|name| name.text(scratch) == synthesized.name)
                })?;
                Some((*decl, declarator))
            })
            .ok_or(ExtractError::MissingAnchor("declaration"))?;

        let name = declarator
            .child_by_field_name("name")
            .ok_or(ExtractError::MissingAnchor("declaration identifier"))?;
        let template = declarator
            .child_by_field_name("value")
            .and_then(|value| value.find_descendant(|n| n.kind() == "template_string"))
            .ok_or(ExtractError::MissingAnchor("template literal"))?;

        let base = declaration.start_byte();
        let placeholder = placeholder_range(template, scratch)
            .ok_or(ExtractError::MissingAnchor("template body"))?;

        let name_token = statements
            .iter()
            .filter(|n| n.kind() == "expression_statement")
            .find_map(|stmt| stmt.find_descendant(|n| n.kind() == "jsx_self_closing_element"))
            .and_then(|probe| probe.child_by_field_name("name"))
            .ok_or(ExtractError::MissingAnchor("tag name token"))?;

        Ok(Self {
            import,
            declaration: declaration.text(scratch).to_string(),
            name_in_declaration: name.start_byte() - base..name.end_byte() - base,
            placeholder_in_declaration: placeholder.start - base..placeholder.end - base,
            name_token: name_token.text(scratch).to_string(),
        })
    }
}

/// The placeholder line of a template literal: after the first line break
/// and its indentation, up to the next line break
fn placeholder_range(template: Node<'_>, source: &str) -> Option<Range<usize>> {
    let text = template.text(source);
    let line = text.find('\n')? + 1;
    let indent = text[line..]
        .find(|c: char| c != ' ' && c != '\t')
        .map_or(text.len() - line, |i| i);
    let start = line + indent;
    let end = start + text[start..].find('\n')?;
    let base = template.start_byte();
    Some(base + start..base + end)
}

/// `text` with every line break written as `eol`
fn with_line_ending(text: &str, eol: &str) -> String {
    if eol == "\n" {
        text.to_string()
    } else {
        text.replace('\n', eol)
    }
}

/// Edits grafting the scratch nodes into the real file.
///
/// Computed from a snapshot without touching the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplicePlan {
    import: Option<Edit>,
    renames: Vec<Edit>,
    declaration: Edit,
    /// Identifier range inside the declaration edit's text
    declaration_name: Range<usize>,
    /// Placeholder range inside the declaration edit's text
    placeholder: Range<usize>,
}

/// Where the grafted pieces ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraftResult {
    /// The inserted import, separator included
    pub import: Option<Range<usize>>,
    /// Renamed tag-name tokens, opening tag first
    pub tag_names: Vec<Range<usize>>,
    /// The appended declaration, separators included
    pub declaration: Range<usize>,
    pub declaration_name: Range<usize>,
    pub placeholder: Range<usize>,
}

impl SplicePlan {
    pub fn new(tag: &JsxTag, graft: &ScratchGraft, placement: Option<ImportPlacement>, source: &str) -> Self {
        let import = graft
            .import
            .as_ref()
            .zip(placement)
            .map(|(text, placement)| {
                Edit::insert(
                    placement.offset,
                    format!("{}{}", with_line_ending(text, placement.line_ending), placement.separator()),
                )
            });

        let renames = tag
            .name_ranges
            .iter()
            .map(|range| Edit::replace(range.clone(), graft.name_token.as_str()))
            .collect();

        let eol = import::line_ending(source);
        let separator = import::append_separator(source);
        let text = with_line_ending(&graft.declaration, eol);
        let declaration = Edit::insert(source.len(), format!("{}{}{}", separator, text, eol));

        // Offsets into the scratch text move by one per line break before them
        let at = |relative: &Range<usize>| {
            let shift = |offset: usize| {
                separator.len() + offset + (eol.len() - 1) * graft.declaration[..offset].matches('\n').count()
            };
            shift(relative.start)..shift(relative.end)
        };

        Self {
            import,
            renames,
            declaration,
            declaration_name: at(&graft.name_in_declaration),
            placeholder: at(&graft.placeholder_in_declaration),
        }
    }

    /// All edits, against the snapshot the plan was made from
    pub fn edits(&self) -> Vec<Edit> {
        self.import
            .iter()
            .chain(&self.renames)
            .chain(std::iter::once(&self.declaration))
            .cloned()
            .collect()
    }

    /// Apply the plan to `buffer` as one batch
    pub fn apply(&self, buffer: &mut Buffer) -> Result<GraftResult, BufferError> {
        let mut ranges = buffer.apply_batch(self.edits())?;

        let declaration = ranges.pop().unwrap_or_default();
        let import = if self.import.is_some() && !ranges.is_empty() {
            Some(ranges.remove(0))
        } else {
            None
        };
        let at = |relative: &Range<usize>| declaration.start + relative.start..declaration.start + relative.end;

        Ok(GraftResult {
            import,
            tag_names: ranges,
            declaration_name: at(&self.declaration_name),
            placeholder: at(&self.placeholder),
            declaration,
        })
    }
}
