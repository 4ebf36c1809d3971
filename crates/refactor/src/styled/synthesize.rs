//! Declaration synthesis
//!
//! Builds the scratch program text the graft is taken from:
//!
//! ```text
//! import styled from "styled-components";   (only without an existing import)
//! const StyledDiv = styled.div`
//!   // TODO: add styling
//! `;
//! <StyledDiv />;
//! ```
//!
//! The last line is a probe usage that yields the renamed tag-name token.

use super::classify::TagKind;
use super::naming;

/// How the styling factory is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallForm {
    /// `styled.div`
    Member,
    /// `styled(MyComponent)`
    Call,
    /// `styled("my-element")`
    StringCall,
}

impl CallForm {
    /// Pick the call form for a tag
    pub fn for_tag(kind: TagKind, tag_name: &str) -> Self {
        match kind {
            TagKind::Intrinsic if naming::is_valid_identifier(tag_name) => CallForm::Member,
            TagKind::Custom if naming::is_identifier_path(tag_name) => CallForm::Call,
            _ => CallForm::StringCall,
        }
    }

    /// Call head for `factory` applied to `tag_name`
    pub fn head(&self, factory: &str, tag_name: &str) -> String {
        match self {
            CallForm::Member => format!("{}.{}", factory, tag_name),
            CallForm::Call => format!("{}({})", factory, tag_name),
            CallForm::StringCall => format!("{}(\"{}\")", factory, tag_name),
        }
    }
}

/// Inputs of a synthesis
#[derive(Debug, Clone)]
pub struct SynthesisRequest<'a> {
    /// Component identifier, already normalized
    pub name: &'a str,
    pub kind: TagKind,
    pub tag_name: &'a str,
    /// One indentation level for the template body
    pub indent: &'a str,
    /// Local name of an existing styling import
    pub existing_import: Option<&'a str>,
    /// Module a synthesized import comes from
    pub library: &'a str,
    /// Local name of a synthesized import
    pub import_name: &'a str,
    /// Template body line
    pub placeholder: &'a str,
}

/// Text produced for one extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedDeclaration {
    /// Chosen identifier
    pub name: String,
    pub call_form: CallForm,
    /// Import line, when one had to be synthesized
    pub import: Option<String>,
    /// The `const` declaration
    pub declaration: String,
    /// Full scratch program: import, declaration and probe usage
    pub scratch: String,
}

impl SynthesizedDeclaration {
    pub fn has_import(&self) -> bool {
        self.import.is_some()
    }
}

/// Build the import line, declaration and scratch program text
pub fn synthesize(request: &SynthesisRequest<'_>) -> SynthesizedDeclaration {
    let factory = request.existing_import.unwrap_or(request.import_name);
    let import = request
        .existing_import
        .is_none()
        .then(|| format!("import {} from \"{}\";", request.import_name, request.library));

    let call_form = CallForm::for_tag(request.kind, request.tag_name);
    let declaration = format!(
        "const {} = {}`\n{}{}\n`;",
        request.name,
        call_form.head(factory, request.tag_name),
        request.indent,
        request.placeholder,
    );

    let mut scratch = String::new();
    if let Some(import) = &import {
        scratch.push_str(import);
        scratch.push('\n');
    }
    scratch.push_str(&declaration);
    scratch.push('\n');
    scratch.push_str(&format!("<{} />;\n", request.name));

    SynthesizedDeclaration {
        name: request.name.to_string(),
        call_form,
        import,
        declaration,
        scratch,
    }
}
