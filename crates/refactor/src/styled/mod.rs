//! Extract a JSX tag into a styled component
//!
//! With the caret on a tag such as `<div>`, the tag is renamed to a new
//! component and a `styled-components` declaration for it is appended:
//!
//! ```text
//! import styled from "styled-components";
//!
//! const a = <StyledDiv>hi</StyledDiv>;
//!
//! const StyledDiv = styled.div`
//!   // TODO: add styling
//! `;
//! ```

pub mod classify;
pub mod graft;
pub mod import;
pub mod naming;
pub mod provider;
pub mod session;
pub mod synthesize;

use std::sync::Arc;

use buffer::{Buffer, Selection, SelectionSet, Snapshot};
use linked_editing::LinkedEditingService;
use treesitter::{Language, TreeSitterService};

use crate::{ExtractError, FileEdit, StyledConfig, TextEdit};
pub use classify::{JsxTag, TagKind};
pub use graft::{GraftResult, ScratchGraft, SplicePlan};
pub use import::StyledImport;
pub use provider::StyledComponentProvider;
pub use session::{ExtractOutcome, NamingSession, SessionState};
pub use synthesize::{CallForm, SynthesizedDeclaration};

/// Everything needed to perform one extraction, computed from a snapshot
#[derive(Debug, Clone)]
pub struct Extraction {
    pub tag: JsxTag,
    /// Name used for a blank or unusable user name
    pub default_name: String,
    pub synthesized: SynthesizedDeclaration,
    pub splice: SplicePlan,
    /// Buffer version the plan applies to
    pub version: u64,
}

/// What `start_session` did
#[derive(Debug)]
#[must_use]
pub enum Started {
    /// The declaration is grafted and its name is being edited inline
    Interactive(NamingSession),
    /// Linked editing is off; the extraction completed with the default name
    Completed(ExtractOutcome),
}

/// Styled-component extraction
pub struct StyledComponentExtractor {
    trees: Arc<TreeSitterService>,
    linked: Arc<LinkedEditingService>,
    config: StyledConfig,
}

impl StyledComponentExtractor {
    pub fn new(config: StyledConfig) -> Self {
        Self::with_services(
            config,
            Arc::new(TreeSitterService::new()),
            Arc::new(LinkedEditingService::new()),
        )
    }

    /// Share parsers and the linked-editing service with the host
    pub fn with_services(
        config: StyledConfig,
        trees: Arc<TreeSitterService>,
        linked: Arc<LinkedEditingService>,
    ) -> Self {
        linked.configure(config.linked_editing.clone());
        Self { trees, linked, config }
    }

    pub fn config(&self) -> &StyledConfig {
        &self.config
    }

    pub fn linked_editing(&self) -> &Arc<LinkedEditingService> {
        &self.linked
    }

    /// Is the extraction offered at `caret`?
    pub fn is_available(&self, buffer: &Buffer, caret: usize) -> bool {
        self.tag_at(&buffer.snapshot(), caret).is_ok()
    }

    /// Extractable tag at `caret`
    pub fn tag_at(&self, snapshot: &Snapshot, caret: usize) -> Result<JsxTag, ExtractError> {
        let language = jsx_language(snapshot)?;
        let tree = self.trees.parse(language, snapshot.text())?;
        classify::find_tag_at(&tree, snapshot.text(), caret)
            .filter(JsxTag::is_extractable)
            .ok_or(ExtractError::NotApplicable)
    }

    /// Plan an extraction without touching the buffer
    pub fn plan(&self, snapshot: &Snapshot, caret: usize, name: Option<&str>) -> Result<Extraction, ExtractError> {
        let language = jsx_language(snapshot)?;
        let source = snapshot.text();
        let tree = self.trees.parse(language, source)?;

        let tag = classify::find_tag_at(&tree, source, caret)
            .filter(JsxTag::is_extractable)
            .ok_or_else(|| {
                tracing::debug!("No extractable tag at offset {}", caret);
                ExtractError::NotApplicable
            })?;

        let settings = &self.config.styled;
        let existing = import::find_styled_import(&tree, source, &settings.library);
        let taken = import::top_level_bindings(&tree, source);
        let default_name = naming::unique_name(
            &naming::default_name_with_prefix(&settings.name_prefix, &tag.name),
            &taken,
        );
        let name = naming::normalize_name(name, &default_name);

        let indent = self.config.editor.indent_unit();
        let synthesized = synthesize::synthesize(&synthesize::SynthesisRequest {
            name: &name,
            kind: tag.kind,
            tag_name: &tag.name,
            indent: &indent,
            existing_import: existing.as_ref().map(|i| i.local_name.as_str()),
            library: &settings.library,
            import_name: &settings.import_name,
            placeholder: &settings.placeholder,
        });

        let graft = ScratchGraft::parse(&self.trees, language, &synthesized)?;
        let placement = graft.import.is_some().then(|| import::import_placement(&tree, source));
        let splice = SplicePlan::new(&tag, &graft, placement, source);

        tracing::debug!(
            "Planned extraction of <{}> ({}) as {} via {:?}",
            tag.name,
            tag.kind.as_str(),
            name,
            synthesized.call_form
        );
        Ok(Extraction {
            tag,
            default_name,
            synthesized,
            splice,
            version: snapshot.version,
        })
    }

    /// The extraction's edits as a file edit, for previews
    pub fn preview(&self, snapshot: &Snapshot, caret: usize, name: Option<&str>) -> Result<FileEdit, ExtractError> {
        let extraction = self.plan(snapshot, caret, name)?;
        let mut edit = FileEdit::new(snapshot.path.clone().unwrap_or_default());
        for change in extraction.splice.edits() {
            edit.add(TextEdit::from(&change));
        }
        Ok(edit)
    }

    /// Extract under `name` (or the default name) as one undoable edit and
    /// select the placeholder
    pub fn extract_with_name(
        &self,
        buffer: &mut Buffer,
        caret: usize,
        name: Option<&str>,
    ) -> Result<ExtractOutcome, ExtractError> {
        self.recover_abandoned(buffer)?;
        let extraction = self.plan(&buffer.snapshot(), caret, name)?;
        buffer.ensure_version(extraction.version)?;

        let transaction = buffer.begin_transaction(session::TRANSACTION)?;
        let grafted = match extraction.splice.apply(buffer) {
            Ok(grafted) => grafted,
            Err(err) => {
                buffer.rollback_transaction()?;
                return Err(err.into());
            }
        };
        buffer.set_selections(SelectionSet::single(Selection::from_range(grafted.placeholder.clone())));
        buffer.commit_transaction()?;

        tracing::info!(
            "Extracted <{}> to styled component {}",
            extraction.tag.name,
            extraction.synthesized.name
        );
        Ok(ExtractOutcome {
            name: extraction.synthesized.name,
            tag: extraction.tag,
            import_inserted: grafted.import.is_some(),
            declaration_name: grafted.declaration_name,
            placeholder: grafted.placeholder,
            transaction,
        })
    }

    /// Graft under the default name and start inline naming.
    ///
    /// Falls back to a one-shot extraction when linked editing is disabled.
    pub fn start_session(&self, buffer: &mut Buffer, caret: usize) -> Result<Started, ExtractError> {
        if !self.linked.is_enabled() {
            return self.extract_with_name(buffer, caret, None).map(Started::Completed);
        }

        self.recover_abandoned(buffer)?;
        let extraction = self.plan(&buffer.snapshot(), caret, None)?;
        let mut session = NamingSession::new(extraction, self.linked.clone());
        session.graft(buffer)?;
        Ok(Started::Interactive(session))
    }

    /// Roll back the transaction of a naming session that was dropped
    /// without finishing. Returns whether anything was reverted.
    ///
    /// Extractions call this first, so `caret` offsets passed to them refer
    /// to the text with the abandoned edit reverted.
    pub fn recover_abandoned(&self, buffer: &mut Buffer) -> Result<bool, ExtractError> {
        let abandoned = buffer.open_transaction() == Some(session::TRANSACTION)
            && self.linked.active_session(buffer.id).is_none();
        if !abandoned {
            return Ok(false);
        }

        tracing::debug!("Rolling back abandoned extraction in buffer {:?}", buffer.id);
        buffer.rollback_transaction()?;
        Ok(true)
    }
}

impl Default for StyledComponentExtractor {
    fn default() -> Self {
        Self::new(StyledConfig::default())
    }
}

/// JSX-capable language of a snapshot
fn jsx_language(snapshot: &Snapshot) -> Result<Language, ExtractError> {
    snapshot
        .language_id
        .as_deref()
        .and_then(Language::from_id)
        .or_else(|| snapshot.path.as_deref().and_then(Language::from_path))
        .filter(Language::supports_jsx)
        .ok_or(ExtractError::NotApplicable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionError;
    use pretty_assertions::assert_eq;

    const DIV_SOURCE: &str = "const a = <div>hi</div>;\n";

    const DIV_EXTRACTED: &str = "\
import styled from \"styled-components\";

const a = <StyledDiv>hi</StyledDiv>;

const StyledDiv = styled.div`
  // TODO: add styling
`;
";

    fn caret(source: &str, needle: &str) -> usize {
        source.find(needle).unwrap()
    }

    fn interactive(started: Started) -> NamingSession {
        match started {
            Started::Interactive(session) => session,
            Started::Completed(outcome) => panic!("completed without a session: {:?}", outcome),
        }
    }

    #[test]
    fn test_availability() {
        let extractor = StyledComponentExtractor::default();

        let buffer = Buffer::from_file("App.jsx", "const a = <div>hi</div>;\n");
        assert!(extractor.is_available(&buffer, caret(buffer.text(), "<div")));
        assert!(extractor.is_available(&buffer, caret(buffer.text(), "</div")));
        assert!(!extractor.is_available(&buffer, caret(buffer.text(), "hi") + 1));

        let buffer = Buffer::from_file("App.jsx", "const a = <><div /></>;\n");
        assert!(!extractor.is_available(&buffer, caret(buffer.text(), "<>")));
        assert!(!extractor.is_available(&buffer, caret(buffer.text(), "</>") + 1));
    }

    #[test]
    fn test_only_jsx_capable_files() {
        let extractor = StyledComponentExtractor::default();

        let buffer = Buffer::from_file("App.tsx", "const a = <div />;\n");
        assert!(extractor.is_available(&buffer, caret(buffer.text(), "div")));

        let buffer = Buffer::from_file("types.ts", "const a = <div />;\n");
        assert!(!extractor.is_available(&buffer, caret(buffer.text(), "div")));

        let buffer = Buffer::from_text("const a = <div />;\n");
        assert!(!extractor.is_available(&buffer, caret(buffer.text(), "div")));
    }

    #[test]
    fn test_extract_div_with_default_name() {
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", DIV_SOURCE);

        let outcome = extractor
            .extract_with_name(&mut buffer, caret(DIV_SOURCE, "div"), None)
            .unwrap();

        assert_eq!(buffer.text(), DIV_EXTRACTED);
        assert_eq!(outcome.name, "StyledDiv");
        assert!(outcome.import_inserted);
        assert_eq!(&buffer.text()[outcome.placeholder.clone()], "// TODO: add styling");
        assert_eq!(buffer.primary_selection(), Selection::from_range(outcome.placeholder));
    }

    #[test]
    fn test_extract_custom_component_with_existing_import() {
        let source = "\
import styled from \"styled-components\";
import { MyComponent } from \"./my-component\";

export const App = () => <MyComponent title=\"x\" />;
";
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", source);

        let outcome = extractor
            .extract_with_name(&mut buffer, caret(source, "<MyComponent"), Some("fancy card"))
            .unwrap();

        assert_eq!(
            buffer.text(),
            "\
import styled from \"styled-components\";
import { MyComponent } from \"./my-component\";

export const App = () => <FancyCard title=\"x\" />;

const FancyCard = styled(MyComponent)`
  // TODO: add styling
`;
"
        );
        assert!(!outcome.import_inserted);
        assert_eq!(buffer.text().matches("import styled").count(), 1);
    }

    #[test]
    fn test_aliased_named_import_is_the_call_head() {
        let source = "import { x as y } from \"styled-components\";\nconst a = <span>1</span>;\nconst b = <Box />;\n";
        let extractor = StyledComponentExtractor::default();

        let mut buffer = Buffer::from_file("App.jsx", source);
        extractor.extract_with_name(&mut buffer, caret(source, "span"), None).unwrap();
        assert!(buffer.text().contains("const StyledSpan = y.span`"));
        assert_eq!(buffer.text().matches("styled-components").count(), 1);

        let mut buffer = Buffer::from_file("App.jsx", source);
        extractor.extract_with_name(&mut buffer, caret(source, "Box"), None).unwrap();
        assert!(buffer.text().contains("const StyledBox = y(Box)`"));
    }

    #[test]
    fn test_helper_only_import_is_not_the_call_head() {
        let source = "import { css } from \"styled-components\";\nconst a = <div />;\n";
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", source);

        let outcome = extractor.extract_with_name(&mut buffer, caret(source, "div"), None).unwrap();

        assert!(outcome.import_inserted);
        assert!(buffer.text().starts_with(
            "import styled from \"styled-components\";\nimport { css } from \"styled-components\";\n"
        ));
        assert!(buffer.text().contains("const StyledDiv = styled.div`"));
        assert!(!buffer.text().contains("css.div"));
    }

    #[test]
    fn test_import_goes_after_directives() {
        let source = "\"use client\";\n\nimport React from \"react\";\n\nexport default () => <p>x</p>;\n";
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("page.jsx", source);

        extractor.extract_with_name(&mut buffer, caret(source, "<p"), None).unwrap();

        assert!(buffer.text().starts_with(
            "\"use client\";\n\nimport styled from \"styled-components\";\nimport React from \"react\";\n"
        ));
    }

    #[test]
    fn test_custom_element_uses_string_call() {
        let source = "const a = <my-element>hi</my-element>;";
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", source);

        extractor.extract_with_name(&mut buffer, caret(source, "my-"), None).unwrap();

        assert_eq!(
            buffer.text(),
            "import styled from \"styled-components\";\n\
             \n\
             const a = <StyledMyElement>hi</StyledMyElement>;\n\
             \n\
             const StyledMyElement = styled(\"my-element\")`\n  // TODO: add styling\n`;\n"
        );
    }

    #[test]
    fn test_default_name_avoids_existing_bindings() {
        let source = "const StyledDiv = 1;\nconst a = <div />;\n";
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", source);

        let outcome = extractor.extract_with_name(&mut buffer, caret(source, "<div"), None).unwrap();
        assert_eq!(outcome.name, "StyledDiv2");
        assert!(buffer.text().contains("<StyledDiv2 />"));
    }

    #[test]
    fn test_extraction_is_one_undo_unit() {
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", DIV_SOURCE);

        extractor.extract_with_name(&mut buffer, caret(DIV_SOURCE, "div"), None).unwrap();
        assert!(buffer.undo());
        assert_eq!(buffer.text(), DIV_SOURCE);
        assert!(!buffer.can_undo());
    }

    #[test]
    fn test_not_applicable_leaves_buffer_untouched() {
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", DIV_SOURCE);

        let err = extractor
            .extract_with_name(&mut buffer, caret(DIV_SOURCE, "hi") + 1, None)
            .unwrap_err();
        assert_eq!(err, ExtractError::NotApplicable);
        assert_eq!(buffer.text(), DIV_SOURCE);
        assert_eq!(buffer.version(), 0);
    }

    #[test]
    fn test_preview_matches_extraction() {
        let extractor = StyledComponentExtractor::default();
        let buffer = Buffer::from_file("App.jsx", DIV_SOURCE);

        let preview = extractor.preview(&buffer.snapshot(), caret(DIV_SOURCE, "div"), None).unwrap();
        assert_eq!(preview.path, std::path::PathBuf::from("App.jsx"));
        assert_eq!(preview.edits.len(), 4);
        assert_eq!(preview.apply(DIV_SOURCE).unwrap(), DIV_EXTRACTED);
    }

    #[test]
    fn test_session_with_default_name() {
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", DIV_SOURCE);

        let mut session = interactive(extractor.start_session(&mut buffer, caret(DIV_SOURCE, "div")).unwrap());
        assert_eq!(session.state(), &SessionState::GraftedWithPlaceholder);
        assert_eq!(session.value(&buffer), "StyledDiv");
        assert_eq!(session.regions().len(), 3);
        // Every region is selected, the opening tag's is primary
        assert_eq!(buffer.selections().len(), 3);
        assert_eq!(buffer.primary_selection(), Selection::from_range(session.regions()[0].clone()));

        let outcome = session.finish(&mut buffer).unwrap();
        assert_eq!(buffer.text(), DIV_EXTRACTED);
        assert_eq!(session.state(), &SessionState::Finished("StyledDiv".to_string()));
        assert_eq!(buffer.primary_selection(), Selection::from_range(outcome.placeholder));
    }

    #[test]
    fn test_session_typing_updates_every_occurrence() {
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", DIV_SOURCE);
        let mut session = interactive(extractor.start_session(&mut buffer, caret(DIV_SOURCE, "div")).unwrap());

        session.type_text(&mut buffer, "Card").unwrap();
        assert_eq!(session.state(), &SessionState::EditingLinkedFields);
        assert!(buffer.text().contains("<Card>hi</Card>"));
        assert!(buffer.text().contains("const Card = styled.div`"));

        session.type_text(&mut buffer, "Body").unwrap();
        let outcome = session.finish(&mut buffer).unwrap();

        assert_eq!(outcome.name, "CardBody");
        assert!(buffer.text().contains("const a = <CardBody>hi</CardBody>;"));
        assert!(buffer.text().contains("const CardBody = styled.div`\n  // TODO: add styling\n`;"));
        assert_eq!(&buffer.text()[outcome.placeholder], "// TODO: add styling");
    }

    #[test]
    fn test_finish_normalizes_name() {
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", DIV_SOURCE);
        let mut session = interactive(extractor.start_session(&mut buffer, caret(DIV_SOURCE, "div")).unwrap());

        session.set_value(&mut buffer, "page-header").unwrap();
        let outcome = session.finish(&mut buffer).unwrap();

        assert_eq!(outcome.name, "PageHeader");
        assert!(buffer.text().contains("<PageHeader>hi</PageHeader>"));
        assert!(buffer.text().contains("const PageHeader = styled.div`"));
        assert!(!buffer.text().contains("page-header"));
    }

    #[test]
    fn test_finish_blank_name_uses_default() {
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", DIV_SOURCE);
        let mut session = interactive(extractor.start_session(&mut buffer, caret(DIV_SOURCE, "div")).unwrap());

        session.set_value(&mut buffer, "").unwrap();
        assert!(buffer.text().contains("<>hi</>"));
        session.finish(&mut buffer).unwrap();

        assert_eq!(buffer.text(), DIV_EXTRACTED);
    }

    #[test]
    fn test_dropped_session_is_rolled_back_by_next_extraction() {
        let source = "const a = <div>hi</div>;\nconst b = <span />;\n";
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", source);

        let mut session = interactive(extractor.start_session(&mut buffer, caret(source, "div")).unwrap());
        session.type_text(&mut buffer, "Card").unwrap();
        // A live session is left alone
        assert!(!extractor.recover_abandoned(&mut buffer).unwrap());
        drop(session);

        assert_eq!(extractor.linked_editing().active_session(buffer.id), None);
        assert_eq!(buffer.open_transaction(), Some(session::TRANSACTION));

        let mut session = interactive(extractor.start_session(&mut buffer, caret(source, "span")).unwrap());
        let outcome = session.finish(&mut buffer).unwrap();

        assert_eq!(outcome.name, "StyledSpan");
        assert!(buffer.text().contains("const a = <div>hi</div>;"));
        assert!(buffer.text().contains("const b = <StyledSpan />;"));
        assert!(!buffer.text().contains("Card"));
        assert!(buffer.undo());
        assert_eq!(buffer.text(), source);
    }

    #[test]
    fn test_cancel_restores_document() {
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", DIV_SOURCE);
        let at = caret(DIV_SOURCE, "div");
        buffer.set_cursor(at);
        let selections = buffer.selections().clone();

        let mut session = interactive(extractor.start_session(&mut buffer, at).unwrap());
        session.type_text(&mut buffer, "Wrapper").unwrap();
        session.cancel(&mut buffer).unwrap();

        assert_eq!(buffer.text(), DIV_SOURCE);
        assert_eq!(buffer.selections(), &selections);
        assert_eq!(session.state(), &SessionState::Cancelled);
        assert!(!buffer.can_undo());
        assert_eq!(extractor.linked_editing().active_session(buffer.id), None);
    }

    #[test]
    fn test_invalid_transitions() {
        let extractor = StyledComponentExtractor::default();
        let mut buffer = Buffer::from_file("App.jsx", DIV_SOURCE);
        let mut session = interactive(extractor.start_session(&mut buffer, caret(DIV_SOURCE, "div")).unwrap());
        session.finish(&mut buffer).unwrap();

        assert!(matches!(
            session.type_text(&mut buffer, "x"),
            Err(SessionError::InvalidState { action: "type", state: "finished" })
        ));
        assert!(matches!(
            session.cancel(&mut buffer),
            Err(ExtractError::Session(SessionError::InvalidState { .. }))
        ));
        assert!(session.finish(&mut buffer).is_err());
    }

    #[test]
    fn test_disabled_linked_editing_completes_immediately() {
        let mut config = StyledConfig::default();
        config.linked_editing.enabled = false;
        let extractor = StyledComponentExtractor::new(config);
        let mut buffer = Buffer::from_file("App.jsx", DIV_SOURCE);

        match extractor.start_session(&mut buffer, caret(DIV_SOURCE, "div")).unwrap() {
            Started::Completed(outcome) => assert_eq!(outcome.name, "StyledDiv"),
            Started::Interactive(_) => panic!("expected a one-shot extraction"),
        }
        assert_eq!(buffer.text(), DIV_EXTRACTED);
    }

    #[test]
    fn test_configured_library_and_indent() {
        let config = StyledConfig::from_toml_str(
            r#"
            [styled]
            library = "@emotion/styled"
            placeholder = "color: red;"

            [editor]
            tab_size = 4
            "#,
        )
        .unwrap();
        let extractor = StyledComponentExtractor::new(config);
        let source = "const a = <b>x</b>;\n";
        let mut buffer = Buffer::from_file("App.jsx", source);

        extractor.extract_with_name(&mut buffer, caret(source, "b>"), None).unwrap();

        assert_eq!(
            buffer.text(),
            "import styled from \"@emotion/styled\";\n\
             \n\
             const a = <StyledB>x</StyledB>;\n\
             \n\
             const StyledB = styled.b`\n    color: red;\n`;\n"
        );
    }

}
