//! Code action for the styled-component extraction

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use buffer::Buffer;
use serde::{Deserialize, Serialize};

use super::StyledComponentExtractor;
use crate::{CodeAction, CodeActionKind, CodeActionProvider, ExtractError, WorkspaceEdit};

/// Action title
pub const TITLE: &str = "Extract to styled component";

/// Data carried by the action between listing and execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ActionData {
    caret: usize,
    #[serde(default)]
    name: Option<String>,
}

/// Offers "Extract to styled component" on JSX tags
pub struct StyledComponentProvider {
    extractor: Arc<StyledComponentExtractor>,
}

impl StyledComponentProvider {
    pub fn new(extractor: Arc<StyledComponentExtractor>) -> Self {
        Self { extractor }
    }
}

impl Default for StyledComponentProvider {
    fn default() -> Self {
        Self::new(Arc::new(StyledComponentExtractor::default()))
    }
}

#[async_trait]
impl CodeActionProvider for StyledComponentProvider {
    async fn provide_actions(
        &self,
        file: &Path,
        start: usize,
        _end: usize,
        source: &str,
    ) -> anyhow::Result<Vec<CodeAction>> {
        let buffer = Buffer::from_file(file, source);
        let preview = match self.extractor.preview(&buffer.snapshot(), start, None) {
            Ok(preview) => preview,
            Err(ExtractError::NotApplicable) => return Ok(Vec::new()),
            Err(err) => return Err(err).context("planning styled component extraction"),
        };

        let mut edit = WorkspaceEdit::new();
        edit.add_file_edit(preview);
        let data = serde_json::to_value(ActionData { caret: start, name: None })?;

        Ok(vec![
            CodeAction::new(TITLE, CodeActionKind::RefactorExtract)
                .with_edit(edit)
                .with_data(data),
        ])
    }

    fn can_handle(&self, action: &CodeAction) -> bool {
        action.kind == CodeActionKind::RefactorExtract && action.title == TITLE
    }

    async fn execute(&self, action: &CodeAction, file: &Path, source: &str) -> anyhow::Result<WorkspaceEdit> {
        let data: ActionData = action
            .data
            .clone()
            .map(serde_json::from_value)
            .transpose()?
            .context("action carries no caret")?;

        let buffer = Buffer::from_file(file, source);
        let preview = self
            .extractor
            .preview(&buffer.snapshot(), data.caret, data.name.as_deref())?;

        let mut edit = WorkspaceEdit::new();
        edit.add_file_edit(preview);
        Ok(edit)
    }
}
