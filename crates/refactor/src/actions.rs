//! Code actions

use std::path::Path;

use async_trait::async_trait;

use crate::WorkspaceEdit;

/// Code action
#[derive(Debug, Clone, PartialEq)]
pub struct CodeAction {
    /// Action title
    pub title: String,
    /// Action kind
    pub kind: CodeActionKind,
    /// Preferred action (shown prominently)
    pub is_preferred: bool,
    /// Edit the action would make, for previews
    pub edit: Option<WorkspaceEdit>,
    /// Provider data needed to execute the action
    pub data: Option<serde_json::Value>,
}

impl CodeAction {
    /// Create a new code action
    pub fn new(title: impl Into<String>, kind: CodeActionKind) -> Self {
        Self {
            title: title.into(),
            kind,
            is_preferred: false,
            edit: None,
            data: None,
        }
    }

    /// Set as preferred
    pub fn preferred(mut self) -> Self {
        self.is_preferred = true;
        self
    }

    /// Set edit
    pub fn with_edit(mut self, edit: WorkspaceEdit) -> Self {
        self.edit = Some(edit);
        self
    }

    /// Set data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Get priority for sorting
    pub fn priority(&self) -> u32 {
        if self.is_preferred {
            return 0;
        }
        match &self.kind {
            CodeActionKind::QuickFix => 1,
            CodeActionKind::Refactor | CodeActionKind::RefactorExtract | CodeActionKind::RefactorRewrite => 2,
            CodeActionKind::Custom(_) => 4,
        }
    }
}

/// Code action kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeActionKind {
    QuickFix,
    Refactor,
    RefactorExtract,
    RefactorRewrite,
    Custom(String),
}

impl CodeActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::QuickFix => "quickfix",
            Self::Refactor => "refactor",
            Self::RefactorExtract => "refactor.extract",
            Self::RefactorRewrite => "refactor.rewrite",
            Self::Custom(s) => s,
        }
    }
}

/// Code action provider trait
#[async_trait]
pub trait CodeActionProvider: Send + Sync {
    /// Get actions for a selection
    async fn provide_actions(
        &self,
        file: &Path,
        start: usize,
        end: usize,
        source: &str,
    ) -> anyhow::Result<Vec<CodeAction>>;

    /// Can handle action kind?
    fn can_handle(&self, action: &CodeAction) -> bool;

    /// Execute action against `source`
    async fn execute(&self, action: &CodeAction, file: &Path, source: &str) -> anyhow::Result<WorkspaceEdit>;
}
