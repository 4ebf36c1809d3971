//! # Foxkit Refactor
//!
//! Refactoring engine. Ships "Extract to styled component" for JSX files.

pub mod actions;
pub mod config;
pub mod edit;
pub mod error;
pub mod styled;

use std::path::Path;

pub use actions::{CodeAction, CodeActionKind, CodeActionProvider};
pub use config::StyledConfig;
pub use edit::{FileEdit, TextEdit, WorkspaceEdit};
pub use error::{ExtractError, SessionError};
pub use styled::{ExtractOutcome, NamingSession, Started, StyledComponentExtractor, StyledComponentProvider};

/// Refactoring service
pub struct RefactorService {
    /// Registered action providers
    providers: Vec<Box<dyn CodeActionProvider>>,
}

impl RefactorService {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Register an action provider
    pub fn register<P: CodeActionProvider + 'static>(&mut self, provider: P) {
        self.providers.push(Box::new(provider));
    }

    /// Get available actions for a selection
    pub async fn actions_at(&self, file: &Path, start: usize, end: usize, source: &str) -> Vec<CodeAction> {
        let mut actions = Vec::new();

        for provider in &self.providers {
            match provider.provide_actions(file, start, end, source).await {
                Ok(mut provided) => actions.append(&mut provided),
                Err(err) => tracing::warn!("Code action provider failed: {:#}", err),
            }
        }

        actions.sort_by_key(|a| a.priority());
        actions
    }

    /// Execute a refactoring action
    pub async fn execute(&self, action: &CodeAction, file: &Path, source: &str) -> anyhow::Result<WorkspaceEdit> {
        for provider in &self.providers {
            if provider.can_handle(action) {
                return provider.execute(action, file, source).await;
            }
        }

        anyhow::bail!("No provider for action: {}", action.title)
    }
}

impl Default for RefactorService {
    fn default() -> Self {
        let mut service = Self::new();
        service.register(StyledComponentProvider::default());
        service
    }
}
