//! Language definitions

use std::path::Path;

use tree_sitter::Language as TSLanguage;

/// Supported language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// JavaScript, JSX included
    JavaScript,
    TypeScript,
    Tsx,
}

impl Language {
    /// Get tree-sitter language
    pub fn ts_language(&self) -> TSLanguage {
        match self {
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Get language from string ID
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "javascript" | "js" | "javascriptreact" | "jsx" => Some(Language::JavaScript),
            "typescript" | "ts" => Some(Language::TypeScript),
            "typescriptreact" | "tsx" => Some(Language::Tsx),
            _ => None,
        }
    }

    /// Get language ID
    pub fn id(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Tsx => "typescriptreact",
        }
    }

    /// Get file extensions
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "mts", "cts"],
            Language::Tsx => &["tsx"],
        }
    }

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "mts" | "cts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            _ => None,
        }
    }

    /// Detect language from a file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Can files of this language contain JSX markup?
    ///
    /// Plain TypeScript reserves `<T>expr` for type assertions, so only the
    /// JavaScript and TSX grammars parse tags.
    pub fn supports_jsx(&self) -> bool {
        matches!(self, Language::JavaScript | Language::Tsx)
    }
}
