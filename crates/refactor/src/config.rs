//! Styled extraction settings

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use anyhow::{Context, Result};

use linked_editing::LinkedEditingConfig;

/// Settings for the styled-component extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyledConfig {
    /// What the extraction generates
    pub styled: StyledSettings,
    /// Indentation used inside the template literal
    pub editor: EditorSettings,
    /// Inline naming session
    pub linked_editing: LinkedEditingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyledSettings {
    /// Module the styling factory is imported from
    pub library: String,
    /// Local name of a synthesized import
    pub import_name: String,
    /// Single line placed in the template body
    pub placeholder: String,
    /// Prefix of generated component names
    pub name_prefix: String,
}

impl Default for StyledSettings {
    fn default() -> Self {
        Self {
            library: "styled-components".into(),
            import_name: "styled".into(),
            placeholder: "// TODO: add styling".into(),
            name_prefix: "Styled".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub tab_size: u32,
    pub insert_spaces: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tab_size: 2,
            insert_spaces: true,
        }
    }
}

impl EditorSettings {
    /// One level of indentation
    pub fn indent_unit(&self) -> String {
        if self.insert_spaces {
            " ".repeat(self.tab_size as usize)
        } else {
            "\t".to_string()
        }
    }
}

impl StyledConfig {
    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load settings from disk or return defaults
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("styled-extract")
            .join("config.toml")
    }
}
