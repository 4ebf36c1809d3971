//! # styled-extract
//!
//! Extract a JSX tag into a styled component from the command line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use buffer::{Buffer, Snapshot};
use clap::{Args, Parser, Subcommand};
use refactor::{ExtractError, StyledComponentExtractor, StyledConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "styled-extract")]
#[command(about = "Extract JSX tags to styled components", long_about = None)]
#[command(version)]
struct Cli {
    /// Log extraction steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether the extraction is available at a position
    Check {
        #[command(flatten)]
        at: Caret,
    },

    /// Extract the tag at a position
    Apply {
        #[command(flatten)]
        at: Caret,

        /// Component name (normalized to PascalCase)
        #[arg(short, long)]
        name: Option<String>,

        /// Rewrite the file instead of printing the result
        #[arg(short, long)]
        in_place: bool,

        /// Settings file (defaults to the user config)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct Caret {
    /// JavaScript, JSX or TSX file
    file: PathBuf,

    /// 1-based line
    #[arg(short, long)]
    line: usize,

    /// 1-based column, in characters
    #[arg(short, long)]
    column: usize,
}

impl Caret {
    fn load(&self) -> Result<Buffer> {
        let source = std::fs::read_to_string(&self.file)
            .with_context(|| format!("reading {}", self.file.display()))?;
        Ok(Buffer::from_file(&self.file, &source))
    }

    fn offset(&self, snapshot: &Snapshot) -> Result<usize> {
        let line = self.line.checked_sub(1).context("lines start at 1")?;
        let column = self.column.checked_sub(1).context("columns start at 1")?;
        snapshot
            .line_char_to_offset(line, column)
            .with_context(|| format!("{}:{}:{} is past the end of the file", self.file.display(), self.line, self.column))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "styled_extract=info,warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { at } => check(&at),
        Commands::Apply {
            at,
            name,
            in_place,
            config,
        } => apply(&at, name.as_deref(), in_place, config.as_deref()),
    }
}

fn check(at: &Caret) -> Result<()> {
    let buffer = at.load()?;
    let snapshot = buffer.snapshot();
    let caret = at.offset(&snapshot)?;

    let extractor = StyledComponentExtractor::new(StyledConfig::load_or_default()?);
    match extractor.tag_at(&snapshot, caret) {
        Ok(tag) => println!("available: <{}> ({})", tag.name, tag.kind.as_str()),
        Err(ExtractError::NotApplicable) => println!("not available"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn apply(at: &Caret, name: Option<&str>, in_place: bool, config: Option<&Path>) -> Result<()> {
    let config = match config {
        Some(path) => StyledConfig::load(path)?,
        None => StyledConfig::load_or_default()?,
    };
    let extractor = StyledComponentExtractor::new(config);

    let mut buffer = at.load()?;
    let caret = at.offset(&buffer.snapshot())?;
    tracing::debug!("Extracting at byte offset {}", caret);
    let outcome = extractor
        .extract_with_name(&mut buffer, caret, name)
        .with_context(|| format!("extracting at {}:{}:{}", at.file.display(), at.line, at.column))?;

    if in_place {
        std::fs::write(&at.file, buffer.text()).with_context(|| format!("writing {}", at.file.display()))?;
        tracing::info!("Extracted <{}> to {} in {}", outcome.tag.name, outcome.name, at.file.display());
    } else {
        print!("{}", buffer.text());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "styled-extract", "apply", "App.jsx", "--line", "3", "--column", "12", "--name", "Card", "-i",
        ])
        .unwrap();
        match cli.command {
            Commands::Apply { at, name, in_place, config } => {
                assert_eq!(at.file, PathBuf::from("App.jsx"));
                assert_eq!((at.line, at.column), (3, 12));
                assert_eq!(name.as_deref(), Some("Card"));
                assert!(in_place);
                assert!(config.is_none());
            }
            Commands::Check { .. } => panic!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn test_columns_count_characters() {
        let snapshot = Buffer::from_text("é\nconst a = <b />;\n").snapshot();
        let at = Caret {
            file: PathBuf::from("a.jsx"),
            line: 2,
            column: 12,
        };
        assert_eq!(at.offset(&snapshot).unwrap(), "é\nconst a = <".len());

        let at = Caret {
            file: PathBuf::from("a.jsx"),
            line: 0,
            column: 1,
        };
        assert!(at.offset(&snapshot).is_err());
    }
}
