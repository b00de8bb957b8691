//! Program manifest definitions and loading.
//!
//! A manifest describes a program grid in text: a legend maps short symbols to
//! colour triples and each row lists whitespace-separated symbols. Manifests
//! are loaded from YAML and schema-checked before a grid is built.

use std::path::Path;

use indexmap::IndexMap;
use palettette_vm::{Grid, GridError, Interpreter, Pixel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_VERSION: &str = "palettette/v1";
const KIND: &str = "Program";

/// Errors that can occur when loading or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read the manifest file.
    #[error("failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse the manifest YAML.
    #[error("failed to parse manifest YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("invalid apiVersion: expected '{API_VERSION}', got '{0}'")]
    InvalidApiVersion(String),

    #[error("invalid kind: expected '{KIND}', got '{0}'")]
    InvalidKind(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    /// A row referenced a symbol the legend does not define.
    #[error("row {row}, column {column}: unknown legend symbol '{symbol}'")]
    UnknownSymbol {
        row: usize,
        column: usize,
        symbol: String,
    },

    /// The rows did not form a valid grid.
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),
}

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// A painted program together with its input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramManifest {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ProgramMetadata,

    /// Symbol to colour triple, in declaration order.
    #[serde(default)]
    pub legend: IndexMap<String, [u8; 3]>,

    /// Grid rows, top to bottom, as whitespace-separated legend symbols.
    #[serde(default)]
    pub rows: Vec<String>,

    /// Characters supplied to `Input` instructions.
    #[serde(default)]
    pub input: String,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

/// Metadata for a program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramMetadata {
    /// Machine identifier for this program.
    pub name: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl ProgramManifest {
    /// Create an empty manifest with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ProgramMetadata {
                name: name.into(),
                title: None,
                description: None,
            },
            legend: IndexMap::new(),
            rows: Vec::new(),
            input: String::new(),
        }
    }

    /// Load a manifest from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ManifestResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a manifest from a YAML string.
    pub fn from_yaml(yaml: &str) -> ManifestResult<Self> {
        let manifest: ProgramManifest = serde_yaml::from_str(yaml)?;
        manifest.validate_schema()?;
        Ok(manifest)
    }

    fn validate_schema(&self) -> ManifestResult<()> {
        if self.api_version != API_VERSION {
            return Err(ManifestError::InvalidApiVersion(self.api_version.clone()));
        }
        if self.kind != KIND {
            return Err(ManifestError::InvalidKind(self.kind.clone()));
        }
        if self.metadata.name.is_empty() {
            return Err(ManifestError::MissingField("metadata.name".to_string()));
        }
        if self.rows.is_empty() {
            return Err(ManifestError::MissingField("rows".to_string()));
        }
        Ok(())
    }

    /// Add a legend entry. Returns `self` for chaining.
    pub fn with_symbol(mut self, symbol: impl Into<String>, rgb: [u8; 3]) -> Self {
        self.legend.insert(symbol.into(), rgb);
        self
    }

    /// Append a grid row. Returns `self` for chaining.
    pub fn with_row(mut self, row: impl Into<String>) -> Self {
        self.rows.push(row.into());
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    /// Resolve the legend symbols into a grid.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::UnknownSymbol`] for symbols missing from the
    /// legend, or [`ManifestError::Grid`] for empty or ragged rows.
    pub fn grid(&self) -> ManifestResult<Grid> {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(row, line)| {
                line.split_whitespace()
                    .enumerate()
                    .map(|(column, symbol)| {
                        self.legend
                            .get(symbol)
                            .map(|rgb| Pixel::from(*rgb))
                            .ok_or_else(|| ManifestError::UnknownSymbol {
                                row,
                                column,
                                symbol: symbol.to_string(),
                            })
                    })
                    .collect::<ManifestResult<Vec<_>>>()
            })
            .collect::<ManifestResult<Vec<_>>>()?;
        Ok(Grid::from_rows(rows)?)
    }

    /// Build an idle interpreter, optionally overriding the manifest input.
    pub fn interpreter(&self, input: Option<&str>) -> ManifestResult<Interpreter> {
        let grid = self.grid()?;
        Ok(Interpreter::new(grid, input.unwrap_or(&self.input)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HELLO: &str = r#"
apiVersion: palettette/v1
kind: Program
metadata:
  name: hello
  title: Prints H
legend:
  S: [1, 3, 100]
  D: [0, 0, 72]
  O: [8, 255, 100]
  ".": [255, 255, 255]
  H: [0, 0, 0]
rows:
  - "S D O H ."
"#;

    #[test]
    fn parses_and_builds_grid() {
        let manifest = ProgramManifest::from_yaml(HELLO).unwrap();
        assert_eq!(manifest.metadata.name, "hello");
        assert_eq!(manifest.legend.keys().next().map(String::as_str), Some("S"));

        let grid = manifest.grid().unwrap();
        assert_eq!((grid.width(), grid.height()), (5, 1));
        assert_eq!(
            grid.get(palettette_vm::Location::new(2, 0)),
            Pixel::new(8, 255, 100)
        );
    }

    #[test]
    fn rejects_wrong_schema() {
        let yaml = HELLO.replace("palettette/v1", "palettette/v0");
        assert!(matches!(
            ProgramManifest::from_yaml(&yaml),
            Err(ManifestError::InvalidApiVersion(v)) if v == "palettette/v0"
        ));

        let yaml = HELLO.replace("kind: Program", "kind: Scenario");
        assert!(matches!(
            ProgramManifest::from_yaml(&yaml),
            Err(ManifestError::InvalidKind(_))
        ));

        let yaml = HELLO.replace("name: hello", "name: \"\"");
        assert!(matches!(
            ProgramManifest::from_yaml(&yaml),
            Err(ManifestError::MissingField(field)) if field == "metadata.name"
        ));
    }

    #[test]
    fn unknown_symbol_is_located() {
        let manifest = ProgramManifest::new("bad")
            .with_symbol(".", [255, 255, 255])
            .with_row(". .")
            .with_row(". ?");
        match manifest.grid() {
            Err(ManifestError::UnknownSymbol {
                row,
                column,
                symbol,
            }) => {
                assert_eq!((row, column), (1, 1));
                assert_eq!(symbol, "?");
            }
            other => panic!("expected unknown symbol, got {other:?}"),
        }
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let manifest = ProgramManifest::new("ragged")
            .with_symbol(".", [255, 255, 255])
            .with_row(". .")
            .with_row(".");
        assert!(matches!(
            manifest.grid(),
            Err(ManifestError::Grid(GridError::RaggedRow { row: 1, .. }))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(HELLO.as_bytes()).unwrap();
        let manifest = ProgramManifest::load(file.path()).unwrap();
        assert_eq!(manifest.rows.len(), 1);
    }

    #[test]
    fn input_override_wins() {
        let manifest = ProgramManifest::from_yaml(HELLO)
            .unwrap()
            .with_input("abc");
        let vm = manifest.interpreter(Some("z")).unwrap();
        assert_eq!(vm.state().input.remaining(), 1);
        let vm = manifest.interpreter(None).unwrap();
        assert_eq!(vm.state().input.remaining(), 3);
    }
}
