//! Level catalogs loaded from TOML or JSON files.

use crate::level::{LevelDefinition, LevelError, LevelErrorKind, LevelKind, LevelRecord};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// An ordered collection of raw level records.
///
/// Records are validated lazily: [`LevelCatalog::level`] validates one,
/// [`LevelCatalog::validate_all`] checks every record and reports per level.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelCatalog {
    #[serde(default)]
    levels: Vec<LevelRecord>,
}

/// Validation result for one catalog entry.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct LevelReport {
    /// Position in the catalog.
    index: usize,
    /// Number of tubes listed in the record.
    tube_count: usize,
    /// Level kind when valid, the first problem found otherwise.
    outcome: Result<LevelKind, LevelError>,
}

impl LevelReport {
    /// True when the level validated cleanly.
    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl LevelCatalog {
    /// Creates a catalog from records already in memory.
    pub fn new(levels: Vec<LevelRecord>) -> Self {
        Self { levels }
    }

    /// Loads a catalog, choosing the parser from the file extension.
    ///
    /// # Errors
    ///
    /// Returns a [`LevelError`] if the file cannot be read, has an unknown
    /// extension, or does not parse.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        debug!("Loading level catalog");

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let content = std::fs::read_to_string(path)
            .map_err(|e| LevelError::new(LevelErrorKind::Io(e.to_string())))?;

        let catalog = match extension.as_str() {
            "toml" => Self::from_toml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => {
                warn!(extension = other, "Unsupported level file extension");
                return Err(LevelErrorKind::UnsupportedFormat(other.to_string()).into());
            }
        };

        info!(levels = catalog.len(), "Level catalog loaded");
        Ok(catalog)
    }

    /// Parses a catalog from TOML (`[[levels]]` tables).
    ///
    /// # Errors
    ///
    /// Returns [`LevelErrorKind::Parse`] on malformed input.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, LevelError> {
        toml::from_str(content).map_err(|e| LevelError::new(LevelErrorKind::Parse(e.to_string())))
    }

    /// Parses a catalog from JSON (`{"levels": [...]}`).
    ///
    /// # Errors
    ///
    /// Returns [`LevelErrorKind::Parse`] on malformed input.
    #[instrument(skip(content))]
    pub fn from_json_str(content: &str) -> Result<Self, LevelError> {
        serde_json::from_str(content)
            .map_err(|e| LevelError::new(LevelErrorKind::Parse(e.to_string())))
    }

    /// Serializes the catalog as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`LevelErrorKind::Parse`] if a record cannot be represented.
    pub fn to_toml_string(&self) -> Result<String, LevelError> {
        toml::to_string_pretty(self)
            .map_err(|e| LevelError::new(LevelErrorKind::Parse(e.to_string())))
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True when the catalog has no levels.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Raw records, unvalidated.
    pub fn records(&self) -> &[LevelRecord] {
        &self.levels
    }

    /// Validates and returns the level at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`LevelErrorKind::LevelIndexOutOfRange`] for a missing level,
    /// or the validation error for a malformed one.
    #[instrument(skip(self))]
    pub fn level(&self, index: usize) -> Result<LevelDefinition, LevelError> {
        let record = self.levels.get(index).ok_or_else(|| {
            LevelError::new(LevelErrorKind::LevelIndexOutOfRange {
                index,
                count: self.levels.len(),
            })
        })?;
        LevelDefinition::from_record(record.clone())
    }

    /// Validates every level, reporting each one.
    #[instrument(skip(self), fields(levels = self.levels.len()))]
    pub fn validate_all(&self) -> Vec<LevelReport> {
        self.levels
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let outcome = LevelDefinition::from_record(record.clone())
                    .map(|level| level.level_type().kind());
                if let Err(e) = &outcome {
                    warn!(index, error = %e, "Invalid level");
                }
                LevelReport {
                    index,
                    tube_count: record.tubes.len(),
                    outcome,
                }
            })
            .collect()
    }
}
