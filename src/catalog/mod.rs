//! The shot catalog.
//!
//! Shots are immutable records loaded once at startup, either from the catalog
//! embedded at build time or from a JSON file named by `DAILYSHOT_CATALOG`. The
//! catalog is read-only for the lifetime of the process.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Catalog compiled into the binary.
const EMBEDDED_CATALOG: &str = include_str!("../../data/shots.json");

/// A single shot: a punchline paired with a scripture reference and its verse.
///
/// The JSON field names match the persisted day-cache snapshots, so a cached
/// record decodes back into the same value.
///
/// # Examples
///
/// ```
/// use dailyshot::catalog::ShotRecord;
///
/// let json = r#"{"id":7,"reference":"Psalm 46:10","verseText":"Be still.","punchline":"Breathe."}"#;
/// let shot: ShotRecord = serde_json::from_str(json).unwrap();
/// assert_eq!(shot.id, 7);
/// assert_eq!(shot.verse_text, "Be still.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotRecord {
    /// Unique id, stable across runs.
    pub id: u32,
    /// Scripture reference, e.g. "Psalm 23:1".
    pub reference: String,
    /// The verse itself.
    pub verse_text: String,
    /// The short line shown under the verse.
    pub punchline: String,
}

/// The fixed, ordered list of shots available to the selector.
#[derive(Debug, Clone)]
pub struct Catalog {
    shots: Vec<ShotRecord>,
}

impl Catalog {
    /// Builds a catalog from records, rejecting duplicate ids.
    ///
    /// An empty list is accepted; selection on an empty catalog yields no shot.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Catalog` if two records share an id.
    pub fn new(shots: Vec<ShotRecord>) -> AppResult<Self> {
        let mut seen = HashSet::with_capacity(shots.len());
        for shot in &shots {
            if !seen.insert(shot.id) {
                return Err(AppError::Catalog(format!(
                    "Duplicate shot id {} ({})",
                    shot.id, shot.reference
                )));
            }
        }
        Ok(Catalog { shots })
    }

    /// Parses a JSON array of shot records.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Catalog` if the text is not a valid catalog or has
    /// duplicate ids.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let shots: Vec<ShotRecord> = serde_json::from_str(json)
            .map_err(|e| AppError::Catalog(format!("Invalid catalog JSON: {}", e)))?;
        Self::new(shots)
    }

    /// Loads the catalog compiled into the binary.
    pub fn embedded() -> AppResult<Self> {
        let catalog = Self::from_json(EMBEDDED_CATALOG)?;
        debug!("Loaded embedded catalog with {} shots", catalog.len());
        Ok(catalog)
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be read and `AppError::Catalog`
    /// if its contents are invalid.
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read catalog {}: {}", path.display(), e),
            ))
        })?;
        let catalog = Self::from_json(&contents)?;
        info!("Loaded catalog override with {} shots", catalog.len());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    pub fn shots(&self) -> &[ShotRecord] {
        &self.shots
    }

    pub fn get(&self, id: u32) -> Option<&ShotRecord> {
        self.shots.iter().find(|shot| shot.id == id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }
}
