//! Persisted mapping store: raw header text -> column id, raw sheet name ->
//! canonical sheet name
//!
//! The store is the single source of truth across runs. It only grows:
//! existing entries are never silently overwritten.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk shape of the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    header_mappings: BTreeMap<String, String>,
    #[serde(default)]
    sheet_name_mappings: BTreeMap<String, String>,
}

/// Mapping store with an explicit load/save lifecycle
#[derive(Debug, Default)]
pub struct MappingStore {
    path: Option<PathBuf>,
    header_mappings: BTreeMap<String, String>,
    sheet_name_mappings: BTreeMap<String, String>,
    /// Raw texts seen this run with no mapping, plus suggestions, for the
    /// mapping report
    unrecognized: Vec<String>,
    dirty: bool,
}

impl MappingStore {
    /// An empty, unpersisted store
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store from a JSON file; a missing file yields a seeded
    /// default store bound to that path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read mapping store: {}", path.display()))?;
            serde_json::from_str::<StoreFile>(&content)
                .with_context(|| format!("Invalid mapping store JSON: {}", path.display()))?
        } else {
            Self::seeded_defaults()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            header_mappings: file.header_mappings,
            sheet_name_mappings: file.sheet_name_mappings,
            unrecognized: Vec::new(),
            dirty: !path.exists(),
        })
    }

    /// Write the store back to its file when anything was added
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        let file = StoreFile {
            header_mappings: self.header_mappings.clone(),
            sheet_name_mappings: self.sheet_name_mappings.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write mapping store: {}", path.display()))?;
        self.dirty = false;
        Ok(())
    }

    fn seeded_defaults() -> StoreFile {
        let mut sheet_name_mappings = BTreeMap::new();
        sheet_name_mappings.insert("INV".to_string(), "Invoice".to_string());
        sheet_name_mappings.insert("PAK".to_string(), "Packing list".to_string());
        sheet_name_mappings.insert("CON".to_string(), "Contract".to_string());
        StoreFile {
            header_mappings: BTreeMap::new(),
            sheet_name_mappings,
        }
    }

    pub fn header_id(&self, raw: &str) -> Option<&str> {
        self.header_mappings.get(raw).map(String::as_str)
    }

    pub fn canonical_sheet(&self, raw: &str) -> Option<&str> {
        self.sheet_name_mappings.get(raw).map(String::as_str)
    }

    /// Case-insensitive sheet lookup, used as fallback after exact match
    pub fn canonical_sheet_ci(&self, raw: &str) -> Option<&str> {
        self.sheet_name_mappings
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(raw))
            .map(|(_, v)| v.as_str())
    }

    /// Add a header mapping; existing entries win
    pub fn add_header_mapping(&mut self, raw: &str, column_id: &str) {
        if !self.header_mappings.contains_key(raw) {
            self.header_mappings
                .insert(raw.to_string(), column_id.to_string());
            self.dirty = true;
        }
    }

    /// Add a sheet name mapping; existing entries win
    pub fn add_sheet_mapping(&mut self, raw: &str, canonical: &str) {
        if !self.sheet_name_mappings.contains_key(raw) {
            self.sheet_name_mappings
                .insert(raw.to_string(), canonical.to_string());
            self.dirty = true;
        }
    }

    pub fn header_mappings(&self) -> &BTreeMap<String, String> {
        &self.header_mappings
    }

    pub fn sheet_name_mappings(&self) -> &BTreeMap<String, String> {
        &self.sheet_name_mappings
    }

    /// Normalized store entries for fuzzy matching, raw text preserved
    pub fn normalized_header_entries(&self) -> Vec<(String, &str, &str)> {
        self.header_mappings
            .iter()
            .map(|(raw, id)| (super::matcher::normalize_header(raw), raw.as_str(), id.as_str()))
            .collect()
    }

    pub fn note_unrecognized(&mut self, note: impl Into<String>) {
        self.unrecognized.push(note.into());
    }

    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
