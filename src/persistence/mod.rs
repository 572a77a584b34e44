//! Map persistence and versioned migration
//!
//! Features:
//! - JSON map documents (the command-line front end's input/output)
//! - Version gate with configurable chaining policy
//! - Idempotent migration steps that reconcile legacy tile encodings
//!   with first-class object registries

pub mod error;
pub mod migration;

pub use error::{PersistenceError, Result};

use std::fs;
use std::path::Path;

use crate::map::GameMap;

/// Parse a map document
pub fn map_from_json(json: &str) -> Result<GameMap> {
    Ok(serde_json::from_str(json)?)
}

/// Serialize a map document (pretty-printed)
pub fn map_to_json(map: &GameMap) -> Result<String> {
    Ok(serde_json::to_string_pretty(map)?)
}

/// Read a map document from disk
pub fn load_map(path: &Path) -> Result<GameMap> {
    let json = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
    let map = map_from_json(&json)?;
    log::info!(
        "Loaded map '{}' from {} ({} tiles on {} layers)",
        map.name,
        path.display(),
        map.tile_count(),
        map.layers.len()
    );
    Ok(map)
}

/// Write a map document to disk, replacing any existing file
pub fn save_map(map: &GameMap, path: &Path) -> Result<()> {
    let json = map_to_json(map)?;
    fs::write(path, json).map_err(|e| PersistenceError::io(path, e))?;
    log::info!("Map '{}' saved to {}", map.name, path.display());
    Ok(())
}
