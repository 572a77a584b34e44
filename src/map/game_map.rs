//! The map: tile layers plus per-kind object registries

use std::collections::BTreeMap;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::object::{CookingStove, Fridge, ObjectKind, PlacedObject};
use super::tile::Tile;

/// A loaded map
///
/// Layers are keyed by index (1..N) and any of them may be missing.
/// Registries start out absent for maps saved before the kind existed; once
/// created they stay present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    pub name: String,
    #[serde(default)]
    pub layers: BTreeMap<u32, Vec<Tile>>,
    #[serde(default)]
    pub cooking_stoves: Option<Vec<CookingStove>>,
    #[serde(default)]
    pub fridges: Option<Vec<Fridge>>,
}

impl GameMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn tiles_on_layer(&self, layer: u32) -> Option<&Vec<Tile>> {
        self.layers.get(&layer)
    }

    pub fn tiles_on_layer_mut(&mut self, layer: u32) -> Option<&mut Vec<Tile>> {
        self.layers.get_mut(&layer)
    }

    /// Layer sequence, created empty if missing
    pub fn layer_or_insert(&mut self, layer: u32) -> &mut Vec<Tile> {
        self.layers.entry(layer).or_default()
    }

    /// Append a tile to the layer named by `tile.layer`
    pub fn add_tile(&mut self, tile: Tile) {
        self.layer_or_insert(tile.layer).push(tile);
    }

    /// Total tiles across all layers
    pub fn tile_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    pub fn cooking_stoves(&self) -> &[CookingStove] {
        self.cooking_stoves.as_deref().unwrap_or_default()
    }

    pub fn fridges(&self) -> &[Fridge] {
        self.fridges.as_deref().unwrap_or_default()
    }

    /// Number of objects of `kind` (0 when the registry is absent)
    pub fn object_count(&self, kind: ObjectKind) -> usize {
        match kind {
            ObjectKind::CookingStove => self.cooking_stoves().len(),
            ObjectKind::Fridge => self.fridges().len(),
        }
    }

    /// Append an object to its kind's registry, creating the registry if needed
    pub fn add_object<T: PlacedObject>(&mut self, object: T) {
        T::registry_mut(self).get_or_insert_with(Vec::new).push(object);
    }

    /// Object of kind `T` at exactly `position`
    pub fn object_at<T: PlacedObject>(&self, position: IVec2) -> Option<&T> {
        T::registry(self)?.iter().find(|o| o.position() == position)
    }
}
