//! Placed interactive objects
//!
//! Each kind lives in its own registry on the map. Positions are in pixel
//! space and no two objects of the same kind may share a position.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::game_map::GameMap;

/// Object kinds that have a registry on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    CookingStove,
    Fridge,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 2] = [ObjectKind::CookingStove, ObjectKind::Fridge];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::CookingStove => "cooking stove",
            ObjectKind::Fridge => "fridge",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An object kind with a registry on [`GameMap`]
///
/// Lets one generic promotion step serve every kind: it only needs to know
/// where the registry lives, how to build a default object from a legacy
/// tile, and how to reconcile an existing object with that tile.
pub trait PlacedObject: Sized {
    const KIND: ObjectKind;

    /// Kind-default object at `position`, built from the legacy tile id
    fn from_tile(position: IVec2, tile_id: u32) -> Self;

    fn position(&self) -> IVec2;

    /// Apply incidental corrections from the tile encoding this object.
    /// Returns true if anything changed.
    fn refresh_from_tile(&mut self, _tile_id: u32) -> bool {
        false
    }

    fn registry(map: &GameMap) -> Option<&Vec<Self>>;

    fn registry_mut(map: &mut GameMap) -> &mut Option<Vec<Self>>;
}

/// A cooking stove
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookingStove {
    /// Top-left corner in pixels
    pub position: IVec2,
    /// Tile id used for the sprite (encodes orientation)
    pub tile_id: u32,
    /// Recipe currently cooking, if any
    #[serde(default)]
    pub cooking: Option<String>,
}

impl CookingStove {
    pub fn new(position: IVec2, tile_id: u32) -> Self {
        Self {
            position,
            tile_id,
            cooking: None,
        }
    }
}

impl PlacedObject for CookingStove {
    const KIND: ObjectKind = ObjectKind::CookingStove;

    fn from_tile(position: IVec2, tile_id: u32) -> Self {
        Self::new(position, tile_id)
    }

    fn position(&self) -> IVec2 {
        self.position
    }

    fn refresh_from_tile(&mut self, tile_id: u32) -> bool {
        let changed = self.tile_id != tile_id;
        self.tile_id = tile_id;
        changed
    }

    fn registry(map: &GameMap) -> Option<&Vec<Self>> {
        map.cooking_stoves.as_ref()
    }

    fn registry_mut(map: &mut GameMap) -> &mut Option<Vec<Self>> {
        &mut map.cooking_stoves
    }
}

/// A fridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fridge {
    /// Top-left corner in pixels
    pub position: IVec2,
    /// Stored item names
    #[serde(default)]
    pub contents: Vec<String>,
}

impl Fridge {
    pub fn new(position: IVec2) -> Self {
        Self {
            position,
            contents: Vec::new(),
        }
    }
}

impl PlacedObject for Fridge {
    const KIND: ObjectKind = ObjectKind::Fridge;

    fn from_tile(position: IVec2, _tile_id: u32) -> Self {
        Self::new(position)
    }

    fn position(&self) -> IVec2 {
        self.position
    }

    fn registry(map: &GameMap) -> Option<&Vec<Self>> {
        map.fridges.as_ref()
    }

    fn registry_mut(map: &mut GameMap) -> &mut Option<Vec<Self>> {
        &mut map.fridges
    }
}
