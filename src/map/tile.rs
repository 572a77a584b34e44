//! Persisted grid cells

use std::collections::BTreeSet;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::tile_to_pixel;

/// A single cell of persisted grid data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Column in tile units
    pub x: i32,
    /// Row in tile units
    pub y: i32,
    /// Layer this tile belongs to (matches the key of the sequence holding it)
    pub layer: u32,
    /// Tile type id
    pub id: u32,
    /// Terrain/decoration tile. Non-regular tiles are legacy object markers
    /// whose `id` encodes the object kind.
    pub regular: bool,
}

impl Tile {
    /// Regular terrain or decoration tile
    pub fn terrain(x: i32, y: i32, layer: u32, id: u32) -> Self {
        Self {
            x,
            y,
            layer,
            id,
            regular: true,
        }
    }

    /// Non-regular tile, as legacy saves used to mark an interactive object
    pub fn special(x: i32, y: i32, layer: u32, id: u32) -> Self {
        Self {
            x,
            y,
            layer,
            id,
            regular: false,
        }
    }

    /// Top-left corner of this tile in pixel space, `None` if it does not
    /// fit in `i32`
    pub fn pixel_position(&self, cell_size: i32) -> Option<IVec2> {
        tile_to_pixel(self.x, self.y, cell_size)
    }

    /// Whether this tile is a legacy object marker with one of `ids`
    pub fn encodes(&self, ids: &BTreeSet<u32>) -> bool {
        !self.regular && ids.contains(&self.id)
    }
}
