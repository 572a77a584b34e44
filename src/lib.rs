//! Map Migrator - versioned structural upgrades for tile-based world maps
//!
//! Core modules:
//! - `map`: Tile layers, placed objects and the map that owns them
//! - `persistence`: Map documents on disk and the migration engine
//! - `settings`: Injected format version, cell size and chaining policy

pub mod map;
pub mod persistence;
pub mod settings;

pub use map::{CookingStove, Fridge, GameMap, ObjectKind, Tile};
pub use persistence::migration::{MapMigrator, MigrationReport};
pub use settings::{ChainPolicy, MigrationSettings};

use glam::IVec2;

/// Data format constants
pub mod consts {
    /// Format version the running build expects its maps to be migrated to
    pub const CURRENT_GAME_VERSION: &str = "1.4.2";

    /// Edge length of one map cell in pixels
    pub const CELL_SIZE: i32 = 64;

    /// Legacy tile ids that encoded a cooking stove (one per orientation)
    pub const COOKING_STOVE_TILE_IDS: [u32; 4] = [154, 155, 156, 157];
    /// Legacy tile id that encoded a fridge
    pub const FRIDGE_TILE_ID: u32 = 137;
    /// Chair tiles that belong on the ground layer
    pub const CHAIR_TILE_IDS: [u32; 4] = [18, 19, 20, 21];
}

/// Convert a tile coordinate to its pixel position, `None` on overflow
#[inline]
pub fn tile_to_pixel(x: i32, y: i32, cell_size: i32) -> Option<IVec2> {
    Some(IVec2::new(
        x.checked_mul(cell_size)?,
        y.checked_mul(cell_size)?,
    ))
}
