//! Tile layers, placed objects and the map that owns them
//!
//! Everything here is plain data populated by the load path. The migration
//! engine in `persistence::migration` is the only code that restructures it.

pub mod game_map;
pub mod object;
pub mod tile;

pub use game_map::GameMap;
pub use object::{CookingStove, Fridge, ObjectKind, PlacedObject};
pub use tile::Tile;
