//! Individual migration steps
//!
//! Every step tolerates missing layers and registries and is safe to run
//! again on a map it already migrated.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::map::{CookingStove, Fridge, GameMap, ObjectKind, PlacedObject, Tile};

use super::report::StepOutcome;

/// Promote legacy object tiles of one kind into that kind's registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoteSpec {
    pub kind: ObjectKind,
    /// Layers to scan, in order
    pub source_layers: Vec<u32>,
    /// Tile ids that encode this kind
    pub tile_ids: BTreeSet<u32>,
}

/// Move regular tiles with the given ids from one layer to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReclassifySpec {
    /// What the tiles are, for logs ("chairs")
    pub label: String,
    pub source_layer: u32,
    pub dest_layer: u32,
    pub tile_ids: BTreeSet<u32>,
}

/// A single structural change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationStep {
    EnsureRegistry(ObjectKind),
    Promote(PromoteSpec),
    Reclassify(ReclassifySpec),
}

impl MigrationStep {
    pub fn promote(
        kind: ObjectKind,
        source_layers: impl IntoIterator<Item = u32>,
        tile_ids: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self::Promote(PromoteSpec {
            kind,
            source_layers: source_layers.into_iter().collect(),
            tile_ids: tile_ids.into_iter().collect(),
        })
    }

    pub fn reclassify(
        label: impl Into<String>,
        source_layer: u32,
        dest_layer: u32,
        tile_ids: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self::Reclassify(ReclassifySpec {
            label: label.into(),
            source_layer,
            dest_layer,
            tile_ids: tile_ids.into_iter().collect(),
        })
    }

    /// Position in a batch's run order: registries, then promotions, then
    /// layer moves
    pub fn phase(&self) -> u8 {
        match self {
            MigrationStep::EnsureRegistry(_) => 0,
            MigrationStep::Promote(_) => 1,
            MigrationStep::Reclassify(_) => 2,
        }
    }

    pub fn apply(&self, map: &mut GameMap, cell_size: i32) -> StepOutcome {
        match self {
            MigrationStep::EnsureRegistry(kind) => ensure_registry(map, *kind),
            MigrationStep::Promote(spec) => match spec.kind {
                ObjectKind::CookingStove => {
                    promote::<CookingStove>(map, &spec.source_layers, &spec.tile_ids, cell_size)
                }
                ObjectKind::Fridge => {
                    promote::<Fridge>(map, &spec.source_layers, &spec.tile_ids, cell_size)
                }
            },
            MigrationStep::Reclassify(spec) => {
                reclassify(map, spec.source_layer, spec.dest_layer, &spec.tile_ids)
            }
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationStep::EnsureRegistry(kind) => write!(f, "ensure {} registry", kind),
            MigrationStep::Promote(spec) => {
                write!(f, "promote {} tiles from layers {:?}", spec.kind, spec.source_layers)
            }
            MigrationStep::Reclassify(spec) => write!(
                f,
                "move {} from layer {} to layer {}",
                spec.label, spec.source_layer, spec.dest_layer
            ),
        }
    }
}

/// Create the registry for `kind` if the map has none
pub fn ensure_registry(map: &mut GameMap, kind: ObjectKind) -> StepOutcome {
    let created = match kind {
        ObjectKind::CookingStove => create_if_absent(&mut map.cooking_stoves),
        ObjectKind::Fridge => create_if_absent(&mut map.fridges),
    };
    if created {
        log::info!("Creating {} list", kind);
        StepOutcome::RegistryCreated(kind)
    } else {
        StepOutcome::RegistryPresent(kind)
    }
}

fn create_if_absent<T>(registry: &mut Option<Vec<T>>) -> bool {
    if registry.is_some() {
        return false;
    }
    *registry = Some(Vec::new());
    true
}

/// Reconcile legacy object tiles on `source_layers` with the registry for `T`
///
/// Each non-regular tile whose id is in `tile_ids` must end up with exactly
/// one object at its pixel position. An object already there is kept and
/// refreshed from the tile; otherwise a default object is appended.
pub fn promote<T: PlacedObject>(
    map: &mut GameMap,
    source_layers: &[u32],
    tile_ids: &BTreeSet<u32>,
    cell_size: i32,
) -> StepOutcome {
    let present: Vec<u32> = source_layers
        .iter()
        .copied()
        .filter(|layer| map.tiles_on_layer(*layer).is_some())
        .collect();
    if present.is_empty() {
        log::debug!("No {} tiles to migrate: layers {:?} absent", T::KIND, source_layers);
        return StepOutcome::skipped(format!("layers {:?} absent", source_layers));
    }

    // one tile per position; the last one in scan order wins
    let mut tiles: Vec<Tile> = Vec::new();
    let mut slots: BTreeMap<(i32, i32), usize> = BTreeMap::new();
    for tile in present
        .iter()
        .filter_map(|layer| map.tiles_on_layer(*layer))
        .flatten()
        .filter(|t| t.encodes(tile_ids))
    {
        match slots.get(&(tile.x, tile.y)) {
            Some(&slot) => tiles[slot] = *tile,
            None => {
                slots.insert((tile.x, tile.y), tiles.len());
                tiles.push(*tile);
            }
        }
    }

    let (mut created, mut matched, mut refreshed) = (0, 0, 0);
    for tile in tiles {
        let Some(position) = tile.pixel_position(cell_size) else {
            log::warn!(
                "Skipping {} tile at ({}, {}): pixel position out of range",
                T::KIND,
                tile.x,
                tile.y
            );
            continue;
        };
        let existing = T::registry_mut(map)
            .as_mut()
            .and_then(|objects| objects.iter_mut().find(|o| o.position() == position));

        match existing {
            Some(object) => {
                matched += 1;
                if object.refresh_from_tile(tile.id) {
                    refreshed += 1;
                }
            }
            None => {
                log::info!("Migrating {} at ({}, {})", T::KIND, position.x, position.y);
                map.add_object(T::from_tile(position, tile.id));
                created += 1;
            }
        }
    }

    StepOutcome::Promoted {
        kind: T::KIND,
        created,
        matched,
        refreshed,
    }
}

/// Move regular tiles with ids in `tile_ids` from `source` to `dest`
///
/// Remaining source tiles keep their order; moved tiles are appended to the
/// destination in their original relative order.
pub fn reclassify(
    map: &mut GameMap,
    source: u32,
    dest: u32,
    tile_ids: &BTreeSet<u32>,
) -> StepOutcome {
    if source == dest {
        return StepOutcome::skipped(format!("source and destination are both layer {}", source));
    }
    let Some(source_tiles) = map.tiles_on_layer_mut(source) else {
        log::debug!("Nothing to reclassify: layer {} absent", source);
        return StepOutcome::skipped(format!("layer {} absent", source));
    };

    let (mut moving, remaining): (Vec<Tile>, Vec<Tile>) = std::mem::take(source_tiles)
        .into_iter()
        .partition(|t| t.regular && tile_ids.contains(&t.id));
    *source_tiles = remaining;

    let moved = moving.len();
    if moved > 0 {
        log::info!("Moving {} tiles from layer {} to layer {}", moved, source, dest);
        for tile in &mut moving {
            tile.layer = dest;
        }
        map.layer_or_insert(dest).append(&mut moving);
    }

    StepOutcome::Reclassified {
        source,
        dest,
        moved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CELL_SIZE, CHAIR_TILE_IDS, COOKING_STOVE_TILE_IDS, FRIDGE_TILE_ID};
    use glam::IVec2;

    fn stove_ids() -> BTreeSet<u32> {
        COOKING_STOVE_TILE_IDS.into_iter().collect()
    }

    #[test]
    fn test_promote_creates_missing_stove() {
        let mut map = GameMap::new("kitchen");
        map.add_tile(Tile::special(2, 4, 3, 154));

        let outcome = promote::<CookingStove>(&mut map, &[3, 2], &stove_ids(), CELL_SIZE);

        assert_eq!(
            outcome,
            StepOutcome::Promoted {
                kind: ObjectKind::CookingStove,
                created: 1,
                matched: 0,
                refreshed: 0,
            }
        );
        assert_eq!(map.cooking_stoves(), &[CookingStove::new(IVec2::new(128, 256), 154)]);
    }

    #[test]
    fn test_promote_refreshes_existing_stove() {
        let mut map = GameMap::new("kitchen");
        map.add_tile(Tile::special(2, 4, 3, 156));
        map.add_object(CookingStove::new(IVec2::new(128, 256), 154));

        let outcome = promote::<CookingStove>(&mut map, &[3, 2], &stove_ids(), CELL_SIZE);

        assert!(outcome.changed());
        assert_eq!(map.cooking_stoves().len(), 1);
        assert_eq!(map.cooking_stoves()[0].tile_id, 156);
    }

    #[test]
    fn test_promote_same_position_on_two_layers_creates_one() {
        let mut map = GameMap::new("kitchen");
        map.add_tile(Tile::special(5, 5, 3, 154));
        map.add_tile(Tile::special(5, 5, 2, 157));

        promote::<CookingStove>(&mut map, &[3, 2], &stove_ids(), CELL_SIZE);

        assert_eq!(map.cooking_stoves().len(), 1);
        // later layers in scan order win the refresh
        assert_eq!(map.cooking_stoves()[0].tile_id, 157);
    }

    #[test]
    fn test_promote_ignores_regular_and_unknown_tiles() {
        let mut map = GameMap::new("kitchen");
        map.add_tile(Tile::terrain(1, 1, 2, FRIDGE_TILE_ID));
        map.add_tile(Tile::special(2, 2, 2, 999));
        map.add_tile(Tile::special(3, 3, 1, FRIDGE_TILE_ID));

        let outcome = promote::<Fridge>(&mut map, &[2], &BTreeSet::from([FRIDGE_TILE_ID]), CELL_SIZE);

        assert!(!outcome.changed());
        assert!(map.fridges.is_none());
    }

    #[test]
    fn test_promote_absent_layers_skips() {
        let mut map = GameMap::new("empty");
        let outcome = promote::<Fridge>(&mut map, &[2], &BTreeSet::from([FRIDGE_TILE_ID]), CELL_SIZE);
        assert!(matches!(outcome, StepOutcome::Skipped { .. }));
        assert_eq!(map, GameMap::new("empty"));
    }

    #[test]
    fn test_promote_scans_remaining_layers_when_first_absent() {
        let mut map = GameMap::new("kitchen");
        map.add_tile(Tile::special(0, 1, 2, 155));

        promote::<CookingStove>(&mut map, &[3, 2], &stove_ids(), CELL_SIZE);

        assert_eq!(map.cooking_stoves().len(), 1);
        assert_eq!(map.cooking_stoves()[0].position, IVec2::new(0, 64));
    }

    #[test]
    fn test_promote_skips_tiles_outside_pixel_range() {
        let mut map = GameMap::new("far");
        map.add_tile(Tile::special(40_000_000, 0, 3, 154));
        map.add_tile(Tile::special(1, 1, 3, 155));

        let outcome = promote::<CookingStove>(&mut map, &[3, 2], &stove_ids(), CELL_SIZE);

        assert_eq!(
            outcome,
            StepOutcome::Promoted {
                kind: ObjectKind::CookingStove,
                created: 1,
                matched: 0,
                refreshed: 0,
            }
        );
        assert_eq!(map.cooking_stoves(), &[CookingStove::new(IVec2::new(64, 64), 155)]);
    }

    #[test]
    fn test_promote_fridge_twice_is_noop() {
        let mut map = GameMap::new("kitchen");
        map.add_tile(Tile::special(1, 2, 2, FRIDGE_TILE_ID));
        map.add_tile(Tile::special(4, 2, 2, FRIDGE_TILE_ID));
        let ids = BTreeSet::from([FRIDGE_TILE_ID]);

        promote::<Fridge>(&mut map, &[2], &ids, CELL_SIZE);
        let snapshot = map.clone();
        let outcome = promote::<Fridge>(&mut map, &[2], &ids, CELL_SIZE);

        assert_eq!(map, snapshot);
        assert_eq!(map.fridges().len(), 2);
        assert!(!outcome.changed());
    }

    #[test]
    fn test_reclassify_moves_chairs() {
        let mut map = GameMap::new("house");
        map.add_tile(Tile::terrain(0, 0, 1, 1));
        for (i, id) in CHAIR_TILE_IDS.iter().enumerate() {
            map.add_tile(Tile::terrain(i as i32, 3, 2, *id));
        }
        map.add_tile(Tile::terrain(9, 9, 2, 40));

        let outcome = reclassify(&mut map, 2, 1, &CHAIR_TILE_IDS.into_iter().collect());

        assert_eq!(
            outcome,
            StepOutcome::Reclassified {
                source: 2,
                dest: 1,
                moved: 4
            }
        );
        assert_eq!(map.tiles_on_layer(2).unwrap(), &vec![Tile::terrain(9, 9, 2, 40)]);
        let ground = map.tiles_on_layer(1).unwrap();
        assert_eq!(ground.len(), 5);
        assert!(ground[1..].iter().all(|t| t.layer == 1));
        let ids: Vec<u32> = ground[1..].iter().map(|t| t.id).collect();
        assert_eq!(ids, CHAIR_TILE_IDS.to_vec());
    }

    #[test]
    fn test_reclassify_leaves_special_tiles() {
        let mut map = GameMap::new("house");
        map.add_tile(Tile::special(0, 0, 2, 18));

        let outcome = reclassify(&mut map, 2, 1, &BTreeSet::from([18]));

        assert!(!outcome.changed());
        assert_eq!(map.tiles_on_layer(2).map(Vec::len), Some(1));
        assert!(map.tiles_on_layer(1).is_none());
    }

    #[test]
    fn test_reclassify_creates_destination_layer() {
        let mut map = GameMap::new("house");
        map.add_tile(Tile::terrain(0, 0, 2, 19));

        reclassify(&mut map, 2, 1, &BTreeSet::from([19]));

        assert_eq!(map.tiles_on_layer(1).unwrap(), &vec![Tile::terrain(0, 0, 1, 19)]);
        assert!(map.tiles_on_layer(2).unwrap().is_empty());
    }

    #[test]
    fn test_reclassify_same_layer_skips() {
        let mut map = GameMap::new("house");
        map.add_tile(Tile::terrain(0, 0, 2, 19));
        map.add_tile(Tile::terrain(1, 0, 2, 7));
        let before = map.clone();

        let outcome = reclassify(&mut map, 2, 2, &BTreeSet::from([19]));

        assert!(matches!(outcome, StepOutcome::Skipped { .. }));
        assert_eq!(map, before);
    }

    #[test]
    fn test_ensure_registry() {
        let mut map = GameMap::new("house");
        assert_eq!(
            ensure_registry(&mut map, ObjectKind::Fridge),
            StepOutcome::RegistryCreated(ObjectKind::Fridge)
        );
        assert_eq!(map.fridges, Some(Vec::new()));

        map.add_object(Fridge::new(IVec2::ZERO));
        assert_eq!(
            ensure_registry(&mut map, ObjectKind::Fridge),
            StepOutcome::RegistryPresent(ObjectKind::Fridge)
        );
        assert_eq!(map.fridges().len(), 1);
    }

    #[test]
    fn test_step_phases_and_display() {
        let ensure = MigrationStep::EnsureRegistry(ObjectKind::Fridge);
        let promote = MigrationStep::promote(ObjectKind::CookingStove, [3, 2], COOKING_STOVE_TILE_IDS);
        let chairs = MigrationStep::reclassify("chairs", 2, 1, CHAIR_TILE_IDS);
        assert!(ensure.phase() < promote.phase());
        assert!(promote.phase() < chairs.phase());
        assert_eq!(chairs.to_string(), "move chairs from layer 2 to layer 1");
        assert_eq!(ensure.to_string(), "ensure fridge registry");
    }
}
