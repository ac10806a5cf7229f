//! The playable map: generated tile grid plus its collision boundary.
//!
//! An [`Environment`] is built explicitly and handed to the game loop and
//! renderer. Grid and boundary are always replaced together: `regenerate`
//! computes the new pair in full before swapping it in, and queries borrow
//! `&self`, so no query can see a half-built boundary.

use crate::bounds::{BoundarySet, Rect};
use crate::dungeon::{DungeonGenerator, FixedLayout, RoomsAndCorridors};
use crate::iso::{cart_to_iso, IsoTransform, Point};
use crate::settings::{Settings, SettingsError};
use crate::tiles::{Grid, TileKind};

/// Where a player should spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartPosition {
    pub grid_x: usize,
    pub grid_y: usize,
    /// Isometric apex of the start tile.
    pub iso_x: f32,
    pub iso_y: f32,
    /// Centre of the start tile's diamond.
    pub center: Point,
}

/// Map construction and lookup errors.
#[derive(Debug)]
pub enum MapError {
    Settings(SettingsError),
    /// The generator returned a grid whose side doesn't match the settings.
    GridSizeMismatch { expected: usize, found: usize },
    /// Every tile is a wall, so there is nowhere to start.
    NoWalkableTile,
}

impl From<SettingsError> for MapError {
    fn from(e: SettingsError) -> Self {
        MapError::Settings(e)
    }
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::Settings(e) => write!(f, "Invalid settings: {}", e),
            MapError::GridSizeMismatch { expected, found } => write!(
                f,
                "Generated grid is {} tiles wide, settings require {}",
                found, expected
            ),
            MapError::NoWalkableTile => write!(f, "Map has no walkable tile to start on"),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Settings(e) => Some(e),
            _ => None,
        }
    }
}

/// Generated map and its collision boundary.
#[derive(Debug)]
pub struct Environment<G: DungeonGenerator = RoomsAndCorridors> {
    settings: Settings,
    transform: IsoTransform,
    generator: G,
    grid: Grid,
    bounds: BoundarySet,
}

impl Environment<RoomsAndCorridors> {
    /// Generate a map with the stock generator seeded from `settings.seed`.
    pub fn generate(settings: Settings) -> Result<Self, MapError> {
        let generator = RoomsAndCorridors::from_settings(&settings);
        Self::new(settings, generator)
    }
}

impl Environment<FixedLayout> {
    /// Wrap a prebuilt grid. `regenerate` will hand back the same layout.
    pub fn from_grid(settings: Settings, grid: Grid) -> Result<Self, MapError> {
        Self::new(settings, FixedLayout::new(grid))
    }
}

impl<G: DungeonGenerator> Environment<G> {
    pub fn new(settings: Settings, mut generator: G) -> Result<Self, MapError> {
        settings.validate()?;
        let transform = IsoTransform::from_settings(&settings);
        let (grid, bounds) = build_map(&settings, &transform, &mut generator)?;
        Ok(Self {
            settings,
            transform,
            generator,
            grid,
            bounds,
        })
    }

    /// Throw away the current map and generate a new one. On error the
    /// current map is left untouched.
    pub fn regenerate(&mut self) -> Result<(), MapError> {
        let (grid, bounds) = build_map(&self.settings, &self.transform, &mut self.generator)?;
        self.grid = grid;
        self.bounds = bounds;
        Ok(())
    }

    /// Rebuild the boundary from the current grid.
    pub fn set_bounds(&mut self) {
        self.bounds = BoundarySet::from_grid(&self.grid, &self.transform, self.settings.broad_phase);
        log::debug!("Rebuilt boundary: {} rects", self.bounds.len());
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn transform(&self) -> &IsoTransform {
        &self.transform
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn bounds(&self) -> &BoundarySet {
        &self.bounds
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// First non-wall tile scanning `x` then `y` ascending.
    pub fn find_start(&self) -> Result<StartPosition, MapError> {
        let Some((x, y, _)) = self.grid.iter().find(|(_, _, kind)| kind.is_walkable()) else {
            log::warn!(
                "No walkable tile in {}×{} map",
                self.grid.side_length(),
                self.grid.side_length()
            );
            return Err(MapError::NoWalkableTile);
        };

        let (cart_x, cart_y) = self.transform.grid_to_cart(x as f32, y as f32);
        let (iso_x, iso_y) = cart_to_iso(cart_x, cart_y);
        let start = StartPosition {
            grid_x: x,
            grid_y: y,
            iso_x,
            iso_y,
            center: Rect::for_tile(&self.transform, x as i32, y as i32).center(),
        };
        log::debug!("Start tile ({}, {}) at iso ({}, {})", x, y, iso_x, iso_y);
        Ok(start)
    }

    /// Does an entity with this screen-space box overlap any wall or the
    /// sealed edge?
    pub fn is_out_of_bounds(&self, bbox: &Rect) -> bool {
        self.bounds.is_out_of_bounds(bbox)
    }

    /// Kind of the tile whose diamond contains `point`, if any. Exact when
    /// `tile_width == 2 * tile_height`, where diamonds tile the plane.
    pub fn tile_under(&self, point: Point) -> Option<(usize, usize, TileKind)> {
        let (gx, gy) = self.transform.to_cartesian(point.x, point.y);
        let (x, y) = (gx.floor(), gy.floor());
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        self.grid.tile_at(x, y).map(|kind| (x, y, kind))
    }
}

fn build_map<G: DungeonGenerator>(
    settings: &Settings,
    transform: &IsoTransform,
    generator: &mut G,
) -> Result<(Grid, BoundarySet), MapError> {
    let grid = generator.generate(settings.map_width, settings.map_height);
    let expected = settings.side_length();
    if grid.side_length() != expected {
        return Err(MapError::GridSizeMismatch {
            expected,
            found: grid.side_length(),
        });
    }
    let bounds = BoundarySet::from_grid(&grid, transform, settings.broad_phase);
    log::info!(
        "Map ready: {}×{} tiles, {} walls, {} doors, {} boundary rects",
        expected,
        expected,
        grid.count(TileKind::Wall),
        grid.count(TileKind::Door),
        bounds.len()
    );
    Ok((grid, bounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_settings(side: usize) -> Settings {
        Settings::default().with_map_size(side)
    }

    fn env_from(rows: &[&str]) -> Environment<FixedLayout> {
        let grid = Grid::parse(rows).unwrap();
        Environment::from_grid(small_settings(rows.len()), grid).unwrap()
    }

    #[test]
    fn test_single_floor_in_3x3() {
        let env = env_from(&["###", "#.#", "###"]);
        // 5×5 scan minus the 3×3 grid = 16 padding cells, plus 8 walls
        assert_eq!(env.bounds().len(), 24);

        let t = *env.transform();
        let floor = Rect::for_tile(&t, 1, 1);
        assert!(!env.is_out_of_bounds(&floor));
        assert!(!env.is_out_of_bounds(&Rect::centered_on(floor.center(), 16.0, 8.0)));

        let wall = Rect::for_tile(&t, 0, 0);
        assert!(env.is_out_of_bounds(&wall));
        assert!(env.is_out_of_bounds(&Rect::centered_on(wall.center(), 16.0, 8.0)));
    }

    #[test]
    fn test_find_start_first_walkable() {
        let env = env_from(&["##.", "###", "###"]);
        let start = env.find_start().unwrap();
        assert_eq!((start.grid_x, start.grid_y), (2, 0));
        // cart (2 * 64 / 2, 0) = (64, 0) → iso (64, 32)
        assert_eq!((start.iso_x, start.iso_y), cart_to_iso(64.0, 0.0));
        assert_eq!((start.iso_x, start.iso_y), (64.0, 32.0));
        assert_eq!(start.center, Point::new(64.0, 48.0));
    }

    #[test]
    fn test_find_start_scans_x_outer() {
        // (0, 2) and (1, 0) are both walkable; x = 0 comes first.
        let env = env_from(&["#.#", "###", ".##"]);
        let start = env.find_start().unwrap();
        assert_eq!((start.grid_x, start.grid_y), (0, 2));
    }

    #[test]
    fn test_find_start_accepts_doors() {
        let env = env_from(&["###", "##+", "###"]);
        let start = env.find_start().unwrap();
        assert_eq!((start.grid_x, start.grid_y), (2, 1));
    }

    #[test]
    fn test_find_start_all_walls() {
        let env = env_from(&["##", "##"]);
        assert!(matches!(env.find_start(), Err(MapError::NoWalkableTile)));
    }

    #[test]
    fn test_grid_size_mismatch() {
        let grid = Grid::parse(&["#.", "##"]).unwrap();
        let err = Environment::from_grid(small_settings(4), grid).unwrap_err();
        assert!(matches!(
            err,
            MapError::GridSizeMismatch {
                expected: 4,
                found: 2
            }
        ));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            map_height: 3,
            ..small_settings(4)
        };
        let err = Environment::from_grid(settings, Grid::new(4, TileKind::Floor)).unwrap_err();
        assert!(matches!(err, MapError::Settings(SettingsError::NonSquareMap { .. })));
    }

    #[test]
    fn test_regenerate_replaces_grid_and_bounds() {
        let mut env = Environment::generate(small_settings(24).with_seed(3)).unwrap();
        let old_grid = env.grid().clone();
        env.regenerate().unwrap();
        assert_ne!(env.grid(), &old_grid);
        let rebuilt = BoundarySet::from_grid(env.grid(), env.transform(), env.settings().broad_phase);
        assert_eq!(env.bounds().rects(), rebuilt.rects());
    }

    #[test]
    fn test_set_bounds_is_idempotent() {
        let mut env = env_from(&["#..", "#.#", "..."]);
        let before = env.bounds().rects().to_vec();
        env.set_bounds();
        assert_eq!(env.bounds().rects(), &before[..]);
    }

    #[test]
    fn test_tile_under_tile_centres() {
        let env = env_from(&["#..", "#+#", "..."]);
        let t = *env.transform();
        for (x, y, kind) in env.grid().iter() {
            let center = Rect::for_tile(&t, x as i32, y as i32).center();
            assert_eq!(env.tile_under(center), Some((x, y, kind)));
        }
        let outside = Rect::for_tile(&t, -1, 1).center();
        assert_eq!(env.tile_under(outside), None);
    }

    #[test]
    fn test_environment_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Environment>();
        assert_send_sync::<Environment<FixedLayout>>();
    }
}
