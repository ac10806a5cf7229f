//! Dungeon generation - rooms joined by L-shaped corridors.
//!
//! The boundary code only needs something that hands back a square [`Grid`];
//! [`DungeonGenerator`] is that seam. [`RoomsAndCorridors`] is the stock
//! generator, [`FixedLayout`] replays a prebuilt grid.

use crate::settings::Settings;
use crate::tiles::{Grid, TileKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Anything that can produce a tile grid for a new map.
pub trait DungeonGenerator {
    /// Produce a fresh grid. Grids are square; the side is the larger of the
    /// two dimensions.
    fn generate(&mut self, width: usize, height: usize) -> Grid;
}

/// Placement attempts per requested room before giving up.
const ATTEMPTS_PER_ROOM: usize = 8;

/// Axis-aligned room in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Room {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Room {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Overlap test with `margin` cells of clearance on every side.
    fn intersects(&self, other: &Room, margin: usize) -> bool {
        self.x < other.x + other.width + margin
            && other.x < self.x + self.width + margin
            && self.y < other.y + other.height + margin
            && other.y < self.y + self.height + margin
    }

    pub fn center(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Random rectangular rooms, joined in placement order by corridors. A door
/// sits where each corridor meets a room.
#[derive(Debug, Clone)]
pub struct RoomsAndCorridors {
    rng: StdRng,
    pub max_rooms: usize,
    pub min_room_size: usize,
    pub max_room_size: usize,
    rooms: Vec<Room>,
}

impl RoomsAndCorridors {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_rooms: 12,
            min_room_size: 3,
            max_room_size: 8,
            rooms: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.seed)
    }

    pub fn with_room_count(mut self, max_rooms: usize) -> Self {
        self.max_rooms = max_rooms.max(1);
        self
    }

    pub fn with_room_size(mut self, min: usize, max: usize) -> Self {
        self.min_room_size = min.max(1);
        self.max_room_size = max.max(self.min_room_size);
        self
    }

    /// Rooms placed by the most recent `generate`.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    fn place_rooms(&mut self, side: usize) -> Vec<Room> {
        let max_size = self.max_room_size.min(side);
        let min_size = self.min_room_size.min(max_size);
        let mut rooms: Vec<Room> = Vec::new();

        for _ in 0..self.max_rooms * ATTEMPTS_PER_ROOM {
            if rooms.len() >= self.max_rooms {
                break;
            }
            let width = self.rng.gen_range(min_size..=max_size);
            let height = self.rng.gen_range(min_size..=max_size);
            let candidate = Room {
                x: self.rng.gen_range(0..=side - width),
                y: self.rng.gen_range(0..=side - height),
                width,
                height,
            };
            if !rooms.iter().any(|r| r.intersects(&candidate, 1)) {
                rooms.push(candidate);
            }
        }

        if rooms.is_empty() {
            // Fall back to one centred room so the map is never solid wall.
            let size = min_size.max(1);
            rooms.push(Room {
                x: (side - size) / 2,
                y: (side - size) / 2,
                width: size,
                height: size,
            });
        }
        rooms
    }
}

/// Cells from `from` to `to`, one axis then the other.
fn l_path(from: (usize, usize), to: (usize, usize), horizontal_first: bool) -> Vec<(usize, usize)> {
    fn span(a: usize, b: usize) -> Vec<usize> {
        if a <= b {
            (a..=b).collect()
        } else {
            (b..=a).rev().collect()
        }
    }

    let mut path = Vec::new();
    if horizontal_first {
        path.extend(span(from.0, to.0).into_iter().map(|x| (x, from.1)));
        path.extend(span(from.1, to.1).into_iter().skip(1).map(|y| (to.0, y)));
    } else {
        path.extend(span(from.1, to.1).into_iter().map(|y| (from.0, y)));
        path.extend(span(from.0, to.0).into_iter().skip(1).map(|x| (x, to.1)));
    }
    path
}

fn carve_corridor(grid: &mut Grid, rooms: &[Room], path: &[(usize, usize)]) {
    let in_room = |(x, y): (usize, usize)| rooms.iter().any(|r| r.contains(x, y));

    let mut prev: Option<((usize, usize), bool)> = None;
    for &cell in path {
        let inside = in_room(cell);
        if !inside && grid.tile_at(cell.0, cell.1) == Some(TileKind::Wall) {
            grid.set(cell.0, cell.1, TileKind::Floor);
        }
        if let Some((prev_cell, prev_inside)) = prev {
            match (prev_inside, inside) {
                (false, true) => grid.set(prev_cell.0, prev_cell.1, TileKind::Door),
                (true, false) => grid.set(cell.0, cell.1, TileKind::Door),
                _ => {}
            }
        }
        prev = Some((cell, inside));
    }
}

impl DungeonGenerator for RoomsAndCorridors {
    fn generate(&mut self, width: usize, height: usize) -> Grid {
        let side = width.max(height);
        let mut grid = Grid::new(side, TileKind::Wall);
        if side == 0 {
            self.rooms.clear();
            return grid;
        }

        let rooms = self.place_rooms(side);
        for room in &rooms {
            for x in room.x..room.x + room.width {
                for y in room.y..room.y + room.height {
                    grid.set(x, y, TileKind::Floor);
                }
            }
        }

        for pair in rooms.windows(2) {
            let horizontal_first = self.rng.gen_bool(0.5);
            let path = l_path(pair[0].center(), pair[1].center(), horizontal_first);
            carve_corridor(&mut grid, &rooms, &path);
        }

        log::debug!(
            "Generated {}×{} dungeon: {} rooms, {} floor, {} doors",
            side,
            side,
            rooms.len(),
            grid.count(TileKind::Floor),
            grid.count(TileKind::Door)
        );
        self.rooms = rooms;
        grid
    }
}

/// Hands back the same prebuilt grid on every call.
#[derive(Debug, Clone)]
pub struct FixedLayout {
    grid: Grid,
}

impl FixedLayout {
    pub fn new(grid: Grid) -> Self {
        Self { grid }
    }
}

impl DungeonGenerator for FixedLayout {
    fn generate(&mut self, width: usize, height: usize) -> Grid {
        if width.max(height) != self.grid.side_length() {
            log::warn!(
                "Fixed layout is {} tiles wide, {}×{} was requested",
                self.grid.side_length(),
                width,
                height
            );
        }
        self.grid.clone()
    }
}
