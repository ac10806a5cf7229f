//! Tile kinds and the square tile grid produced by a generator.
//!
//! Grids are indexed `(x, y)` with both axes in `[0, side)`. Lookups over
//! signed coordinates return [`Cell::Outside`] beyond the edge instead of
//! failing, which is what boundary construction relies on.

use serde::{Deserialize, Serialize};

/// What a single tile is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Wall,
    Floor,
    Door,
}

impl TileKind {
    /// Entities may stand on anything that isn't a wall.
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileKind::Wall)
    }

    /// ASCII glyph used by [`Grid::parse`] and [`Grid::to_ascii`].
    pub fn glyph(self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::Door => '+',
        }
    }

    pub fn from_glyph(ch: char) -> Option<Self> {
        match ch {
            '#' => Some(TileKind::Wall),
            '.' => Some(TileKind::Floor),
            '+' => Some(TileKind::Door),
            _ => None,
        }
    }
}

/// Result of looking up a signed grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Tile(TileKind),
    /// Past the grid edge. Treated as wall when sealing the map.
    Outside,
}

impl Cell {
    /// Does this cell get a collision rect?
    pub fn is_solid(self) -> bool {
        match self {
            Cell::Tile(kind) => !kind.is_walkable(),
            Cell::Outside => true,
        }
    }
}

/// Square grid of tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    side: usize,
    /// Column-major: index = x * side + y.
    tiles: Vec<TileKind>,
}

impl Grid {
    /// A `side`×`side` grid filled with one kind.
    pub fn new(side: usize, fill: TileKind) -> Self {
        Self {
            side,
            tiles: vec![fill; side * side],
        }
    }

    /// Build from columns, `columns[x][y]`. Every column must be as long as
    /// there are columns.
    pub fn from_columns(columns: Vec<Vec<TileKind>>) -> Result<Self, GridError> {
        let side = columns.len();
        let mut tiles = Vec::with_capacity(side * side);
        for (x, column) in columns.into_iter().enumerate() {
            if column.len() != side {
                return Err(GridError::NotSquare {
                    index: x,
                    expected: side,
                    found: column.len(),
                });
            }
            tiles.extend(column);
        }
        Ok(Self { side, tiles })
    }

    /// Parse an ASCII layout: one string per row (`y`), one glyph per
    /// column (`x`). `#` wall, `.` floor, `+` door.
    pub fn parse(rows: &[&str]) -> Result<Self, GridError> {
        let side = rows.len();
        let mut grid = Grid::new(side, TileKind::Wall);
        for (y, row) in rows.iter().enumerate() {
            let glyphs: Vec<char> = row.chars().collect();
            if glyphs.len() != side {
                return Err(GridError::NotSquare {
                    index: y,
                    expected: side,
                    found: glyphs.len(),
                });
            }
            for (x, ch) in glyphs.into_iter().enumerate() {
                let kind = TileKind::from_glyph(ch).ok_or(GridError::UnknownGlyph { ch, x, y })?;
                grid.set(x, y, kind);
            }
        }
        Ok(grid)
    }

    /// Render back to the [`Grid::parse`] format.
    pub fn to_ascii(&self) -> Vec<String> {
        (0..self.side)
            .map(|y| (0..self.side).map(|x| self.tiles[self.index(x, y)].glyph()).collect())
            .collect()
    }

    pub fn side_length(&self) -> usize {
        self.side
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        let n = self.side as i64;
        let (x, y) = (x as i64, y as i64);
        x >= 0 && x < n && y >= 0 && y < n
    }

    fn index(&self, x: usize, y: usize) -> usize {
        x * self.side + y
    }

    /// Tile at `(x, y)`, or `None` off the grid.
    pub fn tile_at(&self, x: usize, y: usize) -> Option<TileKind> {
        if x < self.side && y < self.side {
            Some(self.tiles[self.index(x, y)])
        } else {
            None
        }
    }

    /// Signed lookup. Anything outside `[0, side)²` is [`Cell::Outside`].
    pub fn cell(&self, x: i32, y: i32) -> Cell {
        if !self.contains(x, y) {
            return Cell::Outside;
        }
        Cell::Tile(self.tiles[self.index(x as usize, y as usize)])
    }

    /// Overwrite one tile. Out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, kind: TileKind) {
        if x < self.side && y < self.side {
            let i = self.index(x, y);
            self.tiles[i] = kind;
        }
    }

    /// All tiles as `(x, y, kind)`, `x` outer and `y` inner, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, TileKind)> + '_ {
        let side = self.side;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &kind)| (i / side, i % side, kind))
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|&&k| k == kind).count()
    }
}

/// Grid shape errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Row or column `index` had `found` tiles, `expected` were needed.
    NotSquare {
        index: usize,
        expected: usize,
        found: usize,
    },
    UnknownGlyph { ch: char, x: usize, y: usize },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::NotSquare {
                index,
                expected,
                found,
            } => write!(
                f,
                "Grid is not square: line {} has {} tiles, expected {}",
                index, found, expected
            ),
            GridError::UnknownGlyph { ch, x, y } => {
                write!(f, "Unknown tile glyph {:?} at ({}, {})", ch, x, y)
            }
        }
    }
}

impl std::error::Error for GridError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uses_row_as_y() {
        let grid = Grid::parse(&["#.#", "###", "+##"]).unwrap();
        assert_eq!(grid.side_length(), 3);
        assert_eq!(grid.tile_at(1, 0), Some(TileKind::Floor));
        assert_eq!(grid.tile_at(0, 2), Some(TileKind::Door));
        assert_eq!(grid.tile_at(0, 1), Some(TileKind::Wall));
    }

    #[test]
    fn test_ascii_round_trip() {
        let rows = ["#..", "#+#", "..."];
        let grid = Grid::parse(&rows).unwrap();
        assert_eq!(grid.to_ascii(), rows.iter().map(|r| r.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = Grid::parse(&["###", "##", "###"]).unwrap_err();
        assert_eq!(
            err,
            GridError::NotSquare {
                index: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_glyph() {
        let err = Grid::parse(&["#?", "##"]).unwrap_err();
        assert_eq!(err, GridError::UnknownGlyph { ch: '?', x: 1, y: 0 });
    }

    #[test]
    fn test_from_columns_indexes_x_then_y() {
        let grid = Grid::from_columns(vec![
            vec![TileKind::Wall, TileKind::Floor],
            vec![TileKind::Door, TileKind::Wall],
        ])
        .unwrap();
        assert_eq!(grid.tile_at(0, 1), Some(TileKind::Floor));
        assert_eq!(grid.tile_at(1, 0), Some(TileKind::Door));
    }

    #[test]
    fn test_from_columns_rejects_non_square() {
        let res = Grid::from_columns(vec![vec![TileKind::Wall; 3], vec![TileKind::Wall; 3]]);
        assert!(matches!(res, Err(GridError::NotSquare { .. })));
    }

    #[test]
    fn test_cell_outside_range() {
        let grid = Grid::new(4, TileKind::Floor);
        assert_eq!(grid.cell(-1, 0), Cell::Outside);
        assert_eq!(grid.cell(0, 4), Cell::Outside);
        assert_eq!(grid.cell(4, 4), Cell::Outside);
        assert_eq!(grid.cell(3, 3), Cell::Tile(TileKind::Floor));
        assert!(Cell::Outside.is_solid());
        assert!(!Cell::Tile(TileKind::Door).is_solid());
        assert!(Cell::Tile(TileKind::Wall).is_solid());
    }

    #[test]
    fn test_iter_order_and_count() {
        let mut grid = Grid::new(2, TileKind::Wall);
        grid.set(1, 0, TileKind::Floor);
        let order: Vec<_> = grid.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(grid.count(TileKind::Floor), 1);
        assert_eq!(grid.count(TileKind::Wall), 3);
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut grid = Grid::new(2, TileKind::Wall);
        grid.set(5, 5, TileKind::Floor);
        assert_eq!(grid.count(TileKind::Floor), 0);
    }
}
