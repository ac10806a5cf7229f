//! Draw geometry for the renderer.
//!
//! Nothing here touches pixels. Walkable tiles become [`TileSprite`]s (top
//! face, extruded side, edge strokes, colours) and, in debug mode, each
//! boundary rect becomes a diamond outline. The camera offset is a plain
//! translation applied to every emitted point.

use crate::bounds::Rect;
use crate::dungeon::DungeonGenerator;
use crate::environment::Environment;
use crate::iso::Point;
use crate::tiles::TileKind;

/// Screen-space translation applied when drawing the map.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Camera {
    pub fn new(offset_x: f32, offset_y: f32) -> Self {
        Self { offset_x, offset_y }
    }

    pub fn apply(&self, p: Point) -> Point {
        p.translated(self.offset_x, self.offset_y)
    }

    fn apply_all<const N: usize>(&self, points: [Point; N]) -> [Point; N] {
        points.map(|p| self.apply(p))
    }
}

/// Everything needed to draw one walkable tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSprite {
    pub x: usize,
    pub y: usize,
    pub kind: TileKind,
    /// Top face: apex, right, bottom, left.
    pub top: [Point; 4],
    /// Top face plus the extruded sides, drawn first.
    pub side: [Point; 6],
    /// Vertical strokes down the left and right corners.
    pub edges: [[Point; 2]; 2],
    pub top_color: String,
    pub side_color: String,
}

/// Sprites for every floor and door tile, in grid order.
pub fn tile_sprites<G: DungeonGenerator>(env: &Environment<G>, camera: &Camera) -> Vec<TileSprite> {
    let settings = env.settings();
    let palette = &settings.palette;
    let transform = env.transform();
    let depth = settings.side_depth;
    let hw = transform.tile_width / 2.0;
    let hh = transform.tile_height / 2.0;

    env.grid()
        .iter()
        .filter_map(|(x, y, kind)| {
            let (top_color, side_color) = match kind {
                TileKind::Floor => (&palette.floor_top, &palette.floor_side),
                TileKind::Door => (&palette.door_top, &palette.door_side),
                TileKind::Wall => return None,
            };
            let rect = Rect::for_tile(transform, x as i32, y as i32);
            let (ax, ay) = (rect.left, rect.top);

            let side = [
                Point::new(ax, ay),
                Point::new(ax + hw, ay + hh),
                Point::new(ax + hw, ay + hh + depth),
                Point::new(ax, rect.bottom + depth),
                Point::new(ax - hw, ay + hh + depth),
                Point::new(ax - hw, ay + hh),
            ];
            let edges = [
                [Point::new(ax + hw, ay + hh), Point::new(ax + hw, ay + hh + depth)],
                [Point::new(ax - hw, ay + hh), Point::new(ax - hw, ay + hh + depth)],
            ];

            Some(TileSprite {
                x,
                y,
                kind,
                top: camera.apply_all(rect.diamond()),
                side: camera.apply_all(side),
                edges: edges.map(|e| camera.apply_all(e)),
                top_color: top_color.clone(),
                side_color: side_color.clone(),
            })
        })
        .collect()
}

/// Diamond outline of each boundary rect. Empty unless `settings.debug`.
pub fn boundary_outlines<G: DungeonGenerator>(
    env: &Environment<G>,
    camera: &Camera,
) -> Vec<[Point; 4]> {
    if !env.settings().debug {
        return Vec::new();
    }
    env.bounds()
        .rects()
        .iter()
        .map(|r| camera.apply_all(r.diamond()))
        .collect()
}
