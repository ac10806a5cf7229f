//! Isometric collision rects and the out-of-bounds test.
//!
//! A [`Rect`] stores a tile footprint the way the map lays tiles out: `left`
//! and `top` are the isometric apex of the tile's diamond, `right` and
//! `bottom` add one tile width and height. The true footprint is the diamond
//! hanging below the apex, so the overlap test runs in two phases:
//!
//! 1. broad phase on the rect fields (see [`BroadPhase`]),
//! 2. narrow phase, a separating-axis test between the two diamonds.
//!
//! Shapes that only share an edge or a vertex don't overlap, so an entity
//! whose box exactly covers a floor tile is never blocked by the walls
//! around it.

use crate::iso::{IsoTransform, Point};
use crate::settings::BroadPhase;
use crate::tiles::Grid;
use serde::{Deserialize, Serialize};

/// Projections closer than this (in pixels) count as touching, not overlapping.
const CONTACT_EPSILON: f32 = 1e-3;

/// Isometric rect in screen space. Used both for boundary cells and for the
/// caller's entity bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            right: left + width,
            bottom: top + height,
        }
    }

    /// Collision rect for grid cell `(x, y)`. Works for the padding ring
    /// outside the grid too.
    pub fn for_tile(transform: &IsoTransform, x: i32, y: i32) -> Self {
        let apex = transform.tile_origin(x, y);
        Self::new(apex.x, apex.y, transform.tile_width, transform.tile_height)
    }

    /// Box whose diamond is centred on `center`.
    pub fn centered_on(center: Point, width: f32, height: f32) -> Self {
        Self::new(center.x, center.y - height / 2.0, width, height)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// `right >= left` and `bottom >= top`. Queries assume this holds.
    pub fn is_well_formed(&self) -> bool {
        self.right >= self.left && self.bottom >= self.top
    }

    /// Centre of the diamond footprint.
    pub fn center(&self) -> Point {
        Point::new(self.left, self.top + self.height() / 2.0)
    }

    /// Diamond footprint: top, right, bottom, left vertices.
    pub fn diamond(&self) -> [Point; 4] {
        let hw = self.width() / 2.0;
        let hh = self.height() / 2.0;
        [
            Point::new(self.left, self.top),
            Point::new(self.left + hw, self.top + hh),
            Point::new(self.left, self.bottom),
            Point::new(self.left - hw, self.top + hh),
        ]
    }

    /// Axis-aligned extent of the diamond footprint.
    pub fn footprint(&self) -> Rect {
        let hw = self.width() / 2.0;
        Rect {
            top: self.top,
            left: self.left - hw,
            right: self.left + hw,
            bottom: self.bottom,
        }
    }
}

/// Standard AABB overlap on the rect fields. Touching edges don't count.
pub fn intersect_rect(r1: &Rect, r2: &Rect) -> bool {
    r2.left < r1.right && r2.right > r1.left && r2.top < r1.bottom && r2.bottom > r1.top
}

/// The legacy disjunctive predicate: any single edge condition passes.
/// Only false for pairs that fail all four, which well-formed rects never do.
pub fn intersect_rect_permissive(r1: &Rect, r2: &Rect) -> bool {
    r2.left < r1.right || r2.right > r1.left || r2.top < r1.bottom || r2.bottom > r1.top
}

fn broad_phase_passes(mode: BroadPhase, r1: &Rect, r2: &Rect) -> bool {
    match mode {
        BroadPhase::Aabb => intersect_rect(r1, r2),
        BroadPhase::Footprint => intersect_rect(&r1.footprint(), &r2.footprint()),
        BroadPhase::Permissive => intersect_rect_permissive(r1, r2),
    }
}

/// Min/max projection of a convex polygon onto `axis`.
fn project(poly: &[Point; 4], axis: Point) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for p in poly {
        let d = p.x * axis.x + p.y * axis.y;
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Unit normals of a quad's edges. Degenerate edges are skipped.
fn edge_normals(poly: &[Point; 4]) -> impl Iterator<Item = Point> + '_ {
    (0..4).filter_map(move |i| {
        let a = poly[i];
        let b = poly[(i + 1) % 4];
        let (nx, ny) = (-(b.y - a.y), b.x - a.x);
        let len = (nx * nx + ny * ny).sqrt();
        (len > f32::EPSILON).then(|| Point::new(nx / len, ny / len))
    })
}

/// Separating-axis test between two convex quads. True only for overlap
/// with positive area.
pub fn polygons_overlap(a: &[Point; 4], b: &[Point; 4]) -> bool {
    let mut tested = false;
    for axis in edge_normals(a).chain(edge_normals(b)) {
        tested = true;
        let (min_a, max_a) = project(a, axis);
        let (min_b, max_b) = project(b, axis);
        if max_a <= min_b + CONTACT_EPSILON || max_b <= min_a + CONTACT_EPSILON {
            return false;
        }
    }
    // Both quads collapsed to points: no area, no overlap.
    tested
}

/// Two-phase test: broad phase on the rects, then the diamond footprints.
pub fn intersect_isometric(r1: &Rect, r2: &Rect, mode: BroadPhase) -> bool {
    if !broad_phase_passes(mode, r1, r2) {
        return false;
    }
    polygons_overlap(&r1.diamond(), &r2.diamond())
}

/// Collision rects for every solid cell of `grid`, scanning `[-1, side]` on
/// both axes. Cells past the edge are always solid, so the ring of rects
/// around the grid is complete whatever the generator put on the border.
pub fn build_boundaries(grid: &Grid, transform: &IsoTransform) -> Vec<Rect> {
    let n = grid.side_length() as i32;
    let mut rects = Vec::new();
    for x in -1..=n {
        for y in -1..=n {
            if grid.cell(x, y).is_solid() {
                rects.push(Rect::for_tile(transform, x, y));
            }
        }
    }
    rects
}

/// The closed set of collision rects for one map.
#[derive(Debug, Clone, Default)]
pub struct BoundarySet {
    rects: Vec<Rect>,
    broad_phase: BroadPhase,
}

impl BoundarySet {
    pub fn new(rects: Vec<Rect>, broad_phase: BroadPhase) -> Self {
        Self { rects, broad_phase }
    }

    pub fn from_grid(grid: &Grid, transform: &IsoTransform, broad_phase: BroadPhase) -> Self {
        Self::new(build_boundaries(grid, transform), broad_phase)
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn broad_phase(&self) -> BroadPhase {
        self.broad_phase
    }

    /// First boundary rect the box overlaps, in build order.
    pub fn first_hit(&self, bbox: &Rect) -> Option<&Rect> {
        debug_assert!(bbox.is_well_formed(), "malformed bounding box {:?}", bbox);
        self.rects
            .iter()
            .find(|r| intersect_isometric(bbox, r, self.broad_phase))
    }

    /// Does the box overlap any boundary rect?
    pub fn is_out_of_bounds(&self, bbox: &Rect) -> bool {
        self.first_hit(bbox).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::TileKind;

    fn transform() -> IsoTransform {
        IsoTransform::new(64.0, 32.0)
    }

    #[test]
    fn test_rect_for_tile() {
        let r = Rect::for_tile(&transform(), 1, 0);
        assert_eq!(
            r,
            Rect {
                top: 16.0,
                left: 32.0,
                right: 96.0,
                bottom: 48.0
            }
        );
    }

    #[test]
    fn test_diamond_vertices() {
        let r = Rect::new(0.0, 0.0, 64.0, 32.0);
        assert_eq!(
            r.diamond(),
            [
                Point::new(0.0, 0.0),
                Point::new(32.0, 16.0),
                Point::new(0.0, 32.0),
                Point::new(-32.0, 16.0),
            ]
        );
        assert_eq!(r.center(), Point::new(0.0, 16.0));
    }

    #[test]
    fn test_centered_on_matches_tile_center() {
        let tile = Rect::for_tile(&transform(), 3, 2);
        let b = Rect::centered_on(tile.center(), 64.0, 32.0);
        assert_eq!(b, tile);
    }

    #[test]
    fn test_intersect_rect_basic() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(intersect_rect(&a, &Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!intersect_rect(&a, &Rect::new(20.0, 0.0, 10.0, 10.0)));
        // Touching on an edge is not overlap
        assert!(!intersect_rect(&a, &Rect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_permissive_passes_disjoint_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let far = Rect::new(500.0, 500.0, 10.0, 10.0);
        assert!(!intersect_rect(&a, &far));
        assert!(intersect_rect_permissive(&a, &far));
        // Narrow phase still rejects it
        assert!(!intersect_isometric(&a, &far, BroadPhase::Permissive));
    }

    #[test]
    fn test_identical_diamonds_overlap() {
        let r = Rect::for_tile(&transform(), 2, 2);
        for mode in [BroadPhase::Aabb, BroadPhase::Footprint, BroadPhase::Permissive] {
            assert!(intersect_isometric(&r, &r, mode));
        }
    }

    #[test]
    fn test_adjacent_tiles_only_touch() {
        let t = transform();
        let center = Rect::for_tile(&t, 1, 1);
        for (dx, dy) in [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)] {
            let n = Rect::for_tile(&t, 1 + dx, 1 + dy);
            assert!(
                !intersect_isometric(&center, &n, BroadPhase::Aabb),
                "neighbour ({}, {}) should only touch",
                dx,
                dy
            );
        }
    }

    #[test]
    fn test_rect_corner_outside_diamond_does_not_collide() {
        // Small box in the top-right corner of the tile's rect, clear of the diamond.
        let tile = Rect::new(0.0, 0.0, 64.0, 32.0);
        let corner = Rect::new(56.0, 0.0, 8.0, 4.0);
        assert!(intersect_rect(&tile, &corner));
        assert!(!intersect_isometric(&tile, &corner, BroadPhase::Aabb));
    }

    #[test]
    fn test_footprint_catches_narrow_box_near_left_vertex() {
        let tile = Rect::new(0.0, 0.0, 64.0, 32.0);
        // Narrow box centred just inside the tile's left vertex.
        let bbox = Rect::centered_on(Point::new(-28.0, 16.0), 16.0, 8.0);
        assert!(polygons_overlap(&tile.diamond(), &bbox.diamond()));
        assert!(!intersect_isometric(&bbox, &tile, BroadPhase::Aabb));
        assert!(intersect_isometric(&bbox, &tile, BroadPhase::Footprint));
    }

    #[test]
    fn test_broad_phase_is_a_prefilter() {
        let t = transform();
        let boxes = [
            Rect::new(-40.0, 10.0, 20.0, 12.0),
            Rect::new(30.0, 30.0, 64.0, 32.0),
            Rect::new(300.0, -50.0, 8.0, 8.0),
        ];
        for x in -1..4 {
            for y in -1..4 {
                let tile = Rect::for_tile(&t, x, y);
                for b in &boxes {
                    if !intersect_rect(b, &tile) {
                        assert!(!intersect_isometric(b, &tile, BroadPhase::Aabb));
                    }
                }
            }
        }
    }

    #[test]
    fn test_degenerate_box_never_overlaps() {
        let tile = Rect::new(0.0, 0.0, 64.0, 32.0);
        let point = Rect::new(0.0, 16.0, 0.0, 0.0);
        assert!(!polygons_overlap(&tile.diamond(), &point.diamond()));
    }

    #[test]
    fn test_build_boundaries_all_wall_grid() {
        let grid = Grid::new(2, TileKind::Wall);
        // 4×4 scan, every cell solid
        assert_eq!(build_boundaries(&grid, &transform()).len(), 16);
    }

    #[test]
    fn test_build_boundaries_all_floor_grid_is_ring() {
        let grid = Grid::new(5, TileKind::Floor);
        let rects = build_boundaries(&grid, &transform());
        assert_eq!(rects.len(), 7 * 7 - 5 * 5);
    }

    #[test]
    fn test_empty_set_never_out_of_bounds() {
        let set = BoundarySet::default();
        assert!(set.is_empty());
        assert!(!set.is_out_of_bounds(&Rect::new(0.0, 0.0, 64.0, 32.0)));
    }

    #[test]
    fn test_first_hit_reports_wall() {
        let grid = Grid::parse(&["###", "#.#", "###"]).unwrap();
        let t = transform();
        let set = BoundarySet::from_grid(&grid, &t, BroadPhase::Aabb);
        let wall = Rect::for_tile(&t, 2, 1);
        assert_eq!(set.first_hit(&wall), Some(&wall));
        assert!(set.first_hit(&Rect::for_tile(&t, 1, 1)).is_none());
    }
}
