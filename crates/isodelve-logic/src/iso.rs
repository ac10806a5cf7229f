//! Grid ↔ isometric screen-space conversion.
//!
//! Two steps: grid cells scale to cartesian pixels (`x * tile_width / 2`,
//! `y * tile_height`), then cartesian pixels rotate into the isometric
//! diamond projection. Both directions are exact inverses up to float
//! rounding.

use crate::settings::Settings;
use serde::{Deserialize, Serialize};

/// A point in isometric screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Shift by a camera-style offset.
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Rotate cartesian pixels into isometric screen space.
pub fn cart_to_iso(cart_x: f32, cart_y: f32) -> (f32, f32) {
    (cart_x - cart_y, (cart_x + cart_y) / 2.0)
}

/// Inverse of [`cart_to_iso`].
pub fn iso_to_cart(iso_x: f32, iso_y: f32) -> (f32, f32) {
    (iso_y + iso_x / 2.0, iso_y - iso_x / 2.0)
}

/// Grid ↔ isometric conversion for one tile size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoTransform {
    pub tile_width: f32,
    pub tile_height: f32,
}

impl IsoTransform {
    pub fn new(tile_width: f32, tile_height: f32) -> Self {
        Self {
            tile_width,
            tile_height,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.tile_width, settings.tile_height)
    }

    /// Grid cell → cartesian pixels.
    pub fn grid_to_cart(&self, grid_x: f32, grid_y: f32) -> (f32, f32) {
        (grid_x * self.tile_width / 2.0, grid_y * self.tile_height)
    }

    /// Grid cell → isometric offsets of the tile's apex.
    pub fn to_isometric(&self, grid_x: f32, grid_y: f32) -> (f32, f32) {
        let (cart_x, cart_y) = self.grid_to_cart(grid_x, grid_y);
        cart_to_iso(cart_x, cart_y)
    }

    /// Isometric offsets → grid cell. Inverse of [`Self::to_isometric`].
    pub fn to_cartesian(&self, iso_x: f32, iso_y: f32) -> (f32, f32) {
        let (cart_x, cart_y) = iso_to_cart(iso_x, iso_y);
        (cart_x / (self.tile_width / 2.0), cart_y / self.tile_height)
    }

    /// Isometric apex of an integer grid cell. Accepts the padding ring, so
    /// coordinates may be negative.
    pub fn tile_origin(&self, x: i32, y: i32) -> Point {
        let (iso_x, iso_y) = self.to_isometric(x as f32, y as f32);
        Point::new(iso_x, iso_y)
    }
}
