//! Map boundary and collision logic for isodelve.
//!
//! This crate holds everything about the playable map that doesn't need a
//! canvas: generating a tile grid, sealing it with isometric collision
//! rects, and answering "is this entity out of bounds?" each frame. It
//! takes plain data and returns plain data, so it runs the same in the game,
//! in the headless harness, and in tests.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bounds`] | Isometric rects, broad/narrow-phase overlap, boundary set |
//! | [`dungeon`] | Generator seam plus rooms-and-corridors generator |
//! | [`environment`] | Owns grid + boundary; start lookup, out-of-bounds query |
//! | [`iso`] | Grid ↔ cartesian ↔ isometric conversion |
//! | [`render`] | Tile-top/side geometry and debug outlines for the renderer |
//! | [`settings`] | Tile and map constants, JSON loading, validation |
//! | [`tiles`] | Tile kinds and the square grid |

pub mod bounds;
pub mod dungeon;
pub mod environment;
pub mod iso;
pub mod render;
pub mod settings;
pub mod tiles;
