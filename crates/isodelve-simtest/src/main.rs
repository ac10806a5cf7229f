//! isodelve Headless Map Harness
//!
//! Sweeps generated maps across seeds and sizes and checks the boundary
//! invariants the game loop relies on. Runs entirely in-process — no
//! canvas, no game loop.
//!
//! Usage:
//!   cargo run -p isodelve-simtest
//!   cargo run -p isodelve-simtest -- --verbose
//!   RUST_LOG=debug cargo run -p isodelve-simtest

use std::collections::HashSet;

use isodelve_logic::bounds::{polygons_overlap, Rect};
use isodelve_logic::dungeon::DungeonGenerator;
use isodelve_logic::environment::Environment;
use isodelve_logic::iso::{IsoTransform, Point};
use isodelve_logic::render::{boundary_outlines, tile_sprites, Camera};
use isodelve_logic::settings::{BroadPhase, Settings};
use isodelve_logic::tiles::TileKind;
use serde::Deserialize;

// ── Harness config (same settings format the game loads) ───────────────
const HARNESS_JSON: &str = include_str!("../../../data/simtest.json");

#[derive(Debug, Deserialize)]
struct HarnessConfig {
    seeds: u64,
    sizes: Vec<usize>,
    /// Spacing of the probe lattice used for broad-phase comparisons, in pixels.
    probe_step: f32,
    settings: Settings,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== isodelve Map Harness ===\n");

    let config: HarnessConfig = match serde_json::from_str(HARNESS_JSON) {
        Ok(c) => c,
        Err(e) => {
            println!("  ✗ config_parse: JSON parse error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.settings.validate() {
        println!("  ✗ config_settings: {}", e);
        std::process::exit(1);
    }
    log::info!(
        "Sweeping {} seeds over sizes {:?}",
        config.seeds,
        config.sizes
    );

    let mut results = Vec::new();

    // 1. Coordinate transform
    results.extend(validate_transform(&config.settings));

    // 2. Boundary construction sweep
    results.extend(validate_boundaries(&config));

    // 3. Start lookup and tile verdicts
    results.extend(validate_queries(&config));

    // 4. Broad-phase comparison
    results.extend(validate_broad_phases(&config));

    // 5. Draw geometry
    results.extend(validate_render(&config.settings));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn settings_for(base: &Settings, side: usize, seed: u64) -> Settings {
    base.clone().with_map_size(side).with_seed(seed)
}

fn grid_cell_of(transform: &IsoTransform, r: &Rect) -> (i32, i32) {
    let (x, y) = transform.to_cartesian(r.left, r.top);
    (x.round() as i32, y.round() as i32)
}

// ── 1. Coordinate Transform ─────────────────────────────────────────────

fn validate_transform(settings: &Settings) -> Vec<TestResult> {
    println!("--- Coordinate Transform ---");
    let t = IsoTransform::from_settings(settings);
    let n = settings.side_length() as i32;

    let mut worst = 0.0f32;
    for x in -1..=n {
        for y in -1..=n {
            let (ix, iy) = t.to_isometric(x as f32, y as f32);
            let (bx, by) = t.to_cartesian(ix, iy);
            worst = worst.max((bx - x as f32).abs()).max((by - y as f32).abs());
        }
    }

    vec![TestResult {
        name: "transform_round_trip".into(),
        passed: worst < 1e-3,
        detail: format!("max round-trip error {:.2e} over {}×{} cells", worst, n + 2, n + 2),
    }]
}

// ── 2. Boundary Construction ────────────────────────────────────────────

fn validate_boundaries(config: &HarnessConfig) -> Vec<TestResult> {
    println!("--- Boundary Construction ---");
    let mut results = Vec::new();
    let mut unsealed = Vec::new();
    let mut miscounted = Vec::new();
    let mut maps = 0;

    for &side in &config.sizes {
        for seed in 0..config.seeds {
            let env = match Environment::generate(settings_for(&config.settings, side, seed)) {
                Ok(env) => env,
                Err(e) => {
                    results.push(TestResult {
                        name: format!("generate_{}x{}_seed{}", side, side, seed),
                        passed: false,
                        detail: e.to_string(),
                    });
                    continue;
                }
            };
            maps += 1;

            let cells: HashSet<(i32, i32)> = env
                .bounds()
                .rects()
                .iter()
                .map(|r| grid_cell_of(env.transform(), r))
                .collect();
            let n = side as i32;
            let sealed = (-1..=n).all(|i| {
                [-1, n]
                    .iter()
                    .all(|&e| cells.contains(&(i, e)) && cells.contains(&(e, i)))
            });
            if !sealed {
                unsealed.push((side, seed));
            }

            let ring = (side + 2) * (side + 2) - side * side;
            let expected = ring + env.grid().count(TileKind::Wall);
            if env.bounds().len() != expected || cells.len() != expected {
                miscounted.push((side, seed, env.bounds().len(), expected));
            }
        }
    }

    results.push(TestResult {
        name: "perimeter_sealed".into(),
        passed: unsealed.is_empty(),
        detail: if unsealed.is_empty() {
            format!("{} maps fully enclosed", maps)
        } else {
            format!("{} maps with gaps, e.g. {:?}", unsealed.len(), unsealed[0])
        },
    });
    results.push(TestResult {
        name: "boundary_count".into(),
        passed: miscounted.is_empty(),
        detail: if miscounted.is_empty() {
            "every map has ring + wall rects, no duplicates".into()
        } else {
            let (side, seed, got, want) = miscounted[0];
            format!(
                "{} maps miscounted, e.g. {}×{} seed {}: {} rects, expected {}",
                miscounted.len(),
                side,
                side,
                seed,
                got,
                want
            )
        },
    });
    results
}

// ── 3. Queries ──────────────────────────────────────────────────────────

fn validate_queries(config: &HarnessConfig) -> Vec<TestResult> {
    println!("--- Queries ---");
    let mut no_start = 0;
    let mut start_blocked = 0;
    let mut wrong_verdicts = 0;
    let mut tiles_checked = 0;

    let side = config.settings.side_length();
    for seed in 0..config.seeds {
        let Ok(env) = Environment::generate(settings_for(&config.settings, side, seed)) else {
            continue;
        };
        match env.find_start() {
            Ok(start) => {
                let bbox = Rect::centered_on(start.center, 16.0, 8.0);
                if env.is_out_of_bounds(&bbox) {
                    start_blocked += 1;
                }
            }
            Err(_) => no_start += 1,
        }
        for (x, y, kind) in env.grid().iter() {
            tiles_checked += 1;
            let bbox = Rect::for_tile(env.transform(), x as i32, y as i32);
            if env.is_out_of_bounds(&bbox) != (kind == TileKind::Wall) {
                wrong_verdicts += 1;
            }
        }
    }

    vec![
        TestResult {
            name: "start_found".into(),
            passed: no_start == 0,
            detail: format!("{} of {} maps without a start tile", no_start, config.seeds),
        },
        TestResult {
            name: "start_in_bounds".into(),
            passed: start_blocked == 0,
            detail: format!("{} start positions reported out of bounds", start_blocked),
        },
        TestResult {
            name: "tile_verdicts".into(),
            passed: wrong_verdicts == 0,
            detail: format!(
                "{} of {} tile-sized boxes got the wrong verdict",
                wrong_verdicts, tiles_checked
            ),
        },
    ]
}

// ── 4. Broad Phase ──────────────────────────────────────────────────────

fn probe_boxes<G: DungeonGenerator>(env: &Environment<G>, step: f32) -> Vec<Rect> {
    let t = env.transform();
    let n = env.grid().side_length() as i32;
    let top_left = t.tile_origin(-1, n + 1);
    let bottom_right = t.tile_origin(n + 1, -1);
    let bottom = t.tile_origin(n + 1, n + 1).y;
    let top = t.tile_origin(-1, -1).y;

    let mut boxes = Vec::new();
    let mut y = top;
    let mut i = 0usize;
    while y <= bottom {
        let mut x = top_left.x;
        while x <= bottom_right.x {
            // Vary the box size so widths differ from the tile width.
            let (w, h) = [(16.0, 8.0), (40.0, 12.0), (64.0, 32.0), (90.0, 30.0)][i % 4];
            boxes.push(Rect::centered_on(Point::new(x, y), w, h));
            x += step;
            i += 1;
        }
        y += step;
    }
    boxes
}

fn validate_broad_phases(config: &HarnessConfig) -> Vec<TestResult> {
    println!("--- Broad Phase ---");
    let side = config.settings.side_length().min(16);
    let base = settings_for(&config.settings, side, 1);

    let Ok(aabb) = Environment::generate(base.clone().with_broad_phase(BroadPhase::Aabb)) else {
        return vec![TestResult {
            name: "broad_phase_setup".into(),
            passed: false,
            detail: "could not generate comparison map".into(),
        }];
    };
    let grid = aabb.grid().clone();
    let Ok(footprint) =
        Environment::from_grid(base.clone().with_broad_phase(BroadPhase::Footprint), grid.clone())
    else {
        return Vec::new();
    };
    let Ok(permissive) =
        Environment::from_grid(base.with_broad_phase(BroadPhase::Permissive), grid)
    else {
        return Vec::new();
    };

    let boxes = probe_boxes(&aabb, config.probe_step);
    let mut footprint_misses = 0;
    let mut permissive_misses = 0;
    let mut aabb_misses = 0;
    for b in &boxes {
        let truth = aabb
            .bounds()
            .rects()
            .iter()
            .any(|r| polygons_overlap(&b.diamond(), &r.diamond()));
        if footprint.is_out_of_bounds(b) != truth {
            footprint_misses += 1;
        }
        if permissive.is_out_of_bounds(b) != truth {
            permissive_misses += 1;
        }
        if aabb.is_out_of_bounds(b) != truth {
            aabb_misses += 1;
        }
    }
    log::info!(
        "Broad phase over {} probes: aabb {} misses, footprint {}, permissive {}",
        boxes.len(),
        aabb_misses,
        footprint_misses,
        permissive_misses
    );

    vec![
        TestResult {
            name: "footprint_exact".into(),
            passed: footprint_misses == 0,
            detail: format!("{} of {} probes disagree with the diamond test", footprint_misses, boxes.len()),
        },
        TestResult {
            name: "permissive_exact".into(),
            passed: permissive_misses == 0,
            detail: format!("{} of {} probes disagree with the diamond test", permissive_misses, boxes.len()),
        },
        // Informational: AABB on the raw rect fields can miss narrow boxes.
        TestResult {
            name: "aabb_misses".into(),
            passed: true,
            detail: format!("{} of {} probes missed by the rect-field broad phase", aabb_misses, boxes.len()),
        },
    ]
}

// ── 5. Draw Geometry ────────────────────────────────────────────────────

fn validate_render(settings: &Settings) -> Vec<TestResult> {
    println!("--- Draw Geometry ---");
    let Ok(env) = Environment::generate(settings.clone().with_debug(true)) else {
        return vec![TestResult {
            name: "render_setup".into(),
            passed: false,
            detail: "could not generate map".into(),
        }];
    };
    let camera = Camera::new(320.0, 40.0);
    let sprites = tile_sprites(&env, &camera);
    let walkable = env.grid().iter().filter(|(_, _, k)| k.is_walkable()).count();
    let outlines = boundary_outlines(&env, &camera);

    vec![
        TestResult {
            name: "sprites_per_walkable_tile".into(),
            passed: sprites.len() == walkable,
            detail: format!("{} sprites for {} walkable tiles", sprites.len(), walkable),
        },
        TestResult {
            name: "debug_outlines".into(),
            passed: outlines.len() == env.bounds().len(),
            detail: format!("{} outlines for {} boundary rects", outlines.len(), env.bounds().len()),
        },
    ]
}
