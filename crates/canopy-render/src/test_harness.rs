//! End-to-end checks: CSV text through the encoder into the tracer.

use canopy_core::{RenderConfig, TileConfig, TileLoad};
use canopy_ingest::parse_str;
use canopy_tile::encode_records;
use glam::{IVec2, UVec3, Vec2, Vec3};

use crate::camera::OrbitCamera;
use crate::ray::{Ray, Viewport};
use crate::renderer::{Framebuffer, TileRenderer, TraceHit};
use crate::scene::TileScene;

const TWO_YEARS: &str = "Year,Cell,SLA,Wooddens,Longevity,Height\n\
    2000,0,1.0,1.0,1.0,10\n\
    2000,1,1.0,1.0,1.0,20\n\
    2001,0,1.0,1.0,1.0,10\n";

fn load(text: &str) -> TileLoad {
    let corpus = parse_str(text).expect("parse");
    let (tile, _) = encode_records(&corpus.records, &corpus.statistics, &TileConfig::default())
        .expect("encode");
    tile
}

/// First lit voxel in year layer `z`.
fn lit_slot(tile: &TileLoad, z: u32) -> IVec2 {
    let rows = tile.tree_rows_per_tile;
    for y in 0..rows {
        for x in 0..rows {
            if tile.texture.texel(UVec3::new(x, y, z)) != 0 {
                return IVec2::new(x as i32, y as i32);
            }
        }
    }
    panic!("no lit voxel in layer {z}");
}

fn down_at(scene: &TileScene, slot: IVec2) -> Ray {
    let ground = scene.slot_center(slot);
    Ray::new(ground + Vec3::Y * 5_000.0, Vec3::NEG_Y)
}

#[test]
fn test_ray_down_onto_tree_hits_canopy() {
    let tile = load(TWO_YEARS);
    let slot = lit_slot(&tile, 0);
    let config = RenderConfig::default();
    let scene = TileScene::new(tile, &config);
    let renderer = TileRenderer::new(config);

    let ray = down_at(&scene, slot);
    assert_eq!(renderer.trace(&scene, &ray, 0.0), TraceHit::Canopy);
    assert_eq!(renderer.trace(&scene, &ray, 1.0), TraceHit::Canopy);
}

#[test]
fn test_ray_onto_empty_voxel_falls_back() {
    let tile = load(TWO_YEARS);
    let lit = lit_slot(&tile, 0);
    let config = RenderConfig::default();
    let scene = TileScene::new(tile, &config);
    let renderer = TileRenderer::new(config);

    for y in 0..6 {
        for x in 0..6 {
            let slot = IVec2::new(x, y);
            if slot == lit {
                continue;
            }
            let hit = renderer.trace(&scene, &down_at(&scene, slot), 0.0);
            assert!(
                matches!(hit, TraceHit::Ground | TraceHit::GridLine),
                "slot {slot:?} resolved to {hit:?}"
            );
        }
    }
}

#[test]
fn test_ray_missing_tile_is_background() {
    let config = RenderConfig::default();
    let scene = TileScene::new(load(TWO_YEARS), &config);
    let renderer = TileRenderer::new(config);

    let sky = Ray::new(Vec3::new(0.0, 2_000.0, 0.0), Vec3::Y);
    assert_eq!(renderer.trace(&scene, &sky, 0.0), TraceHit::Background);
    let beside = Ray::new(Vec3::new(20_000.0, 100.0, 0.0), Vec3::NEG_Y);
    assert_eq!(renderer.trace(&scene, &beside, 0.0), TraceHit::Background);
}

#[test]
fn test_horizontal_ray_hits_trunk_below_canopy() {
    let tile = load(TWO_YEARS);
    let slot = lit_slot(&tile, 0);
    let config = RenderConfig {
        tree_height_scale: 6_000.0,
        ..Default::default()
    };
    let scene = TileScene::new(tile, &config);
    let renderer = TileRenderer::new(config);

    let center = scene.slot_center(slot);
    let tree = scene.tree_at(slot, 128.0 / 255.0);
    let low = tree.trunk_height * 0.25;
    assert!(low < tree.canopy_center.y - tree.canopy_radius);

    let ray = Ray::new(Vec3::new(center.x - 3_000.0, low, center.z), Vec3::X);
    assert_eq!(renderer.trace(&scene, &ray, 0.0), TraceHit::Trunk);

    let high = tree.canopy_center.y;
    let ray = Ray::new(Vec3::new(center.x - 3_000.0, high, center.z), Vec3::X);
    assert_eq!(renderer.trace(&scene, &ray, 0.0), TraceHit::Canopy);
}

#[test]
fn test_tree_absent_in_year_without_record() {
    // Cell 0 has a tree in 2000 only; cells 0..=3 form a 2x2 tile.
    let text = "Year,Cell,SLA,Wooddens,Longevity,Height\n\
        2000,0,1.0,1.0,1.0,10\n\
        2001,3,2.0,2.0,2.0,10\n\
        2002,3,2.0,2.0,2.0,10\n";
    let tile = load(text);
    let first = lit_slot(&tile, 0);
    let config = RenderConfig::default();
    let scene = TileScene::new(tile, &config);
    let renderer = TileRenderer::new(config);

    let ray = down_at(&scene, first);
    assert_eq!(renderer.trace(&scene, &ray, 0.0), TraceHit::Canopy);
    assert_ne!(renderer.trace(&scene, &ray, 1.0), TraceHit::Canopy);
}

#[test]
fn test_step_budget_limits_walk() {
    let tile = load(TWO_YEARS);
    let slot = lit_slot(&tile, 0);
    let config = RenderConfig {
        max_sample_steps: 1,
        ..Default::default()
    };
    let scene = TileScene::new(tile, &config);
    let renderer = TileRenderer::new(config);

    // Enter the box from whichever side leaves the tree several slots
    // along the ray, beyond a one-slot budget.
    let center = scene.slot_center(slot);
    let (min, max) = scene.bounds();
    let edge = if slot.x >= 3 { min.x } else { max.x };
    let distance_in_slots = (center.x - edge).abs() / scene.slot_size();
    assert!(
        distance_in_slots > 2.0,
        "tree only {distance_in_slots} slots from the entry edge"
    );
    let origin = Vec3::new(edge + (edge - center.x).signum() * 100.0, 10.0, center.z);
    let target = Vec3::new(center.x, 10.0, center.z);
    let ray = Ray::new(origin, target - origin);

    let hit = renderer.trace(&scene, &ray, 0.0);
    assert_ne!(hit, TraceHit::Canopy);
    assert_ne!(hit, TraceHit::Trunk);

    let unbounded = TileRenderer::new(RenderConfig::default());
    let hit = unbounded.trace(&scene, &ray, 0.0);
    assert!(matches!(hit, TraceHit::Canopy | TraceHit::Trunk), "got {hit:?}");
}

#[test]
fn test_diagonal_walk_respects_step_budget() {
    let mut text = String::from("Year,Cell,SLA,Wooddens,Longevity,Height\n");
    for cell in 0..9 {
        text.push_str(&format!("2000,{cell},1.0,1.0,1.0,10\n"));
    }
    let config = RenderConfig::default();
    let scene = TileScene::new(load(&text), &config);
    assert_eq!(scene.tree_rows(), 18);
    let renderer = TileRenderer::new(config.clone());

    let (min, max) = scene.bounds();
    let origin = Vec3::new(min.x - 100.0, 10.0, min.z - 100.0);
    let target = Vec3::new(max.x, 10.0, max.z);
    let ray = Ray::new(origin, target - origin);

    let (walk, _, _) = renderer.sample_path(&scene, &ray).expect("ray crosses the tile");
    let slots: Vec<IVec2> = walk.collect();
    assert_eq!(slots.first(), Some(&IVec2::ZERO));
    assert!(
        slots.len() <= config.max_sample_steps as usize + 1,
        "{} voxels sampled",
        slots.len()
    );
    for pair in slots.windows(2) {
        let d = (pair[1] - pair[0]).abs();
        assert_eq!(d.x + d.y, 1);
    }

    let wide = TileRenderer::new(RenderConfig {
        max_sample_steps: 100,
        ..config
    });
    let (walk, _, _) = wide.sample_path(&scene, &ray).expect("ray crosses the tile");
    assert_eq!(walk.last(), Some(IVec2::splat(17)));
}

#[test]
fn test_rendered_frame_contains_trees_and_background() {
    let config = RenderConfig::default();
    let camera = OrbitCamera::framing(config.tile_world_size);
    let scene = TileScene::new(load(TWO_YEARS), &config);
    let renderer = TileRenderer::new(config);

    let viewport = Viewport::full(96, 64);
    let uniforms = camera.to_uniforms(viewport, 0.0);
    let mut fb = Framebuffer::new(96, 64, [0, 0, 0, 0]);
    renderer.render(&scene, &uniforms, &mut fb);

    let palette = renderer.palette();
    let pixels = fb.pixels();
    assert!(pixels.iter().all(|p| p[3] == 0xff), "every pixel written");
    assert!(pixels.contains(&palette.background));
    assert!(pixels.contains(&palette.ground) || pixels.contains(&palette.grid_line));
    // The top-left corner looks over the tile into the sky.
    assert_eq!(fb.pixel(0, 0), Some(palette.background));
}

#[test]
fn test_viewport_offset_renders_only_its_rectangle() {
    let config = RenderConfig::default();
    let camera = OrbitCamera::framing(config.tile_world_size);
    let scene = TileScene::new(load(TWO_YEARS), &config);
    let renderer = TileRenderer::new(config);

    let right = Viewport {
        x: 32.0,
        y: 0.0,
        width: 32.0,
        height: 32.0,
    };
    let uniforms = camera.to_uniforms(right, 0.0);
    let mut fb = Framebuffer::new(64, 32, [0, 0, 0, 0]);
    renderer.render(&scene, &uniforms, &mut fb);

    assert_eq!(fb.pixel(0, 16), Some([0, 0, 0, 0]));
    assert_eq!(fb.pixel(31, 31), Some([0, 0, 0, 0]));

    // The offset viewport's pixels match a full render of the same size.
    let mut alone = Framebuffer::new(32, 32, [0, 0, 0, 0]);
    let full = camera.to_uniforms(Viewport::full(32, 32), 0.0);
    renderer.render(&scene, &full, &mut alone);
    for y in 0..32 {
        for x in 0..32 {
            assert_eq!(fb.pixel(x + 32, y), alone.pixel(x, y), "pixel ({x},{y})");
        }
    }

    let center = renderer.shade_pixel(&scene, &uniforms, Vec2::new(48.0, 16.0));
    assert_eq!(center[3], 0xff);
}
