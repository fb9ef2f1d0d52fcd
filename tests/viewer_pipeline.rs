//! End-to-end checks of the load → normalize → pair → recolor pipeline on a
//! headless surface.

use std::io::Write;
use std::path::{Path, PathBuf};

use pairview::gfx::bounds::BoundingVolume;
use pairview::prelude::*;

const SHOE_OBJ: &str = "o shoe\n\
    v 0 0 0\nv 2 0 0\nv 2 1 4\nv 0 1 4\n\
    f 1 2 3 4\n";

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(bytes).unwrap();
    path
}

fn viewer() -> ModelViewer<HeadlessSurface> {
    ModelViewer::new(HeadlessSurface::new(1200, 800), ViewerConfig::default())
}

/// Minimal binary glTF: one quad spanning (0,0,0)..(2,1,4), no normals
fn quad_glb() -> Vec<u8> {
    let positions: [[f32; 3]; 4] = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 1.0, 4.0], [0.0, 1.0, 4.0]];
    let indices: [u16; 6] = [0, 1, 2, 0, 2, 3];

    let mut bin = Vec::new();
    for p in positions.iter().flatten() {
        bin.extend_from_slice(&p.to_le_bytes());
    }
    for i in indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }

    let mut json = format!(
        r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0]}}],"nodes":[{{"mesh":0,"name":"shoe"}}],"meshes":[{{"primitives":[{{"attributes":{{"POSITION":0}},"indices":1}}]}}],"buffers":[{{"byteLength":{}}}],"bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":48}},{{"buffer":0,"byteOffset":48,"byteLength":12}}],"accessors":[{{"bufferView":0,"componentType":5126,"count":4,"type":"VEC3","min":[0,0,0],"max":[2,1,4]}},{{"bufferView":1,"componentType":5123,"count":6,"type":"SCALAR"}}]}}"#,
        bin.len()
    )
    .into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

fn assert_fitted(viewer: &ModelViewer<HeadlessSurface>) {
    let presented = viewer.scene().presented().expect("nothing presented");
    let bounds = BoundingVolume::from_node(presented.root());
    assert!((bounds.max_dimension() - 5.0).abs() < 1e-3, "{:?}", bounds);
    assert!((bounds.min.y - 0.07).abs() < 1e-3, "{:?}", bounds);
}

#[test]
fn obj_asset_is_normalized_and_paired() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "shoe.obj", SHOE_OBJ.as_bytes());
    let mut viewer = viewer();

    let report = pollster::block_on(viewer.load_asset(&path)).unwrap();
    assert_eq!(report.mode, PresentationMode::Paired);
    assert_eq!(report.mesh_count, 1);
    assert_eq!(viewer.state(), ViewerState::Loaded);
    assert_fitted(&viewer);

    let presented = viewer.scene().presented().unwrap();
    let left = presented.left().unwrap().transform;
    let right = presented.right().unwrap().transform;
    assert_eq!(left.translation.x, -right.translation.x);
    assert_eq!(left.translation.z, right.translation.z);
    assert!(viewer.scene().placeholder().is_none());
}

#[test]
fn binary_gltf_asset_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "shoe.glb", &quad_glb());
    let mut viewer = viewer();

    let report = pollster::block_on(viewer.load_asset(&path)).unwrap();
    assert_eq!(report.mesh_count, 1);
    assert_fitted(&viewer);
}

#[test]
fn missing_asset_keeps_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let mut viewer = viewer();

    let err = pollster::block_on(viewer.load_asset(dir.path().join("missing.glb"))).unwrap_err();
    assert!(matches!(err, ViewerError::AssetNotFound { .. }), "{err}");
    assert_eq!(viewer.state(), ViewerState::LoadFailed);
    assert!(viewer.scene().placeholder().is_some());
    assert!(viewer.scene().presented().is_none());
}

#[test]
fn corrupt_asset_reports_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "broken.glb", b"glTF\x02\x00\x00\x00garbage");
    let mut viewer = viewer();

    let err = pollster::block_on(viewer.load_asset(&path)).unwrap_err();
    assert!(matches!(err, ViewerError::AssetDecodeFailed { .. }), "{err}");
    assert!(viewer.scene().placeholder().is_some());
}

#[test]
fn red_preset_glows_brighter_than_stock() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "shoe.obj", SHOE_OBJ.as_bytes());
    let mut viewer = viewer();
    pollster::block_on(viewer.load_asset(&path)).unwrap();

    let intensities = |viewer: &ModelViewer<HeadlessSurface>| -> Vec<f32> {
        viewer
            .scene()
            .presented()
            .unwrap()
            .root()
            .meshes_recursive()
            .iter()
            .map(|m| m.material.emissive_intensity)
            .collect()
    };

    assert_eq!(viewer.set_material_color("red"), ColorPreset::Red);
    let red = intensities(&viewer);
    assert_eq!(red.len(), 2);
    assert!(red.iter().all(|&i| i == 0.18));

    viewer.set_material_color("green");
    assert!(intensities(&viewer).iter().all(|&i| i == 0.05));

    // Unknown ids fall back to coffee instead of failing
    assert_eq!(viewer.set_material_color("chartreuse"), ColorPreset::Coffee);
}

#[test]
fn loaded_shoe_starts_grey() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "shoe.obj", SHOE_OBJ.as_bytes());
    let mut viewer = viewer();
    let report = pollster::block_on(viewer.load_asset(&path)).unwrap();

    assert_eq!(report.preset, Some(ColorPreset::Grey));
    let meshes = viewer.scene().presented().unwrap().root().meshes_recursive();
    assert_eq!(meshes.len(), 2);
    for mesh in meshes {
        assert_eq!(mesh.material.base_color, ColorPreset::Grey.base_color());
        assert_eq!(mesh.material.emissive_intensity, 0.05);
    }
}

#[test]
fn overlapping_loads_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "shoe.obj", SHOE_OBJ.as_bytes());
    let mut viewer = viewer();

    let pending = viewer.begin_load(&path).unwrap();
    assert!(matches!(
        viewer.begin_load(&path),
        Err(ViewerError::LoadInProgress { .. })
    ));
    let completion = pollster::block_on(pending.resolve());
    viewer.complete_load(completion).unwrap();

    // Placeholder and presented object never coexist
    assert!(viewer.scene().placeholder().is_none());
}

#[test]
fn resize_sets_exact_aspect() {
    let mut viewer = viewer();
    assert!(viewer.on_resize(1000, 500));
    assert_eq!(viewer.scene().environment.camera().aspect, 2.0);
    assert_eq!(viewer.surface().size(), (1000, 500));

    assert!(viewer.on_resize(640, 480));
    assert!(viewer.is_narrow());
    assert_eq!(viewer.scene().environment.camera().aspect, 640.0 / 480.0);
}

#[test]
fn frame_loop_draws_environment_and_pair() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "shoe.obj", SHOE_OBJ.as_bytes());
    let mut viewer = viewer();
    pollster::block_on(viewer.load_asset(&path)).unwrap();

    let handle = viewer.start_frame_loop();
    assert_eq!(
        viewer.render_tick().unwrap(),
        TickStatus::Rendered { frame: 1 }
    );
    // Floor, two grid layers, two shoes
    assert_eq!(viewer.surface().last_frame().draw_calls, 5);
    assert_eq!(viewer.surface().last_frame().triangles, 2 + 2 + 2);

    handle.cancel();
    assert_eq!(viewer.render_tick().unwrap(), TickStatus::Stopped);
}
