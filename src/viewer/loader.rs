//! Asset loading
//!
//! Turns a file path into a scene-graph [`Node`]. Loading is a single-shot
//! future so the host can run the decode on a worker thread; the result is
//! handed back to the viewer on the render thread.

use std::collections::HashMap;
use std::io::{BufReader, Cursor};
use std::path::Path;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::error::LoadError;
use crate::gfx::resources::material::{Color, Material};
use crate::gfx::scene::{
    mesh::{Geometry, Mesh},
    node::{Node, Transform},
};

const GLB_MAGIC: &[u8; 4] = b"glTF";

/// Source of decoded assets
pub trait AssetLoader: Send + Sync {
    fn load(&self, path: &Path) -> BoxFuture<'static, Result<Node, LoadError>>;
}

/// Container formats the file loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    /// Binary or JSON glTF 2.0
    Gltf,
    /// Wavefront OBJ with optional MTL
    Obj,
}

impl AssetFormat {
    /// Picks the format from the leading bytes, then the extension
    pub fn detect(path: &Path, bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(GLB_MAGIC) {
            return Some(AssetFormat::Gltf);
        }
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "glb" | "gltf" => Some(AssetFormat::Gltf),
            "obj" => Some(AssetFormat::Obj),
            _ => None,
        }
    }
}

/// Loads assets from the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FileAssetLoader;

impl FileAssetLoader {
    pub fn new() -> Self {
        Self
    }

    /// Reads and decodes `path` synchronously
    pub fn load_file(path: &Path) -> Result<Node, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        let node = match AssetFormat::detect(path, &bytes) {
            Some(AssetFormat::Gltf) => decode_gltf(path, base, &bytes)?,
            Some(AssetFormat::Obj) => decode_obj(path, base, &bytes)?,
            None => return Err(LoadError::decode(path, "unsupported asset format")),
        };

        log::info!(
            "Decoded {} ({} meshes, {} bytes)",
            path.display(),
            node.mesh_count(),
            bytes.len()
        );
        Ok(node)
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(&self, path: &Path) -> BoxFuture<'static, Result<Node, LoadError>> {
        let path = path.to_path_buf();
        async move { Self::load_file(&path) }.boxed()
    }
}

fn asset_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("asset")
        .to_string()
}

fn decode_gltf(path: &Path, base: &Path, bytes: &[u8]) -> Result<Node, LoadError> {
    let gltf::Gltf { document, blob } =
        gltf::Gltf::from_slice(bytes).map_err(|e| LoadError::decode(path, e))?;
    let buffers =
        gltf::import_buffers(&document, Some(base), blob).map_err(|e| LoadError::decode(path, e))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LoadError::decode(path, "document contains no scene"))?;

    let mut meshes = HashMap::new();
    let mut root = Node::new(asset_name(path));
    for node in scene.nodes() {
        root.add_child(convert_gltf_node(&node, &buffers, &mut meshes));
    }
    Ok(root)
}

fn convert_gltf_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    meshes: &mut HashMap<usize, Vec<Mesh>>,
) -> Node {
    let (translation, rotation, scale) = node.transform().decomposed();
    let mut out = Node::new(node.name().unwrap_or("node"));
    out.transform = Transform::from_decomposed(translation, rotation, scale);

    if let Some(mesh) = node.mesh() {
        out.meshes = meshes
            .entry(mesh.index())
            .or_insert_with(|| convert_gltf_mesh(&mesh, buffers))
            .clone();
    }
    for child in node.children() {
        out.add_child(convert_gltf_node(&child, buffers, meshes));
    }
    out
}

fn convert_gltf_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Vec<Mesh> {
    let mut out = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("Skipping non-triangle primitive in mesh {}", mesh.index());
            continue;
        }
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<f32> = positions.flatten().collect();
        let normals: Vec<f32> = reader
            .read_normals()
            .map(|iter| iter.flatten().collect())
            .unwrap_or_default();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..(positions.len() / 3) as u32).collect(),
        };

        let geometry = Arc::new(Geometry::from_flat(&positions, &normals, indices));
        out.push(Mesh::new(geometry, convert_gltf_material(&primitive.material())));
    }
    out
}

fn convert_gltf_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    let opacity = match material.alpha_mode() {
        gltf::material::AlphaMode::Blend => a,
        _ => 1.0,
    };
    Material::new(
        material.name().unwrap_or("gltf"),
        Color::new(r, g, b),
        pbr.metallic_factor(),
        pbr.roughness_factor(),
    )
    .with_opacity(opacity)
    .with_emission(Color::from(material.emissive_factor()), 1.0)
    .with_double_sided(material.double_sided())
}

fn decode_obj(path: &Path, base: &Path, bytes: &[u8]) -> Result<Node, LoadError> {
    let mut reader = BufReader::new(Cursor::new(bytes));
    let (models, materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |mtl_path| tobj::load_mtl(base.join(mtl_path)),
    )
    .map_err(|e| LoadError::decode(path, e))?;

    let materials = materials.unwrap_or_else(|e| {
        log::debug!("No usable MTL for {}: {}", path.display(), e);
        Vec::new()
    });

    let mut root = Node::new(asset_name(path));
    for model in models {
        let mesh = &model.mesh;
        let material = mesh
            .material_id
            .and_then(|id| materials.get(id))
            .map(convert_obj_material)
            .unwrap_or_default();
        let geometry = Arc::new(Geometry::from_flat(
            &mesh.positions,
            &mesh.normals,
            mesh.indices.clone(),
        ));
        root.add_child(Node::with_meshes(
            model.name.clone(),
            vec![Mesh::new(geometry, material)],
        ));
    }
    Ok(root)
}

fn convert_obj_material(mtl: &tobj::Material) -> Material {
    let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
    // MTL has no metalness; shininess maps loosely onto roughness
    let roughness = 1.0 - (mtl.shininess.unwrap_or(32.0) / 128.0).clamp(0.0, 1.0);
    Material::new(&mtl.name, Color::from(diffuse), 0.0, roughness)
        .with_opacity(mtl.dissolve.unwrap_or(1.0))
}

/// Finish every loaded surface receives before it is presented
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockFinish {
    pub base_color: Color,
    pub roughness: f32,
    pub metallic: f32,
    pub emissive: Color,
    pub emissive_intensity: f32,
}

impl Default for StockFinish {
    fn default() -> Self {
        Self {
            base_color: Color::from_hex(0xd6a187),
            roughness: 0.5,
            metallic: 0.2,
            emissive: Color::from_hex(0x222222),
            emissive_intensity: 0.05,
        }
    }
}

/// Prepares decoded surfaces for the stage
///
/// Every mesh casts and receives shadows; every material becomes opaque,
/// double-sided and smooth-shaded with the stock finish.
pub fn prepare_surfaces(node: &mut Node, finish: &StockFinish) {
    node.for_each_mesh_mut(&mut |mesh| {
        mesh.cast_shadow = true;
        mesh.receive_shadow = true;

        let material = &mut mesh.material;
        material.double_sided = true;
        material.flat_shading = false;
        material.opacity = 1.0;
        material.transparent = false;
        material.unlit = false;
        material.roughness = finish.roughness;
        material.metallic = finish.metallic;
        material.base_color = finish.base_color;
        material.emissive = finish.emissive;
        material.emissive_intensity = finish.emissive_intensity;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    const QUAD_OBJ: &str = "o quad\n\
        v 0 0 0\nv 2 0 0\nv 2 1 4\nv 0 1 4\n\
        f 1 2 3 4\n";

    #[test]
    fn detects_formats() {
        assert_eq!(
            AssetFormat::detect(Path::new("a.bin"), b"glTF\x02\0\0\0"),
            Some(AssetFormat::Gltf)
        );
        assert_eq!(AssetFormat::detect(Path::new("a.GLTF"), b"{"), Some(AssetFormat::Gltf));
        assert_eq!(AssetFormat::detect(Path::new("shoe.obj"), b"v"), Some(AssetFormat::Obj));
        assert_eq!(AssetFormat::detect(Path::new("shoe.fbx"), b"x"), None);
        assert_eq!(AssetFormat::detect(Path::new("noext"), b"x"), None);
    }

    #[test]
    fn loads_obj_and_triangulates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "quad.obj", QUAD_OBJ.as_bytes());

        let node = FileAssetLoader::load_file(&path).unwrap();
        assert_eq!(node.name, "quad");
        assert_eq!(node.mesh_count(), 1);
        let mesh = node.meshes_recursive()[0];
        assert_eq!(mesh.geometry.indices().len(), 6);
        // Normals were computed since the file has none
        assert!(mesh.geometry.vertices().iter().all(|v| v.normal != [0.0; 3]));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = FileAssetLoader::load_file(Path::new("does/not/exist.glb")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert_eq!(err.path(), Path::new("does/not/exist.glb"));
    }

    #[test]
    fn garbage_glb_fails_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "broken.glb", b"this is not a model");
        let err = FileAssetLoader::load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::DecodeFailed { .. }));
    }

    #[test]
    fn unknown_extension_fails_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "shoe.fbx", b"Kaydara FBX Binary");
        let err = FileAssetLoader::load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::DecodeFailed { .. }));
    }

    #[test]
    fn loader_future_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "quad.obj", QUAD_OBJ.as_bytes());
        let node = pollster::block_on(FileAssetLoader::new().load(&path)).unwrap();
        assert_eq!(node.mesh_count(), 1);
    }

    #[test]
    fn prepared_surfaces_get_stock_finish() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "quad.obj", QUAD_OBJ.as_bytes());
        let mut node = FileAssetLoader::load_file(&path).unwrap();
        node.for_each_mesh_mut(&mut |m| m.material = m.material.clone().with_opacity(0.3));

        prepare_surfaces(&mut node, &StockFinish::default());
        let mesh = node.meshes_recursive()[0];
        assert!(mesh.cast_shadow && mesh.receive_shadow);
        assert!(mesh.material.double_sided);
        assert!(!mesh.material.transparent);
        assert_eq!(mesh.material.opacity, 1.0);
        assert_eq!(mesh.material.metallic, 0.2);
        assert_eq!(mesh.material.base_color, Color::from_hex(0xd6a187));
    }
}
