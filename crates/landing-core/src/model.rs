//! Binary glTF (GLB) import into a [`SegmentScene`].

use crate::config::ModelPlacement;
use crate::scene::{MeshData, SceneNode, SegmentScene, TextureImage, Transform};
use fnv::FnvHashMap;
use glam::{Mat4, Quat, Vec2, Vec3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("glTF parse error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("glTF document has no scene")]
    NoScene,
    #[error("mesh on node `{0}` has no POSITION attribute")]
    MissingPositions(String),
}

/// Parse a GLB and flatten every mesh node of its default scene.
///
/// Only the embedded binary chunk is read; external buffer and image URIs
/// are treated as missing data. A base colour texture that fails to decode
/// is logged and the mesh falls back to its colour factor.
pub fn load_glb(bytes: &[u8], placement: &ModelPlacement) -> Result<SegmentScene, ModelError> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or(ModelError::NoScene)?;

    let mut loader = Loader {
        blob: gltf.blob.as_deref(),
        textures: FnvHashMap::default(),
        out: SegmentScene::new(placement.transform()),
    };
    for node in scene.nodes() {
        loader.collect_node(&node, Mat4::IDENTITY)?;
    }
    let out = loader.out;
    log::info!(
        "[model] loaded {} mesh nodes, {} textures from {} bytes",
        out.len(),
        out.textures().len(),
        bytes.len()
    );
    Ok(out)
}

struct Loader<'a> {
    blob: Option<&'a [u8]>,
    // glTF texture index -> scene texture index (None: undecodable)
    textures: FnvHashMap<usize, Option<usize>>,
    out: SegmentScene,
}

impl<'a> Loader<'a> {
    fn collect_node(&mut self, node: &gltf::Node<'_>, parent: Mat4) -> Result<(), ModelError> {
        let (t, r, s) = node.transform().decomposed();
        let local = Transform {
            translation: Vec3::from(t),
            rotation: Quat::from_array(r),
            scale: Vec3::from(s),
        };
        let name = node
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("node-{}", node.index()));

        if let Some(mesh) = node.mesh() {
            let data = self.read_mesh(&mesh, &name)?;
            self.out.push(SceneNode::new(name, parent, local, data));
        }

        let world = parent * local.matrix();
        for child in node.children() {
            self.collect_node(&child, world)?;
        }
        Ok(())
    }

    fn read_mesh(&mut self, mesh: &gltf::Mesh<'_>, name: &str) -> Result<MeshData, ModelError> {
        let blob = self.blob;
        let mut data = MeshData::default();
        let mut material_set = false;

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("[model] skipping non-triangle primitive on `{}`", name);
                continue;
            }
            let pbr = primitive.material().pbr_metallic_roughness();
            let color_info = pbr.base_color_texture();
            if !material_set {
                data.base_color = pbr.base_color_factor();
                data.texture = color_info
                    .as_ref()
                    .and_then(|info| self.texture(&info.texture()));
                material_set = true;
            }

            let reader = primitive.reader(|buffer| match buffer.source() {
                gltf::buffer::Source::Bin => blob,
                gltf::buffer::Source::Uri(_) => None,
            });
            let positions: Vec<Vec3> = reader
                .read_positions()
                .ok_or_else(|| ModelError::MissingPositions(name.to_owned()))?
                .map(Vec3::from)
                .collect();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(read) => read.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            let normals: Vec<Vec3> = match reader.read_normals() {
                Some(read) => read.map(Vec3::from).collect(),
                None => MeshData::compute_normals(&positions, &indices),
            };
            let set = color_info.as_ref().map_or(0, |info| info.tex_coord());
            let mut uvs: Vec<Vec2> = match reader.read_tex_coords(set) {
                Some(read) => read.into_f32().map(Vec2::from).collect(),
                None => Vec::new(),
            };
            uvs.resize(positions.len(), Vec2::ZERO);

            let base = data.positions.len() as u32;
            data.positions.extend(positions);
            data.normals.extend(normals);
            data.uvs.extend(uvs);
            data.indices.extend(indices.into_iter().map(|i| i + base));
        }
        Ok(data)
    }

    /// Decode a glTF texture once and return its scene index.
    fn texture(&mut self, texture: &gltf::Texture<'_>) -> Option<usize> {
        if let Some(&cached) = self.textures.get(&texture.index()) {
            return cached;
        }
        let decoded = self.decode(&texture.source());
        let slot = decoded.map(|tex| self.out.push_texture(tex));
        self.textures.insert(texture.index(), slot);
        slot
    }

    fn decode(&self, img: &gltf::Image<'_>) -> Option<TextureImage> {
        let bytes = match img.source() {
            gltf::image::Source::View { view, .. } => {
                if !matches!(view.buffer().source(), gltf::buffer::Source::Bin) {
                    return None;
                }
                let start = view.offset();
                self.blob?.get(start..start + view.length())?
            }
            gltf::image::Source::Uri { uri, .. } => {
                log::warn!("[model] external image `{}` not supported", uri);
                return None;
            }
        };
        match image::load_from_memory(bytes) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                Some(TextureImage {
                    width: rgba.width(),
                    height: rgba.height(),
                    rgba: rgba.into_raw(),
                })
            }
            Err(e) => {
                log::warn!("[model] image {} failed to decode: {}", img.index(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneProvider;

    /// Pack a JSON chunk and an optional BIN chunk into a GLB container.
    fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
        let mut json = json.as_bytes().to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut bin = bin.to_vec();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let bin_chunk = if bin.is_empty() { 0 } else { 8 + bin.len() };
        let total = 12 + 8 + json.len() + bin_chunk;
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        if !bin.is_empty() {
            glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
            glb.extend_from_slice(b"BIN\0");
            glb.extend_from_slice(&bin);
        }
        glb
    }

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    const TRIANGLE: [f32; 9] = [-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0];

    /// One triangle mesh shared by a named parent and an unnamed child.
    fn triangle_glb() -> Vec<u8> {
        let bin = f32_bytes(&TRIANGLE);
        let json = format!(
            r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0]}}],
            "nodes":[{{"name":"3","mesh":0,"translation":[2.0,0.0,0.0],"children":[1]}},
                     {{"mesh":0,"translation":[0.0,0.0,-1.0]}}],
            "meshes":[{{"primitives":[{{"attributes":{{"POSITION":0}}}}]}}],
            "accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3",
                          "min":[-1.0,-1.0,0.0],"max":[1.0,1.0,0.0]}}],
            "bufferViews":[{{"buffer":0,"byteLength":{len}}}],
            "buffers":[{{"byteLength":{len}}}]}}"#,
            len = bin.len()
        );
        glb(&json, &bin)
    }

    /// 2x1 PNG: red then blue.
    fn png_2x1() -> Vec<u8> {
        use image::ImageEncoder;
        let pixels = [255u8, 0, 0, 255, 0, 0, 255, 255];
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(&pixels, 2, 1, image::ColorType::Rgba8)
            .unwrap();
        out
    }

    /// Triangle with TEXCOORD_0 and a base colour texture embedded as a PNG
    /// buffer view; two nodes share the material.
    fn textured_glb() -> Vec<u8> {
        let positions = f32_bytes(&TRIANGLE);
        let uvs = f32_bytes(&[0.0, 1.0, 1.0, 1.0, 0.5, 0.0]);
        let png = png_2x1();
        let mut bin = positions.clone();
        bin.extend_from_slice(&uvs);
        bin.extend_from_slice(&png);
        let json = format!(
            r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0,1]}}],
            "nodes":[{{"name":"1","mesh":0}},{{"name":"2","mesh":0}}],
            "meshes":[{{"primitives":[{{"attributes":{{"POSITION":0,"TEXCOORD_0":1}},"material":0}}]}}],
            "materials":[{{"pbrMetallicRoughness":{{"baseColorFactor":[1.0,1.0,1.0,1.0],
                          "baseColorTexture":{{"index":0}}}}}}],
            "textures":[{{"source":0}}],
            "images":[{{"bufferView":2,"mimeType":"image/png"}}],
            "accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3",
                          "min":[-1.0,-1.0,0.0],"max":[1.0,1.0,0.0]}},
                         {{"bufferView":1,"componentType":5126,"count":3,"type":"VEC2"}}],
            "bufferViews":[{{"buffer":0,"byteLength":{p}}},
                           {{"buffer":0,"byteOffset":{p},"byteLength":{u}}},
                           {{"buffer":0,"byteOffset":{pu},"byteLength":{i}}}],
            "buffers":[{{"byteLength":{total}}}]}}"#,
            p = positions.len(),
            u = uvs.len(),
            pu = positions.len() + uvs.len(),
            i = png.len(),
            total = bin.len()
        );
        glb(&json, &bin)
    }

    fn identity_placement() -> ModelPlacement {
        ModelPlacement {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            ..ModelPlacement::default()
        }
    }

    #[test]
    fn loads_named_and_unnamed_mesh_nodes() {
        let scene = load_glb(&triangle_glb(), &identity_placement()).unwrap();
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.nodes()[0].name, "3");
        assert_eq!(scene.nodes()[1].name, "node-1");
        assert_eq!(scene.nodes()[0].mesh.indices, vec![0, 1, 2]);
        // generated normals for a CCW triangle in the XY plane
        assert!((scene.nodes()[0].mesh.normals[0] - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn child_inherits_parent_translation() {
        let scene = load_glb(&triangle_glb(), &identity_placement()).unwrap();
        assert_eq!(scene.world_position("3"), Some(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(scene.world_position("node-1"), Some(Vec3::new(2.0, 0.0, -1.0)));
    }

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        let err = load_glb(b"definitely not a model", &identity_placement()).unwrap_err();
        assert!(matches!(err, ModelError::Gltf(_)));
    }

    #[test]
    fn reads_uvs_and_embedded_base_color_texture() {
        let scene = load_glb(&textured_glb(), &identity_placement()).unwrap();
        assert_eq!(scene.len(), 2);
        let mesh = &scene.nodes()[0].mesh;
        assert_eq!(
            mesh.uvs,
            vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(0.5, 0.0)]
        );
        assert_eq!(mesh.texture, Some(0));
        // shared material decodes once
        assert_eq!(scene.nodes()[1].mesh.texture, Some(0));
        assert_eq!(scene.textures().len(), 1);

        let tex = &scene.textures()[0];
        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(tex.rgba, vec![255, 0, 0, 255, 0, 0, 255, 255]);
    }

    #[test]
    fn untextured_mesh_gets_zero_uvs() {
        let scene = load_glb(&triangle_glb(), &identity_placement()).unwrap();
        let mesh = &scene.nodes()[0].mesh;
        assert_eq!(mesh.uvs, vec![Vec2::ZERO; 3]);
        assert_eq!(mesh.texture, None);
        assert!(scene.textures().is_empty());
    }

    #[test]
    fn document_without_scene_is_rejected() {
        let bytes = glb(r#"{"asset":{"version":"2.0"}}"#, &[]);
        let err = load_glb(&bytes, &identity_placement()).unwrap_err();
        assert!(matches!(err, ModelError::NoScene));
    }

    #[test]
    fn mesh_without_positions_is_rejected() {
        let bin = f32_bytes(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        let json = format!(
            r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0]}}],
            "nodes":[{{"name":"4","mesh":0}}],
            "meshes":[{{"primitives":[{{"attributes":{{"NORMAL":0}}}}]}}],
            "accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3"}}],
            "bufferViews":[{{"buffer":0,"byteLength":{len}}}],
            "buffers":[{{"byteLength":{len}}}]}}"#,
            len = bin.len()
        );
        let err = load_glb(&glb(&json, &bin), &identity_placement()).unwrap_err();
        assert!(matches!(err, ModelError::MissingPositions(ref node) if node == "4"));
    }
}
