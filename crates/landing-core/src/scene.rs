//! Pickable scene graph for the loaded model.
//!
//! Each mesh node of the model becomes a [`SceneNode`]: its name (the segment
//! id for pickable regions), the accumulated parent matrix from the asset, a
//! local transform that hover highlights mutate, and the triangle data used
//! for both rendering and exact ray picking.

use crate::picking::{ray_aabb_hit_t, ray_triangle, Aabb, PickHit, Ray};
use fnv::FnvHashMap;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// Query and mutation seam between the interaction controller and whatever
/// holds the rendered objects.
pub trait SceneProvider {
    /// Nearest object hit by `ray`, if any.
    fn pick(&self, ray: &Ray) -> Option<PickHit<'_>>;
    /// World-space origin of the named object.
    fn world_position(&self, name: &str) -> Option<Vec3>;
    fn scale(&self, name: &str) -> Option<Vec3>;
    /// Returns `false` when no object has that name.
    fn set_scale(&mut self, name: &str, scale: Vec3) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Build from an Euler XYZ rotation in radians.
    pub fn from_euler(translation: Vec3, euler: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z),
            scale,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Decoded RGBA8 image, rows top to bottom.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// TEXCOORD_0, one per position.
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    /// Multiplied with the base colour texture when there is one.
    pub base_color: [f32; 4],
    /// Index into [`SegmentScene::textures`].
    pub texture: Option<usize>,
}

impl Default for MeshData {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            texture: None,
        }
    }
}

impl MeshData {
    /// Axis-aligned box centred on the origin, 12 triangles.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];
        let mut mesh = MeshData::default();
        for (n, u, v) in faces {
            let base = mesh.positions.len() as u32;
            let c = n * h;
            let (du, dv) = (u * h, v * h);
            let corners = [c - du - dv, c + du - dv, c + du + dv, c - du + dv];
            let uvs = [Vec2::new(0.0, 1.0), Vec2::ONE, Vec2::new(1.0, 0.0), Vec2::ZERO];
            for (corner, uv) in corners.into_iter().zip(uvs) {
                mesh.positions.push(corner);
                mesh.normals.push(n);
                mesh.uvs.push(uv);
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                *self.positions.get(tri[0] as usize)?,
                *self.positions.get(tri[1] as usize)?,
                *self.positions.get(tri[2] as usize)?,
            ])
        })
    }

    /// Smooth per-vertex normals from face normals, area weighted.
    pub fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; positions.len()];
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(pa), Some(pb), Some(pc)) = (positions.get(a), positions.get(b), positions.get(c))
            else {
                continue;
            };
            let face = (*pb - *pa).cross(*pc - *pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    /// Accumulated transform of the node's ancestors inside the asset.
    pub parent: Mat4,
    pub local: Transform,
    pub mesh: MeshData,
    bounds: Option<Aabb>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, parent: Mat4, local: Transform, mesh: MeshData) -> Self {
        let bounds = Aabb::from_points(&mesh.positions);
        Self {
            name: name.into(),
            parent,
            local,
            mesh,
            bounds,
        }
    }
}

/// The model: a placement transform plus its mesh nodes.
#[derive(Clone, Debug, Default)]
pub struct SegmentScene {
    root: Transform,
    nodes: Vec<SceneNode>,
    by_name: FnvHashMap<String, usize>,
    textures: Vec<TextureImage>,
}

impl SegmentScene {
    pub fn new(root: Transform) -> Self {
        Self {
            root,
            nodes: Vec::new(),
            by_name: FnvHashMap::default(),
            textures: Vec::new(),
        }
    }

    /// Store a decoded texture and return the index meshes refer to it by.
    pub fn push_texture(&mut self, image: TextureImage) -> usize {
        self.textures.push(image);
        self.textures.len() - 1
    }

    pub fn textures(&self) -> &[TextureImage] {
        &self.textures
    }

    /// Add a node; when names collide the first node keeps the name lookup.
    pub fn push(&mut self, node: SceneNode) {
        let index = self.nodes.len();
        self.by_name.entry(node.name.clone()).or_insert(index);
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&SceneNode> {
        self.by_name.get(name).map(|&i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// World matrix of node `index`: placement * ancestors * local.
    pub fn world_matrix(&self, index: usize) -> Option<Mat4> {
        let node = self.nodes.get(index)?;
        Some(self.root.matrix() * node.parent * node.local.matrix())
    }

    fn pick_node(&self, index: usize, ray: &Ray) -> Option<f32> {
        let node = &self.nodes[index];
        let bounds = node.bounds?;
        let world = self.world_matrix(index)?;
        if world.determinant().abs() <= f32::EPSILON {
            return None;
        }
        // Affine maps preserve the ray parameter, so local t is world distance.
        let inv = world.inverse();
        let origin = inv.transform_point3(ray.origin);
        let dir = inv.transform_vector3(ray.dir);
        ray_aabb_hit_t(origin, dir, bounds.min, bounds.max)?;
        node.mesh
            .triangles()
            .filter_map(|tri| ray_triangle(origin, dir, tri))
            .min_by(|a, b| a.total_cmp(b))
    }
}

impl SceneProvider for SegmentScene {
    fn pick(&self, ray: &Ray) -> Option<PickHit<'_>> {
        let mut best: Option<(usize, f32)> = None;
        for index in 0..self.nodes.len() {
            let Some(t) = self.pick_node(index, ray) else {
                continue;
            };
            match best {
                // strict: equal distance keeps the lower index
                Some((_, bt)) if t >= bt => {}
                _ => best = Some((index, t)),
            }
        }
        let (node, distance) = best?;
        Some(PickHit {
            node,
            name: &self.nodes[node].name,
            distance,
            point: ray.at(distance),
        })
    }

    fn world_position(&self, name: &str) -> Option<Vec3> {
        let index = *self.by_name.get(name)?;
        self.world_matrix(index).map(|m| m.w_axis.truncate())
    }

    fn scale(&self, name: &str) -> Option<Vec3> {
        self.node(name).map(|n| n.local.scale)
    }

    fn set_scale(&mut self, name: &str, scale: Vec3) -> bool {
        match self.by_name.get(name) {
            Some(&i) => {
                self.nodes[i].local.scale = scale;
                true
            }
            None => false,
        }
    }
}
