use crate::bvh::Bvh;
use crate::geometry::{Intersection, Primitive, Shape};
use crate::material::Material;
use crate::math::*;
use crate::texture::Texture;
use std::collections::HashSet;

/// The material pool reserves this many slots up front; scenes may exceed it,
/// but loaders can rely on at least this capacity without reallocation.
pub const MATERIAL_POOL_CAPACITY: usize = 256;

/// The owning container for everything the integrator reads: primitives,
/// materials, textures, the light list, optional environment lighting, and
/// the acceleration structure. Immutable once `compute_bvh` has run.
pub struct Scene {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
    textures: Vec<Texture>,
    /// Stable ids of emissive primitives, recorded at insertion time.
    light_ids: Vec<u32>,
    /// Indices of emissive primitives into the (possibly reordered)
    /// primitive array; resolved by `compute_bvh`.
    lights: Vec<usize>,
    environment: Option<usize>,
    background: Option<Color>,
    bvh: Option<Bvh>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            primitives: Vec::new(),
            materials: Vec::with_capacity(MATERIAL_POOL_CAPACITY),
            textures: Vec::new(),
            light_ids: Vec::new(),
            lights: Vec::new(),
            environment: None,
            background: None,
            bvh: None,
            next_id: 0,
        }
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_texture(&mut self, texture: Texture) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    /// Installs an equirectangular environment map by texture index.
    pub fn set_environment(&mut self, texture: usize) {
        self.environment = Some(texture);
    }

    /// Installs a constant background color used when no environment map is
    /// present. Without either, misses fall back to the analytic sky.
    pub fn set_background(&mut self, color: Color) {
        self.background = Some(color);
    }

    /// Adds a primitive, assigning it the next stable id. Emissive materials
    /// register the primitive in the light list for next-event estimation.
    pub fn add_primitive(&mut self, shape: Shape, material: usize) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        if self.materials[material].is_emissive() {
            self.light_ids.push(id);
        }
        self.primitives.push(Primitive::new(shape, material, id));
        id
    }

    /// Builds the BVH in one shot. The primitive array is reordered in place,
    /// so the light index list is re-resolved from the stable ids afterwards.
    pub fn compute_bvh(&mut self) {
        let bvh = Bvh::build(&mut self.primitives);
        log::debug!(
            "built BVH: {} nodes over {} primitives ({} lights)",
            bvh.nodes().len(),
            self.primitives.len(),
            self.light_ids.len()
        );
        self.bvh = Some(bvh);

        let ids: HashSet<u32> = self.light_ids.iter().copied().collect();
        self.lights = self
            .primitives
            .iter()
            .enumerate()
            .filter(|(_, p)| ids.contains(&p.id))
            .map(|(i, _)| i)
            .collect();
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn material(&self, index: usize) -> &Material {
        &self.materials[index]
    }

    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn light_count(&self) -> usize {
        if self.bvh.is_some() {
            self.lights.len()
        } else {
            self.light_ids.len()
        }
    }

    /// Uniformly chosen light primitive, or `None` in a lightless scene.
    /// Valid after `compute_bvh`.
    pub fn random_light(&self) -> Option<&Primitive> {
        if self.lights.is_empty() {
            return None;
        }
        let index = ((random_double() * self.lights.len() as f64) as usize)
            .min(self.lights.len() - 1);
        Some(&self.primitives[self.lights[index]])
    }

    /// Closest surface hit. Uses the BVH when built; falls back to a linear
    /// scan otherwise (the two agree — the scan is also what the conformance
    /// tests compare against).
    pub fn find_intersection(&self, ray: &Ray) -> Option<Intersection> {
        match &self.bvh {
            Some(bvh) => bvh.intersect(&self.primitives, ray),
            None => self
                .primitives
                .iter()
                .filter_map(|p| p.intersect(ray))
                .min_by(|a, b| a.t.total_cmp(&b.t)),
        }
    }

    /// The single point of albedo resolution: the texture sample when the
    /// material carries one (already decoded to linear), the flat material
    /// color otherwise.
    pub fn albedo(&self, hit: &Intersection) -> Color {
        let material = &self.materials[hit.material];
        match material.texture {
            Some(texture) => self.textures[texture].sample(hit.uv),
            None => material.albedo,
        }
    }

    /// Radiance for rays that leave the scene: the environment map when
    /// present, else the configured constant, else the analytic sky gradient.
    pub fn background(&self, ray: &Ray) -> Color {
        if let Some(texture) = self.environment {
            let uv = direction_to_uv(ray.direction.normalized());
            return self.textures[texture].sample(uv);
        }
        if let Some(color) = self.background {
            return color;
        }
        let t = 0.5 * (ray.direction.normalized().y + 1.0);
        Color::ones().lerp(Color::new(0.5, 0.7, 1.0), t)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
