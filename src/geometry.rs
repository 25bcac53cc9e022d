use crate::math::*;
use crate::stats;

/// Lower parametric bound for primitive hits. Roots closer than this are
/// rejected so that a ray restarting on a surface cannot re-hit it.
pub const HIT_EPSILON: f64 = 1e-3;

// ─── Intersection Record ────────────────────────────────────────────────────

/// The transient result of a successful ray/primitive query.
///
/// `normal` always faces the incoming ray; `inside` records that the
/// geometric outward normal had to be flipped to achieve that, i.e. the ray
/// origin was on the interior side of the surface. The dielectric BxDF uses
/// the flag to orient the refraction ratio.
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    pub t: f64,
    pub point: Point3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub inside: bool,
    pub material: usize,
    pub primitive_id: u32,
}

// ─── Sphere ─────────────────────────────────────────────────────────────────

/// An analytic sphere. The radius must be positive; degenerate spheres never
/// intersect anything.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Point3,
    pub radius: f64,
}

impl Sphere {
    pub const fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn bounding_box(&self) -> Aabb {
        let r = Vec3::splat(self.radius.abs());
        Aabb::new(self.center - r, self.center + r)
    }

    /// Quadratic intersection using the half-b formulation:
    /// a = |d|², h = d·(c−o), c = |c−o|² − r². The smaller root wins when it
    /// lies strictly inside (ε, ∞); otherwise the larger root is tried.
    fn intersect(&self, ray: &Ray) -> Option<(f64, Vec3, bool)> {
        if self.radius <= 0.0 {
            return None;
        }
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let valid = Interval::new(HIT_EPSILON, f64::INFINITY);
        let sqrtd = discriminant.sqrt();
        let mut root = (h - sqrtd) / a;
        if !valid.surrounds(root) {
            root = (h + sqrtd) / a;
            if !valid.surrounds(root) {
                return None;
            }
        }

        let point = ray.at(root);
        let mut normal = (point - self.center) / self.radius;
        let mut inside = false;
        if ray.direction.dot(normal) > 0.0 {
            // Exiting the interior: make the normal face the ray.
            normal = -normal;
            inside = true;
        }
        Some((root, normal, inside))
    }
}

// ─── Triangle ───────────────────────────────────────────────────────────────

/// A triangle with per-vertex positions, normals, and texture coordinates.
/// Normals and UVs are zero-filled when the source mesh lacks them; shading
/// falls back to the flat face normal in that case.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub positions: [Point3; 3],
    pub normals: [Vec3; 3],
    pub uvs: [Vec2; 3],
}

impl Triangle {
    pub const fn new(positions: [Point3; 3], normals: [Vec3; 3], uvs: [Vec2; 3]) -> Self {
        Self {
            positions,
            normals,
            uvs,
        }
    }

    /// Convenience constructor for bare geometry (flat shading, no UVs).
    pub const fn from_positions(v0: Point3, v1: Point3, v2: Point3) -> Self {
        Self::new(
            [v0, v1, v2],
            [Vec3::zero(), Vec3::zero(), Vec3::zero()],
            [Vec2::zero(), Vec2::zero(), Vec2::zero()],
        )
    }

    pub fn bounding_box(&self) -> Aabb {
        // Small padding keeps axis-aligned triangles from producing a
        // zero-thickness slab.
        let eps = Vec3::splat(1e-4);
        let [v0, v1, v2] = self.positions;
        Aabb::new(v0.min(v1).min(v2) - eps, v0.max(v1).max(v2) + eps)
    }

    /// Unnormalized plane normal (v1−v0) × (v2−v0).
    #[inline]
    fn plane_normal(&self) -> Vec3 {
        let [v0, v1, v2] = self.positions;
        (v1 - v0).cross(v2 - v0)
    }

    pub fn face_normal(&self) -> Vec3 {
        self.plane_normal().normalized()
    }

    pub fn area(&self) -> f64 {
        0.5 * self.plane_normal().length()
    }

    fn has_vertex_normals(&self) -> bool {
        !(self.normals[0].near_zero() && self.normals[1].near_zero() && self.normals[2].near_zero())
    }

    /// Geometric plane-then-edges intersection. Near-parallel rays and roots
    /// in front of the epsilon are rejected; the three edge-sign tests decide
    /// containment.
    fn intersect(&self, ray: &Ray) -> Option<(f64, Point3)> {
        let [v0, v1, v2] = self.positions;
        let n = self.plane_normal();

        let n_dot_dir = n.dot(ray.direction);
        if n_dot_dir.abs() < HIT_EPSILON {
            return None;
        }

        let t = n.dot(v0 - ray.origin) / n_dot_dir;
        if t < HIT_EPSILON {
            return None;
        }

        let p = ray.at(t);
        if n.dot((v1 - v0).cross(p - v0)) < 0.0
            || n.dot((v2 - v1).cross(p - v1)) < 0.0
            || n.dot((v0 - v2).cross(p - v2)) < 0.0
        {
            return None;
        }
        Some((t, p))
    }

    /// Barycentric weights of `p` with respect to the three vertices.
    fn barycentric(&self, p: Point3) -> Vec3 {
        let [a, b, c] = self.positions;
        let v0 = b - a;
        let v1 = c - a;
        let v2 = p - a;
        let d00 = v0.dot(v0);
        let d01 = v0.dot(v1);
        let d11 = v1.dot(v1);
        let d20 = v2.dot(v0);
        let d21 = v2.dot(v1);
        let denom = d00 * d11 - d01 * d01;
        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        Vec3::new(1.0 - v - w, v, w)
    }
}

// ─── Primitive ──────────────────────────────────────────────────────────────

/// The shape payload of a primitive. Dispatch is a plain `match` on the tag.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Sphere(Sphere),
    Triangle(Triangle),
}

/// A renderable object: one shape, a material slot, a precomputed bounding
/// box, and a stable id.
///
/// Ids are assigned by the scene in insertion order and survive the BVH
/// build reordering the primitive array; the light sampler matches shadow-ray
/// hits against them.
#[derive(Debug, Clone, Copy)]
pub struct Primitive {
    pub shape: Shape,
    pub material: usize,
    pub bounds: Aabb,
    pub id: u32,
}

impl Primitive {
    pub fn new(shape: Shape, material: usize, id: u32) -> Self {
        let bounds = match &shape {
            Shape::Sphere(s) => s.bounding_box(),
            Shape::Triangle(t) => t.bounding_box(),
        };
        Self {
            shape,
            material,
            bounds,
            id,
        }
    }

    /// Closest-hit query against this primitive alone.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        stats::count_intersection_test();

        match &self.shape {
            Shape::Sphere(sphere) => {
                let (t, normal, inside) = sphere.intersect(ray)?;
                let point = ray.at(t);
                // Latitude/longitude UV from the geometric outward direction.
                let outward = (point - sphere.center) / sphere.radius;
                Some(Intersection {
                    t,
                    point,
                    normal,
                    uv: direction_to_uv(outward),
                    inside,
                    material: self.material,
                    primitive_id: self.id,
                })
            }
            Shape::Triangle(triangle) => {
                let (t, point) = triangle.intersect(ray)?;
                let bary = triangle.barycentric(point);

                let mut normal = if triangle.has_vertex_normals() {
                    (triangle.normals[0] * bary.x
                        + triangle.normals[1] * bary.y
                        + triangle.normals[2] * bary.z)
                        .normalized()
                } else {
                    triangle.face_normal()
                };
                let mut inside = false;
                if ray.direction.dot(normal) > 0.0 {
                    normal = -normal;
                    inside = true;
                }

                let uv = triangle.uvs[0] * bary.x
                    + triangle.uvs[1] * bary.y
                    + triangle.uvs[2] * bary.z;
                Some(Intersection {
                    t,
                    point,
                    normal,
                    uv,
                    inside,
                    material: self.material,
                    primitive_id: self.id,
                })
            }
        }
    }

    /// Surface area, used by the area-form next-event estimator.
    pub fn area(&self) -> f64 {
        match &self.shape {
            Shape::Sphere(s) => 4.0 * std::f64::consts::PI * s.radius * s.radius,
            Shape::Triangle(t) => t.area(),
        }
    }

    /// Uniformly distributed point on the surface. Triangles use the
    /// square-root warp u = √ξ₁, v = (1 − √ξ₁)·ξ₂; spheres take a uniform
    /// direction scaled to the radius.
    pub fn sample_point(&self) -> Point3 {
        match &self.shape {
            Shape::Sphere(s) => s.center + random_unit_vector() * s.radius,
            Shape::Triangle(t) => {
                let u = random_double().sqrt();
                let v = (1.0 - u) * random_double();
                let w = 1.0 - u - v;
                t.positions[0] * u + t.positions[1] * v + t.positions[2] * w
            }
        }
    }

    /// Geometric outward normal at a surface point, for the emitter-side
    /// cosine in direct light sampling.
    pub fn normal_at(&self, point: Point3) -> Vec3 {
        match &self.shape {
            Shape::Sphere(s) => (point - s.center) / s.radius,
            Shape::Triangle(t) => t.face_normal(),
        }
    }
}
