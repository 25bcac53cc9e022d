use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub};

/// Double-precision 3-vector. One type plays every role — point, direction,
/// RGB radiance — so the aliases below are purely for readability. Besides
/// the operator arithmetic it carries the small set of geometric helpers the
/// intersection and shading code is built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub type Point3 = Vec3;
pub type Color = Vec3;

impl Vec3 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn ones() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    #[inline(always)]
    pub const fn unit_x() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Length with the square root left out. Enough for comparing distances,
    /// and cheaper where that is all the caller needs.
    #[inline(always)]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline(always)]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Scales to unit length. A zero vector trips the debug assertion; in
    /// release it produces infinities that the NaN guards downstream drop.
    #[inline(always)]
    pub fn normalized(self) -> Self {
        let len = self.length();
        debug_assert!(len > 1e-12, "normalizing a zero-length vector");
        self / len
    }

    #[inline(always)]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Cross product. Builds plane normals and completes tangent frames.
    #[inline(always)]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Mirror direction about `normal`: I − 2(I·N)N. Expects the incident
    /// vector to point toward the surface.
    #[inline(always)]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * 2.0 * self.dot(normal)
    }

    /// Bends a unit incident vector across the interface per Snell's law,
    /// split into the components perpendicular and parallel to `normal`.
    /// `None` means the discriminant went negative: total internal
    /// reflection, so there is no transmitted direction at all.
    #[inline]
    pub fn refract(self, normal: Self, eta_ratio: f64) -> Option<Self> {
        let cos_theta = (-self).dot(normal).min(1.0);
        let r_perp = (self + normal * cos_theta) * eta_ratio;
        let discriminant = 1.0 - r_perp.length_squared();
        if discriminant < 0.0 {
            return None;
        }
        let r_parallel = normal * -(discriminant.sqrt());
        Some(r_perp + r_parallel)
    }

    /// Per-channel product. This is what "multiply by the albedo" means for
    /// RGB throughput.
    #[inline(always)]
    pub fn hadamard(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    /// Linear blend toward `other` by `t`.
    #[inline(always)]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }

    #[inline(always)]
    pub fn min(self, rhs: Self) -> Self {
        Self::new(self.x.min(rhs.x), self.y.min(rhs.y), self.z.min(rhs.z))
    }

    #[inline(always)]
    pub fn max(self, rhs: Self) -> Self {
        Self::new(self.x.max(rhs.x), self.y.max(rhs.y), self.z.max(rhs.z))
    }

    #[inline(always)]
    pub fn powf(self, e: f64) -> Self {
        Self::new(self.x.powf(e), self.y.powf(e), self.z.powf(e))
    }

    /// Every channel clamped to [0, 1].
    #[inline(always)]
    pub fn saturate(self) -> Self {
        Self::new(
            self.x.clamp(0.0, 1.0),
            self.y.clamp(0.0, 1.0),
            self.z.clamp(0.0, 1.0),
        )
    }

    /// All components within 1e-8 of zero. Vectors this small cannot be
    /// normalized meaningfully and get treated as absent.
    #[inline(always)]
    pub fn near_zero(self) -> bool {
        const EPS: f64 = 1e-8;
        self.x.abs() < EPS && self.y.abs() < EPS && self.z.abs() < EPS
    }

    #[inline(always)]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    #[inline(always)]
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl MulAssign<f64> for Vec3 {
    #[inline(always)]
    fn mul_assign(&mut self, t: f64) {
        self.x *= t;
        self.y *= t;
        self.z *= t;
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: f64) -> Self {
        let inv = 1.0 / t;
        Self::new(self.x * inv, self.y * inv, self.z * inv)
    }
}

impl DivAssign<f64> for Vec3 {
    #[inline(always)]
    fn div_assign(&mut self, t: f64) {
        let inv = 1.0 / t;
        self.x *= inv;
        self.y *= inv;
        self.z *= inv;
    }
}

impl Index<usize> for Vec3 {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("vector axis {i} out of range"),
        }
    }
}

// ─── Vec2 ───────────────────────────────────────────────────────────────────

/// A 2-component vector for texture coordinates and pixel-space jitter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t)
    }
}

// ─── Mat3 ───────────────────────────────────────────────────────────────────

/// A column-major 3×3 matrix. Its main job here is carrying tangent frames:
/// multiplying by a local direction takes it to world space, multiplying by
/// the transpose takes a world direction back into the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    pub cols: [Vec3; 3],
}

impl Mat3 {
    #[inline(always)]
    pub const fn from_cols(x: Vec3, y: Vec3, z: Vec3) -> Self {
        Self { cols: [x, y, z] }
    }

    #[inline(always)]
    pub const fn identity() -> Self {
        Self::from_cols(Vec3::unit_x(), Vec3::unit_y(), Vec3::unit_z())
    }

    #[inline(always)]
    pub fn mul_vec3(&self, v: Vec3) -> Vec3 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z
    }

    pub fn transpose(&self) -> Self {
        let [a, b, c] = self.cols;
        Self::from_cols(
            Vec3::new(a.x, b.x, c.x),
            Vec3::new(a.y, b.y, c.y),
            Vec3::new(a.z, b.z, c.z),
        )
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    #[inline(always)]
    fn mul(self, v: Vec3) -> Vec3 {
        self.mul_vec3(v)
    }
}

/// Constructs a right-handed orthonormal basis with `up` as the Y axis.
/// The reference vector is picked to never be parallel to `up`.
pub fn local_to_world(up: Vec3) -> Mat3 {
    let reference = if up.y.abs() < 0.99 {
        Vec3::unit_y()
    } else {
        Vec3::unit_x()
    };
    let tangent = up.cross(reference).normalized();
    let bitangent = tangent.cross(up);
    Mat3::from_cols(tangent, up, bitangent)
}

// ─── Interval ───────────────────────────────────────────────────────────────

/// A closed scalar interval `[min, max]` used to gate intersection roots and
/// slab tests.
#[derive(Debug, Clone, Copy)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Interval<T> {
    #[inline(always)]
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    #[inline(always)]
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Strict containment: `min < value < max`. Intersection roots exactly on
    /// the boundary are rejected, which keeps the self-intersection epsilon
    /// airtight.
    #[inline(always)]
    pub fn surrounds(&self, value: T) -> bool {
        self.min < value && value < self.max
    }

    #[inline(always)]
    pub fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

impl Interval<f64> {
    /// Grows the interval symmetrically by `delta` in total.
    #[inline(always)]
    pub fn expand(self, delta: f64) -> Self {
        let pad = delta / 2.0;
        Self::new(self.min - pad, self.max + pad)
    }
}

// ─── Ray ────────────────────────────────────────────────────────────────────

/// A half-line `origin + t · direction`. Every query in the tracer — primary
/// rays, shadow rays, bounce continuations — is phrased as a search for the
/// smallest admissible `t` along one of these.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
}

impl Ray {
    #[inline(always)]
    pub const fn new(origin: Point3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// The point reached after walking `t` along the direction.
    #[inline(always)]
    pub fn at(self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

// ─── Axis-Aligned Bounding Box ──────────────────────────────────────────────

/// Axis-aligned box between two corner points, the bounding volume the BVH
/// is built from. The only query it answers is the boolean slab test below.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// An inverted box that is the identity for `merge`; useful as the seed
    /// when folding over a primitive span.
    pub const fn empty() -> Self {
        Self::new(
            Point3::splat(f64::INFINITY),
            Point3::splat(f64::NEG_INFINITY),
        )
    }

    /// The smallest box containing both inputs. Folding this over a span of
    /// primitives yields the node bounds during BVH construction.
    pub fn merge(a: &Aabb, b: &Aabb) -> Aabb {
        Aabb::new(a.min.min(b.min), a.max.max(b.max))
    }

    #[inline(always)]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline(always)]
    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the split dimension for BVH construction: the first axis, in
    /// the order Y, Z, X, whose extent is at least as large as both others.
    pub fn longest_axis(&self) -> usize {
        let s = self.size();
        if s.y >= s.z && s.y >= s.x {
            1
        } else if s.z >= s.y && s.z >= s.x {
            2
        } else {
            0
        }
    }

    /// Slab-method ray/box test within the parametric interval `ti`. Each
    /// axis tightens the running interval; the box is missed as soon as the
    /// interval becomes empty. Only a boolean is returned — BVH traversal
    /// does not need the entry distance.
    pub fn hit(&self, ray: &Ray, mut ti: Interval<f64>) -> bool {
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > ti.min {
                ti.min = t0;
            }
            if t1 < ti.max {
                ti.max = t1;
            }
            if ti.max <= ti.min {
                return false;
            }
        }
        true
    }
}

// ─── Random Sampling ────────────────────────────────────────────────────────

thread_local! {
    static THREAD_RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_entropy());
}

/// Uniform random double in [0, 1) from the calling thread's generator.
/// Each worker thread seeds its own `SmallRng` once; no determinism is
/// promised across runs.
#[inline]
pub fn random_double() -> f64 {
    THREAD_RNG.with(|rng| rng.borrow_mut().gen::<f64>())
}

/// Rejection-samples a point in the 2-D unit disk. The thin lens offsets its
/// ray origins with this.
pub fn random_in_unit_disk() -> Vec2 {
    loop {
        let v = Vec2::new(2.0 * random_double() - 1.0, 2.0 * random_double() - 1.0);
        if v.x * v.x + v.y * v.y < 1.0 {
            return v;
        }
    }
}

/// Uniformly distributed point on the unit sphere via spherical coordinates:
/// θ ∈ [0, 2π), φ = arccos(1 − 2ξ).
pub fn random_unit_vector() -> Vec3 {
    let theta = random_double() * 2.0 * PI;
    let phi = (1.0 - 2.0 * random_double()).acos();
    Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
}

/// Cosine-weighted hemisphere direction in the canonical frame (+Y up):
/// θ = arccos(√ξ₁), φ = 2πξ₂, giving the PDF cos θ / π.
pub fn cosine_sample_hemisphere(r1: f64, r2: f64) -> Vec3 {
    let theta = r1.sqrt().acos();
    let phi = 2.0 * PI * r2;
    Vec3::new(
        theta.sin() * phi.cos(),
        theta.cos(),
        theta.sin() * phi.sin(),
    )
}

/// World-space direction drawn with PDF cos θ / π around `normal`.
pub fn cosine_weighted_sampling(normal: Vec3) -> Vec3 {
    let frame = local_to_world(normal);
    let sample = cosine_sample_hemisphere(random_double(), random_double());
    frame.mul_vec3(sample).normalized()
}

// ─── Color Transfer Functions ───────────────────────────────────────────────

/// Linear → sRGB encode, γ = 2.2.
#[inline(always)]
pub fn gamma(x: f64) -> f64 {
    x.powf(1.0 / 2.2)
}

/// sRGB → linear decode, the inverse of [`gamma`]. Texture files store sRGB;
/// shading happens in linear space.
#[inline(always)]
pub fn reverse_gamma(x: f64) -> f64 {
    x.powf(2.2)
}

/// Rec. 709 luminance of a linear color.
#[inline(always)]
pub fn luma(c: Color) -> f64 {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}

// ─── Equirectangular Mapping ────────────────────────────────────────────────

/// Maps a unit direction to latitude/longitude UV coordinates in [0, 1]².
pub fn direction_to_uv(v: Vec3) -> Vec2 {
    Vec2::new(0.5 + v.z.atan2(v.x) / (2.0 * PI), 0.5 + v.y.asin() / PI)
}

/// Inverse of [`direction_to_uv`]; returns a unit direction.
pub fn uv_to_direction(uv: Vec2) -> Vec3 {
    let phi = (uv.x - 0.5) * 2.0 * PI;
    let y = ((uv.y - 0.5) * PI).sin();
    let r = (1.0 - y * y).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), y, r * phi.sin())
}
