use crate::math::*;
use std::f64::consts::PI;

/// A rough-specular lobe below this roughness behaves as a perfect mirror:
/// the direct-light estimator is bypassed and emission is collected through
/// the bounce instead.
pub const SPECULAR_ROUGHNESS_THRESHOLD: f64 = 1e-5;

/// Denominator clamp for N·V and N·L. Degenerate grazing configurations
/// contribute (almost) nothing but must never divide by zero.
const DENOM_EPS: f64 = 1e-3;

// ─── Material ───────────────────────────────────────────────────────────────

/// Scattering model selector. Dispatch in the BxDF is a plain `match` on
/// this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Lambertian diffuse reflection.
    Diffuse,
    /// Rough specular (Cook–Torrance microfacet with a diffuse floor).
    Specular,
    /// Perfect mirror.
    Mirror,
    /// Fresnel-weighted transmission/reflection (glass).
    Dielectric,
}

/// Surface description shared by any number of primitives. Owned by the
/// scene's material pool and referenced by index.
#[derive(Debug, Clone)]
pub struct Material {
    pub kind: MaterialKind,
    pub albedo: Color,
    pub emission: Color,
    pub ior: f64,
    pub roughness: f64,
    pub metallic: f64,
    pub texture: Option<usize>,
}

impl Material {
    pub fn diffuse(albedo: Color) -> Self {
        Self {
            kind: MaterialKind::Diffuse,
            albedo,
            emission: Color::zero(),
            ior: 1.0,
            roughness: 1.0,
            metallic: 0.0,
            texture: None,
        }
    }

    pub fn emissive(emission: Color) -> Self {
        Self {
            emission,
            ..Self::diffuse(Color::zero())
        }
    }

    pub fn mirror(albedo: Color) -> Self {
        Self {
            kind: MaterialKind::Mirror,
            ..Self::diffuse(albedo)
        }
    }

    pub fn dielectric(ior: f64) -> Self {
        Self {
            kind: MaterialKind::Dielectric,
            ior,
            ..Self::diffuse(Color::ones())
        }
    }

    pub fn specular(albedo: Color, roughness: f64, metallic: f64) -> Self {
        Self {
            kind: MaterialKind::Specular,
            roughness: roughness.clamp(0.0, 1.0),
            metallic: metallic.clamp(0.0, 1.0),
            ..Self::diffuse(albedo)
        }
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.x > 0.0 || self.emission.y > 0.0 || self.emission.z > 0.0
    }

    /// True when the outgoing direction is a delta function of the incoming
    /// one. Such surfaces skip next-event estimation and keep collecting
    /// emission along the chain.
    pub fn is_perfectly_specular(&self) -> bool {
        match self.kind {
            MaterialKind::Mirror | MaterialKind::Dielectric => true,
            MaterialKind::Specular => self.roughness < SPECULAR_ROUGHNESS_THRESHOLD,
            MaterialKind::Diffuse => false,
        }
    }
}

// ─── BxDF ───────────────────────────────────────────────────────────────────

/// Surface scattering in the shading-local tangent frame with Y = outward
/// normal. Both `wo` (toward the camera) and `wi` (toward the light / next
/// bounce) are unit vectors in that frame, so every cosine is a plain `.y`.
///
/// The albedo is resolved before construction (texture sample or flat color)
/// and `inside` tells the dielectric lobe which way the interface is crossed.
pub struct Bxdf<'a> {
    material: &'a Material,
    albedo: Color,
    inside: bool,
}

impl<'a> Bxdf<'a> {
    pub fn new(material: &'a Material, albedo: Color, inside: bool) -> Self {
        Self {
            material,
            albedo,
            inside,
        }
    }

    /// Draws an outgoing direction for the given view direction. The returned
    /// vector lives in the local frame and is unit length; it may point below
    /// the horizon for wasted microfacet samples, which `eval` then kills.
    pub fn sample(&self, wo: Vec3) -> Vec3 {
        match self.material.kind {
            MaterialKind::Diffuse => cosine_sample_hemisphere(random_double(), random_double()),
            MaterialKind::Mirror => reflect_about_normal(wo),
            MaterialKind::Specular => {
                if self.material.is_perfectly_specular() {
                    return reflect_about_normal(wo);
                }
                let h = sample_ggx_half_vector(
                    random_double(),
                    random_double(),
                    self.material.roughness,
                );
                (-wo).reflect(h).normalized()
            }
            MaterialKind::Dielectric => self.sample_dielectric(wo),
        }
    }

    /// The throughput weight applied to radiance arriving along `wi`.
    pub fn eval(&self, wo: Vec3, wi: Vec3) -> Color {
        match self.material.kind {
            MaterialKind::Diffuse => {
                if wo.y <= 0.0 || wi.y <= 0.0 {
                    Color::zero()
                } else {
                    self.albedo
                }
            }
            MaterialKind::Mirror => self.albedo,
            // The sampling decision already carries the Fresnel weight, so
            // the path throughput is preserved as-is.
            MaterialKind::Dielectric => Color::ones(),
            MaterialKind::Specular => {
                if self.material.is_perfectly_specular() {
                    return self.albedo;
                }
                self.eval_microfacet(wo, wi)
            }
        }
    }

    /// Cook–Torrance with a GGX distribution, Smith shadowing built from
    /// Schlick-GGX, and a Fresnel-weighted Lambertian floor scaled by
    /// (1 − metallic). Pairs that straddle the surface evaluate to zero.
    fn eval_microfacet(&self, wo: Vec3, wi: Vec3) -> Color {
        if wo.y <= 0.0 || wi.y <= 0.0 {
            return Color::zero();
        }

        let roughness = self.material.roughness;
        let halfway = (wo + wi).normalized();

        let f0 = Vec3::splat(0.04).lerp(self.albedo, self.material.metallic);
        let fresnel = fresnel_schlick(halfway.dot(wo).max(0.0), f0);

        let n_dot_v = wo.y.max(DENOM_EPS);
        let n_dot_l = wi.y.max(DENOM_EPS);
        let d_term = ggx_distribution(halfway.y.max(0.0), roughness);
        let g_term = geometry_smith(n_dot_v, n_dot_l, roughness);

        let specular = fresnel * d_term * g_term / (4.0 * n_dot_v * n_dot_l);
        let kd = (Vec3::ones() - fresnel) * (1.0 - self.material.metallic);
        let diffuse = kd.hadamard(self.albedo) / PI;

        specular + diffuse
    }

    /// Schlick-approximated Fresnel decides between reflection and
    /// refraction; total internal reflection falls back to the mirror branch.
    /// The η ratio is inverted when the ray travels inside the medium.
    fn sample_dielectric(&self, wo: Vec3) -> Vec3 {
        let eta_ratio = if self.inside {
            self.material.ior
        } else {
            1.0 / self.material.ior
        };

        let incident = -wo;
        let cos_theta = wo.y.min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        let cannot_refract = eta_ratio * sin_theta > 1.0;
        if cannot_refract || schlick_reflectance(cos_theta, eta_ratio) > random_double() {
            reflect_about_normal(wo)
        } else {
            incident
                .refract(Vec3::unit_y(), eta_ratio)
                .unwrap_or_else(|| reflect_about_normal(wo))
                .normalized()
        }
    }
}

// ─── Microfacet Helpers ─────────────────────────────────────────────────────

/// Mirror reflection of the view direction about the frame normal (+Y).
#[inline(always)]
fn reflect_about_normal(wo: Vec3) -> Vec3 {
    Vec3::new(-wo.x, wo.y, -wo.z)
}

fn fresnel_schlick(cos_theta: f64, f0: Vec3) -> Vec3 {
    f0 + (Vec3::ones() - f0) * (1.0 - cos_theta).powi(5)
}

/// Scalar Schlick reflectance for the dielectric interface.
fn schlick_reflectance(cosine: f64, eta_ratio: f64) -> f64 {
    let r0 = ((1.0 - eta_ratio) / (1.0 + eta_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// GGX normal distribution with the α = roughness² remapping. The same α
/// drives [`sample_ggx_half_vector`], keeping value and sampler consistent.
fn ggx_distribution(n_dot_h: f64, roughness: f64) -> f64 {
    let alpha = roughness * roughness;
    let alpha2 = alpha * alpha;
    let denom = n_dot_h * n_dot_h * (alpha2 - 1.0) + 1.0;
    alpha2 / (PI * denom * denom).max(DENOM_EPS)
}

fn geometry_schlick_ggx(n_dot_x: f64, roughness: f64) -> f64 {
    let k = (roughness * roughness) / 8.0;
    n_dot_x / (n_dot_x * (1.0 - k) + k)
}

fn geometry_smith(n_dot_v: f64, n_dot_l: f64, roughness: f64) -> f64 {
    geometry_schlick_ggx(n_dot_v, roughness) * geometry_schlick_ggx(n_dot_l, roughness)
}

/// GGX-distributed microfacet normal in the local frame:
/// θ = arctan(α·√ξ₁/√(1−ξ₁)), φ = 2πξ₂, with α = roughness².
fn sample_ggx_half_vector(r1: f64, r2: f64, roughness: f64) -> Vec3 {
    let alpha = roughness * roughness;
    let theta = (alpha * r1.sqrt() / (1.0 - r1).sqrt()).atan();
    let phi = 2.0 * PI * r2;
    Vec3::new(
        theta.sin() * phi.cos(),
        theta.cos(),
        theta.sin() * phi.sin(),
    )
}
