use crate::camera::Camera;
use crate::geometry::Intersection;
use crate::material::Bxdf;
use crate::math::*;
use crate::scene::Scene;
use crate::stats;
use image::RgbImage;
use rayon::prelude::*;
use std::path::Path;

/// Paths are eligible for Russian-roulette termination beyond this depth.
const RUSSIAN_ROULETTE_DEPTH: u32 = 3;

// ─── Tone Mapping ───────────────────────────────────────────────────────────

/// ACES filmic fit (Narkowicz 2015 approximation):
///   f(x) = (x(2.51x + 0.03)) / (x(2.43x + 0.59) + 0.14)
/// Maps unbounded scene radiance into [0, 1]; highlights saturate gradually
/// instead of clipping, which is the whole point over a plain clamp.
pub fn aces_tonemap(color: Color) -> Color {
    fn channel(x: f64) -> f64 {
        let a = 2.51;
        let b = 0.03;
        let c = 2.43;
        let d = 0.59;
        let e = 0.14;
        ((x * (a * x + b)) / (x * (c * x + d) + e)).clamp(0.0, 1.0)
    }
    Color::new(channel(color.x), channel(color.y), channel(color.z))
}

// ─── Framebuffer ────────────────────────────────────────────────────────────

/// A width×height buffer of linear-space radiance triples. Tone mapping and
/// gamma encoding happen only on the way out to 8-bit.
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::zero(); (width * height) as usize],
        }
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// ACES tone map, γ = 2.2 encode, and clamped 8-bit quantization.
    /// Pixel (0, 0) is the top-left corner; rows are tightly packed.
    pub fn to_image(&self) -> RgbImage {
        let mut image = RgbImage::new(self.width, self.height);
        for (x, y, out) in image.enumerate_pixels_mut() {
            let mapped = aces_tonemap(self.get(x, y));
            *out = image::Rgb([
                (gamma(mapped.x).clamp(0.0, 1.0) * 255.999) as u8,
                (gamma(mapped.y).clamp(0.0, 1.0) * 255.999) as u8,
                (gamma(mapped.z).clamp(0.0, 1.0) * 255.999) as u8,
            ]);
        }
        image
    }

    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.to_image().save(path)
    }
}

// ─── Renderer ───────────────────────────────────────────────────────────────

/// The top-level driver: accumulates path-traced samples into the
/// framebuffer, batch by batch, in parallel over image rows.
///
/// The renderer borrows the scene and camera; all worker threads share them
/// read-only while each writes only its own rows of the pixel buffer.
pub struct Renderer<'a> {
    scene: &'a Scene,
    camera: &'a Camera,
    framebuffer: Framebuffer,
    max_depth: u32,
    /// Samples already folded into every pixel, across all previous batches.
    pub total_samples: u32,
}

impl<'a> Renderer<'a> {
    pub fn new(camera: &'a Camera, scene: &'a Scene, max_depth: u32) -> Self {
        Self {
            scene,
            camera,
            framebuffer: Framebuffer::new(camera.width(), camera.height()),
            max_depth,
            total_samples: 0,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Adds `samples` paths per pixel to the running estimate. Pixels keep a
    /// running mean: each new sample folds in as
    /// `mean ← lerp(mean, sample, 1/(n+1))`, so batches of any size
    /// accumulate without bias.
    pub fn render_batch(&mut self, samples: u32) {
        let width = self.framebuffer.width;
        let prior = self.total_samples;
        let scene = self.scene;
        let camera = self.camera;
        let max_depth = self.max_depth;

        self.framebuffer
            .pixels
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    for s in 0..samples {
                        let ray = camera.get_ray(x as u32, y as u32);
                        let sample = trace(scene, &ray, 0, false, max_depth);
                        let n = prior + s;
                        *pixel = pixel.lerp(sample, 1.0 / (n as f64 + 1.0));
                    }
                }
            });

        self.total_samples += samples;
    }

    /// Renders `samples` passes split into batches. After every batch an
    /// interim image is written to `interim` (when given) and progress goes
    /// to stdout (when requested), so long renders stay observable.
    pub fn render(
        &mut self,
        samples: u32,
        batch_size: u32,
        print_progress: bool,
        interim: Option<&Path>,
    ) {
        let batch_size = batch_size.max(1);
        let mut done = 0;
        while done < samples {
            let batch = batch_size.min(samples - done);
            self.render_batch(batch);
            done += batch;

            if print_progress {
                println!(
                    "progress: {:5.1}% ({}/{} samples)",
                    done as f64 / samples as f64 * 100.0,
                    done,
                    samples
                );
            }
            if let Some(path) = interim {
                if let Err(e) = self.framebuffer.save_png(path) {
                    log::warn!("failed to write interim image {}: {e}", path.display());
                }
            }
        }
    }
}

// ─── Integrator ─────────────────────────────────────────────────────────────

/// One path segment. `perfect_reflection` says the previous bounce was a
/// delta lobe, in which case emission must be collected here because the
/// direct-light estimator could not have seen it.
///
/// Emission is added exactly once per path: at the first hit, along specular
/// chains, or through next-event estimation — these three form a partition.
fn trace(scene: &Scene, ray: &Ray, depth: u32, perfect_reflection: bool, max_depth: u32) -> Color {
    if depth >= max_depth {
        return Color::zero();
    }
    stats::count_bounce();

    let Some(hit) = scene.find_intersection(ray) else {
        return scene.background(ray);
    };

    let material = scene.material(hit.material);
    let albedo = scene.albedo(&hit);
    let emission = material.emission;

    // Russian roulette: kill dim paths with probability 1 − luma(albedo),
    // compensating survivors by 1/p to stay unbiased.
    let mut rr_weight = 1.0;
    if depth > RUSSIAN_ROULETTE_DEPTH {
        let p = luma(albedo).clamp(0.0, 1.0);
        if random_double() >= p {
            return emission;
        }
        rr_weight = 1.0 / p;
    }

    let frame = local_to_world(hit.normal);
    let world_to_local = frame.transpose();
    let wo = world_to_local.mul_vec3(-ray.direction.normalized());

    let perfectly_specular = material.is_perfectly_specular();
    let bxdf = Bxdf::new(material, albedo, hit.inside);
    let wi = bxdf.sample(wo);

    let mut radiance = Color::zero();

    // Everywhere else, surface emission is picked up by the next-event
    // estimator of the previous bounce; adding it here too would double
    // count.
    if depth == 0 || perfect_reflection || perfectly_specular {
        radiance += emission;
    }

    if !perfectly_specular && scene.light_count() > 0 {
        radiance += sample_lights(scene, &hit, &bxdf, wo, &world_to_local);
    }

    let next_ray = Ray::new(hit.point, frame.mul_vec3(wi).normalized());
    let incoming = trace(scene, &next_ray, depth + 1, perfectly_specular, max_depth);

    let contribution = bxdf.eval(wo, wi).hadamard(incoming) * rr_weight;
    if contribution.is_finite() {
        radiance += contribution;
    }
    radiance
}

/// Next-event estimation: one uniformly chosen light, one uniform area
/// sample on it, one shadow ray. The sample only counts when the shadow ray
/// reaches that exact light (matched by primitive id) from a different
/// surface.
fn sample_lights(
    scene: &Scene,
    hit: &Intersection,
    bxdf: &Bxdf,
    wo: Vec3,
    world_to_local: &Mat3,
) -> Color {
    let Some(light) = scene.random_light() else {
        return Color::zero();
    };
    if light.id == hit.primitive_id {
        return Color::zero();
    }

    let point = light.sample_point();
    let to_light = point - hit.point;
    let distance_squared = to_light.length_squared();
    let direction = to_light.normalized();

    let shadow_ray = Ray::new(hit.point, direction);
    let Some(shadow_hit) = scene.find_intersection(&shadow_ray) else {
        return Color::zero();
    };
    if shadow_hit.primitive_id != light.id || shadow_hit.primitive_id == hit.primitive_id {
        return Color::zero();
    }

    let cos_light = light.normal_at(point).dot(-direction).max(0.0);
    if cos_light == 0.0 {
        return Color::zero();
    }

    let emission = scene.material(light.material).emission;
    let wi_light = world_to_local.mul_vec3(direction);
    let pdf_light = 1.0 / scene.light_count() as f64;

    let contribution = emission.hadamard(bxdf.eval(wo, wi_light)) * light.area() * cos_light
        / distance_squared
        / pdf_light;
    if contribution.is_finite() {
        contribution
    } else {
        Color::zero()
    }
}
