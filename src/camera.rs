use crate::math::*;

const WORLD_UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// A right-handed pinhole camera with optional thin-lens defocus.
///
/// The orthonormal basis is derived from a constant world up:
///   right = forward × world_up
///   up    = right × forward
/// and recomputed whenever position or orientation changes.
///
/// With a non-zero aperture the origin of each ray is displaced across a
/// small disk and the ray re-aimed at its focus point, so geometry on the
/// focus plane stays sharp while everything nearer or farther smears out.
pub struct Camera {
    width: u32,
    height: u32,
    position: Point3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    /// Vertical field of view, radians.
    fov: f64,
    /// Full angular aperture, radians. Zero collapses to a pinhole.
    aperture: f64,
    focus_distance: f64,
}

impl Camera {
    pub fn new(width: u32, height: u32, vfov_degrees: f64) -> Self {
        let mut camera = Self {
            width,
            height,
            position: Point3::zero(),
            forward: -Vec3::unit_z(),
            right: Vec3::unit_x(),
            up: Vec3::unit_y(),
            fov: vfov_degrees.to_radians(),
            aperture: 0.0,
            focus_distance: 0.0,
        };
        camera.compute_basis();
        camera
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn position(&self) -> Point3 {
        self.position
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn set_position(&mut self, position: Point3) {
        self.position = position;
        self.compute_basis();
    }

    pub fn set_forward(&mut self, forward: Vec3) {
        self.forward = forward.normalized();
        self.compute_basis();
    }

    pub fn look_at(&mut self, position: Point3, target: Point3) {
        self.position = position;
        self.forward = (target - position).normalized();
        self.compute_basis();
    }

    /// Full angular aperture in degrees; zero disables defocus.
    pub fn set_aperture(&mut self, degrees: f64) {
        self.aperture = degrees.to_radians();
    }

    pub fn set_focus_distance(&mut self, distance: f64) {
        self.focus_distance = distance;
    }

    fn compute_basis(&mut self) {
        self.right = self.forward.cross(WORLD_UP).normalized();
        self.up = self.right.cross(self.forward).normalized();
    }

    /// Generates a jittered primary ray through pixel (x, y). Pixel (0, 0) is
    /// the top-left corner; the image plane sits one unit along `forward`.
    pub fn get_ray(&self, x: u32, y: u32) -> Ray {
        let jitter = Vec2::new(random_double() - 0.5, random_double() - 0.5);
        let u = (x as f64 + jitter.x) / self.width as f64 * 2.0 - 1.0;
        let v = (y as f64 + jitter.y) / self.height as f64 * 2.0 - 1.0;

        let half_height = (self.fov / 2.0).tan();
        let half_width = self.aspect_ratio() * half_height;

        // The minus sign flips Y so that increasing pixel rows walk down the
        // image while +up stays up in world space.
        let view_point = self.position + self.forward
            + self.right * (2.0 * half_width * u)
            - self.up * (2.0 * half_height * v);
        let direction = (view_point - self.position).normalized();

        if self.aperture > 0.0 && self.focus_distance > 0.0 {
            let lens_radius = self.focus_distance * (self.aperture / 2.0).tan();
            let disk = random_in_unit_disk() * lens_radius;
            let origin = self.position + self.right * disk.x + self.up * disk.y;
            let focus_point = self.position + direction * self.focus_distance;
            Ray::new(origin, (focus_point - origin).normalized())
        } else {
            Ray::new(self.position, direction)
        }
    }
}
