use crate::error::SetupError;
use crate::math::Point3;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Render/scene description loaded from a JSON file.
///
/// Image dimensions and camera parameters are mandatory — a config without
/// them is a setup failure. Everything else defaults silently; unknown keys
/// are ignored. Integrator knobs (samples, bounces, batch size) come from
/// the command line instead.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub image_width: u32,
    pub image_height: u32,
    pub camera_position: [f64; 3],
    pub camera_target: [f64; 3],
    /// Vertical field of view, degrees.
    pub camera_fov: f64,
    /// Full angular aperture, degrees. Zero keeps the pinhole model.
    #[serde(default)]
    pub camera_aperture: f64,
    #[serde(default)]
    pub camera_focus_distance: f64,
    /// OBJ files to load, in order.
    #[serde(default)]
    pub models: Vec<PathBuf>,
    /// Inline analytic spheres.
    #[serde(default)]
    pub spheres: Vec<SphereConfig>,
    /// Equirectangular environment map (8-bit sRGB).
    #[serde(default)]
    pub environment_texture: Option<PathBuf>,
    /// Constant background color used when no environment map is set.
    #[serde(default)]
    pub background: Option<[f64; 3]>,
    #[serde(default)]
    pub print_progress: bool,
}

#[derive(Debug, Deserialize)]
pub struct SphereConfig {
    pub center: [f64; 3],
    pub radius: f64,
    #[serde(default = "default_albedo")]
    pub albedo: [f64; 3],
    #[serde(default)]
    pub emissive: [f64; 3],
    #[serde(default)]
    pub texture: Option<PathBuf>,
    #[serde(default)]
    pub metallic: f64,
    #[serde(default = "default_roughness")]
    pub roughness: f64,
    #[serde(default = "default_ior")]
    pub ior: f64,
    #[serde(rename = "type", default)]
    pub kind: SphereKind,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SphereKind {
    #[default]
    Diffuse,
    Specular,
    Transmissive,
}

fn default_albedo() -> [f64; 3] {
    [0.8, 0.8, 0.8]
}

fn default_roughness() -> f64 {
    1.0
}

fn default_ior() -> f64 {
    1.52
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let file = File::open(path).map_err(|source| SetupError::ConfigOpen {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| SetupError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `[x, y, z]` config triples as vectors.
pub fn vec3(v: [f64; 3]) -> Point3 {
    Point3::new(v[0], v[1], v[2])
}
