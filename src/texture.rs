use crate::error::SetupError;
use crate::math::{reverse_gamma, Color, Vec2};
use std::path::Path;

/// An 8-bit sRGB image used as an albedo map or as the equirectangular
/// environment map. Decoded once at scene setup and read concurrently by the
/// worker threads without locks; dropped with the scene.
pub struct Texture {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Texture {
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let img = image::open(path)
            .map_err(|source| SetupError::TextureLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        log::debug!(
            "loaded texture {} ({}×{})",
            path.display(),
            img.width(),
            img.height()
        );
        Ok(Self {
            width: img.width(),
            height: img.height(),
            data: img.into_raw(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-neighbor sample in linear space. UVs wrap; v = 0 is the bottom
    /// row. The stored bytes are sRGB, so channels are reverse-gamma decoded
    /// on the way out.
    pub fn sample(&self, uv: Vec2) -> Color {
        let u = uv.x - uv.x.floor();
        let v = uv.y - uv.y.floor();

        let x = (u * (self.width - 1) as f64) as u32;
        let y = ((1.0 - v) * (self.height - 1) as f64) as u32;
        let i = ((y * self.width + x) * 3) as usize;

        Color::new(
            reverse_gamma(self.data[i] as f64 / 255.0),
            reverse_gamma(self.data[i + 1] as f64 / 255.0),
            reverse_gamma(self.data[i + 2] as f64 / 255.0),
        )
    }
}
