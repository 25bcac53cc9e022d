use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong before the first ray is traced. Setup
/// failures are reported once on stderr and terminate the process with exit
/// code 1; nothing in this enum can occur during rendering itself.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to open config {}: {source}", path.display())]
    ConfigOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to load model {}: {source}", path.display())]
    ModelLoad {
        path: PathBuf,
        source: tobj::LoadError,
    },

    #[error("failed to load texture {}: {source}", path.display())]
    TextureLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("scene contains no primitives after setup")]
    EmptyScene,
}
