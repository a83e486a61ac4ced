//! The five screens the game draws over, loaded once at startup.

use image::RgbImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("missing or unreadable asset image {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug)]
pub struct Assets {
    pub green: RgbImage,
    pub red: RgbImage,
    pub kill: RgbImage,
    pub winner: RgbImage,
    pub intro: RgbImage,
}

impl Assets {
    /// Loads all five images, failing on the first one that is missing so a
    /// broken install is caught before any game state exists.
    pub fn load(dir: &Path) -> Result<Self, AssetError> {
        Ok(Self {
            green: load_image(dir, "green.png")?,
            red: load_image(dir, "red.png")?,
            kill: load_image(dir, "kill.png")?,
            winner: load_image(dir, "winner.png")?,
            intro: load_image(dir, "intro.png")?,
        })
    }
}

fn load_image(dir: &Path, name: &str) -> Result<RgbImage, AssetError> {
    let path = dir.join(name);
    image::open(&path)
        .map(|img| img.to_rgb8())
        .map_err(|source| AssetError::Load { path, source })
}
