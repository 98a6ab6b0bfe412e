use std::path::{Path, PathBuf};

use anyhow::Context as _;

/// Decoded image pixels. Owned by the caller and dropped after upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn is_rgb(&self) -> bool {
        self.channels == 3 && self.pixels.len() == self.width as usize * self.height as usize * 3
    }
}

/// Turns an image file into raw pixels.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> anyhow::Result<DecodedImage>;
}

/// Decodes anything the `image` crate understands into 8-bit RGB.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileDecoder;

impl ImageDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> anyhow::Result<DecodedImage> {
        let data = load_binary(path)?;
        let img = image::load_from_memory(&data)
            .with_context(|| format!("{} is not a decodable image", path.display()))?;
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(DecodedImage {
            width,
            height,
            channels: 3,
            pixels: rgb.into_raw(),
        })
    }
}

/// Resolves `file_name` inside `assets_dir`.
pub fn asset_path(assets_dir: &Path, file_name: &str) -> PathBuf {
    assets_dir.join(file_name)
}

pub fn load_binary(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
