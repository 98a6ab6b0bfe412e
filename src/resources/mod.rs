/**
 * Loading of external files (the shared surface texture) into CPU memory.
 */
pub mod texture;

pub use texture::{DecodedImage, FileDecoder, ImageDecoder, asset_path};
