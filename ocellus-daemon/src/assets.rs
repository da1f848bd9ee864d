//! Texture and custom image loading

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::imageops::FilterType;
use image::DynamicImage;
use log::debug;
use thiserror::Error;

use ocellus_core::config::TextureConfig;
use ocellus_core::pipeline::DeviceFrame;
use ocellus_core::render::Canvas;
use ocellus_core::RenderError;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{path}: {source}")]
    Texture {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("bad base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("bad image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Canvas(#[from] RenderError),
}

/// Textures feeding the table builder
pub struct Textures {
    pub iris_left: Canvas,
    pub iris_right: Canvas,
    pub sclera: Canvas,
}

fn to_canvas(image: DynamicImage, width: u32, height: u32) -> Result<Canvas, AssetError> {
    let rgba = image.resize_exact(width, height, FilterType::CatmullRom).into_rgba8();
    Ok(Canvas::from_rgba(width, height, rgba.into_raw())?)
}

/// Load a texture file and resample it to `[width, height]`
pub fn load_texture(path: impl AsRef<Path>, size: [u32; 2]) -> Result<Canvas, AssetError> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|source| AssetError::Texture {
        path: path.display().to_string(),
        source,
    })?;
    debug!(
        "{}: {}x{} resampled to {}x{}",
        path.display(),
        image.width(),
        image.height(),
        size[0],
        size[1]
    );
    to_canvas(image, size[0], size[1])
}

/// Load every texture named in the config
pub fn load_textures(config: &TextureConfig) -> Result<Textures, AssetError> {
    Ok(Textures {
        iris_left: load_texture(&config.iris_left, config.iris_size)?,
        iris_right: load_texture(&config.iris_right, config.iris_size)?,
        sclera: load_texture(&config.sclera, config.sclera_size)?,
    })
}

/// Decode a base64 PNG into a panel-sized frame
pub fn decode_frame(encoded: &str, width: u32, height: u32) -> Result<DeviceFrame, AssetError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    let image = image::load_from_memory(&bytes)?;
    let canvas = to_canvas(image, width, height)?;
    Ok(DeviceFrame::from_canvas(&canvas))
}
