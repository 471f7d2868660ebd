//! Copies a material's textures into its atlas cell.

use bakery_atlas::{AtlasTextureSet, OPAQUE_BLACK, PostProcess, TextureChannel};
use bakery_scene::MaterialHandle;
use image::buffer::ConvertBuffer;
use image::imageops;
use image::{Rgba, Rgba32FImage, RgbaImage};
use thiserror::Error;

use crate::material::MaterialRecord;

/// Errors raised while compositing a material into the atlas.
#[derive(Debug, Error)]
pub enum CompositeError {
    /// The material has no cell yet.
    #[error("material {0:?} has no atlas cell")]
    NotPlaced(MaterialHandle),

    /// The material's textures disagree in size and cannot share a cell.
    #[error("material {0:?} has textures of differing sizes")]
    InvalidTextures(MaterialHandle),

    /// The cell does not fit in the atlas images.
    #[error("cell of material {0:?} lies outside the atlas")]
    CellOutsideAtlas(MaterialHandle),
}

/// Writes `record` into its cell of every layer of `atlas`.
///
/// Each channel is cropped to the copied extent and post-processed in linear
/// float, then quantized to 8 bits and pasted at the cell origin. Channels the
/// material lacks are filled with opaque black over the same extent. Pastes
/// are clipped to the atlas bounds. Returns the number of layers written.
pub fn composite(
    record: &MaterialRecord,
    atlas: &mut AtlasTextureSet,
) -> Result<usize, CompositeError> {
    let handle = record.handle();
    let placement = *record.placement().ok_or(CompositeError::NotPlaced(handle))?;
    if !record.valid_textures() {
        return Err(CompositeError::InvalidTextures(handle));
    }

    let (width, height) = placement.extent;
    let (x0, y0) = atlas
        .cell_origin(placement.cell, height)
        .ok_or(CompositeError::CellOutsideAtlas(handle))?;

    let channels: Vec<TextureChannel> = atlas.channels().collect();
    for &channel in &channels {
        let cell = cell_pixels(record, channel, width, height);
        if let Some(dest) = atlas.image_mut(channel) {
            imageops::replace(dest, &cell, i64::from(x0), i64::from(y0));
        }
    }
    Ok(channels.len())
}

/// The 8-bit pixels `record` contributes to `channel`, top row first.
fn cell_pixels(
    record: &MaterialRecord,
    channel: TextureChannel,
    width: u32,
    height: u32,
) -> RgbaImage {
    let Some(source) = record.texture(channel) else {
        return RgbaImage::from_pixel(width, height, OPAQUE_BLACK);
    };
    let mut cell = imageops::crop_imm(source, 0, 0, width, height).to_image();
    post_process(channel.post_process(), record, &mut cell);
    cell.convert()
}

fn post_process(process: PostProcess, record: &MaterialRecord, cell: &mut Rgba32FImage) {
    match process {
        PostProcess::None => {}
        PostProcess::AlbedoTint => {
            let tint = record.color_tint().to_array();
            for Rgba(p) in cell.pixels_mut() {
                for (c, t) in p.iter_mut().zip(tint) {
                    *c *= t;
                }
            }
        }
        PostProcess::OcclusionToAlpha => {
            let Some(occlusion) = record.texture(TextureChannel::Occlusion) else {
                return;
            };
            let strength = record.metallic_strength();
            for (x, y, pixel) in cell.enumerate_pixels_mut() {
                if x < occlusion.width() && y < occlusion.height() {
                    pixel.0[3] = occlusion.get_pixel(x, y).0[3] * strength;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
