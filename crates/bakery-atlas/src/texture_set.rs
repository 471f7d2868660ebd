//! Destination pixel buffers, one per tracked channel.

use image::{Rgba, RgbaImage};

use crate::channel::TextureChannel;
use crate::planner::{AtlasPlan, GridCell};

/// Placeholder written for channels a material does not have.
pub const OPAQUE_BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// One channel's atlas image.
#[derive(Debug)]
pub struct AtlasLayer {
    /// Channel this layer holds.
    pub channel: TextureChannel,
    /// 8-bit RGBA pixels, top row first.
    pub image: RgbaImage,
}

/// The full set of atlas images for one bake.
///
/// Images are stored top row first while UVs have a bottom-left origin, so a
/// cell at grid row `r` sits `r` cells above the bottom edge of the image.
#[derive(Debug)]
pub struct AtlasTextureSet {
    plan: AtlasPlan,
    layers: Vec<AtlasLayer>,
}

impl AtlasTextureSet {
    /// Allocates one zeroed image per channel at the planned size.
    ///
    /// Pixels outside every cell stay transparent black.
    ///
    /// Duplicate channels are ignored; order is preserved.
    pub fn new(plan: AtlasPlan, channels: &[TextureChannel]) -> Self {
        let mut layers: Vec<AtlasLayer> = Vec::with_capacity(channels.len());
        for &channel in channels {
            if layers.iter().any(|layer| layer.channel == channel) {
                continue;
            }
            layers.push(AtlasLayer {
                channel,
                image: RgbaImage::new(plan.pixel_width, plan.pixel_height),
            });
        }
        Self { plan, layers }
    }

    /// The plan the images were sized from.
    pub fn plan(&self) -> &AtlasPlan {
        &self.plan
    }

    /// Atlas width in pixels.
    pub fn width(&self) -> u32 {
        self.plan.pixel_width
    }

    /// Atlas height in pixels.
    pub fn height(&self) -> u32 {
        self.plan.pixel_height
    }

    /// Tracked channels in export order.
    pub fn channels(&self) -> impl Iterator<Item = TextureChannel> + '_ {
        self.layers.iter().map(|layer| layer.channel)
    }

    /// All layers in export order.
    pub fn layers(&self) -> &[AtlasLayer] {
        &self.layers
    }

    /// Returns `true` if no channel is tracked.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Image of `channel`, if tracked.
    pub fn image(&self, channel: TextureChannel) -> Option<&RgbaImage> {
        self.layers
            .iter()
            .find(|layer| layer.channel == channel)
            .map(|layer| &layer.image)
    }

    /// Mutable image of `channel`, if tracked.
    pub fn image_mut(&mut self, channel: TextureChannel) -> Option<&mut RgbaImage> {
        self.layers
            .iter_mut()
            .find(|layer| layer.channel == channel)
            .map(|layer| &mut layer.image)
    }

    /// Top-left image coordinate of a `height`-pixel tall region placed at
    /// the bottom-left corner of `cell`.
    ///
    /// Returns `None` when the cell does not fit in the image.
    pub fn cell_origin(&self, cell: GridCell, height: u32) -> Option<(u32, u32)> {
        let x = cell.column * self.plan.cell_size;
        let bottom = cell.row * self.plan.cell_size;
        let top = self.plan.pixel_height.checked_sub(bottom + height.min(self.plan.cell_size))?;
        if x >= self.plan.pixel_width {
            return None;
        }
        Some((x, top))
    }
}
