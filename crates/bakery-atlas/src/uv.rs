//! Per-material UV sub-rectangle of the atlas.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Normalized `[start, end]` rectangle a material's UVs are remapped into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UvRect {
    /// Bottom-left corner in atlas UV space.
    pub start: Vec2,
    /// Top-right corner in atlas UV space.
    pub end: Vec2,
}

impl UvRect {
    /// The whole texture, `[0, 1]²`.
    pub const FULL: Self = Self {
        start: Vec2::ZERO,
        end: Vec2::ONE,
    };

    /// Computes the rectangle of the `index`-th cell.
    ///
    /// The cell origin is `((index % grid_width) * cell_width,
    /// (index / grid_width) * cell_height)` pixels; the rectangle spans
    /// `actual_width × actual_height` pixels from there, normalized by
    /// `cell_width * grid_width` and `cell_height * grid_height`. A texture
    /// smaller than its cell therefore occupies only part of it.
    pub fn for_cell(
        index: u32,
        cell_width: u32,
        cell_height: u32,
        grid_width: u32,
        grid_height: u32,
        actual_width: u32,
        actual_height: u32,
    ) -> Self {
        let total_width = (cell_width * grid_width) as f32;
        let total_height = (cell_height * grid_height) as f32;

        let start_x = (index % grid_width) * cell_width;
        let start_y = (index / grid_width) * cell_height;

        Self {
            start: Vec2::new(start_x as f32 / total_width, start_y as f32 / total_height),
            end: Vec2::new(
                (start_x + actual_width) as f32 / total_width,
                (start_y + actual_height) as f32 / total_height,
            ),
        }
    }

    /// Maps a source UV into this rectangle: `lerp(start, end, uv)` per axis.
    pub fn remap(&self, uv: Vec2) -> Vec2 {
        self.start + (self.end - self.start) * uv
    }

    /// Inverse of [`UvRect::remap`].
    pub fn unmap(&self, uv: Vec2) -> Vec2 {
        (uv - self.start) / (self.end - self.start)
    }

    /// Width and height of the rectangle in UV units.
    pub fn size(&self) -> Vec2 {
        self.end - self.start
    }
}
