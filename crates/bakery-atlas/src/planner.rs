//! Atlas grid planning: atlas pixel size, grid dimensions and cell slots.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uv::UvRect;

// ---------------------------------------------------------------------------
// AtlasError
// ---------------------------------------------------------------------------

/// Errors returned while planning or filling an atlas.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// The planner was asked to lay out zero materials.
    #[error("cannot plan an atlas for zero materials")]
    NoMaterials,

    /// The per-cell resolution must be at least one pixel.
    #[error("cell size must be non-zero")]
    ZeroCellSize,

    /// A material index falls outside the planned grid.
    #[error("cell index {index} does not fit a {width}x{height} grid")]
    CellOutOfRange {
        /// Requested linear index.
        index: u32,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },
}

// ---------------------------------------------------------------------------
// next_pow2
// ---------------------------------------------------------------------------

/// Smallest power of two strictly greater than `x`.
///
/// An input that is already a power of two still advances:
/// `next_pow2(256) == 512`, `next_pow2(1) == 2`.
pub fn next_pow2(x: u32) -> u32 {
    (x + 1).next_power_of_two()
}

// ---------------------------------------------------------------------------
// AtlasPlan
// ---------------------------------------------------------------------------

/// Row/column slot of one material in the atlas grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    /// Row, counted from the UV origin (bottom).
    pub row: u32,
    /// Column, counted from the left.
    pub column: u32,
}

/// Atlas dimensions derived from a material count and a cell resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasPlan {
    /// Atlas width in pixels (power of two).
    pub pixel_width: u32,
    /// Atlas height in pixels (power of two).
    pub pixel_height: u32,
    /// Cells per atlas row: `pixel_width / cell_size`.
    pub grid_width: u32,
    /// Cells per atlas column: `pixel_height / cell_size`.
    pub grid_height: u32,
    /// Side of one square cell in pixels.
    pub cell_size: u32,
    /// `ceil(sqrt(M))`, the square packing the atlas size was derived from.
    pub packing_columns: u32,
    /// `ceil(M / packing_columns)`.
    pub packing_rows: u32,
}

impl AtlasPlan {
    /// Plans an atlas for `material_count` materials at `cell_size` pixels per cell.
    ///
    /// # Errors
    ///
    /// [`AtlasError::NoMaterials`] for zero materials, [`AtlasError::ZeroCellSize`]
    /// for a zero cell size.
    pub fn new(material_count: u32, cell_size: u32) -> Result<Self, AtlasError> {
        if material_count == 0 {
            return Err(AtlasError::NoMaterials);
        }
        if cell_size == 0 {
            return Err(AtlasError::ZeroCellSize);
        }

        let packing_columns = (material_count as f64).sqrt().ceil() as u32;
        let packing_rows = material_count.div_ceil(packing_columns);
        let pixel_width = next_pow2(packing_columns * cell_size);
        let pixel_height = next_pow2(packing_rows * cell_size);

        Ok(Self {
            pixel_width,
            pixel_height,
            grid_width: pixel_width / cell_size,
            grid_height: pixel_height / cell_size,
            cell_size,
            packing_columns,
            packing_rows,
        })
    }

    /// Total number of cells in the grid.
    pub fn capacity(&self) -> u32 {
        self.grid_width * self.grid_height
    }

    /// Grid slot of the material discovered at `index`.
    pub fn cell(&self, index: u32) -> Result<GridCell, AtlasError> {
        if index >= self.capacity() {
            return Err(AtlasError::CellOutOfRange {
                index,
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        Ok(GridCell {
            row: index / self.grid_width,
            column: index % self.grid_width,
        })
    }

    /// UV rectangle of cell `index` holding a texture of `actual_width × actual_height`.
    ///
    /// See [`UvRect::for_cell`].
    pub fn cell_uv(
        &self,
        index: u32,
        actual_width: u32,
        actual_height: u32,
    ) -> Result<UvRect, AtlasError> {
        self.cell(index)?;
        Ok(UvRect::for_cell(
            index,
            self.cell_size,
            self.cell_size,
            self.grid_width,
            self.grid_height,
            actual_width,
            actual_height,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_pow2_always_advances() {
        assert_eq!(next_pow2(1), 2);
        assert_eq!(next_pow2(2), 4);
        assert_eq!(next_pow2(3), 4);
        assert_eq!(next_pow2(256), 512);
        assert_eq!(next_pow2(257), 512);
        assert_eq!(next_pow2(1024), 2048);
    }

    #[test]
    fn test_zero_materials_rejected() {
        assert!(matches!(AtlasPlan::new(0, 1024), Err(AtlasError::NoMaterials)));
        assert!(matches!(AtlasPlan::new(3, 0), Err(AtlasError::ZeroCellSize)));
    }

    #[test]
    fn test_plan_dimensions_hold_for_many_counts() {
        for cell in [1u32, 7, 512, 1024] {
            for m in 1u32..=40 {
                let plan = AtlasPlan::new(m, cell).unwrap();
                let min = (m as f64).sqrt().ceil() as u32 * cell;
                assert!(plan.pixel_width.is_power_of_two());
                assert!(plan.pixel_height.is_power_of_two());
                assert!(plan.pixel_width >= min, "m={m} cell={cell}");
                assert!(plan.pixel_height >= plan.packing_rows * cell);
                assert!(plan.grid_width * plan.grid_height >= m);
                assert!(plan.packing_columns * plan.packing_rows >= m);
            }
        }
    }

    #[test]
    fn test_three_materials_unit_cells() {
        let plan = AtlasPlan::new(3, 1).unwrap();
        assert_eq!((plan.packing_columns, plan.packing_rows), (2, 2));
        assert_eq!((plan.pixel_width, plan.pixel_height), (4, 4));
        assert_eq!((plan.grid_width, plan.grid_height), (4, 4));
        assert_eq!(plan.cell(2).unwrap(), GridCell { row: 0, column: 2 });

        let uv = plan.cell_uv(2, 1, 1).unwrap();
        assert_eq!(uv.start.to_array(), [0.5, 0.0]);
        assert_eq!(uv.end.to_array(), [0.75, 0.25]);
    }

    #[test]
    fn test_single_material_1024() {
        let plan = AtlasPlan::new(1, 1024).unwrap();
        assert_eq!(plan.pixel_width, 2048);
        assert_eq!(plan.pixel_height, 2048);
        assert_eq!(plan.grid_width, 2);
        assert_eq!(plan.cell(0).unwrap(), GridCell { row: 0, column: 0 });
    }

    #[test]
    fn test_cell_row_major_wraps_on_grid_width() {
        let plan = AtlasPlan::new(5, 16).unwrap();
        // 5 materials → 3x2 packing → 64x64 px (32 rounds up to 64) → 4x4 grid.
        assert_eq!(plan.grid_width, 4);
        assert_eq!(plan.grid_height, 4);
        assert_eq!(plan.cell(3).unwrap(), GridCell { row: 0, column: 3 });
        assert_eq!(plan.cell(4).unwrap(), GridCell { row: 1, column: 0 });
        assert!(matches!(
            plan.cell(16),
            Err(AtlasError::CellOutOfRange { index: 16, .. })
        ));
    }
}
