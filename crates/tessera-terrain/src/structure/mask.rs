//! Structure mask: per-cell flags built from a structure set, and the
//! distance-falloff influence used to flatten terrain around structures.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::DVec2;
use hashbrown::HashMap;

use super::StructurePlacement;
use crate::seed::{det_floor, det_sqrt};

/// Influence reaches zero at this fraction of a cell size from a padding
/// cell's centre.
pub const FALLOFF_RADIUS: f64 = 0.7;

/// Geometry of the structure grid, centred on the home tile's origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskGrid {
    /// Cells per side.
    pub grid_size: u32,
    /// World units per cell.
    pub cell_size: f64,
}

impl MaskGrid {
    pub fn new(grid_size: u32, cell_size: f64) -> Self {
        Self {
            grid_size,
            cell_size,
        }
    }

    fn half_extent(&self) -> f64 {
        f64::from(self.grid_size) * self.cell_size * 0.5
    }

    /// Returns `true` if `(gx, gz)` lies on the grid.
    pub fn contains(&self, gx: i32, gz: i32) -> bool {
        let n = self.grid_size as i64;
        (0..n).contains(&i64::from(gx)) && (0..n).contains(&i64::from(gz))
    }

    /// Grid cell containing world position `(world_x, world_z)`, or `None`
    /// outside the grid.
    pub fn world_to_grid(&self, world_x: f64, world_z: f64) -> Option<(i32, i32)> {
        if !(self.cell_size > 0.0) || !world_x.is_finite() || !world_z.is_finite() {
            return None;
        }
        let half = self.half_extent();
        let gx = det_floor((world_x + half) / self.cell_size);
        let gz = det_floor((world_z + half) / self.cell_size);
        let n = f64::from(self.grid_size);
        if gx < 0.0 || gz < 0.0 || gx >= n || gz >= n {
            return None;
        }
        Some((gx as i32, gz as i32))
    }

    /// World-space centre of cell `(gx, gz)`.
    pub fn cell_center(&self, gx: i32, gz: i32) -> DVec2 {
        let half = self.half_extent();
        DVec2::new(
            f64::from(gx) * self.cell_size + self.cell_size * 0.5 - half,
            f64::from(gz) * self.cell_size + self.cell_size * 0.5 - half,
        )
    }
}

/// Mask state of one grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskCell {
    /// Always `true` for cells present in the mask.
    pub masked: bool,
    /// `true` for the structure's own cell, `false` for its padding.
    pub is_structure: bool,
    /// Owning structure.
    pub structure_id: String,
}

/// Cell flags for one structure set. Rebuilt from scratch whenever the set
/// changes; never edited in place.
#[derive(Clone, Debug)]
pub struct StructureMask {
    grid: MaskGrid,
    cells: HashMap<(i32, i32), MaskCell>,
}

impl StructureMask {
    /// A mask with no structures. Allocates nothing.
    pub fn empty(grid: MaskGrid) -> Self {
        Self {
            grid,
            cells: HashMap::new(),
        }
    }

    /// Mark each structure's cell and its 8 surrounding cells.
    ///
    /// Padding from a later structure overwrites earlier padding; structure
    /// cells are never overwritten by padding. Cells off the grid are skipped.
    pub fn build(structures: &[StructurePlacement], grid: MaskGrid) -> Self {
        if structures.is_empty() {
            return Self::empty(grid);
        }

        let mut cells = HashMap::with_capacity(structures.len() * 9);
        for structure in structures {
            for dz in -1..=1 {
                for dx in -1..=1 {
                    let gx = structure.grid_x + dx;
                    let gz = structure.grid_z + dz;
                    if !grid.contains(gx, gz) {
                        continue;
                    }
                    let is_structure = dx == 0 && dz == 0;
                    if !is_structure
                        && cells
                            .get(&(gx, gz))
                            .is_some_and(|cell: &MaskCell| cell.is_structure)
                    {
                        continue;
                    }
                    cells.insert(
                        (gx, gz),
                        MaskCell {
                            masked: true,
                            is_structure,
                            structure_id: structure.id.clone(),
                        },
                    );
                }
            }
        }

        tracing::debug!(
            structures = structures.len(),
            cells = cells.len(),
            "built structure mask"
        );
        Self { grid, cells }
    }

    pub fn grid(&self) -> MaskGrid {
        self.grid
    }

    /// Mask state of `(gx, gz)`, `None` if unmasked.
    pub fn cell(&self, gx: i32, gz: i32) -> Option<&MaskCell> {
        self.cells.get(&(gx, gz))
    }

    /// Number of masked cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flattening strength in `[0, 1]` at world position `(world_x, world_z)`.
    ///
    /// Structure cells are fully flattened. Padding cells fall off linearly
    /// with distance from the cell centre, reaching zero at
    /// [`FALLOFF_RADIUS`] × cell size. Unmasked and off-grid positions are 0.
    pub fn influence_at(&self, world_x: f64, world_z: f64) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let Some((gx, gz)) = self.grid.world_to_grid(world_x, world_z) else {
            return 0.0;
        };
        let Some(cell) = self.cells.get(&(gx, gz)) else {
            return 0.0;
        };
        if cell.is_structure {
            return 1.0;
        }

        let offset = DVec2::new(world_x, world_z) - self.grid.cell_center(gx, gz);
        let distance = det_sqrt(offset.x * offset.x + offset.y * offset.y);
        let radius = FALLOFF_RADIUS * self.grid.cell_size;
        (1.0 - distance / radius).max(0.0)
    }

    /// Content hash over the grid and every masked cell, independent of
    /// insertion order.
    pub fn fingerprint(&self) -> u64 {
        let mut entries: Vec<_> = self.cells.iter().collect();
        entries.sort_unstable_by_key(|(key, _)| **key);

        let mut hasher = DefaultHasher::new();
        self.grid.grid_size.hash(&mut hasher);
        self.grid.cell_size.to_bits().hash(&mut hasher);
        for ((gx, gz), cell) in entries {
            gx.hash(&mut hasher);
            gz.hash(&mut hasher);
            cell.is_structure.hash(&mut hasher);
            cell.structure_id.hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Blend `raw` toward `flatten_target` by `influence`.
#[inline]
pub fn flatten(raw: f64, influence: f64, flatten_target: f64) -> f64 {
    raw * (1.0 - influence) + flatten_target * influence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::StructureKind;

    fn grid() -> MaskGrid {
        MaskGrid::new(10, 2.0)
    }

    fn place(id: &str, gx: i32, gz: i32) -> StructurePlacement {
        StructurePlacement::new(id, StructureKind::Cuboid, gx, gz)
    }

    #[test]
    fn test_empty_mask_has_no_influence() {
        let mask = StructureMask::build(&[], grid());
        assert!(mask.is_empty());
        assert_eq!(mask.influence_at(0.0, 0.0), 0.0);
        assert_eq!(mask.influence_at(-3.0, 4.5), 0.0);
    }

    #[test]
    fn test_structure_marks_moore_neighborhood() {
        let mask = StructureMask::build(&[place("a", 5, 5)], grid());
        assert_eq!(mask.len(), 9);
        let center = mask.cell(5, 5).unwrap();
        assert!(center.is_structure && center.masked);
        for (dx, dz) in [(-1, -1), (0, -1), (1, 0), (1, 1)] {
            let cell = mask.cell(5 + dx, 5 + dz).unwrap();
            assert!(cell.masked && !cell.is_structure);
            assert_eq!(cell.structure_id, "a");
        }
        assert!(mask.cell(7, 5).is_none());
    }

    #[test]
    fn test_edge_structure_clips_padding() {
        let mask = StructureMask::build(&[place("corner", 0, 0)], grid());
        assert_eq!(mask.len(), 4, "Only on-grid padding cells are kept");
    }

    #[test]
    fn test_later_padding_wins() {
        let mask = StructureMask::build(&[place("a", 3, 3), place("b", 5, 3)], grid());
        assert_eq!(mask.cell(4, 3).unwrap().structure_id, "b");
        assert_eq!(mask.cell(2, 3).unwrap().structure_id, "a");
    }

    #[test]
    fn test_padding_never_overwrites_structure_cell() {
        let mask = StructureMask::build(&[place("a", 3, 3), place("b", 4, 3)], grid());
        let a = mask.cell(3, 3).unwrap();
        assert!(a.is_structure);
        assert_eq!(a.structure_id, "a");
        let b = mask.cell(4, 3).unwrap();
        assert!(b.is_structure);
        assert_eq!(b.structure_id, "b");
    }

    #[test]
    fn test_world_to_grid_and_back() {
        let g = grid();
        // Grid spans [-10, 10) on both axes.
        assert_eq!(g.world_to_grid(-10.0, -10.0), Some((0, 0)));
        assert_eq!(g.world_to_grid(9.999, 0.0), Some((9, 5)));
        assert_eq!(g.world_to_grid(10.0, 0.0), None);
        assert_eq!(g.world_to_grid(0.0, -10.5), None);
        assert_eq!(g.world_to_grid(f64::NAN, 0.0), None);
        assert_eq!(g.cell_center(5, 5), DVec2::new(1.0, 1.0));
        let c = g.cell_center(3, 7);
        assert_eq!(g.world_to_grid(c.x, c.y), Some((3, 7)));
    }

    #[test]
    fn test_influence_saturates_on_structure_cell() {
        let g = grid();
        let mask = StructureMask::build(&[place("a", 5, 5)], g);
        let c = g.cell_center(5, 5);
        assert_eq!(mask.influence_at(c.x, c.y), 1.0);
        assert_eq!(mask.influence_at(c.x + 0.9, c.y - 0.9), 1.0);
    }

    #[test]
    fn test_padding_falloff() {
        let g = grid();
        let mask = StructureMask::build(&[place("a", 5, 5)], g);
        let c = g.cell_center(6, 5);

        assert_eq!(mask.influence_at(c.x, c.y), 1.0, "Padding centre has distance 0");

        let half_radius = FALLOFF_RADIUS * g.cell_size * 0.5;
        let v = mask.influence_at(c.x + half_radius, c.y);
        assert!((v - 0.5).abs() < 1e-12, "Expected 0.5 at half radius, got {v}");

        // Cell corner sits at distance sqrt(2) > 1.4 = 0.7 * cell_size.
        assert_eq!(mask.influence_at(c.x + 0.99, c.y + 0.99), 0.0);
    }

    #[test]
    fn test_influence_zero_beyond_radius_everywhere() {
        let g = grid();
        let mask = StructureMask::build(&[place("a", 4, 4), place("b", 6, 7)], g);
        let radius = FALLOFF_RADIUS * g.cell_size;
        for i in 0..200 {
            for j in 0..200 {
                let wx = -10.0 + i as f64 * 0.1;
                let wz = -10.0 + j as f64 * 0.1;
                let v = mask.influence_at(wx, wz);
                assert!((0.0..=1.0).contains(&v));
                let Some((gx, gz)) = g.world_to_grid(wx, wz) else { continue };
                let Some(cell) = mask.cell(gx, gz) else {
                    assert_eq!(v, 0.0);
                    continue;
                };
                if !cell.is_structure {
                    let d = (DVec2::new(wx, wz) - g.cell_center(gx, gz)).length();
                    if d >= radius {
                        assert_eq!(v, 0.0, "Nonzero influence {v} at distance {d}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_off_grid_structure_ignored() {
        let mask = StructureMask::build(&[place("far", 40, 40)], grid());
        assert!(mask.is_empty());
    }

    #[test]
    fn test_flatten_blend() {
        assert_eq!(flatten(0.8, 0.0, -0.2), 0.8);
        assert_eq!(flatten(0.8, 1.0, -0.2), -0.2);
        assert!((flatten(0.8, 0.5, -0.2) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_fingerprint_order_independent() {
        let a = StructureMask::build(&[place("a", 2, 2), place("b", 7, 7)], grid());
        let b = StructureMask::build(&[place("b", 7, 7), place("a", 2, 2)], grid());
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = StructureMask::build(&[place("a", 2, 2)], grid());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_ne!(
            StructureMask::empty(grid()).fingerprint(),
            StructureMask::empty(MaskGrid::new(12, 2.0)).fingerprint()
        );
    }
}
