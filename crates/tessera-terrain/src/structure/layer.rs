//! The editable structure set of the home tile.
//!
//! Enforces one structure per grid cell: placing onto an occupied cell removes
//! the structure that was there.

use super::{MaskGrid, StructureKind, StructureMask, StructurePlacement};

/// Result of [`StructureLayer::place`].
#[derive(Clone, Debug, PartialEq)]
pub enum PlacementOutcome {
    /// A new structure was added with this id.
    Placed(String),
    /// The cell was occupied; the existing structure was removed instead.
    Removed(StructurePlacement),
    /// The cell is off the grid; nothing changed.
    OutOfBounds,
}

/// Structures placed on the home tile, in placement order.
#[derive(Clone, Debug)]
pub struct StructureLayer {
    grid: MaskGrid,
    structures: Vec<StructurePlacement>,
    next_id: u64,
}

impl StructureLayer {
    pub fn new(grid: MaskGrid) -> Self {
        Self {
            grid,
            structures: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild a layer from previously exported placements. Placements that
    /// are off the grid or collide with an earlier one are dropped.
    pub fn from_placements(grid: MaskGrid, placements: Vec<StructurePlacement>) -> Self {
        let mut layer = Self::new(grid);
        for placement in placements {
            if !grid.contains(placement.grid_x, placement.grid_z) {
                tracing::warn!(id = %placement.id, "dropping off-grid structure");
                continue;
            }
            if layer.structure_at(placement.grid_x, placement.grid_z).is_some() {
                tracing::warn!(id = %placement.id, "dropping structure on occupied cell");
                continue;
            }
            layer.structures.push(placement);
        }
        layer.next_id = layer.structures.len() as u64 + 1;
        layer
    }

    /// Toggle a structure of `kind` at `(grid_x, grid_z)`.
    pub fn place(&mut self, kind: StructureKind, grid_x: i32, grid_z: i32) -> PlacementOutcome {
        if !self.grid.contains(grid_x, grid_z) {
            return PlacementOutcome::OutOfBounds;
        }
        if let Some(removed) = self.remove_at(grid_x, grid_z) {
            return PlacementOutcome::Removed(removed);
        }

        let id = loop {
            let candidate = format!("structure_{}", self.next_id);
            self.next_id += 1;
            if self.structures.iter().all(|s| s.id != candidate) {
                break candidate;
            }
        };
        self.structures
            .push(StructurePlacement::new(id.clone(), kind, grid_x, grid_z));
        PlacementOutcome::Placed(id)
    }

    /// Remove and return the structure at `(grid_x, grid_z)`, if any.
    pub fn remove_at(&mut self, grid_x: i32, grid_z: i32) -> Option<StructurePlacement> {
        let index = self
            .structures
            .iter()
            .position(|s| s.cell() == (grid_x, grid_z))?;
        Some(self.structures.remove(index))
    }

    pub fn structure_at(&self, grid_x: i32, grid_z: i32) -> Option<&StructurePlacement> {
        self.structures
            .iter()
            .find(|s| s.cell() == (grid_x, grid_z))
    }

    pub fn clear(&mut self) {
        self.structures.clear();
    }

    pub fn structures(&self) -> &[StructurePlacement] {
        &self.structures
    }

    pub fn grid(&self) -> MaskGrid {
        self.grid
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Build a fresh mask for the current set.
    pub fn mask(&self) -> StructureMask {
        StructureMask::build(&self.structures, self.grid)
    }
}
