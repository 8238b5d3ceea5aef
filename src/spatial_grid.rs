/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for efficient neighbor lookups.
 * It divides the simulation space into a uniform 3D grid of cells, so a
 * neighbor query only inspects the block of cells around an agent instead of
 * scanning the full agent pool. Cells are stored sparsely in a hash map keyed
 * by cell coordinate, so memory tracks the number of occupied cells rather
 * than the volume of the world.
 *
 * The grid only produces candidate indices; callers re-check the exact
 * distance predicate, so enabling the grid never changes which neighbors
 * qualify for a rule.
 */

use std::collections::HashMap;

use glam::Vec3;

pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    // Convert a world position to a cell coordinate
    #[inline]
    fn cell_coords(&self, position: Vec3) -> (i32, i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
            (position.z / self.cell_size).floor() as i32,
        )
    }

    /// Clear all cells, keeping their allocations.
    pub fn clear(&mut self) {
        for cell in self.cells.values_mut() {
            cell.clear();
        }
    }

    /// Insert an agent index at its position.
    #[inline]
    pub fn insert(&mut self, boid_index: usize, position: Vec3) {
        let cell = self.cell_coords(position);
        self.cells.entry(cell).or_default().push(boid_index);
    }

    /// Agent indices within every cell that could hold a point closer than
    /// `radius` to `position` (a cubic block of cells around the query).
    /// With `radius <= cell_size` this is the usual 3x3x3 block; smaller
    /// cells widen the block so no genuine neighbor is ever missed.
    pub fn nearby_indices(&self, position: Vec3, radius: f32) -> Vec<usize> {
        let (gx, gy, gz) = self.cell_coords(position);
        let reach = (radius / self.cell_size).ceil().max(1.0) as i32;

        let mut result = Vec::new();

        for z_offset in -reach..=reach {
            for y_offset in -reach..=reach {
                for x_offset in -reach..=reach {
                    let cell = (gx + x_offset, gy + y_offset, gz + z_offset);
                    if let Some(indices) = self.cells.get(&cell) {
                        result.extend_from_slice(indices);
                    }
                }
            }
        }

        result
    }
}
