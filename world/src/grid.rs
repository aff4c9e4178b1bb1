//! Boolean passability map over the square tile space.

use maze_survival_core::TileCoord;

/// Dense walkability grid stored in row-major order.
///
/// A default-constructed grid has zero size and reports itself as
/// uninitialized; out-of-bounds queries always answer "not walkable".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkabilityGrid {
    size: u32,
    cells: Vec<bool>,
}

impl WalkabilityGrid {
    /// Creates an all-wall grid with `size` columns and rows.
    #[must_use]
    pub fn blocked(size: u32) -> Self {
        let count = usize::try_from(u64::from(size) * u64::from(size)).unwrap_or(0);
        Self {
            size,
            cells: vec![false; count],
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.size
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.size
    }

    /// Reports whether the grid has been sized and can answer queries.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.size > 0 && !self.cells.is_empty()
    }

    /// Reports whether the tile can be entered.
    #[must_use]
    pub fn is_walkable(&self, tile: TileCoord) -> bool {
        self.index(tile)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Signed variant of [`Self::is_walkable`] used while probing past the edges.
    #[must_use]
    pub fn is_walkable_at(&self, x: i64, y: i64) -> bool {
        self.tile_at(x, y)
            .map_or(false, |tile| self.is_walkable(tile))
    }

    /// Marks a tile as passable or blocked. Out-of-bounds tiles are ignored.
    pub fn set_walkable(&mut self, tile: TileCoord, walkable: bool) {
        if let Some(index) = self.index(tile) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = walkable;
            }
        }
    }

    /// Resets every tile to the provided passability.
    pub fn fill(&mut self, walkable: bool) {
        self.cells.fill(walkable);
    }

    /// Converts signed coordinates to a tile if they fall inside the grid.
    #[must_use]
    pub fn tile_at(&self, x: i64, y: i64) -> Option<TileCoord> {
        let bound = i64::from(self.size);
        if (0..bound).contains(&x) && (0..bound).contains(&y) {
            Some(TileCoord::new(
                u32::try_from(x).ok()?,
                u32::try_from(y).ok()?,
            ))
        } else {
            None
        }
    }

    /// Row-major passability flags.
    #[must_use]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Number of walkable tiles.
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|walkable| **walkable).count()
    }

    /// Finds the nearest walkable tile by scanning square rings of growing radius.
    ///
    /// Radius 0 is the anchor itself; rings up to `max_radius - 1` are searched.
    #[must_use]
    pub fn nearest_walkable(&self, anchor: TileCoord, max_radius: u32) -> Option<TileCoord> {
        if self.is_walkable(anchor) {
            return Some(anchor);
        }

        let (ax, ay) = (i64::from(anchor.x()), i64::from(anchor.y()));
        for r in 1..i64::from(max_radius) {
            for dx in -r..=r {
                for dy in -r..=r {
                    if dx.abs() != r && dy.abs() != r {
                        continue;
                    }
                    if let Some(tile) = self.tile_at(ax + dx, ay + dy) {
                        if self.is_walkable(tile) {
                            return Some(tile);
                        }
                    }
                }
            }
        }
        None
    }

    /// Finds the first walkable tile inside squares of radius `0..=max_radius`.
    ///
    /// Each square is scanned in full, column-major, before the next larger one.
    #[must_use]
    pub fn first_walkable_within(&self, anchor: TileCoord, max_radius: u32) -> Option<TileCoord> {
        let (ax, ay) = (i64::from(anchor.x()), i64::from(anchor.y()));
        for r in 0..=i64::from(max_radius) {
            for dx in -r..=r {
                for dy in -r..=r {
                    if let Some(tile) = self.tile_at(ax + dx, ay + dy) {
                        if self.is_walkable(tile) {
                            return Some(tile);
                        }
                    }
                }
            }
        }
        None
    }

    pub(crate) fn index(&self, tile: TileCoord) -> Option<usize> {
        if tile.x() < self.size && tile.y() < self.size {
            let row = usize::try_from(tile.y()).ok()?;
            let column = usize::try_from(tile.x()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            row.checked_mul(width)?.checked_add(column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_is_uninitialized_and_blocked() {
        let grid = WalkabilityGrid::default();
        assert!(!grid.is_initialized());
        assert!(!grid.is_walkable(TileCoord::new(0, 0)));
    }

    #[test]
    fn set_and_query_round_trip() {
        let mut grid = WalkabilityGrid::blocked(8);
        grid.set_walkable(TileCoord::new(3, 4), true);
        grid.set_walkable(TileCoord::new(30, 4), true);

        assert!(grid.is_walkable(TileCoord::new(3, 4)));
        assert!(!grid.is_walkable(TileCoord::new(4, 3)));
        assert!(!grid.is_walkable_at(-1, 4));
        assert_eq!(grid.walkable_count(), 1);
    }

    #[test]
    fn nearest_walkable_prefers_inner_rings() {
        let mut grid = WalkabilityGrid::blocked(16);
        grid.set_walkable(TileCoord::new(10, 10), true);
        grid.set_walkable(TileCoord::new(6, 7), true);

        assert_eq!(
            grid.nearest_walkable(TileCoord::new(5, 5), 50),
            Some(TileCoord::new(6, 7))
        );
        assert_eq!(grid.nearest_walkable(TileCoord::new(5, 5), 2), None);
    }

    #[test]
    fn first_walkable_within_respects_radius() {
        let mut grid = WalkabilityGrid::blocked(16);
        grid.set_walkable(TileCoord::new(3, 0), true);

        assert_eq!(grid.first_walkable_within(TileCoord::new(0, 0), 2), None);
        assert_eq!(
            grid.first_walkable_within(TileCoord::new(1, 0), 2),
            Some(TileCoord::new(3, 0))
        );
    }
}
