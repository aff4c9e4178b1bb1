//! Cached shortest-path planner over the walkability grid.

use std::collections::{HashMap, VecDeque};

use maze_survival_core::TileCoord;
use thiserror::Error;
use tracing::{debug, warn};

use crate::grid::WalkabilityGrid;

const UNVISITED: usize = usize::MAX;

/// Reasons a path request produced no route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// The grid has not been generated yet.
    #[error("walkability grid is not initialized")]
    Uninitialized,
    /// The clamped start tile is a wall.
    #[error("start tile {0:?} is not walkable")]
    StartBlocked(TileCoord),
    /// The clamped end tile is a wall.
    #[error("end tile {0:?} is not walkable")]
    EndBlocked(TileCoord),
    /// Both endpoints are walkable but no 4-connected route joins them.
    #[error("no path from {start:?} to {end:?}")]
    Unreachable {
        /// Clamped start tile.
        start: TileCoord,
        /// Clamped end tile.
        end: TileCoord,
    },
}

/// Bounded memo of path results with first-in-first-out eviction.
///
/// Lookups never refresh an entry's age; the oldest insertion is always the
/// next one evicted. Empty paths record unreachable pairs.
#[derive(Clone, Debug, Default)]
pub struct PathCache {
    capacity: usize,
    order: VecDeque<(TileCoord, TileCoord)>,
    entries: HashMap<(TileCoord, TileCoord), Vec<TileCoord>>,
}

impl PathCache {
    /// Creates an empty cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Maximum number of entries retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reports whether a result is memoized for the pair.
    #[must_use]
    pub fn contains(&self, start: TileCoord, end: TileCoord) -> bool {
        self.entries.contains_key(&(start, end))
    }

    /// Memoized path for the pair, if any.
    #[must_use]
    pub fn get(&self, start: TileCoord, end: TileCoord) -> Option<&[TileCoord]> {
        self.entries.get(&(start, end)).map(Vec::as_slice)
    }

    /// Stores a result, evicting the oldest insertion when full.
    pub fn insert(&mut self, start: TileCoord, end: TileCoord, path: Vec<TileCoord>) {
        if self.capacity == 0 {
            return;
        }

        let key = (start, end);
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = path;
            return;
        }

        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            let _ = self.entries.remove(&oldest);
            debug!(start = ?oldest.0, end = ?oldest.1, "evicted cached path");
        }

        self.order.push_back(key);
        let _ = self.entries.insert(key, path);
    }
}

/// Breadth-first path planner with a bounded result cache.
#[derive(Clone, Debug, Default)]
pub struct PathPlanner {
    cache: PathCache,
    snapshot: Vec<bool>,
    came_from: Vec<usize>,
}

impl PathPlanner {
    /// Creates a planner whose cache holds at most `capacity` results.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: PathCache::new(capacity),
            snapshot: Vec::new(),
            came_from: Vec::new(),
        }
    }

    /// Read-only access to the memoized results.
    #[must_use]
    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    /// Computes the route between two tiles, logging and returning an empty
    /// path when none exists.
    pub fn find_path(
        &mut self,
        grid: &WalkabilityGrid,
        start: TileCoord,
        end: TileCoord,
    ) -> Vec<TileCoord> {
        match self.try_find_path(grid, start, end) {
            Ok(path) => path,
            Err(error) => {
                warn!(%error, "path request failed");
                Vec::new()
            }
        }
    }

    /// Computes the route between two tiles.
    ///
    /// Both endpoints are clamped into the grid. The returned path starts with
    /// the start tile, ends with the end tile, and consecutive waypoints are
    /// 4-adjacent.
    pub fn try_find_path(
        &mut self,
        grid: &WalkabilityGrid,
        start: TileCoord,
        end: TileCoord,
    ) -> Result<Vec<TileCoord>, PathError> {
        if !grid.is_initialized() {
            return Err(PathError::Uninitialized);
        }

        let start = start.clamped(grid.width());
        let end = end.clamped(grid.width());
        if !grid.is_walkable(start) {
            return Err(PathError::StartBlocked(start));
        }
        if !grid.is_walkable(end) {
            return Err(PathError::EndBlocked(end));
        }

        let path = match self.cache.get(start, end) {
            Some(cached) => cached.to_vec(),
            None => {
                let computed = self.search(grid, start, end);
                self.cache.insert(start, end, computed.clone());
                computed
            }
        };

        if path.is_empty() {
            Err(PathError::Unreachable { start, end })
        } else {
            Ok(path)
        }
    }

    fn search(&mut self, grid: &WalkabilityGrid, start: TileCoord, end: TileCoord) -> Vec<TileCoord> {
        self.snapshot.clear();
        self.snapshot.extend_from_slice(grid.cells());
        self.came_from.clear();
        self.came_from.resize(self.snapshot.len(), UNVISITED);

        let width = grid.width();
        let (Some(start_index), Some(end_index)) = (grid.index(start), grid.index(end)) else {
            return Vec::new();
        };

        self.came_from[start_index] = start_index;
        let mut queue = VecDeque::from([start]);

        while let Some(tile) = queue.pop_front() {
            if tile == end {
                break;
            }
            let Some(current) = grid.index(tile) else {
                continue;
            };

            for neighbor in neighbors(tile, width) {
                let Some(next) = grid.index(neighbor) else {
                    continue;
                };
                if !self.snapshot[next] || self.came_from[next] != UNVISITED {
                    continue;
                }
                self.came_from[next] = current;
                queue.push_back(neighbor);
            }
        }

        if self.came_from[end_index] == UNVISITED {
            return Vec::new();
        }

        let size = usize::try_from(width).unwrap_or(usize::MAX);
        let mut path = Vec::new();
        let mut cursor = end_index;
        loop {
            path.push(tile_from_index(cursor, size));
            if cursor == start_index {
                break;
            }
            cursor = self.came_from[cursor];
        }
        path.reverse();
        path
    }
}

fn neighbors(tile: TileCoord, size: u32) -> impl Iterator<Item = TileCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(y) = tile.y().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(tile.x(), y));
        count += 1;
    }

    if tile.x() + 1 < size {
        candidates[count] = Some(TileCoord::new(tile.x() + 1, tile.y()));
        count += 1;
    }

    if tile.y() + 1 < size {
        candidates[count] = Some(TileCoord::new(tile.x(), tile.y() + 1));
        count += 1;
    }

    if let Some(x) = tile.x().checked_sub(1) {
        candidates[count] = Some(TileCoord::new(x, tile.y()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn tile_from_index(index: usize, width: usize) -> TileCoord {
    let x = u32::try_from(index % width).unwrap_or(u32::MAX);
    let y = u32::try_from(index / width).unwrap_or(u32::MAX);
    TileCoord::new(x, y)
}
