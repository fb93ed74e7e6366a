//! Raster sources: where grids come from.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SamplerError};
use crate::grid::{Grid, GridInfo};

/// Loads grids by identifier.
pub trait GridSource: Send + Sync {
    /// Load the grid registered under `id`.
    fn load_grid(&self, id: &str) -> Result<Arc<Grid>>;

    /// Metadata of the grid registered under `id`.
    fn grid_info(&self, id: &str) -> Result<GridInfo> {
        Ok(self.load_grid(id)?.info())
    }
}

/// A registry of grids held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryGridSource {
    grids: HashMap<String, Arc<Grid>>,
}

impl MemoryGridSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `grid` under `id`, replacing any previous grid.
    pub fn insert(&mut self, id: impl Into<String>, grid: Grid) -> Option<Arc<Grid>> {
        let id = id.into();
        debug!(id = %id, rows = grid.rows(), cols = grid.cols(), "Registering grid");
        self.grids.insert(id, Arc::new(grid))
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_grid(mut self, id: impl Into<String>, grid: Grid) -> Self {
        self.insert(id, grid);
        self
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<Grid>> {
        self.grids.remove(id)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.grids.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl GridSource for MemoryGridSource {
    fn load_grid(&self, id: &str) -> Result<Arc<Grid>> {
        self.grids
            .get(id)
            .cloned()
            .ok_or_else(|| SamplerError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridGeometry;
    use geo_common::CrsCode;

    fn small_grid() -> Grid {
        let geometry = GridGeometry::new(5.0, 50.0, 0.5, 0.5, true, 4, 2).unwrap();
        Grid::new(vec![1.0; 8], geometry, CrsCode::Epsg4326).unwrap()
    }

    #[test]
    fn test_load_and_info() {
        let source = MemoryGridSource::new().with_grid("elevation", small_grid());
        assert_eq!(source.len(), 1);
        assert_eq!(source.load_grid("elevation").unwrap().cols(), 4);

        let info = source.grid_info("elevation").unwrap();
        assert_eq!(info.rows, 2);
        assert_eq!(info.origin, (5.0, 50.0));
        assert_eq!(info.bounds.min_y, 49.0);
    }

    #[test]
    fn test_unknown_id() {
        let source = MemoryGridSource::new();
        assert_eq!(
            source.load_grid("missing").unwrap_err(),
            SamplerError::NotFound("missing".into())
        );
        assert!(source.grid_info("missing").is_err());
    }

    #[test]
    fn test_insert_replaces() {
        let mut source = MemoryGridSource::new();
        assert!(source.insert("a", small_grid()).is_none());
        assert!(source.insert("a", small_grid()).is_some());
        source.insert("b", small_grid());
        assert_eq!(source.ids(), vec!["a", "b"]);
        assert!(source.remove("a").is_some());
        assert_eq!(source.len(), 1);
    }
}
