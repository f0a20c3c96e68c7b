//! `MaskSlot` — a load-once, read-many handle to the grid.

use std::sync::{Arc, OnceLock};

use nav_core::GeoPoint;

use crate::{GridError, GridResult, MaskMetadata, NavigabilityGrid};

/// Shared slot that holds the grid once it has been loaded.
///
/// Components that start before the mask asset is available hold a
/// `MaskSlot` (usually behind an `Arc`) and fail with
/// [`GridError::MaskNotInitialized`] until [`initialize`](Self::initialize)
/// succeeds.  After that every reader gets the same immutable grid.
#[derive(Debug, Default)]
pub struct MaskSlot {
    grid: OnceLock<Arc<NavigabilityGrid>>,
}

impl MaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that is already filled with `grid`.
    pub fn with_grid(grid: NavigabilityGrid) -> Self {
        let slot = Self::new();
        // A fresh OnceLock is always empty, so this cannot fail.
        let _ = slot.grid.set(Arc::new(grid));
        slot
    }

    /// Decode `mask_bytes` and publish the grid.  One-time: a second call
    /// fails with [`GridError::AlreadyInitialized`].
    pub fn initialize(&self, mask_bytes: &[u8], meta: MaskMetadata) -> GridResult<Arc<NavigabilityGrid>> {
        if self.grid.get().is_some() {
            return Err(GridError::AlreadyInitialized);
        }
        let grid = Arc::new(NavigabilityGrid::initialize(mask_bytes, meta)?);
        self.grid
            .set(Arc::clone(&grid))
            .map_err(|_| GridError::AlreadyInitialized)?;
        Ok(grid)
    }

    /// The loaded grid.
    pub fn get(&self) -> GridResult<Arc<NavigabilityGrid>> {
        self.grid.get().cloned().ok_or(GridError::MaskNotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.grid.get().is_some()
    }

    /// [`NavigabilityGrid::is_navigable`] through the slot.
    pub fn is_navigable(&self, p: GeoPoint) -> GridResult<bool> {
        Ok(self.get()?.is_navigable(p))
    }
}
