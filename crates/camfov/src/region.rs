//! Drawn regions: handles, atomic batches and the per-camera table.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use camfov_cone::BoundaryLoop;

use crate::{FovError, Result};

/// Identifier of a camera element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub u64);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "camera {}", self.0)
    }
}

/// Opaque handle of a region created by a [`RegionSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionHandle(pub u64);

/// One drawn layer of one camera.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionKey {
    /// Owning camera.
    pub camera: CameraId,
    /// Layer name, e.g. `fov` or `dori_63px`.
    pub layer: String,
}

impl RegionKey {
    /// Key for `camera` and `layer`.
    pub fn new(camera: CameraId, layer: impl Into<String>) -> Self {
        Self {
            camera,
            layer: layer.into(),
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.camera, self.layer)
    }
}

/// A region to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRegion {
    /// Camera and layer the region belongs to.
    pub key: RegionKey,
    /// Closed outline.
    pub boundary: BoundaryLoop,
}

/// Deletions and creations applied together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionBatch {
    /// Regions to remove.
    pub delete: Vec<RegionHandle>,
    /// Regions to add, in order.
    pub create: Vec<NewRegion>,
}

impl RegionBatch {
    /// True if the batch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.create.is_empty()
    }
}

/// Host collaborator that owns drawn regions.
///
/// `commit` applies the whole batch or nothing: deletions first, then
/// creations, returning one handle per created region in order.
pub trait RegionSink {
    /// Apply a batch atomically.
    fn commit(&mut self, batch: RegionBatch) -> Result<Vec<RegionHandle>>;
}

/// In-memory [`RegionSink`].
#[derive(Debug, Default)]
pub struct MemoryRegionStore {
    next: u64,
    regions: BTreeMap<RegionHandle, NewRegion>,
    commits: usize,
}

impl MemoryRegionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Region behind a handle.
    pub fn get(&self, handle: RegionHandle) -> Option<&NewRegion> {
        self.regions.get(&handle)
    }

    /// Number of live regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True if no regions are live.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Live regions in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (RegionHandle, &NewRegion)> {
        self.regions.iter().map(|(h, r)| (*h, r))
    }

    /// Number of batches applied so far.
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl RegionSink for MemoryRegionStore {
    fn commit(&mut self, batch: RegionBatch) -> Result<Vec<RegionHandle>> {
        if let Some(missing) = batch.delete.iter().find(|h| !self.regions.contains_key(h)) {
            return Err(FovError::Sink(format!("no region with handle {}", missing.0)));
        }
        for handle in &batch.delete {
            self.regions.remove(handle);
        }
        let handles = batch
            .create
            .into_iter()
            .map(|region| {
                self.next += 1;
                let handle = RegionHandle(self.next);
                self.regions.insert(handle, region);
                handle
            })
            .collect();
        self.commits += 1;
        Ok(handles)
    }
}

/// Current region of every camera layer.
#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    entries: HashMap<RegionKey, RegionHandle>,
}

impl RegionTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle currently drawn for `key`.
    pub fn get(&self, key: &RegionKey) -> Option<RegionHandle> {
        self.entries.get(key).copied()
    }

    /// Record `handle` for `key`, returning the handle it replaces.
    pub fn insert(&mut self, key: RegionKey, handle: RegionHandle) -> Option<RegionHandle> {
        self.entries.insert(key, handle)
    }

    /// Forget `key`.
    pub fn remove(&mut self, key: &RegionKey) -> Option<RegionHandle> {
        self.entries.remove(key)
    }

    /// Layers drawn for `camera`, sorted by layer name.
    pub fn camera_regions(&self, camera: CameraId) -> Vec<(RegionKey, RegionHandle)> {
        let mut out: Vec<(RegionKey, RegionHandle)> = self
            .entries
            .iter()
            .filter(|(k, _)| k.camera == camera)
            .map(|(k, h)| (k.clone(), *h))
            .collect();
        out.sort();
        out
    }

    /// Number of tracked regions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
