//! Per-camera rendering with batch replace and undo.

use std::collections::{HashSet, VecDeque};

use camfov_cone::{synthesize, BoundaryLoop, CameraProfile};
use camfov_math::Point2;
use camfov_obstacles::ObstacleSet;

use crate::region::{
    CameraId, NewRegion, RegionBatch, RegionHandle, RegionKey, RegionSink, RegionTable,
};
use crate::settings::FovSettings;
use crate::{FovError, Result};

/// Name of the plain field-of-view layer.
pub const FOV_LAYER: &str = "fov";

/// Renders kept for [`FovPlanner::undo_last`]; older ones are forgotten.
pub const UNDO_DEPTH: usize = 8;

/// One layer to draw for a camera.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRequest {
    /// Layer name, unique within a request.
    pub name: String,
    /// Ray length in meters.
    pub max_range: f64,
}

impl LayerRequest {
    /// Layer `name` reaching `max_range` meters.
    pub fn new(name: impl Into<String>, max_range: f64) -> Self {
        Self {
            name: name.into(),
            max_range,
        }
    }
}

/// Everything needed to (re)draw one camera.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Camera being drawn.
    pub camera: CameraId,
    /// Camera position on the plan.
    pub position: Point2,
    /// View heading in degrees.
    pub orientation_deg: f64,
    /// Full view angle; the settings default when `None`.
    pub fov_deg: Option<f64>,
    /// Layers to draw.
    pub layers: Vec<LayerRequest>,
    /// Ray spacing; the settings default when `None`.
    pub resolution_deg: Option<f64>,
}

/// Outcome of [`FovPlanner::render`].
#[derive(Debug, Default)]
pub struct RenderReport {
    /// Layers drawn, with their new handles.
    pub created: Vec<(RegionKey, RegionHandle)>,
    /// Layers that could not be synthesized. Their previous region is kept.
    pub failed: Vec<(RegionKey, FovError)>,
    /// Handles of replaced regions.
    pub deleted: Vec<RegionHandle>,
}

impl RenderReport {
    /// True if every requested layer was drawn.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns the region table and the undo history.
#[derive(Debug)]
pub struct FovPlanner {
    settings: FovSettings,
    table: RegionTable,
    history: VecDeque<Vec<(RegionKey, RegionHandle)>>,
}

impl FovPlanner {
    /// Planner with validated settings.
    pub fn new(settings: FovSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            table: RegionTable::new(),
            history: VecDeque::new(),
        })
    }

    /// Active settings.
    pub fn settings(&self) -> &FovSettings {
        &self.settings
    }

    /// Current regions.
    pub fn table(&self) -> &RegionTable {
        &self.table
    }

    /// Number of batches that can be undone, at most [`UNDO_DEPTH`].
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Camera profile of one layer of a request.
    pub fn camera_profile(&self, request: &RenderRequest, layer: &LayerRequest) -> CameraProfile {
        CameraProfile::new(
            request.position,
            request.orientation_deg,
            request.fov_deg.unwrap_or(self.settings.default_fov_deg),
            layer.max_range,
            request
                .resolution_deg
                .unwrap_or(self.settings.angular_resolution_deg),
        )
    }

    /// Synthesize one boundary with the planner's settings.
    pub fn boundary(
        &self,
        camera: &CameraProfile,
        obstacles: &ObstacleSet,
    ) -> Result<BoundaryLoop> {
        Ok(synthesize(camera, obstacles, &self.settings.synthesis_options())?)
    }

    /// Draw every layer of `request`.
    ///
    /// Drawn layers replace their previous region in a single batch.
    /// A sink error leaves the table untouched and is returned.
    pub fn render<S: RegionSink + ?Sized>(
        &mut self,
        sink: &mut S,
        request: &RenderRequest,
        obstacles: &ObstacleSet,
    ) -> Result<RenderReport> {
        if request.layers.is_empty() {
            return Err(FovError::InvalidRequest(format!(
                "no layers requested for {}",
                request.camera
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = request.layers.iter().find(|l| !seen.insert(l.name.as_str())) {
            return Err(FovError::InvalidRequest(format!(
                "layer `{}` requested twice for {}",
                dup.name, request.camera
            )));
        }

        let mut report = RenderReport::default();
        let mut batch = RegionBatch::default();
        let mut replaced = Vec::new();
        for layer in &request.layers {
            let key = RegionKey::new(request.camera, layer.name.clone());
            let camera = self.camera_profile(request, layer);
            match self.boundary(&camera, obstacles) {
                Ok(boundary) => {
                    if let Some(old) = self.table.get(&key) {
                        batch.delete.push(old);
                        replaced.push(key.clone());
                    }
                    batch.create.push(NewRegion { key, boundary });
                }
                Err(e) => {
                    log::warn!("{key}: {e}");
                    report.failed.push((key, e));
                }
            }
        }

        if batch.create.is_empty() {
            return Ok(report);
        }

        let keys: Vec<RegionKey> = batch.create.iter().map(|r| r.key.clone()).collect();
        report.deleted = batch.delete.clone();
        let handles = sink.commit(batch)?;
        if handles.len() != keys.len() {
            // the deletions went through; stop tracking the removed regions
            for key in &replaced {
                self.table.remove(key);
            }
            return Err(FovError::Sink(format!(
                "expected {} handles, got {}",
                keys.len(),
                handles.len()
            )));
        }

        for (key, handle) in keys.into_iter().zip(handles) {
            self.table.insert(key.clone(), handle);
            report.created.push((key, handle));
        }
        self.history.push_back(report.created.clone());
        if self.history.len() > UNDO_DEPTH {
            self.history.pop_front();
        }
        log::info!(
            "{}: drew {} layer(s), {} failed",
            request.camera,
            report.created.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Remove the regions created by the most recent render.
    ///
    /// Regions already replaced or cleared are skipped. Returns the number
    /// removed; zero when there is nothing to undo.
    pub fn undo_last<S: RegionSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let Some(created) = self.history.pop_back() else {
            return Ok(0);
        };
        let live: Vec<(RegionKey, RegionHandle)> = created
            .iter()
            .filter(|(key, handle)| self.table.get(key) == Some(*handle))
            .cloned()
            .collect();
        if live.is_empty() {
            return Ok(0);
        }

        let batch = RegionBatch {
            delete: live.iter().map(|(_, h)| *h).collect(),
            create: Vec::new(),
        };
        if let Err(e) = sink.commit(batch) {
            self.history.push_back(created);
            return Err(e);
        }
        for (key, _) in &live {
            self.table.remove(key);
        }
        log::debug!("undid {} region(s)", live.len());
        Ok(live.len())
    }

    /// Remove every region of `camera`. Returns the number removed.
    pub fn clear_camera<S: RegionSink + ?Sized>(
        &mut self,
        sink: &mut S,
        camera: CameraId,
    ) -> Result<usize> {
        let regions = self.table.camera_regions(camera);
        if regions.is_empty() {
            return Ok(0);
        }
        sink.commit(RegionBatch {
            delete: regions.iter().map(|(_, h)| *h).collect(),
            create: Vec::new(),
        })?;
        for (key, _) in &regions {
            self.table.remove(key);
        }
        Ok(regions.len())
    }
}
