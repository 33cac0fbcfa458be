//! Viewer configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use splatview_core::{Result, SelectionOptions};
use splatview_geo::{CameraIntrinsics, ReadoutTracker};

/// Configuration for one scene, read from JSON.
///
/// Every field is optional in the JSON; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Scene directory name under `results_root`.
    pub scene_id: String,

    /// Directory holding one sub-directory per scene.
    pub results_root: PathBuf,

    /// Vertical field of view of registered camera helpers, in degrees.
    pub fov_degrees: f32,

    /// Aspect ratio of registered camera helpers.
    pub aspect_ratio: f32,

    /// Options applied to selection queries.
    pub selection: SelectionOptions,

    /// Camera movement (scene units) that triggers a new readout.
    pub movement_threshold: f32,

    /// Stillness in milliseconds before the geodetic readout is refreshed.
    pub settle_millis: u64,

    /// Edge length of voxels sampled from a selection.
    pub voxel_size: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scene_id: String::new(),
            results_root: PathBuf::from("results"),
            fov_degrees: 50.0,
            aspect_ratio: 1.0,
            selection: SelectionOptions::default(),
            movement_threshold: splatview_geo::DEFAULT_MOVEMENT_THRESHOLD,
            settle_millis: 500,
            voxel_size: 0.05,
        }
    }
}

impl ViewerConfig {
    /// Creates the default configuration for `scene_id`.
    pub fn for_scene(scene_id: impl Into<String>) -> Self {
        Self {
            scene_id: scene_id.into(),
            ..Self::default()
        }
    }

    /// Parses a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn colmap_dir(&self) -> PathBuf {
        self.results_root.join(&self.scene_id).join("colmap")
    }

    /// Path of the binary image registrations.
    pub fn registrations_path(&self) -> PathBuf {
        self.colmap_dir().join("sparse").join("0").join("images.bin")
    }

    /// Path of the local-to-ECEF transform file.
    pub fn transform_path(&self) -> PathBuf {
        self.colmap_dir().join("transform.txt")
    }

    /// Frustum parameters for registered cameras.
    pub fn camera_intrinsics(&self) -> CameraIntrinsics {
        CameraIntrinsics::new(self.fov_degrees, self.aspect_ratio)
    }

    /// A readout tracker with this configuration's thresholds.
    pub fn readout_tracker(&self) -> ReadoutTracker {
        ReadoutTracker::new(
            self.movement_threshold,
            Duration::from_millis(self.settle_millis),
        )
    }
}
