//! The scene context: everything one viewer instance needs.

use std::path::Path;
use std::time::Instant;

use glam::{Mat4, Vec3};
use splatview_core::{
    Aabb, Result, SelectionOptions, SplatviewError, Transform, TriangleMesh,
};
use splatview_geo::{
    parse_registrations, CameraReadout, EcefTransform, ReadoutTracker, RegisteredCamera,
};
use splatview_selection::{
    compute_box_selected_triangles, fast_box_hits_mesh, sample_voxels, select_with_scratch,
    tight_bounds, unique_vertex_ids, CameraMatrices, SelectionRegion, SelectionScratch,
    DEFAULT_VOXEL_CHUNK,
};

use crate::config::ViewerConfig;
use crate::registry::{CameraRegistry, MeshRegistry};

/// Label under which cameras read from image registrations are grouped.
pub const REGISTRATION_LABEL: &str = "colmap";

/// State of one scene.
///
/// Contexts are independent; a process may hold any number of them.
#[derive(Debug)]
pub struct SceneContext {
    config: ViewerConfig,
    transform: Option<EcefTransform>,
    meshes: MeshRegistry,
    cameras: CameraRegistry,
    readout: ReadoutTracker,
    scratch: SelectionScratch,
}

impl SceneContext {
    /// Creates an empty scene.
    pub fn new(config: ViewerConfig) -> Self {
        let readout = config.readout_tracker();
        Self {
            config,
            transform: None,
            meshes: MeshRegistry::new(),
            cameras: CameraRegistry::new(),
            readout,
            scratch: SelectionScratch::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Selection options used by [`SceneContext::select`].
    pub fn set_selection_options(&mut self, options: SelectionOptions) {
        self.config.selection = options;
    }

    pub fn meshes(&self) -> &MeshRegistry {
        &self.meshes
    }

    pub fn cameras(&self) -> &CameraRegistry {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut CameraRegistry {
        &mut self.cameras
    }

    pub fn transform(&self) -> Option<&EcefTransform> {
        self.transform.as_ref()
    }

    // ========================================================================
    // Meshes and selection
    // ========================================================================

    /// Indexes and registers a mesh under `name`.
    pub fn register_mesh(&mut self, name: impl Into<String>, mesh: TriangleMesh) -> Result<()> {
        self.meshes.register(name, mesh).map(|_| ())
    }

    /// Removes a mesh, returning it.
    pub fn remove_mesh(&mut self, name: &str) -> Result<TriangleMesh> {
        self.meshes
            .remove(name)
            .ok_or_else(|| SplatviewError::MeshNotFound(name.to_string()))
    }

    /// Moves a registered mesh in the world.
    pub fn set_mesh_world_matrix(&mut self, name: &str, world: Mat4) -> Result<()> {
        self.meshes
            .get_mut(name)
            .ok_or_else(|| SplatviewError::MeshNotFound(name.to_string()))?
            .set_world_matrix(world);
        Ok(())
    }

    /// Selects triangles of mesh `name` with the configured options.
    pub fn select(
        &mut self,
        name: &str,
        camera: &CameraMatrices,
        region: &SelectionRegion,
    ) -> Result<Vec<u32>> {
        let options = self.config.selection;
        self.select_with_options(name, camera, region, &options)
    }

    /// Selects triangles of mesh `name` with explicit options.
    pub fn select_with_options(
        &mut self,
        name: &str,
        camera: &CameraMatrices,
        region: &SelectionRegion,
        options: &SelectionOptions,
    ) -> Result<Vec<u32>> {
        let entry = self.meshes.require(name)?;
        select_with_scratch(
            entry.mesh(),
            entry.bvh(),
            camera,
            region,
            options,
            &mut self.scratch,
        )
    }

    /// Selects triangles of mesh `name` inside the oriented box `box_world`.
    pub fn select_box_3d(&mut self, name: &str, box_world: &Mat4) -> Result<Vec<u32>> {
        let entry = self.meshes.require(name)?;
        if !fast_box_hits_mesh(entry.mesh(), entry.bvh(), box_world) {
            return Ok(Vec::new());
        }
        compute_box_selected_triangles(
            entry.mesh(),
            entry.bvh(),
            box_world,
            &self.config.selection,
            &mut self.scratch,
        )
    }

    /// Cheap test whether the oriented box could touch mesh `name`.
    pub fn box_hits_mesh(&self, name: &str, box_world: &Mat4) -> Result<bool> {
        let entry = self.meshes.require(name)?;
        Ok(fast_box_hits_mesh(entry.mesh(), entry.bvh(), box_world))
    }

    /// Distinct vertex ids of a selection on mesh `name`.
    pub fn selection_vertices(&self, name: &str, selection: &[u32]) -> Result<Vec<u32>> {
        unique_vertex_ids(self.meshes.require(name)?.mesh(), selection)
    }

    /// World-space bounds of a selection on mesh `name`.
    pub fn selection_bounds(&self, name: &str, selection: &[u32]) -> Result<Aabb> {
        tight_bounds(self.meshes.require(name)?.mesh(), selection)
    }

    /// An oriented box fitted around a selection, ready to refine with a 3D box query.
    pub fn selection_box(&self, name: &str, selection: &[u32]) -> Result<Transform> {
        Ok(Transform::from_bounds(&self.selection_bounds(name, selection)?))
    }

    /// Samples voxel centres over a selection with the configured voxel size.
    pub fn sample_selection_voxels(
        &self,
        name: &str,
        selection: &[u32],
        on_chunk: impl FnMut(&[Vec3]),
    ) -> Result<usize> {
        let entry = self.meshes.require(name)?;
        sample_voxels(
            entry.mesh(),
            selection,
            self.config.voxel_size,
            DEFAULT_VOXEL_CHUNK,
            on_chunk,
        )
    }

    // ========================================================================
    // Geodesy and cameras
    // ========================================================================

    /// Loads the transform file named by the configuration.
    pub fn load_transform(&mut self) -> Result<()> {
        let path = self.config.transform_path();
        self.load_transform_from(path)
    }

    /// Loads a transform file.
    pub fn load_transform_from(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.transform = Some(EcefTransform::load(path)?);
        Ok(())
    }

    /// Parses transform file contents.
    pub fn load_transform_str(&mut self, text: &str) -> Result<()> {
        self.transform = Some(EcefTransform::parse(text)?);
        Ok(())
    }

    /// Loads the registrations named by the configuration.
    pub fn load_registrations(&mut self) -> Result<usize> {
        let path = self.config.registrations_path();
        let bytes = std::fs::read(&path)?;
        self.load_registrations_bytes(&bytes)
    }

    /// Registers one camera per readable record and returns how many were added.
    pub fn load_registrations_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        let batch = parse_registrations(bytes)?;
        let intrinsics = self.config.camera_intrinsics();
        for record in &batch.records {
            self.cameras.add(
                REGISTRATION_LABEL,
                RegisteredCamera::from_record(record, intrinsics),
            );
        }
        if !batch.skipped.is_empty() {
            log::warn!(
                "{} of {} registrations could not be used",
                batch.skipped.len(),
                batch.declared_count
            );
        }
        Ok(batch.records.len())
    }

    /// Matrices of the active registered camera, usable for a selection.
    pub fn active_camera_matrices(&self) -> Option<CameraMatrices> {
        self.cameras
            .active_camera()
            .map(|camera| CameraMatrices::new(camera.view_matrix(), camera.projection_matrix()))
    }

    /// Feeds this frame's camera position; returns a readout when there is news.
    ///
    /// Without a loaded transform there is nothing to report.
    pub fn camera_readout(&mut self, local_position: Vec3, now: Instant) -> Option<CameraReadout> {
        let transform = self.transform.as_ref()?;
        self.readout.update(local_position, now, transform)
    }

    /// Metric distance between two scene points, if a transform is loaded.
    pub fn measure(&self, p1: Vec3, p2: Vec3) -> Option<f64> {
        self.transform
            .as_ref()
            .map(|t| t.measure_distance(p1.as_dvec3(), p2.as_dvec3()))
    }
}

impl Default for SceneContext {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
