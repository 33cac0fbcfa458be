//! Registries for meshes and registered cameras.

use std::collections::{BTreeMap, HashMap};

use splatview_core::{Bvh, Result, SplatviewError, TriangleMesh};
use splatview_geo::RegisteredCamera;

/// A mesh together with its spatial index.
#[derive(Debug)]
pub struct MeshEntry {
    mesh: TriangleMesh,
    bvh: Bvh,
}

impl MeshEntry {
    /// Indexes `mesh`.
    pub fn new(mesh: TriangleMesh) -> Result<Self> {
        let bvh = Bvh::build(&mesh)?;
        Ok(Self { mesh, bvh })
    }

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Moves the mesh in the world. The index is in mesh space and stays valid.
    pub fn set_world_matrix(&mut self, world: glam::Mat4) {
        self.mesh.set_world_matrix(world);
    }
}

/// Meshes available for selection, by name.
#[derive(Debug, Default)]
pub struct MeshRegistry {
    meshes: HashMap<String, MeshEntry>,
}

impl MeshRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes and registers a mesh.
    ///
    /// Returns an error if the name is taken or the mesh cannot be indexed.
    pub fn register(&mut self, name: impl Into<String>, mesh: TriangleMesh) -> Result<&MeshEntry> {
        let name = name.into();
        if self.meshes.contains_key(&name) {
            return Err(SplatviewError::MeshExists(name));
        }
        let entry = MeshEntry::new(mesh)?;
        log::debug!(
            "registered mesh '{name}' with {} triangles",
            entry.mesh.num_triangles()
        );
        Ok(self.meshes.entry(name).or_insert(entry))
    }

    pub fn get(&self, name: &str) -> Option<&MeshEntry> {
        self.meshes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MeshEntry> {
        self.meshes.get_mut(name)
    }

    /// Looks up a mesh, failing with [`SplatviewError::MeshNotFound`].
    pub fn require(&self, name: &str) -> Result<&MeshEntry> {
        self.get(name)
            .ok_or_else(|| SplatviewError::MeshNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.meshes.contains_key(name)
    }

    /// Removes a mesh, returning it.
    pub fn remove(&mut self, name: &str) -> Option<TriangleMesh> {
        self.meshes.remove(name).map(|entry| entry.mesh)
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.meshes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}

/// Cameras sharing a label, drawn with a common helper visibility.
#[derive(Debug)]
struct CameraGroup {
    cameras: Vec<RegisteredCamera>,
    helpers_visible: bool,
}

impl Default for CameraGroup {
    fn default() -> Self {
        Self {
            cameras: Vec::new(),
            helpers_visible: true,
        }
    }
}

/// Identifies one registered camera.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraId {
    pub label: String,
    pub index: usize,
}

/// Registered cameras grouped by label, plus the active camera.
///
/// With no active camera selected the viewer's own main camera is in use.
#[derive(Debug, Default)]
pub struct CameraRegistry {
    groups: BTreeMap<String, CameraGroup>,
    active: Option<CameraId>,
}

impl CameraRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a camera under `label` and returns its id.
    pub fn add(&mut self, label: &str, camera: RegisteredCamera) -> CameraId {
        let group = self.groups.entry(label.to_string()).or_default();
        group.cameras.push(camera);
        CameraId {
            label: label.to_string(),
            index: group.cameras.len() - 1,
        }
    }

    /// Cameras registered under `label`, in insertion order.
    pub fn cameras(&self, label: &str) -> &[RegisteredCamera] {
        self.groups
            .get(label)
            .map(|g| g.cameras.as_slice())
            .unwrap_or_default()
    }

    pub fn get(&self, id: &CameraId) -> Option<&RegisteredCamera> {
        self.groups.get(&id.label)?.cameras.get(id.index)
    }

    /// Known labels, sorted.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Total number of cameras across labels.
    pub fn len(&self) -> usize {
        self.groups.values().map(|g| g.cameras.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(|g| g.cameras.is_empty())
    }

    /// Whether helpers for `label` are drawn; `None` for an unknown label.
    pub fn helpers_visible(&self, label: &str) -> Option<bool> {
        self.groups.get(label).map(|g| g.helpers_visible)
    }

    /// Flips or forces helper visibility for `label` and returns the new state.
    pub fn toggle_helpers(&mut self, label: &str, force: Option<bool>) -> Option<bool> {
        let group = self.groups.get_mut(label)?;
        group.helpers_visible = force.unwrap_or(!group.helpers_visible);
        Some(group.helpers_visible)
    }

    /// Makes a registered camera the active one.
    pub fn switch_to(&mut self, id: CameraId) -> Option<&RegisteredCamera> {
        self.get(&id)?;
        self.active = Some(id);
        self.active_camera()
    }

    /// Goes back to the main camera.
    pub fn reset_to_main(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&CameraId> {
        self.active.as_ref()
    }

    /// The active registered camera, or `None` when the main camera is in use.
    pub fn active_camera(&self) -> Option<&RegisteredCamera> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    /// Drops every camera under `label`, resetting the active camera if it was one of them.
    pub fn remove_label(&mut self, label: &str) -> usize {
        if self.active.as_ref().is_some_and(|id| id.label == label) {
            self.active = None;
        }
        self.groups.remove(label).map_or(0, |g| g.cameras.len())
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.active = None;
    }
}
