//! Integration tests for the selection engine.
//!
//! The scene is a flat `8 x 8` grid of quads in the XY plane viewed straight
//! down the Z axis by an orthographic camera, so NDC is simply
//! `((x - 4) / 4, (y - 4) / 4)`. Perspective tests use an uneven terrain
//! with the camera standing inside its bounds.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Quat, Vec2, Vec3};
use proptest::prelude::*;
use splatview_core::{Bvh, SelectionMode, SelectionOptions, SplatviewError, TriangleMesh};
use splatview_selection::*;

const N: u32 = 8;

fn grid_positions(n: u32, z: f32, offset: Vec2, cell: f32) -> (Vec<Vec3>, Vec<u32>) {
    let mut positions = Vec::new();
    for y in 0..=n {
        for x in 0..=n {
            positions.push(Vec3::new(
                offset.x + x as f32 * cell,
                offset.y + y as f32 * cell,
                z,
            ));
        }
    }
    let mut indices = Vec::new();
    for y in 0..n {
        for x in 0..n {
            let i = y * (n + 1) + x;
            indices.extend_from_slice(&[i, i + 1, i + n + 2, i, i + n + 2, i + n + 1]);
        }
    }
    (positions, indices)
}

fn grid() -> TriangleMesh {
    let (positions, indices) = grid_positions(N, 0.0, Vec2::ZERO, 1.0);
    TriangleMesh::new(positions, Some(indices)).unwrap()
}

/// The grid plus a single quad floating over `[2, 6]^2` at `z = 1`.
fn grid_with_occluder() -> TriangleMesh {
    let (mut positions, mut indices) = grid_positions(N, 0.0, Vec2::ZERO, 1.0);
    let base = positions.len() as u32;
    let (lid, lid_indices) = grid_positions(1, 1.0, Vec2::splat(2.0), 4.0);
    positions.extend(lid);
    indices.extend(lid_indices.iter().map(|i| i + base));
    TriangleMesh::new(positions, Some(indices)).unwrap()
}

/// A wavy `24 x 24` terrain in the XZ plane with a roof quad over `[-4, 4]^2` at `y = 2`.
fn terrain_with_roof() -> TriangleMesh {
    let n = 24;
    let (mut positions, mut indices) = grid_positions(n, 0.0, Vec2::splat(-12.0), 1.0);
    for p in &mut positions {
        let (x, z) = (p.x, p.y);
        *p = Vec3::new(x, 0.4 * (x * 0.7).sin() * (z * 0.5).cos(), z);
    }
    let base = positions.len() as u32;
    let (roof, roof_indices) = grid_positions(2, 0.0, Vec2::splat(-4.0), 4.0);
    positions.extend(roof.into_iter().map(|p| Vec3::new(p.x, 2.0, p.y)));
    indices.extend(roof_indices.iter().map(|i| i + base));
    TriangleMesh::new(positions, Some(indices)).unwrap()
}

fn compare_paths(
    mesh: &TriangleMesh,
    camera: &CameraMatrices,
    region: &SelectionRegion,
    options: SelectionOptions,
) -> (Vec<u32>, Vec<u32>) {
    let bvh = Bvh::build(mesh).unwrap();
    let fast = select(mesh, &bvh, camera, region, &options).unwrap();
    let slow = select(mesh, &bvh, camera, region, &options.with_bounds_tree(false)).unwrap();
    (sorted(fast), sorted(slow))
}

fn camera() -> CameraMatrices {
    CameraMatrices::new(
        Mat4::look_at_rh(Vec3::new(4.0, 4.0, 10.0), Vec3::new(4.0, 4.0, 0.0), Vec3::Y),
        Mat4::orthographic_rh_gl(-4.0, 4.0, -4.0, 4.0, 0.1, 100.0),
    )
}

fn ndc(x: f32, y: f32) -> Vec2 {
    Vec2::new((x - 4.0) / 4.0, (y - 4.0) / 4.0)
}

fn sorted(mut v: Vec<u32>) -> Vec<u32> {
    v.sort_unstable();
    v
}

fn run(mesh: &TriangleMesh, region: &SelectionRegion, options: SelectionOptions) -> Vec<u32> {
    let bvh = Bvh::build(mesh).unwrap();
    select(mesh, &bvh, &camera(), region, &options).unwrap()
}

#[test]
fn test_full_screen_box_selects_everything() {
    let mesh = grid();
    let region = SelectionRegion::box_2d(Vec2::splat(-1.1), Vec2::splat(1.1));
    let result = run(&mesh, &region, SelectionOptions::default());
    assert_eq!(result.len(), mesh.num_triangles() * 3);
    assert_eq!(sorted(result), (0..mesh.num_triangles() as u32 * 3).collect::<Vec<_>>());
}

#[test]
fn test_lasso_inside_and_outside() {
    let mesh = grid();
    // Small convex lasso around the cell at (1, 1)
    let region = SelectionRegion::lasso(vec![
        ndc(0.9, 0.9),
        ndc(2.1, 0.9),
        ndc(2.1, 2.1),
        ndc(0.9, 2.1),
    ]);
    let result = run(&mesh, &region, SelectionOptions::default());
    let triangles: Vec<u32> = result.chunks_exact(3).map(|t| t[0] / 3).collect();

    // Cell (1, 1) holds triangles 18 and 19; it is wholly inside the lasso
    assert!(triangles.contains(&18));
    assert!(triangles.contains(&19));
    // Far corner cell is wholly outside
    let far = (N * N * 2) - 1;
    assert!(!triangles.contains(&far));
    // Only the cell and its touched neighbours are picked up
    assert!(triangles.len() < 20);
}

#[test]
fn test_centroid_mode_is_stricter_than_intersection() {
    let mesh = grid();
    let region = SelectionRegion::box_2d(ndc(0.9, 0.9), ndc(3.1, 3.1));
    let centroid = run(
        &mesh,
        &region,
        SelectionOptions::default().with_mode(SelectionMode::Centroid),
    );
    let intersection = run(&mesh, &region, SelectionOptions::default());

    // Centroid mode keeps exactly the 2x2 cells inside; intersection also keeps the ring around them
    assert_eq!(centroid.len() / 3, 8);
    assert!(intersection.len() > centroid.len());
    for t in centroid.chunks_exact(3) {
        assert!(intersection.contains(&t[0]));
    }
}

#[test]
fn test_box_2d_from_pixels() {
    let mesh = grid();
    // Upper half of an 800x800 overlay covers world y in [4, 8]
    let a = ndc_from_pixels(Vec2::new(-10.0, -10.0), 800.0, 800.0);
    let b = ndc_from_pixels(Vec2::new(810.0, 399.0), 800.0, 800.0);
    let result = run(
        &mesh,
        &SelectionRegion::box_2d(a, b),
        SelectionOptions::default().with_mode(SelectionMode::Centroid),
    );
    assert_eq!(result.len() / 3, (N * N) as usize);
}

#[test]
fn test_select_whole_model_stops_on_first_hit() {
    let mesh = grid();
    let region = SelectionRegion::box_2d(Vec2::splat(-1.1), Vec2::splat(1.1));
    let result = run(
        &mesh,
        &region,
        SelectionOptions::default().with_select_whole_model(true),
    );
    assert_eq!(result.len(), 3);
}

#[test]
fn test_degenerate_lasso_selects_nothing() {
    let mesh = grid();
    let region = SelectionRegion::lasso(vec![ndc(0.0, 0.0), ndc(8.0, 8.0)]);
    assert!(run(&mesh, &region, SelectionOptions::default()).is_empty());
}

#[test]
fn test_mesh_without_indices_is_rejected() {
    let indexed = grid();
    let bvh = Bvh::build(&indexed).unwrap();
    let bare = TriangleMesh::new(indexed.positions().to_vec(), None).unwrap();
    let region = SelectionRegion::box_2d(Vec2::splat(-1.0), Vec2::splat(1.0));
    let err = select(&bare, &bvh, &camera(), &region, &SelectionOptions::default()).unwrap_err();
    assert!(matches!(err, SplatviewError::InvalidGeometry(_)));
    assert!(matches!(Bvh::build(&bare), Err(SplatviewError::InvalidGeometry(_))));
}

#[test]
fn test_centroid_visible_rejects_occluded_triangles() {
    let mesh = grid_with_occluder();
    let region = SelectionRegion::box_2d(Vec2::splat(-1.1), Vec2::splat(1.1));

    let all = run(
        &mesh,
        &region,
        SelectionOptions::default().with_mode(SelectionMode::Centroid),
    );
    assert_eq!(all.len() / 3, 130);

    let visible = run(
        &mesh,
        &region,
        SelectionOptions::default().with_mode(SelectionMode::CentroidVisible),
    );
    // The 4x4 cells under the lid hide 32 grid triangles
    assert_eq!(visible.len() / 3, 98);
    // The lid itself stays visible
    assert!(visible.contains(&(128 * 3)));
    assert!(visible.contains(&(129 * 3)));
}

#[test]
fn test_box_3d_enclosing_selects_everything() {
    let mesh = grid().with_world_matrix(Mat4::from_rotation_x(0.4));
    let bvh = Bvh::build(&mesh).unwrap();
    let box_world = Mat4::from_scale_rotation_translation(
        Vec3::splat(30.0),
        Quat::from_rotation_z(0.3),
        Vec3::new(4.0, 4.0, 0.0),
    );
    let result = select(
        &mesh,
        &bvh,
        &camera(),
        &SelectionRegion::box_3d(box_world),
        &SelectionOptions::default(),
    )
    .unwrap();
    assert_eq!(result.len(), mesh.num_triangles() * 3);
}

#[test]
fn test_box_3d_without_overlap_skips_traversal() {
    let mesh = grid();
    let bvh = Bvh::build(&mesh).unwrap();
    let box_world = Mat4::from_translation(Vec3::new(100.0, 100.0, 100.0));
    assert!(!fast_box_hits_mesh(&mesh, &bvh, &box_world));

    let mut scratch = SelectionScratch::new();
    let result = select_with_scratch(
        &mesh,
        &bvh,
        &camera(),
        &SelectionRegion::box_3d(box_world),
        &SelectionOptions::default(),
        &mut scratch,
    )
    .unwrap();
    assert!(result.is_empty());
    assert!(scratch.stats().is_untouched());
}

#[test]
fn test_box_3d_partial_overlap() {
    let mesh = grid();
    let bvh = Bvh::build(&mesh).unwrap();
    // Unit cube scaled to cover x, y in [0.1, 1.9] around the plane
    let box_world = Mat4::from_scale_rotation_translation(
        Vec3::new(1.8, 1.8, 1.0),
        Quat::IDENTITY,
        Vec3::new(1.0, 1.0, 0.0),
    );
    assert!(fast_box_hits_mesh(&mesh, &bvh, &box_world));

    let touching = sorted(
        compute_box_selected_triangles(
            &mesh,
            &bvh,
            &box_world,
            &SelectionOptions::default(),
            &mut SelectionScratch::new(),
        )
        .unwrap(),
    );
    // The box overlaps the 2x2 cells at the origin: 8 triangles
    assert_eq!(touching.len() / 3, 8);

    let brute = sorted(
        compute_box_selected_triangles(
            &mesh,
            &bvh,
            &box_world,
            &SelectionOptions::default().with_bounds_tree(false),
            &mut SelectionScratch::new(),
        )
        .unwrap(),
    );
    assert_eq!(touching, brute);
}

#[test]
fn test_flat_box_selects_nothing() {
    let mesh = grid();
    let bvh = Bvh::build(&mesh).unwrap();
    let flat = Mat4::from_scale(Vec3::new(10.0, 10.0, 0.0));
    let result = compute_box_selected_triangles(
        &mesh,
        &bvh,
        &flat,
        &SelectionOptions::default(),
        &mut SelectionScratch::new(),
    )
    .unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_scratch_reuse_gives_same_answer() {
    let mesh = grid();
    let bvh = Bvh::build(&mesh).unwrap();
    let cam = camera();
    let options = SelectionOptions::default();
    let mut scratch = SelectionScratch::new();

    let wide = SelectionRegion::box_2d(Vec2::splat(-0.9), Vec2::splat(0.9));
    let narrow = SelectionRegion::lasso(vec![ndc(3.5, 3.5), ndc(4.5, 3.5), ndc(4.0, 4.5)]);

    let first = select_with_scratch(&mesh, &bvh, &cam, &narrow, &options, &mut scratch).unwrap();
    select_with_scratch(&mesh, &bvh, &cam, &wide, &options, &mut scratch).unwrap();
    let again = select_with_scratch(&mesh, &bvh, &cam, &narrow, &options, &mut scratch).unwrap();
    assert_eq!(sorted(first), sorted(again));
    assert!(scratch.stats().nodes_visited > 0);
}

#[test]
fn test_perspective_camera_standing_on_floor() {
    // 40x40 floor at y = 0, rotated out of the XY plane by its world matrix
    let (positions, indices) = grid_positions(40, 0.0, Vec2::splat(-20.0), 1.0);
    let mesh = TriangleMesh::new(positions, Some(indices))
        .unwrap()
        .with_world_matrix(Mat4::from_rotation_x(-FRAC_PI_2));
    let camera = CameraMatrices::look_at(
        Vec3::new(0.0, 1.7, 0.0),
        Vec3::new(0.0, 0.0, -5.0),
        Vec3::Y,
        1.0,
        1.5,
        0.1,
        100.0,
    );
    let regions = [
        SelectionRegion::box_2d(Vec2::new(-0.2, -0.6), Vec2::new(0.2, -0.2)),
        SelectionRegion::lasso(vec![
            Vec2::new(-0.1, -0.5),
            Vec2::new(0.1, -0.5),
            Vec2::new(0.0, -0.3),
        ]),
        SelectionRegion::box_2d(Vec2::splat(-1.1), Vec2::splat(1.1)),
    ];

    for region in &regions {
        for mode in [SelectionMode::Intersection, SelectionMode::Centroid] {
            let options = SelectionOptions::default().with_mode(mode);
            let (fast, slow) = compare_paths(&mesh, &camera, region, options);
            assert!(!slow.is_empty(), "{mode:?} selected nothing");
            assert_eq!(fast, slow, "{mode:?}");
        }
    }

    // Only the floor in front of the camera can be picked
    let everything = SelectionRegion::box_2d(Vec2::splat(-1.1), Vec2::splat(1.1));
    let (in_view, _) = compare_paths(
        &mesh,
        &camera,
        &everything,
        SelectionOptions::default().with_mode(SelectionMode::Centroid),
    );
    assert!(in_view.len() < mesh.num_triangles() * 3);
}

#[test]
fn test_perspective_geometry_behind_camera_is_ignored() {
    let mesh = grid();
    // Looking away from the grid, which lies entirely behind the eye
    let camera = CameraMatrices::look_at(
        Vec3::new(4.0, 4.0, 2.0),
        Vec3::new(4.0, 4.0, 10.0),
        Vec3::Y,
        1.0,
        1.0,
        0.1,
        100.0,
    );
    let everything = SelectionRegion::box_2d(Vec2::splat(-1.1), Vec2::splat(1.1));
    for mode in [SelectionMode::Intersection, SelectionMode::Centroid] {
        let options = SelectionOptions::default().with_mode(mode);
        let (fast, slow) = compare_paths(&mesh, &camera, &everything, options);
        assert!(fast.is_empty());
        assert!(slow.is_empty());
    }
}

fn mode_strategy() -> impl Strategy<Value = SelectionMode> {
    prop_oneof![
        Just(SelectionMode::Centroid),
        Just(SelectionMode::CentroidVisible),
        Just(SelectionMode::Intersection),
    ]
}

proptest! {
    #[test]
    fn bvh_matches_brute_force(
        points in prop::collection::vec((-1.3f32..1.3, -1.3f32..1.3), 3..9),
        mode in mode_strategy(),
    ) {
        let mesh = grid_with_occluder();
        let region = SelectionRegion::lasso(points.into_iter().map(Vec2::from).collect());
        let options = SelectionOptions::default().with_mode(mode);

        let fast = sorted(run(&mesh, &region, options));
        let slow = sorted(run(&mesh, &region, options.with_bounds_tree(false)));
        prop_assert_eq!(fast, slow);
    }

    #[test]
    fn box_3d_bvh_matches_brute_force(
        center in (-2.0f32..10.0, -2.0f32..10.0, -1.0f32..1.0),
        size in (0.2f32..6.0, 0.2f32..6.0, 0.2f32..3.0),
        angle in 0.0f32..3.1,
    ) {
        let mesh = grid();
        let bvh = Bvh::build(&mesh).unwrap();
        let box_world = Mat4::from_scale_rotation_translation(
            Vec3::from(size),
            Quat::from_rotation_z(angle),
            Vec3::from(center),
        );
        let options = SelectionOptions::default();
        let fast = sorted(compute_box_selected_triangles(
            &mesh, &bvh, &box_world, &options, &mut SelectionScratch::new()).unwrap());
        let slow = sorted(compute_box_selected_triangles(
            &mesh, &bvh, &box_world, &options.with_bounds_tree(false), &mut SelectionScratch::new()).unwrap());
        if !fast_box_hits_mesh(&mesh, &bvh, &box_world) {
            prop_assert!(fast.is_empty());
        }
        prop_assert_eq!(fast, slow);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn perspective_bvh_matches_brute_force(
        eye in (-10.0f32..10.0, 0.3f32..1.8, -10.0f32..10.0),
        yaw in 0.0f32..TAU,
        pitch in -0.8f32..0.3,
        points in prop::collection::vec((-1.3f32..1.3, -1.3f32..1.3), 3..9),
        mode in mode_strategy(),
    ) {
        let mesh = terrain_with_roof();
        let eye = Vec3::from(eye);
        let forward = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        let camera = CameraMatrices::look_at(eye, eye + forward, Vec3::Y, 1.0, 1.5, 0.05, 100.0);
        let region = SelectionRegion::lasso(points.into_iter().map(Vec2::from).collect());

        let (fast, slow) = compare_paths(
            &mesh,
            &camera,
            &region,
            SelectionOptions::default().with_mode(mode),
        );
        prop_assert_eq!(fast, slow);
    }
}
