//! Scene Graph Tests
//!
//! Tests for:
//! - Transform propagation (root identity, composition, multi-level nesting)
//! - Local component round-trips and world decomposition
//! - Pre-order update visitation
//! - Explicit-matrix versus component mode
//! - Hierarchy edits: cycles, reparenting, detaching, subtree removal
//! - Lookup and the textual outline

use glam::{Mat4, Quat, Vec3};

use lantern::errors::LanternError;
use lantern::scene::{NodeHandle, SceneGraph};

const EPSILON: f32 = 1e-5;

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn approx_mat(a: Mat4, b: Mat4) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn child(scene: &mut SceneGraph, parent: NodeHandle, name: &str, t: Vec3) -> NodeHandle {
    let node = scene.create_child(parent, name).unwrap();
    scene.get_node_mut(node).unwrap().set_local_translation(t.x, t.y, t.z);
    node
}

/// Root -> A (1,0,0) -> B (0,2,0)
fn two_level_scene() -> (SceneGraph, NodeHandle, NodeHandle) {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let a = child(&mut scene, root, "A", Vec3::new(1.0, 0.0, 0.0));
    let b = child(&mut scene, a, "B", Vec3::new(0.0, 2.0, 0.0));
    (scene, a, b)
}

// ============================================================================
// Propagation
// ============================================================================

#[test]
fn root_world_is_its_local() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    scene.update(0.016);
    assert_eq!(scene.get_node(root).unwrap().world_matrix(), Mat4::IDENTITY);

    let local = Mat4::from_translation(Vec3::new(3.0, -1.0, 2.0));
    scene.get_node_mut(root).unwrap().set_local_transform(local);
    scene.update(0.016);
    assert_eq!(scene.get_node(root).unwrap().world_matrix(), local);
}

#[test]
fn child_world_is_local_times_parent_world() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let parent = scene.create_child(root, "Parent").unwrap();
    let kid = scene.create_child(parent, "Child").unwrap();
    {
        let p = scene.get_node_mut(parent).unwrap();
        p.set_local_rotation(30.0, 10.0, -20.0);
        p.set_local_translation(1.0, 2.0, 3.0);
        p.set_local_scale(2.0, 2.0, 2.0);
    }
    {
        let c = scene.get_node_mut(kid).unwrap();
        c.set_local_rotation(-45.0, 0.0, 15.0);
        c.set_local_translation(0.5, 0.0, -1.0);
    }
    scene.update(0.0);

    let p = scene.get_node(parent).unwrap();
    let c = scene.get_node(kid).unwrap();
    assert!(approx_mat(c.world_matrix(), c.local_matrix() * p.world_matrix()));
}

#[test]
fn world_composes_over_three_levels() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    scene
        .get_node_mut(root)
        .unwrap()
        .set_local_transform(Mat4::from_rotation_y(0.3) * Mat4::from_translation(Vec3::X));

    let a = child(&mut scene, root, "A", Vec3::new(0.0, 1.0, 0.0));
    let b = child(&mut scene, a, "B", Vec3::new(0.0, 0.0, 2.0));
    let c = child(&mut scene, b, "C", Vec3::new(-1.0, 0.0, 0.0));
    scene.get_node_mut(b).unwrap().set_local_rotation(90.0, 0.0, 0.0);
    scene.get_node_mut(c).unwrap().set_local_scale(0.5, 1.0, 2.0);
    scene.update(0.0);

    let local = |h| scene.get_node(h).unwrap().local_matrix();
    let expected = local(c) * local(b) * local(a) * scene.get_node(root).unwrap().world_matrix();
    assert!(approx_mat(scene.get_node(c).unwrap().world_matrix(), expected));
}

#[test]
fn moved_parent_is_picked_up_by_next_update() {
    let (mut scene, a, b) = two_level_scene();
    scene.update(0.016);
    let world = scene.get_node(b).unwrap().world_matrix();
    assert!(approx_vec(world.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 0.0)));

    // Shift A by (0, 0, 5).
    scene.get_node_mut(a).unwrap().set_local_translation(1.0, 0.0, 5.0);
    scene.update(0.016);
    assert!(approx_vec(
        scene.get_node(b).unwrap().world_translation(),
        Vec3::new(1.0, 2.0, 5.0)
    ));
}

#[test]
fn repeated_updates_are_bit_identical() {
    let (mut scene, a, b) = two_level_scene();
    scene.get_node_mut(a).unwrap().set_local_rotation(33.0, 12.5, -7.0);
    scene.update(0.016);
    let first: Vec<Mat4> = [a, b].iter().map(|&h| scene.get_node(h).unwrap().world_matrix()).collect();
    scene.update(0.016);
    let second: Vec<Mat4> = [a, b].iter().map(|&h| scene.get_node(h).unwrap().world_matrix()).collect();
    assert_eq!(first, second);
}

#[test]
fn update_does_not_depend_on_dt() {
    let (mut scene, _, b) = two_level_scene();
    scene.update(0.0);
    let first = scene.get_node(b).unwrap().world_matrix();
    scene.update(10.0);
    assert_eq!(scene.get_node(b).unwrap().world_matrix(), first);
}

// ============================================================================
// Components and decomposition
// ============================================================================

#[test]
fn local_components_round_trip_before_and_after_update() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let node = scene.create_child(root, "Node").unwrap();

    let n = scene.get_node_mut(node).unwrap();
    n.set_local_translation(1.25, -3.5, 7.0);
    n.set_local_rotation(10.0, 20.0, 30.0);
    n.set_local_scale(1.0, 2.0, 3.0);
    assert_eq!(n.local_translation(), Vec3::new(1.25, -3.5, 7.0));

    scene.update(0.0);
    let n = scene.get_node(node).unwrap();
    assert_eq!(n.local_translation(), Vec3::new(1.25, -3.5, 7.0));
    assert_eq!(n.local_rotation(), Vec3::new(10.0, 20.0, 30.0));
    assert_eq!(n.local_scale(), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn cached_world_parts_match_fresh_decomposition() {
    let (mut scene, a, b) = two_level_scene();
    {
        let n = scene.get_node_mut(a).unwrap();
        n.set_local_rotation(45.0, 30.0, 0.0);
        n.set_local_scale(2.0, 2.0, 2.0);
    }
    scene.update(0.0);

    let node = scene.get_node(b).unwrap();
    let (scale, rotation, translation) = node.world_matrix().to_scale_rotation_translation();
    assert!(approx_vec(node.world_translation(), translation));
    assert!(approx_vec(node.world_scale(), scale));
    assert!(node.world_rotation().abs_diff_eq(rotation, EPSILON));
}

#[test]
fn light_node_exposes_world_position_through_parent() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let pivot = child(&mut scene, root, "Pivot", Vec3::new(0.0, 1.0, 0.0));
    scene.get_node_mut(pivot).unwrap().set_local_rotation(0.0, 90.0, 0.0);
    let light = child(&mut scene, pivot, "Light", Vec3::new(0.0, 0.0, 2.0));
    scene.update(0.0);

    // The parent's turn does not swing the child's offset around.
    assert!(approx_vec(
        scene.get_node(light).unwrap().world_translation(),
        Vec3::new(0.0, 1.0, 2.0)
    ));
    assert!(scene
        .get_node(light)
        .unwrap()
        .world_rotation()
        .abs_diff_eq(Quat::from_rotation_y(90f32.to_radians()), EPSILON));
}

#[test]
fn rotated_parent_matrix_leaves_child_offset_in_place() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let parent = scene.create_child(root, "Parent").unwrap();
    scene
        .get_node_mut(parent)
        .unwrap()
        .set_local_transform(Mat4::from_rotation_y(90f32.to_radians()));
    let kid = child(&mut scene, parent, "Child", Vec3::new(0.0, 0.0, 2.0));
    scene.update(0.0);

    let c = scene.get_node(kid).unwrap();
    assert!(approx_vec(c.world_translation(), Vec3::new(0.0, 0.0, 2.0)));
    let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)) * Mat4::from_rotation_y(90f32.to_radians());
    assert!(approx_mat(c.world_matrix(), expected));
}

#[test]
fn scaled_parent_does_not_scale_child_offset() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let parent = child(&mut scene, root, "Parent", Vec3::new(1.0, 0.0, 0.0));
    scene.get_node_mut(parent).unwrap().set_local_scale(3.0, 3.0, 3.0);
    let kid = child(&mut scene, parent, "Child", Vec3::new(0.0, 1.0, 0.0));
    scene.update(0.0);

    let c = scene.get_node(kid).unwrap();
    assert!(approx_vec(c.world_translation(), Vec3::new(1.0, 1.0, 0.0)));
    assert!(approx_vec(c.world_scale(), Vec3::splat(3.0)));
}

#[test]
fn last_setter_wins_between_matrix_and_components() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let node = child(&mut scene, root, "Node", Vec3::new(1.0, 0.0, 0.0));

    let explicit = Mat4::from_translation(Vec3::new(0.0, 9.0, 0.0));
    scene.get_node_mut(node).unwrap().set_local_transform(explicit);
    scene.update(0.0);
    assert!(approx_vec(scene.get_node(node).unwrap().world_translation(), Vec3::new(0.0, 9.0, 0.0)));

    scene.get_node_mut(node).unwrap().set_local_translation(2.0, 0.0, 0.0);
    scene.update(0.0);
    assert!(approx_vec(scene.get_node(node).unwrap().world_translation(), Vec3::new(2.0, 0.0, 0.0)));
}

// ============================================================================
// Traversal order
// ============================================================================

#[test]
fn update_visits_parents_before_children_in_insertion_order() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let a = scene.create_child(root, "A").unwrap();
    let a1 = scene.create_child(a, "A1").unwrap();
    let a2 = scene.create_child(a, "A2").unwrap();
    let b = scene.create_child(root, "B").unwrap();
    let b1 = scene.create_child(b, "B1").unwrap();

    let mut visited = Vec::new();
    scene.update_with(0.0, |handle, _| visited.push(handle));
    assert_eq!(visited, vec![root, a, a1, a2, b, b1]);
    assert_eq!(scene.pre_order(), visited);
}

#[test]
fn detached_nodes_are_not_updated() {
    let mut scene = SceneGraph::new();
    let loose = scene.create_node("Loose");
    scene.get_node_mut(loose).unwrap().set_local_translation(4.0, 0.0, 0.0);
    scene.update(0.0);
    assert_eq!(scene.get_node(loose).unwrap().world_translation(), Vec3::ZERO);
    assert!(!scene.pre_order().contains(&loose));
}

// ============================================================================
// Hierarchy edits
// ============================================================================

#[test]
fn cycles_are_refused() {
    let (mut scene, a, b) = two_level_scene();
    assert!(matches!(scene.add_child(b, a), Err(LanternError::HierarchyCycle { .. })));
    assert!(matches!(scene.add_child(a, a), Err(LanternError::HierarchyCycle { .. })));
    assert!(matches!(
        scene.add_child(a, scene.root()),
        Err(LanternError::RootModification)
    ));
    assert_eq!(scene.parent(b), Some(a));
}

#[test]
fn reparenting_moves_node_and_its_world_transform() {
    let (mut scene, a, b) = two_level_scene();
    let root = scene.root();
    let other = child(&mut scene, root, "Other", Vec3::new(0.0, 0.0, -3.0));

    scene.add_child(other, b).unwrap();
    assert_eq!(scene.parent(b), Some(other));
    assert!(scene.children(a).is_empty());
    assert_eq!(scene.children(other), &[b]);

    scene.update(0.0);
    assert!(approx_vec(scene.get_node(b).unwrap().world_translation(), Vec3::new(0.0, 2.0, -3.0)));
}

#[test]
fn adding_existing_child_again_keeps_single_link() {
    let (mut scene, a, b) = two_level_scene();
    scene.add_child(a, b).unwrap();
    assert_eq!(scene.children(a), &[b]);
}

#[test]
fn remove_node_drops_whole_subtree() {
    let (mut scene, a, b) = two_level_scene();
    let root = scene.root();
    let c = scene.create_child(b, "C").unwrap();
    assert_eq!(scene.len(), 4);

    assert_eq!(scene.remove_node(a).unwrap(), 3);
    assert_eq!(scene.len(), 1);
    for h in [a, b, c] {
        assert!(scene.get_node(h).is_none());
    }
    assert!(scene.children(root).is_empty());
    assert!(matches!(scene.remove_node(root), Err(LanternError::RootModification)));
    assert!(matches!(scene.remove_node(a), Err(LanternError::NodeNotFound(_))));
}

#[test]
fn detach_keeps_subtree_alive() {
    let (mut scene, a, b) = two_level_scene();
    scene.detach(a).unwrap();
    assert_eq!(scene.parent(a), None);
    assert_eq!(scene.parent(b), Some(a));
    assert_eq!(scene.pre_order(), vec![scene.root()]);
    assert_eq!(scene.len(), 3);
}

#[test]
fn stale_handles_are_rejected() {
    let (mut scene, a, _) = two_level_scene();
    scene.remove_node(a).unwrap();
    assert!(matches!(scene.create_child(a, "X"), Err(LanternError::NodeNotFound(_))));
    assert!(scene.children(a).is_empty());
}

// ============================================================================
// Lookup and outline
// ============================================================================

#[test]
fn find_by_name_returns_first_in_pre_order() {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let first = scene.create_child(root, "Twin").unwrap();
    let _second = scene.create_child(root, "Twin").unwrap();
    assert_eq!(scene.find_by_name("Twin"), Some(first));
    assert_eq!(scene.find_by_name("Root"), Some(root));
    assert_eq!(scene.find_by_name("Missing"), None);
}

#[test]
fn outline_indents_by_depth() {
    let (mut scene, _, _) = two_level_scene();
    scene.update(0.0);
    let outline = scene.outline();
    let lines: Vec<&str> = outline.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Root "));
    assert!(lines[1].starts_with("  A "));
    assert!(lines[2].starts_with("    B "));
    assert!(lines[2].contains("world=(1.000, 2.000, 0.000)"));
}
