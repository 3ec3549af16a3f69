use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Leaf node with a 16-unit cell at the origin, tight bounds.
fn node16() -> OctreeNode<i32> {
  OctreeNode::new(16.0, 1.0, 1.0, Vec3::ZERO)
}

fn unit_box(center: Vec3) -> Aabb {
  Aabb::from_center_size(center, Vec3::splat(1.0))
}

fn entry(value: i32, center: Vec3) -> OctreeEntry<i32> {
  OctreeEntry::new(value, unit_box(center))
}

/// Centers of the 8 octant cells of `node16` (quarter = 4).
fn octant_centers() -> [Vec3; 8] {
  std::array::from_fn(|i| OCTANT_DIRECTIONS[i] * 4.0)
}

// =========================================================================
// Octant classification
// =========================================================================

/// The classification must land on the same index the child-bounds table
/// was built with, for every octant.
#[test]
fn test_best_fit_octant_matches_direction_table() {
  for (index, direction) in OCTANT_DIRECTIONS.iter().enumerate() {
    assert_eq!(
      best_fit_octant(*direction, Vec3::ZERO),
      index,
      "direction {:?} should classify as octant {}",
      direction,
      index
    );
  }
}

/// Centers exactly on a splitting plane classify deterministically:
/// low side for X and Z, high side for Y.
#[test]
fn test_octant_tie_break_on_splitting_planes() {
  let p = Vec3::ZERO;

  // All three ties at once resolve to octant 0.
  assert_eq!(best_fit_octant(Vec3::ZERO, p), 0);

  // Single-axis ties keep the other axes' classification.
  assert_eq!(best_fit_octant(Vec3::new(0.0, 1.0, 1.0), p), 2);
  assert_eq!(best_fit_octant(Vec3::new(1.0, 0.0, -1.0), p), 1);
  assert_eq!(best_fit_octant(Vec3::new(0.0, -1.0, 0.0), p), 4);
}

/// Child bounds sit at quarter offsets with half-length loose cells.
#[test]
fn test_child_bounds_layout() {
  let center = Vec3::new(1.0, 2.0, 3.0);
  let node: OctreeNode<i32> = OctreeNode::new(16.0, 1.0, 1.25, center);

  for (index, direction) in OCTANT_DIRECTIONS.iter().enumerate() {
    let child = node.child_bounds[index];
    assert_eq!(child.center, center + *direction * 4.0);
    assert_eq!(child.size(), Vec3::splat(8.0 * 1.25));
  }
}

// =========================================================================
// Insert and split
// =========================================================================

/// A node holds NODE_CAPACITY entries without subdividing.
#[test]
fn test_capacity_fills_without_split() {
  let mut node = node16();
  for (i, center) in octant_centers().into_iter().enumerate() {
    node.try_insert(entry(i as i32, center)).unwrap();
  }

  assert!(node.children.is_none(), "at capacity is not over capacity");
  assert_eq!(node.entries.len(), NODE_CAPACITY);
}

/// The insert that exceeds capacity splits the node and redistributes
/// every entry that fits cleanly into a child.
#[test]
fn test_split_on_overflow() {
  let mut node = node16();
  for (i, center) in octant_centers().into_iter().enumerate() {
    node.try_insert(entry(i as i32, center)).unwrap();
  }
  node.try_insert(entry(8, Vec3::new(5.0, 5.0, 5.0))).unwrap();

  assert!(node.children.is_some(), "overflow must split");
  assert_eq!(node.entry_count(), 9);
  assert!(
    node.entries.is_empty(),
    "all entries fit cleanly in children, none should remain here"
  );
}

/// An entry spanning the splitting planes stays at the parent even when
/// children exist.
#[test]
fn test_straddling_entry_stays_at_parent() {
  let mut node = node16();
  for (i, center) in octant_centers().into_iter().enumerate() {
    node.try_insert(entry(i as i32, center)).unwrap();
  }
  node.try_insert(entry(8, Vec3::new(5.0, 5.0, 5.0))).unwrap();

  let straddler = OctreeEntry::new(99, Aabb::from_center_size(Vec3::ZERO, Vec3::splat(4.0)));
  node.try_insert(straddler).unwrap();

  assert_eq!(node.entries.len(), 1);
  assert_eq!(node.entries[0].value, 99);
}

/// A cell at the minimum size keeps accepting entries instead of splitting.
#[test]
fn test_min_size_blocks_split() {
  let mut node: OctreeNode<i32> = OctreeNode::new(1.5, 1.0, 1.0, Vec3::ZERO);
  for i in 0..20 {
    let center = Vec3::splat(-0.2 + 0.02 * i as f32);
    node
      .try_insert(OctreeEntry::new(i, Aabb::from_center_size(center, Vec3::splat(0.1))))
      .unwrap();
  }

  assert!(node.children.is_none(), "half-size below min_size must not split");
  assert_eq!(node.entries.len(), 20);
}

/// Entries outside the loose bounds come back to the caller untouched.
#[test]
fn test_try_insert_rejects_uncontained() {
  let mut node = node16();
  let rejected = node
    .try_insert(entry(7, Vec3::new(100.0, 0.0, 0.0)))
    .unwrap_err();

  assert_eq!(rejected.value, 7);
  assert_eq!(node.entry_count(), 0);
}

// =========================================================================
// Remove and merge
// =========================================================================

/// Removing below the capacity threshold folds leaf children back in.
#[test]
fn test_remove_merges_children() {
  let mut node = node16();
  for (i, center) in octant_centers().into_iter().enumerate() {
    node.try_insert(entry(i as i32, center)).unwrap();
  }
  node.try_insert(entry(8, Vec3::new(5.0, 5.0, 5.0))).unwrap();
  assert!(node.children.is_some());

  assert!(node.remove(&8));

  assert!(node.children.is_none(), "8 entries across leaf children must merge");
  assert_eq!(node.entries.len(), 8);
}

#[test]
fn test_remove_missing_returns_false() {
  let mut node = node16();
  node.try_insert(entry(1, Vec3::new(4.0, 4.0, 4.0))).unwrap();

  assert!(!node.remove(&2));
  assert_eq!(node.entry_count(), 1);
}

/// A node with grandchildren never merges, whatever the counts say.
#[test]
fn test_should_merge_false_with_grandchildren() {
  let mut node = node16();
  // Nine near-coincident entries cascade: the node splits, everything lands
  // in one child, and that child splits in turn.
  for i in 0..9 {
    let center = Vec3::splat(4.0) + Vec3::splat(0.05 * i as f32);
    node.try_insert(entry(i, center)).unwrap();
  }

  let children = node.children.as_ref().expect("node must have split");
  assert!(
    children[3].children.is_some(),
    "co-located entries must cascade into the octant child"
  );
  assert!(!node.should_merge());
}

/// Bounds-guided removal reaches an entry through its best-fit path and
/// rejects bounds the node does not contain.
#[test]
fn test_remove_with_bounds() {
  let mut node = node16();
  for (i, center) in octant_centers().into_iter().enumerate() {
    node.try_insert(entry(i as i32, center)).unwrap();
  }
  node.try_insert(entry(8, Vec3::new(5.0, 5.0, 5.0))).unwrap();

  assert!(!node.remove_with_bounds(&3, &unit_box(Vec3::new(100.0, 0.0, 0.0))));
  assert!(node.remove_with_bounds(&3, &unit_box(octant_centers()[3])));
  assert_eq!(node.entry_count(), 8);
}

// =========================================================================
// Shrink
// =========================================================================

/// A leaf whose entries all fit one octant re-centers on that octant at
/// half the size.
#[test]
fn test_shrink_leaf_recenters() {
  let mut node = node16();
  node.try_insert(entry(1, Vec3::new(4.0, 4.0, 4.0))).unwrap();
  node.try_insert(entry(2, Vec3::new(6.0, 6.0, 6.0))).unwrap();

  node.shrink_if_possible(4.0);

  assert_eq!(node.base_length(), 8.0);
  assert_eq!(node.center(), Vec3::new(4.0, 4.0, 4.0));
  assert_eq!(node.entry_count(), 2);
}

/// Content in more than one octant blocks the collapse.
#[test]
fn test_shrink_noop_when_spanning_octants() {
  let mut node = node16();
  node.try_insert(entry(1, Vec3::new(4.0, 4.0, 4.0))).unwrap();
  node.try_insert(entry(2, Vec3::new(-4.0, -4.0, -4.0))).unwrap();

  node.shrink_if_possible(4.0);

  assert_eq!(node.base_length(), 16.0);
  assert_eq!(node.center(), Vec3::ZERO);
}

/// The collapse floor: a cell within a factor of two of `min_length` stays.
#[test]
fn test_shrink_noop_below_min_length() {
  let mut node = node16();
  node.try_insert(entry(1, Vec3::new(4.0, 4.0, 4.0))).unwrap();

  node.shrink_if_possible(16.0);

  assert_eq!(node.base_length(), 16.0);
}

/// With children, the sole occupied child is promoted wholesale: its cell,
/// entries, and children.
#[test]
fn test_shrink_promotes_sole_child() {
  let mut node = node16();
  let spread = [
    Vec3::new(2.0, 2.0, 2.0),
    Vec3::new(6.0, 2.0, 2.0),
    Vec3::new(2.0, 6.0, 2.0),
    Vec3::new(6.0, 6.0, 2.0),
    Vec3::new(2.0, 2.0, 6.0),
    Vec3::new(6.0, 2.0, 6.0),
    Vec3::new(2.0, 6.0, 6.0),
    Vec3::new(6.0, 6.0, 6.0),
    Vec3::new(4.0, 4.0, 4.0),
  ];
  for (i, center) in spread.into_iter().enumerate() {
    node.try_insert(entry(i as i32, center)).unwrap();
  }
  assert!(node.children.is_some());

  node.shrink_if_possible(4.0);

  assert_eq!(node.base_length(), 8.0);
  assert_eq!(node.center(), Vec3::new(4.0, 4.0, 4.0));
  assert_eq!(node.entry_count(), 9);
}

// =========================================================================
// Containment invariant
// =========================================================================

fn assert_subtree_contained(node: &OctreeNode<i32>) {
  for entry in &node.entries {
    assert!(
      node.bounds().contains(&entry.bounds),
      "node loose bounds must contain every entry stored in it"
    );
  }
  if let Some(children) = &node.children {
    for child in children.iter() {
      assert!(
        node.bounds().contains(&child.bounds()),
        "node loose bounds must contain each child's loose bounds"
      );
      assert_subtree_contained(child);
    }
  }
}

/// After any randomized insertion sequence, every node's loose bounds
/// contain its entries and its children's bounds, transitively.
#[test]
fn test_containment_invariant_random() {
  let mut rng = StdRng::seed_from_u64(7);
  let mut node: OctreeNode<i32> = OctreeNode::new(64.0, 1.0, 1.25, Vec3::ZERO);

  for i in 0..200 {
    let center = Vec3::new(
      rng.random_range(-20.0..20.0),
      rng.random_range(-20.0..20.0),
      rng.random_range(-20.0..20.0),
    );
    let size = rng.random_range(0.5..4.0);
    node
      .try_insert(OctreeEntry::new(i, Aabb::from_center_size(center, Vec3::splat(size))))
      .unwrap();
  }

  assert_eq!(node.entry_count(), 200);
  assert_subtree_contained(&node);
}
