//! OctreeNode - a single cell of the loose octree.
//!
//! A node is either a leaf holding entries directly or an internal node with
//! exactly 8 children. Entries that straddle a child boundary stay at the
//! deepest node whose loose bounds fully contain them, which keeps every
//! node's loose bounds a superset of everything stored beneath it.

use glam::Vec3;
use smallvec::SmallVec;

use crate::bounds::Aabb;
use crate::ray::Ray;
use crate::types::OctreeEntry;

/// Entries a node may hold before an insert forces it to subdivide.
///
/// This is a split trigger, not a hard cap: a node whose cell is already at
/// the minimum size keeps accepting entries, and so does a node whose
/// entries straddle its child boundaries.
pub const NODE_CAPACITY: usize = 8;

/// Signed octant directions in child-index order.
///
/// The index packs one bit per axis: X is worth 1 (low side when the entry
/// center is <= the node center), Z is worth 2 (same sense), Y is worth 4
/// with the opposite sense (low bit value on the *high* side).
/// `best_fit_octant` classifies with the matching comparisons, so an index
/// computed there always lands on the cell precomputed here.
const OCTANT_DIRECTIONS: [Vec3; 8] = [
  Vec3::new(-1.0, 1.0, -1.0),
  Vec3::new(1.0, 1.0, -1.0),
  Vec3::new(-1.0, 1.0, 1.0),
  Vec3::new(1.0, 1.0, 1.0),
  Vec3::new(-1.0, -1.0, -1.0),
  Vec3::new(1.0, -1.0, -1.0),
  Vec3::new(-1.0, -1.0, 1.0),
  Vec3::new(1.0, -1.0, 1.0),
];

/// Classify an entry center against a cell center.
///
/// Ties land on the low octant for X and Z (`<=`) and on the high octant for
/// Y (`>=`), so a center exactly on a splitting plane always classifies the
/// same way.
fn best_fit_octant(entry_center: Vec3, node_center: Vec3) -> usize {
  let x = if entry_center.x <= node_center.x { 0 } else { 1 };
  let z = if entry_center.z <= node_center.z { 0 } else { 2 };
  let y = if entry_center.y >= node_center.y { 0 } else { 4 };
  x + y + z
}

/// A single cell of the octree.
///
/// Owns its entries and, once split, exactly 8 children. The cell's loose
/// bounds are its logical `base_length` cube inflated by the tree-wide
/// looseness factor; all containment and intersection tests run against the
/// loose bounds.
pub struct OctreeNode<T> {
  center: Vec3,
  base_length: f32,
  min_size: f32,
  looseness: f32,
  /// Loose bounds actually used for containment and pruning.
  bounds: Aabb,
  /// Loose bounds of the 8 would-be children, precomputed at cell setup so
  /// octant classification never allocates children just to test fit.
  child_bounds: [Aabb; 8],
  entries: SmallVec<[OctreeEntry<T>; NODE_CAPACITY]>,
  children: Option<Box<[OctreeNode<T>; 8]>>,
}

impl<T> OctreeNode<T> {
  /// Create an empty leaf cell.
  pub(crate) fn new(base_length: f32, min_size: f32, looseness: f32, center: Vec3) -> Self {
    let mut node = Self {
      center,
      base_length,
      min_size,
      looseness,
      bounds: Aabb::new(center, Vec3::ZERO),
      child_bounds: [Aabb::new(center, Vec3::ZERO); 8],
      entries: SmallVec::new(),
      children: None,
    };
    node.set_cell(base_length, center);
    node
  }

  /// Re-derive the loose bounds and precomputed child bounds for a new cell
  /// position and size. Entries and children are left alone.
  fn set_cell(&mut self, base_length: f32, center: Vec3) {
    self.base_length = base_length;
    self.center = center;
    self.bounds = Aabb::from_center_size(center, Vec3::splat(base_length * self.looseness));

    let quarter = base_length / 4.0;
    let child_size = Vec3::splat(base_length / 2.0 * self.looseness);
    for (bounds, direction) in self.child_bounds.iter_mut().zip(OCTANT_DIRECTIONS) {
      *bounds = Aabb::from_center_size(center + direction * quarter, child_size);
    }
  }

  /// Loose bounds of this cell.
  #[inline]
  pub fn bounds(&self) -> Aabb {
    self.bounds
  }

  /// Un-loosened edge length of this cell.
  #[inline]
  pub fn base_length(&self) -> f32 {
    self.base_length
  }

  /// Center of this cell.
  #[inline]
  pub fn center(&self) -> Vec3 {
    self.center
  }

  /// Tree-facing insert. Gives the entry back if this node's loose bounds
  /// cannot fully contain it, signalling the tree to grow.
  pub(crate) fn try_insert(&mut self, entry: OctreeEntry<T>) -> Result<(), OctreeEntry<T>> {
    if !self.bounds.contains(&entry.bounds) {
      return Err(entry);
    }
    self.insert_within_bounds(entry);
    Ok(())
  }

  /// Recursive insert. Callers have already verified that the entry fits
  /// inside this node's loose bounds.
  fn insert_within_bounds(&mut self, entry: OctreeEntry<T>) {
    if self.children.is_none() {
      if self.entries.len() < NODE_CAPACITY || self.base_length / 2.0 < self.min_size {
        self.entries.push(entry);
        return;
      }
      self.split();
    }

    let octant = best_fit_octant(entry.bounds.center, self.center);
    match &mut self.children {
      Some(children) if self.child_bounds[octant].contains(&entry.bounds) => {
        children[octant].insert_within_bounds(entry);
      }
      // Straddles a child boundary: it lives at this level.
      _ => self.entries.push(entry),
    }
  }

  /// Allocate 8 children and push down every local entry that fits cleanly
  /// inside one of them. Straddling entries stay at this level.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::split"))]
  fn split(&mut self) {
    let half_length = self.base_length / 2.0;
    let min_size = self.min_size;
    let looseness = self.looseness;
    let child_bounds = &self.child_bounds;
    self.children = Some(Box::new(std::array::from_fn(|octant| {
      OctreeNode::new(half_length, min_size, looseness, child_bounds[octant].center)
    })));

    let entries = std::mem::take(&mut self.entries);
    for entry in entries {
      self.insert_within_bounds(entry);
    }
  }

  /// A node can fold its children back in when they are all leaves and the
  /// combined entry count fits a single node.
  fn should_merge(&self) -> bool {
    let mut total = self.entries.len();
    if let Some(children) = &self.children {
      for child in children.iter() {
        if child.children.is_some() {
          return false;
        }
        total += child.entries.len();
      }
    }
    total <= NODE_CAPACITY
  }

  /// Fold all 8 children back into this node, in child order.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::merge"))]
  fn merge(&mut self) {
    if let Some(children) = self.children.take() {
      for child in *children {
        debug_assert!(child.children.is_none(), "merge requires leaf children");
        self.entries.extend(child.entries);
      }
    }
  }

  /// Collapse this cell one level when all of its content fits a single
  /// octant.
  ///
  /// Invoked on the root after removals. No-op while the cell is already
  /// within a factor of two of `min_length`, or when content spans more
  /// than one octant, or when a local entry fits no single child cleanly.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::shrink"))]
  pub(crate) fn shrink_if_possible(&mut self, min_length: f32) {
    if self.base_length < 2.0 * min_length {
      return;
    }
    if self.entries.is_empty() && self.children.is_none() {
      return;
    }

    // Every local entry must fit cleanly inside the same child cell.
    let mut active: Option<usize> = None;
    for entry in &self.entries {
      let octant = best_fit_octant(entry.bounds.center, self.center);
      if !self.child_bounds[octant].contains(&entry.bounds) {
        return;
      }
      match active {
        None => active = Some(octant),
        Some(current) if current != octant => return,
        Some(_) => {}
      }
    }

    // At most one child may hold anything, and it must be that same cell.
    if let Some(children) = &self.children {
      for (octant, child) in children.iter().enumerate() {
        if !child.has_any_entries() {
          continue;
        }
        match active {
          None => active = Some(octant),
          Some(current) if current != octant => return,
          Some(_) => {}
        }
      }
    }

    let Some(active) = active else {
      return;
    };

    match self.children.take() {
      None => {
        // Leaf: re-center on the occupied octant at half the size.
        let new_center = self.child_bounds[active].center;
        self.set_cell(self.base_length / 2.0, new_center);
      }
      Some(children) => {
        // Promote the sole occupied child: adopt its cell, entries, and
        // children. Local entries already fit its cell.
        let Some(child) = (*children).into_iter().nth(active) else {
          return;
        };
        self.set_cell(child.base_length, child.center);
        self.entries.extend(child.entries);
        self.children = child.children;
      }
    }
  }

  /// Whether anything is stored at this node or beneath it.
  pub(crate) fn has_any_entries(&self) -> bool {
    if !self.entries.is_empty() {
      return true;
    }
    if let Some(children) = &self.children {
      return children.iter().any(|child| child.has_any_entries());
    }
    false
  }

  /// Number of entries stored in this subtree. Walks every node.
  pub(crate) fn entry_count(&self) -> usize {
    let mut count = self.entries.len();
    if let Some(children) = &self.children {
      count += children.iter().map(|child| child.entry_count()).sum::<usize>();
    }
    count
  }

  /// Collect a reference to every entry in this subtree.
  pub(crate) fn collect_entries<'a>(&'a self, out: &mut Vec<&'a OctreeEntry<T>>) {
    out.extend(self.entries.iter());
    if let Some(children) = &self.children {
      for child in children.iter() {
        child.collect_entries(out);
      }
    }
  }

  /// Collect every node's loose bounds, this node first.
  pub(crate) fn collect_node_bounds(&self, out: &mut Vec<Aabb>) {
    out.push(self.bounds);
    if let Some(children) = &self.children {
      for child in children.iter() {
        child.collect_node_bounds(out);
      }
    }
  }

  /// Drain the subtree into a flat list, consuming the node.
  pub(crate) fn into_entries(self) -> Vec<OctreeEntry<T>> {
    let mut out = Vec::new();
    self.drain_into(&mut out);
    out
  }

  fn drain_into(self, out: &mut Vec<OctreeEntry<T>>) {
    out.extend(self.entries);
    if let Some(children) = self.children {
      for child in *children {
        child.drain_into(out);
      }
    }
  }

  /// Whether any entry in this subtree overlaps `bounds`.
  ///
  /// Prunes the whole subtree when this node's loose bounds miss the query
  /// box, and short-circuits on the first hit.
  pub(crate) fn collides(&self, bounds: &Aabb) -> bool {
    if !self.bounds.intersects(bounds) {
      return false;
    }
    if self.entries.iter().any(|entry| entry.bounds.intersects(bounds)) {
      return true;
    }
    if let Some(children) = &self.children {
      return children.iter().any(|child| child.collides(bounds));
    }
    false
  }

  /// Whether any entry in this subtree is hit by `ray` within
  /// `max_distance`.
  pub(crate) fn collides_ray(&self, ray: &Ray, max_distance: f32) -> bool {
    match self.bounds.intersect_ray(ray) {
      Some(distance) if distance <= max_distance => {}
      _ => return false,
    }
    if self
      .entries
      .iter()
      .any(|entry| matches!(entry.bounds.intersect_ray(ray), Some(d) if d <= max_distance))
    {
      return true;
    }
    if let Some(children) = &self.children {
      return children.iter().any(|child| child.collides_ray(ray, max_distance));
    }
    false
  }

  /// Collect the payload of every entry overlapping `bounds`.
  pub(crate) fn query<'a>(&'a self, bounds: &Aabb, out: &mut Vec<&'a T>) {
    if !self.bounds.intersects(bounds) {
      return;
    }
    for entry in &self.entries {
      if entry.bounds.intersects(bounds) {
        out.push(&entry.value);
      }
    }
    if let Some(children) = &self.children {
      for child in children.iter() {
        child.query(bounds, out);
      }
    }
  }

  /// Collect the payload of every entry hit by `ray` within `max_distance`.
  ///
  /// An entry is a hit only when its box intersects the ray *and* the hit
  /// distance is within range.
  pub(crate) fn query_ray<'a>(&'a self, ray: &Ray, max_distance: f32, out: &mut Vec<&'a T>) {
    match self.bounds.intersect_ray(ray) {
      Some(distance) if distance <= max_distance => {}
      _ => return,
    }
    for entry in &self.entries {
      if matches!(entry.bounds.intersect_ray(ray), Some(d) if d <= max_distance) {
        out.push(&entry.value);
      }
    }
    if let Some(children) = &self.children {
      for child in children.iter() {
        child.query_ray(ray, max_distance, out);
      }
    }
  }
}

impl<T: PartialEq> OctreeNode<T> {
  /// Remove the first entry whose payload equals `value`, searching the
  /// whole subtree in child order. Folds children back into this node when
  /// the removal leaves little enough behind.
  pub(crate) fn remove(&mut self, value: &T) -> bool {
    let mut removed = false;
    if let Some(index) = self.entries.iter().position(|entry| entry.value == *value) {
      self.entries.remove(index);
      removed = true;
    } else if let Some(children) = &mut self.children {
      for child in children.iter_mut() {
        if child.remove(value) {
          removed = true;
          break;
        }
      }
    }

    if removed && self.children.is_some() && self.should_merge() {
      self.merge();
    }
    removed
  }

  /// Bounds-guided removal. Only the best-fit child can hold an entry with
  /// these bounds, so the search descends a single path instead of the
  /// whole subtree. Returns `false` without descending when the bounds are
  /// not contained by this node at all.
  pub(crate) fn remove_with_bounds(&mut self, value: &T, bounds: &Aabb) -> bool {
    if !self.bounds.contains(bounds) {
      return false;
    }
    self.sub_remove_with_bounds(value, bounds)
  }

  fn sub_remove_with_bounds(&mut self, value: &T, bounds: &Aabb) -> bool {
    let mut removed = false;
    if let Some(index) = self.entries.iter().position(|entry| entry.value == *value) {
      self.entries.remove(index);
      removed = true;
    } else if let Some(children) = &mut self.children {
      let octant = best_fit_octant(bounds.center, self.center);
      removed = children[octant].sub_remove_with_bounds(value, bounds);
    }

    if removed && self.children.is_some() && self.should_merge() {
      self.merge();
    }
    removed
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
