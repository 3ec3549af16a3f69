//! Octree - the public container around the recursive node tree.
//!
//! All per-cell work happens in [`OctreeNode`]; this type owns the root and
//! the two policies that only make sense tree-wide: growing by replacing the
//! root when an entry lands outside it, and shrinking the root back down
//! after removals.

use glam::Vec3;

use crate::bounds::Aabb;
use crate::config::OctreeConfig;
use crate::error::OctreeError;
use crate::node::OctreeNode;
use crate::ray::Ray;
use crate::types::OctreeEntry;

/// Growth attempts allowed per insertion before giving up.
///
/// Every growth doubles the root edge length, so 20 doublings scale the
/// world by roughly a million; only degenerate bounds (NaN or infinite
/// coordinates) fail to land within that.
pub const MAX_GROW_ATTEMPTS: usize = 20;

/// A dynamically resizable loose octree.
///
/// Entries are payloads paired with an axis-aligned box. The tree answers
/// overlap and ray queries in sub-linear time, subdividing cells as they
/// fill up and re-rooting itself when an entry falls outside the current
/// extent, so callers never pre-declare world bounds.
///
/// A single instance must not be mutated from multiple threads; concurrent
/// read-only queries are safe only while no insert or removal is in flight.
pub struct Octree<T> {
  root: OctreeNode<T>,
  config: OctreeConfig,
}

impl<T> Octree<T> {
  /// Create an empty tree from a validated configuration.
  ///
  /// Looseness below 1.0 would let entries escape their cell's loose
  /// bounds, so it is clamped up to 1.0 here.
  pub fn new(config: OctreeConfig) -> Result<Self, OctreeError> {
    config.validate()?;
    let mut config = config;
    config.looseness = config.looseness.max(1.0);

    let root = OctreeNode::new(
      config.initial_size,
      config.min_node_size,
      config.looseness,
      config.origin,
    );
    Ok(Self { root, config })
  }

  /// The configuration the tree was built with.
  #[inline]
  pub fn config(&self) -> &OctreeConfig {
    &self.config
  }

  /// Insert a payload with its bounds.
  ///
  /// Grows the tree toward the entry when it falls outside the current
  /// root, re-homing everything the old root held. Fails only for bounds
  /// the tree cannot grow around within [`MAX_GROW_ATTEMPTS`] doublings.
  pub fn insert(&mut self, value: T, bounds: Aabb) -> Result<(), OctreeError> {
    let mut entry = OctreeEntry::new(value, bounds);
    let mut attempts = 0;
    loop {
      match self.root.try_insert(entry) {
        Ok(()) => return Ok(()),
        Err(rejected) => {
          if attempts >= MAX_GROW_ATTEMPTS {
            return Err(OctreeError::GrowthExhausted { attempts });
          }
          entry = rejected;
          self.grow(entry.bounds.center);
          attempts += 1;
        }
      }
    }
  }

  /// Replace the root with one double the size, shifted toward `toward`,
  /// and re-insert everything the old root held.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::grow"))]
  fn grow(&mut self, toward: Vec3) {
    let offset = toward - self.root.center();
    let half = self.root.base_length() / 2.0;
    let step = Vec3::new(
      if offset.x >= 0.0 { half } else { -half },
      if offset.y >= 0.0 { half } else { -half },
      if offset.z >= 0.0 { half } else { -half },
    );

    let new_root = OctreeNode::new(
      self.root.base_length() * 2.0,
      self.config.min_node_size,
      self.config.looseness,
      self.root.center() + step,
    );

    #[cfg(feature = "tracing")]
    tracing::trace!(base_length = new_root.base_length(), "growing octree root");

    let old_root = std::mem::replace(&mut self.root, new_root);
    for entry in old_root.into_entries() {
      // The doubled loose cell covers the old root's loose cell, so nothing
      // the old root held can be rejected here.
      let _ = self.root.try_insert(entry);
    }
  }

  /// Payloads of every entry overlapping `bounds`.
  pub fn query(&self, bounds: &Aabb) -> Vec<&T> {
    let mut out = Vec::new();
    self.root.query(bounds, &mut out);
    out
  }

  /// Payloads of every entry hit by `ray` within `max_distance`.
  ///
  /// An entry is a hit only when its box intersects the ray *and* the hit
  /// distance is within `max_distance`.
  pub fn query_ray(&self, ray: &Ray, max_distance: f32) -> Vec<&T> {
    let mut out = Vec::new();
    self.root.query_ray(ray, max_distance, &mut out);
    out
  }

  /// Whether any entry overlaps `bounds`.
  pub fn collides(&self, bounds: &Aabb) -> bool {
    self.root.collides(bounds)
  }

  /// Whether any entry is hit by `ray` within `max_distance`.
  pub fn collides_ray(&self, ray: &Ray, max_distance: f32) -> bool {
    self.root.collides_ray(ray, max_distance)
  }

  /// Number of stored entries.
  ///
  /// Recomputed by walking the whole tree on every call; callers that need
  /// it per frame should cache it externally.
  pub fn len(&self) -> usize {
    self.root.entry_count()
  }

  /// Whether the tree holds no entries.
  pub fn is_empty(&self) -> bool {
    !self.root.has_any_entries()
  }

  /// Loose bounds of the current root cell.
  #[inline]
  pub fn bounds(&self) -> Aabb {
    self.root.bounds()
  }

  /// Every payload with its bounds.
  pub fn entries(&self) -> Vec<(&T, Aabb)> {
    let mut out = Vec::new();
    self.root.collect_entries(&mut out);
    out
      .into_iter()
      .map(|entry| (&entry.value, entry.bounds))
      .collect()
  }

  /// Loose bounds of every node, root first. Debug visualization aid.
  pub fn node_bounds(&self) -> Vec<Aabb> {
    let mut out = Vec::new();
    self.root.collect_node_bounds(&mut out);
    out
  }

  /// Drop every entry and reset the root to the configured initial cell.
  pub fn clear(&mut self) {
    self.root = OctreeNode::new(
      self.config.initial_size,
      self.config.min_node_size,
      self.config.looseness,
      self.config.origin,
    );
  }
}

impl<T: PartialEq> Octree<T> {
  /// Remove the first entry whose payload equals `value`.
  ///
  /// Searches the whole tree; prefer
  /// [`remove_with_bounds`](Octree::remove_with_bounds) when the entry's
  /// bounds are at hand.
  pub fn remove(&mut self, value: &T) -> bool {
    let removed = self.root.remove(value);
    if removed {
      self.shrink();
    }
    removed
  }

  /// Remove the entry matching `value` that was inserted with `bounds`.
  ///
  /// Descends only the child path that can hold those bounds.
  pub fn remove_with_bounds(&mut self, value: &T, bounds: &Aabb) -> bool {
    let removed = self.root.remove_with_bounds(value, bounds);
    if removed {
      self.shrink();
    }
    removed
  }

  /// Collapse the root one level when its content allows, never below the
  /// configured initial size.
  fn shrink(&mut self) {
    self.root.shrink_if_possible(self.config.initial_size);
  }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
