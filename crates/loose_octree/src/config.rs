//! Octree construction parameters.

use glam::Vec3;

use crate::error::OctreeError;

/// Construction parameters for an [`Octree`](crate::Octree).
///
/// The tree keeps the config it was built with so that roots rebuilt during
/// growth, shrink, and [`clear`](crate::Octree::clear) stay consistent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeConfig {
  /// World-space center of the initial root cell.
  pub origin: Vec3,

  /// Edge length of the initial root cell. The tree grows past this on
  /// demand and never shrinks back below it.
  pub initial_size: f32,

  /// Edge length below which nodes refuse to subdivide.
  pub min_node_size: f32,

  /// Loose-bounds inflation factor. Values above 1.0 inflate node bounds
  /// beyond their logical cell so entries near a cell boundary move between
  /// sibling cells less often. Clamped up to 1.0 at tree construction.
  pub looseness: f32,
}

impl OctreeConfig {
  /// Validate the configuration.
  pub fn validate(&self) -> Result<(), OctreeError> {
    if self.min_node_size > self.initial_size {
      return Err(OctreeError::MinNodeSizeTooLarge {
        min_node_size: self.min_node_size,
        initial_size: self.initial_size,
      });
    }
    Ok(())
  }
}

impl Default for OctreeConfig {
  fn default() -> Self {
    Self {
      origin: Vec3::ZERO,
      initial_size: 64.0,
      min_node_size: 1.0,
      looseness: 1.2,
    }
  }
}
