//! Error types for octree construction and insertion.

use thiserror::Error;

/// Errors surfaced by [`Octree`](crate::Octree) operations.
///
/// Queries and removals are total and never error: queries on an empty tree
/// return empty results, and removing an absent payload returns `false`.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum OctreeError {
  /// The configured minimum node size exceeds the initial world size.
  #[error("minimum node size {min_node_size} exceeds the initial world size {initial_size}")]
  MinNodeSizeTooLarge {
    /// Requested subdivision floor.
    min_node_size: f32,
    /// Requested initial root edge length.
    initial_size: f32,
  },

  /// Growing the tree failed to fit an entry within the attempt cap.
  ///
  /// Each growth doubles the root, so this signals degenerate input
  /// (typically non-finite bounds) rather than a recoverable condition.
  /// Callers should validate bounds upstream instead of retrying.
  #[error("failed to grow the octree around an entry after {attempts} attempts")]
  GrowthExhausted {
    /// Number of growth attempts made before giving up.
    attempts: usize,
  },
}
