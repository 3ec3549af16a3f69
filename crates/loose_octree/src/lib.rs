//! loose_octree - dynamically resizable loose octree spatial index
//!
//! A loose octree partitions 3-D space to answer "what overlaps this volume
//! or ray" queries in sub-linear time. Every cell's bounds are inflated by a
//! looseness factor so entries near a cell boundary rarely have to move
//! between sibling cells, and the tree re-roots itself when an entry lands
//! outside the current extent - callers never pre-declare world bounds.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use loose_octree::{Aabb, Octree, OctreeConfig, Ray};
//!
//! let mut tree = Octree::new(OctreeConfig {
//!   origin: Vec3::ZERO,
//!   initial_size: 100.0,
//!   min_node_size: 1.0,
//!   looseness: 1.25,
//! })
//! .unwrap();
//!
//! tree
//!   .insert("crate", Aabb::from_center_size(Vec3::new(2.0, 2.0, 2.0), Vec3::splat(4.0)))
//!   .unwrap();
//!
//! let hits = tree.query(&Aabb::from_center_size(Vec3::ZERO, Vec3::splat(10.0)));
//! assert_eq!(hits, vec![&"crate"]);
//!
//! let ray = Ray::new(Vec3::new(-10.0, 2.0, 2.0), Vec3::X);
//! assert!(tree.collides_ray(&ray, 200.0));
//! ```
//!
//! # Scope
//!
//! A tree instance is single-threaded: mutate it from one thread at a time,
//! and only query concurrently while no mutation is in flight. Entries are
//! immutable once inserted - moving an item is a remove plus a re-insert.

pub mod bounds;
pub mod config;
pub mod error;
pub mod node;
pub mod ray;
pub mod tree;
pub mod types;

// Re-exports
pub use bounds::Aabb;
pub use config::OctreeConfig;
pub use error::OctreeError;
pub use node::{OctreeNode, NODE_CAPACITY};
pub use ray::Ray;
pub use tree::{Octree, MAX_GROW_ATTEMPTS};
pub use types::OctreeEntry;
