//! Axis-aligned bounding box stored as center + half-extents.

use glam::Vec3;

use crate::ray::Ray;

/// Axis-aligned bounding box.
///
/// Stored as center + half-extents because the octree's cell math (octant
/// placement, loose inflation, growth) is all center-relative. The corner
/// form is available through [`Aabb::min`] and [`Aabb::max`], and both
/// corners can be replaced together with [`Aabb::set_min_max`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
	/// Center of the box.
	pub center: Vec3,
	/// Half the box size on each axis. Components stay >= 0 for boxes built
	/// from ordered corners.
	pub half_extents: Vec3,
}

impl Aabb {
	/// Create a box from center and half-extents.
	#[inline]
	pub fn new(center: Vec3, half_extents: Vec3) -> Self {
		Self {
			center,
			half_extents,
		}
	}

	/// Create a box from center and full size.
	#[inline]
	pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
		Self {
			center,
			half_extents: size * 0.5,
		}
	}

	/// Create a box from min and max corners.
	///
	/// # Panics
	/// Debug-asserts that min <= max on all axes.
	pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
		debug_assert!(
			min.x <= max.x && min.y <= max.y && min.z <= max.z,
			"AABB min must be <= max on all axes"
		);
		Self {
			center: (min + max) * 0.5,
			half_extents: (max - min) * 0.5,
		}
	}

	/// Minimum corner (inclusive).
	#[inline]
	pub fn min(&self) -> Vec3 {
		self.center - self.half_extents
	}

	/// Maximum corner (inclusive).
	#[inline]
	pub fn max(&self) -> Vec3 {
		self.center + self.half_extents
	}

	/// Full size of the box (max - min).
	#[inline]
	pub fn size(&self) -> Vec3 {
		self.half_extents * 2.0
	}

	/// Replace both corners, recomputing center and half-extents together.
	#[inline]
	pub fn set_min_max(&mut self, min: Vec3, max: Vec3) {
		self.center = (min + max) * 0.5;
		self.half_extents = (max - min) * 0.5;
	}

	/// Check if this box contains a point (boundary inclusive).
	#[inline]
	pub fn contains_point(&self, point: Vec3) -> bool {
		let min = self.min();
		let max = self.max();
		point.x >= min.x
			&& point.x <= max.x
			&& point.y >= min.y
			&& point.y <= max.y
			&& point.z >= min.z
			&& point.z <= max.z
	}

	/// Check if this box fully contains another box.
	#[inline]
	pub fn contains(&self, other: &Aabb) -> bool {
		self.contains_point(other.min()) && self.contains_point(other.max())
	}

	/// Check if this box overlaps another.
	///
	/// Touching at a face, edge, or corner counts as overlapping.
	#[inline]
	pub fn intersects(&self, other: &Aabb) -> bool {
		let a_min = self.min();
		let a_max = self.max();
		let b_min = other.min();
		let b_max = other.max();
		a_min.x <= b_max.x
			&& a_max.x >= b_min.x
			&& a_min.y <= b_max.y
			&& a_max.y >= b_min.y
			&& a_min.z <= b_max.z
			&& a_max.z >= b_min.z
	}

	/// Expand the box to include a point.
	pub fn encapsulate_point(&mut self, point: Vec3) {
		self.set_min_max(self.min().min(point), self.max().max(point));
	}

	/// Expand the box to include another box.
	pub fn encapsulate(&mut self, other: &Aabb) {
		self.encapsulate_point(other.min());
		self.encapsulate_point(other.max());
	}

	/// Grow the box size by `amount` on every axis, half on each side.
	pub fn expand(&mut self, amount: f32) {
		self.half_extents += Vec3::splat(amount * 0.5);
	}

	/// Grow the box size per axis, half on each side.
	pub fn expand_by(&mut self, amount: Vec3) {
		self.half_extents += amount * 0.5;
	}

	/// Slab-method ray intersection.
	///
	/// Clips the ray against the min/max plane pair of each axis and keeps
	/// the intersection of the three parameter intervals. Returns the entry
	/// parameter on a hit; it is negative when the ray origin is inside the
	/// box. An axis the ray runs parallel to hits nothing unless the origin
	/// lies within that slab (boundary inclusive).
	pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
		let min = self.min();
		let max = self.max();
		let origin = ray.origin;
		let direction = ray.direction();

		let mut t_min = f32::NEG_INFINITY;
		let mut t_max = f32::INFINITY;
		for axis in 0..3 {
			if direction[axis] != 0.0 {
				let inv = 1.0 / direction[axis];
				let mut t_near = (min[axis] - origin[axis]) * inv;
				let mut t_far = (max[axis] - origin[axis]) * inv;
				if t_near > t_far {
					std::mem::swap(&mut t_near, &mut t_far);
				}
				t_min = t_min.max(t_near);
				t_max = t_max.min(t_far);
			} else if origin[axis] < min[axis] || origin[axis] > max[axis] {
				return None;
			}
		}

		if t_max < 0.0 || t_min > t_max {
			return None;
		}
		Some(t_min)
	}

	/// Check if a ray hits the box at all.
	#[inline]
	pub fn intersects_ray(&self, ray: &Ray) -> bool {
		self.intersect_ray(ray).is_some()
	}
}
