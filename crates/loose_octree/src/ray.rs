//! Ray with a normalized direction.

use glam::Vec3;

/// A ray in 3-D space.
///
/// The direction is always stored normalized; construction and
/// [`set_direction`](Ray::set_direction) re-normalize. Passing a zero-length
/// direction is a caller error: it normalizes to NaN and poisons every
/// intersection test made with the ray. There is no runtime check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
  /// Origin point of the ray.
  pub origin: Vec3,
  direction: Vec3,
}

impl Ray {
  /// Create a ray, normalizing the direction.
  #[inline]
  pub fn new(origin: Vec3, direction: Vec3) -> Self {
    Self {
      origin,
      direction: direction.normalize(),
    }
  }

  /// The normalized direction.
  #[inline]
  pub fn direction(&self) -> Vec3 {
    self.direction
  }

  /// Replace the direction, re-normalizing it.
  #[inline]
  pub fn set_direction(&mut self, direction: Vec3) {
    self.direction = direction.normalize();
  }

  /// The point `distance` units along the ray.
  #[inline]
  pub fn point_at(&self, distance: f32) -> Vec3 {
    self.origin + self.direction * distance
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_normalizes_direction() {
    let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0));
    assert_eq!(ray.direction(), Vec3::Y);
  }

  #[test]
  fn test_set_direction_renormalizes() {
    let mut ray = Ray::new(Vec3::ZERO, Vec3::X);
    ray.set_direction(Vec3::new(3.0, 0.0, 4.0));
    assert!((ray.direction().length() - 1.0).abs() < 1e-6);
    assert!((ray.direction() - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-6);
  }

  #[test]
  fn test_point_at() {
    let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(ray.point_at(3.0), Vec3::new(4.0, 0.0, 0.0));
    assert_eq!(ray.point_at(0.0), ray.origin);
  }
}
