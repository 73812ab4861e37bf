//! Closed-form ray tests against the primitives the tile is drawn with.

use glam::Vec3;

use crate::ray::Ray;

/// Slab test against an axis-aligned box.
///
/// Returns the raw `(near, far)` parameters with `near <= far`. `near` is
/// negative when the origin is inside the box. Boxes entirely behind the
/// ray, or missed, return None.
pub fn ray_box(ray: &Ray, min: Vec3, max: Vec3) -> Option<(f32, f32)> {
    let inv = ray.direction.recip();
    let t0 = (min - ray.origin) * inv;
    let t1 = (max - ray.origin) * inv;
    let near = t0.min(t1).max_element();
    let far = t0.max(t1).min_element();
    if near > far || far < 0.0 {
        None
    } else {
        Some((near, far))
    }
}

/// Nearest ray parameter beyond `epsilon` at which the ray meets the sphere.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32, epsilon: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.direction.length_squared();
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    [(-half_b - root) / a, (-half_b + root) / a]
        .into_iter()
        .find(|&t| t > epsilon)
}

/// Vertical (Y axis) open cylinder standing on `base` and rising `height`.
///
/// Infinite-cylinder quadratic in XZ, then clipped to the segment by the hit
/// point's height. Caps are not modelled, so rays parallel to the axis miss.
pub fn ray_cylinder(
    ray: &Ray,
    base: Vec3,
    height: f32,
    radius: f32,
    epsilon: f32,
) -> Option<f32> {
    let ox = ray.origin.x - base.x;
    let oz = ray.origin.z - base.z;
    let dx = ray.direction.x;
    let dz = ray.direction.z;

    let a = dx * dx + dz * dz;
    if a <= f32::EPSILON {
        return None;
    }
    let half_b = ox * dx + oz * dz;
    let c = ox * ox + oz * oz - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    [(-half_b - root) / a, (-half_b + root) / a]
        .into_iter()
        .filter(|&t| t > epsilon)
        .find(|&t| {
            let y = ray.origin.y + ray.direction.y * t - base.y;
            (0.0..=height).contains(&y)
        })
}
