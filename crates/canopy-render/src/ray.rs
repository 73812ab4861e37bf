use glam::{Mat4, Vec2, Vec3, Vec4};

/// Active viewport rectangle in framebuffer pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, pixel: Vec2) -> bool {
        pixel.x >= self.x
            && pixel.y >= self.y
            && pixel.x < self.x + self.width
            && pixel.y < self.y + self.height
    }

    /// Map a framebuffer pixel to normalized device coordinates.
    /// NDC y points up, framebuffer y points down.
    pub fn pixel_to_ndc(&self, pixel: Vec2) -> Vec2 {
        Vec2::new(
            2.0 * (pixel.x - self.x) / self.width - 1.0,
            1.0 - 2.0 * (pixel.y - self.y) / self.height,
        )
    }
}

/// World-space ray with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Camera ray through a framebuffer pixel.
    ///
    /// Inverts pixel -> NDC -> eye -> world: the far-plane point at the
    /// pixel's NDC position is unprojected with the inverse projection,
    /// divided by w, then moved to world space with the inverse view.
    /// Assumes a perspective projection (all rays share the eye origin).
    pub fn through_pixel(
        pixel: Vec2,
        viewport: &Viewport,
        inv_projection: &Mat4,
        inv_view: &Mat4,
    ) -> Self {
        let ndc = viewport.pixel_to_ndc(pixel);
        let eye_far = *inv_projection * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let eye_far = eye_far.truncate() / eye_far.w;

        let origin = inv_view.transform_point3(Vec3::ZERO);
        let far = inv_view.transform_point3(eye_far);
        Self::new(origin, far - origin)
    }
}
