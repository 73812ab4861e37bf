use canopy_core::TileTexture;
use glam::{IVec3, Vec3};

/// Trilinear, clamp-to-edge reads from a tile texture in normalized
/// `[0, 1]^3` coordinates. Texel centres sit at `(i + 0.5) / size`.
#[derive(Debug, Clone)]
pub struct TileSampler {
    texture: TileTexture,
}

impl TileSampler {
    pub fn new(texture: TileTexture) -> Self {
        Self { texture }
    }

    pub fn texture(&self) -> &TileTexture {
        &self.texture
    }

    /// Nearest read with edge clamping.
    pub fn texel(&self, voxel: IVec3) -> f32 {
        let max = self.texture.dimensions().as_ivec3() - IVec3::ONE;
        let clamped = voxel.clamp(IVec3::ZERO, max.max(IVec3::ZERO));
        self.texture.texel(clamped.as_uvec3()) as f32
    }

    /// Filtered value in `[0, 255]`. Empty textures read as 0.
    pub fn sample(&self, uvw: Vec3) -> f32 {
        if self.texture.is_empty() {
            return 0.0;
        }
        let size = self.texture.dimensions().as_vec3();
        let p = uvw.clamp(Vec3::ZERO, Vec3::ONE) * size - Vec3::splat(0.5);
        let base = p.floor();
        let f = p - base;
        let i = base.as_ivec3();

        let mut acc = 0.0;
        for corner in 0..8 {
            let offset = IVec3::new(corner & 1, (corner >> 1) & 1, (corner >> 2) & 1);
            let wx = if offset.x == 1 { f.x } else { 1.0 - f.x };
            let wy = if offset.y == 1 { f.y } else { 1.0 - f.y };
            let wz = if offset.z == 1 { f.z } else { 1.0 - f.z };
            let weight = wx * wy * wz;
            if weight > 0.0 {
                acc += weight * self.texel(i + offset);
            }
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;

    fn two_layer() -> TileSampler {
        let mut tex = TileTexture::zeroed(2, 2, 2);
        tex.write(UVec3::new(0, 0, 0), 100);
        tex.write(UVec3::new(0, 0, 1), 200);
        tex.write(UVec3::new(1, 1, 0), 50);
        TileSampler::new(tex)
    }

    #[test]
    fn test_texel_centres_are_exact() {
        let s = two_layer();
        assert_eq!(s.sample(Vec3::new(0.25, 0.25, 0.25)), 100.0);
        assert_eq!(s.sample(Vec3::new(0.25, 0.25, 0.75)), 200.0);
        assert_eq!(s.sample(Vec3::new(0.75, 0.75, 0.25)), 50.0);
        assert_eq!(s.sample(Vec3::new(0.75, 0.25, 0.25)), 0.0);
    }

    #[test]
    fn test_interpolates_between_layers() {
        let s = two_layer();
        let mid = s.sample(Vec3::new(0.25, 0.25, 0.5));
        assert!((mid - 150.0).abs() < 1e-3, "got {mid}");
    }

    #[test]
    fn test_clamps_to_edge() {
        let s = two_layer();
        assert_eq!(s.sample(Vec3::new(0.25, 0.25, 0.0)), 100.0);
        assert_eq!(s.sample(Vec3::new(0.25, 0.25, 1.0)), 200.0);
        assert_eq!(s.sample(Vec3::new(-3.0, -3.0, -3.0)), 100.0);
        assert_eq!(s.texel(IVec3::new(-1, 5, 9)), s.texel(IVec3::new(0, 1, 1)));
    }

    #[test]
    fn test_empty_texture_reads_zero() {
        let s = TileSampler::new(TileTexture::zeroed(0, 0, 0));
        assert_eq!(s.sample(Vec3::splat(0.5)), 0.0);
    }
}
