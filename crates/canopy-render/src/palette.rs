use canopy_core::RenderConfig;

pub type Rgba = [u8; 4];

fn opaque([r, g, b]: [u8; 3]) -> Rgba {
    [r, g, b, 0xff]
}

/// Flat colours for every surface the tracer can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgba,
    pub ground: Rgba,
    pub grid_line: Rgba,
    pub canopy: Rgba,
    pub trunk: Rgba,
}

impl Palette {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            background: opaque(config.background),
            ground: opaque(config.ground),
            grid_line: opaque(config.grid_line),
            canopy: opaque(config.canopy),
            trunk: opaque(config.trunk),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}
