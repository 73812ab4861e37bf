use std::io::Write;
use std::path::Path;

use canopy_render::Framebuffer;

/// Binary PPM (P6) encoding of a framebuffer; alpha is dropped.
pub fn encode_ppm(framebuffer: &Framebuffer) -> Vec<u8> {
    let header = format!("P6\n{} {}\n255\n", framebuffer.width(), framebuffer.height());
    let mut out = Vec::with_capacity(header.len() + framebuffer.pixels().len() * 3);
    out.extend_from_slice(header.as_bytes());
    for [r, g, b, _] in framebuffer.pixels() {
        out.extend_from_slice(&[*r, *g, *b]);
    }
    out
}

pub fn write_ppm(path: &Path, framebuffer: &Framebuffer) -> std::io::Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    file.write_all(&encode_ppm(framebuffer))?;
    file.flush()
}
