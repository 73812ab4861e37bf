pub mod camera;
pub mod frame;
pub mod intersect;
pub mod palette;
pub mod ray;
pub mod renderer;
pub mod sampler;
pub mod scene;
pub mod session;
pub mod walk;

#[cfg(test)]
mod test_harness;

pub use camera::OrbitCamera;
pub use frame::FrameScheduler;
pub use palette::Palette;
pub use ray::{Ray, Viewport};
pub use renderer::{CameraUniforms, Framebuffer, TileRenderer, TraceHit};
pub use sampler::TileSampler;
pub use scene::{TileScene, TreePrimitives};
pub use session::{Session, SessionCommand};
pub use walk::GridWalk;
