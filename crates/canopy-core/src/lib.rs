pub mod config;
pub mod constants;
pub mod error;
pub mod math;
pub mod types;

pub use config::{PlaybackConfig, RenderConfig, TileConfig, ViewerConfig};
pub use error::CoreError;
pub use types::{CorpusStatistics, TileGeometry, TileLoad, TileTexture, TreeRecord};
