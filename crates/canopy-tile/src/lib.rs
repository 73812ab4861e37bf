pub mod encoder;
pub mod identity;
pub mod slot_map;
pub mod worker;

pub use encoder::{encode_records, EncodeOutcome, EncodeReport, TileEncoder};
pub use identity::{tree_identity, TreeId};
pub use slot_map::SlotMap;
pub use worker::{run_loader, spawn_loader, LoaderHandle, LoaderMessage, LoaderPoll};
