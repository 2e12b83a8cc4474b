//! In-memory cache layer: the authoritative read path plus the write-behind
//! queue feeding the durable store.

pub mod lock;
pub mod queue;
pub mod store;

pub use queue::{WriteIntent, WriteQueue};
pub use store::PadCache;
