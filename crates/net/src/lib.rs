//! Multiplayer replication for cordon components.
//!
//! `cordon-net` implements the host-authoritative delta protocol: a bit-level
//! wire stream, per-component delta items that diff live state against a
//! per-peer shadow copy and ship only changed fields, and the receive-side
//! history queue that replays decoded updates in host-tick order.
pub mod bitstream;
pub mod delta;
pub mod history;

pub use bitstream::{BitReader, BitWriter, BitstreamError};
pub use delta::{BarrierTapeDelta, DeltaItem, TapeApplyContext, TapeFields, TapePatch};
pub use history::{HistoryEntry, HistoryQueue};
